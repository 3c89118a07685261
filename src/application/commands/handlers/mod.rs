//! Command Handlers 实现

mod narrate_handler;

pub use narrate_handler::*;
