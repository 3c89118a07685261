//! 应用层 - 命令
//!
//! 旁白任务命令及处理器

mod narrate_commands;

pub mod handlers;

pub use narrate_commands::*;
