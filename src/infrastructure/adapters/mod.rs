//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod assembler;
pub mod filter;
pub mod storage;
pub mod tts;

pub use assembler::*;
pub use filter::*;
pub use storage::*;
pub use tts::*;
