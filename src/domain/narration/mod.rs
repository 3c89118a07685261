//! Narration Context - 旁白限界上下文
//!
//! 职责:
//! - 旁白文档聚合（标题、章节、结束语）
//! - 全文渲染
//! - 文本块实体

mod aggregate;
mod entities;
mod errors;

pub use aggregate::{NarrationDocument, SEPARATOR};
pub use entities::{Chapter, ChunkSpec};
pub use errors::{DocumentError, SegmentationError};
