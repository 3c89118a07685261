//! Narration Context - Errors

use thiserror::Error;

/// 分段错误：在任何后端调用之前中止任务
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentationError {
    #[error("narration text is empty")]
    EmptyInput,

    #[error("no narratable content left after splitting")]
    NoContent,

    #[error("invalid chapter label: {0}")]
    InvalidChapterLabel(String),

    #[error("max chunk size must be greater than zero")]
    ZeroChunkSize,
}

/// 旁白文档解析错误
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse narration document: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("narration document has no chapters")]
    NoChapters,
}
