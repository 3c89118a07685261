//! 应用层错误定义
//!
//! 旁白任务的统一错误类型；任何一块失败都会让整个任务失败

use thiserror::Error;

use crate::application::ports::AssemblyError;
use crate::application::post_processor::PostProcessError;
use crate::application::synthesis_client::SynthesisError;
use crate::domain::narration::{DocumentError, SegmentationError};

/// 旁白任务错误
#[derive(Debug, Error)]
pub enum NarrationError {
    /// 请求参数无效（输出文件名等）
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    /// 在任何后端调用之前失败
    #[error("Segmentation failed: {0}")]
    Segmentation(#[from] SegmentationError),

    /// 带 (chapter, chunk) 坐标
    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    /// 拼接好的未滤波文件仍保留
    #[error("Post-processing failed: {0}")]
    PostProcess(#[from] PostProcessError),

    #[error("Narration cancelled")]
    Cancelled,
}

impl NarrationError {
    /// 创建请求无效错误
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}
