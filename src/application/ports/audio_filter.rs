//! Audio Filter Port - 外部音频滤镜工具抽象

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// 滤镜错误
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Failed to start {tool}: {reason}")]
    SpawnFailed { tool: String, reason: String },

    /// 非零退出，stderr 原样保留
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },
}

/// Audio Filter Port
#[async_trait]
pub trait AudioFilterPort: Send + Sync {
    /// 以 `filter_graph` 处理 `input`，写到 `output`
    async fn apply(&self, input: &Path, filter_graph: &str, output: &Path)
        -> Result<(), FilterError>;
}
