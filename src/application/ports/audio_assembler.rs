//! Audio Assembler Port - 音频拼接抽象

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 拼接错误
///
/// 失败后目标文件的状态不确定
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("No fragments to join")]
    NoFragments,

    #[error("Fragment {path} is unreadable: {reason}")]
    FragmentUnreadable { path: PathBuf, reason: String },

    #[error("Filler {path} is unreadable: {reason}")]
    FillerUnreadable { path: PathBuf, reason: String },

    #[error("Failed to write {path}: {reason}")]
    OutputError { path: PathBuf, reason: String },
}

/// 拼接结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyOutcome {
    /// 写入目标文件的字节数
    pub bytes_written: u64,
    /// 拼接的片段数
    pub fragments_joined: usize,
}

/// Audio Assembler Port
#[async_trait]
pub trait AudioAssemblerPort: Send + Sync {
    /// 按顺序拼接片段，相邻片段之间插入填充音频（首尾不插）；
    /// 成功后删除片段文件（填充文件保留）
    async fn join(
        &self,
        fragments: &[PathBuf],
        filler: Option<&Path>,
        output: &Path,
    ) -> Result<AssemblyOutcome, AssemblyError>;
}
