//! Fragment Storage Port - 出站端口
//!
//! 管理工作目录内的音频片段文件与最终产物路径

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 片段存储错误
#[derive(Debug, Error)]
pub enum FragmentStorageError {
    #[error("IO error on {path}: {reason}")]
    IoError { path: PathBuf, reason: String },

    #[error("Invalid output name: {0}")]
    InvalidName(String),
}

impl FragmentStorageError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::IoError {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}

/// Fragment Storage Port - 出站端口
///
/// 片段文件名是确定的：`<chapter>_<chunk>_<basename>`；同一目录、同一 basename
/// 同时只能有一个任务在写
#[async_trait]
pub trait FragmentStoragePort: Send + Sync {
    /// 工作目录
    fn work_dir(&self) -> &Path;

    /// 片段文件路径
    fn fragment_path(&self, chapter_index: usize, chunk_index: usize, basename: &str) -> PathBuf;

    /// 拼接产物路径
    fn output_path(&self, basename: &str) -> PathBuf;

    /// 原子写入片段：要么完整存在，要么不存在
    async fn save_fragment(&self, path: &Path, data: &[u8]) -> Result<(), FragmentStorageError>;

    /// 尽力删除文件，失败只记录日志；返回实际删除的数量
    async fn remove_files(&self, paths: &[PathBuf]) -> usize;
}

/// 校验输出文件名：不能为空，不能包含路径分隔符
pub fn validate_basename(basename: &str) -> Result<(), FragmentStorageError> {
    let invalid = basename.trim().is_empty()
        || basename.contains(&['/', '\\'][..])
        || basename == "."
        || basename == "..";
    if invalid {
        return Err(FragmentStorageError::InvalidName(basename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_basename() {
        assert!(validate_basename("story.mp3").is_ok());
        assert!(validate_basename("").is_err());
        assert!(validate_basename("../story.mp3").is_err());
        assert!(validate_basename("dir/story.mp3").is_err());
    }
}
