//! File Storage - 文件系统片段存储实现
//!
//! 实现 FragmentStoragePort trait

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{FragmentStorageError, FragmentStoragePort};

/// 文件系统片段存储
pub struct FileFragmentStorage {
    /// 工作目录（片段和最终产物都放在这里）
    work_dir: PathBuf,
}

impl FileFragmentStorage {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// 写入中的临时文件：与目标同目录，保证 rename 是原子的
    fn partial_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.part", name))
    }

    async fn remove_one(path: &Path) -> bool {
        match fs::remove_file(path).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove file");
                false
            }
        }
    }
}

#[async_trait]
impl FragmentStoragePort for FileFragmentStorage {
    fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn fragment_path(&self, chapter_index: usize, chunk_index: usize, basename: &str) -> PathBuf {
        self.work_dir
            .join(format!("{}_{}_{}", chapter_index, chunk_index, basename))
    }

    fn output_path(&self, basename: &str) -> PathBuf {
        self.work_dir.join(basename)
    }

    async fn save_fragment(&self, path: &Path, data: &[u8]) -> Result<(), FragmentStorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FragmentStorageError::io(parent, e))?;
        }

        let partial = Self::partial_path(path);
        if let Err(e) = fs::write(&partial, data).await {
            Self::remove_one(&partial).await;
            return Err(FragmentStorageError::io(&partial, e));
        }
        if let Err(e) = fs::rename(&partial, path).await {
            Self::remove_one(&partial).await;
            return Err(FragmentStorageError::io(path, e));
        }

        tracing::debug!(path = %path.display(), bytes = data.len(), "Saved fragment");
        Ok(())
    }

    async fn remove_files(&self, paths: &[PathBuf]) -> usize {
        let mut removed = 0;
        for path in paths {
            // 被中断的写入可能留下临时文件
            Self::remove_one(&Self::partial_path(path)).await;
            if Self::remove_one(path).await {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "Removed fragment files");
        }
        removed
    }
}
