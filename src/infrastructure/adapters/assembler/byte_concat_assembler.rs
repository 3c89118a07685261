//! Byte Concat Assembler - 按字节拼接片段
//!
//! 实现 AudioAssemblerPort trait。后端输出固定格式的 MP3 流，
//! 直接拼接字节即可播放，不做解码/重编码。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};

use crate::application::ports::{AssemblyError, AssemblyOutcome, AudioAssemblerPort};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// 按字节拼接的 Assembler
#[derive(Debug, Default)]
pub struct ByteConcatAssembler;

impl ByteConcatAssembler {
    pub fn new() -> Self {
        Self
    }

    async fn write_all(
        fragments: &[PathBuf],
        filler: Option<&[u8]>,
        output: &Path,
    ) -> Result<u64, AssemblyError> {
        let output_error = |e: std::io::Error| AssemblyError::OutputError {
            path: output.to_path_buf(),
            reason: e.to_string(),
        };

        let file = File::create(output).await.map_err(output_error)?;
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut written = 0u64;

        for (index, fragment) in fragments.iter().enumerate() {
            if index > 0 {
                if let Some(filler) = filler {
                    writer.write_all(filler).await.map_err(output_error)?;
                    written += filler.len() as u64;
                }
            }

            let unreadable = |e: std::io::Error| AssemblyError::FragmentUnreadable {
                path: fragment.clone(),
                reason: e.to_string(),
            };

            // 读写分开映射错误，写失败归到产物上
            let mut source = File::open(fragment).await.map_err(unreadable)?;
            loop {
                let read = source.read(&mut buffer).await.map_err(unreadable)?;
                if read == 0 {
                    break;
                }
                writer
                    .write_all(&buffer[..read])
                    .await
                    .map_err(output_error)?;
                written += read as u64;
            }
        }

        writer.flush().await.map_err(output_error)?;
        Ok(written)
    }
}

#[async_trait]
impl AudioAssemblerPort for ByteConcatAssembler {
    async fn join(
        &self,
        fragments: &[PathBuf],
        filler: Option<&Path>,
        output: &Path,
    ) -> Result<AssemblyOutcome, AssemblyError> {
        if fragments.is_empty() {
            return Err(AssemblyError::NoFragments);
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AssemblyError::OutputError {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })?;
        }

        // 填充音频只读一次
        let filler_data = match filler {
            Some(path) => Some(fs::read(path).await.map_err(|e| {
                AssemblyError::FillerUnreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let bytes_written = Self::write_all(fragments, filler_data.as_deref(), output).await?;

        tracing::info!(
            path = %output.display(),
            fragments = fragments.len(),
            bytes = bytes_written,
            "Fragments joined"
        );

        // 片段删除失败不影响结果；填充文件是共享的，保留
        for fragment in fragments {
            if let Err(e) = fs::remove_file(fragment).await {
                tracing::warn!(path = %fragment.display(), error = %e, "Failed to remove fragment");
            }
        }

        Ok(AssemblyOutcome {
            bytes_written,
            fragments_joined: fragments.len(),
        })
    }
}
