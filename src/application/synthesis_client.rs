//! Synthesis Client - 单块合成（带重试）
//!
//! 每个文本块调用一次合成后端，成功后原子写入片段文件。
//! 只有暂时性错误会重试；失败时不会在磁盘上留下片段。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::application::ports::{
    FragmentStorageError, FragmentStoragePort, SpeechEnginePort, SpeechError, SpeechRequest,
    VoiceParams,
};
use crate::application::retry::RetryPolicy;
use crate::domain::narration::ChunkSpec;

/// 单次尝试的失败原因
#[derive(Debug, Error)]
pub enum SynthesisFailure {
    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error(transparent)]
    Storage(#[from] FragmentStorageError),
}

impl SynthesisFailure {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Speech(err) => err.is_transient(),
            Self::Storage(_) => false,
        }
    }
}

/// 合成失败，带块坐标
#[derive(Debug, Error)]
#[error("chapter {chapter}, chunk {chunk} failed after {attempts} attempt(s): {source}")]
pub struct SynthesisError {
    pub chapter: usize,
    pub chunk: usize,
    pub attempts: u32,
    #[source]
    pub source: SynthesisFailure,
}

/// 合成客户端配置
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub retry: RetryPolicy,
    /// 每次成功调用后的固定等待（避免后端限流）
    pub inter_call_delay: Duration,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            inter_call_delay: Duration::from_secs(1),
        }
    }
}

/// Synthesis Client
pub struct SynthesisClient {
    engine: Arc<dyn SpeechEnginePort>,
    storage: Arc<dyn FragmentStoragePort>,
    config: SynthesisConfig,
}

impl SynthesisClient {
    pub fn new(
        engine: Arc<dyn SpeechEnginePort>,
        storage: Arc<dyn FragmentStoragePort>,
        config: SynthesisConfig,
    ) -> Self {
        Self {
            engine,
            storage,
            config,
        }
    }

    /// 合成一个块并写到 `target`
    pub async fn convert(
        &self,
        chunk: &ChunkSpec,
        voice: &VoiceParams,
        target: &Path,
    ) -> Result<PathBuf, SynthesisError> {
        let result = self
            .config
            .retry
            .run(
                |attempt| {
                    tracing::debug!(
                        chapter = chunk.chapter_index(),
                        chunk = chunk.chunk_index(),
                        attempt,
                        backend = self.engine.name(),
                        "Synthesizing chunk"
                    );
                    self.attempt(chunk, voice, target)
                },
                SynthesisFailure::is_transient,
            )
            .await;

        match result {
            Ok(bytes) => {
                tracing::info!(
                    chapter = chunk.chapter_index(),
                    chunk = chunk.chunk_index(),
                    bytes,
                    path = %target.display(),
                    "Fragment saved"
                );
                if !self.config.inter_call_delay.is_zero() {
                    tokio::time::sleep(self.config.inter_call_delay).await;
                }
                Ok(target.to_path_buf())
            }
            Err(exhausted) => {
                // 原子写入保证不会有半个文件，这里只清理可能残留的旧片段
                self.storage.remove_files(&[target.to_path_buf()]).await;
                tracing::error!(
                    chapter = chunk.chapter_index(),
                    chunk = chunk.chunk_index(),
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "Synthesis failed"
                );
                Err(SynthesisError {
                    chapter: chunk.chapter_index(),
                    chunk: chunk.chunk_index(),
                    attempts: exhausted.attempts,
                    source: exhausted.last_error,
                })
            }
        }
    }

    async fn attempt(
        &self,
        chunk: &ChunkSpec,
        voice: &VoiceParams,
        target: &Path,
    ) -> Result<usize, SynthesisFailure> {
        let response = self
            .engine
            .synthesize(SpeechRequest {
                text: chunk.text(),
                voice,
            })
            .await?;

        if response.audio_data.is_empty() {
            return Err(SpeechError::InvalidResponse("empty audio body".to_string()).into());
        }

        self.storage
            .save_fragment(target, &response.audio_data)
            .await?;
        Ok(response.audio_data.len())
    }
}
