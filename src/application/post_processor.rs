//! Post-Processor - 拼接后的两道滤镜
//!
//! 1. 压扩（compand）：拉平合成后端带来的响度起伏
//! 2. 静音裁剪（silenceremove）：去掉块边界处的空白
//!
//! 产物：`unnoised_<name>` → `clean_<name>`。两步都成功后才删除中间文件；
//! 任一步失败时，拼接好的原始文件保留在磁盘上。

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::application::ports::{AudioFilterPort, FilterError};

/// 第一道输出的前缀
pub const UNNOISED_PREFIX: &str = "unnoised_";
/// 最终产物的前缀
pub const CLEAN_PREFIX: &str = "clean_";

/// 滤镜阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Compand,
    SilenceTrim,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compand => write!(f, "compand"),
            Self::SilenceTrim => write!(f, "silence-trim"),
        }
    }
}

/// 后处理错误
#[derive(Debug, Error)]
pub enum PostProcessError {
    #[error("{stage} pass failed: {source}")]
    Stage {
        stage: FilterStage,
        #[source]
        source: FilterError,
    },

    #[error("Not a file path: {0}")]
    InvalidInput(PathBuf),
}

/// 滤镜参数
#[derive(Debug, Clone)]
pub struct PostProcessConfig {
    pub compand_filter: String,
    pub silence_filter: String,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            compand_filter: "compand=attacks=0:decays=0.7:points=-80/-80|-6/-6|-2/-80".to_string(),
            silence_filter: "silenceremove=stop_periods=-1:stop_duration=2:stop_threshold=-60dB"
                .to_string(),
        }
    }
}

/// Post-Processor
pub struct PostProcessor {
    filter: Arc<dyn AudioFilterPort>,
    config: PostProcessConfig,
}

impl PostProcessor {
    pub fn new(filter: Arc<dyn AudioFilterPort>, config: PostProcessConfig) -> Self {
        Self { filter, config }
    }

    /// 处理 `assembled`，返回 `clean_` 文件路径
    pub async fn process(&self, assembled: &Path) -> Result<PathBuf, PostProcessError> {
        let name = assembled
            .file_name()
            .ok_or_else(|| PostProcessError::InvalidInput(assembled.to_path_buf()))?
            .to_string_lossy();
        let unnoised = assembled.with_file_name(format!("{UNNOISED_PREFIX}{name}"));
        let clean = assembled.with_file_name(format!("{CLEAN_PREFIX}{name}"));

        self.run_stage(
            FilterStage::Compand,
            assembled,
            &self.config.compand_filter,
            &unnoised,
        )
        .await?;

        if let Err(e) = self
            .run_stage(
                FilterStage::SilenceTrim,
                &unnoised,
                &self.config.silence_filter,
                &clean,
            )
            .await
        {
            remove_quietly(&unnoised).await;
            return Err(e);
        }

        remove_quietly(assembled).await;
        remove_quietly(&unnoised).await;

        tracing::info!(path = %clean.display(), "Post-processing finished");
        Ok(clean)
    }

    async fn run_stage(
        &self,
        stage: FilterStage,
        input: &Path,
        graph: &str,
        output: &Path,
    ) -> Result<(), PostProcessError> {
        tracing::info!(
            %stage,
            input = %input.display(),
            output = %output.display(),
            "Running filter pass"
        );
        match self.filter.apply(input, graph, output).await {
            Ok(()) => Ok(()),
            Err(source) => {
                // 失败阶段的输出可能只写了一半
                remove_quietly(output).await;
                Err(PostProcessError::Stage { stage, source })
            }
        }
    }
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove intermediate file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 把图参数作为前缀写到输出；遇到 `fail_on` 时模拟工具失败
    struct RecordingFilter {
        fail_on: Option<&'static str>,
        graphs: Mutex<Vec<String>>,
    }

    impl RecordingFilter {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                fail_on,
                graphs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AudioFilterPort for RecordingFilter {
        async fn apply(
            &self,
            input: &Path,
            filter_graph: &str,
            output: &Path,
        ) -> Result<(), FilterError> {
            self.graphs.lock().unwrap().push(filter_graph.to_string());
            if self.fail_on == Some(filter_graph) {
                return Err(FilterError::ToolFailed {
                    tool: "ffmpeg".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "Invalid argument".to_string(),
                });
            }
            let mut data = filter_graph.as_bytes().to_vec();
            data.extend(std::fs::read(input).unwrap());
            std::fs::write(output, data).unwrap();
            Ok(())
        }
    }

    fn config() -> PostProcessConfig {
        PostProcessConfig {
            compand_filter: "C|".to_string(),
            silence_filter: "S|".to_string(),
        }
    }

    #[tokio::test]
    async fn test_two_passes_and_cleanup() {
        let temp = tempfile::tempdir().unwrap();
        let assembled = temp.path().join("story.mp3");
        std::fs::write(&assembled, b"audio").unwrap();

        let filter = Arc::new(RecordingFilter::new(None));
        let processor = PostProcessor::new(filter.clone(), config());
        let clean = processor.process(&assembled).await.unwrap();

        assert_eq!(clean, temp.path().join("clean_story.mp3"));
        assert_eq!(std::fs::read(&clean).unwrap(), b"S|C|audio");
        assert!(!assembled.exists());
        assert!(!temp.path().join("unnoised_story.mp3").exists());
        assert_eq!(*filter.graphs.lock().unwrap(), vec!["C|", "S|"]);
    }

    #[tokio::test]
    async fn test_failed_stage_keeps_assembled_file() {
        let temp = tempfile::tempdir().unwrap();
        let assembled = temp.path().join("story.mp3");
        std::fs::write(&assembled, b"audio").unwrap();

        let processor = PostProcessor::new(Arc::new(RecordingFilter::new(Some("S|"))), config());
        let err = processor.process(&assembled).await.unwrap_err();

        match err {
            PostProcessError::Stage { stage, source } => {
                assert_eq!(stage, FilterStage::SilenceTrim);
                assert!(source.to_string().contains("Invalid argument"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(std::fs::read(&assembled).unwrap(), b"audio");
        assert!(!temp.path().join("clean_story.mp3").exists());
    }

    #[tokio::test]
    async fn test_compand_failure_skips_second_pass() {
        let temp = tempfile::tempdir().unwrap();
        let assembled = temp.path().join("story.mp3");
        std::fs::write(&assembled, b"audio").unwrap();

        let filter = Arc::new(RecordingFilter::new(Some("C|")));
        let processor = PostProcessor::new(filter.clone(), config());
        let err = processor.process(&assembled).await.unwrap_err();

        assert!(matches!(
            err,
            PostProcessError::Stage {
                stage: FilterStage::Compand,
                ..
            }
        ));
        assert_eq!(filter.graphs.lock().unwrap().len(), 1);
        assert!(assembled.exists());
    }
}
