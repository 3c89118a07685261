//! FFmpeg Filter - 以子进程调用 ffmpeg 的音频滤镜
//!
//! 实现 AudioFilterPort trait:
//! `ffmpeg -y -hide_banner -loglevel error -i <input> -af <graph> <codec args> <output>`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::application::ports::{AudioFilterPort, FilterError};

/// FFmpeg 滤镜配置
#[derive(Debug, Clone)]
pub struct FfmpegFilterConfig {
    /// ffmpeg 可执行文件
    pub ffmpeg_path: PathBuf,
    /// 输出编码参数
    pub codec_args: Vec<String>,
}

impl Default for FfmpegFilterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            codec_args: vec![
                "-c:a".to_string(),
                "libmp3lame".to_string(),
                "-q:a".to_string(),
                "0".to_string(),
            ],
        }
    }
}

/// FFmpeg 滤镜
pub struct FfmpegFilter {
    config: FfmpegFilterConfig,
}

impl FfmpegFilter {
    pub fn new(config: FfmpegFilterConfig) -> Self {
        Self { config }
    }

    fn tool_name(&self) -> String {
        self.config.ffmpeg_path.display().to_string()
    }

    fn command(&self, input: &Path, filter_graph: &str, output: &Path) -> Command {
        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .arg("-af")
            .arg(filter_graph)
            .args(&self.config.codec_args)
            .arg(output)
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl AudioFilterPort for FfmpegFilter {
    async fn apply(
        &self,
        input: &Path,
        filter_graph: &str,
        output: &Path,
    ) -> Result<(), FilterError> {
        tracing::debug!(
            tool = %self.tool_name(),
            input = %input.display(),
            filter = filter_graph,
            "Spawning filter tool"
        );

        let result = self
            .command(input, filter_graph, output)
            .output()
            .await
            .map_err(|e| FilterError::SpawnFailed {
                tool: self.tool_name(),
                reason: e.to_string(),
            })?;

        if !result.status.success() {
            return Err(FilterError::ToolFailed {
                tool: self.tool_name(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let filter = FfmpegFilter::new(FfmpegFilterConfig::default());
        let command = filter.command(Path::new("in.mp3"), "compand=attacks=0", Path::new("out.mp3"));
        let args: Vec<_> = command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-y",
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                "in.mp3",
                "-af",
                "compand=attacks=0",
                "-c:a",
                "libmp3lame",
                "-q:a",
                "0",
                "out.mp3",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let filter = FfmpegFilter::new(FfmpegFilterConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
            codec_args: Vec::new(),
        });
        let err = filter
            .apply(Path::new("in.mp3"), "anull", Path::new("out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, FilterError::SpawnFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_keeps_stderr() {
        let filter = FfmpegFilter::new(FfmpegFilterConfig {
            ffmpeg_path: PathBuf::from("sh"),
            codec_args: Vec::new(),
        });
        // sh -y ... 不是合法选项，sh 会在 stderr 报错并以非零退出
        let err = filter
            .apply(Path::new("in.mp3"), "anull", Path::new("out.mp3"))
            .await
            .unwrap_err();

        match err {
            FilterError::ToolFailed { tool, stderr, .. } => {
                assert_eq!(tool, "sh");
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
