//! Fake TTS Client - 用于演练和测试的合成后端
//!
//! 始终返回固定的音频文件，不实际调用合成服务

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::ports::{SpeechEnginePort, SpeechError, SpeechRequest, SpeechResponse};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 固定返回的音频文件路径
    pub audio_file_path: PathBuf,
    /// 模拟的合成延迟
    pub delay: Duration,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            audio_file_path: PathBuf::from("data/fake.mp3"),
            delay: Duration::from_millis(200),
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    delay: Duration,
    /// 缓存的音频数据
    audio_data: Vec<u8>,
}

impl FakeTtsClient {
    /// 读取配置的音频文件
    pub fn new(config: FakeTtsClientConfig) -> Result<Self, std::io::Error> {
        let audio_data = std::fs::read(&config.audio_file_path)?;
        tracing::info!(
            path = %config.audio_file_path.display(),
            bytes = audio_data.len(),
            "FakeTtsClient initialized"
        );
        Ok(Self::from_bytes(audio_data, config.delay))
    }

    pub fn from_bytes(audio_data: Vec<u8>, delay: Duration) -> Self {
        Self { delay, audio_data }
    }
}

#[async_trait]
impl SpeechEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: SpeechRequest<'_>) -> Result<SpeechResponse, SpeechError> {
        tracing::debug!(
            text_len = request.text.chars().count(),
            voice = %request.voice.voice,
            "FakeTtsClient: returning fixed audio"
        );

        // 模拟合成延迟
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(SpeechResponse {
            audio_data: self.audio_data.clone(),
            content_type: Some("audio/mpeg".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
