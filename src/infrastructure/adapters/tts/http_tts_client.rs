//! HTTP TTS Client - 调用外部语音合成服务
//!
//! 实现 SpeechEnginePort trait，支持两种后端协议：
//!
//! OpenAI 兼容（也适用于 LiteLLM 代理）:
//! POST {url}/v1/audio/speech
//! Request: {"model": "...", "input": "...", "voice": "...", "instructions": "...", "speed": 0.9, "response_format": "mp3"}
//!
//! Deepgram:
//! POST {url}/v1/speak?model=<voice>&encoding=mp3
//! Request: {"text": "..."}
//!
//! Response: audio/mpeg binary

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SpeechEnginePort, SpeechError, SpeechRequest, SpeechResponse};

/// 输出编码（可按字节拼接）
const AUDIO_FORMAT: &str = "mp3";

/// 后端协议
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechProvider {
    OpenAi,
    Deepgram,
}

/// OpenAI 兼容请求体 (JSON)
#[derive(Debug, Serialize)]
struct OpenAiSpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
    response_format: &'static str,
}

/// Deepgram 请求体 (JSON)，音色和编码走查询参数
#[derive(Debug, Serialize)]
struct DeepgramSpeakRequest<'a> {
    text: &'a str,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    pub provider: SpeechProvider,
    /// 服务基础 URL
    pub base_url: String,
    pub api_key: Option<String>,
    /// 模型名（仅 OpenAI 协议使用）
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            provider: SpeechProvider::OpenAi,
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-4o-mini-tts".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(provider: SpeechProvider, base_url: impl Into<String>) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpeechError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match self.config.provider {
            SpeechProvider::OpenAi => format!("{}/v1/audio/speech", base),
            SpeechProvider::Deepgram => format!("{}/v1/speak", base),
        }
    }

    fn build_request(&self, request: &SpeechRequest<'_>) -> RequestBuilder {
        let api_key = self.config.api_key.as_deref().filter(|k| !k.is_empty());
        let builder = self.client.post(self.endpoint());

        match self.config.provider {
            SpeechProvider::OpenAi => {
                let body = OpenAiSpeechRequest {
                    model: &self.config.model,
                    input: request.text,
                    voice: &request.voice.voice,
                    instructions: request.voice.instructions.as_deref(),
                    speed: request.voice.speed,
                    response_format: AUDIO_FORMAT,
                };
                let builder = builder.json(&body);
                match api_key {
                    Some(key) => builder.bearer_auth(key),
                    None => builder,
                }
            }
            SpeechProvider::Deepgram => {
                let body = DeepgramSpeakRequest { text: request.text };
                let builder = builder
                    .query(&[("model", request.voice.voice.as_str()), ("encoding", AUDIO_FORMAT)])
                    .json(&body);
                match api_key {
                    Some(key) => builder.header(AUTHORIZATION, format!("Token {}", key)),
                    None => builder,
                }
            }
        }
    }
}

#[async_trait]
impl SpeechEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: SpeechRequest<'_>) -> Result<SpeechResponse, SpeechError> {
        tracing::debug!(
            url = %self.endpoint(),
            text_len = request.text.chars().count(),
            voice = %request.voice.voice,
            "Sending speech request"
        );

        let response = self.build_request(&request).send().await.map_err(|e| {
            if e.is_timeout() {
                SpeechError::Timeout
            } else if e.is_connect() {
                SpeechError::NetworkError(format!("Cannot connect to speech service: {}", e))
            } else {
                SpeechError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::from_status(status.as_u16(), error_text));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SpeechError::Timeout
                } else {
                    SpeechError::NetworkError(format!("Failed to read audio: {}", e))
                }
            })?
            .to_vec();

        if audio_data.is_empty() {
            return Err(SpeechError::InvalidResponse("empty audio body".to_string()));
        }

        tracing::debug!(
            audio_size = audio_data.len(),
            content_type = ?content_type,
            "Speech synthesis completed"
        );

        Ok(SpeechResponse {
            audio_data,
            content_type,
        })
    }

    fn name(&self) -> &'static str {
        match self.config.provider {
            SpeechProvider::OpenAi => "openai",
            SpeechProvider::Deepgram => "deepgram",
        }
    }
}
