//! Speech Engine Port - 语音合成后端抽象
//!
//! 定义合成后端的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 合成错误
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    /// 后端过载/不可用（HTTP 429、5xx）
    #[error("Service unavailable (HTTP {status}): {message}")]
    ServiceUnavailable { status: u16, message: String },

    /// 后端拒绝请求（参数错误、鉴权失败等）
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SpeechError {
    /// 按 HTTP 状态码分类
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 429 || (500..600).contains(&status) {
            Self::ServiceUnavailable { status, message }
        } else {
            Self::Rejected { status, message }
        }
    }

    /// 是否为暂时性错误（可重试）
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::Timeout | Self::ServiceUnavailable { .. }
        )
    }
}

/// 音色参数，原样透传给后端
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VoiceParams {
    /// 音色 ID（例如 "shimmer"）
    pub voice: String,
    /// 语速
    pub speed: Option<f32>,
    /// 风格/朗读指令
    pub instructions: Option<String>,
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest<'a> {
    /// 要合成的文本
    pub text: &'a str,
    pub voice: &'a VoiceParams,
}

/// 合成响应
#[derive(Debug, Clone)]
pub struct SpeechResponse {
    /// 编码后的音频数据（固定格式，可按字节拼接）
    pub audio_data: Vec<u8>,
    /// 后端返回的 Content-Type
    pub content_type: Option<String>,
}

/// Speech Engine Port
///
/// 外部合成后端的抽象接口；一次调用对应一个文本块
#[async_trait]
pub trait SpeechEnginePort: Send + Sync {
    async fn synthesize(&self, request: SpeechRequest<'_>) -> Result<SpeechResponse, SpeechError>;

    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(SpeechError::from_status(503, "busy").is_transient());
        assert!(SpeechError::from_status(500, "boom").is_transient());
        assert!(SpeechError::from_status(429, "slow down").is_transient());
        assert!(!SpeechError::from_status(400, "bad input").is_transient());
        assert!(!SpeechError::from_status(401, "bad key").is_transient());
    }

    #[test]
    fn test_network_errors_are_transient() {
        assert!(SpeechError::Timeout.is_transient());
        assert!(SpeechError::NetworkError("reset".into()).is_transient());
        assert!(!SpeechError::InvalidResponse("empty".into()).is_transient());
    }
}
