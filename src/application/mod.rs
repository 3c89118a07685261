//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechEngine、FragmentStorage、AudioAssembler、AudioFilter）
//! - commands: 旁白命令及处理器
//! - retry: 通用重试策略
//! - synthesis_client: 单块合成
//! - post_processor: 拼接后的滤镜
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod post_processor;
pub mod retry;
pub mod synthesis_client;

// Re-exports
pub use commands::{
    handlers::{NarrateHandler, NarrateSettings},
    NarrateDocument, NarrateText, NarrationReport,
};

pub use error::NarrationError;

pub use ports::{
    validate_basename, AssemblyError, AssemblyOutcome, AudioAssemblerPort, AudioFilterPort,
    FilterError, FragmentStorageError, FragmentStoragePort, SpeechEnginePort, SpeechError,
    SpeechRequest, SpeechResponse, VoiceParams,
};

pub use post_processor::{FilterStage, PostProcessConfig, PostProcessError, PostProcessor};
pub use retry::{RetryExhausted, RetryPolicy};
pub use synthesis_client::{SynthesisClient, SynthesisConfig, SynthesisError, SynthesisFailure};
