//! Narrator - 长篇旁白文档转有声书
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Narration Context: 旁白文档、章节、文本块
//! - 分章器、分块器、语音文本清洗
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SpeechEngine, FragmentStorage, AudioAssembler, AudioFilter）
//! - Commands: 旁白任务命令及处理器
//! - RetryPolicy / SynthesisClient / PostProcessor
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP/Fake TTS Client, 文件片段存储, 字节拼接, FFmpeg 滤镜

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
