//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_assembler;
mod audio_filter;
mod fragment_storage;
mod speech_engine;

pub use audio_assembler::{AssemblyError, AssemblyOutcome, AudioAssemblerPort};
pub use audio_filter::{AudioFilterPort, FilterError};
pub use fragment_storage::{validate_basename, FragmentStorageError, FragmentStoragePort};
pub use speech_engine::{SpeechEnginePort, SpeechError, SpeechRequest, SpeechResponse, VoiceParams};
