//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::{PostProcessConfig, RetryPolicy, SynthesisConfig, VoiceParams};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 分章/分块与输出配置
    #[serde(default)]
    pub narration: NarrationConfig,

    /// 合成后端配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 重试配置
    #[serde(default)]
    pub retry: RetryConfig,

    /// 后处理配置
    #[serde(default)]
    pub post_process: PostProcessSettings,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 分章/分块与输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct NarrationConfig {
    /// 章节标记用的词（随译文语言变化）
    #[serde(default = "default_chapter_label")]
    pub chapter_label: String,

    /// 结束语
    #[serde(default = "default_closing_label")]
    pub closing_label: String,

    /// 每块最大字符数
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// 片段与产物所在目录
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// 片段之间插入的填充音频
    #[serde(default)]
    pub filler_path: Option<PathBuf>,
}

fn default_chapter_label() -> String {
    "Chapter".to_string()
}

fn default_closing_label() -> String {
    "The End.".to_string()
}

fn default_max_chunk_size() -> usize {
    2000
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("data/audio")
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            chapter_label: default_chapter_label(),
            closing_label: default_closing_label(),
            max_chunk_size: default_max_chunk_size(),
            work_dir: default_work_dir(),
            filler_path: None,
        }
    }
}

/// 合成后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    #[default]
    OpenAi,
    Deepgram,
    Fake,
}

/// 合成后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub provider: TtsProvider,

    /// 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// 模型名（OpenAI 协议）
    #[serde(default = "default_tts_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 音色 ID
    #[serde(default = "default_voice")]
    pub voice: String,

    /// 语速
    #[serde(default = "default_speed")]
    pub speed: Option<f32>,

    /// 风格/朗读指令
    #[serde(default)]
    pub instructions: Option<String>,

    /// 同时进行的合成调用数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// fake 后端返回的音频文件
    #[serde(default)]
    pub fake_audio_path: Option<PathBuf>,
}

fn default_tts_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_tts_model() -> String {
    "gpt-4o-mini-tts".to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

fn default_voice() -> String {
    "shimmer".to_string()
}

fn default_speed() -> Option<f32> {
    Some(0.9)
}

fn default_max_concurrent() -> usize {
    1
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProvider::default(),
            url: default_tts_url(),
            api_key: None,
            model: default_tts_model(),
            timeout_secs: default_tts_timeout(),
            voice: default_voice(),
            speed: default_speed(),
            instructions: None,
            max_concurrent: default_max_concurrent(),
            fake_audio_path: None,
        }
    }
}

impl TtsConfig {
    /// 透传给后端的音色参数
    pub fn voice_params(&self) -> VoiceParams {
        VoiceParams {
            voice: self.voice.clone(),
            speed: self.speed,
            instructions: self.instructions.clone().filter(|s| !s.trim().is_empty()),
        }
    }
}

/// 重试配置
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// 额外重试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 第一次重试前的等待（毫秒）
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// 退避倍数
    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: f64,

    /// 每次成功调用后的等待（毫秒）
    #[serde(default = "default_inter_call_delay_ms")]
    pub inter_call_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_retry_multiplier() -> f64 {
    1.5
}

fn default_inter_call_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_multiplier: default_retry_multiplier(),
            inter_call_delay_ms: default_inter_call_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn synthesis_config(&self) -> SynthesisConfig {
        SynthesisConfig {
            retry: RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.retry_delay_ms),
                self.retry_multiplier,
            ),
            inter_call_delay: Duration::from_millis(self.inter_call_delay_ms),
        }
    }
}

/// 后处理配置
#[derive(Debug, Clone, Deserialize)]
pub struct PostProcessSettings {
    /// 是否启用（命令行 `--post-process` 也可开启）
    #[serde(default)]
    pub enabled: bool,

    /// ffmpeg 可执行文件
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// 压扩滤镜
    #[serde(default = "default_compand_filter")]
    pub compand_filter: String,

    /// 静音裁剪滤镜
    #[serde(default = "default_silence_filter")]
    pub silence_filter: String,

    /// 输出编码参数
    #[serde(default = "default_codec_args")]
    pub codec_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_compand_filter() -> String {
    PostProcessConfig::default().compand_filter
}

fn default_silence_filter() -> String {
    PostProcessConfig::default().silence_filter
}

fn default_codec_args() -> Vec<String> {
    ["-c:a", "libmp3lame", "-q:a", "0"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for PostProcessSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ffmpeg_path: default_ffmpeg_path(),
            compand_filter: default_compand_filter(),
            silence_filter: default_silence_filter(),
            codec_args: default_codec_args(),
        }
    }
}

impl PostProcessSettings {
    pub fn filters(&self) -> PostProcessConfig {
        PostProcessConfig {
            compand_filter: self.compand_filter.clone(),
            silence_filter: self.silence_filter.clone(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
