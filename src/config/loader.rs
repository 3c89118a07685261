//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（narrator.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, TtsProvider};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["narrator", "narrator.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "NARRATOR";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `NARRATOR_`，层级分隔符 `__`）
/// 2. 配置文件（narrator.toml 或 narrator.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `NARRATOR_TTS__PROVIDER=deepgram`
/// - `NARRATOR_TTS__API_KEY=sk-...`
/// - `NARRATOR_NARRATION__MAX_CHUNK_SIZE=1500`
/// - `NARRATOR_RETRY__MAX_RETRIES=5`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("narration.chapter_label", "Chapter")?
        .set_default("narration.closing_label", "The End.")?
        .set_default("narration.max_chunk_size", 2000)?
        .set_default("narration.work_dir", "data/audio")?
        .set_default("tts.provider", "openai")?
        .set_default("tts.url", "https://api.openai.com")?
        .set_default("tts.model", "gpt-4o-mini-tts")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("tts.voice", "shimmer")?
        .set_default("tts.max_concurrent", 1)?
        .set_default("retry.max_retries", 3)?
        .set_default("retry.retry_delay_ms", 2000)?
        .set_default("retry.retry_multiplier", 1.5)?
        .set_default("retry.inter_call_delay_ms", 1000)?
        .set_default("post_process.enabled", false)?
        .set_default("post_process.ffmpeg_path", "ffmpeg")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: NARRATOR_TTS__URL=http://litellm:4000
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |message: &str| Err(ConfigError::ValidationError(message.to_string()));

    if config.narration.max_chunk_size == 0 {
        return invalid("narration.max_chunk_size must be greater than 0");
    }

    if config.narration.chapter_label.trim().is_empty() {
        return invalid("narration.chapter_label cannot be empty");
    }

    let multiplier = config.retry.retry_multiplier;
    if !multiplier.is_finite() || multiplier < 1.0 {
        return invalid("retry.retry_multiplier must be a finite number >= 1.0");
    }

    if config.tts.max_concurrent == 0 {
        return invalid("tts.max_concurrent must be greater than 0");
    }

    match config.tts.provider {
        TtsProvider::OpenAi | TtsProvider::Deepgram if config.tts.url.trim().is_empty() => {
            return invalid("tts.url cannot be empty");
        }
        TtsProvider::Fake if config.tts.fake_audio_path.is_none() => {
            return invalid("tts.fake_audio_path is required for the fake provider");
        }
        _ => {}
    }

    if config.post_process.enabled {
        validate_post_process(config)?;
    }

    Ok(())
}

/// 后处理开启时的校验（命令行开启后处理时也会调用）
pub fn validate_post_process(config: &AppConfig) -> Result<(), ConfigError> {
    let settings = &config.post_process;
    if settings.compand_filter.trim().is_empty() || settings.silence_filter.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "post_process filters cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Narrator Configuration ===");
    tracing::info!("Chapter Label: {}", config.narration.chapter_label);
    tracing::info!("Max Chunk Size: {}", config.narration.max_chunk_size);
    tracing::info!("Work Directory: {:?}", config.narration.work_dir);
    if let Some(filler) = &config.narration.filler_path {
        tracing::info!("Filler: {:?}", filler);
    }
    tracing::info!("TTS Provider: {:?}", config.tts.provider);
    tracing::info!("TTS URL: {}", config.tts.url);
    tracing::info!("TTS Voice: {}", config.tts.voice);
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!("TTS Max Concurrent: {}", config.tts.max_concurrent);
    tracing::info!(
        "Retry: {} retries, {}ms initial delay, x{}",
        config.retry.max_retries,
        config.retry.retry_delay_ms,
        config.retry.retry_multiplier
    );
    tracing::info!("Post-Process Enabled: {}", config.post_process.enabled);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("==============================");
}
