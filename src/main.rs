//! Narrator - 旁白文档转有声书
//!
//! `narrator <document.json> [--config <file>] [--output <basename>] [--post-process]`

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use narrator::application::{
    NarrateDocument, NarrateHandler, NarrateSettings, NarrateText, PostProcessor,
    SpeechEnginePort, SynthesisClient,
};
use narrator::config::{
    load_config_from_path, print_config, validate_post_process, AppConfig, TtsProvider,
};
use narrator::domain::narration::NarrationDocument;
use narrator::domain::ChunkConfig;
use narrator::infrastructure::adapters::{
    ByteConcatAssembler, FakeTtsClient, FakeTtsClientConfig, FfmpegFilter, FfmpegFilterConfig,
    FileFragmentStorage, HttpTtsClient, HttpTtsClientConfig, SpeechProvider,
};

/// 把章节化的旁白文档合成为一个音频文件
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 旁白文档（JSON）；配合 --plain-text 时为已渲染的全文
    document: PathBuf,

    /// 配置文件路径（默认搜索 narrator.toml / narrator.local.toml）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 输出文件名（默认：文档文件名 + .mp3）
    #[arg(short, long)]
    output: Option<String>,

    /// 拼接后运行压扩与静音裁剪
    #[arg(long)]
    post_process: bool,

    /// 输入是已含章节标记的纯文本
    #[arg(long)]
    plain_text: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let mut config = load_config_from_path(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    if cli.post_process {
        config.post_process.enabled = true;
        validate_post_process(&config)?;
    }

    init_logging(&config);
    print_config(&config);

    let basename = match cli.output {
        Some(name) => name,
        None => default_basename(&cli.document)?,
    };

    let handler = build_handler(&config)?;
    let voice = config.tts.voice_params();

    // Ctrl-C 只在块之间生效
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received interrupt, stopping after the current chunk");
            on_signal.cancel();
        }
    });

    let input = tokio::fs::read_to_string(&cli.document).await?;
    let result = if cli.plain_text {
        handler
            .handle(
                NarrateText {
                    text: input,
                    basename,
                    voice,
                },
                &cancel,
            )
            .await
    } else {
        let document = NarrationDocument::from_json(&input)?;
        handler
            .handle_document(
                NarrateDocument {
                    document,
                    basename,
                    voice,
                },
                &cancel,
            )
            .await
    };

    match result {
        Ok(report) => {
            tracing::info!(
                path = %report.output_path.display(),
                chapters = report.chapters,
                chunks = report.chunks,
                bytes = report.bytes,
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Narration failed");
            Err(e.into())
        }
    }
}

fn init_logging(config: &AppConfig) {
    let log_filter = format!("{},narrator={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn default_basename(document: &Path) -> anyhow::Result<String> {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Cannot derive output name from {:?}", document))?;
    Ok(format!("{}.mp3", stem))
}

fn build_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn SpeechEnginePort>> {
    let tts = &config.tts;
    let provider = match tts.provider {
        TtsProvider::OpenAi => SpeechProvider::OpenAi,
        TtsProvider::Deepgram => SpeechProvider::Deepgram,
        TtsProvider::Fake => {
            let audio_file_path = tts
                .fake_audio_path
                .clone()
                .ok_or_else(|| anyhow::anyhow!("tts.fake_audio_path is not set"))?;
            let engine = FakeTtsClient::new(FakeTtsClientConfig {
                audio_file_path,
                ..Default::default()
            })?;
            return Ok(Arc::new(engine));
        }
    };

    let mut http_config = HttpTtsClientConfig::new(provider, &tts.url)
        .with_model(&tts.model)
        .with_timeout(tts.timeout_secs);
    if let Some(key) = &tts.api_key {
        http_config = http_config.with_api_key(key);
    }
    Ok(Arc::new(HttpTtsClient::new(http_config)?))
}

fn build_handler(config: &AppConfig) -> anyhow::Result<NarrateHandler> {
    let storage = Arc::new(FileFragmentStorage::new(&config.narration.work_dir));
    let synthesis = Arc::new(SynthesisClient::new(
        build_engine(config)?,
        storage.clone(),
        config.retry.synthesis_config(),
    ));

    let settings = NarrateSettings {
        chapter_label: config.narration.chapter_label.clone(),
        closing_label: config.narration.closing_label.clone(),
        chunk: ChunkConfig::new(config.narration.max_chunk_size)?,
        filler_path: config.narration.filler_path.clone(),
        max_concurrent: config.tts.max_concurrent,
    };

    let handler = NarrateHandler::new(
        settings,
        synthesis,
        storage,
        Arc::new(ByteConcatAssembler::new()),
    )?;

    if !config.post_process.enabled {
        return Ok(handler);
    }

    let filter = FfmpegFilter::new(FfmpegFilterConfig {
        ffmpeg_path: config.post_process.ffmpeg_path.clone(),
        codec_args: config.post_process.codec_args.clone(),
    });
    Ok(handler.with_post_processor(PostProcessor::new(
        Arc::new(filter),
        config.post_process.filters(),
    )))
}
