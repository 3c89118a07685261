//! Narrate Command Handler
//!
//! 分章 → 分块 → 逐块合成 → 拼接 → （可选）后处理。
//! 任何一块失败都会让整个任务失败，并清理已写出的片段。

use futures_util::stream::{self, StreamExt};
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::commands::{NarrateDocument, NarrateText, NarrationReport};
use crate::application::error::NarrationError;
use crate::application::ports::{
    validate_basename, AudioAssemblerPort, FragmentStoragePort, VoiceParams,
};
use crate::application::post_processor::PostProcessor;
use crate::application::synthesis_client::SynthesisClient;
use crate::domain::narration::{ChunkSpec, SegmentationError};
use crate::domain::{plan_chunks, ChapterSegmenter, ChunkConfig, DEFAULT_CHAPTER_LABEL};

/// 任务参数
#[derive(Debug, Clone)]
pub struct NarrateSettings {
    /// 章节标记用的词（随译文语言变化）
    pub chapter_label: String,
    /// 文档未指定结束语时使用
    pub closing_label: String,
    pub chunk: ChunkConfig,
    /// 片段之间插入的填充音频
    pub filler_path: Option<PathBuf>,
    /// 同时进行的合成调用数；1 表示严格顺序
    pub max_concurrent: usize,
}

impl Default for NarrateSettings {
    fn default() -> Self {
        Self {
            chapter_label: DEFAULT_CHAPTER_LABEL.to_string(),
            closing_label: "The End.".to_string(),
            chunk: ChunkConfig::default(),
            filler_path: None,
            max_concurrent: 1,
        }
    }
}

/// NarrateHandler - 执行一次完整的旁白任务
pub struct NarrateHandler {
    settings: NarrateSettings,
    segmenter: ChapterSegmenter,
    synthesis: Arc<SynthesisClient>,
    storage: Arc<dyn FragmentStoragePort>,
    assembler: Arc<dyn AudioAssemblerPort>,
    post_processor: Option<PostProcessor>,
}

impl NarrateHandler {
    pub fn new(
        settings: NarrateSettings,
        synthesis: Arc<SynthesisClient>,
        storage: Arc<dyn FragmentStoragePort>,
        assembler: Arc<dyn AudioAssemblerPort>,
    ) -> Result<Self, NarrationError> {
        let segmenter = ChapterSegmenter::new(&settings.chapter_label)?;
        Ok(Self {
            settings,
            segmenter,
            synthesis,
            storage,
            assembler,
            post_processor: None,
        })
    }

    /// 启用后处理
    pub fn with_post_processor(mut self, post_processor: PostProcessor) -> Self {
        self.post_processor = Some(post_processor);
        self
    }

    /// 从文档渲染全文后执行
    pub async fn handle_document(
        &self,
        command: NarrateDocument,
        cancel: &CancellationToken,
    ) -> Result<NarrationReport, NarrationError> {
        let text = command
            .document
            .build_content(&self.settings.chapter_label, &self.settings.closing_label);

        self.handle(
            NarrateText {
                text,
                basename: command.basename,
                voice: command.voice,
            },
            cancel,
        )
        .await
    }

    pub async fn handle(
        &self,
        command: NarrateText,
        cancel: &CancellationToken,
    ) -> Result<NarrationReport, NarrationError> {
        let job_id = Uuid::new_v4();
        let span = tracing::info_span!("narration", job_id = %job_id, basename = %command.basename);
        self.run(command, cancel).instrument(span).await
    }

    async fn run(
        &self,
        command: NarrateText,
        cancel: &CancellationToken,
    ) -> Result<NarrationReport, NarrationError> {
        validate_basename(&command.basename)
            .map_err(|e| NarrationError::invalid_request(e.to_string()))?;

        let chapters = self.segmenter.split(&command.text)?;
        let plan = plan_chunks(&chapters, &self.settings.chunk);
        let chapter_count = match plan.last() {
            Some(last) => last.chapter_index() + 1,
            None => return Err(SegmentationError::NoContent.into()),
        };

        tracing::info!(
            chapters = chapter_count,
            chunks = plan.len(),
            max_chunk_size = self.settings.chunk.max_chunk_size(),
            work_dir = %self.storage.work_dir().display(),
            "Narration planned"
        );

        let targets: Vec<PathBuf> = plan
            .iter()
            .map(|chunk| {
                self.storage.fragment_path(
                    chunk.chapter_index(),
                    chunk.chunk_index(),
                    &command.basename,
                )
            })
            .collect();

        let fragments = match self
            .synthesize_all(&plan, &targets, &command.voice, cancel)
            .await
        {
            Ok(fragments) => fragments,
            Err(e) => {
                let removed = self.storage.remove_files(&targets).await;
                tracing::warn!(removed, error = %e, "Narration aborted, fragments removed");
                return Err(e);
            }
        };

        let output = self.storage.output_path(&command.basename);
        let outcome = match self
            .assembler
            .join(&fragments, self.settings.filler_path.as_deref(), &output)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.storage.remove_files(&fragments).await;
                return Err(e.into());
            }
        };

        let (output_path, post_processed) = match &self.post_processor {
            Some(processor) => (processor.process(&output).await?, true),
            None => (output, false),
        };

        let report = NarrationReport {
            output_path,
            chapters: chapter_count,
            chunks: plan.len(),
            bytes: outcome.bytes_written,
            post_processed,
        };

        tracing::info!(
            path = %report.output_path.display(),
            chapters = report.chapters,
            chunks = report.chunks,
            bytes = report.bytes,
            post_processed,
            "Narration finished"
        );

        Ok(report)
    }

    /// 按 (chapter, chunk) 顺序返回片段路径；并发时仍按顺序收集
    ///
    /// 出错或取消后不再发起新的调用，但会等已在进行的调用结束，
    /// 这样调用方清理时不会有片段在之后才落盘
    async fn synthesize_all(
        &self,
        plan: &[ChunkSpec],
        targets: &[PathBuf],
        voice: &VoiceParams,
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>, NarrationError> {
        let abort = cancel.child_token();
        let aborted = &abort;
        let results = stream::iter(plan.iter().zip(targets))
            .map(move |(chunk, target)| async move {
                // 只在派发前检查，不打断进行中的调用
                if aborted.is_cancelled() {
                    return Err(NarrationError::Cancelled);
                }
                Ok(self.synthesis.convert(chunk, voice, target).await?)
            })
            .buffered(self.settings.max_concurrent.max(1));
        let mut results = pin!(results);

        let mut fragments = Vec::with_capacity(plan.len());
        let mut failure = None;
        while let Some(result) = results.next().await {
            match result {
                Ok(path) => fragments.push(path),
                Err(e) if failure.is_none() => {
                    abort.cancel();
                    failure = Some(e);
                }
                Err(_) => {}
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(fragments),
        }
    }
}
