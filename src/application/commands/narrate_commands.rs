//! Narrate Commands

use std::path::PathBuf;

use crate::application::ports::VoiceParams;
use crate::domain::narration::NarrationDocument;

/// 从已构建好的全文生成音频
#[derive(Debug, Clone)]
pub struct NarrateText {
    /// 含章节标记的全文
    pub text: String,
    /// 输出文件名（不含目录）
    pub basename: String,
    pub voice: VoiceParams,
}

/// 从旁白文档生成音频（先构建全文）
#[derive(Debug, Clone)]
pub struct NarrateDocument {
    pub document: NarrationDocument,
    pub basename: String,
    pub voice: VoiceParams,
}

/// 任务报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationReport {
    /// 最终产物（开启后处理时为 `clean_` 文件）
    pub output_path: PathBuf,
    pub chapters: usize,
    pub chunks: usize,
    /// 拼接后的字节数
    pub bytes: u64,
    pub post_processed: bool,
}
