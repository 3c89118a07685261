//! Domain Layer - 领域层
//!
//! - Narration Context: 旁白文档与文本块
//! - 章节分割器、文本块分割器、语音文本清洗

pub mod narration;

mod chapter_segmenter;
mod chunk_splitter;
mod speech_text;

pub use chapter_segmenter::{ChapterSegmenter, DEFAULT_CHAPTER_LABEL};
pub use chunk_splitter::{plan_chunks, split_chunks, ChunkConfig, DEFAULT_MAX_CHUNK_SIZE};
pub use speech_text::sanitize_for_speech;
