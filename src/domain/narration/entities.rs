//! Narration Context - Entities

use serde::{Deserialize, Serialize};

/// 章节 - 由内容生成方提供，核心流程内只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// 章节编号（从 1 开始）
    number: usize,
    /// 章节标题
    #[serde(default)]
    title: String,
    /// 章节正文
    #[serde(default)]
    text: String,
}

impl Chapter {
    pub fn new(number: usize, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// 文本块 - 一次合成请求的最小单位
///
/// 不变量:
/// - 排序键为 (chapter_index, chunk_index)，同一章节内连续无间隔
/// - text 不可为空
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkSpec {
    /// 章节索引（从 0 开始）
    chapter_index: usize,
    /// 章节内的块索引（从 0 开始）
    chunk_index: usize,
    /// 块文本
    text: String,
}

impl ChunkSpec {
    pub fn new(chapter_index: usize, chunk_index: usize, text: String) -> Result<Self, &'static str> {
        if text.trim().is_empty() {
            return Err("chunk text must not be empty");
        }
        Ok(Self {
            chapter_index,
            chunk_index,
            text,
        })
    }

    pub fn chapter_index(&self) -> usize {
        self.chapter_index
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 排序键
    pub fn key(&self) -> (usize, usize) {
        (self.chapter_index, self.chunk_index)
    }
}
