//! 章节分割器
//!
//! 按 `<label> <N>.`（N ≥ 2）章节标记把完整旁白切成有序的章节文本。
//! 第 1 章没有显式标记，即第一个标记之前的全部内容。
//!
//! 已知限制：标记只要位于行首就会被当成章节边界，出现在对白中的同样文本无法区分。

use regex::Regex;

use super::narration::SegmentationError;

/// 默认章节标签
pub const DEFAULT_CHAPTER_LABEL: &str = "Chapter";

/// 章节分割器
#[derive(Debug, Clone)]
pub struct ChapterSegmenter {
    marker: Regex,
}

impl ChapterSegmenter {
    /// 根据章节标签创建（标签随翻译语言变化，例如 "Kapitel"）
    pub fn new(chapter_label: &str) -> Result<Self, SegmentationError> {
        let label = chapter_label.trim();
        if label.is_empty() {
            return Err(SegmentationError::InvalidChapterLabel(
                chapter_label.to_string(),
            ));
        }

        // 边界从标记所在行之前的换行开始；允许前面紧跟一行 "..." 分隔符
        let pattern = format!(
            r"\n(?:\.\.\.\n)?\s*{} (?:[2-9]|[1-9][0-9]+)\.",
            regex::escape(label)
        );
        let marker = Regex::new(&pattern)
            .map_err(|e| SegmentationError::InvalidChapterLabel(e.to_string()))?;

        Ok(Self { marker })
    }

    /// 分割完整旁白文本
    ///
    /// 返回去除首尾空白后的非空章节文本；没有标记时整段文本即第 1 章
    pub fn split(&self, text: &str) -> Result<Vec<String>, SegmentationError> {
        if text.trim().is_empty() {
            return Err(SegmentationError::EmptyInput);
        }

        let mut chapters = Vec::new();
        let mut start = 0;
        for marker in self.marker.find_iter(text) {
            push_trimmed(&mut chapters, &text[start..marker.start()]);
            start = marker.start();
        }
        push_trimmed(&mut chapters, &text[start..]);

        if chapters.is_empty() {
            return Err(SegmentationError::NoContent);
        }

        tracing::debug!(chapters = chapters.len(), "Split narration into chapters");
        Ok(chapters)
    }
}

fn push_trimmed(chapters: &mut Vec<String>, segment: &str) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        chapters.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> ChapterSegmenter {
        ChapterSegmenter::new(DEFAULT_CHAPTER_LABEL).unwrap()
    }

    #[test]
    fn test_no_markers_returns_trimmed_input() {
        let chapters = segmenter().split("  \n Once upon a time. Chapter 2 never came.\n").unwrap();
        assert_eq!(chapters, vec!["Once upon a time. Chapter 2 never came."]);
    }

    #[test]
    fn test_three_parts() {
        let text = "Intro text.\n\nChapter 2.\nMiddle text.\n\nChapter 3.\nFinal text.";
        let chapters = segmenter().split(text).unwrap();
        assert_eq!(
            chapters,
            vec![
                "Intro text.",
                "Chapter 2.\nMiddle text.",
                "Chapter 3.\nFinal text.",
            ]
        );
    }

    #[test]
    fn test_hello_world_example() {
        let text = "Hello world. This is great!\n\nChapter 2.\nSecond part.";
        let chapters = segmenter().split(text).unwrap();
        assert_eq!(
            chapters,
            vec!["Hello world. This is great!", "Chapter 2.\nSecond part."]
        );
    }

    #[test]
    fn test_separator_line_belongs_to_next_chapter() {
        let text = "Title\n\n...\n\nChapter 1.\nOne.\n\nFirst.\n\n...\n\nChapter 2.\nTwo.\n\nSecond.";
        let chapters = segmenter().split(text).unwrap();
        assert_eq!(chapters.len(), 2);
        assert!(chapters[0].ends_with("First."));
        assert!(chapters[1].starts_with("...\n\nChapter 2."));
    }

    #[test]
    fn test_chapter_one_marker_is_not_a_boundary() {
        let text = "Title\n\nChapter 1.\nOne.";
        assert_eq!(segmenter().split(text).unwrap().len(), 1);
    }

    #[test]
    fn test_two_digit_chapter_numbers() {
        let text = "Nine.\nChapter 10.\nTen.\nChapter 11.\nEleven.";
        let chapters = segmenter().split(text).unwrap();
        assert_eq!(chapters, vec!["Nine.", "Chapter 10.\nTen.", "Chapter 11.\nEleven."]);
    }

    #[test]
    fn test_translated_label() {
        let segmenter = ChapterSegmenter::new("Глава").unwrap();
        let chapters = segmenter.split("Первая.\nГлава 2.\nВторая.").unwrap();
        assert_eq!(chapters, vec!["Первая.", "Глава 2.\nВторая."]);
    }

    #[test]
    fn test_label_is_escaped() {
        let segmenter = ChapterSegmenter::new("Ch.").unwrap();
        let chapters = segmenter.split("One.\nChX 2.\nStill one.\nCh. 2.\nTwo.").unwrap();
        assert_eq!(chapters, vec!["One.\nChX 2.\nStill one.", "Ch. 2.\nTwo."]);
    }

    #[test]
    fn test_empty_input_is_error() {
        assert_eq!(segmenter().split(" \n\t "), Err(SegmentationError::EmptyInput));
    }

    #[test]
    fn test_empty_label_is_error() {
        assert!(ChapterSegmenter::new("  ").is_err());
    }
}
