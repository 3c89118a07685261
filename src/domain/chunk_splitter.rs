//! 文本块分割器
//!
//! 把一章文本切成不超过 `max_chunk_size` 个字符（Unicode 标量，不是字节）的块，
//! 优先在句末切分，其次在空白处切分，都找不到时在窗口边缘强制切分。

use super::narration::{ChunkSpec, SegmentationError};

/// 默认最大块字符数
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 2000;

/// 块分割配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    max_chunk_size: usize,
}

impl ChunkConfig {
    pub fn new(max_chunk_size: usize) -> Result<Self, SegmentationError> {
        if max_chunk_size == 0 {
            return Err(SegmentationError::ZeroChunkSize);
        }
        Ok(Self { max_chunk_size })
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

/// 句末标点（总是可以切分）
#[inline]
fn is_sentence_end(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '。' | '！' | '？')
}

/// 句末之后可以跟随的右引号
#[inline]
fn is_closing_quote(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | '\u{201D}' | '\u{2019}' | '»' | '」' | '』'
    )
}

/// 块开头需要去掉的停顿分隔符
#[inline]
fn is_separator_mark(ch: char) -> bool {
    matches!(ch, '.' | '…')
}

/// 切分点及其来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cut {
    /// 句末（含其后的右引号和空白）
    Sentence(usize),
    /// 最后一段空白之后
    Whitespace(usize),
    /// 窗口边缘
    Forced(usize),
}

impl Cut {
    fn position(self) -> usize {
        match self {
            Cut::Sentence(p) | Cut::Whitespace(p) | Cut::Forced(p) => p,
        }
    }
}

/// 反向扫描的状态
#[derive(Debug, Clone, Copy)]
enum Scan {
    /// 还没遇到可用的空白
    Searching,
    /// 已记下窗口内最后一段空白的切分点，继续找更靠前的句末
    HaveWhitespace(usize),
}

fn skip_while(chars: &[char], mut pos: usize, pred: impl Fn(char) -> bool) -> usize {
    while pos < chars.len() && pred(chars[pos]) {
        pos += 1;
    }
    pos
}

/// 在 `[start, end)` 窗口内寻找最佳切分点（`end` 小于文本长度）
fn find_cut(chars: &[char], start: usize, end: usize) -> Cut {
    let mut state = Scan::Searching;

    for k in (start..end).rev() {
        let ch = chars[k];
        if is_sentence_end(ch) {
            // 右引号必须落在窗口内；其后的空白两边都会被去掉，可以截到窗口边缘
            let after_quotes = skip_while(chars, k + 1, is_closing_quote);
            if after_quotes <= end {
                let boundary = skip_while(chars, after_quotes, char::is_whitespace).min(end);
                return Cut::Sentence(boundary);
            }
        } else if ch.is_whitespace() {
            if let Scan::Searching = state {
                state = Scan::HaveWhitespace(k + 1);
            }
        }
    }

    match state {
        Scan::HaveWhitespace(p) => Cut::Whitespace(p),
        Scan::Searching => Cut::Forced(end),
    }
}

/// 清理块文本：去首尾空白、去开头的停顿分隔符、逐行去空白
fn clean_chunk(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_start_matches(is_separator_mark)
        .trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned = trimmed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    Some(cleaned)
}

/// 分割一章文本
///
/// 返回有序、非空、去空白的块；各块拼接后（忽略空白和去掉的分隔符）还原原文
pub fn split_chunks(text: &str, config: &ChunkConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let max = config.max_chunk_size;

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let end = (start + max).min(len);
        let cut = if end == len {
            len
        } else {
            let cut = find_cut(&chars, start, end);
            if let Cut::Forced(p) = cut {
                tracing::debug!(position = p, "No boundary inside window, forcing cut");
            }
            cut.position()
        };

        let raw: String = chars[start..cut].iter().collect();
        if let Some(chunk) = clean_chunk(&raw) {
            chunks.push(chunk);
        }
        start = cut;
    }

    chunks
}

/// 为所有章节生成带坐标的块（章节索引、块索引均从 0 开始且连续）
///
/// 索引按已接受的块计数，被拒的块和没有块的章节都不占位置
pub fn plan_chunks(chapters: &[String], config: &ChunkConfig) -> Vec<ChunkSpec> {
    let mut plan = Vec::new();
    let mut chapter_index = 0;

    for chapter in chapters {
        let chapter_start = plan.len();
        for text in split_chunks(chapter, config) {
            let chunk_index = plan.len() - chapter_start;
            if let Ok(chunk) = ChunkSpec::new(chapter_index, chunk_index, text) {
                plan.push(chunk);
            }
        }
        if plan.len() > chapter_start {
            chapter_index += 1;
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max: usize) -> ChunkConfig {
        ChunkConfig::new(max).unwrap()
    }

    fn strip_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(ChunkConfig::new(0), Err(SegmentationError::ZeroChunkSize));
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_chunks("  Hello world.  ", &config(100));
        assert_eq!(chunks, vec!["Hello world."]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(split_chunks("", &config(10)).is_empty());
        assert!(split_chunks("   \n ", &config(10)).is_empty());
    }

    #[test]
    fn test_prefers_sentence_boundary() {
        let text = "One two. Three four five six";
        let chunks = split_chunks(text, &config(20));
        assert_eq!(chunks, vec!["One two.", "Three four five six"]);
    }

    #[test]
    fn test_sentence_boundary_beats_later_whitespace() {
        // 窗口内最后的空白在 "c" 之前，但句末 "a." 更优先
        let text = "a. bbbbbbb c dddddddd";
        let chunks = split_chunks(text, &config(13));
        assert_eq!(chunks[0], "a.");
    }

    #[test]
    fn test_sentence_boundary_includes_closing_quote() {
        let text = "He said \"Stop!\" and left the room quickly";
        let chunks = split_chunks(text, &config(20));
        assert_eq!(chunks[0], "He said \"Stop!\"");
        assert_eq!(chunks[1], "and left the room");
    }

    #[test]
    fn test_quote_beyond_window_falls_back() {
        // "!" 正好在窗口末尾，右引号落在窗口外：不能用这个句末
        let text = "ab cd \"Stop!\" more words";
        let chunks = split_chunks(text, &config(12));
        assert_eq!(chunks, vec!["ab cd", "\"Stop!\"", "more words"]);
    }

    #[test]
    fn test_sentence_end_exactly_at_window_edge() {
        let text = "Hello there. Next";
        let chunks = split_chunks(text, &config(12));
        assert_eq!(chunks, vec!["Hello there.", "Next"]);
    }

    #[test]
    fn test_whitespace_fallback() {
        let text = "alpha beta gamma delta";
        let chunks = split_chunks(text, &config(12));
        assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_forced_cut_for_long_token() {
        let text = "abcdefghij klm";
        let chunks = split_chunks(text, &config(4));
        assert_eq!(chunks, vec!["abcd", "efgh", "ij", "klm"]);
    }

    #[test]
    fn test_multibyte_characters_counted_as_chars() {
        let text = "Привет мир. Как дела? Всё хорошо!";
        let chunks = split_chunks(text, &config(12));
        assert_eq!(chunks, vec!["Привет мир.", "Как дела?", "Всё хорошо!"]);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 12);
        }
    }

    #[test]
    fn test_cjk_sentence_end() {
        let text = "斗之力，三段！望着测验魔石碑";
        let chunks = split_chunks(text, &config(8));
        assert_eq!(chunks[0], "斗之力，三段！");
    }

    #[test]
    fn test_leading_separator_stripped() {
        let text = "...\n\nChapter 2.\nSecond part.";
        let chunks = split_chunks(text, &config(1000));
        assert_eq!(chunks, vec!["Chapter 2.\nSecond part."]);
    }

    #[test]
    fn test_lines_trimmed_inside_chunk() {
        let chunks = split_chunks("First line.   \n   Second line.", &config(100));
        assert_eq!(chunks, vec!["First line.\nSecond line."]);
    }

    #[test]
    fn test_no_chunk_exceeds_max() {
        let text = "It was late. \"Go home!\" she cried. Nobody moved… The supercalifragilistic \
                    word appeared. Ещё одно предложение здесь! 然后呢？ End";
        for max in 1..=40 {
            let chunks = split_chunks(text, &config(max));
            assert!(!chunks.is_empty());
            for chunk in &chunks {
                assert!(
                    chunk.chars().count() <= max,
                    "chunk {:?} exceeds {}",
                    chunk,
                    max
                );
                assert!(!chunk.is_empty());
            }
        }
    }

    #[test]
    fn test_rejoined_chunks_reproduce_text() {
        let text = "The fox ran. The river was wide!\nShe asked, \"Why?\" He smiled.\n\
                    Then they walked home together under the stars";
        for max in [5, 9, 16, 33, 100] {
            let chunks = split_chunks(text, &config(max));
            assert_eq!(strip_ws(&chunks.concat()), strip_ws(text), "max = {}", max);
        }
    }

    #[test]
    fn test_plan_chunks_is_gapless() {
        let chapters = vec![
            "One. Two. Three.".to_string(),
            "...".to_string(),
            "Four. Five.".to_string(),
        ];
        let plan = plan_chunks(&chapters, &config(6));
        let keys: Vec<_> = plan.iter().map(ChunkSpec::key).collect();
        assert_eq!(keys, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)]);
        assert_eq!(plan[3].text(), "Four.");
    }

    #[test]
    fn test_plan_indices_are_contiguous() {
        let chapters = vec![
            "...\nIt was late. \"Go home!\" she cried.".to_string(),
            "   ".to_string(),
            "...".to_string(),
            "Nobody moved. The supercalifragilistic word appeared.".to_string(),
        ];
        for max in 1..=30 {
            let plan = plan_chunks(&chapters, &config(max));
            let mut expected = (0, 0);
            for (position, chunk) in plan.iter().enumerate() {
                if position > 0 && chunk.chunk_index() == 0 {
                    expected = (expected.0 + 1, 0);
                }
                assert_eq!(chunk.key(), expected, "max = {}", max);
                expected.1 += 1;
            }
            assert_eq!(plan.last().map(ChunkSpec::chapter_index), Some(1));
        }
    }
}
