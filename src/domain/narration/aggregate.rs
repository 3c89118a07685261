//! Narration Context - Aggregate Root

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::entities::Chapter;
use super::errors::DocumentError;
use crate::domain::speech_text::sanitize_for_speech;

/// 块之间的停顿分隔符
pub const SEPARATOR: &str = "...";

/// 正文开头查找重复标题时允许的额外字符数
const TITLE_SCAN_SLACK: usize = 20;

/// 旁白文档（聚合根）
///
/// 由外部内容生成方持有，核心流程只消费它渲染出的全文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationDocument {
    title: String,
    chapters: Vec<Chapter>,
    /// 结束语，例如 "The End."；缺省时使用配置值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    closing_label: Option<String>,
}

impl NarrationDocument {
    pub fn new(
        title: impl Into<String>,
        chapters: Vec<Chapter>,
        closing_label: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            chapters,
            closing_label,
        }
    }

    /// 从内容生成方持久化的 JSON 解析
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let document: Self = serde_json::from_str(json)?;
        if document.chapters.is_empty() {
            return Err(DocumentError::NoChapters);
        }
        Ok(document)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn closing_label(&self) -> Option<&str> {
        self.closing_label.as_deref()
    }

    /// 渲染完整旁白文本
    ///
    /// 结构：标题、`...`、每章 `"<label> <N>.\n<title>."` + 正文（章之间以 `...` 分隔）、
    /// `...`、结束语。各块之间以空行连接，最后做语音清洗。
    pub fn build_content(&self, chapter_label: &str, default_closing: &str) -> String {
        let mut blocks: Vec<String> = Vec::new();

        let title = strip_markdown(&self.title);
        let title = title.trim();
        let title = title.strip_prefix("Title:").unwrap_or(title).trim();
        if !title.is_empty() {
            blocks.push(title.to_string());
            blocks.push(SEPARATOR.to_string());
        }

        let count = self.chapters.len();
        for (i, chapter) in self.chapters.iter().enumerate() {
            blocks.push(chapter_header(chapter_label, chapter));

            let body = strip_markdown(strip_leading_title(chapter.text(), chapter.title()));
            let body = collapse_blank_lines(&body);
            let body = body.trim();
            if !body.is_empty() {
                blocks.push(body.to_string());
            }

            if i + 1 < count {
                blocks.push(SEPARATOR.to_string());
            }
        }

        blocks.push(SEPARATOR.to_string());
        blocks.push(
            self.closing_label
                .as_deref()
                .unwrap_or(default_closing)
                .to_string(),
        );

        sanitize_for_speech(&blocks.join("\n\n"))
    }
}

fn chapter_header(chapter_label: &str, chapter: &Chapter) -> String {
    let title = strip_markdown(chapter.title());
    let title = title
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '?' | '!' | ':' | ';' | ','));
    if title.is_empty() {
        format!("{} {}.", chapter_label, chapter.number())
    } else {
        format!("{} {}.\n{}.", chapter_label, chapter.number(), title)
    }
}

fn strip_markdown(text: &str) -> String {
    text.replace(&['*', '#'][..], "")
}

fn collapse_blank_lines(text: &str) -> String {
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    let re = BLANK_LINES.get_or_init(|| Regex::new(r"\n{2,}").expect("static regex"));
    re.replace_all(&text.replace("\r\n", "\n"), "\n").into_owned()
}

/// 小写字母数字，单词之间以单个空格分隔
fn normalize_for_comparison(text: &str) -> String {
    let mut out = String::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// 去掉正文开头重复出现的章节标题（例如 "Chapter 1: The Forest" 再次出现在正文首行）
fn strip_leading_title<'a>(text: &'a str, title: &str) -> &'a str {
    let text = text.trim();
    let wanted = normalize_for_comparison(title);
    if wanted.is_empty() {
        return text;
    }

    let limit = wanted.chars().count() + TITLE_SCAN_SLACK;
    let mut prefix = String::new();
    let mut last_was_space = true;

    for (idx, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            prefix.extend(ch.to_lowercase());
            last_was_space = false;

            let rest = &text[idx + ch.len_utf8()..];
            let at_word_end = rest.chars().next().map_or(true, |c| !c.is_alphanumeric());
            if at_word_end && prefix.ends_with(&wanted) {
                let head = &prefix[..prefix.len() - wanted.len()];
                if head.is_empty() || head.ends_with(' ') {
                    return rest.trim_start_matches(|c: char| {
                        c.is_whitespace() || matches!(c, ':' | '.' | '-' | '#' | '*')
                    });
                }
            }
        } else if !last_was_space {
            prefix.push(' ');
            last_was_space = true;
        }

        if prefix.chars().count() > limit {
            break;
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NarrationDocument {
        NarrationDocument::new(
            "Title: **The Brave Fox**",
            vec![
                Chapter::new(1, "The Forest", "The Forest\n\nA fox lived here.\n\n\nIt was brave."),
                Chapter::new(2, "The River!", "The fox found a river."),
            ],
            None,
        )
    }

    #[test]
    fn test_build_content_layout() {
        let content = sample().build_content("Chapter", "The End.");
        assert_eq!(
            content,
            "The Brave Fox\n\n...\n\nChapter 1.\nThe Forest.\n\nA fox lived here.\nIt was brave.\n\n...\n\nChapter 2.\nThe River.\n\nThe fox found a river.\n\n...\n\nThe End."
        );
    }

    #[test]
    fn test_document_closing_label_overrides_default() {
        let doc = NarrationDocument::new(
            "",
            vec![Chapter::new(1, "", "Hallo.")],
            Some("Ende.".to_string()),
        );
        let content = doc.build_content("Kapitel", "The End.");
        assert_eq!(content, "Kapitel 1.\n\nHallo.\n\n...\n\nEnde.");
    }

    #[test]
    fn test_strip_leading_title_with_chapter_prefix() {
        let text = "Chapter 1: The Forest\nA fox lived here.";
        assert_eq!(strip_leading_title(text, "The Forest"), "A fox lived here.");
    }

    #[test]
    fn test_strip_leading_title_requires_word_boundary() {
        let text = "The Forestry office was closed.";
        assert_eq!(strip_leading_title(text, "The Forest"), text);
    }

    #[test]
    fn test_strip_leading_title_absent() {
        let text = "Once upon a time.";
        assert_eq!(strip_leading_title(text, "The Forest"), text);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "title": "Story",
            "chapters": [{"number": 1, "title": "One", "text": "Body."}],
            "summary": "ignored"
        }"#;
        let doc = NarrationDocument::from_json(json).unwrap();
        assert_eq!(doc.title(), "Story");
        assert_eq!(doc.chapters().len(), 1);
        assert_eq!(doc.closing_label(), None);
    }

    #[test]
    fn test_from_json_without_chapters() {
        let json = r#"{"title": "Story", "chapters": []}"#;
        assert!(matches!(
            NarrationDocument::from_json(json),
            Err(DocumentError::NoChapters)
        ));
    }
}
