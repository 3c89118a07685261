//! 语音文本清洗
//!
//! 去掉合成后端会读错或读出怪声的字符（emoji、符号、变体选择符、组合附加符号）

use regex::Regex;
use std::sync::OnceLock;

fn unspeakable() -> &'static Regex {
    static UNSPEAKABLE: OnceLock<Regex> = OnceLock::new();
    UNSPEAKABLE.get_or_init(|| {
        Regex::new(concat!(
            r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}",
            r"\x{2600}-\x{26FF}\x{2700}-\x{27BF}\x{1F900}-\x{1F9FF}\x{1FA70}-\x{1FAFF}",
            r"\x{1F004}-\x{1F0CF}\x{FE00}-\x{FE0F}\x{0300}-\x{036F}\x{20D0}-\x{20FF}]",
        ))
        .expect("static regex")
    })
}

#[inline]
fn is_zero_width(ch: char) -> bool {
    matches!(ch, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}')
}

/// 清洗旁白文本
///
/// 换行保留（章节标记依赖行首位置），行内连续空白压缩为单个空格，每行首尾空白去掉。
pub fn sanitize_for_speech(text: &str) -> String {
    let cleaned = unspeakable().replace_all(text, "");
    let cleaned: String = cleaned
        .chars()
        .map(|c| if is_zero_width(c) { ' ' } else { c })
        .collect();

    cleaned
        .replace("\r\n", "\n")
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
