//! Reduce an HTML or plain-text page to trimmed, non-empty text lines.

use regex::Regex;
use std::sync::LazyLock;

static COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static SCRIPT_STYLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>").unwrap()
});

static LINE_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|pre|tr|li|h[1-6]|table|center)\s*>").unwrap()
});

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r]+").unwrap());

pub fn page_lines(raw: &str) -> Vec<String> {
    let text = COMMENT_REGEX.replace_all(raw, "");
    let text = SCRIPT_STYLE_REGEX.replace_all(&text, "");
    let text = LINE_BREAK_REGEX.replace_all(&text, "\n");
    let text = TAG_REGEX.replace_all(&text, " ");
    let text = html_escape::decode_html_entities(&text).replace('\u{a0}', " ");

    text.lines()
        .map(|line| WHITESPACE_REGEX.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect()
}
