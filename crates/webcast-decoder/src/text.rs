//! Text validity heuristics.
//!
//! Mis-aligned protobuf decodes tend to produce strings full of control
//! bytes or fragments of protocol field names. These checks separate such
//! noise from human-authored text.

use std::sync::LazyLock;

use regex::RegexSet;

/// Control-character ratio above which [`is_valid_text`] rejects input.
pub const LENIENT_CONTROL_RATIO: f64 = 0.3;
/// Control-character ratio above which [`is_valid_chat_content`] rejects input.
pub const STRICT_CONTROL_RATIO: f64 = 0.2;
/// Maximum chat content length, in characters.
pub const MAX_CHAT_CHARS: usize = 500;

/// Substrings that only appear when protocol structure leaks into a text field.
static LEAKAGE_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"compress_type",
        r"internal_ext",
        r"pushserver",
        r"wss_ms",
        r"Webcast[A-Za-z]*Message",
    ])
    .expect("leakage patterns are valid")
});

/// Control characters as seen by the heuristics; tab, LF and CR are excluded.
pub fn is_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

fn control_ratio(text: &str) -> (usize, f64) {
    let (total, control) = text.chars().fold((0usize, 0usize), |(t, c), ch| {
        (t + 1, c + usize::from(is_control(ch)))
    });
    if total == 0 {
        return (0, 0.0);
    }
    (total, control as f64 / total as f64)
}

/// At least one letter or digit; CJK ideographs count as letters.
fn has_meaningful_char(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Punctuation that carries meaning on its own in chat ("？？？", "。。。").
fn is_chat_punctuation(c: char) -> bool {
    matches!(
        c,
        '[' | ']'
            | '（'
            | '）'
            | '('
            | ')'
            | '！'
            | '!'
            | '？'
            | '?'
            | '。'
            | '，'
            | ','
            | '、'
            | '：'
            | ':'
            | '；'
            | ';'
            | '"'
            | '\''
            | '“'
            | '”'
            | '‘'
            | '’'
            | '…'
            | '—'
            | '-'
    )
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c.is_control())
}

/// Lenient check used for secondary text (room notices, fans-club notes).
pub fn is_valid_text(text: &str) -> bool {
    let (total, ratio) = control_ratio(text);
    total > 0 && ratio <= LENIENT_CONTROL_RATIO && !is_blank(text) && has_meaningful_char(text)
}

/// Strict check for chat content.
pub fn is_valid_chat_content(text: &str) -> bool {
    let (total, ratio) = control_ratio(text);
    if total == 0 || total > MAX_CHAT_CHARS || ratio > STRICT_CONTROL_RATIO {
        return false;
    }
    !is_blank(text)
        && text
            .chars()
            .any(|c| c.is_alphanumeric() || is_chat_punctuation(c))
        && !LEAKAGE_PATTERNS.is_match(text)
}
