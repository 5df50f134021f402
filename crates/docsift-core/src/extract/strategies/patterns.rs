//! Fixed regex patterns shared by the strategies and discovery.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Label separator left at the start of an anchor-window line
    pub static ref LABEL_PREFIX: Regex = Regex::new(
        r"^(?::|\s*[-–•:]\s*)"
    ).unwrap();

    // Generic "Label: value" / "Label - value" line
    pub static ref KEY_VALUE_LINE: Regex = Regex::new(
        r"^\s*([A-Za-z][A-Za-z0-9 /\-()&]+?)\s*[:\-]\s*(.+?)\s*$"
    ).unwrap();

    pub static ref NON_KEY_CHARS: Regex = Regex::new(
        r"[^a-z0-9]+"
    ).unwrap();

    // US-style money amount: 1,234.56 or 1234.56, optional $
    pub static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"-?\$?\s*(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d{1,2}))?"
    ).unwrap();
}

/// Split text into lines the way a universal-newline reader does.
///
/// Besides `\n`, `\r\n` and `\r` this also breaks on the vertical tab, form
/// feed (page breaks in extracted PDF text), the file/group/record
/// separators, NEL and the Unicode line/paragraph separators. A trailing
/// line break does not produce an empty final line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        let mut end = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                end = j + 1;
            }
        }
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Normalize a free-form label into a snake_case key.
pub fn normalize_key(label: &str) -> String {
    NON_KEY_CHARS
        .replace_all(&label.to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}
