//! Text utilities
//!
//! All offsets are UTF-8 byte offsets. Lower-casing is ASCII-only so that
//! offsets in the lower-cased copy line up with the original text.

/// Largest char boundary at or before `index`
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary at or after `index`
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Slice `[start - radius, end + radius)`, clamped and snapped to char boundaries
pub fn slice_around(s: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = floor_char_boundary(s, start.saturating_sub(radius));
    let to = ceil_char_boundary(s, end.saturating_add(radius));
    &s[from..to.max(from)]
}

/// First `max_chars` characters of `s`
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// First `max_chars` characters, with an ellipsis when something was cut
pub fn preview(s: &str, max_chars: usize) -> String {
    let head = truncate_chars(s, max_chars);
    if head.len() < s.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}

/// Collapse every whitespace run to a single space and trim
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into word windows of `window_words` words overlapping by half
pub fn word_windows(text: &str, window_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let window_words = window_words.max(1);
    let step = (window_words / 2).max(1);
    let mut windows = Vec::new();

    let mut start = 0;
    while start < words.len() {
        let end = (start + window_words).min(words.len());
        windows.push(words[start..end].join(" "));
        if start + window_words >= words.len() {
            break;
        }
        start += step;
    }

    windows
}

/// Every (possibly overlapping) occurrence of `needle` in `haystack`
pub fn find_all(haystack: &str, needle: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let Some(first) = needle.chars().next() else {
        return positions;
    };

    let mut start = 0;
    while let Some(found) = haystack[start..].find(needle) {
        let pos = start + found;
        positions.push(pos);
        start = pos + first.len_utf8();
    }
    positions
}

/// Full text of a document with page markers, plus its lower-cased twin
#[derive(Debug, Clone, Default)]
pub struct DocumentText {
    text: String,
    lower: String,
}

impl DocumentText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(page number, text)` pairs
    pub fn from_pages<'a>(pages: impl IntoIterator<Item = (u32, &'a str)>) -> Self {
        let mut doc = Self::new();
        for (number, text) in pages {
            doc.push_page(number, text);
        }
        doc
    }

    /// Append a page; empty pages leave no marker
    pub fn push_page(&mut self, number: u32, text: &str) {
        if text.is_empty() {
            return;
        }
        let appended = format!("\n--- PAGE {number} ---\n{text}\n");
        self.lower.push_str(&appended.to_ascii_lowercase());
        self.text.push_str(&appended);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// ASCII-lower-cased copy with identical offsets
    pub fn lower(&self) -> &str {
        &self.lower
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Occurrences of an already lower-cased needle
    pub fn positions_of(&self, needle_lower: &str) -> Vec<usize> {
        find_all(&self.lower, needle_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_around_respects_char_boundaries() {
        let text = "αβγ theorem δεζ";
        let start = text.find("theorem").unwrap();
        let slice = slice_around(text, start, start + 7, 3);
        assert!(slice.contains("theorem"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n b\tc  "), "a b c");
    }

    #[test]
    fn test_word_windows_overlap() {
        let text = (0..10).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let windows = word_windows(&text, 4);
        assert_eq!(windows[0], "w0 w1 w2 w3");
        assert_eq!(windows[1], "w2 w3 w4 w5");
        assert_eq!(windows.last().unwrap(), "w6 w7 w8 w9");
    }

    #[test]
    fn test_word_windows_short_text() {
        let windows = word_windows("only three words", 800);
        assert_eq!(windows, vec!["only three words".to_string()]);
        assert!(word_windows("", 800).is_empty());
    }

    #[test]
    fn test_find_all_overlapping() {
        assert_eq!(find_all("aaaa", "aa"), vec![0, 1, 2]);
        assert!(find_all("abc", "").is_empty());
    }

    #[test]
    fn test_document_text_pages() {
        let doc = DocumentText::from_pages([(1, "First page"), (2, ""), (3, "Third page")]);
        assert!(doc.as_str().contains("--- PAGE 1 ---\nFirst page"));
        assert!(!doc.as_str().contains("PAGE 2"));
        assert_eq!(doc.lower().len(), doc.as_str().len());
        assert_eq!(doc.positions_of("page").len(), 4);
    }
}
