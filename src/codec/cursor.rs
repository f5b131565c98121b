//! Line cursor over exchange-format text.
//!
//! Content lines are the lines that are neither blank nor comments (first
//! non-space character `#`). Extension bodies are read raw, so comments inside
//! them survive.

use crate::utils::errors::{FormatError, FormatErrorKind, ScopResult};

/// A content line: 1-based line number and text with surrounding spaces trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    /// The text before any trailing `#` comment.
    pub fn data(&self) -> &'a str {
        strip_comment(self.text)
    }

    /// Whitespace separated tokens of the data part.
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> {
        self.data().split_whitespace()
    }

    /// The line as a single integer, if it is one.
    pub fn single_integer(&self) -> Option<i64> {
        let mut tokens = self.tokens();
        let value = tokens.next()?.parse().ok()?;
        match tokens.next() {
            Some(_) => None,
            None => Some(value),
        }
    }
}

/// Text before the first `#`.
pub fn strip_comment(text: &str) -> &str {
    match text.find('#') {
        Some(pos) => &text[..pos],
        None => text,
    }
}

fn is_content(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Cursor over the lines of a text buffer.
#[derive(Debug, Clone)]
pub struct TextCursor<'a> {
    lines: Vec<&'a str>,
    /// Index of the next line to read
    pos: usize,
}

impl<'a> TextCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    /// 1-based number of the next raw line.
    pub fn line_number(&self) -> usize {
        self.pos + 1
    }

    /// Skip blank and comment lines.
    pub fn skip_blank_and_comments(&mut self) {
        while self.pos < self.lines.len() && !is_content(self.lines[self.pos]) {
            self.pos += 1;
        }
    }

    /// Whether no content line remains.
    pub fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// The next content line, without consuming it.
    pub fn peek(&mut self) -> Option<Line<'a>> {
        self.skip_blank_and_comments();
        self.lines.get(self.pos).map(|raw| Line {
            number: self.pos + 1,
            text: raw.trim(),
        })
    }

    /// Consume and return the next content line.
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }

    /// Consume the next content line, failing at end of input.
    pub fn expect_line(&mut self, what: &str) -> ScopResult<Line<'a>> {
        let number = self.line_number();
        self.next_line().ok_or_else(|| {
            FormatError::new(
                FormatErrorKind::UnexpectedEof,
                format!("unexpected end of input, expected {}", what),
            )
            .at_line(number)
            .into()
        })
    }

    /// Consume the next raw line (blank and comment lines included).
    pub fn next_raw(&mut self) -> Option<Line<'a>> {
        let raw = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(Line {
            number: self.pos,
            text: raw,
        })
    }

    /// Consume a content line holding a single non-negative integer.
    pub fn expect_count(&mut self, what: &str) -> ScopResult<usize> {
        let line = self.expect_line(what)?;
        line.single_integer()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| {
                FormatError::new(FormatErrorKind::UnexpectedContent, format!("expected {}", what))
                    .at_line(line.number)
                    .with_found(line.text)
                    .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "# header\n\n  DOMAIN  \n2 4 # rows columns\n   # indented comment\n1 2 3\n";

    #[test]
    fn test_skips_blank_and_comments() {
        let mut cursor = TextCursor::new(TEXT);
        let line = cursor.next_line().unwrap();
        assert_eq!(line, Line { number: 3, text: "DOMAIN" });
        let line = cursor.next_line().unwrap();
        assert_eq!(line.number, 4);
        assert_eq!(line.tokens().collect::<Vec<_>>(), ["2", "4"]);
        assert_eq!(cursor.peek().unwrap().number, 6);
        assert_eq!(cursor.next_line().unwrap().text, "1 2 3");
        assert!(cursor.is_at_end());
        assert!(cursor.next_line().is_none());
    }

    #[test]
    fn test_single_integer() {
        let line = Line { number: 1, text: "3 # parts" };
        assert_eq!(line.single_integer(), Some(3));
        let line = Line { number: 1, text: "3 4" };
        assert_eq!(line.single_integer(), None);
        let line = Line { number: 1, text: "DOMAIN" };
        assert_eq!(line.single_integer(), None);
    }

    #[test]
    fn test_raw_lines_keep_comments() {
        let mut cursor = TextCursor::new("<foo>\n# kept\n</foo>");
        cursor.next_line().unwrap();
        assert_eq!(cursor.next_raw().unwrap().text, "# kept");
        assert_eq!(cursor.next_raw().unwrap().number, 3);
        assert!(cursor.next_raw().is_none());
    }

    #[test]
    fn test_expect_count() {
        let mut cursor = TextCursor::new("2\n-1\n");
        assert_eq!(cursor.expect_count("count").unwrap(), 2);
        let err = cursor.expect_count("count").unwrap_err();
        assert_eq!(err.format_kind(), Some(FormatErrorKind::UnexpectedContent));
        let err = cursor.expect_count("count").unwrap_err();
        assert_eq!(err.format_kind(), Some(FormatErrorKind::UnexpectedEof));
    }
}
