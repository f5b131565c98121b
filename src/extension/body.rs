//! `body` extension: original iterator names and statement text.
//!
//! Textual form:
//! ```text
//! # Number of original iterators
//! 2
//! # List of original iterators
//! i j
//! # Statement body expression
//! C[i][j] = 0;
//! ```

use super::{downcast_eq, Extension, ExtensionInterface};
use crate::utils::errors::{FormatError, FormatErrorKind, ScopResult};
use std::any::Any;

pub const BODY_URI: &str = "body";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub iterators: Vec<String>,
    pub expression: String,
}

impl Body {
    pub fn new<S: Into<String>>(
        iterators: impl IntoIterator<Item = S>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            iterators: iterators.into_iter().map(Into::into).collect(),
            expression: expression.into(),
        }
    }

    pub fn iterators(&self) -> &[String] {
        &self.iterators
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl Extension for Body {
    fn uri(&self) -> &str {
        BODY_URI
    }

    fn print(&self) -> String {
        let mut out = String::new();
        out.push_str("# Number of original iterators\n");
        out.push_str(&format!("{}\n", self.iterators.len()));
        if !self.iterators.is_empty() {
            out.push_str("# List of original iterators\n");
            out.push_str(&self.iterators.join(" "));
            out.push('\n');
        }
        out.push_str("# Statement body expression\n");
        out.push_str(&self.expression);
        out
    }

    fn clone_box(&self) -> Box<dyn Extension> {
        Box::new(self.clone())
    }

    fn equals(&self, other: &dyn Extension) -> bool {
        downcast_eq(self, other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Next line that is neither blank nor a `#` comment, trimmed.
fn next_content<'t>(lines: &mut std::str::Lines<'t>) -> Option<&'t str> {
    lines
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Blank line or `# ...` comment ahead of the expression. Directives such as
/// `#pragma` have no space after the `#` and belong to the expression.
fn is_expression_comment(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line == "#" || line.starts_with("# ")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BodyInterface;

impl ExtensionInterface for BodyInterface {
    fn uri(&self) -> &str {
        BODY_URI
    }

    fn create(&self) -> Box<dyn Extension> {
        Box::new(Body::default())
    }

    fn parse(&self, text: &str) -> ScopResult<Box<dyn Extension>> {
        let mut lines = text.lines();

        let count_line = next_content(&mut lines).ok_or_else(|| {
            FormatError::new(FormatErrorKind::UnexpectedEof, "body: missing iterator count")
        })?;
        let count: usize = count_line.parse().map_err(|_| {
            FormatError::new(FormatErrorKind::MalformedNumber, "body: bad iterator count")
                .with_found(count_line)
        })?;

        let mut iterators = Vec::with_capacity(count);
        if count > 0 {
            let names = next_content(&mut lines).ok_or_else(|| {
                FormatError::new(FormatErrorKind::UnexpectedEof, "body: missing iterator list")
            })?;
            iterators.extend(names.split_whitespace().map(String::from));
            if iterators.len() != count {
                return Err(FormatError::new(
                    FormatErrorKind::UnexpectedContent,
                    format!("body: expected {} iterators, got {}", count, iterators.len()),
                )
                .with_found(names)
                .into());
            }
        }

        // the expression itself is kept verbatim, indentation included
        let rest: Vec<&str> = lines.collect();
        let start = rest
            .iter()
            .position(|line| !is_expression_comment(line))
            .unwrap_or(rest.len());
        let end = rest
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(start, |last| (last + 1).max(start));
        let expression = rest[start..end].join("\n");
        Ok(Box::new(Body { iterators, expression }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_parse() {
        let body = Body::new(["i", "j"], "C[i][j] = 0;");
        let parsed = BodyInterface.parse(&body.print()).unwrap();
        assert!(body.equals(parsed.as_ref()));
        assert_eq!(parsed.print(), body.print());
    }

    #[test]
    fn test_no_iterators() {
        let parsed = BodyInterface.parse("0\nx = 1;").unwrap();
        let body = parsed.as_any().downcast_ref::<Body>().unwrap();
        assert!(body.iterators().is_empty());
        assert_eq!(body.expression(), "x = 1;");
    }

    #[test]
    fn test_multi_line_expression_is_verbatim() {
        let text = "# Number of original iterators\n1\n# List of original iterators\ni\n# Statement body expression\n#pragma omp simd\nfor (k = 0; k < 4; k++)\n\n    A[i] += B[k];\n";
        let parsed = BodyInterface.parse(text).unwrap();
        let body = parsed.as_any().downcast_ref::<Body>().unwrap();
        assert_eq!(body.iterators(), ["i"]);
        assert_eq!(
            body.expression(),
            "#pragma omp simd\nfor (k = 0; k < 4; k++)\n\n    A[i] += B[k];"
        );

        let again = BodyInterface.parse(&body.print()).unwrap();
        assert!(body.equals(again.as_ref()));
    }

    #[test]
    fn test_wrong_iterator_count() {
        let err = BodyInterface.parse("2\ni\nS;").unwrap_err();
        assert_eq!(err.format_kind(), Some(FormatErrorKind::UnexpectedContent));
    }
}
