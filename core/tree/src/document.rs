//! In-memory Maple document: parsing, structural validation and rendering.
//!
//! A [`Document`] owns the ordered line sequence plus the positions of the
//! start and end sentinels. The end position is derived: every insertion or
//! removal clears it, and only a successful [`Document::validate`] sets it
//! again. Queries made while it is stale fail instead of trusting old
//! indices.

use tracing::debug;

use mapletree_common::{Error, FormatError, Result};
use crate::line::{Line, LineKind, END_SENTINEL, START_SENTINEL};

/// Default number of spaces per nesting level.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Parsed and validated Maple document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Line>,
    start: usize,
    end: Option<usize>,
    indent: String,
    trailing_newline: bool,
}

impl Document {
    /// Parse `text` using the default indentation.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_indent(text, DEFAULT_INDENT_WIDTH)
    }

    /// Parse `text` and validate its structure.
    ///
    /// # Errors
    /// - `FormatError::Empty` for fewer than two lines
    /// - `FormatError::NotThisFormat` if either sentinel is missing
    /// - `FormatError::MalformedNesting` / `MisplacedTerminator` from validation
    pub fn parse_with_indent(text: &str, indent_width: usize) -> Result<Self> {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let raw: Vec<&str> = body.split('\n').collect();

        if raw.len() < 2 {
            return Err(FormatError::Empty.into());
        }

        let start = raw
            .iter()
            .position(|line| Line::parse(line).kind == LineKind::Start)
            .ok_or(FormatError::NotThisFormat {
                reason: "start sentinel not found",
            })?;

        let first_end = raw[start + 1..]
            .iter()
            .position(|line| Line::parse(line).kind == LineKind::End)
            .map(|offset| start + 1 + offset)
            .ok_or(FormatError::NotThisFormat {
                reason: "end sentinel not found",
            })?;

        let lines = raw
            .iter()
            .enumerate()
            .map(|(i, line)| {
                if i < start {
                    return Line::text(line);
                }
                let parsed = Line::parse(line);
                if i > first_end && !parsed.is_structural() {
                    Line::text(line)
                } else {
                    parsed
                }
            })
            .collect();

        let mut document = Self {
            lines,
            start,
            end: None,
            indent: " ".repeat(indent_width),
            trailing_newline,
        };
        document.validate()?;

        debug!(
            lines = document.lines.len(),
            start = document.start,
            "Parsed document"
        );
        Ok(document)
    }

    /// The minimal valid document: start sentinel directly followed by the
    /// end sentinel.
    pub fn base() -> Self {
        Self::base_with_indent(DEFAULT_INDENT_WIDTH)
    }

    /// [`Document::base`] with a custom indentation width.
    pub fn base_with_indent(indent_width: usize) -> Self {
        Self {
            lines: vec![Line::start(), Line::end()],
            start: 0,
            end: Some(1),
            indent: " ".repeat(indent_width),
            trailing_newline: true,
        }
    }

    /// Check nesting, locate the end sentinel and re-derive indentation.
    ///
    /// Section-close lines take the depth of their matching open. Lines
    /// after the end sentinel must not be structural.
    pub fn validate(&mut self) -> Result<()> {
        self.end = None;

        let mut depth = 0usize;
        let mut end = None;

        for (i, line) in self.lines.iter_mut().enumerate().skip(self.start + 1) {
            if end.is_some() {
                if line.is_structural() {
                    return Err(FormatError::MisplacedTerminator { line: i + 1 }.into());
                }
                line.depth = 0;
                continue;
            }

            match line.kind {
                LineKind::End => {
                    if depth != 0 {
                        return Err(FormatError::MisplacedTerminator { line: i + 1 }.into());
                    }
                    line.depth = 0;
                    end = Some(i);
                }
                LineKind::Start => {
                    return Err(FormatError::NotThisFormat {
                        reason: "duplicate start sentinel",
                    }
                    .into());
                }
                LineKind::Close(_) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(FormatError::MalformedNesting { line: i + 1 })?;
                    line.depth = depth;
                }
                LineKind::Open(_) => {
                    line.depth = depth;
                    depth += 1;
                }
                _ => line.depth = depth,
            }
        }

        let end = end.ok_or(FormatError::NotThisFormat {
            reason: "end sentinel not found",
        })?;
        self.end = Some(end);
        Ok(())
    }

    /// Apply a structural change and re-validate as one step.
    ///
    /// The end index is cleared before `change` runs, so nothing computed
    /// against the old layout can leak past it.
    pub(crate) fn mutate<T>(&mut self, change: impl FnOnce(&mut Vec<Line>) -> T) -> Result<T> {
        self.end = None;
        let out = change(&mut self.lines);
        self.validate()?;
        Ok(out)
    }

    /// Serialize the whole document.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            line.render_into(&self.indent, &mut out);
        }
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }

    /// All lines, including any outside the data region.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false for a parsed document; both sentinels are lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the `MAPLE` line.
    pub fn start_index(&self) -> usize {
        self.start
    }

    /// Index of the `EOF` line.
    ///
    /// # Errors
    /// - `FormatError::NotThisFormat` if a mutation left it unsynchronized
    pub fn end_index(&self) -> Result<usize> {
        self.end.ok_or_else(|| {
            Error::from(FormatError::NotThisFormat {
                reason: "end sentinel index is stale",
            })
        })
    }

    /// Indentation unit string.
    pub fn indent(&self) -> &str {
        &self.indent
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Text of a freshly created document file.
pub fn base_text() -> String {
    format!("{}\n{}\n", START_SENTINEL, END_SENTINEL)
}
