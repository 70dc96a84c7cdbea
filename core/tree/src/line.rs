//! Line model of a Maple document.
//!
//! Every line is classified by its first token: `MAPLE` and `EOF` bound the
//! data region, `H <name>` opens a section, `E` closes it, and anything else
//! is a leaf whose first token is the tag and whose remainder is the value.
//! Indentation is never stored; it is derived from the nesting depth.

use mapletree_common::{Error, Result};

/// Start-of-data sentinel.
pub const START_SENTINEL: &str = "MAPLE";
/// End-of-data sentinel.
pub const END_SENTINEL: &str = "EOF";
/// Keyword opening a section.
pub const OPEN_KEYWORD: &str = "H";
/// Keyword closing a section.
pub const CLOSE_KEYWORD: &str = "E";

const RESERVED: [&str; 4] = [START_SENTINEL, END_SENTINEL, OPEN_KEYWORD, CLOSE_KEYWORD];

/// Classification of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `MAPLE`
    Start,
    /// `EOF`
    End,
    /// `H <name>`
    Open(String),
    /// `E`, with any text after the keyword kept as a note.
    Close(String),
    /// `<tag> <value>`
    Leaf { tag: String, value: String },
    /// Empty line inside the data region.
    Blank,
    /// Verbatim line outside the data region.
    Text(String),
}

/// One line of a document together with its nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub depth: usize,
}

impl Line {
    fn new(kind: LineKind) -> Self {
        Self { kind, depth: 0 }
    }

    /// Classify one raw line (without its `\n`).
    pub fn parse(raw: &str) -> Self {
        let content = strip_cr(raw).trim_start_matches([' ', '\t']);
        let (tag, value) = split_token(content);

        let kind = match tag {
            "" => LineKind::Blank,
            START_SENTINEL if value.is_empty() => LineKind::Start,
            END_SENTINEL if value.is_empty() => LineKind::End,
            OPEN_KEYWORD => LineKind::Open(value.to_string()),
            CLOSE_KEYWORD => LineKind::Close(value.to_string()),
            _ => LineKind::Leaf {
                tag: tag.to_string(),
                value: value.to_string(),
            },
        };
        Self::new(kind)
    }

    /// Keep a line exactly as written.
    pub fn text(raw: &str) -> Self {
        Self::new(LineKind::Text(strip_cr(raw).to_string()))
    }

    pub fn start() -> Self {
        Self::new(LineKind::Start)
    }

    pub fn end() -> Self {
        Self::new(LineKind::End)
    }

    pub fn open(name: impl Into<String>) -> Self {
        Self::new(LineKind::Open(name.into()))
    }

    pub fn close() -> Self {
        Self::new(LineKind::Close(String::new()))
    }

    pub fn leaf(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(LineKind::Leaf {
            tag: tag.into(),
            value: value.into(),
        })
    }

    /// Sentinels and section markers.
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            LineKind::Start | LineKind::End | LineKind::Open(_) | LineKind::Close(_)
        )
    }

    /// Section name if this line opens a section.
    pub fn section_name(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Open(name) => Some(name),
            _ => None,
        }
    }

    /// Tag and value if this is a leaf.
    pub fn entry(&self) -> Option<(&str, &str)> {
        match &self.kind {
            LineKind::Leaf { tag, value } => Some((tag, value)),
            _ => None,
        }
    }

    /// Append the serialized line (without terminator) to `out`.
    pub fn render_into(&self, indent: &str, out: &mut String) {
        match &self.kind {
            LineKind::Text(raw) => out.push_str(raw),
            LineKind::Blank => {}
            LineKind::Start => out.push_str(START_SENTINEL),
            LineKind::End => out.push_str(END_SENTINEL),
            LineKind::Open(name) => {
                push_indent(out, indent, self.depth);
                out.push_str(OPEN_KEYWORD);
                if !name.is_empty() {
                    out.push(' ');
                    out.push_str(name);
                }
            }
            LineKind::Close(note) => {
                push_indent(out, indent, self.depth);
                out.push_str(CLOSE_KEYWORD);
                if !note.is_empty() {
                    out.push(' ');
                    out.push_str(note);
                }
            }
            LineKind::Leaf { tag, value } => {
                push_indent(out, indent, self.depth);
                out.push_str(tag);
                if !value.is_empty() {
                    out.push(' ');
                    out.push_str(value);
                }
            }
        }
    }
}

fn push_indent(out: &mut String, indent: &str, depth: usize) {
    for _ in 0..depth {
        out.push_str(indent);
    }
}

fn strip_cr(raw: &str) -> &str {
    raw.strip_suffix('\r').unwrap_or(raw)
}

/// Split `content` at its first space or tab.
///
/// Only that single delimiter is consumed; any further whitespace belongs to
/// the value.
pub fn split_token(content: &str) -> (&str, &str) {
    match content.find([' ', '\t']) {
        Some(pos) => (&content[..pos], &content[pos + 1..]),
        None => (content, ""),
    }
}

/// Check that `tag` can be written as a leaf tag and read back unchanged.
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(Error::InvalidInput("Tag cannot be empty".to_string()));
    }
    if tag.chars().any(char::is_whitespace) {
        return Err(Error::InvalidInput(format!(
            "Tag cannot contain whitespace: {:?}",
            tag
        )));
    }
    if RESERVED.contains(&tag) {
        return Err(Error::InvalidInput(format!("Tag is a reserved keyword: {}", tag)));
    }
    Ok(())
}

/// Check that `value` fits on a single line.
pub fn validate_value(value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(Error::InvalidInput(
            "Value cannot contain line breaks".to_string(),
        ));
    }
    Ok(())
}
