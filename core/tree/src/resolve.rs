//! Navigation inside a document: subtree spans, header paths and tags.
//!
//! All scans are iterative. A depth counter stands in for the stack of open
//! sections, so deeply nested input cannot exhaust the call stack.

use tracing::debug;

use mapletree_common::{FormatError, HeaderPath, NotFound, Result};
use crate::document::Document;
use crate::line::LineKind;

/// A section (or the root) delimited by its open and close line indices.
///
/// For the root, `open` is the start sentinel and `close` the end sentinel.
/// The body is the exclusive range `open + 1..close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub open: usize,
    pub close: usize,
}

/// Outcome of walking a header path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Whether every path element was found.
    pub found: bool,
    /// Number of leading path elements that matched.
    pub matched: usize,
    /// Deepest matched scope (the root if nothing matched).
    pub scope: Scope,
}

impl Resolution {
    /// Error describing where the walk stopped.
    pub fn not_found(&self, path: &HeaderPath) -> NotFound {
        let components = path.components();
        NotFound::Header {
            header: components.get(self.matched).cloned().unwrap_or_default(),
            parent: self
                .matched
                .checked_sub(1)
                .map(|i| components[i].clone()),
        }
    }
}

impl Document {
    /// Scope covering the whole document body.
    pub fn root_scope(&self) -> Result<Scope> {
        Ok(Scope {
            open: self.start_index(),
            close: self.end_index()?,
        })
    }

    /// Index of the section-close matching the section-open at `open`.
    ///
    /// Nested sections are skipped whole. Hitting a sentinel or running out
    /// of lines first means the nesting is corrupt.
    pub fn subtree_span(&self, open: usize) -> Result<usize> {
        let corrupt = || FormatError::MalformedNesting { line: open + 1 };

        let lines = self.lines();
        if !matches!(lines.get(open).map(|l| &l.kind), Some(LineKind::Open(_))) {
            return Err(corrupt().into());
        }

        let mut depth = 0usize;
        for (i, line) in lines.iter().enumerate().skip(open + 1) {
            match line.kind {
                LineKind::Open(_) => depth += 1,
                LineKind::Close(_) if depth == 0 => return Ok(i),
                LineKind::Close(_) => depth -= 1,
                LineKind::Start | LineKind::End => break,
                _ => {}
            }
        }
        Err(corrupt().into())
    }

    /// Indices of the leaves and section-opens directly inside `scope`.
    ///
    /// Nested subtrees are skipped wholesale.
    pub fn direct_children(&self, scope: Scope) -> Result<Vec<usize>> {
        let mut children = Vec::new();
        let mut depth = 0usize;

        for i in scope.open + 1..scope.close {
            match self.lines()[i].kind {
                LineKind::Open(_) => {
                    if depth == 0 {
                        children.push(i);
                    }
                    depth += 1;
                }
                LineKind::Close(_) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(FormatError::MalformedNesting { line: i + 1 })?;
                }
                LineKind::Leaf { .. } if depth == 0 => children.push(i),
                _ => {}
            }
        }
        Ok(children)
    }

    /// Find the direct child section named `name`.
    pub fn find_section(&self, scope: Scope, name: &str) -> Result<Option<usize>> {
        Ok(self
            .direct_children(scope)?
            .into_iter()
            .find(|&i| self.lines()[i].section_name() == Some(name)))
    }

    /// Walk `path` from the root, narrowing to each matched section.
    ///
    /// Names match exactly. On a miss the resolution reports how far the
    /// walk got; the scope is the deepest section that did match.
    pub fn resolve_header_path(&self, path: &HeaderPath) -> Result<Resolution> {
        let mut scope = self.root_scope()?;

        for (matched, name) in path.components().iter().enumerate() {
            match self.find_section(scope, name)? {
                Some(open) => {
                    scope = Scope {
                        open,
                        close: self.subtree_span(open)?,
                    };
                }
                None => {
                    debug!(path = %path, matched, "Header path not found");
                    return Ok(Resolution {
                        found: false,
                        matched,
                        scope,
                    });
                }
            }
        }

        Ok(Resolution {
            found: true,
            matched: path.len(),
            scope,
        })
    }

    /// Resolve `path` completely or fail with `NotFound::Header`.
    pub fn scope_of(&self, path: &HeaderPath) -> Result<Scope> {
        let resolution = self.resolve_header_path(path)?;
        if resolution.found {
            Ok(resolution.scope)
        } else {
            Err(resolution.not_found(path).into())
        }
    }

    /// Index of the leaf tagged `tag` directly inside `scope`.
    ///
    /// # Errors
    /// - `NotFound::Tag` naming the enclosing section
    pub fn find_tag_line(&self, tag: &str, scope: Scope) -> Result<usize> {
        self.direct_children(scope)?
            .into_iter()
            .find(|&i| matches!(self.lines()[i].entry(), Some((t, _)) if t == tag))
            .ok_or_else(|| {
                NotFound::Tag {
                    tag: tag.to_string(),
                    header: self.scope_name(scope).map(str::to_string),
                }
                .into()
            })
    }

    /// Name of the section a scope belongs to; `None` for the root.
    pub fn scope_name(&self, scope: Scope) -> Option<&str> {
        self.lines().get(scope.open).and_then(|line| line.section_name())
    }
}
