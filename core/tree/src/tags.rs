//! Reading, writing and deleting leaf tags.

use tracing::debug;

use mapletree_common::{HeaderPath, Result};
use crate::document::Document;
use crate::line::{validate_tag, validate_value, Line, LineKind};

impl Document {
    /// Value of `tag` directly inside the section at `path`.
    ///
    /// # Errors
    /// - `NotFound::Header` if the path does not resolve
    /// - `NotFound::Tag` if the section has no such tag
    pub fn read_tag(&self, path: &HeaderPath, tag: &str) -> Result<String> {
        let scope = self.scope_of(path)?;
        let index = self.find_tag_line(tag, scope)?;
        let value = self.lines()[index]
            .entry()
            .map(|(_, value)| value.to_string())
            .unwrap_or_default();

        debug!(path = %path, tag, "Read tag");
        Ok(value)
    }

    /// Set `tag` to `value` inside the section at `path`.
    ///
    /// Missing sections are created as a nested chain below the deepest
    /// existing one. An existing tag is overwritten in place; a new one is
    /// appended just before its section's close.
    pub fn write_tag(&mut self, path: &HeaderPath, tag: &str, value: &str) -> Result<()> {
        validate_tag(tag)?;
        validate_value(value)?;

        let resolution = self.resolve_header_path(path)?;
        let scope = resolution.scope;

        if !resolution.found {
            let missing = &path.components()[resolution.matched..];
            let lines = nested_chain(missing, Some(Line::leaf(tag, value)));
            debug!(path = %path, tag, created = missing.len(), "Creating headers for new tag");
            return self.mutate(|all| {
                let tail = all.split_off(scope.close);
                all.extend(lines);
                all.extend(tail);
            });
        }

        match self.find_tag_line(tag, scope) {
            Ok(index) => {
                debug!(path = %path, tag, line = index + 1, "Overwriting tag");
                self.mutate(|all| {
                    all[index].kind = LineKind::Leaf {
                        tag: tag.to_string(),
                        value: value.to_string(),
                    };
                })
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %path, tag, "Appending tag");
                self.mutate(|all| all.insert(scope.close, Line::leaf(tag, value)))
            }
            Err(e) => Err(e),
        }
    }

    /// Remove `tag` from the section at `path`.
    ///
    /// # Errors
    /// - `NotFound::Header` if the path does not resolve
    /// - `NotFound::Tag` if the section has no such tag
    pub fn delete_tag(&mut self, path: &HeaderPath, tag: &str) -> Result<()> {
        let scope = self.scope_of(path)?;
        let index = self.find_tag_line(tag, scope)?;

        debug!(path = %path, tag, line = index + 1, "Deleting tag");
        self.mutate(|all| {
            all.remove(index);
        })
    }
}

/// Open lines for `names`, each inside the previous, then `inner`, then the
/// matching closes.
pub(crate) fn nested_chain(names: &[String], inner: Option<Line>) -> Vec<Line> {
    let mut lines = Vec::with_capacity(names.len() * 2 + 1);
    lines.extend(names.iter().map(|name| Line::open(name.as_str())));
    lines.extend(inner);
    lines.extend(names.iter().map(|_| Line::close()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str = "MAPLE\nH A\n    TAG hello\nE\nEOF";

    fn path(names: &[&str]) -> HeaderPath {
        HeaderPath::from_components(names.iter().copied()).unwrap()
    }

    #[test]
    fn test_read_existing_tag() {
        let doc = Document::parse(SCENARIO_A).unwrap();
        assert_eq!(doc.read_tag(&path(&["A"]), "TAG").unwrap(), "hello");
    }

    #[test]
    fn test_read_missing_header_and_tag() {
        let doc = Document::parse(SCENARIO_A).unwrap();
        assert!(doc.read_tag(&path(&["B"]), "TAG").unwrap_err().is_not_found());
        assert!(doc.read_tag(&path(&["A"]), "NOPE").unwrap_err().is_not_found());
        assert!(doc.read_tag(&HeaderPath::root(), "TAG").unwrap_err().is_not_found());
    }

    #[test]
    fn test_write_creates_nested_section() {
        let mut doc = Document::parse(SCENARIO_A).unwrap();
        doc.write_tag(&path(&["A", "B"]), "X", "1").unwrap();

        assert_eq!(
            doc.to_text(),
            "MAPLE\nH A\n    TAG hello\n    H B\n        X 1\n    E\nE\nEOF"
        );
        assert_eq!(doc.read_tag(&path(&["A", "B"]), "X").unwrap(), "1");
        assert_eq!(doc.end_index().unwrap(), 7);
    }

    #[test]
    fn test_write_creates_chain_from_root() {
        let mut doc = Document::base();
        doc.write_tag(&path(&["A", "B", "C"]), "T", "v").unwrap();

        assert_eq!(
            doc.to_text(),
            "MAPLE\nH A\n    H B\n        H C\n            T v\n        E\n    E\nE\nEOF\n"
        );
    }

    #[test]
    fn test_write_overwrites_in_place() {
        let mut doc = Document::parse("MAPLE\nH A\nT1 a\nT2 b\nE\nEOF").unwrap();
        doc.write_tag(&path(&["A"]), "T1", "changed").unwrap();

        assert_eq!(doc.to_text(), "MAPLE\nH A\n    T1 changed\n    T2 b\nE\nEOF");
        assert_eq!(doc.len(), 6);
    }

    #[test]
    fn test_write_appends_before_close() {
        let mut doc = Document::parse("MAPLE\nH A\nH Inner\nE\nE\nEOF").unwrap();
        doc.write_tag(&path(&["A"]), "T", "v").unwrap();

        assert_eq!(
            doc.to_text(),
            "MAPLE\nH A\n    H Inner\n    E\n    T v\nE\nEOF"
        );
    }

    #[test]
    fn test_write_at_root() {
        let mut doc = Document::parse(SCENARIO_A).unwrap();
        doc.write_tag(&HeaderPath::root(), "ROOT", "r").unwrap();
        assert_eq!(doc.to_text(), "MAPLE\nH A\n    TAG hello\nE\nROOT r\nEOF");
        assert_eq!(doc.read_tag(&HeaderPath::root(), "ROOT").unwrap(), "r");
    }

    #[test]
    fn test_write_rejects_bad_input() {
        let mut doc = Document::parse(SCENARIO_A).unwrap();
        let before = doc.clone();

        assert!(doc.write_tag(&path(&["A"]), "TWO WORDS", "v").is_err());
        assert!(doc.write_tag(&path(&["A"]), "E", "v").is_err());
        assert!(doc.write_tag(&path(&["A"]), "T", "multi\nline").is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_delete_tag() {
        let mut doc = Document::parse(SCENARIO_A).unwrap();
        doc.delete_tag(&path(&["A"]), "TAG").unwrap();

        assert_eq!(doc.to_text(), "MAPLE\nH A\nE\nEOF");
        assert!(doc.read_tag(&path(&["A"]), "TAG").unwrap_err().is_not_found());
        assert!(doc.delete_tag(&path(&["A"]), "TAG").unwrap_err().is_not_found());
    }

    #[test]
    fn test_nested_chain_shape() {
        let names = vec!["A".to_string(), "B".to_string()];
        let lines = nested_chain(&names, None);
        assert_eq!(
            lines,
            vec![Line::open("A"), Line::open("B"), Line::close(), Line::close()]
        );
    }
}
