//! Enumerating, creating and deleting whole sections.

use tracing::debug;

use mapletree_common::{HeaderPath, NotFound, Result};
use crate::document::Document;
use crate::tags::nested_chain;

impl Document {
    /// Names of the sections directly inside `path`, in document order.
    pub fn headers(&self, path: &HeaderPath) -> Result<Vec<String>> {
        let scope = self.scope_of(path)?;
        Ok(self
            .direct_children(scope)?
            .into_iter()
            .filter_map(|i| self.lines()[i].section_name().map(str::to_string))
            .collect())
    }

    /// Tags directly inside `path`, in document order.
    pub fn tags(&self, path: &HeaderPath) -> Result<Vec<String>> {
        Ok(self
            .tag_entries(path)?
            .into_iter()
            .map(|(tag, _)| tag)
            .collect())
    }

    /// `(tag, value)` pairs directly inside `path`, in document order.
    pub fn tag_entries(&self, path: &HeaderPath) -> Result<Vec<(String, String)>> {
        let scope = self.scope_of(path)?;
        Ok(self
            .direct_children(scope)?
            .into_iter()
            .filter_map(|i| {
                self.lines()[i]
                    .entry()
                    .map(|(tag, value)| (tag.to_string(), value.to_string()))
            })
            .collect())
    }

    /// Make sure every section of `path` exists.
    ///
    /// Missing sections are nested strictly, each inside the previous one.
    /// Returns whether anything was created.
    pub fn create_header(&mut self, path: &HeaderPath) -> Result<bool> {
        let resolution = self.resolve_header_path(path)?;
        if resolution.found {
            return Ok(false);
        }

        let missing = &path.components()[resolution.matched..];
        let lines = nested_chain(missing, None);
        let at = resolution.scope.close;

        debug!(path = %path, created = missing.len(), "Creating headers");
        self.mutate(|all| {
            let tail = all.split_off(at);
            all.extend(lines);
            all.extend(tail);
        })?;
        Ok(true)
    }

    /// Remove the section `name` directly inside `path`, with everything
    /// nested in it.
    ///
    /// Returns the number of lines removed.
    ///
    /// # Errors
    /// - `NotFound::Header` if `path` does not resolve
    /// - `NotFound::Data` if there is no such child section
    pub fn delete_header(&mut self, path: &HeaderPath, name: &str) -> Result<usize> {
        let scope = self.scope_of(path)?;
        let open = self.find_section(scope, name)?.ok_or_else(|| NotFound::Data {
            name: name.to_string(),
            header: self.scope_name(scope).map(str::to_string),
        })?;
        let close = self.subtree_span(open)?;

        debug!(path = %path, header = name, lines = close - open + 1, "Deleting header");
        self.mutate(|all| all.drain(open..=close).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapletree_common::Error;

    const DOC: &str = "MAPLE\nH A\nT1 a\nH B\nX 1\nE\nT2 b\nH C\nE\nE\nH D\nE\nR r\nEOF";

    fn path(names: &[&str]) -> HeaderPath {
        HeaderPath::from_components(names.iter().copied()).unwrap()
    }

    #[test]
    fn test_list_headers() {
        let doc = Document::parse(DOC).unwrap();
        assert_eq!(doc.headers(&HeaderPath::root()).unwrap(), vec!["A", "D"]);
        assert_eq!(doc.headers(&path(&["A"])).unwrap(), vec!["B", "C"]);
        assert!(doc.headers(&path(&["A", "B"])).unwrap().is_empty());
    }

    #[test]
    fn test_list_tags() {
        let doc = Document::parse(DOC).unwrap();
        assert_eq!(doc.tags(&path(&["A"])).unwrap(), vec!["T1", "T2"]);
        assert_eq!(doc.tags(&HeaderPath::root()).unwrap(), vec!["R"]);
        assert_eq!(
            doc.tag_entries(&path(&["A", "B"])).unwrap(),
            vec![("X".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_list_missing_path() {
        let doc = Document::parse(DOC).unwrap();
        assert!(doc.headers(&path(&["Z"])).unwrap_err().is_not_found());
        assert!(doc.tags(&path(&["A", "Z"])).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_header_removes_subtree() {
        let mut doc = Document::parse(DOC).unwrap();
        let before = doc.len();

        let removed = doc.delete_header(&HeaderPath::root(), "A").unwrap();
        assert_eq!(removed, 9);
        assert_eq!(doc.len(), before - 9);
        assert_eq!(doc.to_text(), "MAPLE\nH D\nE\nR r\nEOF");
        assert!(doc.read_tag(&path(&["A", "B"]), "X").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_only_header() {
        let mut doc = Document::parse("MAPLE\nH A\nE\nEOF").unwrap();
        doc.delete_header(&HeaderPath::root(), "A").unwrap();
        assert_eq!(doc.to_text(), "MAPLE\nEOF");
    }

    #[test]
    fn test_delete_nested_header() {
        let mut doc = Document::parse(DOC).unwrap();
        doc.delete_header(&path(&["A"]), "B").unwrap();
        assert_eq!(doc.headers(&path(&["A"])).unwrap(), vec!["C"]);
        assert_eq!(doc.tags(&path(&["A"])).unwrap(), vec!["T1", "T2"]);
    }

    #[test]
    fn test_delete_missing_header() {
        let mut doc = Document::parse(DOC).unwrap();
        match doc.delete_header(&path(&["A"]), "Z") {
            Err(Error::NotFound(NotFound::Data { name, header })) => {
                assert_eq!(name, "Z");
                assert_eq!(header.as_deref(), Some("A"));
            }
            other => panic!("unexpected {:?}", other),
        }
        // Grandchildren are not direct children.
        assert!(doc.delete_header(&HeaderPath::root(), "B").is_err());
    }

    #[test]
    fn test_create_header_nests_strictly() {
        let mut doc = Document::parse("MAPLE\nH A\nE\nEOF").unwrap();
        assert!(doc.create_header(&path(&["A", "B", "C"])).unwrap());
        assert_eq!(
            doc.to_text(),
            "MAPLE\nH A\n    H B\n        H C\n        E\n    E\nE\nEOF"
        );
        assert!(!doc.create_header(&path(&["A", "B"])).unwrap());
    }
}
