//! Common types used throughout MapleTree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain of nested section names, starting below the document root.
///
/// The root itself is implicit and has no name, so the empty path addresses
/// the top level of the document body. Every name is checked with
/// [`validate_name`], including names read back through serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct HeaderPath {
    sections: Vec<String>,
}

impl HeaderPath {
    /// The document body itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from outermost to innermost section name.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if any name fails [`validate_name`]
    pub fn from_components<I, S>(names: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sections = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                validate_name(&name).map(|_| name)
            })
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(Self { sections })
    }

    pub fn is_root(&self) -> bool {
        self.sections.is_empty()
    }

    /// Nesting depth addressed by this path.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// The enclosing section's path; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.sections.split_last().map(|(_, outer)| Self {
            sections: outer.to_vec(),
        })
    }

    /// Innermost section name.
    pub fn name(&self) -> Option<&str> {
        self.sections.last().map(String::as_str)
    }

    /// Path of section `child` nested inside this one.
    pub fn join(&self, child: &str) -> crate::Result<Self> {
        validate_name(child)?;
        let mut sections = Vec::with_capacity(self.sections.len() + 1);
        sections.extend_from_slice(&self.sections);
        sections.push(child.to_owned());
        Ok(Self { sections })
    }

    /// Section names, outermost first.
    pub fn components(&self) -> &[String] {
        &self.sections
    }
}

impl TryFrom<Vec<String>> for HeaderPath {
    type Error = crate::Error;

    fn try_from(sections: Vec<String>) -> crate::Result<Self> {
        Self::from_components(sections)
    }
}

impl From<HeaderPath> for Vec<String> {
    fn from(path: HeaderPath) -> Self {
        path.sections
    }
}

/// Check that `name` can be written as a section name and read back unchanged.
///
/// Section names run to the end of their line, so inner spaces survive a
/// round trip but line breaks and surrounding whitespace do not.
pub fn validate_name(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(crate::Error::InvalidInput(
            "Header name cannot be empty".to_string(),
        ));
    }
    if name.contains(['\n', '\r']) {
        return Err(crate::Error::InvalidInput(format!(
            "Header name cannot contain line breaks: {:?}",
            name
        )));
    }
    if name.trim() != name {
        return Err(crate::Error::InvalidInput(format!(
            "Header name cannot start or end with whitespace: {:?}",
            name
        )));
    }
    Ok(())
}

impl fmt::Display for HeaderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sections.as_slice() {
            [] => f.write_str("/"),
            sections => sections.iter().try_for_each(|name| write!(f, "/{}", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_addresses_document_body() {
        let root = HeaderPath::root();
        assert!(root.is_root() && root.is_empty());
        assert_eq!(root.to_string(), "/");
        assert_eq!(root.name(), None);
        assert!(root.parent().is_none());
    }

    #[test]
    fn nested_path_display_and_name() {
        let path = HeaderPath::from_components(["A", "B", "C"]).unwrap();
        assert_eq!(path.components(), &["A", "B", "C"]);
        assert_eq!(path.to_string(), "/A/B/C");
        assert_eq!(path.name(), Some("C"));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn join_then_parent() {
        let path = HeaderPath::root().join("A").unwrap().join("B").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "/A");
        assert_eq!(path.parent().unwrap().parent().unwrap(), HeaderPath::root());
    }

    #[test]
    fn inner_spaces_allowed() {
        let path = HeaderPath::from_components(["HEADER 1"]).unwrap();
        assert_eq!(path.name(), Some("HEADER 1"));
    }

    #[test]
    fn unrepresentable_names_rejected() {
        assert!(HeaderPath::from_components([""]).is_err());
        assert!(HeaderPath::from_components(["A\nB"]).is_err());
        assert!(HeaderPath::from_components(["A\rB"]).is_err());
        assert!(HeaderPath::from_components([" A"]).is_err());
        assert!(HeaderPath::root().join("B ").is_err());
    }

    #[test]
    fn serde_uses_plain_name_list() {
        let path = HeaderPath::from_components(["A", "B"]).unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["A","B"]"#);
        assert_eq!(serde_json::from_str::<HeaderPath>(&json).unwrap(), path);

        assert!(serde_json::from_str::<HeaderPath>(r#"["ok", ""]"#).is_err());
    }
}
