//! Template namespaces.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{MailError, Result};

/// Separators accepted inside a namespace, regardless of platform.
const SEPARATORS: [char; 2] = ['/', '\\'];

/// A normalized template namespace such as `newsletter/weekly/update`.
///
/// Both `/` and `\` separate segments. Each segment is trimmed and empty
/// segments are dropped, so leading separators and stray whitespace vanish. Segment case is kept for
/// building file paths; only the cache key is case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateNamespace {
    segments: Vec<String>,
    key: String,
}

impl TemplateNamespace {
    /// Parse a caller-supplied namespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments: Vec<String> = raw
            .trim()
            .split(SEPARATORS)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() || segments.iter().any(|s| s == "." || s == "..") {
            return Err(MailError::InvalidNamespace(raw.to_string()));
        }

        let key = segments.join("/").to_lowercase();
        Ok(Self { segments, key })
    }

    /// Case-folded form used as the cache key.
    pub fn cache_key(&self) -> &str {
        &self.key
    }

    /// Path segments with their original case.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path of the sibling file with the given extension under `root`.
    pub fn file_path(&self, root: &Path, extension: &str) -> PathBuf {
        let mut path = root.to_path_buf();
        let last = self.segments.len() - 1;
        for (i, segment) in self.segments.iter().enumerate() {
            if i == last {
                path.push(format!("{segment}.{extension}"));
            } else {
                path.push(segment);
            }
        }
        path
    }
}

impl fmt::Display for TemplateNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_and_case_insensitive_key() {
        let a = TemplateNamespace::parse("Foo/Bar").unwrap();
        let b = TemplateNamespace::parse("foo\\bar").unwrap();
        assert_eq!(a.cache_key(), "foo/bar");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_leading_separators_and_whitespace_stripped() {
        let ns = TemplateNamespace::parse("  //\\newsletter/weekly/update  ").unwrap();
        assert_eq!(ns.segments(), ["newsletter", "weekly", "update"]);
        assert_eq!(ns.to_string(), "newsletter/weekly/update");
    }

    #[test]
    fn test_whitespace_around_segments_trimmed() {
        let spaced = TemplateNamespace::parse("/ foo / bar ").unwrap();
        let plain = TemplateNamespace::parse("foo/bar").unwrap();
        assert_eq!(spaced.segments(), ["foo", "bar"]);
        assert_eq!(spaced.cache_key(), plain.cache_key());
        assert_eq!(
            spaced.file_path(Path::new("/t"), "cfg"),
            Path::new("/t").join("foo").join("bar.cfg")
        );
    }

    #[test]
    fn test_file_path_keeps_case() {
        let ns = TemplateNamespace::parse("Password\\Update").unwrap();
        let path = ns.file_path(Path::new("/srv/templates"), "cfg");
        assert_eq!(
            path,
            Path::new("/srv/templates").join("Password").join("Update.cfg")
        );
    }

    #[test]
    fn test_rejects_empty_and_parent_segments() {
        assert!(matches!(
            TemplateNamespace::parse("  / "),
            Err(MailError::InvalidNamespace(_))
        ));
        assert!(matches!(
            TemplateNamespace::parse("../secrets"),
            Err(MailError::InvalidNamespace(_))
        ));
    }
}
