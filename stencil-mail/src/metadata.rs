//! Template metadata (`.cfg`) parsing.

use std::collections::BTreeMap;

use crate::{MailError, Result};

/// Keys every `.cfg` file must define.
pub const REQUIRED_FIELDS: [&str; 2] = ["from", "subject"];

/// Key/value pairs read from a namespace's `.cfg` file.
///
/// The format is one `key: value` pair per line. The first colon splits key
/// from value and both are trimmed. Blank lines and lines without a colon are
/// ignored; a repeated key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateMetadata {
    entries: BTreeMap<String, String>,
}

impl TemplateMetadata {
    /// Parse the contents of a `.cfg` file.
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();

        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }

        Self { entries }
    }

    /// Get a value by key (case-sensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get a value that must be present.
    pub fn require(&self, field: &'static str) -> Result<&str> {
        self.get(field).ok_or(MailError::MissingField(field))
    }

    /// Check that every [`REQUIRED_FIELDS`] key is present.
    pub fn validate(&self) -> Result<()> {
        for field in REQUIRED_FIELDS {
            self.require(field)?;
        }
        Ok(())
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys were parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
