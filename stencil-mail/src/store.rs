//! Filesystem template store.
//!
//! A namespace such as `password/update` resolves to three sibling files
//! under the templates root:
//!
//! ```text
//! templates/
//!   password/
//!     update.cfg    (required: from, subject)
//!     update.html   (optional)
//!     update.txt    (optional)
//! ```
//!
//! The `.cfg` file is parsed and checked for `from` and `subject` before the
//! body files are read. Body files are decoded leniently: invalid UTF-8 is
//! replaced rather than reported.
//!
//! Resolved templates are cached by case-folded namespace for the life of the
//! store when caching is enabled.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::{MailError, Result, TemplateMetadata, TemplateNamespace};

/// Raw contents of a resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// Contents of the `.html` file, if it exists.
    pub html: Option<String>,
    /// Contents of the `.txt` file, if it exists.
    pub text: Option<String>,
    /// Parsed `.cfg` file.
    pub metadata: TemplateMetadata,
}

/// Candidate file paths for a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePaths {
    /// HTML body template.
    pub html: PathBuf,
    /// Plain text body template.
    pub text: PathBuf,
    /// Metadata file.
    pub cfg: PathBuf,
}

#[derive(Debug)]
struct TemplateCache {
    enabled: bool,
    entries: RwLock<HashMap<String, Arc<ResolvedTemplate>>>,
}

impl TemplateCache {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn get(&self, key: &str) -> Option<Arc<ResolvedTemplate>> {
        if !self.enabled {
            return None;
        }
        self.entries.read().get(key).cloned()
    }

    fn insert(&self, key: &str, template: Arc<ResolvedTemplate>) {
        if self.enabled {
            self.entries.write().insert(key.to_string(), template);
        }
    }
}

/// Resolves template namespaces against a root directory.
#[derive(Debug)]
pub struct TemplateStore {
    root: PathBuf,
    cache: TemplateCache,
}

impl TemplateStore {
    /// Create a store with caching enabled.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_caching(root, true)
    }

    /// Create a store that re-reads templates from disk on every resolve.
    pub fn uncached(root: impl Into<PathBuf>) -> Self {
        Self::with_caching(root, false)
    }

    /// Create a store with caching switched on or off.
    pub fn with_caching(root: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            root: root.into(),
            cache: TemplateCache::new(enabled),
        }
    }

    /// Templates root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether resolved templates are cached.
    pub fn caching_enabled(&self) -> bool {
        self.cache.enabled
    }

    /// Candidate file paths for a namespace.
    pub fn paths(&self, namespace: &str) -> Result<TemplatePaths> {
        let ns = TemplateNamespace::parse(namespace)?;
        Ok(self.paths_for(&ns))
    }

    /// Whether a namespace is currently cached.
    pub fn is_cached(&self, namespace: &str) -> bool {
        TemplateNamespace::parse(namespace)
            .map(|ns| self.cache.entries.read().contains_key(ns.cache_key()))
            .unwrap_or(false)
    }

    /// Number of cached namespaces.
    pub fn cached_len(&self) -> usize {
        self.cache.entries.read().len()
    }

    /// Resolve a namespace to its template files.
    ///
    /// Returns [`MailError::TemplateNotFound`] when the namespace has no
    /// `.cfg` file and [`MailError::MissingField`] when it lacks `from` or
    /// `subject`. Missing `.html` and `.txt` files resolve to `None`.
    pub fn resolve(&self, namespace: &str) -> Result<Arc<ResolvedTemplate>> {
        let ns = TemplateNamespace::parse(namespace)?;

        if let Some(template) = self.cache.get(ns.cache_key()) {
            trace!(namespace = %ns, "Template cache hit");
            return Ok(template);
        }

        let paths = self.paths_for(&ns);
        let cfg = read_optional(&paths.cfg)?
            .ok_or_else(|| MailError::TemplateNotFound(namespace.to_string()))?;

        let metadata = TemplateMetadata::parse(&cfg);
        metadata.validate()?;

        let template = Arc::new(ResolvedTemplate {
            html: read_optional(&paths.html)?,
            text: read_optional(&paths.text)?,
            metadata,
        });

        debug!(
            namespace = %ns,
            html = template.html.is_some(),
            text = template.text.is_some(),
            "Loaded email template"
        );

        self.cache.insert(ns.cache_key(), Arc::clone(&template));
        Ok(template)
    }

    fn paths_for(&self, ns: &TemplateNamespace) -> TemplatePaths {
        TemplatePaths {
            html: ns.file_path(&self.root, "html"),
            text: ns.file_path(&self.root, "txt"),
            cfg: ns.file_path(&self.root, "cfg"),
        }
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MailError::Io(e)),
    }
}
