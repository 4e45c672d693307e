//! Mailer settings.
//!
//! Settings come from a key/value [`ConfigSource`] (the process environment by
//! default) or from a TOML document.
//!
//! | Key                     | Required | Default                      |
//! |-------------------------|----------|------------------------------|
//! | `EMAIL_TEMPLATES_ROOT`  | yes      |                              |
//! | `SMTP_HOST`             | yes      |                              |
//! | `SMTP_PORT`             | no       | `25`                         |
//! | `SMTP_TIMEOUT_SECS`     | no       | `30`                         |
//! | `EMAIL_CACHE_TEMPLATES` | no       | on in release, off in debug  |

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::{MailError, Result, SmtpConfig};

/// Key holding the templates root directory.
pub const TEMPLATES_ROOT_KEY: &str = "EMAIL_TEMPLATES_ROOT";
/// Key holding the SMTP relay host.
pub const SMTP_HOST_KEY: &str = "SMTP_HOST";
/// Key holding the SMTP relay port.
pub const SMTP_PORT_KEY: &str = "SMTP_PORT";
/// Key holding the SMTP connection timeout in seconds.
pub const SMTP_TIMEOUT_KEY: &str = "SMTP_TIMEOUT_SECS";
/// Key switching the template cache on or off.
pub const CACHE_TEMPLATES_KEY: &str = "EMAIL_CACHE_TEMPLATES";

/// Opaque key/value settings lookup.
pub trait ConfigSource {
    /// Look up a value.
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Process environment lookup, optionally prefixed.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: Option<String>,
}

impl EnvSource {
    /// Create a lookup that reads `KEY` directly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lookup that reads `PREFIX_KEY`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key),
            None => key.to_string(),
        }
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(self.full_key(key)).ok()
    }
}

/// Settings for a [`Mailer`](crate::Mailer).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MailSettings {
    /// Directory containing template namespaces.
    pub templates_root: PathBuf,
    /// Outbound relay.
    pub smtp: SmtpConfig,
    /// Cache resolved templates for the life of the process.
    #[serde(default = "default_cache_templates")]
    pub cache_templates: bool,
}

fn default_cache_templates() -> bool {
    !cfg!(debug_assertions)
}

impl MailSettings {
    /// Create settings with default port, timeout and caching.
    pub fn new(templates_root: impl Into<PathBuf>, smtp_host: impl Into<String>) -> Self {
        Self {
            templates_root: templates_root.into(),
            smtp: SmtpConfig::new(smtp_host),
            cache_templates: default_cache_templates(),
        }
    }

    /// Switch the template cache on or off.
    pub fn cache_templates(mut self, enabled: bool) -> Self {
        self.cache_templates = enabled;
        self
    }

    /// Load settings from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(&EnvSource::new())
    }

    /// Load settings from a key/value source.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self> {
        let templates_root = required(source, TEMPLATES_ROOT_KEY)?;
        let host = required(source, SMTP_HOST_KEY)?;

        let mut settings = Self::new(templates_root, host);

        if let Some(port) = optional::<u16>(source, SMTP_PORT_KEY)? {
            settings.smtp.port = port;
        }
        if let Some(secs) = optional::<u64>(source, SMTP_TIMEOUT_KEY)? {
            settings.smtp.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = source.get(CACHE_TEMPLATES_KEY) {
            settings.cache_templates = parse_bool(CACHE_TEMPLATES_KEY, &raw)?;
        }

        Ok(settings)
    }

    /// Parse settings from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MailError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

fn required(source: &impl ConfigSource, key: &str) -> Result<String> {
    source
        .get(key)
        .ok_or_else(|| MailError::Config(format!("Configuration key not found: {}", key)))
}

fn optional<T: FromStr>(source: &impl ConfigSource, key: &str) -> Result<Option<T>> {
    source
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| MailError::Config(format!("Invalid value for {}: {:?}", key, raw)))
        })
        .transpose()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MailError::Config(format!(
            "Invalid value for {}: {:?}",
            key, raw
        ))),
    }
}
