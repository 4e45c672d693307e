//! Mail error types.

use thiserror::Error;

/// Result type for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// Mail errors.
#[derive(Debug, Error)]
pub enum MailError {
    /// No metadata file exists for the namespace.
    #[error("Email template file(s) not found for {0}")]
    TemplateNotFound(String),

    /// Namespace cannot name a file under the templates root.
    #[error("Invalid template namespace: {0:?}")]
    InvalidNamespace(String),

    /// Missing required metadata field.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Attachment error.
    #[error("Attachment error: {0}")]
    Attachment(String),

    /// SMTP error.
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Any other transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MailError {
    /// Check if this error happened while handing a message to the relay.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Smtp(_) | Self::Transport(_))
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Smtp(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Smtp(err.to_string())
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MailError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(feature = "handlebars")]
impl From<handlebars::RenderError> for MailError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}
