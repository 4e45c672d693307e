//! # Stencil Mail
//!
//! Convention-based templated email.
//!
//! A template *namespace* such as `password/update` names up to three sibling
//! files under a templates root:
//!
//! - `password/update.cfg` (required): `key: value` lines with at least `from`
//!   and `subject`, both rendered as templates
//! - `password/update.html` (optional): HTML body template
//! - `password/update.txt` (optional): plain text body template
//!
//! With both bodies present a multipart/alternative message is sent; with one,
//! a single-part message; with neither, an empty plain text body.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stencil_mail::{Mailer, MailSettings};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // EMAIL_TEMPLATES_ROOT and SMTP_HOST
//!     let settings = MailSettings::from_env()?;
//!     let mailer = Mailer::from_settings(&settings);
//!
//!     mailer.send_template(
//!         "jim@example.com",
//!         "password/update",
//!         &json!({ "firstname": "Jim", "passwordtoken": "askf238fuhawf2983ghf" }),
//!         Vec::new(),
//!     )?;
//!
//!     // Non-templated
//!     mailer.send("jim@example.com", "ops@example.com", "Hello", "Plain body", Vec::new())?;
//!     Ok(())
//! }
//! ```
//!
//! Sends are fire-and-forget: once a message is assembled, transport failures
//! are reported to a [`DeliveryObserver`] and the send still returns `Ok(())`.

mod attachment;
mod config;
mod email;
mod error;
mod mailer;
mod metadata;
mod namespace;
mod observer;
mod store;
mod transport;

#[cfg(feature = "handlebars")]
mod template_handlebars;

pub use attachment::Attachment;
pub use config::{ConfigSource, EnvSource, MailSettings};
pub use email::{MessageBody, OutboundMessage, RenderedMessageParts};
pub use error::{MailError, Result};
pub use mailer::Mailer;
pub use metadata::{TemplateMetadata, REQUIRED_FIELDS};
pub use namespace::TemplateNamespace;
pub use observer::{DeliveryObserver, TracingObserver};
pub use store::{ResolvedTemplate, TemplatePaths, TemplateStore};
pub use transport::{SmtpConfig, SmtpTransport, Transport};

#[cfg(feature = "handlebars")]
pub use template_handlebars::HandlebarsEngine;

/// Renders a template string against caller data.
///
/// Implementations must not mutate `data`.
pub trait RenderEngine: Send + Sync {
    /// Render `template` with `data`.
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String>;
}

/// Prelude for common imports.
///
/// ```
/// use stencil_mail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attachment::Attachment;
    pub use crate::config::{ConfigSource, EnvSource, MailSettings};
    pub use crate::email::{MessageBody, OutboundMessage, RenderedMessageParts};
    pub use crate::error::{MailError, Result};
    pub use crate::mailer::Mailer;
    pub use crate::observer::{DeliveryObserver, TracingObserver};
    pub use crate::store::{ResolvedTemplate, TemplateStore};
    pub use crate::transport::{SmtpConfig, SmtpTransport, Transport};
    pub use crate::RenderEngine;

    #[cfg(feature = "handlebars")]
    pub use crate::HandlebarsEngine;
}
