//! Rendered message parts and outbound message assembly.

use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use serde::{Deserialize, Serialize};

use crate::{Attachment, MailError, Result};

/// Output of rendering a namespace against caller data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessageParts {
    /// Recipient.
    pub to: String,
    /// Rendered `from` metadata.
    pub from: String,
    /// Rendered `subject` metadata.
    pub subject: String,
    /// Rendered HTML body, if the namespace has one.
    pub html: Option<String>,
    /// Rendered plain text body, if the namespace has one.
    pub text: Option<String>,
    /// Attachments in caller order.
    pub attachments: Vec<Attachment>,
}

impl RenderedMessageParts {
    /// Parts for a non-templated message with a plain text body.
    pub fn raw(
        to: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            subject: subject.into(),
            html: None,
            text: Some(body.into()),
            attachments,
        }
    }
}

/// Body structure of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageBody {
    /// Single plain text part with no content.
    Empty,
    /// Single plain text part.
    Text(String),
    /// Single HTML part.
    Html(String),
    /// HTML with a plain text alternative view.
    Alternative {
        /// Preferred rendering.
        html: String,
        /// Fallback for clients without HTML support.
        text: String,
    },
}

impl MessageBody {
    /// Pick the body structure from optional renderings.
    ///
    /// Whitespace-only renderings count as absent.
    pub fn select(html: Option<&str>, text: Option<&str>) -> Self {
        let html = html.filter(|s| !s.trim().is_empty());
        let text = text.filter(|s| !s.trim().is_empty());

        match (html, text) {
            (Some(html), Some(text)) => Self::Alternative {
                html: html.to_string(),
                text: text.to_string(),
            },
            (Some(html), None) => Self::Html(html.to_string()),
            (None, Some(text)) => Self::Text(text.to_string()),
            (None, None) => Self::Empty,
        }
    }

    /// Whether the body carries an alternative view.
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Alternative { .. })
    }

    /// HTML rendering, if any.
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Html(html) | Self::Alternative { html, .. } => Some(html),
            _ => None,
        }
    }

    /// Plain text rendering, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Alternative { text, .. } => Some(text),
            Self::Empty => Some(""),
            Self::Html(_) => None,
        }
    }
}

/// A fully assembled message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient.
    pub to: String,
    /// Sender.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// Body structure.
    pub body: MessageBody,
    /// Attachments in caller order.
    pub attachments: Vec<Attachment>,
}

impl OutboundMessage {
    /// Assemble a message from rendered parts.
    ///
    /// Fails with [`MailError::InvalidAddress`] if `to` or `from` is not a
    /// valid mailbox and with [`MailError::Attachment`] if an attachment's
    /// content type does not parse.
    pub fn assemble(parts: RenderedMessageParts) -> Result<Self> {
        parse_mailbox(&parts.to)?;
        parse_mailbox(&parts.from)?;
        for attachment in &parts.attachments {
            content_type(attachment)?;
        }

        Ok(Self {
            body: MessageBody::select(parts.html.as_deref(), parts.text.as_deref()),
            to: parts.to,
            from: parts.from,
            subject: parts.subject,
            attachments: parts.attachments,
        })
    }

    /// Build a lettre message.
    pub fn to_lettre(&self) -> Result<lettre::Message> {
        let builder = lettre::Message::builder()
            .from(parse_mailbox(&self.from)?)
            .to(parse_mailbox(&self.to)?)
            .subject(self.subject.as_str());

        let body = match &self.body {
            MessageBody::Empty => Part::Single(SinglePart::plain(String::new())),
            MessageBody::Text(text) => Part::Single(SinglePart::plain(text.clone())),
            MessageBody::Html(html) => Part::Single(SinglePart::html(html.clone())),
            MessageBody::Alternative { html, text } => Part::Multi(
                MultiPart::alternative_plain_html(text.clone(), html.clone()),
            ),
        };

        let message = if self.attachments.is_empty() {
            match body {
                Part::Single(part) => builder.singlepart(part)?,
                Part::Multi(part) => builder.multipart(part)?,
            }
        } else {
            let mut mixed = match body {
                Part::Single(part) => MultiPart::mixed().singlepart(part),
                Part::Multi(part) => MultiPart::mixed().multipart(part),
            };
            for attachment in &self.attachments {
                mixed = mixed.singlepart(
                    lettre::message::Attachment::new(attachment.filename.clone())
                        .body(attachment.data.clone(), content_type(attachment)?),
                );
            }
            builder.multipart(mixed)?
        };

        Ok(message)
    }
}

enum Part {
    Single(SinglePart),
    Multi(MultiPart),
}

fn parse_mailbox(s: &str) -> Result<Mailbox> {
    s.trim()
        .parse::<Mailbox>()
        .map_err(|e| MailError::InvalidAddress(format!("{s}: {e}")))
}

fn content_type(attachment: &Attachment) -> Result<ContentType> {
    ContentType::parse(&attachment.content_type)
        .map_err(|e| MailError::Attachment(format!("{}: {}", attachment.filename, e)))
}
