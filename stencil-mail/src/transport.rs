//! Email transport implementations.

use lettre::Transport as _;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::{OutboundMessage, Result};

/// Email transport trait.
///
/// Sends block until the relay accepts the message or the transport gives up.
pub trait Transport: Send + Sync {
    /// Send an assembled message.
    fn send(&self, message: &OutboundMessage) -> Result<()>;

    /// Check if the transport is healthy.
    fn is_healthy(&self) -> bool {
        true
    }
}

/// SMTP configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP relay host.
    pub host: String,
    /// SMTP relay port.
    pub port: u16,
    /// Connection timeout.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl SmtpConfig {
    /// Default relay port.
    pub const DEFAULT_PORT: u16 = 25;

    /// Default connection timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new SMTP configuration.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the connection timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self::new("localhost")
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// SMTP transport to an unauthenticated relay.
pub struct SmtpTransport {
    transport: lettre::SmtpTransport,
    config: SmtpConfig,
}

impl SmtpTransport {
    /// Create a new SMTP transport.
    ///
    /// No connection is opened until the first send.
    pub fn new(config: SmtpConfig) -> Self {
        let transport = lettre::SmtpTransport::builder_dangerous(&config.host)
            .port(config.port)
            .timeout(Some(config.timeout))
            .build();

        info!(
            host = %config.host,
            port = config.port,
            timeout_secs = config.timeout.as_secs(),
            "SMTP transport initialized"
        );

        Self { transport, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    /// Test the SMTP connection.
    pub fn test_connection(&self) -> Result<bool> {
        Ok(self.transport.test_connection()?)
    }
}

impl Transport for SmtpTransport {
    fn send(&self, message: &OutboundMessage) -> Result<()> {
        let email = message.to_lettre()?;

        debug!(
            to = %message.to,
            subject = %message.subject,
            host = %self.config.host,
            "Sending email via SMTP"
        );

        self.transport.send(&email)?;
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.test_connection().unwrap_or(false)
    }
}
