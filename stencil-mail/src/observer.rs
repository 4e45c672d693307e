//! Delivery outcome reporting.
//!
//! Sends are fire-and-forget: a transport failure never fails the caller's
//! send. The outcome goes to a [`DeliveryObserver`] instead.

use tracing::{info, warn};

use crate::{MailError, OutboundMessage};

/// Receives the outcome of every transport hand-off.
pub trait DeliveryObserver: Send + Sync {
    /// The relay accepted the message.
    fn delivered(&self, message: &OutboundMessage);

    /// The transport failed; the caller has already been told the send succeeded.
    fn failed(&self, message: &OutboundMessage, error: &MailError);
}

/// Observer that logs outcomes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DeliveryObserver for TracingObserver {
    fn delivered(&self, message: &OutboundMessage) {
        info!(to = %message.to, subject = %message.subject, "Email sent");
    }

    fn failed(&self, message: &OutboundMessage, error: &MailError) {
        warn!(
            to = %message.to,
            subject = %message.subject,
            error = %error,
            "Email delivery failed"
        );
    }
}
