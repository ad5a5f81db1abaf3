//! Outbound notification port.

use crate::assignment::domain::{Assignment, AssignmentAction, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification delivery.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Delivers assignment events to users.
///
/// Delivery is best-effort: the engine logs and discards failures.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Tells `recipient` that `action` happened on `assignment`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery fails.
    async fn notify(
        &self,
        recipient: UserId,
        assignment: &Assignment,
        action: AssignmentAction,
    ) -> NotificationResult<()>;
}

/// Errors returned by notification gateways.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// The recipient cannot be reached.
    #[error("recipient {0} cannot be notified")]
    UnknownRecipient(UserId),

    /// The delivery channel failed.
    #[error("notification delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationError {
    /// Wraps a delivery failure.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
