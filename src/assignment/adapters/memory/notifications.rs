//! Notification gateway that records deliveries for later inspection.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::assignment::{
    domain::{Assignment, AssignmentAction, AssignmentId, UserId},
    ports::{NotificationError, NotificationGateway, NotificationResult},
};

/// One recorded delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentNotification {
    /// User notified.
    pub recipient: UserId,
    /// Assignment the event concerns.
    pub assignment_id: AssignmentId,
    /// Event delivered.
    pub action: AssignmentAction,
}

/// Gateway keeping every delivery in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationGateway {
    sent: Arc<Mutex<Vec<SentNotification>>>,
}

impl RecordingNotificationGateway {
    /// Creates a gateway with no recorded deliveries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the deliveries recorded so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Returns the recipients of one event, in delivery order.
    #[must_use]
    pub fn recipients_of(&self, action: AssignmentAction) -> Vec<UserId> {
        self.sent()
            .into_iter()
            .filter(|notification| notification.action == action)
            .map(|notification| notification.recipient)
            .collect()
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotificationGateway {
    async fn notify(
        &self,
        recipient: UserId,
        assignment: &Assignment,
        action: AssignmentAction,
    ) -> NotificationResult<()> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|err| NotificationError::delivery(std::io::Error::other(err.to_string())))?;
        sent.push(SentNotification {
            recipient,
            assignment_id: assignment.id(),
            action,
        });
        Ok(())
    }
}
