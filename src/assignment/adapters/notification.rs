//! Notification gateways that need no external channel.

use async_trait::async_trait;
use tracing::info;

use crate::assignment::{
    domain::{Assignment, AssignmentAction, UserId},
    ports::{NotificationGateway, NotificationResult},
};

/// Gateway that logs each delivery through `tracing`.
///
/// Useful as a stand-in until an email or chat channel is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationGateway;

#[async_trait]
impl NotificationGateway for TracingNotificationGateway {
    async fn notify(
        &self,
        recipient: UserId,
        assignment: &Assignment,
        action: AssignmentAction,
    ) -> NotificationResult<()> {
        info!(
            recipient = recipient.value(),
            assignment_id = %assignment.id(),
            action = action.as_str(),
            status = assignment.status().as_str(),
            title = assignment.title(),
            "assignment notification"
        );
        Ok(())
    }
}

/// Gateway that discards every delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationGateway;

#[async_trait]
impl NotificationGateway for NoopNotificationGateway {
    async fn notify(
        &self,
        _recipient: UserId,
        _assignment: &Assignment,
        _action: AssignmentAction,
    ) -> NotificationResult<()> {
        Ok(())
    }
}
