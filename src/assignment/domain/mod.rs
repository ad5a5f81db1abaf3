//! Domain model for universal assignments.
//!
//! An assignment routes one piece of work from a requesting role to an
//! assignee role, tracks its due date, and moves through a validated
//! lifecycle. Every transition yields an [`AssignmentChange`] that becomes
//! one [`AssignmentHistory`] row. Infrastructure concerns stay outside this
//! boundary; time is read through an injected [`mockable::Clock`].

mod actor;
mod assignment;
mod context;
mod error;
mod filter;
mod history;
mod ids;
mod kinds;
mod lifecycle;
mod metrics;
mod sla;
mod status;
mod template;

pub use actor::Actor;
pub use assignment::{
    ApprovalDecision, Assignment, Attachment, Completion, Delegation, Escalation, NewAssignment,
    NO_DUE_DATE_DAYS, PersistedAssignmentData,
};
pub use context::ContextData;
pub use error::{
    AssignmentDomainError, ErrorKind, ParseAssignmentActionError, ParseAssignmentStatusError,
};
pub use filter::{AssignmentFilter, work_queue_order};
pub use history::{AssignmentChange, AssignmentHistory};
pub use ids::{AssignmentId, HistoryEntryId, RoleName, TemplateId, UserId};
pub use kinds::{AssignmentType, ContextType, Priority};
pub use lifecycle::CompletionPayload;
pub use metrics::AssignmentMetrics;
pub use sla::{DEFAULT_SLA_DAYS, DueDate, SlaPolicy};
pub use status::{AssignmentAction, AssignmentStatus};
pub use template::{AssignmentTemplate, RenderedTemplate};
