//! Error types for assignment domain validation and transitions.

use super::{AssignmentAction, AssignmentId, AssignmentStatus, UserId};
use thiserror::Error;

/// Errors returned by assignment construction and state transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignmentDomainError {
    /// The assignment title is empty after trimming.
    #[error("assignment title must not be empty")]
    EmptyTitle,

    /// A role name is empty after trimming.
    #[error("role name must not be empty")]
    EmptyRoleName,

    /// The assignment type is not one of the supported types.
    #[error("unknown assignment type: {0}")]
    UnknownAssignmentType(String),

    /// The context type is not one of the supported context types.
    #[error("unknown context type: {0}")]
    UnknownContextType(String),

    /// The priority is not one of the supported priorities.
    #[error("unknown priority: {0}")]
    UnknownPriority(String),

    /// An approval role was supplied for an assignment without approval.
    #[error("approval role given but the assignment does not require approval")]
    ApprovalRoleWithoutApproval,

    /// The action requires a non-empty reason.
    #[error("{verb} requires a non-empty reason", verb = .0.verb())]
    MissingReason(AssignmentAction),

    /// The SLA offset does not fit the calendar.
    #[error("due date {0} days after assignment is out of range")]
    DueDateOutOfRange(u32),

    /// A user attempted to delegate an assignment to themselves.
    #[error("user {0} cannot delegate an assignment to themselves")]
    SelfDelegation(UserId),

    /// The action is not legal from the current status.
    #[error("cannot {verb} assignment {id} while it is {from}", verb = .action.verb())]
    InvalidTransition {
        /// Assignment the action targeted.
        id: AssignmentId,
        /// Attempted action.
        action: AssignmentAction,
        /// Status at the time of the attempt.
        from: AssignmentStatus,
    },

    /// Approval actions were attempted on an assignment without approval.
    #[error("assignment {0} does not require approval")]
    ApprovalNotRequired(AssignmentId),

    /// The acting user lacks authority for the action.
    #[error("user {user} is not allowed to {verb} assignment {id}", verb = .action.verb())]
    NotAuthorized {
        /// Assignment the action targeted.
        id: AssignmentId,
        /// Acting user.
        user: UserId,
        /// Attempted action.
        action: AssignmentAction,
    },

    /// The referenced parent assignment does not exist.
    #[error("parent assignment not found: {0}")]
    ParentNotFound(AssignmentId),

    /// The parent chain loops back on itself.
    #[error("parent chain of assignment {0} contains a cycle")]
    HierarchyCycle(AssignmentId),

    /// The parent chain exceeds the configured depth.
    #[error("parent chain of assignment {parent} is deeper than {max_depth}")]
    HierarchyTooDeep {
        /// Requested parent.
        parent: AssignmentId,
        /// Configured maximum depth.
        max_depth: usize,
    },

    /// No active template exists for the requested routing.
    #[error("no active template for {assignment_type} from {from_role} to {to_role}")]
    TemplateNotFound {
        /// Requested assignment type label.
        assignment_type: String,
        /// Requested source role.
        from_role: String,
        /// Requested target role.
        to_role: String,
    },

    /// A template placeholder failed to render.
    #[error("failed to render template field {field}: {reason}")]
    TemplateRender {
        /// Template field being rendered.
        field: &'static str,
        /// Renderer message.
        reason: String,
    },
}

impl AssignmentDomainError {
    /// Classifies the error for callers that translate it to transport codes.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransition { .. } | Self::ApprovalNotRequired(_) => {
                ErrorKind::InvalidTransition
            }
            Self::NotAuthorized { .. } => ErrorKind::Forbidden,
            Self::EmptyTitle
            | Self::EmptyRoleName
            | Self::UnknownAssignmentType(_)
            | Self::UnknownContextType(_)
            | Self::UnknownPriority(_)
            | Self::ApprovalRoleWithoutApproval
            | Self::MissingReason(_)
            | Self::DueDateOutOfRange(_)
            | Self::SelfDelegation(_)
            | Self::ParentNotFound(_)
            | Self::HierarchyCycle(_)
            | Self::HierarchyTooDeep { .. }
            | Self::TemplateNotFound { .. }
            | Self::TemplateRender { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// Caller-facing failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The assignment does not exist.
    NotFound,
    /// The actor lacks authority for the action.
    Forbidden,
    /// The action is not legal from the current status.
    InvalidTransition,
    /// A required field is missing or malformed.
    InvalidInput,
    /// Infrastructure failed; never produced by correct engine usage.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status an API layer should answer with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Forbidden => 403,
            Self::InvalidTransition | Self::InvalidInput => 400,
            Self::Internal => 500,
        }
    }
}

/// Error returned while parsing assignment statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment status: {0}")]
pub struct ParseAssignmentStatusError(pub String);

/// Error returned while parsing history actions from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment action: {0}")]
pub struct ParseAssignmentActionError(pub String);
