//! Port contracts for the assignment engine.
//!
//! Ports define infrastructure-agnostic interfaces used by the engine:
//! persistence, role membership, template lookup and outbound
//! notifications.

pub mod notification;
pub mod repository;
pub mod roles;
pub mod template;

pub use notification::{NotificationError, NotificationGateway, NotificationResult};
pub use repository::{AssignmentRepository, AssignmentRepositoryError, AssignmentRepositoryResult};
pub use roles::{RoleResolutionError, RoleResolutionResult, RoleResolver};
pub use template::{
    AssignmentTemplateRepository, TemplateRepositoryError, TemplateRepositoryResult,
};
