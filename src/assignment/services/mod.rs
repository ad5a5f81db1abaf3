//! Application services for assignment orchestration.

mod config;
mod engine;
mod recipients;
mod requests;

pub use config::{
    DEFAULT_ADMIN_ROLE, DEFAULT_MAX_HIERARCHY_DEPTH, EngineConfig, EngineConfigError,
    EngineSettings, NotificationDispatch,
};
pub use engine::{AssignmentEngine, AssignmentEngineError, AssignmentEngineResult};
pub use recipients::recipients_for;
pub use requests::CreateAssignmentRequest;
