//! Shared fixtures for in-memory assignment engine integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::fixture;
use universal_assignment::assignment::{
    adapters::memory::{
        InMemoryAssignmentRepository, InMemoryRoleDirectory, ManualClock,
        RecordingNotificationGateway,
    },
    domain::{ContextData, RoleName, UserId},
    services::{AssignmentEngine, CreateAssignmentRequest, EngineConfig},
};

pub const TESTER: UserId = UserId::new(10);
pub const DATA_OWNER: UserId = UserId::new(20);
pub const BACKUP_OWNER: UserId = UserId::new(21);
pub const REPORT_OWNER: UserId = UserId::new(30);
pub const TEST_EXECUTIVE: UserId = UserId::new(40);

/// Engine wired to in-memory adapters.
pub type TestEngine = AssignmentEngine<
    InMemoryAssignmentRepository,
    InMemoryRoleDirectory,
    RecordingNotificationGateway,
    ManualClock,
>;

/// Engine plus handles on the adapters it owns.
pub struct Workspace {
    pub engine: TestEngine,
    pub notifier: Arc<RecordingNotificationGateway>,
    pub clock: Arc<ManualClock>,
}

/// Monday morning the scenarios start at.
#[must_use]
pub fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 3, 8, 30, 0)
        .single()
        .unwrap_or_default()
}

fn role(name: &str) -> RoleName {
    RoleName::new(name).expect("scenario role names are non-blank")
}

fn directory() -> InMemoryRoleDirectory {
    let directory = InMemoryRoleDirectory::new();
    let members = [
        (TESTER, "Tester"),
        (DATA_OWNER, "Data Owner"),
        (BACKUP_OWNER, "Data Owner"),
        (REPORT_OWNER, "Report Owner"),
        (TEST_EXECUTIVE, "Test Executive"),
    ];
    for (user, name) in members {
        directory
            .add_user(user, [role(name)])
            .expect("directory accepts users");
    }
    directory
        .set_report_owner(156, REPORT_OWNER)
        .expect("directory accepts owners");
    directory
}

/// Provides an engine delivering notifications inline.
#[fixture]
pub fn workspace() -> Workspace {
    let settings = EngineConfig::from_json(r#"{ "notification_dispatch": "inline" }"#)
        .and_then(|config| config.settings())
        .expect("inline configuration is valid");
    let notifier = Arc::new(RecordingNotificationGateway::new());
    let clock = Arc::new(ManualClock::new(monday()));
    let engine = AssignmentEngine::new(
        Arc::new(InMemoryAssignmentRepository::new()),
        Arc::new(directory()),
        Arc::clone(&notifier),
        Arc::clone(&clock),
    )
    .with_settings(settings);
    Workspace {
        engine,
        notifier,
        clock,
    }
}

/// Context of report 156 in cycle 58.
#[must_use]
pub fn report_context() -> ContextData {
    ContextData::new()
        .with("cycle_id", 58)
        .with("report_id", 156)
        .with("phase_name", "Request Info")
}

/// Data upload request from the tester to the data owner role.
#[must_use]
pub fn data_upload_request() -> CreateAssignmentRequest {
    CreateAssignmentRequest::new(
        "Data Upload Request",
        "Report",
        "Tester",
        "Data Owner",
        TESTER,
        "Upload source data for report 156",
    )
    .with_context_data(report_context())
    .with_task_instructions("Attach the extract for every sampled account")
}
