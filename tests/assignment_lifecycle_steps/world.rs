//! Shared world state for assignment lifecycle BDD scenarios.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::fixture;
use universal_assignment::assignment::{
    adapters::memory::{
        InMemoryAssignmentRepository, InMemoryRoleDirectory, ManualClock,
        RecordingNotificationGateway,
    },
    domain::{Assignment, AssignmentId, RoleName, UserId},
    services::{
        AssignmentEngine, AssignmentEngineError, AssignmentEngineResult, EngineSettings,
        NotificationDispatch,
    },
};

/// Engine type used by the BDD world.
pub type TestEngine = AssignmentEngine<
    InMemoryAssignmentRepository,
    InMemoryRoleDirectory,
    RecordingNotificationGateway,
    ManualClock,
>;

const MEMBERS: [(&str, i64, &str); 4] = [
    ("tester", 10, "Tester"),
    ("data owner", 20, "Data Owner"),
    ("report owner", 30, "Report Owner"),
    ("test executive", 40, "Test Executive"),
];

/// Scenario world for assignment lifecycle behaviour tests.
pub struct AssignmentWorld {
    pub engine: TestEngine,
    pub notifier: Arc<RecordingNotificationGateway>,
    pub clock: Arc<ManualClock>,
    pub current: Option<Assignment>,
    pub last_error: Option<AssignmentEngineError>,
}

impl AssignmentWorld {
    /// Creates a world whose directory holds one user per scenario name.
    #[must_use]
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryRoleDirectory::new());
        for (_, id, role) in MEMBERS {
            let name = RoleName::new(role).expect("scenario roles are non-blank");
            directory
                .add_user(UserId::new(id), [name])
                .expect("directory accepts users");
        }
        let notifier = Arc::new(RecordingNotificationGateway::new());
        let start = Utc
            .with_ymd_and_hms(2025, 4, 7, 9, 0, 0)
            .single()
            .unwrap_or_default();
        let clock = Arc::new(ManualClock::new(start));
        let engine = AssignmentEngine::new(
            Arc::new(InMemoryAssignmentRepository::new()),
            directory,
            Arc::clone(&notifier),
            Arc::clone(&clock),
        )
        .with_settings(EngineSettings {
            notification_dispatch: NotificationDispatch::Inline,
            ..EngineSettings::default()
        });

        Self {
            engine,
            notifier,
            clock,
            current: None,
            last_error: None,
        }
    }

    /// Returns the identifier of the assignment under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no assignment has been created yet.
    pub fn current_id(&self) -> Result<AssignmentId, eyre::Report> {
        self.current
            .as_ref()
            .map(Assignment::id)
            .ok_or_else(|| eyre::eyre!("missing assignment in scenario world"))
    }

    /// Keeps the outcome of an engine call for later assertions.
    pub fn record(&mut self, result: AssignmentEngineResult<Assignment>) {
        match result {
            Ok(updated) => {
                self.current = Some(updated);
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err),
        }
    }
}

impl Default for AssignmentWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a scenario user name to its identifier.
///
/// # Errors
///
/// Returns an error for names the directory does not know.
pub fn user_named(name: &str) -> Result<UserId, eyre::Report> {
    MEMBERS
        .iter()
        .find(|(member, _, _)| member.eq_ignore_ascii_case(name.trim()))
        .map(|(_, id, _)| UserId::new(*id))
        .ok_or_else(|| eyre::eyre!("unknown scenario user: {name}"))
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AssignmentWorld {
    AssignmentWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
