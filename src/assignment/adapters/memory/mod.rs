//! In-memory adapters for tests and single-process embedding.

mod clock;
mod notifications;
mod repository;
mod roles;
mod templates;

pub use clock::ManualClock;
pub use notifications::{RecordingNotificationGateway, SentNotification};
pub use repository::InMemoryAssignmentRepository;
pub use roles::InMemoryRoleDirectory;
pub use templates::InMemoryTemplateRepository;
