//! `PostgreSQL` adapters for assignment persistence.
//!
//! The schema lives in `migrations/`; each write runs the assignment row
//! and its history entry inside one Diesel transaction.

mod models;
mod repository;
mod schema;

pub use repository::{AssignmentPgPool, PostgresAssignmentRepository};
