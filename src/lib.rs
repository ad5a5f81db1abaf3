//! Universal assignment engine for multi-phase testing workflows.
//!
//! Every hand-off in the surrounding workflow (scoping approval, sample
//! selection, data upload requests, rule approval, LOB assignment) is an
//! instance of one abstraction: an assignment routed from one
//! organizational role to another, with a due date, escalation,
//! delegation, optional sign-off and a complete audit trail.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence, role lookup,
//!   templates and notifications
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`assignment`]: Assignment lifecycle, queries and metrics

pub mod assignment;
