//! Universal assignments: routing work between organizational roles.
//!
//! An assignment carries a piece of work from a requesting role to an
//! assignee, tracks its due date, supports escalation, delegation and
//! sign-off, and records every change in an append-only audit trail. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
