//! Adapter implementations for assignment ports.

pub mod memory;
mod notification;
pub mod postgres;

pub use notification::{NoopNotificationGateway, TracingNotificationGateway};
