//! Unit tests for the assignment module.

mod filter_metrics_tests;
mod fixtures;
