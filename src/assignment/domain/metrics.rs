//! Aggregate counters over a set of assignments.

use super::{Assignment, AssignmentStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Point-in-time statistics for a filtered set of assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssignmentMetrics {
    total: usize,
    by_status: BTreeMap<AssignmentStatus, usize>,
    completion_rate: f64,
    overdue_count: usize,
}

impl AssignmentMetrics {
    /// Computes metrics, judging overdue status at `now`.
    #[must_use]
    pub fn from_assignments<'a>(
        assignments: impl IntoIterator<Item = &'a Assignment>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut metrics = Self::default();
        for assignment in assignments {
            metrics.total += 1;
            *metrics.by_status.entry(assignment.status()).or_insert(0) += 1;
            if assignment.is_overdue(now) {
                metrics.overdue_count += 1;
            }
        }
        metrics.completion_rate = completion_rate(
            metrics.count(AssignmentStatus::Completed) + metrics.count(AssignmentStatus::Approved),
            metrics.total,
        );
        metrics
    }

    /// Returns the number of assignments considered.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns counts keyed by status. Statuses with no assignments are
    /// absent.
    #[must_use]
    pub const fn by_status(&self) -> &BTreeMap<AssignmentStatus, usize> {
        &self.by_status
    }

    /// Returns the count for one status.
    #[must_use]
    pub fn count(&self, status: AssignmentStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Returns `(Completed + Approved) / total`, or `0.0` for an empty set.
    #[must_use]
    pub const fn completion_rate(&self) -> f64 {
        self.completion_rate
    }

    /// Returns the number of assignments overdue at computation time.
    #[must_use]
    pub const fn overdue_count(&self) -> usize {
        self.overdue_count
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "assignment counts stay far below f64 mantissa precision"
)]
fn completion_rate(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    done as f64 / total as f64
}
