//! Default due-date offsets per assignment type.

use super::{AssignmentDomainError, AssignmentType};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;

/// Day count used for types without an entry in the table.
pub const DEFAULT_SLA_DAYS: u32 = 5;

/// How the due date of a new assignment is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueDate {
    /// Use the per-type SLA table.
    #[default]
    Default,
    /// Due this many days after assignment.
    InDays(u32),
    /// Due at an explicit instant.
    At(DateTime<Utc>),
    /// No due date; the assignment never becomes overdue.
    None,
}

/// Per-type SLA table used when a caller gives no due date.
///
/// # Examples
///
/// ```
/// use universal_assignment::assignment::domain::{AssignmentType, SlaPolicy};
///
/// let policy = SlaPolicy::standard();
/// assert_eq!(policy.days_for(AssignmentType::DataUploadRequest), 7);
/// assert_eq!(policy.days_for(AssignmentType::RuleApproval), 1);
/// assert_eq!(policy.days_for(AssignmentType::QualityReview), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaPolicy {
    default_days: u32,
    days_by_type: HashMap<AssignmentType, u32>,
}

impl SlaPolicy {
    /// Returns the standard table of the testing workflow.
    #[must_use]
    pub fn standard() -> Self {
        let days_by_type = [
            (AssignmentType::DataUploadRequest, 7),
            (AssignmentType::FileReview, 3),
            (AssignmentType::DocumentReview, 5),
            (AssignmentType::DataValidation, 3),
            (AssignmentType::ScopingApproval, 2),
            (AssignmentType::SampleSelectionApproval, 2),
            (AssignmentType::RuleApproval, 1),
            (AssignmentType::ObservationApproval, 3),
            (AssignmentType::ReportApproval, 5),
            (AssignmentType::VersionApproval, 2),
            (AssignmentType::PhaseReview, 3),
            (AssignmentType::LobAssignment, 1),
            (AssignmentType::InformationRequest, 5),
            (AssignmentType::ClarificationRequired, 2),
        ]
        .into_iter()
        .collect();

        Self {
            default_days: DEFAULT_SLA_DAYS,
            days_by_type,
        }
    }

    /// Replaces the fallback day count for types without an entry.
    #[must_use]
    pub const fn with_default_days(mut self, days: u32) -> Self {
        self.default_days = days;
        self
    }

    /// Sets the day count for one assignment type.
    #[must_use]
    pub fn with_days(mut self, assignment_type: AssignmentType, days: u32) -> Self {
        self.days_by_type.insert(assignment_type, days);
        self
    }

    /// Returns the SLA in days for `assignment_type`.
    #[must_use]
    pub fn days_for(&self, assignment_type: AssignmentType) -> u32 {
        self.days_by_type
            .get(&assignment_type)
            .copied()
            .unwrap_or(self.default_days)
    }

    /// Resolves the due date of an assignment created at `assigned_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::DueDateOutOfRange`] when the day
    /// offset lands outside the representable calendar.
    pub fn due_date(
        &self,
        assignment_type: AssignmentType,
        requested: DueDate,
        assigned_at: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, AssignmentDomainError> {
        let days = match requested {
            DueDate::At(instant) => return Ok(Some(instant)),
            DueDate::None => return Ok(None),
            DueDate::InDays(days) => days,
            DueDate::Default => self.days_for(assignment_type),
        };
        TimeDelta::try_days(i64::from(days))
            .and_then(|offset| assigned_at.checked_add_signed(offset))
            .map(Some)
            .ok_or(AssignmentDomainError::DueDateOutOfRange(days))
    }
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
