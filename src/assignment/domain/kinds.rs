//! Closed classifications carried by every assignment.

use super::AssignmentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of work an assignment asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssignmentType {
    /// Request for a data provider to upload source data.
    #[serde(rename = "Data Upload Request")]
    DataUploadRequest,
    /// Review of an uploaded file.
    #[serde(rename = "File Review")]
    FileReview,
    /// Review of a supporting document.
    #[serde(rename = "Document Review")]
    DocumentReview,
    /// Validation of provided data.
    #[serde(rename = "Data Validation")]
    DataValidation,
    /// Sign-off on the attribute scoping decisions.
    #[serde(rename = "Scoping Approval")]
    ScopingApproval,
    /// Sign-off on the selected samples.
    #[serde(rename = "Sample Selection Approval")]
    SampleSelectionApproval,
    /// Sign-off on a generated profiling rule.
    #[serde(rename = "Rule Approval")]
    RuleApproval,
    /// Sign-off on a raised observation.
    #[serde(rename = "Observation Approval")]
    ObservationApproval,
    /// Sign-off on the final report.
    #[serde(rename = "Report Approval")]
    ReportApproval,
    /// Sign-off on a versioned artefact.
    #[serde(rename = "Version Approval")]
    VersionApproval,
    /// Review of a phase's outputs.
    #[serde(rename = "Phase Review")]
    PhaseReview,
    /// Sign-off allowing a phase to close.
    #[serde(rename = "Phase Approval")]
    PhaseApproval,
    /// Completion of a phase's remaining work.
    #[serde(rename = "Phase Completion")]
    PhaseCompletion,
    /// Advancing the workflow to the next phase.
    #[serde(rename = "Workflow Progression")]
    WorkflowProgression,
    /// Assigning a line of business to an attribute or sample.
    #[serde(rename = "LOB Assignment")]
    LobAssignment,
    /// Review of executed test results.
    #[serde(rename = "Test Execution Review")]
    TestExecutionReview,
    /// Quality review of produced work.
    #[serde(rename = "Quality Review")]
    QualityReview,
    /// Compliance review of produced work.
    #[serde(rename = "Compliance Review")]
    ComplianceReview,
    /// Assessment of risk for a report or attribute.
    #[serde(rename = "Risk Assessment")]
    RiskAssessment,
    /// Request for additional information.
    #[serde(rename = "Information Request")]
    InformationRequest,
    /// Request to clarify earlier input.
    #[serde(rename = "Clarification Required")]
    ClarificationRequired,
}

impl AssignmentType {
    /// Every supported assignment type.
    pub const ALL: [Self; 21] = [
        Self::DataUploadRequest,
        Self::FileReview,
        Self::DocumentReview,
        Self::DataValidation,
        Self::ScopingApproval,
        Self::SampleSelectionApproval,
        Self::RuleApproval,
        Self::ObservationApproval,
        Self::ReportApproval,
        Self::VersionApproval,
        Self::PhaseReview,
        Self::PhaseApproval,
        Self::PhaseCompletion,
        Self::WorkflowProgression,
        Self::LobAssignment,
        Self::TestExecutionReview,
        Self::QualityReview,
        Self::ComplianceReview,
        Self::RiskAssessment,
        Self::InformationRequest,
        Self::ClarificationRequired,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DataUploadRequest => "Data Upload Request",
            Self::FileReview => "File Review",
            Self::DocumentReview => "Document Review",
            Self::DataValidation => "Data Validation",
            Self::ScopingApproval => "Scoping Approval",
            Self::SampleSelectionApproval => "Sample Selection Approval",
            Self::RuleApproval => "Rule Approval",
            Self::ObservationApproval => "Observation Approval",
            Self::ReportApproval => "Report Approval",
            Self::VersionApproval => "Version Approval",
            Self::PhaseReview => "Phase Review",
            Self::PhaseApproval => "Phase Approval",
            Self::PhaseCompletion => "Phase Completion",
            Self::WorkflowProgression => "Workflow Progression",
            Self::LobAssignment => "LOB Assignment",
            Self::TestExecutionReview => "Test Execution Review",
            Self::QualityReview => "Quality Review",
            Self::ComplianceReview => "Compliance Review",
            Self::RiskAssessment => "Risk Assessment",
            Self::InformationRequest => "Information Request",
            Self::ClarificationRequired => "Clarification Required",
        }
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AssignmentType {
    type Error = AssignmentDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| AssignmentDomainError::UnknownAssignmentType(value.to_owned()))
    }
}

/// The business object an assignment is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContextType {
    /// A regulatory report.
    Report,
    /// A workflow phase of a report.
    Phase,
    /// A report attribute.
    Attribute,
    /// A selected sample.
    Sample,
    /// A profiling rule.
    Rule,
    /// A raised observation.
    Observation,
    /// An uploaded file.
    File,
    /// System-level work with no business object.
    System,
    /// Work about a user account.
    User,
}

impl ContextType {
    /// Every supported context type.
    pub const ALL: [Self; 9] = [
        Self::Report,
        Self::Phase,
        Self::Attribute,
        Self::Sample,
        Self::Rule,
        Self::Observation,
        Self::File,
        Self::System,
        Self::User,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Report => "Report",
            Self::Phase => "Phase",
            Self::Attribute => "Attribute",
            Self::Sample => "Sample",
            Self::Rule => "Rule",
            Self::Observation => "Observation",
            Self::File => "File",
            Self::System => "System",
            Self::User => "User",
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ContextType {
    type Error = AssignmentDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| AssignmentDomainError::UnknownContextType(value.to_owned()))
    }
}

/// Display and sorting priority. Carries no lifecycle behaviour.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal urgency.
    #[default]
    Medium,
    /// Should be picked up soon.
    High,
    /// Blocks other work.
    Critical,
    /// Needs immediate attention.
    Urgent,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
            Self::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = AssignmentDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            "urgent" => Ok(Self::Urgent),
            _ => Err(AssignmentDomainError::UnknownPriority(value.to_owned())),
        }
    }
}
