//! Behaviour tests for the assignment lifecycle.

#[path = "assignment_lifecycle_steps/mod.rs"]
mod assignment_lifecycle_steps_defs;

use assignment_lifecycle_steps_defs::world::{AssignmentWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/assignment_lifecycle.feature",
    name = "Data owner completes a data upload request"
)]
#[tokio::test(flavor = "multi_thread")]
async fn data_owner_completes_upload(world: AssignmentWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assignment_lifecycle.feature",
    name = "Approval is limited to the approval role"
)]
#[tokio::test(flavor = "multi_thread")]
async fn approval_limited_to_role(world: AssignmentWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assignment_lifecycle.feature",
    name = "Report owner signs off completed work"
)]
#[tokio::test(flavor = "multi_thread")]
async fn report_owner_signs_off(world: AssignmentWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assignment_lifecycle.feature",
    name = "Escalation leaves the assignee in place"
)]
#[tokio::test(flavor = "multi_thread")]
async fn escalation_keeps_assignee(world: AssignmentWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assignment_lifecycle.feature",
    name = "Work becomes overdue as time passes"
)]
#[tokio::test(flavor = "multi_thread")]
async fn work_becomes_overdue(world: AssignmentWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assignment_lifecycle.feature",
    name = "Completed work cannot be acknowledged"
)]
#[tokio::test(flavor = "multi_thread")]
async fn completed_work_cannot_be_acknowledged(world: AssignmentWorld) {
    let _ = world;
}
