//! Given steps for assignment lifecycle BDD scenarios.

use super::world::{AssignmentWorld, run_async, user_named};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use universal_assignment::assignment::{
    domain::{CompletionPayload, ContextData},
    services::CreateAssignmentRequest,
};

#[given(r#"a data upload request from "{requester}" for report {report_id:u64}"#)]
fn data_upload_request(
    world: &mut AssignmentWorld,
    requester: String,
    report_id: u64,
) -> Result<(), eyre::Report> {
    let request = CreateAssignmentRequest::new(
        "Data Upload Request",
        "Report",
        "Tester",
        "Data Owner",
        user_named(&requester)?,
        format!("Upload source data for report {report_id}"),
    )
    .with_context_data(ContextData::new().with("report_id", report_id));
    let created = run_async(world.engine.create(request))
        .wrap_err("create data upload request for scenario")?;
    world.current = Some(created);
    Ok(())
}

#[given(r#"a scoping approval request from "{requester}" requiring "{role}" sign-off"#)]
fn scoping_approval_request(
    world: &mut AssignmentWorld,
    requester: String,
    role: String,
) -> Result<(), eyre::Report> {
    let request = CreateAssignmentRequest::new(
        "Scoping Approval",
        "Report",
        "Tester",
        "Test Executive",
        user_named(&requester)?,
        "Review scoping decisions",
    )
    .requiring_approval()
    .with_approval_role(role);
    let created = run_async(world.engine.create(request))
        .wrap_err("create scoping approval request for scenario")?;
    world.current = Some(created);
    Ok(())
}

#[given(r#""{user}" has completed the assignment"#)]
fn has_completed(world: &mut AssignmentWorld, user: String) -> Result<(), eyre::Report> {
    let id = world.current_id()?;
    let completed = run_async(world.engine.complete(
        id,
        user_named(&user)?,
        CompletionPayload::new(),
    ))
    .wrap_err("complete assignment in scenario setup")?;
    world.current = Some(completed);
    Ok(())
}
