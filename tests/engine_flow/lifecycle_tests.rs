//! End-to-end lifecycle flows through the public engine API.

use super::helpers::{
    DATA_OWNER, REPORT_OWNER, TESTER, TEST_EXECUTIVE, Workspace, data_upload_request, monday,
    report_context, workspace,
};
use chrono::Duration;
use eyre::{Result, WrapErr, ensure};
use rstest::rstest;
use universal_assignment::assignment::{
    domain::{
        Assignment, AssignmentAction, AssignmentStatus, Attachment, CompletionPayload, ContextData,
        ContextType, ErrorKind,
    },
    services::CreateAssignmentRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn data_upload_round_trip(workspace: Workspace) -> Result<()> {
    let engine = &workspace.engine;
    let created = engine
        .create(data_upload_request())
        .await
        .wrap_err("create data upload request")?;
    ensure!(created.to_user_id() == Some(DATA_OWNER));
    ensure!(created.due_date() == Some(monday() + Duration::days(7)));

    workspace.clock.advance(Duration::hours(3));
    engine.acknowledge(created.id(), DATA_OWNER).await?;
    engine.start(created.id(), DATA_OWNER).await?;
    workspace.clock.advance(Duration::days(1));
    let payload = CompletionPayload::new()
        .with_notes("Extract attached")
        .with_data("row_count", 1_250)
        .with_attachment(
            Attachment::new("extract.csv", "uploads/156/extract.csv")
                .with_content_type("text/csv")
                .with_size_bytes(48_213),
        );
    let completed = engine.complete(created.id(), DATA_OWNER, payload).await?;

    ensure!(completed.status() == AssignmentStatus::Completed);
    ensure!(completed.is_terminal());
    ensure!(completed.completed_at() == Some(monday() + Duration::hours(27)));
    let history = engine.history(created.id()).await?;
    ensure!(history.len() == 4, "expected four audit rows, got {}", history.len());
    ensure!(
        history
            .iter()
            .zip(history.iter().skip(1))
            .all(|(earlier, later)| earlier.recorded_at <= later.recorded_at)
    );
    ensure!(workspace.notifier.recipients_of(AssignmentAction::Completed) == vec![TESTER]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scoping_approval_needs_report_owner(workspace: Workspace) -> Result<()> {
    let engine = &workspace.engine;
    let request = CreateAssignmentRequest::new(
        "Scoping Approval",
        "Report",
        "Tester",
        "Test Executive",
        TESTER,
        "Review scoping decisions",
    )
    .with_context_data(report_context())
    .requiring_approval()
    .with_approval_role("Report Owner");
    let created = engine.create(request).await?;
    ensure!(created.to_user_id() == Some(TEST_EXECUTIVE));

    engine
        .complete(created.id(), TEST_EXECUTIVE, CompletionPayload::new())
        .await?;
    let refused = engine
        .approve(created.id(), TESTER, None)
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("tester must not approve"))?;
    ensure!(refused.kind() == ErrorKind::Forbidden);

    let rejected = engine
        .reject(created.id(), REPORT_OWNER, "Missing two attributes")
        .await?;
    ensure!(rejected.status() == AssignmentStatus::Rejected);
    let decision = rejected
        .approval()
        .ok_or_else(|| eyre::eyre!("rejection decision recorded"))?;
    ensure!(decision.notes.as_deref() == Some("Missing two attributes"));

    let resubmitted = engine
        .create(
            CreateAssignmentRequest::new(
                "Scoping Approval",
                "Report",
                "Tester",
                "Test Executive",
                TESTER,
                "Review scoping decisions (second pass)",
            )
            .with_context_data(report_context())
            .requiring_approval()
            .with_parent(rejected.id()),
        )
        .await?;
    let children = engine.list_children(rejected.id()).await?;
    ensure!(children.iter().map(Assignment::id).eq([resubmitted.id()]));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn report_owner_routing_uses_context(workspace: Workspace) -> Result<()> {
    let created = workspace
        .engine
        .create(
            CreateAssignmentRequest::new(
                "Report Approval",
                "Report",
                "Test Executive",
                "Report Owner",
                TEST_EXECUTIVE,
                "Sign off report 156",
            )
            .with_context_data(ContextData::new().with("report_id", "156")),
        )
        .await?;
    ensure!(created.to_user_id() == Some(REPORT_OWNER));

    let listed = workspace
        .engine
        .list_by_context(
            ContextType::Report,
            ContextData::new().with("report_id", 156),
            [AssignmentStatus::Assigned],
        )
        .await?;
    ensure!(listed.iter().any(|assignment| assignment.id() == created.id()));
    Ok(())
}
