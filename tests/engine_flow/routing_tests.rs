//! Escalation, delegation, hold and overdue handling.

use super::helpers::{
    BACKUP_OWNER, DATA_OWNER, TESTER, TEST_EXECUTIVE, Workspace, data_upload_request, workspace,
};
use chrono::Duration;
use eyre::{Result, ensure};
use rstest::rstest;
use universal_assignment::assignment::domain::{
    AssignmentAction, AssignmentFilter, AssignmentStatus, CompletionPayload, ErrorKind,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn escalation_keeps_the_assignee(workspace: Workspace) -> Result<()> {
    let engine = &workspace.engine;
    let created = engine.create(data_upload_request()).await?;
    engine.start(created.id(), DATA_OWNER).await?;

    let escalated = engine
        .escalate(
            created.id(),
            TESTER,
            "No upload after two reminders",
            Some(TEST_EXECUTIVE),
        )
        .await?;

    ensure!(escalated.status() == AssignmentStatus::Escalated);
    ensure!(escalated.to_user_id() == Some(DATA_OWNER));
    ensure!(escalated.escalated());
    ensure!(
        workspace.notifier.recipients_of(AssignmentAction::Escalated) == vec![TEST_EXECUTIVE]
    );

    let completed = engine
        .complete(created.id(), DATA_OWNER, CompletionPayload::new())
        .await?;
    ensure!(completed.status() == AssignmentStatus::Completed);
    ensure!(completed.escalated());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delegation_shares_the_work(workspace: Workspace) -> Result<()> {
    let engine = &workspace.engine;
    let created = engine.create(data_upload_request()).await?;
    engine
        .delegate(
            created.id(),
            DATA_OWNER,
            BACKUP_OWNER,
            Some("Out of office".to_owned()),
        )
        .await?;

    let backup_queue = engine
        .list_for_user(BACKUP_OWNER, AssignmentFilter::new())
        .await?;
    ensure!(backup_queue.len() == 1);

    let completed = engine
        .complete(created.id(), BACKUP_OWNER, CompletionPayload::new())
        .await?;
    ensure!(completed.completed_by_user_id() == Some(BACKUP_OWNER));
    ensure!(completed.to_user_id() == Some(DATA_OWNER));
    ensure!(workspace.notifier.recipients_of(AssignmentAction::Completed) == vec![TESTER]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hold_and_resume_round_trip(workspace: Workspace) -> Result<()> {
    let engine = &workspace.engine;
    let created = engine.create(data_upload_request()).await?;
    engine.acknowledge(created.id(), DATA_OWNER).await?;

    let held = engine
        .hold(created.id(), TESTER, Some("Awaiting scope change".to_owned()))
        .await?;
    ensure!(held.status() == AssignmentStatus::OnHold);

    let escalation = engine
        .escalate(created.id(), TESTER, "Still waiting", None)
        .await?;
    ensure!(escalation.status() == AssignmentStatus::Escalated);
    ensure!(escalation.status_before_hold().is_none());

    let second_hold = engine.hold(created.id(), DATA_OWNER, None).await?;
    ensure!(second_hold.status_before_hold() == Some(AssignmentStatus::Escalated));
    let resumed = engine.resume(created.id(), DATA_OWNER).await?;
    ensure!(resumed.status() == AssignmentStatus::Escalated);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdue_is_computed_not_stored(workspace: Workspace) -> Result<()> {
    let engine = &workspace.engine;
    let created = engine.create(data_upload_request()).await?;

    workspace.clock.advance(Duration::days(6));
    ensure!(engine.list_overdue().await?.is_empty());

    workspace.clock.advance(Duration::days(2));
    let overdue = engine.list_overdue().await?;
    ensure!(overdue.len() == 1);
    let stored = engine.get(created.id()).await?;
    ensure!(stored.status() == AssignmentStatus::Assigned);
    ensure!(stored.days_until_due(engine.now()) == -1);

    engine
        .complete(created.id(), DATA_OWNER, CompletionPayload::new())
        .await?;
    ensure!(engine.list_overdue().await?.is_empty());
    let metrics = engine.metrics(AssignmentFilter::new()).await?;
    ensure!(metrics.overdue_count() == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_work_is_closed(workspace: Workspace) -> Result<()> {
    let engine = &workspace.engine;
    let created = engine.create(data_upload_request()).await?;

    let blank = engine
        .cancel(created.id(), TESTER, " ")
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("blank reason must fail"))?;
    ensure!(blank.kind() == ErrorKind::InvalidInput);

    engine
        .cancel(created.id(), TESTER, "Report withdrawn from cycle")
        .await?;
    let late = engine
        .complete(created.id(), DATA_OWNER, CompletionPayload::new())
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("cancelled work cannot complete"))?;
    ensure!(late.kind() == ErrorKind::InvalidTransition);
    ensure!(workspace.notifier.recipients_of(AssignmentAction::Cancelled) == vec![DATA_OWNER]);
    Ok(())
}
