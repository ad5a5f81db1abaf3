//! Competing writers on a single assignment.

use super::helpers::{BACKUP_OWNER, DATA_OWNER, Workspace, data_upload_request, workspace};
use eyre::{Result, ensure};
use rstest::rstest;
use universal_assignment::assignment::domain::{AssignmentStatus, CompletionPayload, ErrorKind};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exactly_one_concurrent_completion_wins(workspace: Workspace) -> Result<()> {
    let engine = workspace.engine.clone();
    let created = engine.create(data_upload_request()).await?;
    engine
        .delegate(created.id(), DATA_OWNER, BACKUP_OWNER, None)
        .await?;

    let id = created.id();
    let by_owner = {
        let owner_engine = engine.clone();
        tokio::spawn(async move {
            owner_engine
                .complete(id, DATA_OWNER, CompletionPayload::new())
                .await
        })
    };
    let by_backup = {
        let backup_engine = engine.clone();
        tokio::spawn(async move {
            backup_engine
                .complete(id, BACKUP_OWNER, CompletionPayload::new())
                .await
        })
    };
    let outcomes = [by_owner.await?, by_backup.await?];

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    ensure!(winners == 1, "expected one winner, got {winners}");
    let loser_kinds: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().err())
        .map(|err| err.kind())
        .collect();
    ensure!(loser_kinds == vec![ErrorKind::InvalidTransition]);

    let stored = engine.get(created.id()).await?;
    ensure!(stored.status() == AssignmentStatus::Completed);
    let history = engine.history(created.id()).await?;
    ensure!(history.len() == 3, "created, delegated and one completion");
    Ok(())
}
