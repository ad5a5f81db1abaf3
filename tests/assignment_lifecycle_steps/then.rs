//! Then steps for assignment lifecycle BDD scenarios.

use super::world::{AssignmentWorld, run_async, user_named};
use rstest_bdd_macros::then;
use universal_assignment::assignment::domain::{AssignmentAction, AssignmentStatus, ErrorKind};

#[then(r#"the assignment status is "{status}""#)]
fn status_is(world: &AssignmentWorld, status: String) -> Result<(), eyre::Report> {
    let expected = AssignmentStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let stored = run_async(world.engine.get(world.current_id()?))?;

    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            stored.status().as_str()
        ));
    }
    Ok(())
}

#[then("the audit trail has {count:u64} entries")]
fn audit_trail_length(world: &AssignmentWorld, count: u64) -> Result<(), eyre::Report> {
    let history = run_async(world.engine.history(world.current_id()?))?;
    let found = u64::try_from(history.len())?;
    eyre::ensure!(found == count, "expected {count} audit entries, found {found}");
    Ok(())
}

#[then(r#""{user}" was notified of "{action}""#)]
fn was_notified(
    world: &AssignmentWorld,
    user: String,
    action: String,
) -> Result<(), eyre::Report> {
    let event = AssignmentAction::try_from(action.as_str())
        .map_err(|err| eyre::eyre!("invalid action in scenario: {err}"))?;
    let recipient = user_named(&user)?;
    eyre::ensure!(
        world.notifier.recipients_of(event).contains(&recipient),
        "{user} was not notified of {action}"
    );
    Ok(())
}

#[then(r#"the engine refuses with "{kind}""#)]
fn engine_refuses(world: &AssignmentWorld, kind: String) -> Result<(), eyre::Report> {
    let expected = match kind.as_str() {
        "forbidden" => ErrorKind::Forbidden,
        "invalid transition" => ErrorKind::InvalidTransition,
        "invalid input" => ErrorKind::InvalidInput,
        "not found" => ErrorKind::NotFound,
        other => return Err(eyre::eyre!("unknown error kind in scenario: {other}")),
    };
    let error = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the last engine call to fail"))?;

    if error.kind() != expected {
        return Err(eyre::eyre!("expected {kind} error, got {error:?}"));
    }
    Ok(())
}

#[then(r#"the assignment is still held by "{user}""#)]
fn still_held_by(world: &AssignmentWorld, user: String) -> Result<(), eyre::Report> {
    let assignee = user_named(&user)?;
    let current = world
        .current
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing assignment in scenario world"))?;
    eyre::ensure!(
        current.to_user_id() == Some(assignee),
        "assignment moved to {:?}",
        current.to_user_id()
    );
    Ok(())
}

#[then("the assignment is overdue")]
fn is_overdue(world: &AssignmentWorld) -> Result<(), eyre::Report> {
    let stored = run_async(world.engine.get(world.current_id()?))?;
    eyre::ensure!(
        stored.is_overdue(world.engine.now()),
        "assignment due {:?} is not overdue",
        stored.due_date()
    );
    Ok(())
}
