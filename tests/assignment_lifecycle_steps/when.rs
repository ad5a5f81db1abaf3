//! When steps for assignment lifecycle BDD scenarios.

use super::world::{AssignmentWorld, run_async, user_named};
use chrono::Duration;
use rstest_bdd_macros::when;
use universal_assignment::assignment::domain::CompletionPayload;

#[when(r#""{user}" acknowledges the assignment"#)]
fn acknowledges(world: &mut AssignmentWorld, user: String) -> Result<(), eyre::Report> {
    let id = world.current_id()?;
    let result = run_async(world.engine.acknowledge(id, user_named(&user)?));
    world.record(result);
    Ok(())
}

#[when(r#""{user}" completes the assignment"#)]
fn completes(world: &mut AssignmentWorld, user: String) -> Result<(), eyre::Report> {
    let id = world.current_id()?;
    let result = run_async(world.engine.complete(
        id,
        user_named(&user)?,
        CompletionPayload::new(),
    ));
    world.record(result);
    Ok(())
}

#[when(r#""{user}" approves the assignment"#)]
fn approves(world: &mut AssignmentWorld, user: String) -> Result<(), eyre::Report> {
    let id = world.current_id()?;
    let result = run_async(world.engine.approve(id, user_named(&user)?, None));
    world.record(result);
    Ok(())
}

#[when(r#""{user}" escalates the assignment because "{reason}""#)]
fn escalates(
    world: &mut AssignmentWorld,
    user: String,
    reason: String,
) -> Result<(), eyre::Report> {
    let id = world.current_id()?;
    let result = run_async(world.engine.escalate(id, user_named(&user)?, &reason, None));
    world.record(result);
    Ok(())
}

#[when("{days:u64} days pass")]
fn days_pass(world: &mut AssignmentWorld, days: u64) -> Result<(), eyre::Report> {
    let whole_days = i64::try_from(days)?;
    world.clock.advance(Duration::days(whole_days));
    Ok(())
}
