//! Unit tests for query filters, work-queue ordering and metrics.

use super::fixtures::{
    ASSIGNEE, DELEGATE, OUTSIDER, assignment_in, create, draft, manual_clock, role,
};
use crate::assignment::{
    adapters::memory::ManualClock,
    domain::{
        Assignment, AssignmentFilter, AssignmentMetrics, AssignmentStatus, AssignmentType,
        ContextData, ContextType, DueDate, NewAssignment, Priority, work_queue_order,
    },
};
use chrono::Duration;
use mockable::Clock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> ManualClock {
    manual_clock()
}

fn queued(clock: &ManualClock, priority: Priority, due_date: DueDate) -> Assignment {
    create(
        NewAssignment {
            priority,
            due_date,
            ..draft(Some(ASSIGNEE))
        },
        clock,
    )
    .expect("valid draft")
}

#[rstest]
fn delegated_work_shows_in_delegate_queue(clock: ManualClock) {
    let assignment = assignment_in(AssignmentStatus::Delegated, false, &clock).expect("delegated");

    assert!(AssignmentFilter::new().worked_by(ASSIGNEE).matches(&assignment));
    assert!(AssignmentFilter::new().worked_by(DELEGATE).matches(&assignment));
    assert!(!AssignmentFilter::new().worked_by(OUTSIDER).matches(&assignment));
}

#[rstest]
fn criteria_combine_conjunctively(clock: ManualClock) {
    let assignment = create(draft(Some(ASSIGNEE)), &clock).expect("valid draft");
    let base = AssignmentFilter::new()
        .with_context_type(ContextType::Report)
        .with_context(ContextData::new().with("report_id", "58"))
        .with_to_role(role("data owner"));

    assert!(base.clone().matches(&assignment));
    assert!(
        base.clone()
            .with_status(AssignmentStatus::Assigned)
            .with_assignment_types([AssignmentType::DataUploadRequest])
            .matches(&assignment)
    );
    assert!(
        !base
            .clone()
            .with_statuses([AssignmentStatus::Completed, AssignmentStatus::Approved])
            .matches(&assignment)
    );
    assert!(
        !base
            .with_context_type(ContextType::Phase)
            .matches(&assignment)
    );
}

#[rstest]
fn assigned_window_is_half_open(clock: ManualClock) {
    let assignment = create(draft(Some(ASSIGNEE)), &clock).expect("valid draft");
    let at = assignment.assigned_at();

    assert!(
        AssignmentFilter::new()
            .assigned_between(Some(at), Some(at + Duration::seconds(1)))
            .matches(&assignment)
    );
    assert!(
        !AssignmentFilter::new()
            .assigned_between(None, Some(at))
            .matches(&assignment)
    );
}

#[rstest]
fn work_queue_puts_urgent_and_soonest_first(clock: ManualClock) {
    let low_soon = queued(&clock, Priority::Low, DueDate::InDays(1));
    let critical_late = queued(&clock, Priority::Critical, DueDate::InDays(9));
    let critical_soon = queued(&clock, Priority::Critical, DueDate::InDays(2));
    let critical_undated = {
        let mut value = serde_json::to_value(queued(&clock, Priority::Critical, DueDate::Default))
            .expect("assignment serializes");
        if let Some(fields) = value.as_object_mut() {
            fields.insert("due_date".to_owned(), serde_json::Value::Null);
        }
        serde_json::from_value::<Assignment>(value).expect("assignment parses")
    };

    let mut queue = vec![
        low_soon.clone(),
        critical_undated.clone(),
        critical_late.clone(),
        critical_soon.clone(),
    ];
    queue.sort_by(work_queue_order);
    let order: Vec<_> = queue.iter().map(Assignment::id).collect();

    assert_eq!(
        order,
        vec![
            critical_soon.id(),
            critical_late.id(),
            critical_undated.id(),
            low_soon.id()
        ]
    );
}

#[rstest]
fn metrics_count_statuses_and_overdue(clock: ManualClock) {
    let assignments = vec![
        assignment_in(AssignmentStatus::Assigned, false, &clock).expect("assigned"),
        assignment_in(AssignmentStatus::InProgress, false, &clock).expect("in progress"),
        assignment_in(AssignmentStatus::Completed, false, &clock).expect("completed"),
        assignment_in(AssignmentStatus::Approved, true, &clock).expect("approved"),
    ];
    clock.advance(Duration::days(8));

    let metrics = AssignmentMetrics::from_assignments(&assignments, clock.utc());

    assert_eq!(metrics.total(), 4);
    assert_eq!(metrics.count(AssignmentStatus::Completed), 1);
    assert_eq!(metrics.count(AssignmentStatus::Cancelled), 0);
    assert_eq!(metrics.overdue_count(), 2);
    assert!((0.49..0.51).contains(&metrics.completion_rate()));
}

#[rstest]
fn empty_metrics_have_zero_rate(clock: ManualClock) {
    let none: Vec<Assignment> = Vec::new();
    let metrics = AssignmentMetrics::from_assignments(&none, clock.utc());
    assert_eq!(metrics.total(), 0);
    assert!((0.0..f64::EPSILON).contains(&metrics.completion_rate()));
    assert!(metrics.by_status().is_empty());
}
