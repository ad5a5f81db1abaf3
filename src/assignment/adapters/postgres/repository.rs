//! `PostgreSQL` repository implementation for assignments and history.

use super::{
    models::{AssignmentRecord, AssignmentRow, HistoryRow, NewHistoryRow},
    schema::{assignment_history, assignments},
};
use crate::assignment::{
    domain::{
        Assignment, AssignmentAction, AssignmentFilter, AssignmentHistory, AssignmentId,
        AssignmentStatus, AssignmentType, ContextData, ContextType, HistoryEntryId,
        PersistedAssignmentData, Priority, RoleName, UserId,
    },
    ports::{AssignmentRepository, AssignmentRepositoryError, AssignmentRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// `PostgreSQL` connection pool type used by assignment adapters.
pub type AssignmentPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed assignment repository.
#[derive(Debug, Clone)]
pub struct PostgresAssignmentRepository {
    pool: AssignmentPgPool,
}

impl PostgresAssignmentRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AssignmentPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AssignmentRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AssignmentRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(AssignmentRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AssignmentRepositoryError::persistence)?
    }
}

impl From<DieselError> for AssignmentRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn insert(
        &self,
        assignment: &Assignment,
        history: &AssignmentHistory,
    ) -> AssignmentRepositoryResult<()> {
        let assignment_id = assignment.id();
        let record = to_record(assignment)?;
        let history_row = to_history_row(history);

        self.run_blocking(move |connection| {
            connection.transaction::<_, AssignmentRepositoryError, _>(|tx| {
                diesel::insert_into(assignments::table)
                    .values(&record)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            AssignmentRepositoryError::DuplicateAssignment(assignment_id)
                        }
                        _ => AssignmentRepositoryError::persistence(err),
                    })?;
                diesel::insert_into(assignment_history::table)
                    .values(&history_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn update(
        &self,
        assignment: &Assignment,
        expected_revision: u64,
        history: &AssignmentHistory,
    ) -> AssignmentRepositoryResult<()> {
        let assignment_id = assignment.id();
        let record = to_record(assignment)?;
        let history_row = to_history_row(history);
        let expected =
            i64::try_from(expected_revision).map_err(AssignmentRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, AssignmentRepositoryError, _>(|tx| {
                let updated = diesel::update(
                    assignments::table
                        .filter(assignments::id.eq(assignment_id.into_inner()))
                        .filter(assignments::revision.eq(expected)),
                )
                .set(&record)
                .execute(tx)?;

                if updated == 0 {
                    let stored = assignments::table
                        .filter(assignments::id.eq(assignment_id.into_inner()))
                        .select(assignments::revision)
                        .first::<i64>(tx)
                        .optional()?;
                    return Err(match stored {
                        None => AssignmentRepositoryError::NotFound(assignment_id),
                        Some(actual) => AssignmentRepositoryError::StaleRevision {
                            id: assignment_id,
                            expected: expected_revision,
                            actual: u64::try_from(actual)
                                .map_err(AssignmentRepositoryError::persistence)?,
                        },
                    });
                }

                diesel::insert_into(assignment_history::table)
                    .values(&history_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: AssignmentId) -> AssignmentRepositoryResult<Option<Assignment>> {
        self.run_blocking(move |connection| {
            let row = assignments::table
                .filter(assignments::id.eq(id.into_inner()))
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(connection)
                .optional()?;
            row.map(row_to_assignment).transpose()
        })
        .await
    }

    async fn list(&self, filter: &AssignmentFilter) -> AssignmentRepositoryResult<Vec<Assignment>> {
        let criteria = filter.clone();
        self.run_blocking(move |connection| {
            let rows = narrowed_query(&criteria)
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)?;
            let mut matching = Vec::with_capacity(rows.len());
            for row in rows {
                let assignment = row_to_assignment(row)?;
                if criteria.matches(&assignment) {
                    matching.push(assignment);
                }
            }
            Ok(matching)
        })
        .await
    }

    async fn history(
        &self,
        id: AssignmentId,
    ) -> AssignmentRepositoryResult<Vec<AssignmentHistory>> {
        self.run_blocking(move |connection| {
            assignment_history::table
                .filter(assignment_history::assignment_id.eq(id.into_inner()))
                .order(assignment_history::sequence.asc())
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)?
                .into_iter()
                .map(row_to_history)
                .collect()
        })
        .await
    }
}

/// Pushes the column-backed criteria into SQL. Context and role matching
/// are re-checked in Rust through [`AssignmentFilter::matches`].
fn narrowed_query(filter: &AssignmentFilter) -> assignments::BoxedQuery<'static, Pg> {
    let mut query = assignments::table.into_boxed();
    if let Some(user) = filter.worked_by_user() {
        query = query.filter(
            assignments::to_user_id
                .eq(user.value())
                .or(assignments::delegated_to_user_id.eq(user.value())),
        );
    }
    if !filter.statuses().is_empty() {
        let statuses: Vec<&'static str> = filter
            .statuses()
            .iter()
            .map(|status| status.as_str())
            .collect();
        query = query.filter(assignments::status.eq_any(statuses));
    }
    if !filter.assignment_types().is_empty() {
        let types: Vec<&'static str> = filter
            .assignment_types()
            .iter()
            .map(|assignment_type| assignment_type.as_str())
            .collect();
        query = query.filter(assignments::assignment_type.eq_any(types));
    }
    if let Some(context_type) = filter.context_type() {
        query = query.filter(assignments::context_type.eq(context_type.as_str()));
    }
    if let Some(parent) = filter.parent() {
        query = query.filter(assignments::parent_assignment_id.eq(parent.into_inner()));
    }
    query
}

fn to_json<T: Serialize>(value: Option<&T>) -> AssignmentRepositoryResult<Option<Value>> {
    value
        .map(serde_json::to_value)
        .transpose()
        .map_err(AssignmentRepositoryError::persistence)
}

fn from_json<T: DeserializeOwned>(value: Option<Value>) -> AssignmentRepositoryResult<Option<T>> {
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(AssignmentRepositoryError::persistence)
}

fn to_record(assignment: &Assignment) -> AssignmentRepositoryResult<AssignmentRecord> {
    let revision =
        i64::try_from(assignment.revision()).map_err(AssignmentRepositoryError::persistence)?;
    Ok(AssignmentRecord {
        id: assignment.id().into_inner(),
        assignment_type: assignment.assignment_type().as_str().to_owned(),
        context_type: assignment.context_type().as_str().to_owned(),
        context_data: Value::Object(assignment.context_data().to_json_object()),
        from_role: assignment.from_role().as_str().to_owned(),
        to_role: assignment.to_role().as_str().to_owned(),
        from_user_id: assignment.from_user_id().value(),
        to_user_id: assignment.to_user_id().map(UserId::value),
        title: assignment.title().to_owned(),
        description: assignment.description().map(str::to_owned),
        task_instructions: assignment.task_instructions().map(str::to_owned),
        status: assignment.status().as_str().to_owned(),
        status_before_hold: assignment
            .status_before_hold()
            .map(|status| status.as_str().to_owned()),
        priority: assignment.priority().as_str().to_owned(),
        assigned_at: assignment.assigned_at(),
        due_date: assignment.due_date(),
        acknowledged_at: assignment.acknowledged_at(),
        started_at: assignment.started_at(),
        completed_at: assignment.completed_at(),
        completion: to_json(assignment.completion())?,
        requires_approval: assignment.requires_approval(),
        approval_role: assignment
            .approval_role()
            .map(|role| role.as_str().to_owned()),
        approval: to_json(assignment.approval())?,
        escalated: assignment.escalated(),
        escalation: to_json(assignment.escalation())?,
        delegated_to_user_id: assignment.delegated_to_user_id().map(UserId::value),
        delegation: to_json(assignment.delegation())?,
        parent_assignment_id: assignment
            .parent_assignment_id()
            .map(AssignmentId::into_inner),
        revision,
        updated_at: assignment.updated_at(),
    })
}

fn parse_status(value: &str) -> AssignmentRepositoryResult<AssignmentStatus> {
    AssignmentStatus::try_from(value).map_err(AssignmentRepositoryError::persistence)
}

fn parse_role(value: String) -> AssignmentRepositoryResult<RoleName> {
    RoleName::new(value).map_err(AssignmentRepositoryError::persistence)
}

fn row_to_assignment(row: AssignmentRow) -> AssignmentRepositoryResult<Assignment> {
    let AssignmentRow {
        id,
        assignment_type,
        context_type,
        context_data,
        from_role,
        to_role,
        from_user_id,
        to_user_id,
        title,
        description,
        task_instructions,
        status,
        status_before_hold,
        priority,
        assigned_at,
        due_date,
        acknowledged_at,
        started_at,
        completed_at,
        completion,
        requires_approval,
        approval_role,
        approval,
        escalation,
        delegation,
        parent_assignment_id,
        revision,
        updated_at,
        ..
    } = row;

    let data = PersistedAssignmentData {
        id: AssignmentId::from_uuid(id),
        assignment_type: AssignmentType::try_from(assignment_type.as_str())
            .map_err(AssignmentRepositoryError::persistence)?,
        context_type: ContextType::try_from(context_type.as_str())
            .map_err(AssignmentRepositoryError::persistence)?,
        context_data: serde_json::from_value::<ContextData>(context_data)
            .map_err(AssignmentRepositoryError::persistence)?,
        from_role: parse_role(from_role)?,
        to_role: parse_role(to_role)?,
        from_user_id: UserId::new(from_user_id),
        to_user_id: to_user_id.map(UserId::new),
        title,
        description,
        task_instructions,
        status: parse_status(&status)?,
        status_before_hold: status_before_hold
            .as_deref()
            .map(parse_status)
            .transpose()?,
        priority: Priority::try_from(priority.as_str())
            .map_err(AssignmentRepositoryError::persistence)?,
        assigned_at,
        due_date,
        acknowledged_at,
        started_at,
        completed_at,
        completion: from_json(completion)?,
        requires_approval,
        approval_role: approval_role.map(parse_role).transpose()?,
        approval: from_json(approval)?,
        escalation: from_json(escalation)?,
        delegation: from_json(delegation)?,
        parent_assignment_id: parent_assignment_id.map(AssignmentId::from_uuid),
        revision: u64::try_from(revision).map_err(AssignmentRepositoryError::persistence)?,
        updated_at,
    };
    Ok(Assignment::from_persisted(data))
}

fn to_history_row(entry: &AssignmentHistory) -> NewHistoryRow {
    NewHistoryRow {
        id: entry.id.into_inner(),
        assignment_id: entry.assignment_id.into_inner(),
        actor_user_id: entry.actor.value(),
        action: entry.action.as_str().to_owned(),
        old_value: entry.old_value.clone(),
        new_value: entry.new_value.clone(),
        metadata: Value::Object(entry.metadata.clone()),
        recorded_at: entry.recorded_at,
    }
}

fn row_to_history(row: HistoryRow) -> AssignmentRepositoryResult<AssignmentHistory> {
    let metadata = match row.metadata {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            let mut wrapped = serde_json::Map::new();
            wrapped.insert("value".to_owned(), other);
            wrapped
        }
    };
    Ok(AssignmentHistory {
        id: HistoryEntryId::from_uuid(row.id),
        assignment_id: AssignmentId::from_uuid(row.assignment_id),
        actor: UserId::new(row.actor_user_id),
        action: AssignmentAction::try_from(row.action.as_str())
            .map_err(AssignmentRepositoryError::persistence)?,
        old_value: row.old_value,
        new_value: row.new_value,
        metadata,
        recorded_at: row.recorded_at,
    })
}

#[cfg(test)]
mod tests {
    //! Row mapping tests that need no database.

    use super::{
        AssignmentRow, HistoryRow, row_to_assignment, row_to_history, to_history_row, to_record,
    };
    use crate::assignment::{
        adapters::memory::ManualClock,
        domain::{
            Assignment, AssignmentAction, AssignmentHistory, AssignmentType, CompletionPayload,
            ContextData, ContextType, DueDate, NewAssignment, Priority, RoleName, SlaPolicy,
            UserId,
        },
    };
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn role(name: &str) -> RoleName {
        RoleName::new(name).expect("valid role")
    }

    fn worked_assignment() -> (Assignment, AssignmentHistory) {
        let clock = ManualClock::new(
            Utc.with_ymd_and_hms(2025, 5, 12, 10, 0, 0)
                .single()
                .expect("valid instant"),
        );
        let draft = NewAssignment {
            assignment_type: AssignmentType::SampleSelectionApproval,
            context_type: ContextType::Sample,
            context_data: ContextData::new().with("sample_set", "S-9"),
            from_role: role("Tester"),
            to_role: role("Data Owner"),
            from_user_id: UserId::new(1),
            to_user_id: Some(UserId::new(2)),
            title: "Approve sample selection".to_owned(),
            description: None,
            task_instructions: Some("Check stratification".to_owned()),
            priority: Priority::Urgent,
            due_date: DueDate::InDays(2),
            requires_approval: true,
            approval_role: Some(role("Report Owner")),
            parent_assignment_id: None,
        };
        let (mut assignment, _) =
            Assignment::new(draft, &SlaPolicy::standard(), &clock).expect("valid draft");
        assignment
            .delegate(UserId::new(2), UserId::new(3), Some("leave".to_owned()), &clock)
            .expect("delegation applies");
        assignment
            .hold(UserId::new(1), None, &clock)
            .expect("hold applies");
        let change = assignment
            .complete(
                UserId::new(3),
                CompletionPayload::new().with_data("selected", 25),
                &clock,
            )
            .expect("completion applies");
        let entry = AssignmentHistory::record(assignment.id(), &change, assignment.updated_at());
        (assignment, entry)
    }

    #[rstest]
    fn assignment_survives_column_mapping() {
        let (assignment, _) = worked_assignment();
        let record = to_record(&assignment).expect("record builds");
        let row = AssignmentRow {
            id: record.id,
            assignment_type: record.assignment_type,
            context_type: record.context_type,
            context_data: record.context_data,
            from_role: record.from_role,
            to_role: record.to_role,
            from_user_id: record.from_user_id,
            to_user_id: record.to_user_id,
            title: record.title,
            description: record.description,
            task_instructions: record.task_instructions,
            status: record.status,
            status_before_hold: record.status_before_hold,
            priority: record.priority,
            assigned_at: record.assigned_at,
            due_date: record.due_date,
            acknowledged_at: record.acknowledged_at,
            started_at: record.started_at,
            completed_at: record.completed_at,
            completion: record.completion,
            requires_approval: record.requires_approval,
            approval_role: record.approval_role,
            approval: record.approval,
            escalated: record.escalated,
            escalation: record.escalation,
            delegated_to_user_id: record.delegated_to_user_id,
            delegation: record.delegation,
            parent_assignment_id: record.parent_assignment_id,
            revision: record.revision,
            updated_at: record.updated_at,
        };

        assert_eq!(row.delegated_to_user_id, Some(3));
        assert_eq!(row.status, "Completed");
        assert_eq!(row_to_assignment(row).expect("row maps back"), assignment);
    }

    #[rstest]
    fn unknown_status_is_a_persistence_error() {
        let (assignment, _) = worked_assignment();
        let record = to_record(&assignment).expect("record builds");
        let row = AssignmentRow {
            status: "Overdue".to_owned(),
            id: record.id,
            assignment_type: record.assignment_type,
            context_type: record.context_type,
            context_data: record.context_data,
            from_role: record.from_role,
            to_role: record.to_role,
            from_user_id: record.from_user_id,
            to_user_id: record.to_user_id,
            title: record.title,
            description: record.description,
            task_instructions: record.task_instructions,
            status_before_hold: record.status_before_hold,
            priority: record.priority,
            assigned_at: record.assigned_at,
            due_date: record.due_date,
            acknowledged_at: record.acknowledged_at,
            started_at: record.started_at,
            completed_at: record.completed_at,
            completion: record.completion,
            requires_approval: record.requires_approval,
            approval_role: record.approval_role,
            approval: record.approval,
            escalated: record.escalated,
            escalation: record.escalation,
            delegated_to_user_id: record.delegated_to_user_id,
            delegation: record.delegation,
            parent_assignment_id: record.parent_assignment_id,
            revision: record.revision,
            updated_at: record.updated_at,
        };

        assert!(row_to_assignment(row).is_err());
    }

    #[rstest]
    #[case(json!({ "attachment_count": 0 }), json!({ "attachment_count": 0 }))]
    #[case(Value::Null, json!({}))]
    #[case(json!("legacy"), json!({ "value": "legacy" }))]
    fn history_metadata_is_normalized(#[case] stored: Value, #[case] expected: Value) {
        let (_, entry) = worked_assignment();
        let inserted = to_history_row(&entry);
        let row = HistoryRow {
            id: inserted.id,
            assignment_id: inserted.assignment_id,
            actor_user_id: inserted.actor_user_id,
            action: inserted.action,
            old_value: inserted.old_value,
            new_value: inserted.new_value,
            metadata: stored,
            recorded_at: inserted.recorded_at,
        };

        let history = row_to_history(row).expect("history maps back");
        assert_eq!(history.action, AssignmentAction::Completed);
        assert_eq!(history.actor, UserId::new(3));
        assert_eq!(Value::Object(history.metadata), expected);
    }
}
