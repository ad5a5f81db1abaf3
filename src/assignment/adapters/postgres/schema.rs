//! Diesel schema for assignment persistence.

diesel::table! {
    /// Assignment rows. Side-channel records are stored as JSON documents.
    assignments (id) {
        /// Assignment identifier.
        id -> Uuid,
        /// Assignment type label.
        #[max_length = 100]
        assignment_type -> Varchar,
        /// Context type label.
        #[max_length = 50]
        context_type -> Varchar,
        /// Open context map.
        context_data -> Jsonb,
        /// Requester role.
        #[max_length = 100]
        from_role -> Varchar,
        /// Assignee role.
        #[max_length = 100]
        to_role -> Varchar,
        /// Requesting user.
        from_user_id -> Int8,
        /// Assignee, unset while unclaimed.
        to_user_id -> Nullable<Int8>,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Description.
        description -> Nullable<Text>,
        /// Instructions.
        task_instructions -> Nullable<Text>,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Status restored on resume.
        #[max_length = 50]
        status_before_hold -> Nullable<Varchar>,
        /// Priority label.
        #[max_length = 20]
        priority -> Varchar,
        /// Creation timestamp.
        assigned_at -> Timestamptz,
        /// Due date.
        due_date -> Nullable<Timestamptz>,
        /// Acknowledgement timestamp.
        acknowledged_at -> Nullable<Timestamptz>,
        /// Start timestamp.
        started_at -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Completion payload.
        completion -> Nullable<Jsonb>,
        /// Whether sign-off is required.
        requires_approval -> Bool,
        /// Sign-off role.
        #[max_length = 100]
        approval_role -> Nullable<Varchar>,
        /// Sign-off decision.
        approval -> Nullable<Jsonb>,
        /// Escalation flag, denormalized for filtering.
        escalated -> Bool,
        /// Escalation record.
        escalation -> Nullable<Jsonb>,
        /// Current delegate, denormalized for filtering.
        delegated_to_user_id -> Nullable<Int8>,
        /// Delegation record.
        delegation -> Nullable<Jsonb>,
        /// Parent assignment.
        parent_assignment_id -> Nullable<Uuid>,
        /// Optimistic-concurrency revision.
        revision -> Int8,
        /// Latest change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail.
    assignment_history (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Insertion order.
        sequence -> Int8,
        /// Owning assignment.
        assignment_id -> Uuid,
        /// Acting user.
        actor_user_id -> Int8,
        /// Action tag.
        #[max_length = 50]
        action -> Varchar,
        /// Changed fields before the action.
        old_value -> Nullable<Text>,
        /// Changed fields after the action.
        new_value -> Nullable<Text>,
        /// Free-form details.
        metadata -> Jsonb,
        /// Action timestamp.
        recorded_at -> Timestamptz,
    }
}

diesel::joinable!(assignment_history -> assignments (assignment_id));
diesel::allow_tables_to_appear_in_same_query!(assignments, assignment_history);
