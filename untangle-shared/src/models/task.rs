/// Task model and database operations
///
/// Personal to-dos with a small state machine:
///
/// ```text
/// open <-> in_progress -> done
/// done -> open  (reopen; clears completed_at)
/// ```
///
/// `completed_at` is set exactly when a task enters `done` and cleared
/// when it leaves.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Checks whether a transition to `target` is valid
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            (TaskStatus::Open, TaskStatus::InProgress) => true,
            (TaskStatus::Open, TaskStatus::Done) => true,
            (TaskStatus::InProgress, TaskStatus::Open) => true,
            (TaskStatus::InProgress, TaskStatus::Done) => true,

            // Done can only be reopened.
            (TaskStatus::Done, TaskStatus::Open) => true,

            _ => false,
        }
    }
}

/// Task urgency
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub due_on: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub status: TaskStatus,

    /// Set while the task is in `done`
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task (always starts `open`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub notes: Option<String>,
    pub due_on: Option<NaiveDate>,
    pub priority: TaskPriority,
}

/// Input for a full task update (status changes go through
/// [`Task::set_status`] instead)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    pub notes: Option<String>,
    pub due_on: Option<NaiveDate>,
    pub priority: TaskPriority,
}

/// Filters for listing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,

    /// Only tasks due on or before this date
    pub due_before: Option<NaiveDate>,
}

impl Task {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, notes, due_on, priority)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, notes, due_on, priority, status,
                      completed_at, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.title)
        .bind(data.notes)
        .bind(data.due_on)
        .bind(data.priority)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, notes, due_on, priority, status,
                   completed_at, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks with optional filters, most urgent first
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        filter: &TaskFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, user_id, title, notes, due_on, priority, status, \
             completed_at, created_at, updated_at \
             FROM tasks WHERE user_id = $1",
        );
        let mut bind_count = 1;

        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.due_before.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND due_on <= ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY due_on ASC NULLS LAST, priority DESC, created_at ASC \
             LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(user_id);

        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(due_before) = filter.due_before {
            q = q.bind(due_before);
        }

        let tasks = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Counts tasks not yet done (used for the assistant context block)
    pub async fn count_open(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND status <> 'done'",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3, notes = $4, due_on = $5, priority = $6, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, notes, due_on, priority, status,
                      completed_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.title)
        .bind(data.notes)
        .bind(data.due_on)
        .bind(data.priority)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Writes a new status, stamping or clearing `completed_at`
    ///
    /// Transition validity is the caller's job via
    /// [`TaskStatus::can_transition_to`]; this only performs the write.
    pub async fn set_status(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $3,
                completed_at = CASE WHEN $3 = 'done'::task_status THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, notes, due_on, priority, status,
                      completed_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
