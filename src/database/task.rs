use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::task::{NewTask, Priority, Task, TaskUpdate};
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    user_id: i64,
    title: String,
    description: Option<String>,
    due_date: NaiveDate,
    subject: Option<String>,
    priority: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            subject: row.subject,
            priority: Priority::from_db(&row.priority),
            completed: row.completed,
            created_at: row.created_at,
        }
    }
}

const TASK_COLUMNS: &str = "id, user_id, title, description, due_date, subject, priority, completed, created_at";

/// Each operation is a single statement; callers check existence and
/// ownership before updating or deleting.
#[async_trait::async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create_task(&self, user_id: i64, task: &NewTask) -> Result<i64, AppError>;
    /// Ordered by due date, oldest first.
    async fn list_tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>, AppError>;
    async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>, AppError>;
    /// No-op when `id` does not exist.
    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<(), AppError>;
    /// No-op when `id` does not exist.
    async fn delete_task(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl TaskRepository for SqliteRepository {
    async fn create_task(&self, user_id: i64, task: &NewTask) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date, subject, priority, completed, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(&task.subject)
        .bind(task.priority.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>, AppError> {
        let query = format!("SELECT {} FROM tasks WHERE user_id = ? ORDER BY due_date ASC, id ASC", TASK_COLUMNS);
        let rows = sqlx::query_as::<_, TaskRow>(&query).bind(user_id).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        let query = format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS);
        let row = sqlx::query_as::<_, TaskRow>(&query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(Task::from))
    }

    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, due_date = ?, subject = ?, priority = ?, completed = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.task.title)
        .bind(&update.task.description)
        .bind(update.task.due_date)
        .bind(&update.task.subject)
        .bind(update.task.priority.as_str())
        .bind(update.completed)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_task(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM tasks WHERE id = ?").bind(id).execute(&self.pool).await?;
        Ok(())
    }
}
