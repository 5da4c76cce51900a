use crate::database::task::TaskRepository;
use crate::error::app_error::AppError;
use crate::models::task::{Task, TaskRequest};
use crate::session::SessionUser;
use tracing::{info, warn};

pub struct TaskService<'a, R: TaskRepository + ?Sized> {
    repository: &'a R,
}

impl<'a, R: TaskRepository + ?Sized> TaskService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        TaskService { repository }
    }

    pub async fn create(&self, owner: &SessionUser, request: TaskRequest) -> Result<i64, AppError> {
        let task = request.into_new_task()?;
        let id = self.repository.create_task(owner.user_id, &task).await?;
        info!(task_id = id, user_id = owner.user_id, "task created");
        Ok(id)
    }

    pub async fn list(&self, owner: &SessionUser) -> Result<Vec<Task>, AppError> {
        self.repository.list_tasks_for_user(owner.user_id).await
    }

    /// Replaces every mutable field. Existence and ownership are resolved
    /// before the payload is validated.
    pub async fn update(&self, owner: &SessionUser, id: i64, request: TaskRequest) -> Result<(), AppError> {
        self.owned_task(owner, id).await?;
        let update = request.into_update()?;
        self.repository.update_task(id, &update).await?;
        info!(task_id = id, user_id = owner.user_id, completed = update.completed, "task updated");
        Ok(())
    }

    pub async fn delete(&self, owner: &SessionUser, id: i64) -> Result<(), AppError> {
        self.owned_task(owner, id).await?;
        self.repository.delete_task(id).await?;
        info!(task_id = id, user_id = owner.user_id, "task deleted");
        Ok(())
    }

    async fn owned_task(&self, owner: &SessionUser, id: i64) -> Result<Task, AppError> {
        let task = self
            .repository
            .get_task_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        if task.user_id != owner.user_id {
            warn!(task_id = id, user_id = owner.user_id, owner_id = task.user_id, "task access denied");
            return Err(AppError::Forbidden);
        }
        Ok(task)
    }
}
