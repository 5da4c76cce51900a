use crate::auth::CurrentUser;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::response::{MessageResponse, TaskCreatedResponse};
use crate::models::task::{TaskRequest, TaskResponse};
use crate::service::task::TaskService;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use sqlx::SqlitePool;

/// Create a task owned by the signed-in user
#[openapi(tag = "Tasks")]
#[post("/", data = "<payload>")]
pub async fn create_task(pool: &State<SqlitePool>, current_user: CurrentUser, payload: Json<TaskRequest>) -> Result<Json<TaskCreatedResponse>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let service = TaskService::new(&repo);

    let task_id = service.create(&current_user.session_user(), payload.into_inner()).await?;
    Ok(Json(TaskCreatedResponse {
        success: true,
        task_id,
        message: "Task created successfully".to_string(),
    }))
}

/// List the signed-in user's tasks, earliest due date first
#[openapi(tag = "Tasks")]
#[get("/")]
pub async fn list_tasks(pool: &State<SqlitePool>, current_user: CurrentUser) -> Result<Json<Vec<TaskResponse>>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let service = TaskService::new(&repo);

    let tasks = service.list(&current_user.session_user()).await?;
    Ok(Json(tasks.iter().map(TaskResponse::from).collect()))
}

/// Replace a task's fields
#[openapi(tag = "Tasks")]
#[put("/<id>", data = "<payload>")]
pub async fn update_task(pool: &State<SqlitePool>, current_user: CurrentUser, id: i64, payload: Json<TaskRequest>) -> Result<Json<MessageResponse>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let service = TaskService::new(&repo);

    service.update(&current_user.session_user(), id, payload.into_inner()).await?;
    Ok(Json(MessageResponse::ok("Task updated successfully")))
}

#[openapi(tag = "Tasks")]
#[delete("/<id>")]
pub async fn delete_task(pool: &State<SqlitePool>, current_user: CurrentUser, id: i64) -> Result<Json<MessageResponse>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let service = TaskService::new(&repo);

    service.delete(&current_user.session_user(), id).await?;
    Ok(Json(MessageResponse::ok("Task deleted successfully")))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_task, list_tasks, update_task, delete_task]
}
