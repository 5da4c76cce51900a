use crate::config::{Config, DatabaseConfig, PasswordConfig};
use crate::credentials::{Argon2Hasher, SharedHasher};
use crate::database::sqlite_repository::SqliteRepository;
use crate::database::task::TaskRepository;
use crate::database::user::UserRepository;
use crate::db::init_pool;
use crate::error::app_error::AppError;
use crate::models::task::{NewTask, Task, TaskRequest, TaskUpdate, parse_due_date};
use crate::models::user::{NewUser, RegisterRequest, User, UserProfile};
use chrono::Utc;
use rocket::http::ContentType;
use rocket::local::asynchronous::{Client, LocalResponse};
use std::sync::{Arc, Mutex};

/// Cheapest parameters Argon2 accepts, so tests do not spend seconds hashing.
pub fn fast_password_config() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn test_hasher() -> SharedHasher {
    Arc::new(Argon2Hasher::new(&fast_password_config()).expect("valid argon2 params"))
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        ..DatabaseConfig::default()
    };
    config.password = fast_password_config();
    config.api.enable_swagger = false;
    config
}

pub async fn test_repository() -> SqliteRepository {
    let pool = init_pool(&test_config().database).await.expect("in-memory pool");
    SqliteRepository { pool }
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: format!("{}@example.com", username),
        username: username.to_string(),
        password_hash: format!("hash-of-{}", username),
    }
}

pub fn new_task(title: &str, due_date: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        due_date: parse_due_date(due_date).expect("valid test date"),
        subject: None,
        priority: Default::default(),
    }
}

pub fn register_request(username: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        email: Some(format!("{}@example.com", username)),
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        confirm_password: Some(password.to_string()),
    }
}

pub fn task_request(title: &str, due_date: &str) -> TaskRequest {
    TaskRequest {
        title: Some(title.to_string()),
        due_date: Some(due_date.to_string()),
        ..TaskRequest::default()
    }
}

/// Registers through the HTTP API; the tracked client keeps the session cookie.
pub async fn register_via_api<'c>(client: &'c Client, username: &str, password: &str) -> LocalResponse<'c> {
    let payload = serde_json::json!({
        "firstName": "Test",
        "lastName": "User",
        "email": format!("{}@example.com", username),
        "username": username,
        "password": password,
        "confirmPassword": password,
    });

    client.post("/api/register").header(ContentType::JSON).body(payload.to_string()).dispatch().await
}

/// In-memory stand-in for both repositories, with the same uniqueness and
/// ordering rules as the SQLite implementation.
#[derive(Default)]
pub struct MockRepository {
    users: Mutex<Vec<User>>,
    tasks: Mutex<Vec<Task>>,
}

impl MockRepository {
    pub fn user_by_name(&self, username: &str) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.username == username).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn task_by_id(&self, id: i64) -> Option<Task> {
        self.tasks.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }
}

#[async_trait::async_trait]
impl UserRepository for MockRepository {
    async fn create_user(&self, user: &NewUser) -> Result<i64, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let id = users.len() as i64 + 1;
        users.push(User {
            id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<UserProfile>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).map(UserProfile::from))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.user_by_name(username))
    }
}

#[async_trait::async_trait]
impl TaskRepository for MockRepository {
    async fn create_task(&self, user_id: i64, task: &NewTask) -> Result<i64, AppError> {
        let mut tasks = self.tasks.lock().unwrap();
        let id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        tasks.push(Task {
            id,
            user_id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            subject: task.subject.clone(),
            priority: task.priority,
            completed: false,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self.tasks.lock().unwrap().iter().filter(|t| t.user_id == user_id).cloned().collect();
        tasks.sort_by_key(|t| (t.due_date, t.id));
        Ok(tasks)
    }

    async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        Ok(self.task_by_id(id))
    }

    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<(), AppError> {
        if let Some(task) = self.tasks.lock().unwrap().iter_mut().find(|t| t.id == id) {
            task.title = update.task.title.clone();
            task.description = update.task.description.clone();
            task.due_date = update.task.due_date;
            task.subject = update.task.subject.clone();
            task.priority = update.task.priority;
            task.completed = update.completed;
        }
        Ok(())
    }

    async fn delete_task(&self, id: i64) -> Result<(), AppError> {
        self.tasks.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }
}
