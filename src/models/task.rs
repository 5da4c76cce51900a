use crate::error::app_error::AppError;
use crate::models::present;
use chrono::{DateTime, NaiveDate, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Rows written before priorities were constrained fall back to medium.
    pub fn from_db(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub subject: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub subject: Option<String>,
    pub priority: Priority,
}

/// Full replacement of a task's mutable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskUpdate {
    pub task: NewTask,
    pub completed: bool,
}

fn validate_priority(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || Priority::parse(value).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("priority").with_message(Cow::from("Priority must be one of low, medium, high")))
    }
}

#[derive(Deserialize, Debug, Default, Clone, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    /// Calendar date, `YYYY-MM-DD`.
    pub due_date: Option<String>,
    #[validate(length(max = 100, message = "Subject must be at most 100 characters"))]
    pub subject: Option<String>,
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,
    pub completed: Option<bool>,
}

impl TaskRequest {
    pub fn into_new_task(self) -> Result<NewTask, AppError> {
        if present(self.title.clone()).is_none() || present(self.due_date.clone()).is_none() {
            return Err(AppError::BadRequest("Title and due date are required".to_string()));
        }
        self.validate()?;

        let due_date = parse_due_date(self.due_date.as_deref().unwrap_or_default())?;
        let priority = present(self.priority).and_then(|p| Priority::parse(&p)).unwrap_or_default();

        Ok(NewTask {
            title: self.title.unwrap_or_default().trim().to_string(),
            description: present(self.description),
            due_date,
            subject: present(self.subject),
            priority,
        })
    }

    pub fn into_update(self) -> Result<TaskUpdate, AppError> {
        let completed = self.completed.unwrap_or(false);
        Ok(TaskUpdate {
            task: self.into_new_task()?,
            completed,
        })
    }
}

pub fn parse_due_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DUE_DATE_FORMAT)
        .map_err(|_| AppError::BadRequest("Due date must be a calendar date (YYYY-MM-DD)".to_string()))
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub subject: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            user_id: task.user_id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            subject: task.subject.clone(),
            priority: task.priority,
            completed: task.completed,
            created_at: task.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::task_request;

    #[test]
    fn priority_defaults_to_medium() {
        let task = task_request("Essay", "2024-05-01").into_new_task().unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn blank_priority_also_defaults_to_medium() {
        let mut request = task_request("Essay", "2024-05-01");
        request.priority = Some(String::new());
        assert_eq!(request.into_new_task().unwrap().priority, Priority::Medium);
    }

    #[test]
    fn explicit_priority_is_kept() {
        let mut request = task_request("Essay", "2024-05-01");
        request.priority = Some("High".to_string());
        assert_eq!(request.into_new_task().unwrap().priority, Priority::High);
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let mut request = task_request("Essay", "2024-05-01");
        request.priority = Some("urgent".to_string());
        assert!(matches!(request.into_new_task(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn title_and_due_date_are_required() {
        let err = task_request("", "2024-05-01").into_new_task().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Title and due date are required"));

        let mut request = task_request("Essay", "2024-05-01");
        request.due_date = None;
        assert!(matches!(request.into_new_task(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn malformed_due_date_is_rejected() {
        for bad in ["tomorrow", "2024-13-01", "01/05/2024", "2024-02-30"] {
            let result = task_request("Essay", bad).into_new_task();
            assert!(matches!(result, Err(AppError::BadRequest(_))), "{} should be rejected", bad);
        }
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let mut request = task_request("  Essay  ", "2024-05-01");
        request.description = Some("  ".to_string());
        request.subject = Some("History".to_string());

        let task = request.into_new_task().unwrap();
        assert_eq!(task.title, "Essay");
        assert_eq!(task.description, None);
        assert_eq!(task.subject.as_deref(), Some("History"));
    }

    #[test]
    fn overlong_title_is_rejected() {
        let request = task_request(&"x".repeat(201), "2024-05-01");
        assert!(matches!(request.into_new_task(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn update_defaults_completed_to_false() {
        let update = task_request("Essay", "2024-05-01").into_update().unwrap();
        assert!(!update.completed);

        let mut request = task_request("Essay", "2024-05-01");
        request.completed = Some(true);
        assert!(request.into_update().unwrap().completed);
    }

    #[test]
    fn response_uses_camel_case_and_lowercase_priority() {
        let task = Task {
            id: 3,
            user_id: 1,
            title: "Essay".to_string(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            subject: None,
            priority: Priority::Medium,
            completed: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(TaskResponse::from(&task)).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["dueDate"], "2024-05-01");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn priority_from_db_tolerates_unknown_values() {
        assert_eq!(Priority::from_db("high"), Priority::High);
        assert_eq!(Priority::from_db("whenever"), Priority::Medium);
    }
}
