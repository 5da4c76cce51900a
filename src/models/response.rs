use rocket::serde::Serialize;
use schemars::JsonSchema;

#[derive(Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreatedResponse {
    pub success: bool,
    pub task_id: i64,
    pub message: String,
}
