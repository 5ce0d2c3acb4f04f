use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{User, UserRole};

/// User as returned to clients; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub role: UserRole,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        let class_name = match (&user.grade, &user.class_num) {
            (Some(grade), Some(num)) => Some(format!("{}{}", grade, num)),
            _ => None,
        };
        UserDto {
            id: user.id,
            role: user.role,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            experiment_id: user.experiment_id,
            class_id: user.class_id,
            class_name,
            is_anonymous: user.is_anonymous,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub success: bool,
    pub doc_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub count: u64,
    pub last_submission_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
