use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::user::{User, UserRole};

/// Session context carried by every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user document id
    pub username: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn new(user: &User, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            experiment_id: user.experiment_id.clone(),
            class_id: user.class_id.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }

    /// The `(experiment_id, class_id)` pair, when the user belongs to a class.
    pub fn class_scope(&self) -> Option<(&str, &str)> {
        match (&self.experiment_id, &self.class_id) {
            (Some(e), Some(c)) => Some((e.as_str(), c.as_str())),
            _ => None,
        }
    }
}
