use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    #[default]
    Student,
    Teacher,
    ResearchManager,
}

impl UserRole {
    /// Capitalized form used as the prefix of derived user ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::Teacher => "Teacher",
            UserRole::ResearchManager => "ResearchManager",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Teacher => "teacher",
            UserRole::ResearchManager => "researchManager",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    /// Document id, derived from `(role, class_id, username)`.
    pub id: String,
    pub role: UserRole,
    pub username: String,
    /// `None` only for anonymous students, who sign in with a class link code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_num: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: &str, role: UserRole, username: &str) -> Self {
        User {
            id: id.to_string(),
            role,
            username: username.to_string(),
            password_hash: None,
            full_name: None,
            email: None,
            school_name: None,
            grade: None,
            class_num: None,
            experiment_id: None,
            class_id: None,
            is_anonymous: false,
            created_at: Utc::now(),
        }
    }

    pub fn in_class(mut self, experiment_id: &str, class_id: &str) -> Self {
        self.experiment_id = Some(experiment_id.to_string());
        self.class_id = Some(class_id.to_string());
        self
    }

    pub fn with_hierarchy(mut self, school_name: &str, grade: &str, class_num: &str) -> Self {
        self.school_name = Some(school_name.to_string());
        self.grade = Some(grade.to_string());
        self.class_num = Some(class_num.to_string());
        self
    }

    pub fn with_password_hash(mut self, hash: String) -> Self {
        self.password_hash = Some(hash);
        self
    }
}

#[cfg(test)]
impl User {
    pub fn test_student(username: &str) -> Self {
        User::new(
            &format!("Student-Ort-High_ז_3-{}", username),
            UserRole::Student,
            username,
        )
        .in_class("exp1", "Ort-High_ז_3")
        .with_hierarchy("Ort High", "ז", "3")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_camel_case() {
        let json = serde_json::to_string(&UserRole::ResearchManager).unwrap();
        assert_eq!(json, "\"researchManager\"");

        let parsed: UserRole = serde_json::from_str("\"teacher\"").unwrap();
        assert_eq!(parsed, UserRole::Teacher);
    }

    #[test]
    fn role_id_prefix_is_capitalized() {
        assert_eq!(UserRole::Student.id_prefix(), "Student");
        assert_eq!(UserRole::Teacher.id_prefix(), "Teacher");
    }

    #[test]
    fn password_hash_is_omitted_when_absent() {
        let user = User::test_student("42");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert_eq!(user.class_id.as_deref(), Some("Ort-High_ז_3"));
    }
}
