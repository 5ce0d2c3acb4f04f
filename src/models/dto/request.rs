use serde::Deserialize;
use validator::Validate;

use crate::models::domain::{
    question::OptionsInput, Answers, Category, QuestionType, UserRole,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    pub role: UserRole,

    #[validate(length(min = 1, max = 100))]
    pub username: String,

    #[validate(length(min = 1, max = 200))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentRequest {
    #[validate(length(min = 1, max = 100))]
    pub experiment_id: String,

    #[validate(length(min = 1, max = 100))]
    pub username: String,

    #[validate(length(min = 1, max = 200))]
    pub password: String,

    #[validate(length(min = 1, max = 200))]
    pub school_name: String,

    #[validate(length(min = 1, max = 20))]
    pub grade: String,

    #[validate(length(min = 1, max = 20))]
    pub class_num: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    #[validate(length(min = 1, max = 100))]
    pub experiment_id: String,

    #[validate(length(min = 1, max = 200))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 200))]
    pub password: String,

    #[validate(length(min = 1, max = 200))]
    pub school_name: String,

    #[validate(length(min = 1, max = 20))]
    pub grade: String,

    #[validate(length(min = 1, max = 20))]
    pub class_num: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 200))]
    pub school_name: String,

    #[validate(length(min = 1, max = 20))]
    pub grade: String,

    #[validate(length(min = 1, max = 20))]
    pub class_num: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnonymousEntryRequest {
    #[validate(length(min = 3, max = 20))]
    pub code: String,
}

/// A teacher's proposed question. `type` defaults to text; options may be a
/// list or one comma separated string.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuestionProposal {
    #[validate(length(max = 500))]
    pub text: String,

    #[serde(rename = "type", default)]
    pub question_type: Option<QuestionType>,

    #[serde(default)]
    pub options: OptionsInput,
}

/// Manager-edited form of one pending request. Class context is echoed back
/// from the pending listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalItem {
    pub original_id: String,
    pub final_text: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(rename = "type", default)]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub options: OptionsInput,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub experiment_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApproveQuestionsRequest {
    pub items: Vec<ApprovalItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepEntryRequest {
    pub experiment_id: String,
    pub class_id: String,
    pub student_id: String,
    pub entry: Answers,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub experiment_id: String,
    pub class_id: String,
    pub student_id: String,
}

/// Optional class scope for statistics; both ids or neither.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    #[serde(default)]
    pub experiment_id: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
}
