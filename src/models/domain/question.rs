use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{AppError, AppResult};

/// Fixed label set used to group active questions for reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Focus,
    Nutrition,
    Mental,
    Environment,
    Exercise,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Focus,
        Category::Nutrition,
        Category::Mental,
        Category::Environment,
        Category::Exercise,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Focus => "focus",
            Category::Nutrition => "nutrition",
            Category::Mental => "mental",
            Category::Environment => "environment",
            Category::Exercise => "exercise",
            Category::General => "general",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == value.trim())
            .ok_or_else(|| AppError::Validation(format!("Unknown category '{}'", value)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a question shape, as sent by clients before the options are
/// attached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Text,
    Select,
    Multi,
}

/// Shape of a question. Options exist only for the choice variants.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Select {
        #[serde(deserialize_with = "options_from_wire")]
        options: Vec<String>,
    },
    Multi {
        #[serde(deserialize_with = "options_from_wire")]
        options: Vec<String>,
    },
}

impl QuestionKind {
    /// Builds a kind from a loose `(type, options)` pair. Options are ignored
    /// for text questions and must be non-empty for choice questions.
    pub fn from_parts(question_type: QuestionType, options: Vec<String>) -> AppResult<Self> {
        let options = normalize_options(options);
        match question_type {
            QuestionType::Text => Ok(QuestionKind::Text),
            QuestionType::Select | QuestionType::Multi if options.is_empty() => Err(
                AppError::Validation("Choice questions need at least one option".to_string()),
            ),
            QuestionType::Select => Ok(QuestionKind::Select { options }),
            QuestionType::Multi => Ok(QuestionKind::Multi { options }),
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::Text => QuestionType::Text,
            QuestionKind::Select { .. } => QuestionType::Select,
            QuestionKind::Multi { .. } => QuestionType::Multi,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            QuestionKind::Text => &[],
            QuestionKind::Select { options } | QuestionKind::Multi { options } => options,
        }
    }
}

/// Splits the comma separated option string used by the teacher and manager
/// forms into trimmed, non-empty options.
pub fn parse_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn normalize_options(options: Vec<String>) -> Vec<String> {
    options
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

/// Options as they travel over the wire: either a list or one comma separated string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OptionsInput {
    List(Vec<String>),
    Csv(String),
}

impl Default for OptionsInput {
    fn default() -> Self {
        OptionsInput::List(Vec::new())
    }
}

impl OptionsInput {
    pub fn into_list(self) -> Vec<String> {
        match self {
            OptionsInput::List(list) => normalize_options(list),
            OptionsInput::Csv(raw) => parse_options(&raw),
        }
    }
}

fn options_from_wire<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    OptionsInput::deserialize(deserializer).map(OptionsInput::into_list)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
}

/// A teacher-proposed question awaiting moderation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionRequest {
    pub id: String,
    pub experiment_id: String,
    pub class_id: String,
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_question_id: Option<String>,
}

impl QuestionRequest {
    pub fn pending(experiment_id: &str, class_id: &str, text: &str, kind: QuestionKind) -> Self {
        QuestionRequest {
            id: uuid::Uuid::new_v4().to_string(),
            experiment_id: experiment_id.to_string(),
            class_id: class_id.to_string(),
            text: text.to_string(),
            kind,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            approved_at: None,
            final_question_id: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// A manager-approved question shown to the students of one class.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActiveQuestion {
    pub id: String,
    pub experiment_id: String,
    pub class_id: String,
    pub text: String,
    #[serde(default)]
    pub category: Category,
    #[serde(flatten)]
    pub kind: QuestionKind,
    pub created_at: DateTime<Utc>,
    pub origin_request_id: String,
    pub is_visible: bool,
}

impl ActiveQuestion {
    /// Key under which students' answers to this question are stored.
    pub fn answer_key(&self) -> String {
        format!("custom_{}", self.id)
    }
}
