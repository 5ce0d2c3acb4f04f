use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One answer in a questionnaire. Text and select steps produce `Text`,
/// multi steps produce `Choices`, rating steps produce `Number`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Choices(Vec<String>),
    Number(f64),
    Text(String),
}

impl AnswerValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Renders the answer as a single spreadsheet cell.
    pub fn to_cell(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Number(n) => format_number(*n),
            AnswerValue::Choices(choices) => choices.join(", "),
        }
    }

    /// A blank answer: empty/whitespace text or an empty selection.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Number(_) => false,
            AnswerValue::Choices(choices) => choices.is_empty(),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub type Answers = BTreeMap<String, AnswerValue>;

/// One student's answers for one calendar day. Keyed by `{student_id}_{date}`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SubmissionEntry {
    pub id: String,
    pub student_id: String,
    pub experiment_id: String,
    pub class_id: String,
    pub date: String,
    pub updated_at: DateTime<Utc>,
    pub answers: Answers,
}

impl SubmissionEntry {
    pub fn entry_id(student_id: &str, date: &str) -> String {
        format!("{}_{}", student_id, date)
    }

    pub fn answer(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.get(key)
    }
}
