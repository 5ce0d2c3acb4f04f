#[cfg(test)]
pub mod fixtures {
    use chrono::Utc;

    use crate::models::domain::{
        ActiveQuestion, AnswerValue, Answers, Category, QuestionKind, SubmissionEntry,
    };

    pub fn answers(pairs: &[(&str, &str)]) -> Answers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), AnswerValue::Text(v.to_string())))
            .collect()
    }

    pub fn entry(student_id: &str, date: &str, answers: Answers) -> SubmissionEntry {
        SubmissionEntry {
            id: SubmissionEntry::entry_id(student_id, date),
            student_id: student_id.to_string(),
            experiment_id: "exp1".to_string(),
            class_id: "classA".to_string(),
            date: date.to_string(),
            updated_at: Utc::now(),
            answers,
        }
    }

    pub fn active_question(id: &str, category: Category, kind: QuestionKind) -> ActiveQuestion {
        ActiveQuestion {
            id: id.to_string(),
            experiment_id: "exp1".to_string(),
            class_id: "classA".to_string(),
            text: format!("Question {}", id),
            category,
            kind,
            created_at: Utc::now(),
            origin_request_id: format!("req-{}", id),
            is_visible: true,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}
