use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{AnswerValue, Answers, SubmissionEntry},
    repositories::SubmissionRepository,
};

const DATE_KEY: &str = "date";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Entry as shown to teachers: the student id is stripped.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnonymizedEntry {
    pub date: String,
    pub class_id: String,
    pub experiment_id: String,
    pub answers: Answers,
}

pub struct SubmissionService {
    repository: Arc<dyn SubmissionRepository>,
    day_offset: Option<FixedOffset>,
}

impl SubmissionService {
    /// `day_offset` anchors "today" to a fixed UTC offset; `None` uses the
    /// server's local calendar date.
    pub fn new(repository: Arc<dyn SubmissionRepository>, day_offset: Option<FixedOffset>) -> Self {
        Self {
            repository,
            day_offset,
        }
    }

    fn today(&self) -> String {
        match self.day_offset {
            Some(offset) => Utc::now().with_timezone(&offset).format(DATE_FORMAT).to_string(),
            None => Local::now().format(DATE_FORMAT).to_string(),
        }
    }

    fn resolve_date(&self, answers: &mut Answers) -> AppResult<String> {
        match answers.remove(DATE_KEY) {
            None => Ok(self.today()),
            Some(AnswerValue::Text(raw)) => {
                let raw = raw.trim();
                NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .map_err(|_| {
                        AppError::Validation(format!("Invalid submission date '{}'", raw))
                    })
            }
            Some(other) => Err(AppError::Validation(format!(
                "Submission date must be a YYYY-MM-DD string, got {:?}",
                other
            ))),
        }
    }

    /// Upserts the student's entry for the day and returns its id. A second
    /// submission on the same day replaces the first one entirely.
    ///
    /// Completeness of `answers` is the caller's concern; see
    /// `form_composer::missing_required`.
    pub async fn submit(
        &self,
        experiment_id: &str,
        class_id: &str,
        student_id: &str,
        mut answers: Answers,
    ) -> AppResult<String> {
        let (experiment_id, class_id, student_id) =
            (experiment_id.trim(), class_id.trim(), student_id.trim());
        if experiment_id.is_empty() || class_id.is_empty() || student_id.is_empty() {
            return Err(AppError::MissingContext(
                "experiment_id, class_id and student_id are required".to_string(),
            ));
        }

        let date = self.resolve_date(&mut answers)?;
        let entry = SubmissionEntry {
            id: SubmissionEntry::entry_id(student_id, &date),
            student_id: student_id.to_string(),
            experiment_id: experiment_id.to_string(),
            class_id: class_id.to_string(),
            date,
            updated_at: Utc::now(),
            answers,
        };

        let saved = self.repository.upsert(entry).await.map_err(|err| {
            log::error!("Failed to save entry for student '{}': {}", student_id, err);
            err
        })?;
        log::debug!("Saved submission '{}'", saved.id);
        Ok(saved.id)
    }

    /// Number of days the student has submitted for.
    pub async fn count_for_student(
        &self,
        experiment_id: &str,
        class_id: &str,
        student_id: &str,
    ) -> AppResult<u64> {
        self.repository
            .count_for_student(experiment_id, class_id, student_id)
            .await
    }

    pub async fn last_submission_time(
        &self,
        experiment_id: &str,
        class_id: &str,
        student_id: &str,
    ) -> AppResult<Option<DateTime<Utc>>> {
        let entries = self
            .repository
            .find_for_student(experiment_id, class_id, student_id)
            .await?;
        Ok(entries.iter().map(|e| e.updated_at).max())
    }

    pub async fn class_entries(
        &self,
        experiment_id: &str,
        class_id: &str,
    ) -> AppResult<Vec<SubmissionEntry>> {
        if experiment_id.trim().is_empty() || class_id.trim().is_empty() {
            return Err(AppError::MissingContext(
                "experiment_id and class_id are required".to_string(),
            ));
        }
        self.repository.find_for_class(experiment_id, class_id).await
    }

    pub async fn anonymized_class_entries(
        &self,
        experiment_id: &str,
        class_id: &str,
    ) -> AppResult<Vec<AnonymizedEntry>> {
        Ok(self
            .class_entries(experiment_id, class_id)
            .await?
            .into_iter()
            .map(|e| AnonymizedEntry {
                date: e.date,
                class_id: e.class_id,
                experiment_id: e.experiment_id,
                answers: e.answers,
            })
            .collect())
    }

    /// Every entry in every class.
    pub async fn all_entries(&self) -> AppResult<Vec<SubmissionEntry>> {
        self.repository.find_all().await
    }
}
