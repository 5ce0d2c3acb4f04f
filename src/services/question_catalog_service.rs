use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{ActiveQuestion, QuestionKind, QuestionRequest},
        dto::request::{ApprovalItem, QuestionProposal},
    },
    repositories::{ApprovalWrite, QuestionRepository},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedQuestion {
    pub request_id: String,
    pub question_id: String,
    pub class_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedApproval {
    pub original_id: String,
    pub reason: String,
}

/// Result of one approval batch: what landed and what was left out before the
/// batch was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApprovalOutcome {
    pub approved: Vec<ApprovedQuestion>,
    pub skipped: Vec<SkippedApproval>,
}

pub struct QuestionCatalogService {
    repository: Arc<dyn QuestionRepository>,
}

impl QuestionCatalogService {
    pub fn new(repository: Arc<dyn QuestionRepository>) -> Self {
        Self { repository }
    }

    /// Creates a pending request under the class. Returns the request id.
    pub async fn submit_request(
        &self,
        experiment_id: &str,
        class_id: &str,
        proposal: QuestionProposal,
    ) -> AppResult<String> {
        if experiment_id.trim().is_empty() || class_id.trim().is_empty() {
            return Err(AppError::MissingContext(
                "experiment_id and class_id are required".to_string(),
            ));
        }
        let text = proposal.text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Question text cannot be empty".to_string()));
        }

        let kind = QuestionKind::from_parts(
            proposal.question_type.unwrap_or_default(),
            proposal.options.into_list(),
        )?;

        let request = self
            .repository
            .create_request(QuestionRequest::pending(
                experiment_id.trim(),
                class_id.trim(),
                text,
                kind,
            ))
            .await?;

        log::info!(
            "Question request '{}' submitted for class '{}'",
            request.id,
            request.class_id
        );
        Ok(request.id)
    }

    /// Every pending request across all experiments and classes.
    pub async fn list_pending_requests(&self) -> AppResult<Vec<QuestionRequest>> {
        self.repository.find_pending_requests().await
    }

    /// Validates each item, then writes all well-formed ones in a single atomic
    /// batch. Malformed items are reported in `skipped` and never written; a
    /// store failure fails the whole batch.
    pub async fn approve(&self, items: Vec<ApprovalItem>) -> AppResult<ApprovalOutcome> {
        let now = Utc::now();
        let mut outcome = ApprovalOutcome::default();
        let mut writes = Vec::with_capacity(items.len());

        for item in items {
            match Self::to_write(item.clone(), now) {
                Ok(write) => writes.push(write),
                Err(reason) => {
                    log::warn!(
                        "Skipping approval of request '{}': {}",
                        item.original_id,
                        reason
                    );
                    outcome.skipped.push(SkippedApproval {
                        original_id: item.original_id,
                        reason,
                    });
                }
            }
        }

        outcome.approved = writes
            .iter()
            .map(|w| ApprovedQuestion {
                request_id: w.request_id.clone(),
                question_id: w.question.id.clone(),
                class_id: w.question.class_id.clone(),
            })
            .collect();

        self.repository.apply_approvals(writes).await.map_err(|err| {
            log::error!("Approval batch failed, nothing applied: {}", err);
            err
        })?;

        Ok(outcome)
    }

    fn to_write(item: ApprovalItem, now: chrono::DateTime<Utc>) -> Result<ApprovalWrite, String> {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let (Some(experiment_id), Some(class_id)) =
            (non_blank(item.experiment_id), non_blank(item.class_id))
        else {
            return Err("missing class or experiment context".to_string());
        };
        if item.original_id.trim().is_empty() {
            return Err("missing original request id".to_string());
        }
        let text = item.final_text.trim();
        if text.is_empty() {
            return Err("final text is empty".to_string());
        }
        let kind = QuestionKind::from_parts(
            item.question_type.unwrap_or_default(),
            item.options.into_list(),
        )
        .map_err(|err| err.to_string())?;

        Ok(ApprovalWrite {
            request_id: item.original_id.trim().to_string(),
            question: ActiveQuestion {
                id: uuid::Uuid::new_v4().to_string(),
                experiment_id,
                class_id,
                text: text.to_string(),
                category: item.category.unwrap_or_default(),
                kind,
                created_at: now,
                origin_request_id: item.original_id.trim().to_string(),
                is_visible: true,
            },
            approved_at: now,
        })
    }

    pub async fn list_active(
        &self,
        experiment_id: &str,
        class_id: &str,
    ) -> AppResult<Vec<ActiveQuestion>> {
        if experiment_id.trim().is_empty() || class_id.trim().is_empty() {
            return Err(AppError::MissingContext(
                "experiment_id and class_id are required".to_string(),
            ));
        }
        self.repository
            .find_active(experiment_id.trim(), class_id.trim())
            .await
    }

    /// Every active question in every class, for category-wide reports.
    pub async fn list_active_global(&self) -> AppResult<Vec<ActiveQuestion>> {
        self.repository.find_all_active().await
    }
}
