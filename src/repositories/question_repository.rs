use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Client, ClientSession, Collection, IndexModel,
};

use crate::{
    db::{Database, ACTIVE_QUESTIONS, QUESTION_REQUESTS},
    errors::{AppError, AppResult},
    models::domain::{ActiveQuestion, QuestionRequest, RequestStatus},
};

/// One approval as written to the store: the question it creates and the
/// request it settles. Both live under `question.experiment_id/class_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalWrite {
    pub request_id: String,
    pub question: ActiveQuestion,
    pub approved_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create_request(&self, request: QuestionRequest) -> AppResult<QuestionRequest>;
    async fn find_request(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
    ) -> AppResult<Option<QuestionRequest>>;
    /// Repository-wide scan for requests still awaiting moderation.
    async fn find_pending_requests(&self) -> AppResult<Vec<QuestionRequest>>;
    /// Applies every write or none. Fails with `NotFound` when a target request
    /// is missing or no longer pending.
    async fn apply_approvals(&self, approvals: Vec<ApprovalWrite>) -> AppResult<()>;
    /// Visible questions of one class in creation order.
    async fn find_active(&self, experiment_id: &str, class_id: &str)
        -> AppResult<Vec<ActiveQuestion>>;
    /// Repository-wide scan in creation order.
    async fn find_all_active(&self) -> AppResult<Vec<ActiveQuestion>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuestionRepository {
    client: Client,
    requests: Collection<QuestionRequest>,
    active: Collection<ActiveQuestion>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            client: db.client().clone(),
            requests: db.get_collection(QUESTION_REQUESTS),
            active: db.get_collection(ACTIVE_QUESTIONS),
        }
    }

    async fn write_approvals(
        &self,
        session: &mut ClientSession,
        approvals: &[ApprovalWrite],
    ) -> AppResult<()> {
        for approval in approvals {
            let question = &approval.question;
            self.active
                .insert_one(question)
                .session(&mut *session)
                .await?;

            let result = self
                .requests
                .update_one(
                    doc! {
                        "experiment_id": &question.experiment_id,
                        "class_id": &question.class_id,
                        "id": &approval.request_id,
                        "status": "pending",
                    },
                    doc! {
                        "$set": {
                            "status": to_bson(&RequestStatus::Approved)?,
                            "approved_at": to_bson(&approval.approved_at)?,
                            "final_question_id": &question.id,
                        }
                    },
                )
                .session(&mut *session)
                .await?;

            if result.matched_count == 0 {
                return Err(AppError::NotFound(format!(
                    "Pending question request '{}' not found in class '{}'",
                    approval.request_id, question.class_id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn create_request(&self, request: QuestionRequest) -> AppResult<QuestionRequest> {
        self.requests.insert_one(&request).await?;
        Ok(request)
    }

    async fn find_request(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
    ) -> AppResult<Option<QuestionRequest>> {
        let request = self
            .requests
            .find_one(doc! { "experiment_id": experiment_id, "class_id": class_id, "id": id })
            .await?;
        Ok(request)
    }

    async fn find_pending_requests(&self) -> AppResult<Vec<QuestionRequest>> {
        let requests = self
            .requests
            .find(doc! { "status": "pending" })
            .sort(doc! { "created_at": 1, "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(requests)
    }

    async fn apply_approvals(&self, approvals: Vec<ApprovalWrite>) -> AppResult<()> {
        if approvals.is_empty() {
            return Ok(());
        }

        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        match self.write_approvals(&mut session, &approvals).await {
            Ok(()) => {
                session.commit_transaction().await?;
                log::info!("Committed {} question approvals", approvals.len());
                Ok(())
            }
            Err(err) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    log::error!("Failed to abort approval transaction: {}", abort_err);
                }
                Err(err)
            }
        }
    }

    async fn find_active(
        &self,
        experiment_id: &str,
        class_id: &str,
    ) -> AppResult<Vec<ActiveQuestion>> {
        let questions = self
            .active
            .find(doc! {
                "experiment_id": experiment_id,
                "class_id": class_id,
                "is_visible": true,
            })
            .sort(doc! { "created_at": 1, "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn find_all_active(&self) -> AppResult<Vec<ActiveQuestion>> {
        let questions = self
            .active
            .find(doc! {})
            .sort(doc! { "created_at": 1, "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for question collections");

        let request_scope = IndexModel::builder()
            .keys(doc! { "experiment_id": 1, "class_id": 1, "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("scoped_id_unique".to_string())
                    .build(),
            )
            .build();

        let request_status = IndexModel::builder()
            .keys(doc! { "status": 1 })
            .options(IndexOptions::builder().name("status".to_string()).build())
            .build();

        let active_scope = IndexModel::builder()
            .keys(doc! { "experiment_id": 1, "class_id": 1, "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("class_created_at".to_string())
                    .build(),
            )
            .build();

        self.requests.create_index(request_scope).await?;
        self.requests.create_index(request_status).await?;
        self.active.create_index(active_scope).await?;
        Ok(())
    }
}
