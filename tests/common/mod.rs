#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use deepsleep_server::{
    app_state::Repositories,
    errors::{AppError, AppResult},
    models::domain::{
        ActiveQuestion, Class, Experiment, QuestionRequest, RequestStatus, SubmissionEntry, User,
        UserRole,
    },
    repositories::{
        ApprovalWrite, ExperimentRepository, QuestionRepository, SubmissionRepository,
        UserRepository,
    },
    services::{
        ExperimentService, QuestionCatalogService, ReportService, SubmissionService, UserService,
    },
};

/// `(experiment_id, class_id, id)`
type ScopedKey = (String, String, String);

fn key(experiment_id: &str, class_id: &str, id: &str) -> ScopedKey {
    (
        experiment_id.to_string(),
        class_id.to_string(),
        id.to_string(),
    )
}

#[derive(Default)]
pub struct InMemoryExperimentRepository {
    experiments: RwLock<HashMap<String, Experiment>>,
    classes: RwLock<HashMap<(String, String), Class>>,
}

#[async_trait]
impl ExperimentRepository for InMemoryExperimentRepository {
    async fn touch_experiment(&self, experiment_id: &str, now: DateTime<Utc>) -> AppResult<()> {
        self.experiments.write().await.insert(
            experiment_id.to_string(),
            Experiment {
                id: experiment_id.to_string(),
                last_updated: now,
            },
        );
        Ok(())
    }

    async fn find_all_experiments(&self) -> AppResult<Vec<Experiment>> {
        let mut items: Vec<_> = self.experiments.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn insert_class_if_absent(&self, class: Class) -> AppResult<Class> {
        let mut classes = self.classes.write().await;
        let stored = classes
            .entry((class.experiment_id.clone(), class.id.clone()))
            .or_insert(class);
        Ok(stored.clone())
    }

    async fn find_class(&self, experiment_id: &str, class_id: &str) -> AppResult<Option<Class>> {
        Ok(self
            .classes
            .read()
            .await
            .get(&(experiment_id.to_string(), class_id.to_string()))
            .cloned())
    }

    async fn find_classes(&self, experiment_id: &str) -> AppResult<Vec<Class>> {
        let mut items: Vec<_> = self
            .classes
            .read()
            .await
            .values()
            .filter(|c| c.experiment_id == experiment_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<ScopedKey, User>>,
}

fn user_key(user: &User) -> ScopedKey {
    key(
        user.experiment_id.as_deref().unwrap_or_default(),
        user.class_id.as_deref().unwrap_or_default(),
        &user.id,
    )
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: User) -> AppResult<User> {
        self.users.write().await.insert(user_key(&user), user.clone());
        Ok(user)
    }

    async fn find_by_id(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
    ) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .get(&key(experiment_id, class_id, id))
            .cloned())
    }

    async fn find_by_role_and_username(
        &self,
        role: UserRole,
        username: &str,
    ) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.role == role && u.username == username && u.password_hash.is_some())
            .cloned())
    }

    async fn find_manager(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.role == UserRole::ResearchManager && u.id == id)
            .cloned())
    }

    async fn delete(&self, experiment_id: &str, class_id: &str, id: &str) -> AppResult<bool> {
        Ok(self
            .users
            .write()
            .await
            .remove(&key(experiment_id, class_id, id))
            .is_some())
    }

    async fn find_by_class(&self, experiment_id: &str, class_id: &str) -> AppResult<Vec<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| {
                u.experiment_id.as_deref() == Some(experiment_id)
                    && u.class_id.as_deref() == Some(class_id)
            })
            .cloned()
            .collect())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct QuestionTables {
    pub requests: HashMap<ScopedKey, QuestionRequest>,
    pub active: HashMap<ScopedKey, ActiveQuestion>,
}

/// Keeps requests and active questions behind one lock so an approval batch
/// is applied all-or-nothing, like the transactional store.
#[derive(Default)]
pub struct InMemoryQuestionRepository {
    pub tables: RwLock<QuestionTables>,
}

fn in_creation_order(mut items: Vec<ActiveQuestion>) -> Vec<ActiveQuestion> {
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    items
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn create_request(&self, request: QuestionRequest) -> AppResult<QuestionRequest> {
        self.tables.write().await.requests.insert(
            key(&request.experiment_id, &request.class_id, &request.id),
            request.clone(),
        );
        Ok(request)
    }

    async fn find_request(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
    ) -> AppResult<Option<QuestionRequest>> {
        Ok(self
            .tables
            .read()
            .await
            .requests
            .get(&key(experiment_id, class_id, id))
            .cloned())
    }

    async fn find_pending_requests(&self) -> AppResult<Vec<QuestionRequest>> {
        let mut items: Vec<_> = self
            .tables
            .read()
            .await
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn apply_approvals(&self, approvals: Vec<ApprovalWrite>) -> AppResult<()> {
        let mut tables = self.tables.write().await;

        for approval in &approvals {
            let request_key = key(
                &approval.question.experiment_id,
                &approval.question.class_id,
                &approval.request_id,
            );
            match tables.requests.get(&request_key) {
                Some(request) if request.is_pending() => {}
                _ => {
                    return Err(AppError::NotFound(format!(
                        "Pending request '{}' not found",
                        approval.request_id
                    )))
                }
            }
        }

        for approval in approvals {
            let question = approval.question;
            let request_key = key(
                &question.experiment_id,
                &question.class_id,
                &approval.request_id,
            );
            if let Some(request) = tables.requests.get_mut(&request_key) {
                request.status = RequestStatus::Approved;
                request.approved_at = Some(approval.approved_at);
                request.final_question_id = Some(question.id.clone());
            }
            tables.active.insert(
                key(&question.experiment_id, &question.class_id, &question.id),
                question,
            );
        }
        Ok(())
    }

    async fn find_active(
        &self,
        experiment_id: &str,
        class_id: &str,
    ) -> AppResult<Vec<ActiveQuestion>> {
        let items = self
            .tables
            .read()
            .await
            .active
            .values()
            .filter(|q| q.experiment_id == experiment_id && q.class_id == class_id && q.is_visible)
            .cloned()
            .collect();
        Ok(in_creation_order(items))
    }

    async fn find_all_active(&self) -> AppResult<Vec<ActiveQuestion>> {
        let items = self.tables.read().await.active.values().cloned().collect();
        Ok(in_creation_order(items))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySubmissionRepository {
    entries: RwLock<HashMap<ScopedKey, SubmissionEntry>>,
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn upsert(&self, entry: SubmissionEntry) -> AppResult<SubmissionEntry> {
        self.entries.write().await.insert(
            key(&entry.experiment_id, &entry.class_id, &entry.id),
            entry.clone(),
        );
        Ok(entry)
    }

    async fn find_by_id(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
    ) -> AppResult<Option<SubmissionEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .get(&key(experiment_id, class_id, id))
            .cloned())
    }

    async fn count_for_student(
        &self,
        experiment_id: &str,
        class_id: &str,
        student_id: &str,
    ) -> AppResult<u64> {
        Ok(self
            .find_for_student(experiment_id, class_id, student_id)
            .await?
            .len() as u64)
    }

    async fn find_for_student(
        &self,
        experiment_id: &str,
        class_id: &str,
        student_id: &str,
    ) -> AppResult<Vec<SubmissionEntry>> {
        let mut items: Vec<_> = self
            .find_for_class(experiment_id, class_id)
            .await?
            .into_iter()
            .filter(|e| e.student_id == student_id)
            .collect();
        items.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(items)
    }

    async fn find_for_class(
        &self,
        experiment_id: &str,
        class_id: &str,
    ) -> AppResult<Vec<SubmissionEntry>> {
        let mut items: Vec<_> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.experiment_id == experiment_id && e.class_id == class_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn find_all(&self) -> AppResult<Vec<SubmissionEntry>> {
        let mut items: Vec<_> = self.entries.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// In-memory repositories plus the services wired on top of them.
pub struct TestContext {
    pub experiments: Arc<InMemoryExperimentRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub questions: Arc<InMemoryQuestionRepository>,
    pub submissions: Arc<InMemorySubmissionRepository>,
    pub experiment_service: Arc<ExperimentService>,
    pub user_service: UserService,
    pub question_service: QuestionCatalogService,
    pub submission_service: SubmissionService,
    pub report_service: ReportService,
}

impl TestContext {
    pub fn new() -> Self {
        let experiments = Arc::new(InMemoryExperimentRepository::default());
        let users = Arc::new(InMemoryUserRepository::default());
        let questions = Arc::new(InMemoryQuestionRepository::default());
        let submissions = Arc::new(InMemorySubmissionRepository::default());

        let experiment_service = Arc::new(ExperimentService::new(experiments.clone()));
        Self {
            user_service: UserService::new(users.clone(), Arc::clone(&experiment_service)),
            question_service: QuestionCatalogService::new(questions.clone()),
            submission_service: SubmissionService::new(submissions.clone(), None),
            report_service: ReportService::new(submissions.clone(), questions.clone()),
            experiment_service,
            experiments,
            users,
            questions,
            submissions,
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            experiments: self.experiments.clone(),
            users: self.users.clone(),
            questions: self.questions.clone(),
            submissions: self.submissions.clone(),
        }
    }
}
