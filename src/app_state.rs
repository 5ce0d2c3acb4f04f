use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        ExperimentRepository, MongoExperimentRepository, MongoQuestionRepository,
        MongoSubmissionRepository, MongoUserRepository, QuestionRepository,
        SubmissionRepository, UserRepository,
    },
    services::{
        ExperimentService, QuestionCatalogService, ReportService, SubmissionService, UserService,
    },
};

/// The store seams every service is built from.
#[derive(Clone)]
pub struct Repositories {
    pub experiments: Arc<dyn ExperimentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            experiments: Arc::new(MongoExperimentRepository::new(db)),
            users: Arc::new(MongoUserRepository::new(db)),
            questions: Arc::new(MongoQuestionRepository::new(db)),
            submissions: Arc::new(MongoSubmissionRepository::new(db)),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        self.experiments.ensure_indexes().await?;
        self.users.ensure_indexes().await?;
        self.questions.ensure_indexes().await?;
        self.submissions.ensure_indexes().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub experiment_service: Arc<ExperimentService>,
    pub user_service: Arc<UserService>,
    pub question_service: Arc<QuestionCatalogService>,
    pub submission_service: Arc<SubmissionService>,
    pub report_service: Arc<ReportService>,
    pub jwt_service: Arc<JwtService>,
    /// `None` when running on non-Mongo repositories.
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let repositories = Repositories::mongo(&db);
        repositories.ensure_indexes().await?;

        let mut state = Self::from_repositories(config, repositories);
        state.db = Some(db);

        state
            .user_service
            .ensure_manager_seed(
                &state.config.manager_username,
                state.config.manager_password.expose_secret(),
            )
            .await?;

        Ok(state)
    }

    pub fn from_repositories(config: Config, repositories: Repositories) -> Self {
        let experiment_service = Arc::new(ExperimentService::new(repositories.experiments));
        let user_service = Arc::new(UserService::new(
            repositories.users,
            Arc::clone(&experiment_service),
        ));
        let question_service = Arc::new(QuestionCatalogService::new(Arc::clone(
            &repositories.questions,
        )));
        let submission_service = Arc::new(SubmissionService::new(
            Arc::clone(&repositories.submissions),
            config.submission_offset(),
        ));
        let report_service = Arc::new(ReportService::new(
            repositories.submissions,
            repositories.questions,
        ));
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        Self {
            experiment_service,
            user_service,
            question_service,
            submission_service,
            report_service,
            jwt_service,
            db: None,
            config: Arc::new(config),
        }
    }
}
