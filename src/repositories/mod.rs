pub mod experiment_repository;
pub mod question_repository;
pub mod submission_repository;
pub mod user_repository;

pub use experiment_repository::{ExperimentRepository, MongoExperimentRepository};
pub use question_repository::{ApprovalWrite, MongoQuestionRepository, QuestionRepository};
pub use submission_repository::{MongoSubmissionRepository, SubmissionRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
