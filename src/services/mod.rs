pub mod aggregation;
pub mod experiment_service;
pub mod form_composer;
pub mod identity;
pub mod question_catalog_service;
pub mod report_service;
pub mod submission_service;
pub mod user_service;

pub use experiment_service::ExperimentService;
pub use question_catalog_service::{ApprovalOutcome, QuestionCatalogService};
pub use report_service::ReportService;
pub use submission_service::SubmissionService;
pub use user_service::UserService;
