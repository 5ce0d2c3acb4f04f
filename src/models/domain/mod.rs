pub mod experiment;
pub mod question;
pub mod step;
pub mod submission;
pub mod user;
pub use experiment::{Class, Experiment};
pub use question::{ActiveQuestion, Category, QuestionKind, QuestionRequest, QuestionType, RequestStatus};
pub use step::{Step, StepInput, StepOption};
pub use submission::{AnswerValue, Answers, SubmissionEntry};
pub use user::{User, UserRole};
