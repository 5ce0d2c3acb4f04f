use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::domain::Category,
    repositories::{QuestionRepository, SubmissionRepository},
    services::aggregation::{self, Report, SleepStats},
};

pub struct ReportService {
    submissions: Arc<dyn SubmissionRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl ReportService {
    pub fn new(
        submissions: Arc<dyn SubmissionRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            submissions,
            questions,
        }
    }

    /// Statistics over one class, or over every class when `scope` is `None`.
    pub async fn stats(&self, scope: Option<(&str, &str)>) -> AppResult<SleepStats> {
        let entries = match scope {
            Some((experiment_id, class_id)) => {
                self.submissions
                    .find_for_class(experiment_id, class_id)
                    .await?
            }
            None => self.submissions.find_all().await?,
        };
        Ok(aggregation::compute_stats(&entries))
    }

    pub async fn category_report(&self, category: Category) -> AppResult<Report> {
        let active = self.questions.find_all_active().await?;
        if !active.iter().any(|q| q.category == category) {
            log::info!("No active questions in category '{}'", category);
            return Ok(Report::default());
        }
        let entries = self.submissions.find_all().await?;
        Ok(aggregation::build_category_report(
            category, &entries, &active,
        ))
    }

    pub async fn class_report(&self, experiment_id: &str, class_id: &str) -> AppResult<Report> {
        let entries = self
            .submissions
            .find_for_class(experiment_id, class_id)
            .await?;
        let active = self.questions.find_active(experiment_id, class_id).await?;
        Ok(aggregation::build_class_report(&entries, &active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{ActiveQuestion, QuestionKind};
    use crate::repositories::{
        question_repository::MockQuestionRepository,
        submission_repository::MockSubmissionRepository,
    };
    use crate::test_utils::fixtures::{active_question, answers, entry};

    fn focus_question() -> ActiveQuestion {
        active_question("q1", Category::Focus, QuestionKind::Text)
    }

    #[tokio::test]
    async fn category_report_skips_entry_scan_when_no_question_matches() {
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_find_all_active()
            .returning(|| Ok(vec![focus_question()]));
        let mut submissions = MockSubmissionRepository::new();
        submissions.expect_find_all().times(0);

        let service = ReportService::new(Arc::new(submissions), Arc::new(questions));
        let report = service.category_report(Category::Nutrition).await.unwrap();

        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn stats_scoped_to_class_reads_only_that_class() {
        let questions = MockQuestionRepository::new();
        let mut submissions = MockSubmissionRepository::new();
        submissions
            .expect_find_for_class()
            .withf(|e, c| e == "exp1" && c == "classA")
            .times(1)
            .returning(|_, _| Ok(vec![]));
        submissions.expect_find_all().times(0);

        let service = ReportService::new(Arc::new(submissions), Arc::new(questions));
        let stats = service.stats(Some(("exp1", "classA"))).await.unwrap();

        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.avg_quality, None);
    }

    #[tokio::test]
    async fn class_report_joins_entries_with_class_questions() {
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_find_active()
            .withf(|e, c| e == "exp1" && c == "classA")
            .returning(|_, _| Ok(vec![focus_question()]));
        let mut submissions = MockSubmissionRepository::new();
        submissions.expect_find_for_class().returning(|_, _| {
            Ok(vec![entry(
                "42",
                "2024-01-10",
                answers(&[("custom_q1", "very"), ("gender", "female")]),
            )])
        });

        let service = ReportService::new(Arc::new(submissions), Arc::new(questions));
        let report = service.class_report("exp1", "classA").await.unwrap();

        assert_eq!(report.header.last().unwrap(), "[focus] Question q1");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0][0], "1");
        assert_eq!(report.rows[0].last().unwrap(), "very");
    }
}
