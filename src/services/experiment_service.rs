use std::sync::Arc;

use chrono::Utc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Class, Experiment},
    repositories::ExperimentRepository,
    services::identity::derive_class_id,
};

pub struct ExperimentService {
    repository: Arc<dyn ExperimentRepository>,
}

pub(crate) fn require_filled(fields: &[(&str, &str)]) -> AppResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Required fields are empty: {}",
            missing.join(", ")
        )))
    }
}

impl ExperimentService {
    pub fn new(repository: Arc<dyn ExperimentRepository>) -> Self {
        Self { repository }
    }

    /// Derives the class id and creates the class (and its experiment) if
    /// missing. Calling twice with the same normalized triple returns the same
    /// class without creating a second record.
    pub async fn create_class(
        &self,
        experiment_id: &str,
        school_name: &str,
        grade: &str,
        class_num: &str,
    ) -> AppResult<Class> {
        let (experiment_id, school_name, grade, class_num) = (
            experiment_id.trim(),
            school_name.trim(),
            grade.trim(),
            class_num.trim(),
        );
        require_filled(&[
            ("experiment_id", experiment_id),
            ("school_name", school_name),
            ("grade", grade),
            ("class_num", class_num),
        ])?;

        let class_id = derive_class_id(school_name, grade, class_num);
        self.repository
            .touch_experiment(experiment_id, Utc::now())
            .await?;

        let class = self
            .repository
            .insert_class_if_absent(Class::new(
                &class_id,
                experiment_id,
                school_name,
                grade,
                class_num,
            ))
            .await?;

        log::info!("Class '{}' ready in experiment '{}'", class.id, experiment_id);
        Ok(class)
    }

    pub async fn list_experiments(&self) -> AppResult<Vec<Experiment>> {
        self.repository.find_all_experiments().await
    }

    pub async fn list_classes(&self, experiment_id: &str) -> AppResult<Vec<Class>> {
        if experiment_id.trim().is_empty() {
            return Err(AppError::MissingContext("experiment_id is required".to_string()));
        }
        self.repository.find_classes(experiment_id.trim()).await
    }

    pub async fn get_class(&self, experiment_id: &str, class_id: &str) -> AppResult<Class> {
        self.repository
            .find_class(experiment_id, class_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Class '{}' not found in experiment '{}'",
                    class_id, experiment_id
                ))
            })
    }
}
