use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::{IndexOptions, UpdateOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, CLASSES, EXPERIMENTS},
    errors::{AppError, AppResult},
    models::domain::{Class, Experiment},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExperimentRepository: Send + Sync {
    /// Creates the experiment if missing and bumps `last_updated`.
    async fn touch_experiment(&self, experiment_id: &str, now: DateTime<Utc>) -> AppResult<()>;
    async fn find_all_experiments(&self) -> AppResult<Vec<Experiment>>;
    /// Inserts the class unless one with the same id already exists under the
    /// experiment; returns the stored class either way.
    async fn insert_class_if_absent(&self, class: Class) -> AppResult<Class>;
    async fn find_class(&self, experiment_id: &str, class_id: &str) -> AppResult<Option<Class>>;
    async fn find_classes(&self, experiment_id: &str) -> AppResult<Vec<Class>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoExperimentRepository {
    experiments: Collection<Experiment>,
    classes: Collection<Class>,
}

impl MongoExperimentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            experiments: db.get_collection(EXPERIMENTS),
            classes: db.get_collection(CLASSES),
        }
    }
}

#[async_trait]
impl ExperimentRepository for MongoExperimentRepository {
    async fn touch_experiment(&self, experiment_id: &str, now: DateTime<Utc>) -> AppResult<()> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.experiments
            .update_one(
                doc! { "id": experiment_id },
                doc! { "$set": { "last_updated": to_bson(&now)? } },
            )
            .with_options(options)
            .await?;
        Ok(())
    }

    async fn find_all_experiments(&self) -> AppResult<Vec<Experiment>> {
        let experiments = self
            .experiments
            .find(doc! {})
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(experiments)
    }

    async fn insert_class_if_absent(&self, class: Class) -> AppResult<Class> {
        let filter = doc! { "experiment_id": &class.experiment_id, "id": &class.id };
        let options = UpdateOptions::builder().upsert(true).build();
        self.classes
            .update_one(filter.clone(), doc! { "$setOnInsert": to_bson(&class)? })
            .with_options(options)
            .await?;

        self.classes.find_one(filter).await?.ok_or_else(|| {
            AppError::StoreUnavailable(format!("Class '{}' vanished after upsert", class.id))
        })
    }

    async fn find_class(&self, experiment_id: &str, class_id: &str) -> AppResult<Option<Class>> {
        let class = self
            .classes
            .find_one(doc! { "experiment_id": experiment_id, "id": class_id })
            .await?;
        Ok(class)
    }

    async fn find_classes(&self, experiment_id: &str) -> AppResult<Vec<Class>> {
        let classes = self
            .classes
            .find(doc! { "experiment_id": experiment_id })
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(classes)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for experiments and classes collections");

        let experiment_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let class_index = IndexModel::builder()
            .keys(doc! { "experiment_id": 1, "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("experiment_class_unique".to_string())
                    .build(),
            )
            .build();

        self.experiments.create_index(experiment_index).await?;
        self.classes.create_index(class_index).await?;
        Ok(())
    }
}
