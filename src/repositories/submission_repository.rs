use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, RESPONSES},
    errors::AppResult,
    models::domain::SubmissionEntry,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Create-or-overwrite the whole entry at its `{student}_{date}` id.
    async fn upsert(&self, entry: SubmissionEntry) -> AppResult<SubmissionEntry>;
    async fn find_by_id(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
    ) -> AppResult<Option<SubmissionEntry>>;
    async fn count_for_student(
        &self,
        experiment_id: &str,
        class_id: &str,
        student_id: &str,
    ) -> AppResult<u64>;
    async fn find_for_student(
        &self,
        experiment_id: &str,
        class_id: &str,
        student_id: &str,
    ) -> AppResult<Vec<SubmissionEntry>>;
    async fn find_for_class(
        &self,
        experiment_id: &str,
        class_id: &str,
    ) -> AppResult<Vec<SubmissionEntry>>;
    /// Repository-wide scan of every entry.
    async fn find_all(&self) -> AppResult<Vec<SubmissionEntry>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoSubmissionRepository {
    collection: Collection<SubmissionEntry>,
}

impl MongoSubmissionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(RESPONSES);
        Self { collection }
    }
}

#[async_trait]
impl SubmissionRepository for MongoSubmissionRepository {
    async fn upsert(&self, entry: SubmissionEntry) -> AppResult<SubmissionEntry> {
        let filter = doc! {
            "experiment_id": &entry.experiment_id,
            "class_id": &entry.class_id,
            "id": &entry.id,
        };
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(filter, &entry)
            .with_options(options)
            .await?;
        Ok(entry)
    }

    async fn find_by_id(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
    ) -> AppResult<Option<SubmissionEntry>> {
        let entry = self
            .collection
            .find_one(doc! { "experiment_id": experiment_id, "class_id": class_id, "id": id })
            .await?;
        Ok(entry)
    }

    async fn count_for_student(
        &self,
        experiment_id: &str,
        class_id: &str,
        student_id: &str,
    ) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! {
                "experiment_id": experiment_id,
                "class_id": class_id,
                "student_id": student_id,
            })
            .await?;
        Ok(count)
    }

    async fn find_for_student(
        &self,
        experiment_id: &str,
        class_id: &str,
        student_id: &str,
    ) -> AppResult<Vec<SubmissionEntry>> {
        let entries = self
            .collection
            .find(doc! {
                "experiment_id": experiment_id,
                "class_id": class_id,
                "student_id": student_id,
            })
            .sort(doc! { "date": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(entries)
    }

    async fn find_for_class(
        &self,
        experiment_id: &str,
        class_id: &str,
    ) -> AppResult<Vec<SubmissionEntry>> {
        let entries = self
            .collection
            .find(doc! { "experiment_id": experiment_id, "class_id": class_id })
            .sort(doc! { "date": 1, "student_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(entries)
    }

    async fn find_all(&self) -> AppResult<Vec<SubmissionEntry>> {
        let entries = self
            .collection
            .find(doc! {})
            .sort(doc! { "date": 1, "student_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(entries)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for responses collection");

        let scoped_id = IndexModel::builder()
            .keys(doc! { "experiment_id": 1, "class_id": 1, "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("scoped_id_unique".to_string())
                    .build(),
            )
            .build();

        let student = IndexModel::builder()
            .keys(doc! { "experiment_id": 1, "class_id": 1, "student_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("class_student".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(scoped_id).await?;
        self.collection.create_index(student).await?;
        Ok(())
    }
}
