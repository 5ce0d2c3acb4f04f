use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, USERS},
    errors::AppResult,
    models::domain::{User, UserRole},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create-or-overwrite at the user's derived id.
    async fn save(&self, user: User) -> AppResult<User>;
    async fn find_by_id(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
    ) -> AppResult<Option<User>>;
    /// Repository-wide lookup across every experiment and class. Only accounts
    /// holding a password are considered; anonymous code records never match.
    async fn find_by_role_and_username(
        &self,
        role: UserRole,
        username: &str,
    ) -> AppResult<Option<User>>;
    async fn find_manager(&self, id: &str) -> AppResult<Option<User>>;
    /// Returns `false` when nothing matched.
    async fn delete(&self, experiment_id: &str, class_id: &str, id: &str) -> AppResult<bool>;
    async fn find_by_class(&self, experiment_id: &str, class_id: &str) -> AppResult<Vec<User>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(USERS);
        Self { collection }
    }

    fn scoped(experiment_id: Option<&str>, class_id: Option<&str>, id: &str) -> Document {
        doc! { "experiment_id": experiment_id, "class_id": class_id, "id": id }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn save(&self, user: User) -> AppResult<User> {
        let filter = Self::scoped(
            user.experiment_id.as_deref(),
            user.class_id.as_deref(),
            &user.id,
        );
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(filter, &user)
            .with_options(options)
            .await?;
        Ok(user)
    }

    async fn find_by_id(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
    ) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(Self::scoped(Some(experiment_id), Some(class_id), id))
            .await?;
        Ok(user)
    }

    async fn find_by_role_and_username(
        &self,
        role: UserRole,
        username: &str,
    ) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! {
                "role": role.as_str(),
                "username": username,
                "password_hash": { "$exists": true },
            })
            .await?;
        Ok(user)
    }

    async fn find_manager(&self, id: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "role": UserRole::ResearchManager.as_str(), "id": id })
            .await?;
        Ok(user)
    }

    async fn delete(&self, experiment_id: &str, class_id: &str, id: &str) -> AppResult<bool> {
        let result = self
            .collection
            .delete_one(Self::scoped(Some(experiment_id), Some(class_id), id))
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn find_by_class(&self, experiment_id: &str, class_id: &str) -> AppResult<Vec<User>> {
        let users = self
            .collection
            .find(doc! { "experiment_id": experiment_id, "class_id": class_id })
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let role_username = IndexModel::builder()
            .keys(doc! { "role": 1, "username": 1 })
            .options(
                IndexOptions::builder()
                    .name("role_username".to_string())
                    .build(),
            )
            .build();

        let scoped_id = IndexModel::builder()
            .keys(doc! { "experiment_id": 1, "class_id": 1, "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("scoped_id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(role_username).await?;
        self.collection.create_index(scoped_id).await?;
        log::info!("Created indexes for users collection");

        Ok(())
    }
}
