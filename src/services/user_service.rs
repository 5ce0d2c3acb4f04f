use std::sync::Arc;

use crate::{
    auth::password::{hash_password, verify_password},
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole},
        dto::request::{
            CreateTeacherRequest, LoginRequest, RegisterStudentRequest,
        },
    },
    repositories::UserRepository,
    services::{
        experiment_service::{require_filled, ExperimentService},
        identity::{derive_user_id, manager_user_id},
    },
};

const MIN_ANONYMOUS_CODE_LEN: usize = 3;

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    experiments: Arc<ExperimentService>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, experiments: Arc<ExperimentService>) -> Self {
        Self {
            repository,
            experiments,
        }
    }

    /// Fails with `DuplicateUsername` when any account of `role` holding a
    /// password, in any experiment or class, already has exactly this username.
    ///
    /// The check and the following write are separate store operations, so two
    /// concurrent registrations can both pass it.
    pub async fn ensure_username_available(&self, role: UserRole, username: &str) -> AppResult<()> {
        if self
            .repository
            .find_by_role_and_username(role, username)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateUsername(username.to_string()));
        }
        Ok(())
    }

    /// Usernames are sanitized into ids, so distinct usernames can map to the
    /// same record. An id already held by another username is refused.
    async fn ensure_id_unclaimed(
        &self,
        experiment_id: &str,
        class_id: &str,
        id: &str,
        username: &str,
    ) -> AppResult<()> {
        match self.repository.find_by_id(experiment_id, class_id, id).await? {
            Some(existing) if existing.username != username => {
                log::warn!(
                    "Username '{}' collides with existing account '{}'",
                    username,
                    existing.id
                );
                Err(AppError::DuplicateUsername(username.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Used both for self-registration and for manager-created students.
    pub async fn register_student(&self, request: RegisterStudentRequest) -> AppResult<User> {
        let experiment_id = request.experiment_id.trim();
        let username = request.username.trim();
        let password = request.password.trim();
        let school_name = request.school_name.trim();
        let grade = request.grade.trim();
        let class_num = request.class_num.trim();

        require_filled(&[
            ("experiment_id", experiment_id),
            ("username", username),
            ("password", password),
            ("school_name", school_name),
            ("grade", grade),
            ("class_num", class_num),
        ])?;

        self.ensure_username_available(UserRole::Student, username)
            .await?;

        let class = self
            .experiments
            .create_class(experiment_id, school_name, grade, class_num)
            .await?;

        let id = derive_user_id(UserRole::Student, &class.id, username);
        self.ensure_id_unclaimed(experiment_id, &class.id, &id, username)
            .await?;

        let mut user = User::new(&id, UserRole::Student, username)
        .in_class(experiment_id, &class.id)
        .with_hierarchy(school_name, grade, class_num)
        .with_password_hash(hash_password(password));
        user.full_name = Some(username.to_string());

        let saved = self.repository.save(user).await?;
        log::info!("Registered student '{}' in class '{}'", saved.username, class.id);
        Ok(saved)
    }

    /// Teachers log in with their email, which is therefore their username.
    pub async fn create_teacher(&self, request: CreateTeacherRequest) -> AppResult<User> {
        let experiment_id = request.experiment_id.trim();
        let full_name = request.full_name.trim();
        let email = request.email.trim();
        let password = request.password.trim();
        let school_name = request.school_name.trim();
        let grade = request.grade.trim();
        let class_num = request.class_num.trim();

        require_filled(&[
            ("experiment_id", experiment_id),
            ("full_name", full_name),
            ("email", email),
            ("password", password),
            ("school_name", school_name),
            ("grade", grade),
            ("class_num", class_num),
        ])?;

        self.ensure_username_available(UserRole::Teacher, email)
            .await?;

        let class = self
            .experiments
            .create_class(experiment_id, school_name, grade, class_num)
            .await?;

        let id = derive_user_id(UserRole::Teacher, &class.id, full_name);
        self.ensure_id_unclaimed(experiment_id, &class.id, &id, email)
            .await?;

        let mut user = User::new(&id, UserRole::Teacher, email)
        .in_class(experiment_id, &class.id)
        .with_hierarchy(school_name, grade, class_num)
        .with_password_hash(hash_password(password));
        user.full_name = Some(full_name.to_string());
        user.email = Some(email.to_string());

        let saved = self.repository.save(user).await?;
        log::info!("Created teacher '{}' for class '{}'", saved.id, class.id);
        Ok(saved)
    }

    pub async fn delete_student(
        &self,
        experiment_id: &str,
        class_id: &str,
        username: &str,
    ) -> AppResult<()> {
        let (experiment_id, class_id, username) =
            (experiment_id.trim(), class_id.trim(), username.trim());
        require_filled(&[
            ("experiment_id", experiment_id),
            ("class_id", class_id),
            ("username", username),
        ])?;

        let id = derive_user_id(UserRole::Student, class_id, username);
        if !self.repository.delete(experiment_id, class_id, &id).await? {
            return Err(AppError::NotFound(format!("Student '{}' not found", id)));
        }
        log::info!("Deleted student '{}'", id);
        Ok(())
    }

    /// Students entering through a class link identify with a short code. The
    /// first visit creates the record; later visits with the same code reuse it.
    pub async fn get_or_create_anonymous_student(
        &self,
        experiment_id: &str,
        class_id: &str,
        code: &str,
    ) -> AppResult<User> {
        let (experiment_id, class_id, code) = (experiment_id.trim(), class_id.trim(), code.trim());
        if experiment_id.is_empty() || class_id.is_empty() {
            return Err(AppError::MissingContext(
                "experiment_id and class_id are required".to_string(),
            ));
        }
        if code.chars().count() < MIN_ANONYMOUS_CODE_LEN {
            return Err(AppError::Validation(format!(
                "Identification code must be at least {} characters",
                MIN_ANONYMOUS_CODE_LEN
            )));
        }

        if let Some(existing) = self
            .repository
            .find_by_id(experiment_id, class_id, code)
            .await?
        {
            return Ok(existing);
        }

        let mut user = User::new(code, UserRole::Student, code).in_class(experiment_id, class_id);
        user.is_anonymous = true;

        let saved = self.repository.save(user).await?;
        log::info!("Created anonymous student in class '{}'", class_id);
        Ok(saved)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<User> {
        let username = request.username.trim();
        let password = request.password.trim();
        require_filled(&[("username", username), ("password", password)])?;

        let user = self
            .repository
            .find_by_role_and_username(request.role, username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        let verified = user
            .password_hash
            .as_deref()
            .map(|hash| verify_password(password, hash))
            .unwrap_or(false);

        if !verified {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }
        Ok(user)
    }

    /// Makes sure the configured research manager account exists.
    pub async fn ensure_manager_seed(&self, username: &str, password: &str) -> AppResult<User> {
        let id = manager_user_id(username);
        if let Some(existing) = self.repository.find_manager(&id).await? {
            return Ok(existing);
        }

        let user = User::new(&id, UserRole::ResearchManager, username)
            .with_password_hash(hash_password(password));
        let saved = self.repository.save(user).await?;
        log::info!("Seeded research manager account '{}'", saved.username);
        Ok(saved)
    }
}
