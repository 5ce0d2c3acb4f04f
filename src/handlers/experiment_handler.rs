use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_role, AuthenticatedUser},
    errors::AppError,
    models::{
        domain::UserRole,
        dto::{
            request::{CreateClassRequest, CreateTeacherRequest, RegisterStudentRequest},
            response::{MessageResponse, UserDto},
        },
    },
};

const MANAGER_ONLY: &[UserRole] = &[UserRole::ResearchManager];

#[get("/experiments")]
async fn list_experiments(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, MANAGER_ONLY)?;

    let experiments = state.experiment_service.list_experiments().await?;
    Ok(HttpResponse::Ok().json(experiments))
}

#[post("/experiments/{experiment_id}/classes")]
async fn create_class(
    state: web::Data<Arc<AppState>>,
    experiment_id: web::Path<String>,
    request: web::Json<CreateClassRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, MANAGER_ONLY)?;
    let request = request.into_inner();
    request.validate()?;

    let class = state
        .experiment_service
        .create_class(
            &experiment_id,
            &request.school_name,
            &request.grade,
            &request.class_num,
        )
        .await?;
    Ok(HttpResponse::Created().json(class))
}

#[get("/experiments/{experiment_id}/classes")]
async fn list_classes(
    state: web::Data<Arc<AppState>>,
    experiment_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, MANAGER_ONLY)?;

    let classes = state.experiment_service.list_classes(&experiment_id).await?;
    Ok(HttpResponse::Ok().json(classes))
}

#[post("/teachers")]
async fn create_teacher(
    state: web::Data<Arc<AppState>>,
    request: web::Json<CreateTeacherRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, MANAGER_ONLY)?;
    let request = request.into_inner();
    request.validate()?;

    let teacher = state.user_service.create_teacher(request).await?;
    Ok(HttpResponse::Created().json(UserDto::from(teacher)))
}

#[post("/students")]
async fn create_student(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RegisterStudentRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, MANAGER_ONLY)?;
    let request = request.into_inner();
    request.validate()?;

    let student = state.user_service.register_student(request).await?;
    Ok(HttpResponse::Created().json(UserDto::from(student)))
}

#[delete("/experiments/{experiment_id}/classes/{class_id}/students/{username}")]
async fn delete_student(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, MANAGER_ONLY)?;
    let (experiment_id, class_id, username) = path.into_inner();

    state
        .user_service
        .delete_student(&experiment_id, &class_id, &username)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Student '{}' deleted", username),
    }))
}
