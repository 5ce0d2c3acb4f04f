use std::sync::Arc;

use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{AnonymousEntryRequest, LoginRequest, RegisterStudentRequest},
        response::{LoginResponse, UserDto},
    },
};

#[post("/api/users/login")]
async fn login(
    state: web::Data<Arc<AppState>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let user = state.user_service.login(request).await?;
    let token = state.jwt_service.create_token(&user)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[post("/api/students/register")]
async fn register_student(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RegisterStudentRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let user = state.user_service.register_student(request).await?;
    Ok(HttpResponse::Created().json(UserDto::from(user)))
}

/// Entry through a class link: no password, just the student's code.
#[post("/api/classes/{experiment_id}/{class_id}/anonymous")]
async fn anonymous_entry(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    request: web::Json<AnonymousEntryRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let (experiment_id, class_id) = path.into_inner();
    state
        .experiment_service
        .get_class(&experiment_id, &class_id)
        .await?;

    let user = state
        .user_service
        .get_or_create_anonymous_student(&experiment_id, &class_id, &request.code)
        .await?;
    let token = state.jwt_service.create_token(&user)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: user.into(),
    }))
}
