use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_class_member, require_role, AuthenticatedUser},
    errors::AppError,
    models::{
        domain::UserRole,
        dto::request::{ApproveQuestionsRequest, QuestionProposal},
    },
};

/// Teachers propose questions for their own class.
#[post("/questions/requests")]
async fn submit_request(
    state: web::Data<Arc<AppState>>,
    request: web::Json<QuestionProposal>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, &[UserRole::Teacher])?;
    let (experiment_id, class_id) = auth.0.class_scope().ok_or_else(|| {
        AppError::MissingContext("Session has no class; sign in again".to_string())
    })?;
    let proposal = request.into_inner();
    proposal.validate()?;

    let request_id = state
        .question_service
        .submit_request(experiment_id, class_id, proposal)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "id": request_id })))
}

#[get("/questions/pending")]
async fn list_pending(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, &[UserRole::ResearchManager])?;

    let pending = state.question_service.list_pending_requests().await?;
    Ok(HttpResponse::Ok().json(pending))
}

#[post("/questions/approve")]
async fn approve(
    state: web::Data<Arc<AppState>>,
    request: web::Json<ApproveQuestionsRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, &[UserRole::ResearchManager])?;

    let outcome = state
        .question_service
        .approve(request.into_inner().items)
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[get("/classes/{experiment_id}/{class_id}/questions")]
async fn class_questions(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (experiment_id, class_id) = path.into_inner();
    require_class_member(&auth.0, &experiment_id, &class_id)?;

    let questions = state
        .question_service
        .list_active(&experiment_id, &class_id)
        .await?;
    Ok(HttpResponse::Ok().json(questions))
}
