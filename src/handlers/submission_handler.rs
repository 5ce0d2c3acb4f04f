use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_class_member, require_role, AuthenticatedUser},
    errors::AppError,
    models::{
        domain::{step::static_steps, UserRole},
        dto::{
            request::{ProgressQuery, SleepEntryRequest},
            response::{EntryResponse, ProgressResponse},
        },
    },
    services::form_composer::{compose_steps, missing_required},
};

fn require_own_entry(
    auth: &AuthenticatedUser,
    experiment_id: &str,
    class_id: &str,
    student_id: &str,
) -> Result<(), AppError> {
    require_class_member(&auth.0, experiment_id, class_id)?;
    if auth.0.role == UserRole::Student && auth.0.sub != student_id {
        return Err(AppError::Unauthorized(
            "Students can only access their own entries".to_string(),
        ));
    }
    Ok(())
}

#[post("/sleep/entry")]
async fn submit_entry(
    state: web::Data<Arc<AppState>>,
    request: web::Json<SleepEntryRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    require_role(&auth.0, &[UserRole::Student])?;
    require_own_entry(
        &auth,
        &request.experiment_id,
        &request.class_id,
        &request.student_id,
    )?;

    let active = state
        .question_service
        .list_active(&request.experiment_id, &request.class_id)
        .await?;
    let steps = compose_steps(&static_steps(), &active);
    let missing = missing_required(&steps, &request.entry);
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Unanswered questions: {}",
            missing.join(", ")
        )));
    }

    let doc_id = state
        .submission_service
        .submit(
            &request.experiment_id,
            &request.class_id,
            &request.student_id,
            request.entry,
        )
        .await?;

    Ok(HttpResponse::Ok().json(EntryResponse {
        success: true,
        doc_id,
    }))
}

#[get("/sleep/progress")]
async fn progress(
    state: web::Data<Arc<AppState>>,
    query: web::Query<ProgressQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    require_own_entry(
        &auth,
        &query.experiment_id,
        &query.class_id,
        &query.student_id,
    )?;

    let count = state
        .submission_service
        .count_for_student(&query.experiment_id, &query.class_id, &query.student_id)
        .await?;
    let last_submission_at = state
        .submission_service
        .last_submission_time(&query.experiment_id, &query.class_id, &query.student_id)
        .await?;

    Ok(HttpResponse::Ok().json(ProgressResponse {
        count,
        last_submission_at,
    }))
}

#[get("/classes/{experiment_id}/{class_id}/form")]
async fn class_form(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (experiment_id, class_id) = path.into_inner();
    require_class_member(&auth.0, &experiment_id, &class_id)?;

    let active = state
        .question_service
        .list_active(&experiment_id, &class_id)
        .await?;
    let steps = compose_steps(&static_steps(), &active);

    Ok(HttpResponse::Ok().json(serde_json::json!({ "steps": steps })))
}

#[get("/classes/{experiment_id}/{class_id}/responses")]
async fn class_responses(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (experiment_id, class_id) = path.into_inner();
    require_role(&auth.0, &[UserRole::Teacher, UserRole::ResearchManager])?;
    require_class_member(&auth.0, &experiment_id, &class_id)?;

    let entries = state
        .submission_service
        .anonymized_class_entries(&experiment_id, &class_id)
        .await?;
    Ok(HttpResponse::Ok().json(entries))
}
