use std::sync::Arc;

use actix_web::{get, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_class_member, require_role, AuthenticatedUser},
    errors::AppError,
    models::{
        domain::{Category, UserRole},
        dto::request::StatsQuery,
    },
};

/// Teachers always get their own class; managers pick a class or see
/// everything.
#[get("/reports/stats")]
async fn stats(
    state: web::Data<Arc<AppState>>,
    query: web::Query<StatsQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, &[UserRole::Teacher, UserRole::ResearchManager])?;
    let query = query.into_inner();

    let scope = match auth.0.role {
        UserRole::ResearchManager => {
            match (query.experiment_id.as_deref(), query.class_id.as_deref()) {
                (Some(e), Some(c)) => Some((e, c)),
                (None, None) => None,
                _ => {
                    return Err(AppError::Validation(
                        "experimentId and classId must be given together".to_string(),
                    ))
                }
            }
        }
        _ => Some(auth.0.class_scope().ok_or_else(|| {
            AppError::MissingContext("Session has no class; sign in again".to_string())
        })?),
    };

    let stats = state.report_service.stats(scope).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/reports/categories/{category}")]
async fn category_report(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, &[UserRole::ResearchManager])?;
    let category = Category::parse(&path)?;

    let report = state.report_service.category_report(category).await?;
    if report.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    Ok(HttpResponse::Ok().json(report))
}

#[get("/reports/classes/{experiment_id}/{class_id}")]
async fn class_report(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (experiment_id, class_id) = path.into_inner();
    require_role(&auth.0, &[UserRole::Teacher, UserRole::ResearchManager])?;
    require_class_member(&auth.0, &experiment_id, &class_id)?;

    let report = state
        .report_service
        .class_report(&experiment_id, &class_id)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}
