pub mod auth_handler;
pub mod experiment_handler;
pub mod health_handler;
pub mod question_handler;
pub mod report_handler;
pub mod submission_handler;

use actix_web::web;

use crate::auth::AuthMiddleware;

/// Registers every route. Public endpoints come first so they match before
/// the authenticated `/api` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_handler::health_check)
        .service(health_handler::health_check_ready)
        .service(auth_handler::login)
        .service(auth_handler::register_student)
        .service(auth_handler::anonymous_entry)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(submission_handler::submit_entry)
                .service(submission_handler::progress)
                .service(submission_handler::class_form)
                .service(submission_handler::class_responses)
                .service(question_handler::submit_request)
                .service(question_handler::list_pending)
                .service(question_handler::approve)
                .service(question_handler::class_questions)
                .service(report_handler::stats)
                .service(report_handler::category_report)
                .service(report_handler::class_report)
                .service(experiment_handler::list_experiments)
                .service(experiment_handler::create_class)
                .service(experiment_handler::list_classes)
                .service(experiment_handler::create_teacher)
                .service(experiment_handler::create_student)
                .service(experiment_handler::delete_student),
        );
}
