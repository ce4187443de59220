use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicantId, ApplicationId};
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{PassApplicationService, PassServiceError, PassSubmission};
use crate::workflows::pass::notifications::{NotificationStore, Recipient};

/// Router builder exposing the pass workflow over HTTP: submission and
/// status for applicants, queue/decision/stats endpoints for admins, and the
/// notification inboxes.
pub fn pass_router<R, S>(service: Arc<PassApplicationService<R, S>>) -> Router
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    Router::new()
        .route("/api/v1/pass/applications", post(submit_handler::<R, S>))
        .route(
            "/api/v1/pass/applications/pending",
            get(pending_handler::<R, S>),
        )
        .route(
            "/api/v1/pass/applications/decided",
            get(decided_handler::<R, S>),
        )
        .route(
            "/api/v1/pass/applications/:application_id",
            get(status_handler::<R, S>),
        )
        .route(
            "/api/v1/pass/applications/:application_id/approve",
            post(approve_handler::<R, S>),
        )
        .route(
            "/api/v1/pass/applications/:application_id/reject",
            post(reject_handler::<R, S>),
        )
        .route("/api/v1/pass/stats", get(stats_handler::<R, S>))
        .route(
            "/api/v1/pass/applicants/:applicant_id/latest",
            get(latest_handler::<R, S>),
        )
        .route(
            "/api/v1/pass/notifications/user/:applicant_id",
            get(user_notifications_handler::<R, S>),
        )
        .route(
            "/api/v1/pass/notifications/user/:applicant_id/read",
            post(mark_read_handler::<R, S>),
        )
        .route(
            "/api/v1/pass/notifications/admin",
            get(admin_notifications_handler::<R, S>),
        )
        .with_state(service)
}

fn error_response(error: PassServiceError) -> Response {
    let status = match &error {
        PassServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PassServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PassServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PassServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        PassServiceError::Repository(RepositoryError::Unavailable(_))
        | PassServiceError::Notification(_)
        | PassServiceError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
    axum::Json(submission): axum::Json<PassSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    match service.submit(submission) {
        Ok(application) => {
            (StatusCode::ACCEPTED, axum::Json(application.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pending_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    match service.pending() {
        Ok(applications) => {
            let views: Vec<_> = applications
                .iter()
                .map(|application| application.status_view())
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decided_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    match service.decided() {
        Ok(applications) => {
            let views: Vec<_> = applications
                .iter()
                .map(|application| application.status_view())
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    match service.approve(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RejectRequest {
    #[serde(default)]
    reason: Option<String>,
}

pub(crate) async fn reject_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
    Path(application_id): Path<String>,
    body: Option<axum::Json<RejectRequest>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    let reason = body.and_then(|axum::Json(request)| request.reason);
    match service.reject(&ApplicationId(application_id), reason) {
        Ok(application) => (StatusCode::OK, axum::Json(application.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stats_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    match service.stats() {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn latest_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    match service.latest_for_applicant(&ApplicantId(applicant_id.clone())) {
        Ok(Some(application)) => {
            (StatusCode::OK, axum::Json(application.status_view())).into_response()
        }
        Ok(None) => {
            let payload = json!({
                "applicant_id": applicant_id,
                "status": "not_applied",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn user_notifications_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    let recipient = Recipient::User(ApplicantId(applicant_id));
    match service.notifications().fetch_and_mark_read(&recipient) {
        Ok(notifications) => (StatusCode::OK, axum::Json(notifications)).into_response(),
        Err(error) => error_response(PassServiceError::Notification(error)),
    }
}

pub(crate) async fn mark_read_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    let recipient = Recipient::User(ApplicantId(applicant_id));
    match service.notifications().mark_all_read(&recipient) {
        Ok(marked) => (
            StatusCode::OK,
            axum::Json(json!({ "success": true, "marked": marked })),
        )
            .into_response(),
        Err(error) => error_response(PassServiceError::Notification(error)),
    }
}

pub(crate) async fn admin_notifications_handler<R, S>(
    State(service): State<Arc<PassApplicationService<R, S>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    match service.notifications().list_unread(&Recipient::AdminBroadcast) {
        Ok(notifications) => (StatusCode::OK, axum::Json(notifications)).into_response(),
        Err(error) => error_response(PassServiceError::Notification(error)),
    }
}
