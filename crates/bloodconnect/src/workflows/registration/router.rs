use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::checklist::VerificationChecklist;
use super::domain::{RegistrationId, RegistrationSubmission, RejectionReason, Reviewer};
use super::repository::{Collection, NotificationSink, RegistrationRepository};
use super::service::{
    MoreInfoRequest, RegistrationApprovalService, RegistrationServiceError, ValidationError,
    DEFAULT_INFO_DEADLINE_DAYS,
};
use crate::workflows::eligibility::{self, EligibilityAnswers};

/// Router builder exposing the eligibility check and the registration review endpoints.
pub fn registration_router<R, N>(service: Arc<RegistrationApprovalService<R, N>>) -> Router
where
    R: RegistrationRepository + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route("/api/v1/eligibility", post(eligibility_handler))
        .route(
            "/api/v1/hospitals/registrations",
            get(list_handler::<R, N>).post(register_handler::<R, N>),
        )
        .route(
            "/api/v1/hospitals/registrations/summary",
            get(summary_handler::<R, N>),
        )
        .route(
            "/api/v1/hospitals/registrations/:registration_id",
            get(show_handler::<R, N>),
        )
        .route(
            "/api/v1/hospitals/registrations/:registration_id/approve",
            post(approve_handler::<R, N>),
        )
        .route(
            "/api/v1/hospitals/registrations/:registration_id/reject",
            post(reject_handler::<R, N>),
        )
        .route(
            "/api/v1/hospitals/registrations/:registration_id/request-info",
            post(request_info_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) status: Option<Collection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApproveRequest {
    pub(crate) checklist: VerificationChecklist,
    pub(crate) approved_by: String,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RejectRequest {
    #[serde(default)]
    pub(crate) reason: Option<String>,
    #[serde(default)]
    pub(crate) comments: String,
    #[serde(default)]
    pub(crate) allow_resubmission: bool,
    pub(crate) rejected_by: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestInfoRequest {
    #[serde(default)]
    pub(crate) items: BTreeSet<String>,
    #[serde(default)]
    pub(crate) requirements: String,
    #[serde(default = "default_deadline_days")]
    pub(crate) deadline_days: u32,
    pub(crate) requested_by: String,
}

fn default_deadline_days() -> u32 {
    DEFAULT_INFO_DEADLINE_DAYS
}

/// Blank selections count as "no reason chosen"; anything else must be a known code.
pub(crate) fn parse_reason(
    raw: Option<&str>,
) -> Result<Option<RejectionReason>, RegistrationServiceError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<RejectionReason>()
            .map(Some)
            .map_err(|err| ValidationError::from(err).into()),
        None => Ok(None),
    }
}

pub(crate) fn error_response(error: RegistrationServiceError) -> Response {
    let status = match &error {
        RegistrationServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistrationServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistrationServiceError::DuplicateLicense(_)
        | RegistrationServiceError::DuplicateRecord { .. } => StatusCode::CONFLICT,
        RegistrationServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn eligibility_handler(
    axum::Json(answers): axum::Json<EligibilityAnswers>,
) -> Response {
    let result = eligibility::evaluate(&answers);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<RegistrationApprovalService<R, N>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: NotificationSink + 'static,
{
    let collection = query.status.unwrap_or(Collection::Pending);
    match service.list(collection) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<R, N>(
    State(service): State<Arc<RegistrationApprovalService<R, N>>>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.summary() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<R, N>(
    State(service): State<Arc<RegistrationApprovalService<R, N>>>,
    axum::Json(submission): axum::Json<RegistrationSubmission>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.register(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn show_handler<R, N>(
    State(service): State<Arc<RegistrationApprovalService<R, N>>>,
    Path(registration_id): Path<String>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.get(&RegistrationId(registration_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<R, N>(
    State(service): State<Arc<RegistrationApprovalService<R, N>>>,
    Path(registration_id): Path<String>,
    axum::Json(request): axum::Json<ApproveRequest>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: NotificationSink + 'static,
{
    let reviewer = Reviewer(request.approved_by);
    match service.approve(
        &RegistrationId(registration_id),
        request.checklist,
        &reviewer,
        request.notes,
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<R, N>(
    State(service): State<Arc<RegistrationApprovalService<R, N>>>,
    Path(registration_id): Path<String>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: NotificationSink + 'static,
{
    let reason = match parse_reason(request.reason.as_deref()) {
        Ok(reason) => reason,
        Err(error) => return error_response(error),
    };
    let reviewer = Reviewer(request.rejected_by);
    match service.reject(
        &RegistrationId(registration_id),
        reason,
        request.comments,
        request.allow_resubmission,
        &reviewer,
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn request_info_handler<R, N>(
    State(service): State<Arc<RegistrationApprovalService<R, N>>>,
    Path(registration_id): Path<String>,
    axum::Json(request): axum::Json<RequestInfoRequest>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: NotificationSink + 'static,
{
    let reviewer = Reviewer(request.requested_by);
    let info = MoreInfoRequest {
        items: request.items,
        requirements: request.requirements,
        deadline_days: request.deadline_days,
    };
    match service.request_more_info(&RegistrationId(registration_id), info, &reviewer) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}
