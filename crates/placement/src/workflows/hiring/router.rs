use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, JobId, RoundStatus, StudentId};
use super::repository::{ApplicationStore, CampusDirectory, NotificationSink, StoreError};
use super::service::{PlacementService, PlacementServiceError};
use super::transitions::TransitionError;

/// Router builder exposing the placement endpoints over a shared service.
pub fn placement_router<S, D, N>(service: Arc<PlacementService<S, D, N>>) -> Router
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/placement/jobs/:job_id/applications",
            post(apply_handler::<S, D, N>).get(list_handler::<S, D, N>),
        )
        .route(
            "/api/v1/placement/jobs/:job_id/eligibility",
            post(eligibility_handler::<S, D, N>),
        )
        .route(
            "/api/v1/placement/jobs/:job_id/rounds/shortlist",
            post(shortlist_handler::<S, D, N>),
        )
        .route(
            "/api/v1/placement/jobs/:job_id/rounds/reject",
            post(reject_handler::<S, D, N>),
        )
        .route(
            "/api/v1/placement/jobs/:job_id/rounds/complete",
            post(complete_round_handler::<S, D, N>),
        )
        .route(
            "/api/v1/placement/applications/:application_id",
            get(status_handler::<S, D, N>),
        )
        .route(
            "/api/v1/placement/applications/:application_id/withdraw",
            post(withdraw_handler::<S, D, N>),
        )
        .route(
            "/api/v1/placement/applications/:application_id/status",
            post(update_status_handler::<S, D, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct ApplyRequest {
    student_id: StudentId,
    #[serde(default)]
    screening_answers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct EligibilityRequest {
    student_id: StudentId,
}

#[derive(Debug, Deserialize)]
struct ShortlistRequest {
    round: String,
    selected: BTreeSet<ApplicationId>,
    pool: BTreeSet<ApplicationId>,
}

#[derive(Debug, Deserialize)]
struct RejectRequest {
    round: String,
    application_ids: BTreeSet<ApplicationId>,
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    round: String,
    status: RoundStatus,
    #[serde(default = "default_actor")]
    actor: String,
}

fn default_actor() -> String {
    "admin".to_string()
}

async fn apply_handler<S, D, N>(
    State(service): State<Arc<PlacementService<S, D, N>>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.apply(
        &request.student_id,
        &JobId(job_id),
        request.screening_answers,
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn eligibility_handler<S, D, N>(
    State(service): State<Arc<PlacementService<S, D, N>>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<EligibilityRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.eligibility(&request.student_id, &JobId(job_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn list_handler<S, D, N>(
    State(service): State<Arc<PlacementService<S, D, N>>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.applications_for_job(&JobId(job_id)) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn status_handler<S, D, N>(
    State(service): State<Arc<PlacementService<S, D, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.application_status(&ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn shortlist_handler<S, D, N>(
    State(service): State<Arc<PlacementService<S, D, N>>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<ShortlistRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.shortlist(
        &JobId(job_id),
        &request.round,
        &request.selected,
        &request.pool,
        Utc::now(),
    ) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn reject_handler<S, D, N>(
    State(service): State<Arc<PlacementService<S, D, N>>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.reject(
        &JobId(job_id),
        &request.round,
        &request.application_ids,
        Utc::now(),
    ) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn complete_round_handler<S, D, N>(
    State(service): State<Arc<PlacementService<S, D, N>>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.complete_round(&JobId(job_id)) {
        Ok(job) => (StatusCode::OK, axum::Json(job)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn withdraw_handler<S, D, N>(
    State(service): State<Arc<PlacementService<S, D, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.withdraw(&ApplicationId(application_id), Utc::now()) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn update_status_handler<S, D, N>(
    State(service): State<Arc<PlacementService<S, D, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<UpdateStatusRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.update_status(
        &ApplicationId(application_id),
        &request.round,
        request.status,
        &request.actor,
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PlacementServiceError) -> Response {
    let status = match &error {
        PlacementServiceError::JobNotFound
        | PlacementServiceError::ApplicationNotFound
        | PlacementServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        PlacementServiceError::DuplicateApplication
        | PlacementServiceError::Withdrawn
        | PlacementServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        PlacementServiceError::DeadlineClosed
        | PlacementServiceError::Ineligible(_)
        | PlacementServiceError::NoRoundsConfigured
        | PlacementServiceError::Transition(
            TransitionError::RoundNotFound(_)
            | TransitionError::RoundNotOpen { .. }
            | TransitionError::NotEligibleForRound { .. }
            | TransitionError::UnknownApplication(_),
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        PlacementServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = match &error {
        PlacementServiceError::Ineligible(report) => json!({
            "error": error.to_string(),
            "reasons": report.reason_lines(),
            "skill_match_pct": report.skill_match_pct,
        }),
        _ => json!({ "error": error.to_string() }),
    };

    (status, axum::Json(payload)).into_response()
}
