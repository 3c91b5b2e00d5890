use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{BuildingSubmission, ContractSubmission, EvidenceSubmission, TenantId};
use super::repository::{DepositRepository, RepositoryError, ValuationProvider};
use super::service::{DepositReportService, DepositServiceError};

/// Header carrying the authenticated identity forwarded by the gateway.
pub const TENANT_IDENTITY_HEADER: &str = "x-tenant-identity";

/// Router builder exposing building intake, report lifecycle, and cap lookups.
pub fn deposit_router<R, V>(service: Arc<DepositReportService<R, V>>) -> Router
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/deposit/buildings",
            post(submit_building_handler::<R, V>),
        )
        .route("/api/v1/deposit/reports", post(submit_report_handler::<R, V>))
        .route(
            "/api/v1/deposit/reports/me",
            get(report_handler::<R, V>).delete(delete_report_handler::<R, V>),
        )
        .route(
            "/api/v1/deposit/reports/me/reevaluate",
            post(reevaluate_handler::<R, V>),
        )
        .route(
            "/api/v1/deposit/evidence",
            post(register_evidence_handler::<R, V>),
        )
        .route("/api/v1/deposit/caps", get(cap_handler::<R, V>))
        .with_state(service)
}

fn tenant_from_headers<R, V>(
    service: &DepositReportService<R, V>,
    headers: &HeaderMap,
) -> Result<TenantId, DepositServiceError>
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    let identity = headers
        .get(TENANT_IDENTITY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    service.resolve_tenant(identity)
}

pub(crate) fn error_response(error: DepositServiceError) -> Response {
    let status = match &error {
        DepositServiceError::Intake(_) | DepositServiceError::CapLookup(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DepositServiceError::BuildingNotFound { .. }
        | DepositServiceError::NoContract
        | DepositServiceError::NothingToDelete
        | DepositServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DepositServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
        DepositServiceError::Valuation(_) => StatusCode::BAD_GATEWAY,
        DepositServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        DepositServiceError::Repository(
            RepositoryError::Unavailable(_) | RepositoryError::TransactionAborted(_),
        ) => StatusCode::SERVICE_UNAVAILABLE,
    };

    let payload = json!({
        "error": error.to_string(),
        "retryable": error.is_retryable(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_building_handler<R, V>(
    State(service): State<Arc<DepositReportService<R, V>>>,
    axum::Json(submission): axum::Json<BuildingSubmission>,
) -> Response
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    match service.submit_building(submission) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_report_handler<R, V>(
    State(service): State<Arc<DepositReportService<R, V>>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<ContractSubmission>,
) -> Response
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    let result = tenant_from_headers(&service, &headers)
        .and_then(|tenant| service.submit_report(&tenant, submission));
    match result {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R, V>(
    State(service): State<Arc<DepositReportService<R, V>>>,
    headers: HeaderMap,
) -> Response
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    let tenant = match tenant_from_headers(&service, &headers) {
        Ok(tenant) => tenant,
        Err(error) => return error_response(error),
    };

    match service.get_report(&tenant) {
        Ok(Some(view)) => (StatusCode::OK, axum::Json(view)).into_response(),
        Ok(None) => {
            let payload = json!({
                "tenant_id": tenant.0,
                "status": "not_submitted",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_report_handler<R, V>(
    State(service): State<Arc<DepositReportService<R, V>>>,
    headers: HeaderMap,
) -> Response
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    let result = tenant_from_headers(&service, &headers)
        .and_then(|tenant| service.delete_report(&tenant));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reevaluate_handler<R, V>(
    State(service): State<Arc<DepositReportService<R, V>>>,
    headers: HeaderMap,
) -> Response
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    let result =
        tenant_from_headers(&service, &headers).and_then(|tenant| service.reevaluate(&tenant));
    match result {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_evidence_handler<R, V>(
    State(service): State<Arc<DepositReportService<R, V>>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<EvidenceSubmission>,
) -> Response
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    let result = tenant_from_headers(&service, &headers)
        .and_then(|tenant| service.register_evidence(&tenant, submission));
    match result {
        Ok(evidence) => (StatusCode::CREATED, axum::Json(evidence)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CapQuery {
    pub(crate) address: String,
    pub(crate) date: NaiveDate,
}

pub(crate) async fn cap_handler<R, V>(
    State(service): State<Arc<DepositReportService<R, V>>>,
    Query(query): Query<CapQuery>,
) -> Response
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    match service.resolve_cap(&query.address, query.date) {
        Ok(caps) => (StatusCode::OK, axum::Json(caps)).into_response(),
        Err(error) => error_response(error),
    }
}
