use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    EngineError, ErrorKind, OrganizationId, PaymentId, PaymentStatus, Principal, PropertyId,
    SettlementDetails, TenancyId,
};
use super::engine::LettingsEngine;
use super::payments::ProcessPaymentRequest;
use super::store::LettingsStore;
use super::structure::BuildPropertyRequest;
use super::tenancy::CreateTenancyRequest;

/// Router builder exposing the lettings engine boundary over HTTP.
pub fn lettings_router<S>(engine: Arc<LettingsEngine<S>>) -> Router
where
    S: LettingsStore + 'static,
{
    Router::new()
        .route("/api/v1/properties", post(build_property_handler::<S>))
        .route("/api/v1/tenancies", post(create_tenancy_handler::<S>))
        .route(
            "/api/v1/tenancies/:tenancy_id/end",
            post(end_tenancy_handler::<S>),
        )
        .route(
            "/api/v1/payments/process",
            post(process_payment_handler::<S>),
        )
        .route(
            "/api/v1/payments/:payment_id/status",
            put(update_payment_status_handler::<S>),
        )
        .route(
            "/api/v1/dashboard/properties/:property_id/stats",
            get(property_stats_handler::<S>),
        )
        .with_state(engine)
}

/// The caller's identity travels on explicit headers; there is no ambient
/// session state to fall back on.
fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, Response> {
    let subject = headers
        .get("x-actor")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| unauthorized("missing or invalid x-actor header"))?;

    let organization = headers
        .get("x-organization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or_else(|| unauthorized("missing or invalid x-organization header"))?;

    Ok(Principal {
        subject: subject.to_string(),
        organization_id: OrganizationId(organization),
    })
}

fn unauthorized(detail: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(json!({ "error": detail })),
    )
        .into_response()
}

fn engine_error_response(error: EngineError) -> Response {
    let status = match error.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}

pub(crate) async fn build_property_handler<S>(
    State(engine): State<Arc<LettingsEngine<S>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<BuildPropertyRequest>,
) -> Response
where
    S: LettingsStore + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match engine.structure.build(&principal, &request) {
        Ok(built) => (StatusCode::CREATED, axum::Json(built)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn create_tenancy_handler<S>(
    State(engine): State<Arc<LettingsEngine<S>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateTenancyRequest>,
) -> Response
where
    S: LettingsStore + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match engine.tenancy.create_complete_tenancy(&principal, &request) {
        Ok(tenant_id) => (
            StatusCode::CREATED,
            axum::Json(json!({ "tenant_id": tenant_id })),
        )
            .into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn end_tenancy_handler<S>(
    State(engine): State<Arc<LettingsEngine<S>>>,
    headers: HeaderMap,
    Path(tenancy_id): Path<u64>,
) -> Response
where
    S: LettingsStore + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match engine.tenancy.end_tenancy(&principal, TenancyId(tenancy_id)) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "tenancy_id": tenancy_id, "status": "ended" })),
        )
            .into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn process_payment_handler<S>(
    State(engine): State<Arc<LettingsEngine<S>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ProcessPaymentRequest>,
) -> Response
where
    S: LettingsStore + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match engine.payments.process_payment(&principal, &request) {
        Ok(payment_ids) => (
            StatusCode::OK,
            axum::Json(json!({ "payment_ids": payment_ids })),
        )
            .into_response(),
        Err(error) => engine_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdatePaymentStatusRequest {
    pub(crate) status: PaymentStatus,
    #[serde(default)]
    pub(crate) payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) payment_method: Option<String>,
    #[serde(default)]
    pub(crate) reference_number: Option<String>,
}

impl UpdatePaymentStatusRequest {
    fn settlement(&self) -> Option<SettlementDetails> {
        match (
            self.payment_date,
            self.payment_method.as_ref(),
            self.reference_number.as_ref(),
        ) {
            (Some(payment_date), Some(payment_method), Some(reference_number)) => {
                Some(SettlementDetails {
                    payment_date,
                    payment_method: payment_method.clone(),
                    reference_number: reference_number.clone(),
                })
            }
            _ => None,
        }
    }
}

pub(crate) async fn update_payment_status_handler<S>(
    State(engine): State<Arc<LettingsEngine<S>>>,
    headers: HeaderMap,
    Path(payment_id): Path<u64>,
    axum::Json(request): axum::Json<UpdatePaymentStatusRequest>,
) -> Response
where
    S: LettingsStore + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    let settlement = request.settlement();
    match engine.payments.update_payment_status(
        &principal,
        PaymentId(payment_id),
        request.status,
        settlement.as_ref(),
    ) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn property_stats_handler<S>(
    State(engine): State<Arc<LettingsEngine<S>>>,
    headers: HeaderMap,
    Path(property_id): Path<u64>,
) -> Response
where
    S: LettingsStore + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match engine
        .dashboard
        .property_stats(&principal, PropertyId(property_id))
    {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(error) => engine_error_response(error),
    }
}
