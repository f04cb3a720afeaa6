use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ErrorResponse, json_body};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::metrics::{
    ConsumptionRequest, CostEstimate, FootprintEstimate, MetricsSummary, ProfileMetrics,
};
use crate::services::metrics_service::MetricsService;

/// Handler for the cost calculator
#[utoipa::path(
    post,
    path = "/calcular/costo",
    request_body = ConsumptionRequest,
    responses(
        (status = 200, description = "Estimated cost", body = CostEstimate),
        (status = 400, description = "Negative or non-numeric kWh", body = ErrorResponse)
    ),
    tag = "calculator"
)]
pub async fn estimate_cost_handler(
    State(metrics_service): State<Arc<dyn MetricsService>>,
    payload: Result<Json<ConsumptionRequest>, JsonRejection>,
) -> Result<Json<CostEstimate>, Response> {
    let request = json_body(payload)?;
    metrics_service
        .estimate_cost(&request)
        .map(Json)
        .map_err(IntoResponse::into_response)
}

/// Handler for the carbon footprint calculator
#[utoipa::path(
    post,
    path = "/calcular/huella_carbono",
    request_body = ConsumptionRequest,
    responses(
        (status = 200, description = "Footprint and tree equivalent", body = FootprintEstimate),
        (status = 400, description = "Negative or non-numeric kWh", body = ErrorResponse)
    ),
    tag = "calculator"
)]
pub async fn estimate_footprint_handler(
    State(metrics_service): State<Arc<dyn MetricsService>>,
    payload: Result<Json<ConsumptionRequest>, JsonRejection>,
) -> Result<Json<FootprintEstimate>, Response> {
    let request = json_body(payload)?;
    metrics_service
        .estimate_footprint(&request)
        .map(Json)
        .map_err(IntoResponse::into_response)
}

/// Handler for the dashboard summary
///
/// Invoice totals are null until the first invoice is registered.
#[utoipa::path(
    get,
    path = "/metricas/resumen/{id}",
    params(
        ("id" = String, Path, description = "User id or login email")
    ),
    responses(
        (status = 200, description = "Metrics summary", body = MetricsSummary),
        (status = 403, description = "Metrics belong to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "metrics"
)]
pub async fn summary_handler(
    State(metrics_service): State<Arc<dyn MetricsService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
) -> Result<Json<MetricsSummary>, Response> {
    match metrics_service.summary(auth_user.user_id, &owner).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for profile metrics
#[utoipa::path(
    get,
    path = "/metricas/perfil/{id}",
    params(
        ("id" = String, Path, description = "User id or login email")
    ),
    responses(
        (status = 200, description = "Profile metrics", body = ProfileMetrics),
        (status = 403, description = "Metrics belong to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "metrics"
)]
pub async fn profile_handler(
    State(metrics_service): State<Arc<dyn MetricsService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
) -> Result<Json<ProfileMetrics>, Response> {
    match metrics_service.profile(auth_user.user_id, &owner).await {
        Ok(profile) => Ok(Json(profile)),
        Err(e) => Err(e.into_response()),
    }
}
