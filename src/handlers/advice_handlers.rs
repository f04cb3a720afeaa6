use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ErrorResponse, json_body};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::advice::{AdviceCompletion, AdviceItem, CompleteAdviceRequest};
use crate::services::advice_service::AdviceService;

/// Handler for listing a household's advice
#[utoipa::path(
    get,
    path = "/consejos/{id}",
    params(
        ("id" = String, Path, description = "User id or login email")
    ),
    responses(
        (status = 200, description = "Advice items with completion state", body = Vec<AdviceItem>),
        (status = 403, description = "Advice belongs to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "advice"
)]
pub async fn list_advice_handler(
    State(advice_service): State<Arc<dyn AdviceService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<AdviceItem>>, Response> {
    match advice_service.list_advice(auth_user.user_id, &owner).await {
        Ok(advice) => Ok(Json(advice)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for completing an advice item
///
/// The first completion grants sustainability points; repeats grant nothing.
#[utoipa::path(
    post,
    path = "/consejos/{id}/marcar_cumplido",
    params(
        ("id" = String, Path, description = "User id or login email")
    ),
    request_body = CompleteAdviceRequest,
    responses(
        (status = 200, description = "Completion recorded", body = AdviceCompletion),
        (status = 403, description = "Advice belongs to another user", body = ErrorResponse),
        (status = 404, description = "User or advice not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "advice"
)]
pub async fn complete_advice_handler(
    State(advice_service): State<Arc<dyn AdviceService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
    payload: Result<Json<CompleteAdviceRequest>, JsonRejection>,
) -> Result<Json<AdviceCompletion>, Response> {
    let request = json_body(payload)?;

    match advice_service
        .mark_completed(auth_user.user_id, &owner, &request.advice_id)
        .await
    {
        Ok(completion) => Ok(Json(completion)),
        Err(e) => Err(e.into_response()),
    }
}
