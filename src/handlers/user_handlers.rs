use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use validator::Validate;

use super::{ErrorResponse, json_body, validation_failure};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::user::{UpdateUserRequest, User};
use crate::services::user_service::UserService;

/// Handler for reading a profile
#[utoipa::path(
    get,
    path = "/usuarios/{id}",
    params(
        ("id" = String, Path, description = "User id or login email")
    ),
    responses(
        (status = 200, description = "User profile", body = User),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn get_user_handler(
    State(user_service): State<Arc<dyn UserService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
) -> Result<Json<User>, Response> {
    match user_service.get_profile(auth_user.user_id, &owner).await {
        Ok(user) => Ok(Json(user)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for editing a profile
///
/// Only the fields present in the body change. A new password must be repeated
/// in `confirmar_password`.
#[utoipa::path(
    put,
    path = "/usuarios/{id}",
    params(
        ("id" = String, Path, description = "User id or login email")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 400, description = "Validation error or password mismatch", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn update_user_handler(
    State(user_service): State<Arc<dyn UserService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, Response> {
    let request = json_body(payload)?;
    if let Err(validation_errors) = request.validate() {
        return Err(validation_failure(&validation_errors));
    }

    match user_service
        .update_profile(auth_user.user_id, &owner, request)
        .await
    {
        Ok(user) => Ok(Json(user)),
        Err(e) => Err(e.into_response()),
    }
}
