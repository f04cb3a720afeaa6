use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{ErrorResponse, json_body, validation_failure};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::appliance::{ApplianceResponse, CreateApplianceRequest, UpdateApplianceRequest};
use crate::models::catalog::{CatalogEntry, catalog};
use crate::services::inventory_service::InventoryService;

/// Handler for the appliance catalog
///
/// Reference archetypes with nominal power and usage; no authentication needed.
#[utoipa::path(
    get,
    path = "/catalogo/electrodomesticos",
    responses(
        (status = 200, description = "Appliance catalog", body = Vec<CatalogEntry>)
    ),
    tag = "appliances"
)]
pub async fn catalog_handler() -> Json<Vec<CatalogEntry>> {
    Json(catalog())
}

/// Handler for listing a household's appliances
#[utoipa::path(
    get,
    path = "/electrodomesticos/{username}",
    params(
        ("username" = String, Path, description = "Login email or user id")
    ),
    responses(
        (status = 200, description = "Appliances with derived monthly kWh", body = Vec<ApplianceResponse>),
        (status = 403, description = "Inventory belongs to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "appliances"
)]
pub async fn list_appliances_handler(
    State(inventory_service): State<Arc<dyn InventoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<ApplianceResponse>>, Response> {
    match inventory_service
        .list_appliances(auth_user.user_id, &owner)
        .await
    {
        Ok(appliances) => Ok(Json(
            appliances.iter().map(ApplianceResponse::from).collect(),
        )),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for adding an appliance
#[utoipa::path(
    post,
    path = "/electrodomesticos/{username}",
    params(
        ("username" = String, Path, description = "Login email or user id")
    ),
    request_body = CreateApplianceRequest,
    responses(
        (status = 201, description = "Appliance created", body = ApplianceResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Inventory belongs to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "appliances"
)]
pub async fn create_appliance_handler(
    State(inventory_service): State<Arc<dyn InventoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
    payload: Result<Json<CreateApplianceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApplianceResponse>), Response> {
    let request = json_body(payload)?;
    if let Err(validation_errors) = request.validate() {
        return Err(validation_failure(&validation_errors));
    }

    match inventory_service
        .add_appliance(auth_user.user_id, &owner, request)
        .await
    {
        Ok(appliance) => Ok((StatusCode::CREATED, Json(ApplianceResponse::from(&appliance)))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating an appliance
///
/// Omitted fields keep their stored value; an empty body changes nothing.
#[utoipa::path(
    put,
    path = "/electrodomesticos/{username}/{id}",
    params(
        ("username" = String, Path, description = "Login email or user id"),
        ("id" = Uuid, Path, description = "Appliance ID")
    ),
    request_body = UpdateApplianceRequest,
    responses(
        (status = 200, description = "Appliance updated", body = ApplianceResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Inventory belongs to another user", body = ErrorResponse),
        (status = 404, description = "User or appliance not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "appliances"
)]
pub async fn update_appliance_handler(
    State(inventory_service): State<Arc<dyn InventoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((owner, appliance_id)): Path<(String, Uuid)>,
    payload: Result<Json<UpdateApplianceRequest>, JsonRejection>,
) -> Result<Json<ApplianceResponse>, Response> {
    let request = json_body(payload)?;
    if let Err(validation_errors) = request.validate() {
        return Err(validation_failure(&validation_errors));
    }

    match inventory_service
        .update_appliance(auth_user.user_id, &owner, appliance_id, request)
        .await
    {
        Ok(appliance) => Ok(Json(ApplianceResponse::from(&appliance))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting an appliance
#[utoipa::path(
    delete,
    path = "/electrodomesticos/{username}/{id}",
    params(
        ("username" = String, Path, description = "Login email or user id"),
        ("id" = Uuid, Path, description = "Appliance ID")
    ),
    responses(
        (status = 204, description = "Appliance deleted"),
        (status = 403, description = "Inventory belongs to another user", body = ErrorResponse),
        (status = 404, description = "User or appliance not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "appliances"
)]
pub async fn delete_appliance_handler(
    State(inventory_service): State<Arc<dyn InventoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((owner, appliance_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, Response> {
    match inventory_service
        .delete_appliance(auth_user.user_id, &owner, appliance_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}
