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
use crate::models::invoice::{CreateInvoiceRequest, Invoice};
use crate::services::invoice_service::InvoiceService;

/// Handler for listing invoices, newest billing period first
#[utoipa::path(
    get,
    path = "/facturas/{username}",
    params(
        ("username" = String, Path, description = "Login email or user id")
    ),
    responses(
        (status = 200, description = "Invoices", body = Vec<Invoice>),
        (status = 403, description = "Invoices belong to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "invoices"
)]
pub async fn list_invoices_handler(
    State(invoice_service): State<Arc<dyn InvoiceService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<Invoice>>, Response> {
    match invoice_service.list_invoices(auth_user.user_id, &owner).await {
        Ok(invoices) => Ok(Json(invoices)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for registering an invoice
#[utoipa::path(
    post,
    path = "/facturas/{username}",
    params(
        ("username" = String, Path, description = "Login email or user id")
    ),
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice registered", body = Invoice),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Invoices belong to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "invoices"
)]
pub async fn create_invoice_handler(
    State(invoice_service): State<Arc<dyn InvoiceService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(owner): Path<String>,
    payload: Result<Json<CreateInvoiceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Invoice>), Response> {
    let request = json_body(payload)?;
    if let Err(validation_errors) = request.validate() {
        return Err(validation_failure(&validation_errors));
    }

    match invoice_service
        .add_invoice(auth_user.user_id, &owner, request)
        .await
    {
        Ok(invoice) => Ok((StatusCode::CREATED, Json(invoice))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting an invoice
#[utoipa::path(
    delete,
    path = "/facturas/{username}/{id}",
    params(
        ("username" = String, Path, description = "Login email or user id"),
        ("id" = Uuid, Path, description = "Invoice ID")
    ),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 403, description = "Invoices belong to another user", body = ErrorResponse),
        (status = 404, description = "User or invoice not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "invoices"
)]
pub async fn delete_invoice_handler(
    State(invoice_service): State<Arc<dyn InvoiceService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((owner, invoice_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, Response> {
    match invoice_service
        .delete_invoice(auth_user.user_id, &owner, invoice_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}
