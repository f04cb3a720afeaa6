//! Typed HTTP client for the energy tracker API.
//!
//! Transport and HTTP failures are folded into [`ClientError`] so a
//! presentation layer can show one message per category.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::handlers::ErrorResponse;
use crate::models::{
    AdviceCompletion, AdviceItem, ApplianceResponse, AuthToken, CatalogEntry,
    CompleteAdviceRequest, ConsumptionRequest, CostEstimate, CreateApplianceRequest,
    CreateInvoiceRequest, CreateUserRequest, FootprintEstimate, Invoice, LoginRequest,
    MetricsSummary, ProfileMetrics, UpdateApplianceRequest, UpdateUserRequest, User,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Server unreachable or the request timed out
    #[error("Could not reach the server: {0}")]
    ConnectionFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    /// Missing, invalid or expired token, or a foreign resource
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unexpected error: {0}")]
    Unclassified(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            ClientError::ConnectionFailure(error.to_string())
        } else {
            ClientError::Unclassified(error.to_string())
        }
    }
}

/// Map an unsuccessful status and its body to a client error
fn classify(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::ValidationFailure(message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized(message),
        other => ClientError::Unclassified(format!("{}: {}", other.as_u16(), message)),
    }
}

pub struct EnergyClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl EnergyClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Unclassified(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("energy-tracker/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Use a token obtained elsewhere for subsequent requests
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn logout(&self) {
        *self.token.write().await = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = self.authorized(request).await.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Request rejected by server");
        Err(classify(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Unclassified(format!("Failed to parse response: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_json(self.http.get(self.url(path))).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(self.http.post(self.url(path)).json(body))
            .await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(self.http.put(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(self.http.delete(self.url(path))).await.map(|_| ())
    }

    pub async fn health(&self) -> Result<(), ClientError> {
        self.send(self.http.get(self.url("/health"))).await.map(|_| ())
    }

    pub async fn register(&self, request: &CreateUserRequest) -> Result<User, ClientError> {
        self.post("/registro", request).await
    }

    /// Log in and keep the token for subsequent requests
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let token: AuthToken = self.post("/login", &request).await?;
        self.set_token(token.token.clone()).await;
        Ok(token)
    }

    pub async fn catalog(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        self.get("/catalogo/electrodomesticos").await
    }

    pub async fn estimate_cost(
        &self,
        request: &ConsumptionRequest,
    ) -> Result<CostEstimate, ClientError> {
        self.post("/calcular/costo", request).await
    }

    pub async fn estimate_footprint(
        &self,
        request: &ConsumptionRequest,
    ) -> Result<FootprintEstimate, ClientError> {
        self.post("/calcular/huella_carbono", request).await
    }

    pub async fn get_profile(&self, owner: &str) -> Result<User, ClientError> {
        self.get(&format!("/usuarios/{}", owner)).await
    }

    pub async fn update_profile(
        &self,
        owner: &str,
        request: &UpdateUserRequest,
    ) -> Result<User, ClientError> {
        self.put(&format!("/usuarios/{}", owner), request).await
    }

    pub async fn list_appliances(&self, owner: &str) -> Result<Vec<ApplianceResponse>, ClientError> {
        self.get(&format!("/electrodomesticos/{}", owner)).await
    }

    pub async fn add_appliance(
        &self,
        owner: &str,
        request: &CreateApplianceRequest,
    ) -> Result<ApplianceResponse, ClientError> {
        self.post(&format!("/electrodomesticos/{}", owner), request)
            .await
    }

    pub async fn update_appliance(
        &self,
        owner: &str,
        id: Uuid,
        request: &UpdateApplianceRequest,
    ) -> Result<ApplianceResponse, ClientError> {
        self.put(&format!("/electrodomesticos/{}/{}", owner, id), request)
            .await
    }

    pub async fn delete_appliance(&self, owner: &str, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/electrodomesticos/{}/{}", owner, id))
            .await
    }

    pub async fn list_invoices(&self, owner: &str) -> Result<Vec<Invoice>, ClientError> {
        self.get(&format!("/facturas/{}", owner)).await
    }

    pub async fn add_invoice(
        &self,
        owner: &str,
        request: &CreateInvoiceRequest,
    ) -> Result<Invoice, ClientError> {
        self.post(&format!("/facturas/{}", owner), request).await
    }

    pub async fn delete_invoice(&self, owner: &str, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/facturas/{}/{}", owner, id)).await
    }

    pub async fn summary(&self, owner: &str) -> Result<MetricsSummary, ClientError> {
        self.get(&format!("/metricas/resumen/{}", owner)).await
    }

    pub async fn profile_metrics(&self, owner: &str) -> Result<ProfileMetrics, ClientError> {
        self.get(&format!("/metricas/perfil/{}", owner)).await
    }

    pub async fn advice(&self, owner: &str) -> Result<Vec<AdviceItem>, ClientError> {
        self.get(&format!("/consejos/{}", owner)).await
    }

    pub async fn complete_advice(
        &self,
        owner: &str,
        advice_id: &str,
    ) -> Result<AdviceCompletion, ClientError> {
        let request = CompleteAdviceRequest {
            advice_id: advice_id.to_string(),
        };
        self.post(&format!("/consejos/{}/marcar_cumplido", owner), &request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_uses_server_message() {
        let body = r#"{"error":"entry_not_found","message":"Entry not found"}"#;
        match classify(StatusCode::NOT_FOUND, body) {
            ClientError::NotFound(message) => assert_eq!(message, "Entry not found"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_classify_status_families() {
        assert!(matches!(
            classify(StatusCode::UNPROCESSABLE_ENTITY, "bad"),
            ClientError::ValidationFailure(_)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, "bad"),
            ClientError::ValidationFailure(_)
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, ""),
            ClientError::Unauthorized(_)
        ));
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, ""),
            ClientError::Unauthorized(_)
        ));
        assert!(matches!(
            classify(StatusCode::CONFLICT, "dup"),
            ClientError::Unclassified(_)
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ClientError::Unclassified(_)
        ));
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        assert!(EnergyClient::new("localhost:8080").is_err());
        assert!(EnergyClient::new("http://localhost:8080/").is_ok());
    }
}
