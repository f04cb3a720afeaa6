//! Router assembly and shared application state.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{get, post, put},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, ConfigError};
use crate::handlers::{
    ErrorResponse, advice_handlers, appliance_handlers, auth_handlers, invoice_handlers,
    metrics_handlers, user_handlers,
};
use crate::middleware::auth_middleware;
use crate::models::*;
use crate::repositories::{
    AdviceRepository, ApplianceRepository, InMemoryStore, InvoiceRepository,
    PostgresAdviceRepository, PostgresApplianceRepository, PostgresInvoiceRepository,
    PostgresUserRepository, UserRepository,
};
use crate::services::advice_service::{
    AdviceGenerator, AdviceService, AdviceServiceImpl, RuleBasedAdvisor,
};
use crate::services::auth_service::{AuthService, AuthServiceImpl};
use crate::services::calculator::Tariff;
use crate::services::inventory_service::{InventoryService, InventoryServiceImpl};
use crate::services::invoice_service::{InvoiceService, InvoiceServiceImpl};
use crate::services::metrics_service::{MetricsService, MetricsServiceImpl};
use crate::services::user_service::{UserService, UserServiceImpl};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handlers::register_handler,
        auth_handlers::login_handler,
        user_handlers::get_user_handler,
        user_handlers::update_user_handler,
        appliance_handlers::catalog_handler,
        appliance_handlers::list_appliances_handler,
        appliance_handlers::create_appliance_handler,
        appliance_handlers::update_appliance_handler,
        appliance_handlers::delete_appliance_handler,
        invoice_handlers::list_invoices_handler,
        invoice_handlers::create_invoice_handler,
        invoice_handlers::delete_invoice_handler,
        metrics_handlers::estimate_cost_handler,
        metrics_handlers::estimate_footprint_handler,
        metrics_handlers::summary_handler,
        metrics_handlers::profile_handler,
        advice_handlers::list_advice_handler,
        advice_handlers::complete_advice_handler,
    ),
    components(
        schemas(
            User, CreateUserRequest, UpdateUserRequest, SubsidyTier, LoginRequest, AuthToken,
            ApplianceResponse, CreateApplianceRequest, UpdateApplianceRequest,
            EfficiencyLabel, CatalogEntry, Invoice, CreateInvoiceRequest, Month,
            MetricsSummary, ProfileMetrics, ActivitySummary, ApplianceBreakdown, DataStatus,
            ConsumptionRequest, CostEstimate, FootprintEstimate,
            AdviceItem, CompleteAdviceRequest, AdviceCompletion, ErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Household profiles"),
        (name = "appliances", description = "Appliance inventory and catalog"),
        (name = "invoices", description = "Utility invoices"),
        (name = "metrics", description = "Consumption, cost and footprint rollups"),
        (name = "calculator", description = "Stateless cost and footprint estimates"),
        (name = "advice", description = "Sustainability advice and points")
    ),
    info(
        title = "Energy Tracker API",
        version = "0.1.0",
        description = "REST API for tracking household energy consumption, cost and carbon footprint",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Storage handles injected into the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub appliances: Arc<dyn ApplianceRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub advice: Arc<dyn AdviceRepository>,
}

impl Repositories {
    /// All four repositories backed by one process-local store
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            appliances: store.clone(),
            invoices: store.clone(),
            advice: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            appliances: Arc::new(PostgresApplianceRepository::new(pool.clone())),
            invoices: Arc::new(PostgresInvoiceRepository::new(pool.clone())),
            advice: Arc::new(PostgresAdviceRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub inventory_service: Arc<dyn InventoryService>,
    pub invoice_service: Arc<dyn InvoiceService>,
    pub metrics_service: Arc<dyn MetricsService>,
    pub advice_service: Arc<dyn AdviceService>,
}

impl AppState {
    pub fn new(config: &AppConfig, repositories: Repositories) -> Result<Self, ConfigError> {
        let tariff = Tariff::from_settings(&config.tariff)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let token_ttl = config.auth.token_ttl()?;
        let generator: Arc<dyn AdviceGenerator> = Arc::new(RuleBasedAdvisor);
        let Repositories {
            users,
            appliances,
            invoices,
            advice,
        } = repositories;

        Ok(Self {
            auth_service: Arc::new(AuthServiceImpl::new(
                users.clone(),
                config.auth.jwt_secret.clone(),
                token_ttl,
            )),
            user_service: Arc::new(UserServiceImpl::new(users.clone())),
            inventory_service: Arc::new(InventoryServiceImpl::new(
                users.clone(),
                appliances.clone(),
            )),
            invoice_service: Arc::new(InvoiceServiceImpl::new(users.clone(), invoices.clone())),
            metrics_service: Arc::new(MetricsServiceImpl::new(
                users.clone(),
                appliances.clone(),
                invoices.clone(),
                advice.clone(),
                generator.clone(),
                tariff,
            )),
            advice_service: Arc::new(AdviceServiceImpl::new(
                users, appliances, invoices, advice, generator,
            )),
        })
    }
}

impl FromRef<AppState> for Arc<dyn AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn UserService> {
    fn from_ref(state: &AppState) -> Self {
        state.user_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn InventoryService> {
    fn from_ref(state: &AppState) -> Self {
        state.inventory_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn InvoiceService> {
    fn from_ref(state: &AppState) -> Self {
        state.invoice_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn MetricsService> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn AdviceService> {
    fn from_ref(state: &AppState) -> Self {
        state.advice_service.clone()
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Assemble the router; per-user routes sit behind the bearer middleware
pub fn build_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/registro", post(auth_handlers::register_handler))
        .route("/login", post(auth_handlers::login_handler))
        .route(
            "/catalogo/electrodomesticos",
            get(appliance_handlers::catalog_handler),
        )
        .route("/calcular/costo", post(metrics_handlers::estimate_cost_handler))
        .route(
            "/calcular/huella_carbono",
            post(metrics_handlers::estimate_footprint_handler),
        );

    let protected = Router::new()
        .route(
            "/usuarios/{id}",
            get(user_handlers::get_user_handler).put(user_handlers::update_user_handler),
        )
        .route(
            "/electrodomesticos/{username}",
            get(appliance_handlers::list_appliances_handler)
                .post(appliance_handlers::create_appliance_handler),
        )
        .route(
            "/electrodomesticos/{username}/{id}",
            put(appliance_handlers::update_appliance_handler)
                .delete(appliance_handlers::delete_appliance_handler),
        )
        .route(
            "/facturas/{username}",
            get(invoice_handlers::list_invoices_handler)
                .post(invoice_handlers::create_invoice_handler),
        )
        .route(
            "/facturas/{username}/{id}",
            axum::routing::delete(invoice_handlers::delete_invoice_handler),
        )
        .route("/metricas/resumen/{id}", get(metrics_handlers::summary_handler))
        .route("/metricas/perfil/{id}", get(metrics_handlers::profile_handler))
        .route("/consejos/{id}", get(advice_handlers::list_advice_handler))
        .route(
            "/consejos/{id}/marcar_cumplido",
            post(advice_handlers::complete_advice_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth_service.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "test_secret".to_string();
        config
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = AppState::new(&test_config(), Repositories::in_memory()).unwrap();
        let response = build_app(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[test]
    fn test_openapi_declares_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/metricas/resumen/{id}"));
    }

    #[test]
    fn test_state_rejects_unbounded_token_ttl() {
        let mut config = test_config();
        config.auth.token_ttl_hours = i64::MAX;
        assert!(AppState::new(&config, Repositories::in_memory()).is_err());
    }

    #[test]
    fn test_state_rejects_non_finite_rate() {
        let mut config = test_config();
        config.tariff.rate_low = f64::NAN;
        assert!(AppState::new(&config, Repositories::in_memory()).is_err());
    }
}
