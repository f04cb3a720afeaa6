use rust_decimal::Decimal;

use energy_tracker::app::{AppState, Repositories, build_app};
use energy_tracker::client::{ClientError, EnergyClient};
use energy_tracker::config::AppConfig;
use energy_tracker::models::{
    ConsumptionRequest, CreateApplianceRequest, CreateInvoiceRequest, CreateUserRequest,
    DataStatus, Month, SubsidyTier, UpdateApplianceRequest,
};

/// Serve the app on an ephemeral port and return its base URL
async fn spawn_server() -> String {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "test_secret".to_string();
    let state = AppState::new(&config, Repositories::in_memory()).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_app(state)).await.unwrap();
    });

    format!("http://{}", addr)
}

fn registration(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        password: "password123".to_string(),
        password_confirmation: Some("password123".to_string()),
        name: "Cliente".to_string(),
        location: "Formosa".to_string(),
        subsidy_tier: SubsidyTier::Medium,
    }
}

#[tokio::test]
async fn test_client_full_flow() {
    let client = EnergyClient::new(&spawn_server().await).unwrap();
    client.health().await.unwrap();

    let user = client.register(&registration("cliente@example.com")).await.unwrap();
    let token = client.login("cliente@example.com", "password123").await.unwrap();
    assert_eq!(token.user_id, user.id);

    let appliance = client
        .add_appliance(
            "cliente@example.com",
            &CreateApplianceRequest {
                name: "Heladera".to_string(),
                quantity: 1,
                power_watts: 150.0,
                efficiency: None,
                hours_per_day: 24.0,
                days_per_month: 30,
            },
        )
        .await
        .unwrap();
    assert_eq!(appliance.total_kwh, 108.0);

    let updated = client
        .update_appliance(
            "cliente@example.com",
            appliance.id,
            &UpdateApplianceRequest {
                quantity: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total_kwh, 216.0);

    client
        .add_invoice(
            "cliente@example.com",
            &CreateInvoiceRequest {
                month: Month::Enero,
                year: 2024,
                consumption_kwh: 200.0,
                cost: Decimal::new(15000, 0),
            },
        )
        .await
        .unwrap();

    let summary = client.summary("cliente@example.com").await.unwrap();
    assert_eq!(summary.status, DataStatus::Disponible);
    assert_eq!(summary.total_kwh, Some(200.0));
    assert_eq!(summary.activity.estimated_kwh, 216.0);

    let profile = client.profile_metrics(&user.id.to_string()).await.unwrap();
    assert_eq!(profile.average_monthly_kwh, Some(200.0));

    let completion = client
        .complete_advice("cliente@example.com", "desconectar-standby")
        .await
        .unwrap();
    assert_eq!(completion.awarded, 10);
    assert!(
        client
            .advice("cliente@example.com")
            .await
            .unwrap()
            .iter()
            .any(|item| item.id == "desconectar-standby" && item.completed)
    );
}

#[tokio::test]
async fn test_client_maps_http_errors() {
    let client = EnergyClient::new(&spawn_server().await).unwrap();

    let result = client.list_invoices("alguien@example.com").await;
    assert!(matches!(result, Err(ClientError::Unauthorized(_))));

    client.register(&registration("errores@example.com")).await.unwrap();
    client.login("errores@example.com", "password123").await.unwrap();

    let result = client
        .delete_invoice("errores@example.com", uuid::Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(ClientError::NotFound(_))));

    let result = client
        .estimate_cost(&ConsumptionRequest {
            kwh: -5.0,
            subsidy_tier: SubsidyTier::High,
        })
        .await;
    assert!(matches!(result, Err(ClientError::ValidationFailure(_))));

    let result = client.register(&registration("errores@example.com")).await;
    assert!(matches!(result, Err(ClientError::Unclassified(_))));
}

#[tokio::test]
async fn test_client_connection_refused() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = EnergyClient::new(&format!("http://{}", addr)).unwrap();
    let result = client.catalog().await;

    assert!(matches!(result, Err(ClientError::ConnectionFailure(_))));
}
