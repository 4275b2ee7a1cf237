//! HTTP client tests
//!
//! The ignored tests need a running backend and a valid token:
//! `API_TOKEN=... cargo test --test integration -- --ignored`

use medmaint_console::{
    api::{HttpApi, MaintenanceApi},
    config::ApiConfig,
    error::AppError,
    session::Session,
};

const BASE_URL: &str = "http://localhost:8000";

fn live_api() -> HttpApi {
    let token = std::env::var("API_TOKEN").expect("API_TOKEN must be set for live tests");
    let config = ApiConfig {
        base_url: BASE_URL.to_string(),
        ..Default::default()
    };
    HttpApi::new(&config, Session::with_token(token)).expect("Failed to build client")
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    // Nothing listens on port 9 locally
    let config = ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 2,
    };
    let api = HttpApi::new(&config, Session::with_token("token")).unwrap();

    let err = api.list_equipment().await.unwrap_err();
    assert!(matches!(err, AppError::Network(_)), "got {:?}", err);
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let config = ApiConfig {
        base_url: "not a url".to_string(),
        ..Default::default()
    };
    assert!(HttpApi::new(&config, Session::new()).is_err());
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_current_user() {
    let profile = live_api().current_user().await.expect("Failed to load profile");
    assert!(profile.role.is_some());
}

#[tokio::test]
#[ignore]
async fn test_list_equipment() {
    let equipments = live_api().list_equipment().await.expect("Failed to list equipment");
    for equipment in &equipments {
        assert!(!equipment.equipment_id.is_empty());
    }
}

#[tokio::test]
#[ignore]
async fn test_logs_for_first_equipment() {
    let api = live_api();
    let equipments = api.list_equipment().await.expect("Failed to list equipment");
    let Some(first) = equipments.first() else {
        return;
    };

    let logs = api
        .logs_by_equipment(&first.equipment_id)
        .await
        .expect("Failed to load logs");
    assert!(logs.iter().all(|l| l.equipment_id == first.equipment_id));
}

#[tokio::test]
#[ignore]
async fn test_new_scheduled() {
    live_api().new_scheduled().await.expect("Failed to poll scheduled tasks");
}

#[tokio::test]
#[ignore]
async fn test_invalid_token_is_rejected() {
    let config = ApiConfig {
        base_url: BASE_URL.to_string(),
        ..Default::default()
    };
    let api = HttpApi::new(&config, Session::with_token("invalid")).unwrap();

    let err = api.current_user().await.unwrap_err();
    assert!(err.is_session_failure(), "got {:?}", err);
}
