use std::sync::Arc;
use std::time::Duration;

use loan_portal::clients::{LoanApi, ReqwestLoanApi};
use loan_portal::config::Config;
use loan_portal::services::{DecisionCategory, ErrorCode, HealthMonitor, HealthStatus};
use loan_portal::utils::logging;
use loan_portal::workflow::{LoanController, Phase, SubmitOutcome};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REQUEST_TEXT: &str = "CLIENT_ID: client-042\nJe souhaite emprunter 200000 euros pour un appartement à Bordeaux.";

fn config_for(server: &MockServer) -> Config {
    Config {
        api_base_url: format!("{}/", server.uri()),
        request_timeout_secs: Some(5),
        ..Config::default()
    }
}

fn controller_for(server: &MockServer) -> LoanController<ReqwestLoanApi> {
    logging::init(false);
    let config = config_for(server);
    let api = Arc::new(ReqwestLoanApi::new(&config).expect("构建 HTTP 客户端失败"));
    LoanController::from_config(api, &config)
}

#[tokio::test]
async fn test_approved_application_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/loan/apply"))
        .and(body_json(json!({
            "client_id": "client-042",
            "request_text": REQUEST_TEXT,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "correlation_id": "A1B2C3D4",
            "timestamp": "2024-05-02T14:03:11.482913",
            "client_email": "jean.dupont@example.com",
            "final_decision": {
                "approved": true,
                "decision": "APPROUVÉE",
                "justification": "Profil solide",
                "risk_level": "LOW"
            },
            "credit_assessment": {
                "score": 742,
                "grade": "B",
                "status": "solvent",
                "explanations": { "credit": "Historique propre" }
            },
            "property_evaluation": { "estimated_value": 250000, "reason": "Prix du marché" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    let SubmitOutcome::Result(view) = controller.submit(REQUEST_TEXT).await else {
        panic!("应该显示处理结果");
    };

    assert_eq!(view.category, DecisionCategory::Approved);
    assert_eq!(view.reference(), "Demande N° A1B2C3D4");
    assert_eq!(view.reason, "Profil solide");
    assert_eq!(view.credit_score, "742/1000 (B)");
    assert_eq!(view.property_value, "250\u{202f}000,00\u{a0}€");
    assert_eq!(view.explanations.credit, "Historique propre");
    assert_eq!(view.explanations.income, "N/A");
    assert_eq!(view.processed_at.as_deref(), Some("02/05/2024 14:03"));

    assert_eq!(controller.phase(), Phase::Result);
    assert_eq!(
        controller.session().current_correlation_id(),
        Some("A1B2C3D4")
    );
}

#[tokio::test]
async fn test_region_not_found_from_adapter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/loan/apply"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "error",
            "error": "Property.RegionNotFound"
        })))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    let SubmitOutcome::Error(view) = controller.submit(REQUEST_TEXT).await else {
        panic!("应该显示错误信息");
    };

    assert_eq!(view.message(), ErrorCode::PropertyRegionNotFound.message());
    assert_eq!(controller.phase(), Phase::Error);
    assert!(controller.page().form_visible);
}

#[tokio::test]
async fn test_numeric_status_field_does_not_hide_error_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/loan/apply"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Client.NotFound",
            "status": 404
        })))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    let SubmitOutcome::Error(view) = controller.submit(REQUEST_TEXT).await else {
        panic!("应该显示错误信息");
    };

    assert_eq!(view.message(), ErrorCode::ClientNotFound.message());
    assert!(!view.is_retryable());
}

#[tokio::test]
async fn test_non_json_body_is_reported_as_communication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/loan/apply"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    let outcome = controller.submit(REQUEST_TEXT).await;

    let SubmitOutcome::Error(view) = outcome else {
        panic!("应该显示错误信息");
    };
    assert_eq!(
        view.message(),
        "Impossible de joindre le service de traitement. Veuillez réessayer."
    );
    assert!(!controller.page().loading);
}

#[tokio::test]
async fn test_timeout_is_reported_as_communication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/loan/apply"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "success", "correlation_id": "LATE" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = Config {
        api_base_url: server.uri(),
        request_timeout_secs: Some(1),
        ..Config::default()
    };
    let api = Arc::new(assert_ok!(ReqwestLoanApi::new(&config)));
    let controller = LoanController::from_config(api, &config);

    let outcome = controller.submit(REQUEST_TEXT).await;
    assert!(matches!(outcome, SubmitOutcome::Error(_)));
    assert!(controller.session().current_correlation_id().is_none());
}

#[tokio::test]
async fn test_health_probe_states() {
    let server = MockServer::start().await;
    let api = Arc::new(ReqwestLoanApi::new(&config_for(&server)).unwrap());
    let monitor = HealthMonitor::new(Arc::clone(&api));

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    assert_eq!(monitor.probe().await, HealthStatus::Active);
    assert_eq!(monitor.status(), HealthStatus::Active);

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    assert_eq!(monitor.probe().await, HealthStatus::Inactive);

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "status": "down" })))
        .mount(&server)
        .await;
    assert_eq!(monitor.probe().await, HealthStatus::Inactive);
    assert_err!(api.health().await);
}
