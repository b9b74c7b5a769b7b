//! Contract tests for the WhatsApp gateway client against a mock provider.

use kua_workflow::config::NotificationConfig;
use kua_workflow::workflows::marriage::{
    DispatchResult, NotificationGateway, WhatsAppDispatcher, NOT_CONFIGURED_MESSAGE,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher_for(server: &MockServer) -> WhatsAppDispatcher {
    WhatsAppDispatcher::from_config(&NotificationConfig {
        api_url: Some(format!("{}/send", server.uri())),
        api_key: Some("fonnte-token".to_string()),
    })
}

#[tokio::test]
async fn posts_normalized_target_with_raw_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("authorization", "fonnte-token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "target": "6281234567890",
            "message": "Pengajuan Anda sedang diproses"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "detail": "success! message in queue"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher_for(&server)
        .dispatch("0812-3456-7890", "Pengajuan Anda sedang diproses")
        .await;

    assert_eq!(
        result,
        DispatchResult::delivered(json!({
            "status": true,
            "detail": "success! message in queue"
        }))
    );
}

#[tokio::test]
async fn plain_text_provider_bodies_are_kept_as_strings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_body_string("queued"))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher_for(&server).dispatch("8123", "halo").await;

    assert!(result.success);
    assert_eq!(result.data, Some(json!("queued")));
}

#[tokio::test]
async fn provider_errors_become_failed_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher_for(&server).dispatch("08123", "halo").await;

    assert!(!result.success);
    let error = result.error.expect("error recorded");
    assert!(error.contains("401"), "error was {error}");
    assert!(error.contains("invalid token"));
}

#[tokio::test]
async fn unreachable_gateway_is_reported_not_raised() {
    let dispatcher = WhatsAppDispatcher::from_config(&NotificationConfig {
        api_url: Some("http://127.0.0.1:9/send".to_string()),
        api_key: Some("fonnte-token".to_string()),
    });

    let result = dispatcher.dispatch("08123", "halo").await;

    assert!(!result.success);
    assert!(result.error.is_some());
    assert!(result.data.is_none());
}

#[tokio::test]
async fn missing_configuration_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = WhatsAppDispatcher::from_config(&NotificationConfig {
        api_url: Some(format!("{}/send", server.uri())),
        api_key: None,
    });
    let result = dispatcher.dispatch("08123", "halo").await;

    assert!(!result.success);
    assert_eq!(result.message.as_deref(), Some(NOT_CONFIGURED_MESSAGE));
}
