//! HTTP transport tests against a mock server.
//!
//! ```bash
//! cargo test -p buckaroo-lib --features http-transport --test http_transport
//! ```

#![cfg(feature = "http-transport")]

use buckaroo_lib::prelude::*;
use buckaroo_lib::test_utils::{signed_body, test_config, TestFixtures};
use wiremock::{
    matchers::{body_string_contains, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn config_for(server: &MockServer) -> GatewayConfig {
    test_config().with_api_url(format!("{}/nvp/", server.uri()))
}

#[tokio::test]
async fn test_status_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/nvp/"))
        .and(query_param("op", "TransactionStatus"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("brq_transaction=41C48B55FA9164E123CC73B1157459E840BE5D24"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(signed_body(&[
            ("BRQ_APIRESULT", "Success"),
            ("BRQ_STATUSCODE", "190"),
            ("BRQ_TRANSACTIONS", TestFixtures::TRANSACTION_ID),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Gateway::new(config_for(&server)).unwrap();
    let response = gateway
        .status(&StatusOptions::transaction(TestFixtures::TRANSACTION_ID))
        .await
        .unwrap();

    assert_eq!(response.transaction_status(), Some(TransactionStatus::Success));
}

#[tokio::test]
async fn test_server_error_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gateway = Gateway::new(config_for(&server)).unwrap();
    let err = gateway
        .status(&StatusOptions::transaction(TestFixtures::TRANSACTION_ID))
        .await
        .unwrap_err();

    match err {
        BuckarooError::InvalidResponse { status, .. } => assert_eq!(status, 500),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let gateway = Gateway::new(config_for(&server).with_timeout(1)).unwrap();
    let err = gateway
        .status(&StatusOptions::transaction(TestFixtures::TRANSACTION_ID))
        .await
        .unwrap_err();

    assert_eq!(err.code(), BuckarooErrorCode::ConnectionTimeout);
}

#[tokio::test]
async fn test_connection_refused() {
    let config = test_config().with_api_url("http://127.0.0.1:9/nvp/");
    let gateway = Gateway::new(config).unwrap();

    let err = gateway.cancel_transaction("TX").await.unwrap_err();
    assert!(err.is_retryable());
}
