//! Unlink endpoint HTTP tests

use super::mock_provider::MockProviderServer;
use super::{build_test_router, post_raw, unlink_as, TestAppState, UNLINK_PATH};
use crate::api::create_test_session_token;
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

const ACC_1_IDENTITIES: [(&str, &str, &str); 2] = [
    ("id_42", "discord:999", "discord"),
    ("id_43", "google:123", "google"),
];

#[tokio::test]
async fn test_external_reference_falls_back_to_store() {
    let provider = MockProviderServer::new().await;
    provider.mock_user("acc_1", &ACC_1_IDENTITIES).await;
    provider.mock_delete_identity("id_42", 403, 1).await;

    let state = TestAppState::with_mock_provider(&provider);
    state.identity_store.add_binding("acc_1", "id_42").await;
    let app = build_test_router(state.clone());

    let response = unlink_as(&app, "acc_1", json!({ "reference": "discord:999" })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body.unwrap(),
        json!({ "success": true, "strategyUsed": "B" })
    );
    assert!(!state.identity_store.has_binding("acc_1", "id_42").await);
    assert_eq!(
        state.identity_store.delete_calls().await,
        vec![("acc_1".to_string(), "id_42".to_string())]
    );
}

#[tokio::test]
async fn test_privileged_endpoint_success_skips_store() {
    let provider = MockProviderServer::new().await;
    provider.mock_user("acc_1", &ACC_1_IDENTITIES).await;
    provider.mock_delete_identity("id_43", 204, 1).await;

    let state = TestAppState::with_mock_provider(&provider);
    let app = build_test_router(state.clone());

    let response = unlink_as(&app, "acc_1", json!({ "reference": "id_43" })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.unwrap()["strategyUsed"], "A");
    assert!(state.identity_store.delete_calls().await.is_empty());
}

#[tokio::test]
async fn test_identity_id_alias_accepted() {
    let provider = MockProviderServer::new().await;
    provider.mock_user("acc_1", &ACC_1_IDENTITIES).await;
    provider.mock_delete_identity("id_42", 200, 1).await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));

    let response = unlink_as(&app, "acc_1", json!({ "identityId": "id_42" })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.unwrap()["success"], true);
}

#[tokio::test]
async fn test_unknown_reference_is_not_owned() {
    let provider = MockProviderServer::new().await;
    provider.mock_user("acc_1", &ACC_1_IDENTITIES).await;
    provider.expect_no_identity_deletes().await;

    let state = TestAppState::with_mock_provider(&provider);
    let app = build_test_router(state.clone());

    let response = unlink_as(&app, "acc_1", json!({ "reference": "id_999" })).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    let body = response.body.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["errorKind"], "IdentityNotOwned");
    assert!(state.identity_store.delete_calls().await.is_empty());
}

#[tokio::test]
async fn test_other_accounts_identity_is_not_owned() {
    let provider = MockProviderServer::new().await;
    provider.mock_user("acc_1", &ACC_1_IDENTITIES).await;
    provider
        .mock_user("acc_2", &[("id_77", "github:5", "github")])
        .await;
    provider.expect_no_identity_deletes().await;

    let state = TestAppState::with_mock_provider(&provider);
    state.identity_store.add_binding("acc_1", "id_42").await;
    let app = build_test_router(state.clone());

    for reference in ["id_42", "discord:999"] {
        let response = unlink_as(&app, "acc_2", json!({ "reference": reference })).await;

        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body.unwrap()["errorKind"], "IdentityNotOwned");
    }
    assert!(state.identity_store.has_binding("acc_1", "id_42").await);
    assert!(state.identity_store.delete_calls().await.is_empty());
}

#[tokio::test]
async fn test_directory_timeout_never_removes() {
    let provider = MockProviderServer::new().await;
    provider
        .mock_user_delayed("acc_1", Duration::from_secs(3))
        .await;
    provider.expect_no_identity_deletes().await;

    let state = TestAppState::with_step_timeout(&provider.uri(), Duration::from_millis(200));
    let app = build_test_router(state.clone());

    let response = unlink_as(&app, "acc_1", json!({ "reference": "id_42" })).await;

    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    let body = response.body.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["errorKind"], "Timeout");
    assert!(state.identity_store.delete_calls().await.is_empty());
}

#[tokio::test]
async fn test_directory_request_timeout_within_step_is_timeout() {
    // Provider client gives up well before the step budget runs out
    let provider = MockProviderServer::new().await;
    provider
        .mock_user_delayed("acc_1", Duration::from_secs(3))
        .await;
    provider.expect_no_identity_deletes().await;

    let state = TestAppState::with_timeouts(
        &provider.uri(),
        Duration::from_millis(200),
        Duration::from_secs(10),
    );
    let app = build_test_router(state.clone());

    let response = unlink_as(&app, "acc_1", json!({ "reference": "id_42" })).await;

    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.body.unwrap()["errorKind"], "Timeout");
    assert!(state.identity_store.delete_calls().await.is_empty());
}

#[tokio::test]
async fn test_privileged_request_timeout_falls_back_to_store() {
    let provider = MockProviderServer::new().await;
    provider.mock_user("acc_1", &ACC_1_IDENTITIES).await;
    provider
        .mock_delete_identity_delayed("id_42", Duration::from_secs(3))
        .await;

    let state = TestAppState::with_timeouts(
        &provider.uri(),
        Duration::from_millis(500),
        Duration::from_secs(10),
    );
    state.identity_store.add_binding("acc_1", "id_42").await;
    let app = build_test_router(state.clone());

    let response = unlink_as(&app, "acc_1", json!({ "reference": "id_42" })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.unwrap()["strategyUsed"], "B");
    assert!(!state.identity_store.has_binding("acc_1", "id_42").await);
}

#[tokio::test]
async fn test_missing_reference_is_rejected_before_directory() {
    let provider = MockProviderServer::new().await;
    provider.expect_no_directory_calls().await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));

    for body in [json!({}), json!({ "reference": "" }), json!({ "reference": "  " })] {
        let response = unlink_as(&app, "acc_1", body).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body.unwrap()["errorKind"], "MissingParameter");
    }
}

#[tokio::test]
async fn test_malformed_body_is_missing_parameter() {
    let provider = MockProviderServer::new().await;
    provider.expect_no_directory_calls().await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));
    let token = create_test_session_token("acc_1");

    let response = post_raw(&app, UNLINK_PATH, Some(&token), "{not json").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body.unwrap()["errorKind"], "MissingParameter");
}

#[tokio::test]
async fn test_missing_session_is_unauthorized() {
    let provider = MockProviderServer::new().await;
    provider.expect_no_directory_calls().await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));

    let response = post_raw(&app, UNLINK_PATH, None, r#"{"reference":"id_42"}"#).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = post_raw(
        &app,
        UNLINK_PATH,
        Some("not-a-token"),
        r#"{"reference":"id_42"}"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_account_not_found() {
    let provider = MockProviderServer::new().await;
    provider.mock_user_status("ghost", 404).await;
    provider.expect_no_identity_deletes().await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));

    let response = unlink_as(&app, "ghost", json!({ "reference": "id_42" })).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body.unwrap()["errorKind"], "AccountNotFound");
}

#[tokio::test]
async fn test_directory_error_is_unavailable() {
    let provider = MockProviderServer::new().await;
    provider.mock_user_status("acc_1", 500).await;
    provider.expect_no_identity_deletes().await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));

    let response = unlink_as(&app, "acc_1", json!({ "reference": "id_42" })).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body.unwrap()["errorKind"], "DirectoryUnavailable");
}

#[tokio::test]
async fn test_both_strategies_fail_with_generic_detail() {
    let provider = MockProviderServer::new().await;
    provider.mock_user("acc_1", &ACC_1_IDENTITIES).await;
    provider.mock_delete_identity("id_42", 500, 1).await;

    let state = TestAppState::with_mock_provider(&provider);
    state
        .identity_store
        .fail_deletes("permission denied for table identities")
        .await;
    let app = build_test_router(state.clone());

    let response = unlink_as(&app, "acc_1", json!({ "reference": "id_42" })).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    let body = response.body.unwrap();
    assert_eq!(body["errorKind"], "RemovalFailed");
    assert_eq!(body["detail"], "Could not unlink identity");
    assert!(body.get("strategyUsed").is_none());
    assert!(!body.to_string().contains("permission denied"));
    assert_eq!(state.identity_store.delete_calls().await.len(), 1);
}

#[tokio::test]
async fn test_repeated_unlink_is_tolerated() {
    // Directory still lists the identity; the binding itself is already gone
    let provider = MockProviderServer::new().await;
    provider.mock_user("acc_1", &ACC_1_IDENTITIES).await;
    provider.mock_delete_identity("id_42", 404, 2).await;

    let state = TestAppState::with_mock_provider(&provider);
    state.identity_store.add_binding("acc_1", "id_42").await;
    let app = build_test_router(state.clone());

    for _ in 0..2 {
        let response = unlink_as(&app, "acc_1", json!({ "reference": "id_42" })).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.body.unwrap(),
            json!({ "success": true, "strategyUsed": "B" })
        );
    }
    assert_eq!(state.identity_store.delete_calls().await.len(), 2);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let provider = MockProviderServer::new().await;
    provider.expect_no_directory_calls().await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));

    let response = unlink_as(&app, "acc_1", json!({})).await;

    assert!(response.headers.contains_key("x-request-id"));
}
