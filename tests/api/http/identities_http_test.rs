//! Identity listing HTTP tests

use super::mock_provider::MockProviderServer;
use super::{build_test_router, get_json, TestAppState, IDENTITIES_PATH};
use crate::api::create_test_session_token;
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_list_identities_from_directory() {
    let provider = MockProviderServer::new().await;
    provider
        .mock_user(
            "acc_1",
            &[
                ("id_42", "discord:999", "discord"),
                ("id_43", "google:123", "google"),
            ],
        )
        .await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));
    let token = create_test_session_token("acc_1");

    let response = get_json(&app, IDENTITIES_PATH, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body.unwrap(),
        json!({
            "data": [
                { "internalId": "id_42", "externalId": "discord:999", "provider": "discord" },
                { "internalId": "id_43", "externalId": "google:123", "provider": "google" }
            ]
        })
    );
}

#[tokio::test]
async fn test_list_identities_empty() {
    let provider = MockProviderServer::new().await;
    provider.mock_user("acc_1", &[]).await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));
    let token = create_test_session_token("acc_1");

    let response = get_json(&app, IDENTITIES_PATH, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.unwrap(), json!({ "data": [] }));
}

#[tokio::test]
async fn test_list_identities_requires_session() {
    let provider = MockProviderServer::new().await;
    provider.expect_no_directory_calls().await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));

    let response = get_json(&app, IDENTITIES_PATH, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_identities_unknown_account() {
    let provider = MockProviderServer::new().await;
    provider.mock_user_status("ghost", 404).await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));
    let token = create_test_session_token("ghost");

    let response = get_json(&app, IDENTITIES_PATH, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_identities_directory_down() {
    let provider = MockProviderServer::new().await;
    provider.mock_user_status("acc_1", 502).await;

    let app = build_test_router(TestAppState::with_mock_provider(&provider));
    let token = create_test_session_token("acc_1");

    let response = get_json(&app, IDENTITIES_PATH, Some(&token)).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body.unwrap()["error"], "provider_unavailable");
}
