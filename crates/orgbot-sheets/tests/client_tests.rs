//! Sheets client tests against a local mock server.

use orgbot_sheets::{SheetsClient, SheetsError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/open-apis/auth/v3/tenant_access_token/internal"))
        .and(body_partial_json(json!({"app_id": "app-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "ok",
            "expire": 7200,
            "tenant_access_token": "t-xyz"
        })))
        .mount(server)
        .await;
}

async fn mount_sheet_query(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/open-apis/sheets/v3/spreadsheets/sheet-tok/sheets/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "success",
            "data": {"sheets": [{"sheet_id": "sh1", "title": "orders"}]}
        })))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> SheetsClient {
    SheetsClient::new(
        "app-1".to_string(),
        "secret".to_string(),
        "sheet-tok".to_string(),
        Some(server.uri()),
    )
    .expect("client should build")
}

#[tokio::test]
async fn fetches_rows_from_range() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_sheet_query(&server).await;
    Mock::given(method("GET"))
        .and(path(
            "/open-apis/sheets/v2/spreadsheets/sheet-tok/values/sh1!A2:C3",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {"valueRange": {"values": [
                [1001, "alice", "a@x.com"],
                [1002, [{"type": "text", "text": "bob"}], "b@x.com"]
            ]}}
        })))
        .mount(&server)
        .await;

    let rows = client_for(&server).fetch_rows("A2", "C3").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].order_id, 1001);
    assert_eq!(rows[0].username, "alice");
    assert_eq!(rows[1].username, "bob");
}

#[tokio::test]
async fn nonzero_token_code_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/open-apis/auth/v3/tenant_access_token/internal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 99991663,
            "msg": "app secret invalid"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_rows("A2", "C3").await.unwrap_err();
    match err {
        SheetsError::Api { code, message } => {
            assert_eq!(code, 99991663);
            assert_eq!(message, "app secret invalid");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn spreadsheet_without_sheets_is_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/open-apis/sheets/v3/spreadsheets/sheet-tok/sheets/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {"sheets": []}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_rows("A2", "C3").await.unwrap_err();
    assert!(matches!(err, SheetsError::NoSheets));
}
