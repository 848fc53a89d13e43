use markport::application::engine::{ImportConfigBuilder, ImportEngine};
use markport::application::pacing::PauseKind;
use markport::domain::credentials::{Credentials, TokenPair};
use markport::domain::error::{DomainError, RemoteError};
use markport::domain::row::{Row, RowBuilder};
use markport::domain::services::bookmark_api::BookmarkApi;
use markport::infrastructure::proxy::ProxyClient;
use markport::util::testing::{init_test_env, RecordingPacer};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn tokens() -> TokenPair {
    TokenPair::new("tok", "sec")
}

fn article() -> Row {
    RowBuilder::default()
        .title("Rust")
        .url("https://rust-lang.org")
        .status("archived")
        .build()
        .unwrap()
}

#[tokio::test]
async fn given_valid_credentials_when_authenticate_then_token_pair_returned() {
    let _ = init_test_env();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/authenticate")
        .match_body(Matcher::Json(json!({"username": "alice", "password": "s3cret"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "token": "tok", "tokenSecret": "sec"}"#)
        .create_async()
        .await;

    let client = ProxyClient::new(server.url()).unwrap();
    let pair = client
        .authenticate(&Credentials::new("alice", "s3cret"))
        .await
        .unwrap();

    assert_eq!(pair, tokens());
    mock.assert_async().await;
}

#[tokio::test]
async fn given_rejected_credentials_when_authenticate_then_authentication_failed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/authenticate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": false, "error": "Invalid credentials"}"#)
        .create_async()
        .await;

    let client = ProxyClient::new(server.url()).unwrap();
    let err = client
        .authenticate(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();

    match err {
        DomainError::AuthenticationFailed(message) => assert_eq!(message, "Invalid credentials"),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn given_http_401_when_authenticate_then_status_in_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/authenticate")
        .with_status(401)
        .with_body(r#"{"error": "Unauthorized"}"#)
        .create_async()
        .await;

    let client = ProxyClient::new(server.url()).unwrap();
    let err = client
        .authenticate(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("HTTP 401: Unauthorized"), "{}", err);
}

#[tokio::test]
async fn given_success_without_tokens_when_authenticate_then_failed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/authenticate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let client = ProxyClient::new(server.url()).unwrap();
    let err = client
        .authenticate(&Credentials::new("alice", "s3cret"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("token pair"));
}

#[tokio::test]
async fn given_row_when_add_then_tokens_and_fields_posted() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/add")
        .match_body(Matcher::Json(json!({
            "token": "tok",
            "tokenSecret": "sec",
            "url": "https://rust-lang.org",
            "title": "Rust",
            "status": "archive",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let client = ProxyClient::new(server.url()).unwrap();
    let result = client.add_bookmark(&tokens(), &article()).await;

    assert_eq!(result, Ok(()));
    mock.assert_async().await;
}

#[tokio::test]
async fn given_http_429_when_add_then_retryable_rate_limit() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/add")
        .with_status(429)
        .with_body("Too Many Requests")
        .create_async()
        .await;

    let client = ProxyClient::new(server.url()).unwrap();
    let err = client.add_bookmark(&tokens(), &article()).await.unwrap_err();

    assert_eq!(err, RemoteError::RateLimited);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn given_http_502_when_add_then_retryable_server_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/add")
        .with_status(502)
        .with_body(r#"{"error": "upstream unavailable"}"#)
        .create_async()
        .await;

    let client = ProxyClient::new(server.url()).unwrap();
    let err = client.add_bookmark(&tokens(), &article()).await.unwrap_err();

    assert_eq!(
        err,
        RemoteError::Server {
            status: 502,
            message: "upstream unavailable".to_string()
        }
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn given_http_400_when_add_then_permanent_rejection() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/add")
        .with_status(400)
        .with_body(r#"{"error": "Invalid URL"}"#)
        .create_async()
        .await;

    let client = ProxyClient::new(server.url()).unwrap();
    let err = client.add_bookmark(&tokens(), &article()).await.unwrap_err();

    assert!(matches!(err, RemoteError::Rejected { status: 400, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn given_unsuccessful_body_when_add_then_failed_with_service_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/add")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": false, "error": "Article already saved"}"#)
        .create_async()
        .await;

    let client = ProxyClient::new(server.url()).unwrap();
    let err = client.add_bookmark(&tokens(), &article()).await.unwrap_err();

    assert_eq!(err, RemoteError::Failed("Article already saved".to_string()));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn given_unreachable_proxy_when_add_then_network_error() {
    let client = ProxyClient::new("http://127.0.0.1:9")
        .unwrap()
        .with_timeouts(Duration::from_secs(1), Duration::from_secs(1));

    let err = client.add_bookmark(&tokens(), &article()).await.unwrap_err();

    assert!(matches!(err, RemoteError::Network(_)), "{:?}", err);
}

#[tokio::test]
async fn given_proxy_with_throttled_article_when_import_then_other_rows_still_imported() {
    let _ = init_test_env();
    let mut server = mockito::Server::new_async().await;
    let _auth = server
        .mock("POST", "/authenticate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "token": "tok", "tokenSecret": "sec"}"#)
        .create_async()
        .await;
    let throttled = server
        .mock("POST", "/add")
        .match_body(Matcher::PartialJson(json!({"url": "https://example.com/throttled"})))
        .with_status(429)
        .expect(2)
        .create_async()
        .await;
    let accepted = server
        .mock("POST", "/add")
        .match_body(Matcher::PartialJson(json!({"url": "https://example.com/ok"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create_async()
        .await;

    let api = Arc::new(ProxyClient::new(server.url()).unwrap());
    let pacer = Arc::new(RecordingPacer::new());
    let config = ImportConfigBuilder::default()
        .max_retries(1_u32)
        .build()
        .unwrap();
    let engine = ImportEngine::with_pacer(api, pacer.clone(), config);
    let rows = vec![
        Row::from_url("https://example.com/throttled"),
        Row::from_url("https://example.com/ok"),
    ];

    let result = engine
        .import_all(
            &Credentials::new("alice", "s3cret"),
            &rows,
            |_| {},
            &CancellationToken::new(),
        )
        .await;

    assert!(result.success);
    assert_eq!(result.message, "Imported 1 of 2 articles (1 failed)");
    let failed = result.failed_articles.unwrap();
    assert_eq!(failed[0].url, "https://example.com/throttled");
    assert_eq!(
        failed[0].error,
        "Rate limited by remote service (HTTP 429) (after 2 attempts)"
    );
    assert_eq!(pacer.count(PauseKind::Retry), 1);
    throttled.assert_async().await;
    accepted.assert_async().await;
}
