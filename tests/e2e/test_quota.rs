use crate::e2e::helpers::{stubs::StubCompletions, TestApp, TestAppOptions};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

const DEVICE_TOKEN: &str = "device-token-alpha-0001";

fn generate_body() -> serde_json::Value {
    json!({
        "mode": "pickup",
        "style": "safe",
        "context": "I love hiking and photography"
    })
}

fn working_stub() -> TestAppOptions {
    TestAppOptions {
        completions: Some(StubCompletions::returning(&["One", "Two", "Three"])),
        ..Default::default()
    }
}

#[tokio::test]
async fn it_should_attach_rate_limit_headers_to_metered_responses() {
    let app = TestApp::spawn(working_stub()).await;

    let response = app
        .client
        .post_with_auth("/v1/generate", &generate_body(), DEVICE_TOKEN)
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-ratelimit-limit"), Some("5"));
    assert_eq!(response.header("x-ratelimit-remaining"), Some("4"));
    assert!(response.header("x-ratelimit-reset").is_some());

    assert_eq!(app.quota_store.get_usage(DEVICE_TOKEN).await, 1);
}

#[tokio::test]
async fn it_should_reject_requests_over_the_daily_limit() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&["One", "Two", "Three"])),
        daily_limit: 1,
        ..Default::default()
    })
    .await;

    let first = app
        .client
        .post_with_auth("/v1/generate", &generate_body(), DEVICE_TOKEN)
        .await
        .unwrap();
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .client
        .post_with_auth("/v1/generate", &generate_body(), DEVICE_TOKEN)
        .await
        .unwrap();

    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
    let body = second.json();
    assert_eq!(
        body.get("code").and_then(|v| v.as_str()),
        Some("QUOTA_EXCEEDED")
    );
    assert_eq!(
        body.pointer("/details/current_usage").and_then(|v| v.as_u64()),
        Some(1)
    );
    assert_eq!(
        body.pointer("/details/daily_limit").and_then(|v| v.as_u64()),
        Some(1)
    );
    assert!(body.pointer("/details/reset_time").is_some());

    assert_eq!(second.header("x-ratelimit-remaining"), Some("0"));
    let retry_after: i64 = second
        .header("retry-after")
        .expect("Retry-After should be present")
        .parse()
        .unwrap();
    assert!(retry_after >= 0);

    // The rejected request consumed no quota
    assert_eq!(app.quota_store.get_usage(DEVICE_TOKEN).await, 1);
}

#[tokio::test]
async fn it_should_not_consume_quota_when_generation_fails() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::failing("connection refused")),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post_with_auth("/v1/generate", &generate_body(), DEVICE_TOKEN)
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.header("x-ratelimit-limit").is_none());
    assert_eq!(app.quota_store.get_usage(DEVICE_TOKEN).await, 0);
}

#[tokio::test]
async fn it_should_not_consume_quota_when_content_is_rejected() {
    let app = TestApp::spawn(working_stub()).await;

    let response = app
        .client
        .post_with_auth(
            "/v1/generate",
            &json!({
                "mode": "pickup",
                "context": "Email me at john@example.com"
            }),
            DEVICE_TOKEN,
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.quota_store.get_usage(DEVICE_TOKEN).await, 0);
}

#[tokio::test]
async fn it_should_let_requests_without_a_token_pass_unmetered() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&["One", "Two", "Three"])),
        daily_limit: 1,
        ..Default::default()
    })
    .await;

    for _ in 0..3 {
        let response = app
            .client
            .post("/v1/generate", &generate_body())
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.header("x-ratelimit-limit").is_none());
    }
}

#[tokio::test]
async fn it_should_ignore_tokens_below_the_minimum_length() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&["One", "Two", "Three"])),
        daily_limit: 1,
        ..Default::default()
    })
    .await;

    for _ in 0..2 {
        let response = app
            .client
            .post_with_auth("/v1/generate", &generate_body(), "short")
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.header("x-ratelimit-limit").is_none());
    }
}

#[tokio::test]
async fn it_should_reject_missing_tokens_when_required() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&["One", "Two", "Three"])),
        require_device_token: true,
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post("/v1/generate", &generate_body())
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json().get("code").and_then(|v| v.as_str()),
        Some("UNAUTHORIZED")
    );

    // A proper token is still served and metered
    let response = app
        .client
        .post_with_auth("/v1/generate", &generate_body(), DEVICE_TOKEN)
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-ratelimit-limit"), Some("5"));
}

#[tokio::test]
async fn it_should_never_meter_unprotected_paths() {
    let app = TestApp::spawn(TestAppOptions {
        daily_limit: 0,
        ..Default::default()
    })
    .await;

    let response = app.client.get("/health").await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("x-ratelimit-limit").is_none());
}
