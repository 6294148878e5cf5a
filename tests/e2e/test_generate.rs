use crate::e2e::helpers::{stubs::StubCompletions, TestApp, TestAppOptions};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

const PICKUP_PAD_FALLBACK: &str = "I'd love to know more about you!";

fn choices(body: &serde_json::Value) -> Vec<&str> {
    body.get("choices")
        .and_then(|v| v.as_array())
        .expect("choices should be an array")
        .iter()
        .map(|v| v.as_str().expect("choice should be a string"))
        .collect()
}

#[tokio::test]
async fn it_should_generate_three_pickup_choices() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&[
            "What's the most spontaneous trip you've ever taken?",
            "A fellow photographer! What's your favorite subject?",
            "What's your dream hiking destination?",
        ])),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({
                "mode": "pickup",
                "style": "safe",
                "context": "I love hiking and photography"
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(choices(body).len(), 3);
    assert_eq!(body.get("style").and_then(|v| v.as_str()), Some("safe"));
    assert_eq!(body.get("mode").and_then(|v| v.as_str()), Some("pickup"));
}

#[tokio::test]
async fn it_should_default_to_the_safe_style() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&["One", "Two", "Three"])),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({ "mode": "pickup", "context": "I love hiking" }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json().get("style").and_then(|v| v.as_str()),
        Some("safe")
    );
}

#[tokio::test]
async fn it_should_pad_short_results_to_the_expected_count() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&["Only one line came back"])),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({
                "mode": "pickup",
                "style": "safe",
                "context": "I love hiking and photography"
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(
        choices(body),
        vec![
            "Only one line came back",
            PICKUP_PAD_FALLBACK,
            PICKUP_PAD_FALLBACK
        ]
    );
}

#[tokio::test]
async fn it_should_generate_two_reply_choices() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&[
            "That sounds like fun, where did you go?",
            "Ha, I need to hear the whole story!",
        ])),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({
                "mode": "reply",
                "style": "funny",
                "context": "Them: my weekend was wild"
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(choices(body).len(), 2);
    assert_eq!(body.get("mode").and_then(|v| v.as_str()), Some("reply"));
}

#[tokio::test]
async fn it_should_reject_blocklisted_context_as_unsafe() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&["a", "b", "c"])),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({
                "mode": "pickup",
                "style": "safe",
                "context": "I've been thinking about suicide lately"
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(
        body.get("code").and_then(|v| v.as_str()),
        Some("CONTENT_UNSAFE")
    );

    let flagged = body
        .pointer("/details/flagged_categories")
        .and_then(|v| v.as_array())
        .expect("flagged_categories should be present");
    assert!(flagged.iter().any(|v| v.as_str() == Some("suicide")));

    let blocked = body
        .pointer("/details/moderation_results/detail/blocklist/blocked_terms_found")
        .and_then(|v| v.as_array())
        .expect("blocklist detail should be present");
    assert!(blocked.iter().any(|v| v.as_str() == Some("suicide")));
}

#[tokio::test]
async fn it_should_reject_context_with_contact_information() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::returning(&["a", "b", "c"])),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({
                "mode": "pickup",
                "style": "safe",
                "context": "Call me at 555-123-4567"
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    let flagged = body
        .pointer("/details/flagged_categories")
        .and_then(|v| v.as_array())
        .unwrap();
    assert!(flagged.iter().any(|v| v.as_str() == Some("phone_number")));
}

#[tokio::test]
async fn it_should_reject_malformed_request_bodies() {
    let app = TestApp::spawn(TestAppOptions::default()).await;

    // Missing context
    let response = app
        .client
        .post("/v1/generate", &json!({ "mode": "pickup" }))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown mode
    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({ "mode": "poem", "context": "hello" }),
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn it_should_reject_oversized_context() {
    let app = TestApp::spawn(TestAppOptions::default()).await;

    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({
                "mode": "pickup",
                "context": "x".repeat(1501)
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json().get("code").and_then(|v| v.as_str()),
        Some("VALIDATION_ERROR")
    );
}

#[tokio::test]
async fn it_should_report_generation_failure_when_the_provider_errors() {
    let app = TestApp::spawn(TestAppOptions {
        completions: Some(StubCompletions::failing("connection refused")),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({
                "mode": "pickup",
                "style": "safe",
                "context": "I love hiking and photography"
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json().get("code").and_then(|v| v.as_str()),
        Some("GENERATION_FAILED")
    );
}

#[tokio::test]
async fn it_should_report_unavailable_without_a_configured_provider() {
    let app = TestApp::spawn(TestAppOptions::default()).await;

    let response = app
        .client
        .post(
            "/v1/generate",
            &json!({
                "mode": "pickup",
                "context": "I love hiking"
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json().get("code").and_then(|v| v.as_str()),
        Some("SERVICE_UNAVAILABLE")
    );
}
