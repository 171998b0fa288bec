mod common;

use std::time::Duration;

use serde_json::{json, Value};

use common::{MockOutcome, TestApp, FORM_URL_MASK};
use gateway_core::error::ResponseErrorMessage;

const ORDER_UUID: &str = "7f64a1d0-55c2-4c8e-91d3-0a93e6a6f111";

/// The detached visit counter runs on its own task; give it a moment.
async fn wait_for_call(app: &TestApp, method: &str) -> bool {
    for _ in 0..50 {
        if app.billing.calls().iter().any(|c| c == method) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn paylink_redirects_to_the_payment_form() {
    let app = TestApp::spawn().await;
    app.billing.set(
        "OrderCreateByPaylink",
        MockOutcome::Ok(json!({ "uuid": ORDER_UUID })),
    );
    let client = TestApp::client();

    let response = client
        .get(app.url("/paylink/link-1?utm_source=mail&utm_medium=cpc"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 302);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(location.starts_with(&format!("{}{}", FORM_URL_MASK, ORDER_UUID)));
    assert!(location.contains("utm_source=mail"));
    assert!(location.contains("utm_medium=cpc"));
}

#[tokio::test]
async fn paylink_visit_is_counted_on_a_detached_task() {
    let app = TestApp::spawn().await;
    app.billing.set(
        "OrderCreateByPaylink",
        MockOutcome::Ok(json!({ "uuid": ORDER_UUID })),
    );
    let client = TestApp::client();

    let response = client.get(app.url("/paylink/link-2")).send().await.unwrap();

    assert_eq!(response.status(), 302);
    assert!(wait_for_call(&app, "IncrPaylinkVisits").await);
}

#[tokio::test]
async fn failed_visit_count_does_not_change_the_redirect() {
    let app = TestApp::spawn().await;
    app.billing.set("IncrPaylinkVisits", MockOutcome::Transport);
    app.billing.set(
        "OrderCreateByPaylink",
        MockOutcome::Ok(json!({ "uuid": ORDER_UUID })),
    );
    let client = TestApp::client();

    let response = client.get(app.url("/paylink/link-3")).send().await.unwrap();

    assert_eq!(response.status(), 302);
    assert!(wait_for_call(&app, "IncrPaylinkVisits").await);
}

#[tokio::test]
async fn transport_failure_serves_the_browser_error_page() {
    let app = TestApp::spawn().await;
    app.billing
        .set("OrderCreateByPaylink", MockOutcome::Transport);
    let client = TestApp::client();

    let response = client.get(app.url("/paylink/link-4")).send().await.unwrap();

    assert_eq!(response.status(), 400);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));
    let body = response.text().await.unwrap();
    assert!(body.contains("<html>"));
}

#[tokio::test]
async fn unbuildable_redirect_url_becomes_unknown_error() {
    let billing = std::sync::Arc::new(common::MockBilling::new());
    billing.set(
        "OrderCreateByPaylink",
        MockOutcome::Ok(json!({ "uuid": ORDER_UUID })),
    );
    // A relative mask cannot produce an absolute Location URL.
    let app = TestApp::spawn_with_mask(billing, "/pay/order/").await;
    let client = TestApp::client();

    let response = client.get(app.url("/paylink/link-6")).send().await.unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "ma000001");
}

#[tokio::test]
async fn business_failure_passes_the_backend_error_through() {
    let app = TestApp::spawn().await;
    app.billing.set(
        "OrderCreateByPaylink",
        MockOutcome::Business(404, ResponseErrorMessage::new("fm000050", "paylink expired")),
    );
    let client = TestApp::client();

    let response = client.get(app.url("/paylink/link-5")).send().await.unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "fm000050");
}
