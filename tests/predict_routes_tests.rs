mod common;

use axum::http::StatusCode;
use common::{AppOptions, body_json, body_string, get, post_json, spawn_app};
use jobsift::types::Verdict;
use serde_json::json;

#[tokio::test]
async fn predict_returns_label_and_persists_record() {
    let app = spawn_app(AppOptions::default()).await;

    let resp = app
        .send(post_json(
            "/predict",
            json!({"text": "Congratulations you won a free iPhone click now"}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["prediction"], "Fake Job");
    let confidence = body["confidence"].as_f64().expect("numeric confidence");
    assert!((50.0..=100.0).contains(&confidence), "{confidence}");

    let records = app.predictions.list_predictions().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].prediction, Verdict::Fake);
    assert_eq!(records[0].confidence, confidence);
    assert_eq!(
        records[0].job_description,
        "Congratulations you won a free iPhone click now"
    );
}

#[tokio::test]
async fn predict_classifies_legitimate_posting_as_real() {
    let app = spawn_app(AppOptions::default()).await;
    let resp = app
        .send(post_json(
            "/predict",
            json!({"text": "Competitive salary, five years of experience required."}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["prediction"], "Real Job");
    assert_eq!(app.predictions.count_by_label(Verdict::Real).await.unwrap(), 1);
}

#[tokio::test]
async fn long_descriptions_are_stored_truncated() {
    let app = spawn_app(AppOptions::default()).await;
    let text = "free iphone ".repeat(100);
    let resp = app.send(post_json("/predict", json!({ "text": text }))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let records = app.predictions.list_predictions().await.unwrap();
    assert_eq!(records[0].job_description.chars().count(), 500);
}

#[tokio::test]
async fn empty_text_is_still_classified() {
    let app = spawn_app(AppOptions::default()).await;
    let resp = app.send(post_json("/predict", json!({}))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["confidence"].is_number());
    assert_eq!(app.predictions.count_all().await.unwrap(), 1);
}

#[tokio::test]
async fn predict_without_model_returns_503_and_stores_nothing() {
    let app = spawn_app(AppOptions {
        with_model: false,
        ..AppOptions::default()
    })
    .await;

    for text in ["", "free iphone", "Senior accountant, full time"] {
        let resp = app.send(post_json("/predict", json!({ "text": text }))).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "MODEL_UNAVAILABLE");
        assert_eq!(body["error"]["message"], "AI Model not loaded");
    }
    assert_eq!(app.predictions.count_all().await.unwrap(), 0);
}

#[tokio::test]
async fn health_reports_model_state() {
    let ready = spawn_app(AppOptions::default()).await;
    let body = body_json(ready.send(get("/health", None)).await).await;
    assert_eq!(body, json!({"status": "ok", "model_loaded": true}));

    let degraded = spawn_app(AppOptions {
        with_model: false,
        ..AppOptions::default()
    })
    .await;
    let body = body_json(degraded.send(get("/health", None)).await).await;
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn index_page_renders() {
    let app = spawn_app(AppOptions::default()).await;
    let resp = app.send(get("/", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("/predict"));
}
