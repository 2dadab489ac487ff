#![allow(dead_code)]

use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use axum_extra::extract::cookie::Key;
use jobsift::config::{ModelConfig, RetrainConfig};
use jobsift::db::{AdminStore, PredictionStore, connect};
use jobsift::service::auth::hash_password;
use jobsift::service::{AdminAuth, ClassifierHandle, RetrainHandle, SessionStore, retrain_actor};
use jobsift::views::Views;
use jobsift::{SiftState, sift_router};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

const VECTORIZER_JSON: &str = r#"{
    "vocabulary": {"congratulation": 0, "free": 1, "iphone": 2, "click": 3, "salary": 4, "experience": 5},
    "idf": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
}"#;

const MODEL_JSON: &str = r#"{
    "kind": "logistic_regression",
    "classes": [0, 1],
    "coef": [[3.0, 3.0, 2.0, 2.0, -3.0, -3.0]],
    "intercept": [-0.2]
}"#;

pub struct TestApp {
    pub app: Router,
    pub predictions: PredictionStore,
    pub retrain: RetrainHandle,
    dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

/// Training script that publishes the staged artifacts, run from the app's temp dir.
pub const PUBLISH_STAGED_ARTIFACTS: &str =
    "cp staged_model.json fake_job_model.json && cp staged_vectorizer.json tfidf_vectorizer.json";

pub struct AppOptions {
    pub with_model: bool,
    /// Shell script run as the training program, from the app's temp dir.
    pub retrain_script: &'static str,
    pub reload_on_success: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            with_model: true,
            retrain_script: "exit 0",
            reload_on_success: false,
        }
    }
}

pub async fn spawn_app(opts: AppOptions) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut dir = std::env::temp_dir();
    dir.push(format!("jobsift-it-{}-{}", std::process::id(), nanos));
    fs::create_dir_all(&dir).expect("create temp dir");

    let model = ModelConfig {
        model_path: dir.join("fake_job_model.json"),
        vectorizer_path: dir.join("tfidf_vectorizer.json"),
        lemma_dictionary_path: None,
    };
    fs::write(dir.join("staged_model.json"), MODEL_JSON).expect("stage model");
    fs::write(dir.join("staged_vectorizer.json"), VECTORIZER_JSON).expect("stage vectorizer");
    if opts.with_model {
        fs::write(&model.model_path, MODEL_JSON).expect("write model");
        fs::write(&model.vectorizer_path, VECTORIZER_JSON).expect("write vectorizer");
    }

    let database_url = format!("sqlite:{}", dir.join("jobs.sqlite").display());
    let pool = connect(&database_url).await.expect("open database");
    let predictions = PredictionStore::new(pool.clone());
    let admins = AdminStore::new(pool);
    admins
        .upsert(ADMIN_USER, &hash_password(ADMIN_PASSWORD).expect("hash"))
        .await
        .expect("provision admin");
    let auth = AdminAuth::new(admins, SessionStore::new(chrono::Duration::hours(1)))
        .expect("admin auth");

    let classifier = ClassifierHandle::from_config(&model);
    let retrain = retrain_actor::spawn(
        RetrainConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), opts.retrain_script.to_string()],
            working_dir: Some(dir.clone()),
            timeout_secs: 30,
            reload_on_success: opts.reload_on_success,
        },
        model,
        predictions.clone(),
        classifier.clone(),
    )
    .await
    .expect("spawn retrain actor");

    let state = SiftState::new(
        classifier,
        predictions.clone(),
        auth,
        retrain.clone(),
        Views::new().expect("templates"),
        Key::generate(),
        true,
    );

    TestApp {
        app: sift_router(state),
        predictions,
        retrain,
        dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    /// Log in and return the `name=value` pair to send back as `Cookie`.
    pub async fn login(&self) -> String {
        self.login_with(None).await
    }

    /// Log in from a browser that may already carry a session cookie.
    pub async fn login_with(&self, cookie: Option<&str>) -> String {
        let resp = self
            .send(form_request(
                "/admin_login",
                &format!("username={ADMIN_USER}&password={ADMIN_PASSWORD}"),
                cookie,
            ))
            .await;
        assert!(resp.status().is_redirection(), "login failed: {}", resp.status());
        session_cookie(&resp).expect("session cookie set on login")
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("failed to build request")
}

pub fn post(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("failed to build request")
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("jobsift_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(resp: &Response<Body>) -> Option<&str> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
    to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body")
        .to_vec()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("response body was not JSON")
}

pub async fn body_string(resp: Response<Body>) -> String {
    String::from_utf8(body_bytes(resp).await).expect("response body was not utf-8")
}
