use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;

use crate::db::PredictionStore;
use crate::handlers::{admin, pages, predict};
use crate::middleware::CookiePolicy;
use crate::service::{AdminAuth, ClassifierHandle, RetrainHandle};
use crate::views::Views;

#[derive(Clone)]
pub struct SiftState {
    pub classifier: ClassifierHandle,
    pub predictions: PredictionStore,
    pub auth: AdminAuth,
    pub retrain: RetrainHandle,
    pub views: Views,
    pub cookie_policy: CookiePolicy,
    cookie_key: Key,
}

impl SiftState {
    pub fn new(
        classifier: ClassifierHandle,
        predictions: PredictionStore,
        auth: AdminAuth,
        retrain: RetrainHandle,
        views: Views,
        cookie_key: Key,
        insecure_cookie: bool,
    ) -> Self {
        let cookie_policy = CookiePolicy::new(insecure_cookie, auth.sessions().ttl());
        Self {
            classifier,
            predictions,
            auth,
            retrain,
            views,
            cookie_policy,
            cookie_key,
        }
    }

    pub fn cookie_key(&self) -> Key {
        self.cookie_key.clone()
    }
}

impl FromRef<SiftState> for Key {
    fn from_ref(state: &SiftState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn sift_router(state: SiftState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/predict", post(predict::predict))
        .route(
            "/admin_login",
            get(pages::admin_login_form).post(pages::admin_login),
        )
        .route("/admin_dashboard", get(pages::admin_dashboard))
        .route("/admin_logout", post(pages::admin_logout))
        .route("/export_logs", get(admin::export_logs))
        .route("/retrain_model", post(admin::retrain_model))
        .route("/retrain_status", get(admin::retrain_status))
        .route("/health", get(admin::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
