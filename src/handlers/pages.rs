use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use minijinja::context;
use serde::Deserialize;
use tracing::info;

use crate::middleware::AdminPage;
use crate::middleware::auth::{LOGIN_PATH, build_session_cookie, clear_session_cookie, session_id};
use crate::service::Capability;
use crate::types::Verdict;
use crate::views::{ADMIN_DASHBOARD, ADMIN_LOGIN, INDEX};
use crate::{error::SiftError, router::SiftState};

pub const DASHBOARD_PATH: &str = "/admin_dashboard";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET / -> landing page with the prediction form.
pub async fn index(State(state): State<SiftState>) -> Result<Html<String>, SiftError> {
    state.views.render(INDEX, context! {})
}

/// GET /admin_login -> login form, or straight to the dashboard with a live session.
pub async fn admin_login_form(
    State(state): State<SiftState>,
    jar: PrivateCookieJar,
) -> Result<Response, SiftError> {
    if let Some(id) = session_id(&jar)
        && state.auth.is_authenticated(&id).await
    {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }
    Ok(state.views.render(ADMIN_LOGIN, context! {})?.into_response())
}

/// POST /admin_login -> issue a session cookie on success, re-render the form otherwise.
pub async fn admin_login(
    State(state): State<SiftState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, SiftError> {
    let Some((id, _claim)) = state.auth.login(&form.username, &form.password).await? else {
        let page = state.views.render(
            ADMIN_LOGIN,
            context! { error => INVALID_CREDENTIALS, username => form.username },
        )?;
        return Ok(page.into_response());
    };

    // a fresh login replaces whatever session this browser held before
    if let Some(previous) = session_id(&jar) {
        state.auth.logout(&previous).await;
    }
    let jar = jar.add(build_session_cookie(id, state.cookie_policy));
    Ok((jar, Redirect::to(DASHBOARD_PATH)).into_response())
}

/// GET /admin_dashboard -> aggregate counts, retrain history and current job state.
pub async fn admin_dashboard(
    State(state): State<SiftState>,
    AdminPage(session): AdminPage,
) -> Result<Html<String>, SiftError> {
    session.claim.require(Capability::ViewDashboard)?;

    let total = state.predictions.count_all().await?;
    let fake = state.predictions.count_by_label(Verdict::Fake).await?;
    let real = state.predictions.count_by_label(Verdict::Real).await?;
    let logs = state.predictions.list_retrain_logs().await?;
    let retrain = state.retrain.status();

    state.views.render(
        ADMIN_DASHBOARD,
        context! {
            username => session.claim.username,
            total,
            fake,
            real,
            logs,
            retrain_state => retrain.label(),
            retrain,
        },
    )
}

/// POST /admin_logout -> revoke the session and clear the cookie.
pub async fn admin_logout(
    State(state): State<SiftState>,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    if let Some(id) = session_id(&jar)
        && state.auth.logout(&id).await
    {
        info!(session = %id, "admin logged out");
    }
    let jar = jar.remove(clear_session_cookie(state.cookie_policy));
    (jar, Redirect::to(LOGIN_PATH))
}
