use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use time::Duration;

use crate::error::SiftError;
use crate::router::SiftState;
use crate::service::{AdminClaim, SessionId};

pub const SESSION_COOKIE: &str = "jobsift_session";
pub const LOGIN_PATH: &str = "/admin_login";

/// Attributes applied to the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
    pub max_age: Duration,
}

impl CookiePolicy {
    pub fn new(insecure_cookie: bool, ttl: chrono::Duration) -> Self {
        Self {
            secure: !insecure_cookie,
            max_age: Duration::seconds(ttl.num_seconds()),
        }
    }
}

/// A live admin session resolved from the private cookie.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub id: SessionId,
    pub claim: AdminClaim,
}

/// Gate for HTML pages: anonymous requests are redirected to the login form.
#[derive(Debug, Clone)]
pub struct AdminPage(pub AdminSession);

/// Gate for JSON endpoints: anonymous requests get a 401 body.
#[derive(Debug, Clone)]
pub struct AdminApi(pub AdminSession);

impl FromRequestParts<SiftState> for AdminPage {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SiftState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(parts, state).await {
            Some(session) => Ok(Self(session)),
            None => Err(Redirect::to(LOGIN_PATH).into_response()),
        }
    }
}

impl FromRequestParts<SiftState> for AdminApi {
    type Rejection = SiftError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SiftState,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state)
            .await
            .map(Self)
            .ok_or(SiftError::Unauthorized)
    }
}

async fn resolve_session(parts: &Parts, state: &SiftState) -> Option<AdminSession> {
    let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key());
    let id = session_id(&jar)?;
    let claim = state.auth.sessions().claim(&id).await?;
    Some(AdminSession { id, claim })
}

/// Session id carried by the jar, if present and well formed.
pub fn session_id(jar: &PrivateCookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

pub fn build_session_cookie(id: SessionId, policy: CookiePolicy) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .secure(policy.secure)
        .same_site(SameSite::Lax)
        .max_age(policy.max_age)
        .build()
}

pub fn clear_session_cookie(policy: CookiePolicy) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(policy.secure)
        .same_site(SameSite::Lax)
        .build()
}
