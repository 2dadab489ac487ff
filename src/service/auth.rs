use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use rand_core::OsRng;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::AdminStore;
use crate::error::SiftError;

/// Opaque id carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewDashboard,
    ExportPredictions,
    TriggerRetrain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
}

/// What an authenticated session is allowed to do.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminClaim {
    pub username: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminClaim {
    pub fn allows(&self, capability: Capability) -> bool {
        match self.role {
            Role::Admin => matches!(
                capability,
                Capability::ViewDashboard
                    | Capability::ExportPredictions
                    | Capability::TriggerRetrain
            ),
        }
    }

    pub fn require(&self, capability: Capability) -> Result<(), SiftError> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(SiftError::Forbidden)
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Server-side session table with an absolute TTL.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, AdminClaim>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn issue(&self, username: &str) -> (SessionId, AdminClaim) {
        let now = Utc::now();
        let claim = AdminClaim {
            username: username.to_string(),
            role: Role::Admin,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let id = SessionId::new();
        self.sessions.write().await.insert(id, claim.clone());
        (id, claim)
    }

    /// Live claim for `id`; expired entries are dropped on access.
    pub async fn claim(&self, id: &SessionId) -> Option<AdminClaim> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                Some(claim) if !claim.is_expired(now) => return Some(claim.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.sessions.write().await.remove(id);
        None
    }

    pub async fn revoke(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, claim| !claim.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Credential check against the `admin` table plus session issuance.
#[derive(Clone)]
pub struct AdminAuth {
    admins: AdminStore,
    sessions: SessionStore,
    /// Verified against when the username is unknown, so both failures cost the same.
    dummy_hash: Arc<str>,
}

impl AdminAuth {
    pub fn new(admins: AdminStore, sessions: SessionStore) -> Result<Self, SiftError> {
        let dummy_hash = hash_password(&Uuid::new_v4().to_string())?;
        Ok(Self {
            admins,
            sessions,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Returns a fresh session on success, `None` on any mismatch.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<(SessionId, AdminClaim)>, SiftError> {
        let stored = self.admins.find(username).await?;
        let known = stored.is_some();
        let hash = stored
            .map(|admin| admin.password_hash)
            .unwrap_or_else(|| self.dummy_hash.to_string());

        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| SiftError::PasswordHash(format!("verify task failed: {e}")))?;

        if !(known && verified) {
            debug!(%username, "admin login rejected");
            return Ok(None);
        }
        let session = self.sessions.issue(username).await;
        info!(%username, session = %session.0, "admin logged in");
        Ok(Some(session))
    }

    pub async fn is_authenticated(&self, id: &SessionId) -> bool {
        self.sessions.claim(id).await.is_some()
    }

    pub async fn logout(&self, id: &SessionId) -> bool {
        self.sessions.revoke(id).await
    }
}

/// Argon2id PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, SiftError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Constant-time comparison inside argon2; malformed hashes never verify.
pub fn verify_password(password: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
