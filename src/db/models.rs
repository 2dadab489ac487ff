use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::Verdict;

/// One row of `predictions`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionRecord {
    pub id: i64,
    pub job_description: String,
    pub prediction: Verdict,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// One row of `admin`.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminCredential {
    pub username: String,
    pub password_hash: String,
}

/// One row of `retrain_logs`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RetrainLog {
    pub id: i64,
    pub status: String,
    pub detail: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
