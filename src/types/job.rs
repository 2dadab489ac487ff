use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of the (single) retrain job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RetrainStatus {
    Idle,
    Pending {
        job_id: u64,
        requested_at: DateTime<Utc>,
    },
    Running {
        job_id: u64,
        started_at: DateTime<Utc>,
    },
    Succeeded {
        job_id: u64,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        message: String,
    },
    Failed {
        job_id: u64,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        error: String,
    },
}

impl RetrainStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RetrainStatus::Idle => "idle",
            RetrainStatus::Pending { .. } => "pending",
            RetrainStatus::Running { .. } => "running",
            RetrainStatus::Succeeded { .. } => "succeeded",
            RetrainStatus::Failed { .. } => "failed",
        }
    }

    /// Job this status belongs to; `None` before the first job.
    pub fn job_id(&self) -> Option<u64> {
        match self {
            RetrainStatus::Idle => None,
            RetrainStatus::Pending { job_id, .. }
            | RetrainStatus::Running { job_id, .. }
            | RetrainStatus::Succeeded { job_id, .. }
            | RetrainStatus::Failed { job_id, .. } => Some(*job_id),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RetrainStatus::Pending { .. } | RetrainStatus::Running { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetrainStatus::Succeeded { .. } | RetrainStatus::Failed { .. }
        )
    }
}

/// Result of one run of the external training program.
#[derive(Debug, Clone)]
pub struct RetrainOutcome {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub result: Result<String, String>,
}

impl RetrainOutcome {
    pub fn status_label(&self) -> &'static str {
        if self.result.is_ok() { "succeeded" } else { "failed" }
    }

    pub fn detail(&self) -> &str {
        match &self.result {
            Ok(msg) | Err(msg) => msg,
        }
    }

    pub fn into_status(self, job_id: u64) -> RetrainStatus {
        match self.result {
            Ok(message) => RetrainStatus::Succeeded {
                job_id,
                started_at: self.started_at,
                finished_at: self.finished_at,
                message,
            },
            Err(error) => RetrainStatus::Failed {
                job_id,
                started_at: self.started_at,
                finished_at: self.finished_at,
                error,
            },
        }
    }
}
