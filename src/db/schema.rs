//! SQL DDL for the prediction store.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `predictions`: append-only inference log, description truncated to 500 chars
/// - `admin`: one row per admin, `username` is the conflict key for re-provisioning
/// - `retrain_logs`: append-only record of finished retrain jobs
/// - Index on `predictions(prediction)` for the dashboard's per-label counts
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS predictions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_description TEXT NOT NULL,
    prediction TEXT NOT NULL, -- 'Fake Job' | 'Real Job'
    confidence REAL NOT NULL,
    timestamp TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_predictions_prediction ON predictions(prediction);

CREATE TABLE IF NOT EXISTS admin (
    username TEXT PRIMARY KEY,
    password TEXT NOT NULL -- PHC string
);

CREATE TABLE IF NOT EXISTS retrain_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    status TEXT NOT NULL, -- 'succeeded' | 'failed'
    detail TEXT NOT NULL,
    started_at TEXT NOT NULL, -- RFC3339
    finished_at TEXT NOT NULL -- RFC3339
);
"#;
