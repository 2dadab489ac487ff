use crate::db::models::{AdminCredential, PredictionRecord, RetrainLog};
use crate::db::schema::SQLITE_INIT;
use crate::error::SiftError;
use crate::text::truncate_chars;
use crate::types::Verdict;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub type SqlitePool = Pool<Sqlite>;

/// Stored descriptions are cut to this many characters; inference sees the full text.
pub const STORED_DESCRIPTION_CHARS: usize = 500;

/// Open (creating if missing) the database and apply the schema.
pub async fn connect(database_url: &str) -> Result<SqlitePool, SiftError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Initialize the schema by executing the bundled DDL.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), SiftError> {
    // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct PredictionStore {
    pool: SqlitePool,
}

impl PredictionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Append a prediction. Returns the row id.
    pub async fn insert(
        &self,
        description: &str,
        verdict: Verdict,
        confidence: f64,
    ) -> Result<i64, SiftError> {
        let stored = truncate_chars(description, STORED_DESCRIPTION_CHARS);
        let result = sqlx::query(
            r#"INSERT INTO predictions (job_description, prediction, confidence, timestamp)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(stored)
        .bind(verdict.as_str())
        .bind(confidence)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn count_all(&self) -> Result<i64, SiftError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predictions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_label(&self, verdict: Verdict) -> Result<i64, SiftError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predictions WHERE prediction = ?")
            .bind(verdict.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn list_predictions(&self) -> Result<Vec<PredictionRecord>, SiftError> {
        let rows = sqlx::query(
            r#"SELECT id, job_description, prediction, confidence, timestamp
               FROM predictions ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_prediction).collect()
    }

    /// Append a finished retrain run. Returns the row id.
    pub async fn insert_retrain_log(
        &self,
        status: &str,
        detail: &str,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Result<i64, SiftError> {
        let result = sqlx::query(
            r#"INSERT INTO retrain_logs (status, detail, started_at, finished_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(status)
        .bind(detail)
        .bind(started_at.to_rfc3339())
        .bind(finished_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Newest first.
    pub async fn list_retrain_logs(&self) -> Result<Vec<RetrainLog>, SiftError> {
        let rows = sqlx::query(
            r#"SELECT id, status, detail, started_at, finished_at
               FROM retrain_logs ORDER BY id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_retrain_log).collect()
    }

    fn row_to_prediction(row: SqliteRow) -> Result<PredictionRecord, SiftError> {
        let id: i64 = row.try_get("id")?;
        let job_description: String = row.try_get("job_description")?;
        let label: String = row.try_get("prediction")?;
        let confidence: f64 = row.try_get("confidence")?;
        let timestamp: String = row.try_get("timestamp")?;

        let prediction = Verdict::parse(&label).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown prediction label {label:?}").into())
        })?;

        Ok(PredictionRecord {
            id,
            job_description,
            prediction,
            confidence,
            timestamp: parse_timestamp(&timestamp)?,
        })
    }

    fn row_to_retrain_log(row: SqliteRow) -> Result<RetrainLog, SiftError> {
        let started_at: String = row.try_get("started_at")?;
        let finished_at: String = row.try_get("finished_at")?;
        Ok(RetrainLog {
            id: row.try_get("id")?,
            status: row.try_get("status")?,
            detail: row.try_get("detail")?,
            started_at: parse_timestamp(&started_at)?,
            finished_at: parse_timestamp(&finished_at)?,
        })
    }
}

#[derive(Clone)]
pub struct AdminStore {
    pool: SqlitePool,
}

impl AdminStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, username: &str) -> Result<Option<AdminCredential>, SiftError> {
        let row = sqlx::query("SELECT username, password FROM admin WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| -> Result<AdminCredential, SiftError> {
            Ok(AdminCredential {
                username: row.try_get("username")?,
                password_hash: row.try_get("password")?,
            })
        })
        .transpose()
    }

    /// Re-provisioning the same username replaces its hash.
    pub async fn upsert(&self, username: &str, password_hash: &str) -> Result<(), SiftError> {
        sqlx::query(
            r#"INSERT INTO admin (username, password) VALUES (?, ?)
               ON CONFLICT(username) DO UPDATE SET password = excluded.password"#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// RFC3339, or SQLite's `CURRENT_TIMESTAMP` format (UTC) for legacy rows.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) async fn temp_pool() -> (SqlitePool, std::path::PathBuf) {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut temp_path = std::env::temp_dir();
        temp_path.push(format!(
            "jobsift-store-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));
        let pool = connect(&format!("sqlite:{}", temp_path.display()))
            .await
            .expect("open temp database");
        (pool, temp_path)
    }

    #[tokio::test]
    async fn counts_track_inserts_by_label() {
        let (pool, path) = temp_pool().await;
        let store = PredictionStore::new(pool);

        let labels = [
            Verdict::Fake,
            Verdict::Real,
            Verdict::Fake,
            Verdict::Real,
            Verdict::Real,
        ];
        for (i, verdict) in labels.iter().enumerate() {
            store
                .insert(&format!("posting {i}"), *verdict, 50.0 + i as f64)
                .await
                .unwrap();
        }

        assert_eq!(store.count_all().await.unwrap(), 5);
        assert_eq!(store.count_by_label(Verdict::Fake).await.unwrap(), 2);
        assert_eq!(store.count_by_label(Verdict::Real).await.unwrap(), 3);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn descriptions_are_truncated_to_500_chars() {
        let (pool, path) = temp_pool().await;
        let store = PredictionStore::new(pool);

        let long = "é".repeat(800);
        let id = store.insert(&long, Verdict::Fake, 99.5).await.unwrap();
        let records = store.list_predictions().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].job_description.chars().count(), 500);
        assert_eq!(records[0].prediction, Verdict::Fake);
        assert_eq!(records[0].confidence, 99.5);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn legacy_timestamps_are_readable() {
        let (pool, path) = temp_pool().await;
        sqlx::query(
            "INSERT INTO predictions (job_description, prediction, confidence) VALUES ('x', 'Real Job', 12.5)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let records = PredictionStore::new(pool).list_predictions().await.unwrap();
        assert_eq!(records[0].prediction, Verdict::Real);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn retrain_logs_are_listed_newest_first() {
        let (pool, path) = temp_pool().await;
        let store = PredictionStore::new(pool);
        let now = Utc::now();
        store
            .insert_retrain_log("failed", "exit status: 1", now, now)
            .await
            .unwrap();
        store
            .insert_retrain_log("succeeded", "Model successfully updated!", now, now)
            .await
            .unwrap();

        let logs = store.list_retrain_logs().await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].status, "succeeded");
        assert_eq!(logs[1].status, "failed");
        assert!(logs[0].id > logs[1].id);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn admin_upsert_replaces_by_username() {
        let (pool, path) = temp_pool().await;
        let admins = AdminStore::new(pool);

        assert!(admins.find("admin").await.unwrap().is_none());
        admins.upsert("admin", "hash-one").await.unwrap();
        admins.upsert("admin", "hash-two").await.unwrap();

        let found = admins.find("admin").await.unwrap().expect("admin row");
        assert_eq!(found.password_hash, "hash-two");

        let _ = std::fs::remove_file(&path);
    }
}
