use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::RetrainConfig;
use crate::types::RetrainOutcome;

pub const SUCCESS_MESSAGE: &str = "Model successfully updated!";
const STDERR_TAIL_CHARS: usize = 500;

/// Runs the external training program once per call.
#[derive(Debug, Clone)]
pub struct RetrainRunner {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl From<&RetrainConfig> for RetrainRunner {
    fn from(cfg: &RetrainConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            args: cfg.args.clone(),
            working_dir: cfg.working_dir.clone(),
            timeout: (cfg.timeout_secs > 0).then(|| Duration::from_secs(cfg.timeout_secs)),
        }
    }
}

impl RetrainRunner {
    /// `on_launch` fires once the child process has been spawned.
    pub async fn run(&self, on_launch: impl FnOnce(DateTime<Utc>)) -> RetrainOutcome {
        let started_at = Utc::now();
        let result = self.execute(started_at, on_launch).await;
        let finished_at = Utc::now();
        match &result {
            Ok(_) => info!(
                program = %self.program,
                elapsed_ms = (finished_at - started_at).num_milliseconds(),
                "retrain finished"
            ),
            Err(e) => warn!(program = %self.program, error = %e, "retrain failed"),
        }
        RetrainOutcome {
            started_at,
            finished_at,
            result,
        }
    }

    async fn execute(
        &self,
        started_at: DateTime<Utc>,
        on_launch: impl FnOnce(DateTime<Utc>),
    ) -> Result<String, String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .map_err(|e| format!("failed to start {}: {e}", self.program))?;
        info!(program = %self.program, args = ?self.args, "retrain process started");
        on_launch(started_at);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| format!("{} timed out after {}s", self.program, limit.as_secs()))?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| format!("failed to wait for {}: {e}", self.program))?;

        if output.status.success() {
            return Ok(SUCCESS_MESSAGE.to_string());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail = stderr_tail(stderr.trim());
        if tail.is_empty() {
            Err(format!("{} exited with {}", self.program, output.status))
        } else {
            Err(format!("{} exited with {}: {tail}", self.program, output.status))
        }
    }
}

fn stderr_tail(stderr: &str) -> &str {
    let count = stderr.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return stderr;
    }
    let skip = count - STDERR_TAIL_CHARS;
    let idx = stderr
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &stderr[idx..]
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner(script: &str, timeout_secs: u64) -> RetrainRunner {
        RetrainRunner::from(&RetrainConfig {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
            working_dir: None,
            timeout_secs,
            reload_on_success: false,
        })
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let mut launched = false;
        let outcome = runner("exit 0", 0).run(|_| launched = true).await;
        assert!(launched);
        assert_eq!(outcome.result, Ok(SUCCESS_MESSAGE.to_string()));
        assert!(outcome.finished_at >= outcome.started_at);
    }

    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        let outcome = runner("echo 'no training data' >&2; exit 3", 0)
            .run(|_| {})
            .await;
        let err = outcome.result.unwrap_err();
        assert!(err.contains("no training data"), "{err}");
        assert!(err.contains('3'), "{err}");
    }

    #[tokio::test]
    async fn missing_program_fails_without_launch() {
        let r = RetrainRunner::from(&RetrainConfig {
            program: "/nonexistent/trainer".into(),
            ..RetrainConfig::default()
        });
        let mut launched = false;
        let outcome = r.run(|_| launched = true).await;
        assert!(!launched);
        assert!(outcome.result.unwrap_err().starts_with("failed to start"));
    }

    #[tokio::test]
    async fn timeout_kills_the_process() {
        let outcome = runner("sleep 5", 1).run(|_| {}).await;
        assert!(outcome.result.unwrap_err().contains("timed out"));
    }

    #[tokio::test]
    async fn chatty_stdout_is_discarded() {
        let outcome = runner("head -c 4000000 /dev/zero; exit 0", 10)
            .run(|_| {})
            .await;
        assert_eq!(outcome.result, Ok(SUCCESS_MESSAGE.to_string()));
    }

    #[test]
    fn stderr_tail_keeps_the_end() {
        let long = format!("{}END", "x".repeat(1000));
        let tail = stderr_tail(&long);
        assert_eq!(tail.chars().count(), STDERR_TAIL_CHARS);
        assert!(tail.ends_with("END"));
    }
}
