use crate::config::{ModelConfig, RetrainConfig};
use crate::db::PredictionStore;
use crate::error::SiftError;
use crate::service::classifier::ClassifierHandle;
use crate::service::retrain_runner::RetrainRunner;
use crate::types::{RetrainOutcome, RetrainStatus};

use chrono::{DateTime, Utc};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

/// Public messages handled by the retrain actor.
#[derive(Debug)]
pub enum RetrainMessage {
    /// Start a job. Replies with the blocking state label if one is already active.
    Start(RpcReplyPort<Result<RetrainTicket, &'static str>>),

    // Internal messages (sent by the job task)
    /// The training process has been spawned.
    Launched {
        job_id: u64,
        started_at: DateTime<Utc>,
    },
    /// The training process has exited (or could not be started).
    Finished {
        job_id: u64,
        outcome: RetrainOutcome,
    },
}

/// An accepted job. Resolves to that job's own terminal status.
#[derive(Debug)]
pub struct RetrainTicket {
    pub job_id: u64,
    done: oneshot::Receiver<RetrainStatus>,
}

impl RetrainTicket {
    pub async fn wait(self) -> Result<RetrainStatus, SiftError> {
        let job_id = self.job_id;
        self.done.await.map_err(|_| {
            SiftError::RactorError(format!("retrain job {job_id} dropped before finishing"))
        })
    }
}

/// Handle for interacting with the retrain actor.
#[derive(Clone)]
pub struct RetrainHandle {
    actor: ActorRef<RetrainMessage>,
    status: watch::Receiver<RetrainStatus>,
}

impl RetrainHandle {
    /// Start a retrain job; rejected while another is pending or running.
    pub async fn start(&self) -> Result<RetrainTicket, SiftError> {
        ractor::call!(self.actor, RetrainMessage::Start)
            .map_err(|e| SiftError::RactorError(format!("Start RPC failed: {e}")))?
            .map_err(SiftError::RetrainInProgress)
    }

    pub fn status(&self) -> RetrainStatus {
        self.status.borrow().clone()
    }

    /// Wait until no job is pending or running and return the latest status.
    pub async fn wait_idle(&self) -> Result<RetrainStatus, SiftError> {
        let mut rx = self.status.clone();
        let status = rx
            .wait_for(|s| !s.is_active())
            .await
            .map_err(|e| SiftError::RactorError(format!("retrain status channel closed: {e}")))?;
        Ok(status.clone())
    }
}

pub struct RetrainArguments {
    pub retrain: RetrainConfig,
    pub model: ModelConfig,
    pub store: PredictionStore,
    pub classifier: ClassifierHandle,
    pub status_tx: watch::Sender<RetrainStatus>,
}

/// Internal state held by ractor-driven retrain actor
struct RetrainActorState {
    runner: RetrainRunner,
    reload_on_success: bool,
    model: ModelConfig,
    store: PredictionStore,
    classifier: ClassifierHandle,
    status_tx: watch::Sender<RetrainStatus>,
    last_job_id: u64,
    /// Completion channel of the active job.
    waiter: Option<oneshot::Sender<RetrainStatus>>,
}

/// ractor-based retrain actor; serializes job starts.
struct RetrainActor;

#[ractor::async_trait]
impl Actor for RetrainActor {
    type Msg = RetrainMessage;
    type State = RetrainActorState;
    type Arguments = RetrainArguments;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!(
            program = %args.retrain.program,
            args = ?args.retrain.args,
            "RetrainActor started"
        );
        Ok(RetrainActorState {
            runner: RetrainRunner::from(&args.retrain),
            reload_on_success: args.retrain.reload_on_success,
            model: args.model,
            store: args.store,
            classifier: args.classifier,
            status_tx: args.status_tx,
            last_job_id: 0,
            waiter: None,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            RetrainMessage::Start(reply) => {
                self.handle_start(state, &myself, reply);
            }
            RetrainMessage::Launched { job_id, started_at } => {
                let current = state.status_tx.borrow().clone();
                if current.is_active() && current.job_id() == Some(job_id) {
                    state
                        .status_tx
                        .send_replace(RetrainStatus::Running { job_id, started_at });
                }
            }
            RetrainMessage::Finished { job_id, outcome } => {
                self.handle_finished(state, job_id, outcome).await;
            }
        }
        Ok(())
    }
}

impl RetrainActor {
    fn handle_start(
        &self,
        state: &mut RetrainActorState,
        myself: &ActorRef<RetrainMessage>,
        reply: RpcReplyPort<Result<RetrainTicket, &'static str>>,
    ) {
        let current = state.status_tx.borrow().clone();
        if current.is_active() {
            debug!(state = current.label(), "retrain rejected; job already active");
            let _ = reply.send(Err(current.label()));
            return;
        }

        state.last_job_id += 1;
        let job_id = state.last_job_id;
        let (done_tx, done) = oneshot::channel();
        state.waiter = Some(done_tx);
        state.status_tx.send_replace(RetrainStatus::Pending {
            job_id,
            requested_at: Utc::now(),
        });

        let runner = state.runner.clone();
        let me = myself.clone();
        tokio::spawn(async move {
            let launched = me.clone();
            let outcome = runner
                .run(move |started_at| {
                    let _ = ractor::cast!(launched, RetrainMessage::Launched { job_id, started_at });
                })
                .await;
            let _ = ractor::cast!(me, RetrainMessage::Finished { job_id, outcome });
        });

        info!(job_id, "retrain job accepted");
        let _ = reply.send(Ok(RetrainTicket { job_id, done }));
    }

    async fn handle_finished(
        &self,
        state: &mut RetrainActorState,
        job_id: u64,
        mut outcome: RetrainOutcome,
    ) {
        if outcome.result.is_ok() && state.reload_on_success {
            if let Err(e) = state.classifier.reload(&state.model).await {
                warn!(job_id, error = %e, "retrain succeeded but model reload failed");
                outcome.result = Err(format!(
                    "training succeeded but the new model could not be loaded: {e}"
                ));
            }
        }

        if let Err(e) = state
            .store
            .insert_retrain_log(
                outcome.status_label(),
                outcome.detail(),
                outcome.started_at,
                outcome.finished_at,
            )
            .await
        {
            warn!(job_id, error = %e, "failed to record retrain log");
        }

        let status = outcome.into_status(job_id);
        info!(job_id, state = status.label(), "retrain job finished");
        if let Some(waiter) = state.waiter.take() {
            // nobody waiting when the request did not ask to
            let _ = waiter.send(status.clone());
        }
        state.status_tx.send_replace(status);
    }
}

/// Async spawn of the retrain actor and return a handle.
pub async fn spawn(
    retrain: RetrainConfig,
    model: ModelConfig,
    store: PredictionStore,
    classifier: ClassifierHandle,
) -> Result<RetrainHandle, SiftError> {
    let (status_tx, status) = watch::channel(RetrainStatus::Idle);
    let args = RetrainArguments {
        retrain,
        model,
        store,
        classifier,
        status_tx,
    };
    let (actor, _jh) = Actor::spawn(None, RetrainActor, args)
        .await
        .map_err(|e| SiftError::RactorError(format!("failed to spawn RetrainActor: {e}")))?;
    Ok(RetrainHandle { actor, status })
}
