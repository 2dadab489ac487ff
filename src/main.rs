use std::time::Duration;

use axum_extra::extract::cookie::Key;
use jobsift::config::Config;
use jobsift::db::{AdminStore, PredictionStore};
use jobsift::service::{AdminAuth, ClassifierHandle, SessionStore, retrain_actor};
use jobsift::views::Views;
use jobsift::{SiftError, SiftState, sift_router};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.basic.listen_addr,
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        model_path = %cfg.model.model_path.display(),
        vectorizer_path = %cfg.model.vectorizer_path.display(),
        retrain_program = %cfg.retrain.program,
    );

    let pool = jobsift::db::connect(&cfg.basic.database_url).await?;
    let predictions = PredictionStore::new(pool.clone());
    let classifier = ClassifierHandle::from_config(&cfg.model);

    let ttl = chrono::Duration::seconds(i64::try_from(cfg.basic.session_ttl_secs)?);
    let sessions = SessionStore::new(ttl);
    let auth = AdminAuth::new(AdminStore::new(pool), sessions.clone())?;
    spawn_session_sweeper(sessions);

    let retrain = retrain_actor::spawn(
        cfg.retrain.clone(),
        cfg.model.clone(),
        predictions.clone(),
        classifier.clone(),
    )
    .await?;

    let state = SiftState::new(
        classifier,
        predictions,
        auth,
        retrain,
        Views::new()?,
        cookie_key(&cfg.basic.session_secret)?,
        cfg.basic.insecure_cookie,
    );
    let app = sift_router(state);

    let listener = TcpListener::bind(&cfg.basic.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

fn cookie_key(secret: &str) -> Result<Key, SiftError> {
    if secret.is_empty() {
        warn!("basic.session_secret is empty; using a random cookie key, sessions end on restart");
        return Ok(Key::generate());
    }
    Key::try_from(secret.as_bytes())
        .map_err(|e| SiftError::Config(format!("basic.session_secret: {e}")))
}

fn spawn_session_sweeper(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                debug!(purged, "expired admin sessions swept");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
