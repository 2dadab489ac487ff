//! Create an admin account, or reset the password of an existing one.

use clap::Parser;
use jobsift::config::Config;
use jobsift::db::{AdminStore, connect};
use jobsift::service::auth::hash_password;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "create_admin", version, about = "Provision a dashboard admin account")]
struct Args {
    /// Account name used on the login form.
    #[arg(short, long, default_value = "admin")]
    username: String,

    /// Plain-text password; stored only as an Argon2 hash.
    #[arg(short, long, env = "JOBSIFT_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,

    /// Overrides `basic.database_url` from the usual configuration layers.
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let args = Args::parse();
    if args.password.is_empty() {
        return Err("password must not be empty".into());
    }
    let database_url = match args.database_url {
        Some(url) => url,
        None => Config::load()?.basic.database_url,
    };

    let pool = connect(&database_url).await?;
    let hash = hash_password(&args.password)?;
    AdminStore::new(pool).upsert(&args.username, &hash).await?;

    info!(username = %args.username, %database_url, "admin account provisioned");
    Ok(())
}
