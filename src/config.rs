//! Layered configuration: built-in defaults, then `config.toml`, then
//! `JOBSIFT_`-prefixed environment variables (`JOBSIFT_BASIC__LISTEN_ADDR`).

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "JOBSIFT_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub model: ModelConfig,
    pub retrain: RetrainConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    /// Cookie encryption key material, at least 64 bytes. Empty means a
    /// random key per process, which invalidates sessions on restart.
    pub session_secret: String,
    pub session_ttl_secs: u64,
    pub insecure_cookie: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite://job_predictions.db".to_string(),
            loglevel: "info".to_string(),
            session_secret: String::new(),
            session_ttl_secs: 8 * 60 * 60,
            insecure_cookie: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
    pub lemma_dictionary_path: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("fake_job_model.json"),
            vectorizer_path: PathBuf::from("tfidf_vectorizer.json"),
            lemma_dictionary_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrainConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Zero disables the timeout.
    pub timeout_secs: u64,
    pub reload_on_success: bool,
}

impl Default for RetrainConfig {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["train_model.py".to_string()],
            working_dir: None,
            timeout_secs: 0,
            reload_on_success: true,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}
