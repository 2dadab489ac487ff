use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::error::SiftError;
use crate::model::{LoadedModel, POSITIVE_CLASS};
use crate::text::{Lemmatizer, TextNormalizer};
use crate::types::{Prediction, Verdict};

/// Immutable inference service; `Unavailable` when artifacts failed to load.
#[derive(Debug)]
pub enum ClassifierService {
    Ready(LoadedModel),
    Unavailable { reason: String },
}

impl ClassifierService {
    /// Never fails: load errors become the `Unavailable` variant.
    pub fn load(cfg: &ModelConfig) -> Self {
        match LoadedModel::load(&cfg.model_path, &cfg.vectorizer_path) {
            Ok(model) => ClassifierService::Ready(model),
            Err(e) => {
                warn!(error = %e, "model artifacts unavailable; /predict will answer 503");
                ClassifierService::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ClassifierService::Ready(_))
    }

    pub fn predict(&self, normalized: &str) -> Result<Prediction, SiftError> {
        let model = match self {
            ClassifierService::Ready(model) => model,
            ClassifierService::Unavailable { reason } => {
                return Err(SiftError::ModelUnavailable(reason.clone()));
            }
        };
        let scores = model.score(normalized);
        let max_probability = scores
            .probabilities
            .iter()
            .copied()
            .fold(0.0f64, f64::max);
        let prediction = if scores.class == POSITIVE_CLASS {
            Verdict::Fake
        } else {
            Verdict::Real
        };
        Ok(Prediction {
            prediction,
            confidence: round_percent(max_probability),
        })
    }
}

/// Probability as a percentage with two decimals.
///
/// Rounds the exact binary value of the percentage (0.12345 gives 12.35),
/// not the product `percent * 100`, which can land on the wrong side of a tie.
pub fn round_percent(probability: f64) -> f64 {
    let percent = (probability * 100.0).clamp(0.0, 100.0);
    format!("{percent:.2}").parse().unwrap_or(percent)
}

/// Shared handle: normalizer plus the current classifier, swappable on reload.
#[derive(Clone)]
pub struct ClassifierHandle {
    normalizer: Arc<TextNormalizer>,
    current: Arc<RwLock<Arc<ClassifierService>>>,
}

impl ClassifierHandle {
    pub fn new(normalizer: TextNormalizer, service: ClassifierService) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
            current: Arc::new(RwLock::new(Arc::new(service))),
        }
    }

    /// Build the normalizer and classifier from configuration.
    pub fn from_config(cfg: &ModelConfig) -> Self {
        let lemmatizer = match cfg.lemma_dictionary_path.as_deref() {
            Some(path) => Lemmatizer::with_dictionary_file(path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "lemma dictionary ignored");
                Lemmatizer::default()
            }),
            None => Lemmatizer::default(),
        };
        Self::new(TextNormalizer::new(lemmatizer), ClassifierService::load(cfg))
    }

    pub async fn current(&self) -> Arc<ClassifierService> {
        self.current.read().await.clone()
    }

    pub async fn is_ready(&self) -> bool {
        self.current().await.is_ready()
    }

    /// Normalize then classify. Fails fast when no model is loaded.
    pub async fn classify(&self, raw: &str) -> Result<Prediction, SiftError> {
        let service = self.current().await;
        if let ClassifierService::Unavailable { reason } = service.as_ref() {
            return Err(SiftError::ModelUnavailable(reason.clone()));
        }
        let normalized = self.normalizer.normalize(raw);
        service.predict(&normalized)
    }

    /// Reload artifacts from disk; the previous model stays live on failure.
    pub async fn reload(&self, cfg: &ModelConfig) -> Result<(), SiftError> {
        let model_path = cfg.model_path.clone();
        let vectorizer_path = cfg.vectorizer_path.clone();
        let model =
            tokio::task::spawn_blocking(move || LoadedModel::load(&model_path, &vectorizer_path))
                .await
                .map_err(|e| SiftError::Artifact(format!("reload task failed: {e}")))??;
        *self.current.write().await = Arc::new(ClassifierService::Ready(model));
        info!("classifier reloaded");
        Ok(())
    }
}
