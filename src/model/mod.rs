//! Pre-trained model artifacts and inference.
//!
//! Layout:
//! - `vectorizer.rs`: fitted TF-IDF vectorizer (JSON export)
//! - `estimator.rs`: fitted linear estimator (JSON export)
//!
//! The two artifacts are only meaningful as a pair; `LoadedModel::new`
//! checks that their feature dimensions agree.

pub mod estimator;
pub mod vectorizer;

use std::{fs, path::Path};

use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::SiftError;
pub use estimator::{ClassScores, Estimator};
pub use vectorizer::TfidfVectorizer;

/// Class index that marks a posting as fraudulent.
pub const POSITIVE_CLASS: i64 = 1;

#[derive(Debug, Clone)]
pub struct LoadedModel {
    vectorizer: TfidfVectorizer,
    estimator: Estimator,
}

impl LoadedModel {
    pub fn new(vectorizer: TfidfVectorizer, estimator: Estimator) -> Result<Self, SiftError> {
        vectorizer.validate()?;
        estimator.validate(vectorizer.n_features())?;
        Ok(Self {
            vectorizer,
            estimator,
        })
    }

    pub fn load(model_path: &Path, vectorizer_path: &Path) -> Result<Self, SiftError> {
        let vectorizer: TfidfVectorizer = load_artifact(vectorizer_path)?;
        let estimator: Estimator = load_artifact(model_path)?;
        let model = Self::new(vectorizer, estimator)?;
        info!(
            model = %model_path.display(),
            vectorizer = %vectorizer_path.display(),
            features = model.vectorizer.n_features(),
            "model artifacts loaded"
        );
        Ok(model)
    }

    pub fn score(&self, normalized: &str) -> ClassScores {
        let row = self.vectorizer.transform(normalized);
        self.estimator.predict_proba(&row)
    }
}

fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, SiftError> {
    if !path.exists() {
        return Err(SiftError::Artifact(format!(
            "{} not found",
            path.display()
        )));
    }
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| SiftError::Artifact(format!("{}: {e}", path.display())))
}
