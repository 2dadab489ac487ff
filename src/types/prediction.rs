use std::fmt;

use serde::{Deserialize, Serialize};

/// Stored and returned label of a classified posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Fake Job")]
    Fake,
    #[serde(rename = "Real Job")]
    Real,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Fake => "Fake Job",
            Verdict::Real => "Real Job",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Fake Job" => Some(Verdict::Fake),
            "Real Job" => Some(Verdict::Real),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output: label plus max class probability as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: Verdict,
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub text: String,
}
