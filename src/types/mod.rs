pub mod job;
pub mod prediction;

pub use job::{RetrainOutcome, RetrainStatus};
pub use prediction::{PredictRequest, Prediction, Verdict};
