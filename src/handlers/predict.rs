use axum::{Json, extract::State};
use tracing::debug;

use crate::types::{PredictRequest, Prediction};
use crate::{error::SiftError, router::SiftState};

/// POST /predict -> normalize, classify, persist, answer `{prediction, confidence}`.
pub async fn predict(
    State(state): State<SiftState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<Prediction>, SiftError> {
    let prediction = state.classifier.classify(&request.text).await?;
    let id = state
        .predictions
        .insert(&request.text, prediction.prediction, prediction.confidence)
        .await?;
    debug!(
        id,
        prediction = %prediction.prediction,
        confidence = prediction.confidence,
        "prediction stored"
    );
    Ok(Json(prediction))
}
