use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::db::PredictionRecord;
use crate::middleware::{AdminApi, AdminPage};
use crate::service::Capability;
use crate::text::truncate_chars;
use crate::types::RetrainStatus;
use crate::{error::SiftError, router::SiftState};

const EXPORT_DESCRIPTION_CHARS: usize = 50;
const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const EXPORT_HEADER: [&str; 5] = ["ID", "Description", "Prediction", "Confidence", "Date"];

#[derive(Debug, Default, Deserialize)]
pub struct RetrainQuery {
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

/// GET /export_logs -> every stored prediction as `results.csv`.
pub async fn export_logs(
    State(state): State<SiftState>,
    AdminPage(session): AdminPage,
) -> Result<Response, SiftError> {
    session.claim.require(Capability::ExportPredictions)?;
    let records = state.predictions.list_predictions().await?;
    let body = predictions_csv(&records)?;
    info!(rows = records.len(), "predictions exported");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=results.csv",
            ),
        ],
        body,
    )
        .into_response())
}

pub fn predictions_csv(records: &[PredictionRecord]) -> Result<Vec<u8>, SiftError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        writer.write_record([
            record.id.to_string(),
            truncate_chars(&record.job_description, EXPORT_DESCRIPTION_CHARS).to_string(),
            record.prediction.to_string(),
            // `{:?}` keeps the decimal point: 66.0, not 66
            format!("{:?}", record.confidence),
            record.timestamp.format(EXPORT_DATE_FORMAT).to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| SiftError::Io(e.into_error()))
}

/// POST /retrain_model -> start the training program.
///
/// Answers 202 with the job status, or with `?wait=true` blocks until the
/// job ends and reports its outcome.
pub async fn retrain_model(
    State(state): State<SiftState>,
    AdminApi(session): AdminApi,
    Query(query): Query<RetrainQuery>,
) -> Result<Response, SiftError> {
    session.claim.require(Capability::TriggerRetrain)?;
    let ticket = state.retrain.start().await?;
    info!(
        username = %session.claim.username,
        job_id = ticket.job_id,
        wait = query.wait,
        "retrain requested"
    );

    if !query.wait {
        return Ok((StatusCode::ACCEPTED, Json(state.retrain.status())).into_response());
    }

    match ticket.wait().await? {
        RetrainStatus::Succeeded { message, .. } => {
            Ok(Json(json!({ "message": message })).into_response())
        }
        RetrainStatus::Failed { error, .. } => Err(SiftError::RetrainFailed(error)),
        other => Err(SiftError::RactorError(format!(
            "retrain ended in unexpected state {}",
            other.label()
        ))),
    }
}

/// GET /retrain_status -> current retrain job status.
pub async fn retrain_status(
    State(state): State<SiftState>,
    AdminApi(session): AdminApi,
) -> Result<Json<RetrainStatus>, SiftError> {
    session.claim.require(Capability::ViewDashboard)?;
    Ok(Json(state.retrain.status()))
}

/// GET /health
pub async fn health(State(state): State<SiftState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.classifier.is_ready().await,
    })
}
