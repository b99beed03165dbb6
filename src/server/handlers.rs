//! HTTP request handlers.
//!
//! Each handler is a linear pipeline: parse, aggregate, build the prompt,
//! call the model, respond. Nothing is kept between requests.

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::analysis::{assess, compute_scores, count_indicators};
use crate::models::{
    AnalysisResponse, FinalReportRequest, FinalReportResponse, QuickAnalysisRequest,
};
use crate::prompt::{
    audio_analysis_prompt, final_report_prompt, quick_analysis_prompt, FinalReportInput,
};
use crate::upload::{audio_extension, audio_mime_type};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Multipart field carrying the recording.
pub const AUDIO_FIELD: &str = "audio_data";

/// Returned when the request carried no recording.
pub const NO_AUDIO_PLACEHOLDER: &str =
    "No audio recording was provided, so speech patterns were not analyzed.";

/// Returned when the recording could not be analyzed.
pub const AUDIO_FAILED_PLACEHOLDER: &str =
    "Speech analysis is currently unavailable. The report will be generated without it.";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /analyze`: quick three-tier classification.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<QuickAnalysisRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResponse>> {
    let Json(data) = payload?;
    data.validate().map_err(ApiError::InvalidInput)?;

    info!(
        "Quick analysis requested ({} indicators)",
        count_indicators(&data)
    );

    let prompt = quick_analysis_prompt(&data);
    let analysis = state.client.generate(&prompt, None).await?;

    Ok(Json(AnalysisResponse::new(analysis)))
}

/// A recording pulled out of the multipart body.
struct AudioUpload {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

async fn read_audio_field(mut multipart: Multipart) -> Result<Option<AudioUpload>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(String::from);
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;

        if bytes.is_empty() {
            return Ok(None);
        }

        return Ok(Some(AudioUpload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

/// Store, upload, analyze, and clean up one recording.
async fn run_audio_analysis(state: &AppState, upload: AudioUpload) -> ApiResult<String> {
    let extension = audio_extension(upload.file_name.as_deref());
    let local = state.uploads.persist(&upload.bytes, extension).await?;

    let remote = state
        .client
        .upload_file(local.path(), audio_mime_type(extension))
        .await?;

    let result = state
        .client
        .generate(&audio_analysis_prompt(), Some(&remote))
        .await;

    if let Err(e) = state.client.delete_file(&remote).await {
        warn!("Failed to delete remote file {}: {}", remote.name, e);
    }

    Ok(result?)
}

/// `POST /analyze_audio`: short speech-pattern observation.
///
/// Speech analysis feeds the final report and never fails the request:
/// problems yield a placeholder with `degraded` set.
pub async fn analyze_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<AnalysisResponse> {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            info!("Audio request is not multipart: {}", rejection.body_text());
            return Json(AnalysisResponse::degraded(NO_AUDIO_PLACEHOLDER));
        }
    };

    // A body that fails to read (truncated, over the size limit) did carry a recording.
    let upload = match read_audio_field(multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            info!("No audio recording in request");
            return Json(AnalysisResponse::degraded(NO_AUDIO_PLACEHOLDER));
        }
        Err(reason) => {
            warn!("Could not read audio upload: {}", reason);
            return Json(AnalysisResponse::degraded(AUDIO_FAILED_PLACEHOLDER));
        }
    };

    debug!("Received {} bytes of audio", upload.bytes.len());

    match run_audio_analysis(&state, upload).await {
        Ok(analysis) => Json(AnalysisResponse::new(analysis)),
        Err(e) => {
            match &e {
                ApiError::Service(cause) => warn!("Audio analysis failed: {}", cause),
                ApiError::Storage(cause) => warn!("Audio analysis failed: {}", cause),
                other => warn!("Audio analysis failed: {}", other),
            }
            Json(AnalysisResponse::degraded(AUDIO_FAILED_PLACEHOLDER))
        }
    }
}

/// `POST /final_report`: structured report plus derived scores.
pub async fn final_report(
    State(state): State<AppState>,
    payload: Result<Json<FinalReportRequest>, JsonRejection>,
) -> ApiResult<Json<FinalReportResponse>> {
    let Json(data) = payload?;

    let scores = compute_scores(&data)?;
    let assessment = assess(&scores);

    info!(
        "Final report requested ({} reaction times, {} areas flagged)",
        data.reaction_times.len(),
        assessment.flagged_count()
    );

    let input = FinalReportInput {
        scores,
        assessment,
        audio_analysis: data.audio_analysis,
        report_date: Utc::now().date_naive(),
    };

    let markdown_report = state
        .client
        .generate(&final_report_prompt(&input), None)
        .await?;

    Ok(Json(FinalReportResponse {
        markdown_report,
        scores,
    }))
}
