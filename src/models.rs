//! Request and response models for the HTTP API.
//!
//! Field names follow the camelCase JSON sent by the browser test battery.
//! Every record here lives for a single request and is never persisted.

use serde::{Deserialize, Serialize};

/// Highest possible hyperactivity questionnaire score.
pub const MAX_HYPERACTIVITY_SCORE: u32 = 24;

/// Measurements submitted for the quick classification (`POST /analyze`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickAnalysisRequest {
    /// Hyperactivity questionnaire score (0-24).
    pub hyperactivity_score: u32,
    /// Average reaction time in milliseconds.
    pub avg_reaction_time: f64,
    /// Number of targets missed in the attention test.
    pub attention_misses: u32,
    /// Number of clicks on non-targets in the attention test.
    pub attention_false_clicks: u32,
    /// Highest visual memory level reached.
    pub memory_score: u32,
}

impl QuickAnalysisRequest {
    /// Check value ranges that the JSON types alone cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.hyperactivity_score > MAX_HYPERACTIVITY_SCORE {
            return Err(format!(
                "hyperactivityScore must be between 0 and {}",
                MAX_HYPERACTIVITY_SCORE
            ));
        }

        if !self.avg_reaction_time.is_finite() || self.avg_reaction_time < 0.0 {
            return Err("avgReactionTime must be a non-negative number".to_string());
        }

        Ok(())
    }
}

/// Measurements submitted for the structured report (`POST /final_report`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReportRequest {
    /// Raw per-trial reaction times in milliseconds.
    #[serde(default)]
    pub reaction_times: Vec<f64>,
    /// Highest visual memory level reached.
    pub memory_score: u32,
    /// Stroop test accuracy in percent.
    #[serde(default)]
    pub stroop_score: Option<f64>,
    /// Signed time-perception deviation in seconds.
    #[serde(default)]
    pub time_diff: Option<f64>,
    /// Text previously returned by `POST /analyze_audio`.
    #[serde(default)]
    pub audio_analysis: Option<String>,
}

/// Derived scores returned alongside the final report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// Sample standard deviation of the reaction times (ms).
    pub variability: f64,
    /// Visual memory level.
    pub memory: u32,
    /// Stroop accuracy (%), if measured.
    pub stroop: Option<f64>,
    /// Time-perception deviation (s), if measured.
    pub time_diff: Option<f64>,
}

/// Response body of the analysis endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Text produced by the language model, or a placeholder.
    pub analysis: String,
    /// Set when `analysis` is placeholder text rather than model output.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl AnalysisResponse {
    pub fn new(analysis: String) -> Self {
        Self {
            analysis,
            degraded: false,
        }
    }

    /// A placeholder response used when the model output is unavailable.
    pub fn degraded(analysis: impl Into<String>) -> Self {
        Self {
            analysis: analysis.into(),
            degraded: true,
        }
    }
}

/// Response body of `POST /final_report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReportResponse {
    pub markdown_report: String,
    pub scores: Scores,
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
