//! Metric aggregation and indicator counting.
//!
//! This module reduces raw per-trial measurements into summary statistics
//! and evaluates the fixed clinical thresholds used by the quick analysis.

use crate::models::{FinalReportRequest, QuickAnalysisRequest, Scores};
use std::fmt;
use thiserror::Error;

/// Questionnaire score above which hyperactivity counts as an indicator.
pub const HYPERACTIVITY_THRESHOLD: u32 = 14;
/// Average reaction time (ms) above which it counts as an indicator.
pub const REACTION_TIME_THRESHOLD_MS: f64 = 400.0;
/// Misses or false clicks above which attention counts as an indicator.
pub const ATTENTION_ERROR_THRESHOLD: u32 = 4;
/// Memory level below which memory counts as an indicator.
pub const MEMORY_LEVEL_THRESHOLD: u32 = 4;

/// Errors produced while aggregating measurements.
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("invalid input: sample {index} is not a finite number")]
    NonFinite { index: usize },
}

/// Arithmetic mean, 0 for an empty sequence.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Sequences shorter than two samples have no spread and yield 0.
pub fn stdev(xs: &[f64]) -> Result<f64, AggregateError> {
    if let Some(index) = xs.iter().position(|x| !x.is_finite()) {
        return Err(AggregateError::NonFinite { index });
    }

    if xs.len() < 2 {
        return Ok(0.0);
    }

    let m = mean(xs);
    let sum_sq: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    Ok((sum_sq / (xs.len() - 1) as f64).sqrt())
}

/// Outcome of each threshold test of the quick analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indicators {
    pub hyperactivity: bool,
    pub reaction_time: bool,
    pub attention: bool,
    pub memory: bool,
}

impl Indicators {
    /// Number of threshold tests that fired.
    pub fn count(&self) -> usize {
        [
            self.hyperactivity,
            self.reaction_time,
            self.attention,
            self.memory,
        ]
        .into_iter()
        .filter(|&fired| fired)
        .count()
    }
}

/// Evaluate the fixed threshold tests against a submission.
pub fn evaluate_indicators(data: &QuickAnalysisRequest) -> Indicators {
    Indicators {
        hyperactivity: data.hyperactivity_score > HYPERACTIVITY_THRESHOLD,
        reaction_time: data.avg_reaction_time > REACTION_TIME_THRESHOLD_MS,
        attention: data.attention_misses > ATTENTION_ERROR_THRESHOLD
            || data.attention_false_clicks > ATTENTION_ERROR_THRESHOLD,
        memory: data.memory_score < MEMORY_LEVEL_THRESHOLD,
    }
}

/// Count how many indicators a submission triggers (0-4).
pub fn count_indicators(data: &QuickAnalysisRequest) -> usize {
    evaluate_indicators(data).count()
}

/// Strength of the correlation with ADHD-associated patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CorrelationTier {
    /// 0 or 1 indicator
    Low,
    /// 2 indicators
    Moderate,
    /// 3 or 4 indicators
    Strong,
}

impl CorrelationTier {
    pub fn from_indicator_count(count: usize) -> Self {
        match count {
            0 | 1 => CorrelationTier::Low,
            2 => CorrelationTier::Moderate,
            _ => CorrelationTier::Strong,
        }
    }
}

impl fmt::Display for CorrelationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationTier::Low => write!(f, "Low Correlation"),
            CorrelationTier::Moderate => write!(f, "Moderate Correlation"),
            CorrelationTier::Strong => write!(f, "Strong Correlation"),
        }
    }
}

/// Reduce a final report submission to its derived scores.
pub fn compute_scores(data: &FinalReportRequest) -> Result<Scores, AggregateError> {
    Ok(Scores {
        variability: stdev(&data.reaction_times)?,
        memory: data.memory_score,
        stroop: data.stroop_score,
        time_diff: data.time_diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(
        hyper: u32,
        rt: f64,
        misses: u32,
        false_clicks: u32,
        memory: u32,
    ) -> QuickAnalysisRequest {
        QuickAnalysisRequest {
            hyperactivity_score: hyper,
            avg_reaction_time: rt,
            attention_misses: misses,
            attention_false_clicks: false_clicks,
            memory_score: memory,
        }
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[300.0, 400.0, 500.0]), 400.0);
    }

    #[test]
    fn test_stdev_short_sequences_are_zero() {
        assert_eq!(stdev(&[]), Ok(0.0));
        assert_eq!(stdev(&[512.0]), Ok(0.0));
    }

    #[test]
    fn test_stdev_is_sample_standard_deviation() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0_f64 / 7.0).sqrt();
        let actual = stdev(&xs).unwrap();
        assert!((actual - expected).abs() < 1e-12);

        // Two samples 400 apart: sqrt(2 * 200^2 / 1)
        let pair = stdev(&[100.0, 500.0]).unwrap();
        assert!((pair - 80_000_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_stdev_rejects_non_finite() {
        assert_eq!(
            stdev(&[300.0, f64::NAN, 310.0]),
            Err(AggregateError::NonFinite { index: 1 })
        );
        assert!(stdev(&[f64::INFINITY]).is_err());
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Every value sits exactly on its threshold
        let on_threshold = quick(14, 400.0, 4, 4, 4);
        assert_eq!(count_indicators(&on_threshold), 0);

        let over = quick(15, 400.1, 5, 0, 3);
        let indicators = evaluate_indicators(&over);
        assert!(indicators.hyperactivity);
        assert!(indicators.reaction_time);
        assert!(indicators.attention);
        assert!(indicators.memory);
        assert_eq!(indicators.count(), 4);
    }

    #[test]
    fn test_attention_is_a_single_indicator() {
        let both = quick(0, 0.0, 9, 9, 10);
        assert_eq!(count_indicators(&both), 1);

        let false_clicks_only = quick(0, 0.0, 0, 5, 10);
        assert!(evaluate_indicators(&false_clicks_only).attention);
    }

    #[test]
    fn test_indicator_count_is_monotonic() {
        let base = quick(10, 300.0, 1, 1, 6);
        let mut previous = count_indicators(&base);

        let steps: [fn(&mut QuickAnalysisRequest); 5] = [
            |d: &mut QuickAnalysisRequest| d.hyperactivity_score = 20,
            |d: &mut QuickAnalysisRequest| d.avg_reaction_time = 650.0,
            |d: &mut QuickAnalysisRequest| d.attention_false_clicks = 12,
            |d: &mut QuickAnalysisRequest| d.attention_misses = 12,
            |d: &mut QuickAnalysisRequest| d.memory_score = 1,
        ];

        let mut data = base;
        for step in steps {
            step(&mut data);
            let current = count_indicators(&data);
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn test_correlation_tier_selection() {
        assert_eq!(CorrelationTier::from_indicator_count(0), CorrelationTier::Low);
        assert_eq!(CorrelationTier::from_indicator_count(1), CorrelationTier::Low);
        assert_eq!(
            CorrelationTier::from_indicator_count(2),
            CorrelationTier::Moderate
        );
        assert_eq!(CorrelationTier::from_indicator_count(3), CorrelationTier::Strong);
        assert_eq!(CorrelationTier::from_indicator_count(4), CorrelationTier::Strong);
        assert_eq!(CorrelationTier::Moderate.to_string(), "Moderate Correlation");
    }

    #[test]
    fn test_compute_scores() {
        let data = FinalReportRequest {
            reaction_times: vec![250.0, 350.0],
            memory_score: 5,
            stroop_score: Some(92.0),
            time_diff: Some(-0.4),
            audio_analysis: None,
        };

        let scores = compute_scores(&data).unwrap();
        assert!((scores.variability - 5_000_f64.sqrt()).abs() < 1e-9);
        assert_eq!(scores.memory, 5);
        assert_eq!(scores.stroop, Some(92.0));
        assert_eq!(scores.time_diff, Some(-0.4));
    }
}
