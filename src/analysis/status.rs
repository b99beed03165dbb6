//! Clinical status labels for the final report.

use crate::models::Scores;
use serde::{Serialize, Serializer};
use std::fmt;

/// Reaction-time standard deviation (ms) above which variability is high.
pub const VARIABILITY_HIGH_MS: f64 = 150.0;
/// Reaction-time standard deviation (ms) above which variability is borderline.
pub const VARIABILITY_BORDERLINE_MS: f64 = 100.0;
/// Memory level below which memory is below average.
pub const MEMORY_BELOW_AVERAGE_LEVEL: u32 = 4;
/// Stroop accuracy (%) below which inhibition is below average.
pub const STROOP_BELOW_AVERAGE_PCT: f64 = 70.0;
/// Stroop accuracy (%) below which inhibition is borderline.
pub const STROOP_BORDERLINE_PCT: f64 = 85.0;
/// Absolute time-perception error (s) above which it is significant.
pub const TIME_DIFF_SIGNIFICANT_S: f64 = 2.0;
/// Absolute time-perception error (s) above which it is borderline.
pub const TIME_DIFF_BORDERLINE_S: f64 = 1.0;

/// The measured dimension a status refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Variability,
    Memory,
    Stroop,
    TimePerception,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Variability => write!(f, "Reaction Time Variability"),
            Axis::Memory => write!(f, "Visual Working Memory"),
            Axis::Stroop => write!(f, "Inhibitory Control (Stroop)"),
            Axis::TimePerception => write!(f, "Time Perception"),
        }
    }
}

/// How far a score is from the typical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusLevel {
    NotMeasured,
    Normal,
    Borderline,
    Abnormal,
}

/// Categorical label for one axis of the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClinicalStatus {
    pub axis: Axis,
    pub level: StatusLevel,
}

impl ClinicalStatus {
    pub fn new(axis: Axis, level: StatusLevel) -> Self {
        Self { axis, level }
    }

    /// Human-readable label, worded per axis.
    pub fn label(&self) -> &'static str {
        match (self.axis, self.level) {
            (_, StatusLevel::NotMeasured) => "Not Measured",
            (_, StatusLevel::Borderline) => "Borderline",
            (Axis::Variability, StatusLevel::Normal) => "Stable",
            (Axis::Variability, StatusLevel::Abnormal) => "High Variability",
            (Axis::Memory | Axis::Stroop, StatusLevel::Normal) => "Intact",
            (Axis::Memory | Axis::Stroop, StatusLevel::Abnormal) => "Below Average",
            (Axis::TimePerception, StatusLevel::Normal) => "Accurate",
            (Axis::TimePerception, StatusLevel::Abnormal) => "Significant Dyschronometria",
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.level >= StatusLevel::Borderline
    }
}

impl fmt::Display for ClinicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ClinicalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Per-axis statuses derived from a set of scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub variability: ClinicalStatus,
    pub memory: ClinicalStatus,
    pub stroop: ClinicalStatus,
    pub time_diff: ClinicalStatus,
}

impl Assessment {
    /// Statuses in report order.
    pub fn all(&self) -> [ClinicalStatus; 4] {
        [self.variability, self.memory, self.stroop, self.time_diff]
    }

    pub fn flagged_count(&self) -> usize {
        self.all().iter().filter(|s| s.is_flagged()).count()
    }
}

pub fn variability_status(variability_ms: f64) -> ClinicalStatus {
    let level = if variability_ms > VARIABILITY_HIGH_MS {
        StatusLevel::Abnormal
    } else if variability_ms > VARIABILITY_BORDERLINE_MS {
        StatusLevel::Borderline
    } else {
        StatusLevel::Normal
    };
    ClinicalStatus::new(Axis::Variability, level)
}

pub fn memory_status(level: u32) -> ClinicalStatus {
    let level = match level {
        l if l < MEMORY_BELOW_AVERAGE_LEVEL => StatusLevel::Abnormal,
        l if l == MEMORY_BELOW_AVERAGE_LEVEL => StatusLevel::Borderline,
        _ => StatusLevel::Normal,
    };
    ClinicalStatus::new(Axis::Memory, level)
}

pub fn stroop_status(accuracy_pct: Option<f64>) -> ClinicalStatus {
    let level = match accuracy_pct {
        None => StatusLevel::NotMeasured,
        Some(pct) if pct < STROOP_BELOW_AVERAGE_PCT => StatusLevel::Abnormal,
        Some(pct) if pct < STROOP_BORDERLINE_PCT => StatusLevel::Borderline,
        Some(_) => StatusLevel::Normal,
    };
    ClinicalStatus::new(Axis::Stroop, level)
}

pub fn time_perception_status(deviation_s: Option<f64>) -> ClinicalStatus {
    let level = match deviation_s.map(f64::abs) {
        None => StatusLevel::NotMeasured,
        Some(d) if d > TIME_DIFF_SIGNIFICANT_S => StatusLevel::Abnormal,
        Some(d) if d > TIME_DIFF_BORDERLINE_S => StatusLevel::Borderline,
        Some(_) => StatusLevel::Normal,
    };
    ClinicalStatus::new(Axis::TimePerception, level)
}

/// Compare every score against its fixed thresholds.
pub fn assess(scores: &Scores) -> Assessment {
    Assessment {
        variability: variability_status(scores.variability),
        memory: memory_status(scores.memory),
        stroop: stroop_status(scores.stroop),
        time_diff: time_perception_status(scores.time_diff),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assess_flags_out_of_range_scores() {
        let scores = Scores {
            variability: 200.0,
            memory: 2,
            stroop: Some(60.0),
            time_diff: Some(3.5),
        };

        let assessment = assess(&scores);
        assert_eq!(assessment.variability.label(), "High Variability");
        assert_eq!(assessment.memory.label(), "Below Average");
        assert_eq!(assessment.stroop.label(), "Below Average");
        assert_eq!(assessment.time_diff.label(), "Significant Dyschronometria");
        assert_eq!(assessment.flagged_count(), 4);
    }

    #[test]
    fn test_assess_typical_scores() {
        let scores = Scores {
            variability: 45.0,
            memory: 7,
            stroop: Some(96.0),
            time_diff: Some(-0.3),
        };

        let assessment = assess(&scores);
        assert_eq!(assessment.variability.label(), "Stable");
        assert_eq!(assessment.memory.label(), "Intact");
        assert_eq!(assessment.stroop.label(), "Intact");
        assert_eq!(assessment.time_diff.label(), "Accurate");
        assert_eq!(assessment.flagged_count(), 0);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(variability_status(150.0).level, StatusLevel::Borderline);
        assert_eq!(variability_status(100.0).level, StatusLevel::Normal);
        assert_eq!(memory_status(4).level, StatusLevel::Borderline);
        assert_eq!(stroop_status(Some(70.0)).level, StatusLevel::Borderline);
        assert_eq!(stroop_status(Some(85.0)).level, StatusLevel::Normal);
        assert_eq!(time_perception_status(Some(2.0)).level, StatusLevel::Borderline);
        assert_eq!(time_perception_status(Some(1.0)).level, StatusLevel::Normal);
    }

    #[test]
    fn test_time_deviation_sign_is_ignored() {
        assert_eq!(
            time_perception_status(Some(-3.5)).label(),
            "Significant Dyschronometria"
        );
        assert_eq!(time_perception_status(Some(-1.5)).label(), "Borderline");
    }

    #[test]
    fn test_missing_measurements() {
        assert_eq!(stroop_status(None).label(), "Not Measured");
        assert_eq!(time_perception_status(None).label(), "Not Measured");
        assert!(!stroop_status(None).is_flagged());
    }

    #[test]
    fn test_assessment_serializes_labels() {
        let assessment = assess(&Scores {
            variability: 120.0,
            memory: 5,
            stroop: None,
            time_diff: Some(0.5),
        });

        let json = serde_json::to_value(assessment).unwrap();
        assert_eq!(json["variability"], "Borderline");
        assert_eq!(json["memory"], "Intact");
        assert_eq!(json["stroop"], "Not Measured");
        assert_eq!(json["time_diff"], "Accurate");
    }
}
