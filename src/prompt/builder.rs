//! Prompt templates sent to the language model.
//!
//! Each template is a plain function over a typed input record, so a
//! prompt can never be rendered with a field missing.

use crate::analysis::{
    evaluate_indicators, Assessment, Axis, CorrelationTier, ATTENTION_ERROR_THRESHOLD,
    HYPERACTIVITY_THRESHOLD, MEMORY_LEVEL_THRESHOLD, REACTION_TIME_THRESHOLD_MS,
};
use crate::models::{QuickAnalysisRequest, Scores, MAX_HYPERACTIVITY_SCORE};
use chrono::NaiveDate;

/// Conclusion block for 0 or 1 indicator.
pub const LOW_CORRELATION_BLOCK: &str = r#"### Final Conclusion

**Result:** **Low Correlation**

**Interpretation:** Your results do not show a significant pattern of traits commonly associated with ADHD. While everyone can have moments of distraction or impulsivity, your performance across these tests largely falls within a typical range."#;

/// Conclusion block for 2 indicators.
pub const MODERATE_CORRELATION_BLOCK: &str = r#"### Final Conclusion

**Result:** **Moderate Correlation**

**Interpretation:** Your results show a mixed pattern. While you performed within the typical range on some tests, a couple of areas showed traits that are sometimes associated with ADHD. This could suggest a specific area of challenge, such as impulsivity or inattention, rather than a broad pattern."#;

/// Conclusion block for 3 or 4 indicators.
pub const STRONG_CORRELATION_BLOCK: &str = r#"### Final Conclusion

**Result:** **Strong Correlation**

**Interpretation:** Your results show a strong correlation with patterns of traits commonly seen in individuals with ADHD, particularly in the areas of inattention, impulsivity, or memory. This is a significant finding, and **it is strongly recommended that you share and discuss these results with a doctor or mental health professional.** They can provide a proper evaluation and guidance."#;

/// Rule repeated at the top of every prompt.
const NO_DIAGNOSIS_RULE: &str = r#"**YOUR MOST IMPORTANT RULE: YOU MUST NOT DIAGNOSE THE USER. NEVER USE THE PHRASES "YOU HAVE ADHD" or "YOU DO NOT HAVE ADHD".**"#;

/// Placeholder used in the final report when no speech analysis is available.
pub const NO_AUDIO_ANALYSIS: &str = "No speech sample was analyzed.";

/// The verbatim conclusion block for a correlation tier.
pub fn conclusion_block(tier: CorrelationTier) -> &'static str {
    match tier {
        CorrelationTier::Low => LOW_CORRELATION_BLOCK,
        CorrelationTier::Moderate => MODERATE_CORRELATION_BLOCK,
        CorrelationTier::Strong => STRONG_CORRELATION_BLOCK,
    }
}

fn marker(fired: bool) -> &'static str {
    if fired {
        "INDICATOR"
    } else {
        "within typical range"
    }
}

/// Build the quick classification prompt for `POST /analyze`.
pub fn quick_analysis_prompt(data: &QuickAnalysisRequest) -> String {
    let indicators = evaluate_indicators(data);
    let tier = CorrelationTier::from_indicator_count(indicators.count());

    let mut prompt = String::new();

    prompt.push_str(
        "You are an analytical assistant for the \"ADHD Insight\" cognitive screening project.\n\n",
    );
    prompt.push_str(NO_DIAGNOSIS_RULE);
    prompt.push_str("\n\n");
    prompt.push_str(
        "Your task is to present the user's test results in two parts: a Markdown table and a final conclusion.\n\n",
    );

    prompt.push_str("**User's Data:**\n");
    prompt.push_str(&format!(
        "- Questionnaire Score: {} out of {}. (Score > {} is an indicator: {}).\n",
        data.hyperactivity_score,
        MAX_HYPERACTIVITY_SCORE,
        HYPERACTIVITY_THRESHOLD,
        marker(indicators.hyperactivity)
    ));
    prompt.push_str(&format!(
        "- Avg Reaction Time: {:.0} ms. (Time > {:.0}ms is an indicator: {}).\n",
        data.avg_reaction_time,
        REACTION_TIME_THRESHOLD_MS,
        marker(indicators.reaction_time)
    ));
    prompt.push_str(&format!(
        "- Attention Test: {} Misses, {} False Clicks. (Misses > {t} or False Clicks > {t} is an indicator: {}).\n",
        data.attention_misses,
        data.attention_false_clicks,
        marker(indicators.attention),
        t = ATTENTION_ERROR_THRESHOLD,
    ));
    prompt.push_str(&format!(
        "- Visual Memory Score: Reached level {}. (Score < {} is an indicator: {}).\n",
        data.memory_score,
        MEMORY_LEVEL_THRESHOLD,
        marker(indicators.memory)
    ));
    prompt.push_str(&format!(
        "- Indicators present: {} of 4.\n\n",
        indicators.count()
    ));

    prompt.push_str("**OUTPUT INSTRUCTIONS:**\n\n");
    prompt.push_str("**Part 1: The Table**\n");
    prompt.push_str(
        "Create a Markdown table with the columns \"Test Area\", \"Your Result\", and \"Brief Insight\", one row per test above.\n\n",
    );
    prompt.push_str("**Part 2: The Final Conclusion**\n");
    prompt.push_str(
        "After the table, output the following conclusion block verbatim. Do not change, shorten, or add to it.\n\n",
    );
    prompt.push_str("---\n");
    prompt.push_str(conclusion_block(tier));
    prompt.push_str("\n---\n\n");
    prompt.push_str("Now generate the complete response (table and conclusion block) for the user's data.\n");

    prompt
}

/// Build the short speech-pattern observation prompt for `POST /analyze_audio`.
pub fn audio_analysis_prompt() -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are assisting the \"ADHD Insight\" cognitive screening project. The attached audio is a short speech sample recorded by the user.\n\n",
    );
    prompt.push_str(NO_DIAGNOSIS_RULE);
    prompt.push_str("\n\n");
    prompt.push_str("Listen to the recording and describe observable speech patterns only:\n");
    prompt.push_str("- Speech rate (slow, typical, rapid) and whether it changes.\n");
    prompt.push_str("- Pauses, hesitations, and filler words.\n");
    prompt.push_str("- Topic shifts, interruptions of their own sentences, or incomplete thoughts.\n");
    prompt.push_str("- Overall fluency and coherence.\n\n");
    prompt.push_str(
        "Answer in 3 to 5 short bullet points followed by one neutral summary sentence. Do not speculate about causes. If the audio is silent or unintelligible, say so in one sentence.\n",
    );

    prompt
}

/// Input for the structured report prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalReportInput {
    pub scores: Scores,
    pub assessment: Assessment,
    /// Output of the earlier audio analysis, if any.
    pub audio_analysis: Option<String>,
    pub report_date: NaiveDate,
}

fn optional_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, unit),
        None => "not measured".to_string(),
    }
}

/// Build the structured clinical-style report prompt for `POST /final_report`.
pub fn final_report_prompt(input: &FinalReportInput) -> String {
    let scores = &input.scores;
    let assessment = &input.assessment;
    let audio = input
        .audio_analysis
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_AUDIO_ANALYSIS);

    let mut prompt = String::new();

    prompt.push_str(
        "You are writing a structured neurocognitive screening summary for the \"ADHD Insight\" project.\n\n",
    );
    prompt.push_str(NO_DIAGNOSIS_RULE);
    prompt.push_str("\n\n");

    prompt.push_str("**Measured Data:**\n");
    prompt.push_str(&format!(
        "- Reaction time variability (standard deviation): {:.1} ms. Status: {}.\n",
        scores.variability, assessment.variability
    ));
    prompt.push_str(&format!(
        "- Visual working memory: level {}. Status: {}.\n",
        scores.memory, assessment.memory
    ));
    prompt.push_str(&format!(
        "- Stroop accuracy: {}. Status: {}.\n",
        optional_value(scores.stroop, "%"),
        assessment.stroop
    ));
    prompt.push_str(&format!(
        "- Time perception deviation: {}. Status: {}.\n",
        optional_value(scores.time_diff, " s"),
        assessment.time_diff
    ));
    prompt.push_str(&format!("- Speech observation: {}\n\n", audio));

    prompt.push_str("**OUTPUT INSTRUCTIONS:**\n\n");
    prompt.push_str("Write the report in Markdown using exactly these section headers, in this order:\n\n");
    prompt.push_str("# Neurocognitive Screening Report\n");
    prompt.push_str(&format!("**Date:** {}\n\n", input.report_date.format("%Y-%m-%d")));
    prompt.push_str("## 1. Summary of Findings\n");
    prompt.push_str(&format!(
        "Two or three sentences. {} of 4 areas were flagged as Borderline or worse.\n\n",
        assessment.flagged_count()
    ));
    prompt.push_str("## 2. Domain Analysis\n");
    prompt.push_str("One bullet per area, starting with the area name and its status in bold:\n");
    for status in assessment.all() {
        prompt.push_str(&format!("- **{}** ({}): ", status.axis, status.label()));
        prompt.push_str(axis_instruction(status.axis));
        prompt.push('\n');
    }
    prompt.push('\n');
    prompt.push_str("## 3. Speech Pattern Observations\n");
    prompt.push_str(
        "Summarize the speech observation above in two sentences. If no speech sample was analyzed, state that.\n\n",
    );
    prompt.push_str("## 4. Recommendations\n");
    prompt.push_str(
        "Two to four practical, non-medical suggestions. If any area is flagged, recommend discussing the results with a qualified healthcare professional.\n\n",
    );
    prompt.push_str("## 5. Disclaimer\n");
    prompt.push_str(
        "State that this is a screening aid based on short online tasks and not a medical diagnosis.\n\n",
    );
    prompt.push_str("Use the status labels exactly as given. Do not invent measurements.\n");

    prompt
}

fn axis_instruction(axis: Axis) -> &'static str {
    match axis {
        Axis::Variability => {
            "explain what inconsistent reaction times can reflect about sustained attention."
        }
        Axis::Memory => "relate the level reached to short-term visual memory capacity.",
        Axis::Stroop => "describe what the accuracy suggests about inhibitory control.",
        Axis::TimePerception => {
            "describe whether the user tends to over- or under-estimate intervals."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::assess;

    fn quick(hyper: u32, rt: f64, memory: u32) -> QuickAnalysisRequest {
        QuickAnalysisRequest {
            hyperactivity_score: hyper,
            avg_reaction_time: rt,
            attention_misses: 0,
            attention_false_clicks: 0,
            memory_score: memory,
        }
    }

    fn report_input(audio: Option<&str>) -> FinalReportInput {
        let scores = Scores {
            variability: 200.0,
            memory: 2,
            stroop: None,
            time_diff: Some(3.5),
        };
        FinalReportInput {
            scores,
            assessment: assess(&scores),
            audio_analysis: audio.map(String::from),
            report_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        }
    }

    #[test]
    fn test_quick_prompt_selects_low_block() {
        for data in [quick(5, 300.0, 8), quick(20, 300.0, 8)] {
            let prompt = quick_analysis_prompt(&data);
            assert!(prompt.contains(LOW_CORRELATION_BLOCK));
            assert!(!prompt.contains("Moderate Correlation"));
            assert!(!prompt.contains("Strong Correlation"));
        }
    }

    #[test]
    fn test_quick_prompt_selects_moderate_block() {
        let prompt = quick_analysis_prompt(&quick(20, 450.0, 8));
        assert!(prompt.contains(MODERATE_CORRELATION_BLOCK));
        assert!(!prompt.contains("**Result:** **Low Correlation**"));
        assert!(!prompt.contains("**Result:** **Strong Correlation**"));
    }

    #[test]
    fn test_quick_prompt_selects_strong_block() {
        for data in [quick(20, 450.0, 2), quick(20, 450.0, 8)] {
            let mut data = data;
            data.attention_misses = 7;
            let prompt = quick_analysis_prompt(&data);
            assert!(prompt.contains(STRONG_CORRELATION_BLOCK));
            assert!(!prompt.contains("**Result:** **Moderate Correlation**"));
        }
    }

    #[test]
    fn test_quick_prompt_contains_data_and_rule() {
        let prompt = quick_analysis_prompt(&quick(16, 412.6, 3));
        assert!(prompt.contains("16 out of 24"));
        assert!(prompt.contains("413 ms"));
        assert!(prompt.contains("Reached level 3"));
        assert!(prompt.contains("MUST NOT DIAGNOSE"));
        assert!(prompt.contains("Indicators present: 3 of 4"));
    }

    #[test]
    fn test_conclusion_blocks_are_distinct() {
        assert!(conclusion_block(CorrelationTier::Low).contains("**Low Correlation**"));
        assert!(conclusion_block(CorrelationTier::Moderate).contains("**Moderate Correlation**"));
        assert!(conclusion_block(CorrelationTier::Strong).contains("**Strong Correlation**"));
    }

    #[test]
    fn test_audio_prompt() {
        let prompt = audio_analysis_prompt();
        assert!(prompt.contains("speech"));
        assert!(prompt.contains("MUST NOT DIAGNOSE"));
    }

    #[test]
    fn test_final_report_prompt_sections_and_statuses() {
        let prompt = final_report_prompt(&report_input(Some("Rapid speech with frequent pauses.")));

        for header in [
            "# Neurocognitive Screening Report",
            "## 1. Summary of Findings",
            "## 2. Domain Analysis",
            "## 3. Speech Pattern Observations",
            "## 4. Recommendations",
            "## 5. Disclaimer",
        ] {
            assert!(prompt.contains(header), "missing header: {}", header);
        }

        assert!(prompt.contains("**Date:** 2026-10-16"));
        assert!(prompt.contains("200.0 ms. Status: High Variability"));
        assert!(prompt.contains("level 2. Status: Below Average"));
        assert!(prompt.contains("3.5 s. Status: Significant Dyschronometria"));
        assert!(prompt.contains("Stroop accuracy: not measured. Status: Not Measured"));
        assert!(prompt.contains("Rapid speech with frequent pauses."));
        assert!(prompt.contains("3 of 4 areas were flagged"));
    }

    #[test]
    fn test_final_report_prompt_without_audio() {
        let prompt = final_report_prompt(&report_input(None));
        assert!(prompt.contains(NO_AUDIO_ANALYSIS));

        let blank = final_report_prompt(&report_input(Some("   ")));
        assert!(blank.contains(NO_AUDIO_ANALYSIS));
    }
}
