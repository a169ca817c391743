use std::time::Instant;

use uuid::Uuid;

use crate::config;

use super::ddimer;
use super::messages::NarrativeTemplates;
use super::rationale;
use super::resolver;
use super::scores;
use super::summary;
use super::types::{
    Assessment, AssessmentEngine, AssessmentInput, Confidence, DDimerEvaluation, DDimerSample,
    Decision, DecisionSummary, FeatureVector,
};

/// Probability cutoffs for the graded continue-workup explanations.
const MODERATE_PROBABILITY_MAX: f64 = 0.25;
const ELEVATED_PROBABILITY_MAX: f64 = 0.50;

/// Interpret a model probability against the rule-out threshold. Below the
/// threshold the assessment rules out at high confidence; above it the
/// explanation urgency and confidence grade with the probability.
pub fn interpret_probability(probability: f64, threshold: f64) -> DecisionSummary {
    let (decision, explanation, confidence) = if probability < threshold {
        (
            Decision::RuleOut,
            NarrativeTemplates::rule_out_explanation(probability),
            Confidence::High,
        )
    } else if probability < MODERATE_PROBABILITY_MAX {
        (
            Decision::ContinueWorkup,
            NarrativeTemplates::moderate_probability_explanation(probability),
            Confidence::Moderate,
        )
    } else if probability < ELEVATED_PROBABILITY_MAX {
        (
            Decision::ContinueWorkup,
            NarrativeTemplates::elevated_probability_explanation(probability),
            Confidence::High,
        )
    } else {
        (
            Decision::ContinueWorkup,
            NarrativeTemplates::high_probability_explanation(probability),
            Confidence::High,
        )
    };

    DecisionSummary {
        probability,
        threshold,
        decision,
        explanation,
        confidence,
        disclaimer: NarrativeTemplates::disclaimer(),
    }
}

/// Default implementation of the assessment engine.
/// Resolves the raw record once into a feature snapshot, runs the four rule
/// calculators and the D-dimer evaluator over it, then derives the summary,
/// decision, and rationale from the joined results.
pub struct DefaultAssessmentEngine {
    rule_out_threshold: f64,
}

impl DefaultAssessmentEngine {
    pub fn new() -> Self {
        Self {
            rule_out_threshold: config::DEFAULT_RULE_OUT_THRESHOLD,
        }
    }

    pub fn with_threshold(rule_out_threshold: f64) -> Self {
        Self { rule_out_threshold }
    }

    fn evaluate_d_dimer(features: &FeatureVector) -> Option<DDimerEvaluation> {
        let value = features.d_dimer?;
        let sample = DDimerSample {
            value,
            unit: features.d_dimer_unit.clone().unwrap_or_default(),
        };
        Some(ddimer::evaluate(&sample, features.age))
    }
}

impl Default for DefaultAssessmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentEngine for DefaultAssessmentEngine {
    fn assess(&self, input: &AssessmentInput) -> Assessment {
        let start = Instant::now();

        let mut features = resolver::resolve(&input.record);
        // Explicitly supplied values win over whatever the record aliases held.
        if let Some(age) = input.age {
            features.age = Some(age);
        }
        if let Some(sample) = &input.d_dimer {
            features.d_dimer = Some(sample.value);
            features.d_dimer_unit = Some(sample.unit.clone());
        }

        let wells = scores::calculate_wells(&features);
        let geneva = scores::calculate_geneva(&features);
        let perc = scores::calculate_perc(&features);
        let years = scores::calculate_years(&features);
        let d_dimer = Self::evaluate_d_dimer(&features);

        let summary = summary::summarize(&wells, &geneva, &perc, &years);
        let threshold = input.threshold.unwrap_or(self.rule_out_threshold);
        let decision = interpret_probability(input.probability, threshold);
        let signals = rationale::derive_signals(&features, d_dimer.as_ref());
        let rationale = rationale::synthesize(decision.decision.clone(), &summary, &signals);
        let (missing_critical, missing_optional) = resolver::missing_fields(&features);

        let processing_time_ms = start.elapsed().as_millis() as u64;
        let id = Uuid::new_v4();

        tracing::info!(
            assessment_id = %id,
            decision = decision.decision.as_str(),
            wells = wells.risk_band.as_str(),
            geneva = geneva.risk_band.as_str(),
            perc = perc.risk_band.as_str(),
            years = years.risk_band.as_str(),
            missing_critical = missing_critical.len(),
            processing_ms = processing_time_ms,
            "Assessment complete"
        );

        Assessment {
            id,
            features,
            wells,
            geneva,
            perc,
            years,
            d_dimer,
            summary,
            decision,
            rationale,
            missing_critical,
            missing_optional,
            processing_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::assessment::types::{RawRecord, RiskBand};

    fn record_with(pairs: &[(&str, Value)]) -> RawRecord {
        let mut record = RawRecord::new();
        for (key, value) in pairs {
            record.insert(*key, value.clone());
        }
        record
    }

    fn reassuring_record() -> RawRecord {
        record_with(&[
            ("age", Value::from(40)),
            ("triage_hr", Value::from(80)),
            ("triage_rr", Value::from(16)),
            ("triage_o2sat", Value::from(98)),
            ("triage_sbp", Value::from(120)),
            ("hemoptysis", Value::Bool(false)),
            ("estrogen_use", Value::Bool(false)),
            ("prior_pe_dvt", Value::Bool(false)),
            ("unilateral_leg_swelling", Value::Bool(false)),
            ("recent_surgery_trauma", Value::Bool(false)),
            ("d_dimer", Value::from(0.3)),
            ("d_dimer_unit", Value::from("µg/mL")),
        ])
    }

    fn alarming_record() -> RawRecord {
        record_with(&[
            ("age", Value::from(78)),
            ("triage_hr", Value::from(118)),
            ("triage_rr", Value::from(24)),
            ("triage_o2sat", Value::from(89)),
            ("triage_sbp", Value::from(85)),
            ("prior_pe_dvt", Value::Bool(true)),
            ("active_malignancy", Value::Bool(true)),
        ])
    }

    /// Full pipeline on a reassuring record rules out with matching narrative.
    #[test]
    fn engine_rules_out_reassuring_record() {
        let engine = DefaultAssessmentEngine::new();
        let input = AssessmentInput::new(reassuring_record(), 0.03);

        let assessment = engine.assess(&input);

        assert_eq!(assessment.decision.decision, Decision::RuleOut);
        assert_eq!(assessment.decision.confidence, Confidence::High);
        assert!(assessment
            .decision
            .explanation
            .starts_with("Low PE probability (3.0%)"));
        assert_eq!(assessment.wells.risk_band, RiskBand::Low);
        assert_eq!(assessment.geneva.risk_band, RiskBand::Low);
        assert_eq!(assessment.perc.risk_band, RiskBand::Negative);
        assert_eq!(
            assessment.summary.narrative_fragment.as_deref(),
            Some("Wells low-risk and Geneva low")
        );
        assert_eq!(
            assessment.rationale,
            "Low-risk presentation with normal oxygenation. Wells low-risk and Geneva low."
        );
        let d_dimer = assessment.d_dimer.expect("record carried a d_dimer");
        assert!(!d_dimer.is_elevated);
        assert!(
            assessment.missing_critical.is_empty(),
            "all critical vitals were present: {:?}",
            assessment.missing_critical
        );
        assert!(!assessment
            .missing_optional
            .contains(&"d_dimer".to_string()));
    }

    /// High-probability record recommends workup and names concerns.
    #[test]
    fn engine_recommends_workup_for_alarming_record() {
        let engine = DefaultAssessmentEngine::new();
        let input = AssessmentInput::new(alarming_record(), 0.42);

        let assessment = engine.assess(&input);

        assert_eq!(assessment.decision.decision, Decision::ContinueWorkup);
        assert!(assessment
            .decision
            .explanation
            .starts_with("Elevated PE probability (42.0%)"));
        assert_eq!(assessment.geneva.risk_band, RiskBand::High);
        assert!(assessment.summary.any_high_risk);
        assert_eq!(
            assessment.summary.narrative_fragment.as_deref(),
            Some("high Geneva")
        );
        assert_eq!(
            assessment.rationale,
            "Elevated risk due to hypoxia and tachycardia with high Geneva. Further workup recommended."
        );
        assert_eq!(assessment.perc.display_label.as_deref(), Some("0/8"));
    }

    /// Explicitly supplied D-dimer sample wins over the record alias.
    #[test]
    fn engine_prefers_explicit_ddimer_sample() {
        let engine = DefaultAssessmentEngine::new();
        let record = record_with(&[
            ("d_dimer", Value::from(900)),
            ("d_dimer_unit", Value::from("ng/mL")),
        ]);
        let mut input = AssessmentInput::new(record, 0.03);
        input.d_dimer = Some(DDimerSample {
            value: 0.3,
            unit: "µg/mL".to_string(),
        });

        let assessment = engine.assess(&input);
        let d_dimer = assessment.d_dimer.expect("sample was supplied");
        assert_eq!(d_dimer.raw_value, 0.3);
        assert!(!d_dimer.is_elevated);
    }

    /// Threshold override shifts the rule-out boundary for one run.
    #[test]
    fn engine_threshold_override_shifts_decision() {
        let engine = DefaultAssessmentEngine::new();
        let mut input = AssessmentInput::new(reassuring_record(), 0.15);

        let default_run = engine.assess(&input);
        assert_eq!(default_run.decision.decision, Decision::ContinueWorkup);

        input.threshold = Some(0.20);
        let widened_run = engine.assess(&input);
        assert_eq!(widened_run.decision.decision, Decision::RuleOut);
        assert_eq!(widened_run.decision.threshold, 0.20);
    }

    /// An empty record still yields a complete, non-reassuring assessment.
    #[test]
    fn engine_survives_empty_record() {
        let engine = DefaultAssessmentEngine::new();
        let input = AssessmentInput::new(RawRecord::new(), 0.03);

        let assessment = engine.assess(&input);

        assert_eq!(assessment.wells.risk_band, RiskBand::Unknown);
        assert_eq!(assessment.geneva.risk_band, RiskBand::Unknown);
        assert_eq!(assessment.perc.risk_band, RiskBand::Unknown);
        assert_eq!(assessment.years.risk_band, RiskBand::Unknown);
        assert!(assessment.d_dimer.is_none());
        assert_eq!(
            assessment.rationale,
            "Low-risk clinical presentation. No high-risk features identified."
        );
        assert_eq!(assessment.missing_critical.len(), 5);
    }

    /// Probability tiers grade the explanation and confidence.
    #[test]
    fn probability_tiers_grade_explanation() {
        let ruled_out = interpret_probability(0.05, 0.10);
        assert_eq!(ruled_out.decision, Decision::RuleOut);
        assert_eq!(ruled_out.confidence, Confidence::High);

        let moderate = interpret_probability(0.15, 0.10);
        assert_eq!(moderate.decision, Decision::ContinueWorkup);
        assert_eq!(moderate.confidence, Confidence::Moderate);
        assert!(moderate
            .explanation
            .starts_with("Moderate PE probability (15.0%)"));

        let elevated = interpret_probability(0.30, 0.10);
        assert_eq!(elevated.confidence, Confidence::High);
        assert!(elevated
            .explanation
            .starts_with("Elevated PE probability (30.0%)"));

        let high = interpret_probability(0.75, 0.10);
        assert!(high.explanation.starts_with("High PE probability (75.0%)"));
        assert_eq!(high.disclaimer, NarrativeTemplates::disclaimer());
    }

    /// Processing time and a fresh id are recorded on every run.
    #[test]
    fn engine_records_time_and_unique_id() {
        let engine = DefaultAssessmentEngine::new();
        let input = AssessmentInput::new(RawRecord::new(), 0.03);

        let first = engine.assess(&input);
        let second = engine.assess(&input);

        assert!(first.processing_time_ms < 1000);
        assert_ne!(first.id, second.id);
    }
}
