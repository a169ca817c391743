use super::ddimer;
use super::messages::NarrativeTemplates;
use super::types::{DDimerEvaluation, Decision, FeatureVector, ScoreSummary};

const CONCERN_HYPOXIA: &str = "hypoxia";
const CONCERN_TACHYCARDIA: &str = "tachycardia";
const CONCERN_INSTABILITY: &str = "hemodynamic instability";
const CONCERN_PRIOR_VTE: &str = "prior VTE";
const CONCERN_ELEVATED_DDIMER: &str = "elevated D-dimer";
const CONCERN_MALIGNANCY: &str = "active malignancy";
const CONCERN_RECENT_SURGERY: &str = "recent surgery";

const REASSURANCE_OXYGENATION: &str = "normal oxygenation";
const REASSURANCE_DDIMER: &str = "normal D-dimer";

/// Fallback phrase when a workup is recommended with no nameable concern.
const DEFAULT_CONCERN_PHRASE: &str = "clinical features";

const SPO2_NORMAL_MIN: f64 = 95.0;
const TACHYCARDIA_HR: f64 = 100.0;
const HYPOTENSION_SBP: f64 = 90.0;
const SHOCK_INDEX_LIMIT: f64 = 1.0;

/// Qualitative tokens derived from the vitals and flags, each list in its
/// fixed derivation order. Order matters: the synthesizer only ever names
/// the first one or two entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClinicalSignals {
    pub concerns: Vec<&'static str>,
    pub reassurances: Vec<&'static str>,
}

/// Derive concern and reassurance tokens. A missing measurement contributes
/// to neither list. The D-dimer comparison uses the fixed 0.5 cutoff on the
/// normalized value, not the age-adjusted one.
pub fn derive_signals(
    features: &FeatureVector,
    d_dimer: Option<&DDimerEvaluation>,
) -> ClinicalSignals {
    let mut signals = ClinicalSignals::default();

    if let Some(spo2) = features.spo2 {
        if spo2 < SPO2_NORMAL_MIN {
            signals.concerns.push(CONCERN_HYPOXIA);
        } else {
            signals.reassurances.push(REASSURANCE_OXYGENATION);
        }
    }

    if let Some(hr) = features.heart_rate {
        if hr > TACHYCARDIA_HR {
            signals.concerns.push(CONCERN_TACHYCARDIA);
        }
    }

    let hypotensive = features.sbp.map_or(false, |sbp| sbp < HYPOTENSION_SBP);
    let shocked = features
        .shock_index()
        .map_or(false, |index| index > SHOCK_INDEX_LIMIT);
    if hypotensive || shocked {
        signals.concerns.push(CONCERN_INSTABILITY);
    }

    if features.prior_pe_dvt.is_met() {
        signals.concerns.push(CONCERN_PRIOR_VTE);
    }

    if let Some(evaluation) = d_dimer {
        if evaluation.normalized_value > ddimer::FIXED_THRESHOLD {
            signals.concerns.push(CONCERN_ELEVATED_DDIMER);
        } else {
            signals.reassurances.push(REASSURANCE_DDIMER);
        }
    }

    if features.malignancy.is_met() {
        signals.concerns.push(CONCERN_MALIGNANCY);
    }

    let surgery_signal = features
        .surgery_or_fracture
        .or(features.recent_surgery_trauma)
        .or(features.immobilization_or_surgery);
    if surgery_signal.is_met() {
        signals.concerns.push(CONCERN_RECENT_SURGERY);
    }

    signals
}

/// Compose the single display sentence for a decision. Every branch of the
/// table below has a fallback phrase, so this is total over its inputs.
///
/// The summary fragment is only consumed when it points the same way as the
/// decision: a rule-out sentence never quotes a high-risk fragment, and a
/// workup sentence never quotes a low-risk one.
pub fn synthesize(
    decision: Decision,
    summary: &ScoreSummary,
    signals: &ClinicalSignals,
) -> String {
    match decision {
        Decision::RuleOut => {
            let base = match signals.reassurances.first() {
                Some(reassurance) => NarrativeTemplates::low_risk_with(reassurance),
                None => NarrativeTemplates::low_risk_plain(),
            };
            let reassuring_fragment = summary.wells_low || summary.perc_negative;
            let suffix = match (
                &summary.narrative_fragment,
                reassuring_fragment,
                signals.concerns.first(),
            ) {
                (Some(fragment), true, _) => NarrativeTemplates::fragment_suffix(fragment),
                (_, _, None) => NarrativeTemplates::no_high_risk_suffix(),
                (_, _, Some(concern)) => NarrativeTemplates::despite_suffix(concern),
            };
            format!("{base}{suffix}")
        }
        Decision::ContinueWorkup => {
            let concern_phrase = if signals.concerns.is_empty() {
                DEFAULT_CONCERN_PHRASE.to_string()
            } else {
                signals.concerns[..signals.concerns.len().min(2)].join(" and ")
            };
            match (&summary.narrative_fragment, summary.any_high_risk) {
                (Some(fragment), true) => {
                    NarrativeTemplates::elevated_risk_with(&concern_phrase, fragment)
                }
                _ => NarrativeTemplates::elevated_risk(&concern_phrase),
            }
        }
    }
}
