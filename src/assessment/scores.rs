use super::ddimer;
use super::types::{FeatureVector, RiskBand, ScoreCriterion, ScoreResult, TriState};

pub const WELLS_RULE: &str = "Wells";
pub const GENEVA_RULE: &str = "Revised Geneva";
pub const PERC_RULE: &str = "PERC";
pub const YEARS_RULE: &str = "YEARS";

/// Band cutoffs, inclusive upper bounds. Clinical guideline values, fixed.
const WELLS_LOW_MAX: f64 = 2.0;
const WELLS_MODERATE_MAX: f64 = 6.0;
const GENEVA_LOW_MAX: f64 = 3.0;
const GENEVA_MODERATE_MAX: f64 = 10.0;

/// PERC verdicts need at least this many documented criteria.
const PERC_MIN_KNOWN: usize = 4;

/// YEARS D-dimer cutoffs in µg/mL: standard when any criterion is met,
/// strict when none are.
const YEARS_DDIMER_STANDARD: f64 = 0.5;
const YEARS_DDIMER_STRICT: f64 = 1.0;

fn criterion(name: &str, weight: f64, status: TriState) -> ScoreCriterion {
    ScoreCriterion {
        name: name.to_string(),
        weight,
        status,
        evidence_text: None,
    }
}

/// Criterion derived from a measurement: status is documented whenever the
/// measurement exists, and the literal reading is kept as evidence.
fn numeric_criterion(
    name: &str,
    weight: f64,
    measured: Option<f64>,
    evidence_label: &str,
    met: impl Fn(f64) -> bool,
) -> ScoreCriterion {
    match measured {
        Some(value) => ScoreCriterion {
            name: name.to_string(),
            weight,
            status: TriState::Present(met(value)),
            evidence_text: Some(format!("{evidence_label}: {value}")),
        },
        None => criterion(name, weight, TriState::Unknown),
    }
}

fn met_weight_sum(criteria: &[ScoreCriterion]) -> f64 {
    criteria
        .iter()
        .filter(|c| c.status.is_met())
        .map(|c| c.weight)
        .sum()
}

fn all_unknown(criteria: &[ScoreCriterion]) -> bool {
    criteria.iter().all(|c| !c.status.is_known())
}

// ---------------------------------------------------------------------------
// Wells
// ---------------------------------------------------------------------------

/// Wells pretest-probability score, 0–12.5. An undocumented criterion adds
/// nothing to the sum but stays `Unknown` on the criterion line for display.
pub fn calculate_wells(features: &FeatureVector) -> ScoreResult {
    let criteria = vec![
        criterion("Clinical signs of DVT", 3.0, features.dvt_signs),
        criterion("PE most likely diagnosis", 3.0, features.pe_most_likely),
        numeric_criterion("Heart rate > 100", 1.5, features.heart_rate, "HR", |hr| hr > 100.0),
        criterion(
            "Immobilization or recent surgery",
            1.5,
            features.immobilization_or_surgery,
        ),
        criterion("Previous PE or DVT", 1.5, features.prior_pe_dvt),
        criterion("Hemoptysis", 1.0, features.hemoptysis),
        criterion("Active malignancy", 1.0, features.malignancy),
    ];

    if all_unknown(&criteria) {
        return ScoreResult::not_computable(WELLS_RULE, criteria);
    }

    let value = met_weight_sum(&criteria);
    let (risk_band, abnormal_explanation) = if value <= WELLS_LOW_MAX {
        (RiskBand::Low, None)
    } else if value <= WELLS_MODERATE_MAX {
        (
            RiskBand::Moderate,
            Some(format!("Score {value} indicates moderate probability")),
        )
    } else {
        (
            RiskBand::High,
            Some(format!("Score {value} indicates high probability")),
        )
    };

    ScoreResult {
        rule_name: WELLS_RULE.to_string(),
        numeric_value: Some(value),
        risk_band,
        is_computable: true,
        criteria,
        abnormal_explanation,
        display_label: None,
    }
}

// ---------------------------------------------------------------------------
// Revised Geneva
// ---------------------------------------------------------------------------

/// Revised Geneva pretest-probability score. Same missing-data policy as
/// Wells; the two heart-rate bins are mutually exclusive by construction.
pub fn calculate_geneva(features: &FeatureVector) -> ScoreResult {
    let criteria = vec![
        numeric_criterion("Age > 65", 1.0, features.age, "Age", |age| age > 65.0),
        criterion("Previous PE or DVT", 3.0, features.prior_pe_dvt),
        criterion(
            "Surgery or fracture within one month",
            2.0,
            features.surgery_or_fracture,
        ),
        criterion("Active malignancy", 2.0, features.malignancy),
        criterion("Unilateral lower limb pain", 3.0, features.unilateral_leg_pain),
        criterion(
            "Pain on palpation and edema",
            4.0,
            features.leg_pain_palpation_edema,
        ),
        numeric_criterion("Heart rate 75-94", 3.0, features.heart_rate, "HR", |hr| {
            (75.0..95.0).contains(&hr)
        }),
        numeric_criterion("Heart rate ≥ 95", 5.0, features.heart_rate, "HR", |hr| hr >= 95.0),
        criterion("Hemoptysis", 2.0, features.hemoptysis),
    ];

    if all_unknown(&criteria) {
        return ScoreResult::not_computable(GENEVA_RULE, criteria);
    }

    let value = met_weight_sum(&criteria);
    let (risk_band, abnormal_explanation) = if value <= GENEVA_LOW_MAX {
        (RiskBand::Low, None)
    } else if value <= GENEVA_MODERATE_MAX {
        (
            RiskBand::Moderate,
            Some(format!("Score {value} indicates intermediate probability")),
        )
    } else {
        (
            RiskBand::High,
            Some(format!("Score {value} indicates high probability")),
        )
    };

    ScoreResult {
        rule_name: GENEVA_RULE.to_string(),
        numeric_value: Some(value),
        risk_band,
        is_computable: true,
        criteria,
        abnormal_explanation,
        display_label: None,
    }
}

// ---------------------------------------------------------------------------
// PERC
// ---------------------------------------------------------------------------

/// PERC rule-out criteria: eight absence conditions. Unlike Wells/Geneva,
/// each criterion stays strictly `Unknown` until its measurement exists, and
/// a verdict needs at least four documented criteria.
pub fn calculate_perc(features: &FeatureVector) -> ScoreResult {
    let criteria = vec![
        numeric_criterion("Age < 50", 1.0, features.age, "Age", |age| age < 50.0),
        numeric_criterion("Heart rate < 100", 1.0, features.heart_rate, "HR", |hr| hr < 100.0),
        numeric_criterion("SpO2 ≥ 95", 1.0, features.spo2, "SpO2", |spo2| spo2 >= 95.0),
        criterion("No hemoptysis", 1.0, features.hemoptysis.negate()),
        criterion("No estrogen use", 1.0, features.estrogen_use.negate()),
        criterion("No prior PE or DVT", 1.0, features.prior_pe_dvt.negate()),
        criterion(
            "No unilateral leg swelling",
            1.0,
            features.unilateral_leg_swelling.negate(),
        ),
        criterion(
            "No recent surgery or trauma",
            1.0,
            features.recent_surgery_trauma.negate(),
        ),
    ];

    let known = criteria.iter().filter(|c| c.status.is_known()).count();
    let met = criteria.iter().filter(|c| c.status.is_met()).count();

    if known == 0 {
        return ScoreResult::not_computable(PERC_RULE, criteria);
    }
    if known < PERC_MIN_KNOWN {
        return ScoreResult {
            rule_name: PERC_RULE.to_string(),
            numeric_value: Some(met as f64),
            risk_band: RiskBand::Unknown,
            is_computable: false,
            criteria,
            abnormal_explanation: None,
            display_label: None,
        };
    }

    if met == criteria.len() {
        return ScoreResult {
            rule_name: PERC_RULE.to_string(),
            numeric_value: Some(met as f64),
            risk_band: RiskBand::Negative,
            is_computable: true,
            criteria,
            abnormal_explanation: None,
            display_label: Some("Negative".to_string()),
        };
    }

    let failed: Vec<&str> = criteria
        .iter()
        .filter(|c| c.status.is_known() && !c.status.is_met())
        .map(|c| c.name.as_str())
        .collect();
    let abnormal_explanation = if failed.is_empty() {
        None
    } else {
        let mut text = failed[..failed.len().min(2)].join(", ");
        if failed.len() > 2 {
            text.push_str("...");
        }
        Some(text)
    };
    let display_label = if known == criteria.len() {
        "Positive".to_string()
    } else {
        format!("{met}/8")
    };

    ScoreResult {
        rule_name: PERC_RULE.to_string(),
        numeric_value: Some(met as f64),
        risk_band: RiskBand::Positive,
        is_computable: true,
        criteria,
        abnormal_explanation,
        display_label: Some(display_label),
    }
}

// ---------------------------------------------------------------------------
// YEARS
// ---------------------------------------------------------------------------

/// YEARS algorithm: three criteria combined with a D-dimer cutoff that
/// loosens to 1.0 µg/mL when no criterion is met. Without a D-dimer the rule
/// produces no tier at all.
pub fn calculate_years(features: &FeatureVector) -> ScoreResult {
    let dvt_or_swelling = features.dvt_signs.or(features.unilateral_leg_swelling);
    let criteria = vec![
        criterion("Clinical signs of DVT", 1.0, dvt_or_swelling),
        criterion("Hemoptysis", 1.0, features.hemoptysis),
        criterion("PE most likely diagnosis", 1.0, features.pe_most_likely),
    ];

    let d_dimer = features.d_dimer.map(|value| {
        ddimer::normalize_to_ug_ml(value, features.d_dimer_unit.as_deref().unwrap_or(""))
    });

    if all_unknown(&criteria) && d_dimer.is_none() {
        return ScoreResult::not_computable(YEARS_RULE, criteria);
    }

    let score = criteria.iter().filter(|c| c.status.is_met()).count();
    let tier_threshold = if score > 0 {
        YEARS_DDIMER_STANDARD
    } else {
        YEARS_DDIMER_STRICT
    };

    let (risk_band, abnormal_explanation) = match d_dimer {
        None => (RiskBand::Unknown, None),
        Some(dd) if dd < tier_threshold => (RiskBand::Low, None),
        Some(_) if score > 0 => (
            RiskBand::Moderate,
            Some(format!("{score} criteria + D-dimer ≥{tier_threshold}")),
        ),
        // Zero criteria with a D-dimer at or above 1.0 produces no tier.
        // Kept as-is; the regression test below pins this fallthrough.
        Some(_) => (RiskBand::Unknown, None),
    };

    let is_computable = risk_band != RiskBand::Unknown;
    ScoreResult {
        rule_name: YEARS_RULE.to_string(),
        numeric_value: Some(score as f64),
        risk_band,
        is_computable,
        criteria,
        abnormal_explanation,
        display_label: None,
    }
}
