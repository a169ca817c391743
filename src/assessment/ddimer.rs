use super::types::{DDimerEvaluation, DDimerSample};

/// Fixed D-dimer cutoff in µg/mL FEU for patients aged 50 or under.
pub const FIXED_THRESHOLD: f64 = 0.50;

/// Age-adjusted cutoff is age times this factor, in µg/mL FEU.
pub const AGE_ADJUSTMENT_FACTOR: f64 = 0.01;

/// Age adjustment applies strictly above this age.
pub const AGE_ADJUSTMENT_MIN_AGE: f64 = 50.0;

const NG_PER_UG: f64 = 1000.0;

/// Convert a reading to µg/mL FEU. Units naming nanograms (ng/mL,
/// "ng/ml FEU") divide by 1000; anything else is taken as already on the
/// common scale, which also covers mg/L since it is numerically identical.
pub fn normalize_to_ug_ml(value: f64, unit: &str) -> f64 {
    if unit.to_lowercase().contains("ng") {
        value / NG_PER_UG
    } else {
        value
    }
}

/// Cutoff applicable at a given age, plus whether age adjustment kicked in.
/// Exactly 50 still uses the fixed cutoff.
pub fn threshold_for(age: Option<f64>) -> (f64, bool) {
    match age {
        Some(age) if age > AGE_ADJUSTMENT_MIN_AGE => (age * AGE_ADJUSTMENT_FACTOR, true),
        _ => (FIXED_THRESHOLD, false),
    }
}

/// Full elevation verdict for one sample. Elevation is strict: a value
/// exactly at the cutoff is not elevated.
pub fn evaluate(sample: &DDimerSample, age: Option<f64>) -> DDimerEvaluation {
    let normalized_value = normalize_to_ug_ml(sample.value, &sample.unit);
    let (threshold_applied, age_adjusted) = threshold_for(age);
    DDimerEvaluation {
        raw_value: sample.value,
        unit: sample.unit.clone(),
        normalized_value,
        threshold_applied,
        age_adjusted,
        is_elevated: normalized_value > threshold_applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(value: f64, unit: &str) -> DDimerSample {
        DDimerSample {
            value,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn nanogram_units_divide_by_thousand() {
        assert_eq!(normalize_to_ug_ml(600.0, "ng/mL"), 0.6);
        assert_eq!(normalize_to_ug_ml(600.0, "NG/ML FEU"), 0.6);
    }

    #[test]
    fn microgram_scale_units_pass_through() {
        assert_eq!(normalize_to_ug_ml(0.6, "µg/mL"), 0.6);
        assert_eq!(normalize_to_ug_ml(0.6, "mg/L"), 0.6);
        assert_eq!(normalize_to_ug_ml(0.6, ""), 0.6);
    }

    #[test]
    fn threshold_is_fixed_at_fifty_and_under() {
        assert_eq!(threshold_for(Some(50.0)), (FIXED_THRESHOLD, false));
        assert_eq!(threshold_for(Some(34.0)), (FIXED_THRESHOLD, false));
        assert_eq!(threshold_for(None), (FIXED_THRESHOLD, false));
    }

    #[test]
    fn threshold_age_adjusts_above_fifty() {
        assert_eq!(threshold_for(Some(80.0)), (0.8, true));
    }

    #[test]
    fn age_adjustment_can_clear_a_value_the_fixed_cutoff_flags() {
        let adjusted = evaluate(&sample(0.65, "µg/mL"), Some(72.0));
        assert_eq!(adjusted.threshold_applied, 0.72);
        assert!(adjusted.age_adjusted);
        assert!(!adjusted.is_elevated, "0.65 is under the adjusted 0.72 cutoff");

        let fixed = evaluate(&sample(0.65, "µg/mL"), None);
        assert!(!fixed.age_adjusted);
        assert!(fixed.is_elevated, "0.65 is over the fixed 0.50 cutoff");
    }

    #[test]
    fn elevation_is_strict_at_the_cutoff() {
        let at_cutoff = evaluate(&sample(0.5, "µg/mL"), None);
        assert!(!at_cutoff.is_elevated);
    }

    #[test]
    fn evaluate_preserves_raw_reading() {
        let eval = evaluate(&sample(650.0, "ng/mL"), Some(40.0));
        assert_eq!(eval.raw_value, 650.0);
        assert_eq!(eval.unit, "ng/mL");
        assert_eq!(eval.normalized_value, 0.65);
        assert!(eval.is_elevated);
    }
}
