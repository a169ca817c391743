use serde_json::Value;

use super::types::{FeatureVector, RawRecord, TriState};

// ---------------------------------------------------------------------------
// Alias tables — one ordered list per canonical key, first recognized wins
// ---------------------------------------------------------------------------

const DVT_SIGNS_ALIASES: &[&str] = &["dvt_signs", "clinical_signs_dvt", "signs_of_dvt", "leg_swelling"];
const PE_MOST_LIKELY_ALIASES: &[&str] = &["pe_most_likely", "pe_likely", "pe_is_most_likely_diagnosis"];
const HEMOPTYSIS_ALIASES: &[&str] = &["hemoptysis", "haemoptysis", "coughing_blood"];
const PRIOR_PE_DVT_ALIASES: &[&str] = &["prior_pe_dvt", "previous_pe_dvt", "prior_vte", "history_pe_dvt"];
const MALIGNANCY_ALIASES: &[&str] = &["active_malignancy", "malignancy", "active_cancer", "cancer"];
const IMMOBILIZATION_OR_SURGERY_ALIASES: &[&str] =
    &["immobilization_or_surgery", "immobilization", "recent_immobilization", "recent_surgery"];
const SURGERY_OR_FRACTURE_ALIASES: &[&str] =
    &["surgery_or_fracture", "recent_surgery", "surgery_last_month", "recent_fracture"];
const UNILATERAL_LEG_PAIN_ALIASES: &[&str] =
    &["unilateral_leg_pain", "leg_pain_unilateral", "unilateral_lower_limb_pain"];
const LEG_PAIN_PALPATION_EDEMA_ALIASES: &[&str] =
    &["leg_pain_palpation_edema", "pain_on_palpation_edema", "palpation_pain_and_edema"];
const UNILATERAL_LEG_SWELLING_ALIASES: &[&str] =
    &["unilateral_leg_swelling", "leg_swelling", "calf_swelling"];
const ESTROGEN_USE_ALIASES: &[&str] = &["estrogen_use", "hormone_use", "oral_contraceptive", "estrogen"];
const RECENT_SURGERY_TRAUMA_ALIASES: &[&str] =
    &["recent_surgery_trauma", "recent_surgery", "recent_trauma", "surgery_or_trauma"];

const AGE_ALIASES: &[&str] = &["age", "patient_age", "age_years"];
const HEART_RATE_ALIASES: &[&str] = &["triage_hr", "hr", "heart_rate", "pulse"];
const RESPIRATORY_RATE_ALIASES: &[&str] = &["triage_rr", "rr", "respiratory_rate"];
const SPO2_ALIASES: &[&str] = &["triage_o2sat", "spo2", "o2_sat", "oxygen_saturation"];
const SBP_ALIASES: &[&str] = &["triage_sbp", "sbp", "systolic_bp"];
const DBP_ALIASES: &[&str] = &["triage_dbp", "dbp", "diastolic_bp"];
const TEMPERATURE_ALIASES: &[&str] = &["triage_temp", "temp", "temperature"];
const D_DIMER_ALIASES: &[&str] = &["d_dimer", "ddimer", "d_dimer_value"];
const D_DIMER_UNIT_ALIASES: &[&str] = &["d_dimer_unit", "ddimer_unit", "d_dimer_units"];
const TROPONIN_ALIASES: &[&str] = &["troponin_t", "troponin", "troponin_i"];
const CREATININE_ALIASES: &[&str] = &["creatinine", "cr"];
const BMI_ALIASES: &[&str] = &["bmi", "body_mass_index"];

/// Canonical measurements without which the upstream model is flying blind.
pub const CRITICAL_FIELDS: &[&str] = &["age", "heart_rate", "respiratory_rate", "spo2", "sbp"];

/// Canonical measurements that refine but do not gate an assessment.
pub const OPTIONAL_FIELDS: &[&str] =
    &["d_dimer", "dbp", "temperature", "troponin", "creatinine", "bmi"];

// ---------------------------------------------------------------------------
// Literal recognition
// ---------------------------------------------------------------------------

/// Map one raw scalar to a tri-state flag. Recognized: JSON booleans, the
/// numbers 1/0, and the strings "true"/"True"/"false"/"False". Anything else
/// is not a documented value and stays unrecognized.
fn recognize_flag(value: &Value) -> TriState {
    match value {
        Value::Bool(b) => TriState::Present(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => TriState::Present(true),
            Some(v) if v == 0.0 => TriState::Present(false),
            _ => TriState::Unknown,
        },
        Value::String(s) => match s.as_str() {
            "true" | "True" => TriState::Present(true),
            "false" | "False" => TriState::Present(false),
            _ => TriState::Unknown,
        },
        _ => TriState::Unknown,
    }
}

fn recognize_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Scan aliases in priority order and return the first recognized flag value.
/// Unrecognized values are skipped, so a malformed primary key never masks a
/// well-formed fallback key. Absent and malformed both degrade to `Unknown`.
pub fn resolve_flag(record: &RawRecord, aliases: &[&str]) -> TriState {
    for alias in aliases {
        if let Some(value) = record.get(alias) {
            let resolved = recognize_flag(value);
            if resolved.is_known() {
                return resolved;
            }
        }
    }
    TriState::Unknown
}

/// Scan aliases in priority order and return the first parseable number.
pub fn resolve_number(record: &RawRecord, aliases: &[&str]) -> Option<f64> {
    for alias in aliases {
        if let Some(parsed) = record.get(alias).and_then(recognize_number) {
            return Some(parsed);
        }
    }
    None
}

/// Scan aliases in priority order and return the first non-empty string.
pub fn resolve_string(record: &RawRecord, aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        if let Some(Value::String(s)) = record.get(alias) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Canonicalize a raw record into the immutable feature snapshot every
/// calculator consumes. Resolution runs once per assessment.
pub fn resolve(record: &RawRecord) -> FeatureVector {
    FeatureVector {
        dvt_signs: resolve_flag(record, DVT_SIGNS_ALIASES),
        pe_most_likely: resolve_flag(record, PE_MOST_LIKELY_ALIASES),
        hemoptysis: resolve_flag(record, HEMOPTYSIS_ALIASES),
        prior_pe_dvt: resolve_flag(record, PRIOR_PE_DVT_ALIASES),
        malignancy: resolve_flag(record, MALIGNANCY_ALIASES),
        immobilization_or_surgery: resolve_flag(record, IMMOBILIZATION_OR_SURGERY_ALIASES),
        surgery_or_fracture: resolve_flag(record, SURGERY_OR_FRACTURE_ALIASES),
        unilateral_leg_pain: resolve_flag(record, UNILATERAL_LEG_PAIN_ALIASES),
        leg_pain_palpation_edema: resolve_flag(record, LEG_PAIN_PALPATION_EDEMA_ALIASES),
        unilateral_leg_swelling: resolve_flag(record, UNILATERAL_LEG_SWELLING_ALIASES),
        estrogen_use: resolve_flag(record, ESTROGEN_USE_ALIASES),
        recent_surgery_trauma: resolve_flag(record, RECENT_SURGERY_TRAUMA_ALIASES),

        age: resolve_number(record, AGE_ALIASES),
        heart_rate: resolve_number(record, HEART_RATE_ALIASES),
        respiratory_rate: resolve_number(record, RESPIRATORY_RATE_ALIASES),
        spo2: resolve_number(record, SPO2_ALIASES),
        sbp: resolve_number(record, SBP_ALIASES),
        dbp: resolve_number(record, DBP_ALIASES),
        temperature: resolve_number(record, TEMPERATURE_ALIASES),
        d_dimer: resolve_number(record, D_DIMER_ALIASES),
        d_dimer_unit: resolve_string(record, D_DIMER_UNIT_ALIASES),
        troponin: resolve_number(record, TROPONIN_ALIASES),
        creatinine: resolve_number(record, CREATININE_ALIASES),
        bmi: resolve_number(record, BMI_ALIASES),
    }
}

/// Split unresolved canonical measurements into critical and optional lists
/// for display. Completeness is surfaced, never enforced.
pub fn missing_fields(features: &FeatureVector) -> (Vec<String>, Vec<String>) {
    let presence = |field: &str| -> bool {
        match field {
            "age" => features.age.is_some(),
            "heart_rate" => features.heart_rate.is_some(),
            "respiratory_rate" => features.respiratory_rate.is_some(),
            "spo2" => features.spo2.is_some(),
            "sbp" => features.sbp.is_some(),
            "d_dimer" => features.d_dimer.is_some(),
            "dbp" => features.dbp.is_some(),
            "temperature" => features.temperature.is_some(),
            "troponin" => features.troponin.is_some(),
            "creatinine" => features.creatinine.is_some(),
            "bmi" => features.bmi.is_some(),
            _ => true,
        }
    };

    let critical = CRITICAL_FIELDS
        .iter()
        .filter(|f| !presence(f))
        .map(|f| f.to_string())
        .collect();
    let optional = OPTIONAL_FIELDS
        .iter()
        .filter(|f| !presence(f))
        .map(|f| f.to_string())
        .collect();
    (critical, optional)
}
