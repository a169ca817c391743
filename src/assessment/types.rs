use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = EngineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(EngineError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        // Wire form is the as_str vocabulary, not the variant name.
        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// TriState
// ---------------------------------------------------------------------------

/// A clinical flag that is affirmatively true, affirmatively false, or not
/// documented. "Not documented" is never conflated with "documented absent";
/// each rule's own missing-data policy decides how `Unknown` enters a sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TriState {
    Present(bool),
    #[default]
    Unknown,
}

impl TriState {
    /// The underlying measurement or flag exists.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Documented true.
    pub fn is_met(&self) -> bool {
        matches!(self, Self::Present(true))
    }

    /// Tri-state OR: any documented true wins, otherwise any documented
    /// false, otherwise unknown.
    pub fn or(self, other: TriState) -> TriState {
        match (self, other) {
            (Self::Present(true), _) | (_, Self::Present(true)) => Self::Present(true),
            (Self::Present(false), _) | (_, Self::Present(false)) => Self::Present(false),
            _ => Self::Unknown,
        }
    }

    /// Tri-state negation; unknown stays unknown.
    pub fn negate(self) -> TriState {
        match self {
            Self::Present(v) => Self::Present(!v),
            Self::Unknown => Self::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Risk bands & decisions
// ---------------------------------------------------------------------------

str_enum!(RiskBand {
    Low => "low",
    Moderate => "moderate",
    High => "high",
    Negative => "negative",
    Positive => "positive",
    Unknown => "unknown",
});

str_enum!(Decision {
    RuleOut => "rule_out",
    ContinueWorkup => "continue_workup",
});

str_enum!(Confidence {
    Moderate => "moderate",
    High => "high",
});

// ---------------------------------------------------------------------------
// Reference vocabulary
// ---------------------------------------------------------------------------

str_enum!(MedicationClass {
    Doac => "DOAC",
    Warfarin => "Warfarin",
    HeparinLmwh => "Heparin_LMWH",
    Antiplatelet => "Antiplatelet",
    Other => "Other",
});

str_enum!(MimicCategory {
    Asthma => "asthma",
    Anxiety => "anxiety",
    Copd => "copd",
    Chf => "chf",
    Pneumonia => "pneumonia",
});

str_enum!(ImagingKind {
    Ctpa => "CTPA",
    CtaChest => "CTA Chest",
    Vq => "VQ",
    Other => "Other",
});

// ---------------------------------------------------------------------------
// RawRecord — loosely-typed upstream feature record
// ---------------------------------------------------------------------------

/// Raw merged patient data as delivered by upstream fetch layers: string keys
/// with inconsistent spellings mapped to arbitrary JSON scalars. The resolver
/// canonicalizes this into a [`FeatureVector`]; nothing else reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(serde_json::Map<String, serde_json::Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from JSON text. The only fallible entry point; the
    /// engine itself never errors after this.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| EngineError::RecordParse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, EngineError> {
        match value {
            serde_json::Value::Object(map) => Ok(Self(map)),
            other => Err(EngineError::RecordNotObject(other.to_string())),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FeatureVector — canonical tri-state snapshot
// ---------------------------------------------------------------------------

/// Canonical, strongly-typed feature snapshot for one assessment. Built once
/// by the resolver and then treated as immutable; every calculator reads from
/// this, never from the raw record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    // Clinical flags
    pub dvt_signs: TriState,
    pub pe_most_likely: TriState,
    pub hemoptysis: TriState,
    pub prior_pe_dvt: TriState,
    pub malignancy: TriState,
    pub immobilization_or_surgery: TriState,
    pub surgery_or_fracture: TriState,
    pub unilateral_leg_pain: TriState,
    pub leg_pain_palpation_edema: TriState,
    pub unilateral_leg_swelling: TriState,
    pub estrogen_use: TriState,
    pub recent_surgery_trauma: TriState,

    // Measurements
    pub age: Option<f64>,
    pub heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub spo2: Option<f64>,
    pub sbp: Option<f64>,
    pub dbp: Option<f64>,
    pub temperature: Option<f64>,
    pub d_dimer: Option<f64>,
    pub d_dimer_unit: Option<String>,
    pub troponin: Option<f64>,
    pub creatinine: Option<f64>,
    pub bmi: Option<f64>,
}

impl FeatureVector {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Heart rate over systolic pressure; a crude bedside instability index.
    pub fn shock_index(&self) -> Option<f64> {
        match (self.heart_rate, self.sbp) {
            (Some(hr), Some(sbp)) if sbp > 0.0 => Some(hr / sbp),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ScoreCriterion & ScoreResult
// ---------------------------------------------------------------------------

/// One criterion line of a scoring rule, kept in the rule's fixed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCriterion {
    pub name: String,
    /// Points contributed when the criterion is met.
    pub weight: f64,
    pub status: TriState,
    /// Literal measurement backing the status, e.g. "HR: 104".
    pub evidence_text: Option<String>,
}

/// Output of one scoring rule over one feature snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub rule_name: String,
    /// None only when the rule saw no input at all.
    pub numeric_value: Option<f64>,
    pub risk_band: RiskBand,
    pub is_computable: bool,
    pub criteria: Vec<ScoreCriterion>,
    pub abnormal_explanation: Option<String>,
    /// Short verdict label for rules that carry one (PERC: "Negative",
    /// "Positive", or "{met}/8" when incomplete).
    pub display_label: Option<String>,
}

impl ScoreResult {
    /// Result for a rule that cannot produce any verdict. Incompleteness is
    /// surfaced, never downgraded to a reassuring band.
    pub fn not_computable(rule_name: &str, criteria: Vec<ScoreCriterion>) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            numeric_value: None,
            risk_band: RiskBand::Unknown,
            is_computable: false,
            criteria,
            abnormal_explanation: None,
            display_label: None,
        }
    }

    /// Criteria whose measurement exists.
    pub fn known_count(&self) -> usize {
        self.criteria.iter().filter(|c| c.status.is_known()).count()
    }

    /// Criteria documented as met.
    pub fn met_count(&self) -> usize {
        self.criteria.iter().filter(|c| c.status.is_met()).count()
    }
}

// ---------------------------------------------------------------------------
// DDimerEvaluation
// ---------------------------------------------------------------------------

/// Elevation verdict for a D-dimer value against the applicable threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DDimerEvaluation {
    pub raw_value: f64,
    pub unit: String,
    /// Value on the common µg/mL FEU scale.
    pub normalized_value: f64,
    pub threshold_applied: f64,
    pub age_adjusted: bool,
    pub is_elevated: bool,
}

/// A raw D-dimer measurement supplied separately from the feature record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DDimerSample {
    pub value: f64,
    pub unit: String,
}

// ---------------------------------------------------------------------------
// ScoreSummary & DecisionSummary
// ---------------------------------------------------------------------------

/// Terse reduction of the four rule verdicts, consumed only by narrative
/// generation. Derived per snapshot, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub wells_low: bool,
    pub geneva_low: bool,
    pub perc_negative: bool,
    pub any_high_risk: bool,
    pub narrative_fragment: Option<String>,
}

/// Probability interpreted against the rule-out threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub probability: f64,
    pub threshold: f64,
    pub decision: Decision,
    pub explanation: String,
    pub confidence: Confidence,
    pub disclaimer: String,
}

// ---------------------------------------------------------------------------
// Assessment — full engine output
// ---------------------------------------------------------------------------

/// Pre-merged input snapshot for one assessment run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub record: RawRecord,
    /// Pretest probability from the upstream model.
    pub probability: f64,
    /// Rule-out threshold override; engine default applies when None.
    pub threshold: Option<f64>,
    /// D-dimer supplied outside the record wins over any record alias.
    pub d_dimer: Option<DDimerSample>,
    /// Age supplied outside the record wins over any record alias.
    pub age: Option<f64>,
}

impl AssessmentInput {
    pub fn new(record: RawRecord, probability: f64) -> Self {
        Self {
            record,
            probability,
            threshold: None,
            d_dimer: None,
            age: None,
        }
    }
}

/// Complete plain-data output of one assessment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub features: FeatureVector,
    pub wells: ScoreResult,
    pub geneva: ScoreResult,
    pub perc: ScoreResult,
    pub years: ScoreResult,
    pub d_dimer: Option<DDimerEvaluation>,
    pub summary: ScoreSummary,
    pub decision: DecisionSummary,
    pub rationale: String,
    pub missing_critical: Vec<String>,
    pub missing_optional: Vec<String>,
    pub processing_time_ms: u64,
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Boundary faults only. The engine proper is total: bad clinical data
/// degrades to `Unknown`, it never raises.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Feature record parse failed: {0}")]
    RecordParse(String),

    #[error("Feature record must be a JSON object, got: {0}")]
    RecordNotObject(String),
}

// ---------------------------------------------------------------------------
// AssessmentEngine trait
// ---------------------------------------------------------------------------

/// The main risk-assessment engine trait. The clinical content of the
/// output is a deterministic function of the input snapshot; only the
/// generated id and timing bookkeeping vary between calls.
pub trait AssessmentEngine {
    /// Evaluate one immutable input snapshot into a complete assessment.
    fn assess(&self, input: &AssessmentInput) -> Assessment;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tristate_or_prefers_documented_true() {
        assert_eq!(
            TriState::Present(false).or(TriState::Present(true)),
            TriState::Present(true)
        );
        assert_eq!(
            TriState::Unknown.or(TriState::Present(false)),
            TriState::Present(false)
        );
        assert_eq!(TriState::Unknown.or(TriState::Unknown), TriState::Unknown);
    }

    #[test]
    fn tristate_negate_keeps_unknown() {
        assert_eq!(TriState::Present(true).negate(), TriState::Present(false));
        assert_eq!(TriState::Unknown.negate(), TriState::Unknown);
    }

    #[test]
    fn risk_band_round_trip() {
        let band: RiskBand = "moderate".parse().unwrap();
        assert_eq!(band, RiskBand::Moderate);
        assert_eq!(band.as_str(), "moderate");
        assert!("critical".parse::<RiskBand>().is_err());
    }

    #[test]
    fn enums_serialize_their_string_vocabulary() {
        assert_eq!(serde_json::to_string(&RiskBand::Low).unwrap(), r#""low""#);
        assert_eq!(serde_json::to_string(&Decision::RuleOut).unwrap(), r#""rule_out""#);
        assert_eq!(
            serde_json::to_string(&MedicationClass::HeparinLmwh).unwrap(),
            r#""Heparin_LMWH""#
        );
        assert_eq!(serde_json::to_string(&ImagingKind::CtaChest).unwrap(), r#""CTA Chest""#);

        let decision: Decision = serde_json::from_str(r#""continue_workup""#).unwrap();
        assert_eq!(decision, Decision::ContinueWorkup);
        assert!(serde_json::from_str::<Decision>(r#""RuleOut""#).is_err());
    }

    #[test]
    fn raw_record_rejects_non_object() {
        assert!(RawRecord::from_json("[1, 2]").is_err());
        assert!(RawRecord::from_json("not json").is_err());
        assert!(RawRecord::from_json(r#"{"age": 50}"#).is_ok());
    }

    #[test]
    fn not_computable_surfaces_unknown() {
        let result = ScoreResult::not_computable("Wells", vec![]);
        assert_eq!(result.risk_band, RiskBand::Unknown);
        assert!(!result.is_computable);
        assert!(result.numeric_value.is_none());
    }

    #[test]
    fn shock_index_requires_both_vitals() {
        let mut features = FeatureVector::empty();
        assert!(features.shock_index().is_none());
        features.heart_rate = Some(110.0);
        features.sbp = Some(100.0);
        assert_eq!(features.shock_index(), Some(1.1));
    }
}
