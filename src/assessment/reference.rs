//! Pattern tables for medication, diagnosis, and imaging classification.
//!
//! Matching is case-insensitive substring containment over trimmed input.
//! Diagnosis classification checks ICD-10 code prefixes before falling back
//! to display-name patterns, so a coded record wins over free text.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{ImagingKind, MedicationClass, MimicCategory};

// ---------------------------------------------------------------------------
// Medications
// ---------------------------------------------------------------------------

/// Generic and brand names per anticoagulant / antiplatelet class.
const MEDICATION_PATTERNS: &[(MedicationClass, &[&str])] = &[
    (
        MedicationClass::Doac,
        &[
            "apixaban",
            "eliquis",
            "rivaroxaban",
            "xarelto",
            "dabigatran",
            "pradaxa",
            "edoxaban",
            "savaysa",
            "lixiana",
            "betrixaban",
            "bevyxxa",
        ],
    ),
    (
        MedicationClass::Warfarin,
        &["warfarin", "coumadin", "jantoven"],
    ),
    (
        MedicationClass::HeparinLmwh,
        &[
            "heparin",
            "unfractionated heparin",
            "enoxaparin",
            "lovenox",
            "dalteparin",
            "fragmin",
            "tinzaparin",
            "innohep",
            "fondaparinux",
            "arixtra",
        ],
    ),
    (
        MedicationClass::Antiplatelet,
        &[
            "aspirin",
            "asa",
            "acetylsalicylic",
            "clopidogrel",
            "plavix",
            "ticagrelor",
            "brilinta",
            "prasugrel",
            "effient",
            "dipyridamole",
            "aggrenox",
            "ticlopidine",
            "ticlid",
            "cangrelor",
            "kengreal",
            "vorapaxar",
            "zontivity",
        ],
    ),
];

/// Classify a medication by name. The name may carry dose and form text
/// ("Eliquis 5mg tablet"); any substring hit counts.
pub fn classify_medication(name: &str) -> MedicationClass {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return MedicationClass::Other;
    }
    for (class, patterns) in MEDICATION_PATTERNS {
        if patterns.iter().any(|pattern| needle.contains(pattern)) {
            return class.clone();
        }
    }
    MedicationClass::Other
}

/// True for classes that therapeutically anticoagulate. Antiplatelets are
/// excluded: they affect hemostasis but do not treat VTE.
pub fn is_anticoagulant(class: &MedicationClass) -> bool {
    matches!(
        class,
        MedicationClass::Doac | MedicationClass::Warfarin | MedicationClass::HeparinLmwh
    )
}

/// True for any class that interferes with hemostasis, antiplatelets included.
pub fn affects_hemostasis(class: &MedicationClass) -> bool {
    *class != MedicationClass::Other
}

// ---------------------------------------------------------------------------
// Diagnoses
// ---------------------------------------------------------------------------

/// PE-mimic categories: (category, ICD-10 prefixes, display-name patterns).
const DIAGNOSIS_CATEGORIES: &[(MimicCategory, &[&str], &[&str])] = &[
    (
        MimicCategory::Asthma,
        &["J45"],
        &["asthma", "reactive airway", "bronchospasm"],
    ),
    (
        MimicCategory::Anxiety,
        &["F40", "F41"],
        &[
            "anxiety",
            "panic",
            "hyperventilation syndrome",
            "generalized anxiety",
            "panic disorder",
            "gad",
        ],
    ),
    (
        MimicCategory::Copd,
        &["J44", "J43"],
        &[
            "copd",
            "chronic obstructive",
            "emphysema",
            "chronic bronchitis",
            "obstructive lung disease",
        ],
    ),
    (
        MimicCategory::Chf,
        &["I50", "I11.0", "I13.0", "I13.2"],
        &[
            "heart failure",
            "chf",
            "congestive heart",
            "cardiomyopathy",
            "systolic dysfunction",
            "diastolic dysfunction",
            "hfref",
            "hfpef",
            "left ventricular failure",
            "right heart failure",
        ],
    ),
    (
        MimicCategory::Pneumonia,
        &["J12", "J13", "J14", "J15", "J16", "J17", "J18"],
        &[
            "pneumonia",
            "pneumonitis",
            "lower respiratory infection",
            "community acquired pneumonia",
            "cap",
            "hap",
            "aspiration pneumonia",
        ],
    ),
];

/// Map a diagnosis onto a PE-mimic category, ICD code prefix first, then
/// display-name patterns. Returns `None` when neither matches.
pub fn classify_diagnosis(display: &str, code: Option<&str>) -> Option<MimicCategory> {
    if let Some(code) = code {
        let code = code.trim().to_uppercase();
        if !code.is_empty() {
            for (category, prefixes, _) in DIAGNOSIS_CATEGORIES {
                if prefixes.iter().any(|prefix| code.starts_with(prefix)) {
                    return Some(category.clone());
                }
            }
        }
    }
    let display = display.trim().to_lowercase();
    if display.is_empty() {
        return None;
    }
    for (category, _, patterns) in DIAGNOSIS_CATEGORIES {
        if patterns.iter().any(|pattern| display.contains(pattern)) {
            return Some(category.clone());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Imaging
// ---------------------------------------------------------------------------

/// Study-description patterns for PE-relevant imaging modalities.
const PE_IMAGING_PATTERNS: &[(&str, ImagingKind)] = &[
    ("ctpa", ImagingKind::Ctpa),
    ("ct pulmonary", ImagingKind::Ctpa),
    ("cta chest", ImagingKind::Ctpa),
    ("pe protocol", ImagingKind::Ctpa),
    ("ct angiography chest", ImagingKind::CtaChest),
    ("ct angio chest", ImagingKind::CtaChest),
    ("v/q", ImagingKind::Vq),
    ("ventilation perfusion", ImagingKind::Vq),
    ("lung scan", ImagingKind::Vq),
];

/// Decide whether an imaging study is PE-relevant and which modality it is.
/// A description that only names the indication ("r/o pulmonary embolism")
/// is treated as CTPA, the default modality for that workup.
pub fn classify_imaging(description: &str) -> (bool, ImagingKind) {
    let needle = description.trim().to_lowercase();
    if needle.is_empty() {
        return (false, ImagingKind::Other);
    }
    for (pattern, kind) in PE_IMAGING_PATTERNS {
        if needle.contains(pattern) {
            return (true, kind.clone());
        }
    }
    if needle.contains("pulmonary embol") {
        return (true, ImagingKind::Ctpa);
    }
    (false, ImagingKind::Other)
}

// ---------------------------------------------------------------------------
// Report snippets
// ---------------------------------------------------------------------------

/// Default length cap for report snippets shown on timeline entries.
pub const SNIPPET_MAX_LENGTH: usize = 200;

/// A word-boundary cut is only kept when it lands past this share of the
/// cap; an earlier space would throw away too much of the snippet.
const SNIPPET_BREAK_RATIO: f64 = 0.7;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace and truncate to `max_length`, preferring a
/// word boundary, with `...` appended when anything was cut.
pub fn extract_snippet(text: &str, max_length: usize) -> String {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    let collapsed = collapsed.as_ref();
    if collapsed.len() <= max_length {
        return collapsed.to_string();
    }
    let mut cut = max_length;
    while !collapsed.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut snippet = &collapsed[..cut];
    if let Some(space) = snippet.rfind(' ') {
        if space as f64 > max_length as f64 * SNIPPET_BREAK_RATIO {
            snippet = &snippet[..space];
        }
    }
    format!("{snippet}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A brand name with dose text still classifies by substring.
    #[test]
    fn brand_name_with_dose_classifies_as_doac() {
        assert_eq!(classify_medication("Eliquis 5mg"), MedicationClass::Doac);
    }

    /// Each class resolves from a representative name.
    #[test]
    fn one_name_per_class_resolves() {
        assert_eq!(
            classify_medication("warfarin sodium"),
            MedicationClass::Warfarin
        );
        assert_eq!(classify_medication("Lovenox"), MedicationClass::HeparinLmwh);
        assert_eq!(
            classify_medication("aspirin 81mg"),
            MedicationClass::Antiplatelet
        );
    }

    /// Unrecognized and blank names fall back to Other.
    #[test]
    fn unrecognized_or_blank_names_are_other() {
        assert_eq!(classify_medication("metformin"), MedicationClass::Other);
        assert_eq!(classify_medication(""), MedicationClass::Other);
        assert_eq!(classify_medication("   "), MedicationClass::Other);
    }

    /// Antiplatelets affect hemostasis but never count as anticoagulation.
    #[test]
    fn antiplatelets_are_not_anticoagulants() {
        assert!(is_anticoagulant(&MedicationClass::Doac));
        assert!(is_anticoagulant(&MedicationClass::HeparinLmwh));
        assert!(!is_anticoagulant(&MedicationClass::Antiplatelet));
        assert!(affects_hemostasis(&MedicationClass::Antiplatelet));
        assert!(!affects_hemostasis(&MedicationClass::Other));
    }

    /// An ICD code alone is enough; the display text may be empty.
    #[test]
    fn icd_prefix_classifies_without_display_text() {
        assert_eq!(
            classify_diagnosis("", Some("J45.0")),
            Some(MimicCategory::Asthma)
        );
    }

    /// The coded prefix wins even when the display text names another mimic.
    #[test]
    fn icd_prefix_takes_priority_over_display_text() {
        assert_eq!(
            classify_diagnosis("anxiety", Some("J44.9")),
            Some(MimicCategory::Copd)
        );
    }

    /// An unmatched code falls through to display-name matching.
    #[test]
    fn unmatched_code_falls_back_to_display_patterns() {
        assert_eq!(
            classify_diagnosis("Panic attack", Some("Z99")),
            Some(MimicCategory::Anxiety)
        );
        assert_eq!(
            classify_diagnosis("Congestive heart failure", None),
            Some(MimicCategory::Chf)
        );
    }

    /// A diagnosis outside the mimic tables classifies as nothing.
    #[test]
    fn non_mimic_diagnosis_is_none() {
        assert_eq!(classify_diagnosis("Fractured wrist", Some("S62.1")), None);
        assert_eq!(classify_diagnosis("", None), None);
    }

    /// Common CTPA phrasings all resolve to the CTPA modality.
    #[test]
    fn ct_pulmonary_angiogram_is_relevant_ctpa() {
        assert_eq!(
            classify_imaging("CT pulmonary angiogram"),
            (true, ImagingKind::Ctpa)
        );
        assert_eq!(
            classify_imaging("CTA chest with contrast"),
            (true, ImagingKind::Ctpa)
        );
    }

    /// Remaining modalities and the indication-only fallback.
    #[test]
    fn other_modalities_classify_by_pattern() {
        assert_eq!(
            classify_imaging("CT angiography chest"),
            (true, ImagingKind::CtaChest)
        );
        assert_eq!(classify_imaging("V/Q scan"), (true, ImagingKind::Vq));
        assert_eq!(
            classify_imaging("Study for pulmonary embolism"),
            (true, ImagingKind::Ctpa)
        );
        assert_eq!(classify_imaging("Chest X-ray"), (false, ImagingKind::Other));
    }

    /// Short text passes through with whitespace collapsed.
    #[test]
    fn snippet_collapses_whitespace_without_truncating() {
        assert_eq!(extract_snippet("a\n\n b\tc", 200), "a b c");
    }

    /// Truncation backs up to a word boundary when one lands late enough.
    #[test]
    fn snippet_truncates_at_word_boundary() {
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(extract_snippet(text, 20), "The quick brown fox...");
    }

    /// A space too early in the cut is ignored; the cut stays hard.
    #[test]
    fn snippet_ignores_early_word_boundary() {
        let text = "ab cdefghijklmnopqrstuvwxyz";
        assert_eq!(extract_snippet(text, 20), "ab cdefghijklmnopqrs...");
    }

    /// Text without any space truncates hard at the cap.
    #[test]
    fn snippet_hard_cuts_unbroken_text() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(extract_snippet(text, 20), "abcdefghijklmnopqrst...");
    }

    /// A cap landing mid-character backs up to the previous boundary.
    #[test]
    fn snippet_respects_utf8_boundaries() {
        let text = "é".repeat(30);
        assert_eq!(extract_snippet(&text, 21), format!("{}...", "é".repeat(10)));
    }
}
