//! Fixed narrative wording. Every user-facing sentence the engine emits is
//! built here so the synthesizer and decision interpreter stay free of
//! string literals.

/// Percentage with one decimal, "8.2%".
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

pub struct NarrativeTemplates;

impl NarrativeTemplates {
    // ── Rationale, rule-out branch ─────────────────────────────────────

    pub fn low_risk_with(reassurance: &str) -> String {
        format!("Low-risk presentation with {reassurance}")
    }

    pub fn low_risk_plain() -> String {
        "Low-risk clinical presentation".to_string()
    }

    pub fn fragment_suffix(fragment: &str) -> String {
        format!(". {fragment}.")
    }

    pub fn no_high_risk_suffix() -> String {
        ". No high-risk features identified.".to_string()
    }

    pub fn despite_suffix(concern: &str) -> String {
        format!(" despite {concern}.")
    }

    // ── Rationale, continue-workup branch ──────────────────────────────

    pub fn elevated_risk(concern_phrase: &str) -> String {
        format!("Elevated risk due to {concern_phrase}. Further workup recommended.")
    }

    pub fn elevated_risk_with(concern_phrase: &str, fragment: &str) -> String {
        format!(
            "Elevated risk due to {concern_phrase} with {fragment}. Further workup recommended."
        )
    }

    // ── Probability interpretation ─────────────────────────────────────

    pub fn rule_out_explanation(probability: f64) -> String {
        format!(
            "Low PE probability ({}). Based on the model, PE can be ruled out with ~98% NPV. \
             Consider avoiding CT pulmonary angiography if clinically appropriate. \
             Always use clinical judgment.",
            format_percent(probability)
        )
    }

    pub fn moderate_probability_explanation(probability: f64) -> String {
        format!(
            "Moderate PE probability ({}). Continue with standard PE workup. Consider imaging.",
            format_percent(probability)
        )
    }

    pub fn elevated_probability_explanation(probability: f64) -> String {
        format!(
            "Elevated PE probability ({}). Imaging strongly recommended.",
            format_percent(probability)
        )
    }

    pub fn high_probability_explanation(probability: f64) -> String {
        format!(
            "High PE probability ({}). Urgent imaging indicated.",
            format_percent(probability)
        )
    }

    pub fn disclaimer() -> String {
        "This is a decision support tool, not a diagnostic test. \
         Clinical judgment should always take precedence."
            .to_string()
    }
}
