use super::types::{RiskBand, ScoreResult, ScoreSummary};

const WELLS_LOW_LABEL: &str = "Wells low-risk";
const GENEVA_LOW_LABEL: &str = "Geneva low";
const PERC_NEGATIVE_LABEL: &str = "PERC negative";

const WELLS_HIGH_LABEL: &str = "high Wells";
const GENEVA_HIGH_LABEL: &str = "high Geneva";
const PERC_POSITIVE_LABEL: &str = "PERC positive";

/// Reduce the four rule verdicts to the booleans and optional phrase the
/// narrative layer consumes. Fragment selection is strictly ordered:
/// a reassurance pair beats a single high-risk label, which beats a single
/// low label. YEARS carries no reassuring terminal band and contributes
/// nothing here; it feeds the display layer directly.
pub fn summarize(
    wells: &ScoreResult,
    geneva: &ScoreResult,
    perc: &ScoreResult,
    years: &ScoreResult,
) -> ScoreSummary {
    let _ = years;

    let wells_low = wells.risk_band == RiskBand::Low;
    let geneva_low = geneva.risk_band == RiskBand::Low;
    let perc_negative = perc.risk_band == RiskBand::Negative;
    let any_high_risk =
        wells.risk_band == RiskBand::High || geneva.risk_band == RiskBand::High;

    let low_labels: Vec<&str> = [
        (wells_low, WELLS_LOW_LABEL),
        (geneva_low, GENEVA_LOW_LABEL),
        (perc_negative, PERC_NEGATIVE_LABEL),
    ]
    .into_iter()
    .filter(|(applies, _)| *applies)
    .map(|(_, label)| label)
    .collect();

    let high_labels: Vec<&str> = [
        (wells.risk_band == RiskBand::High, WELLS_HIGH_LABEL),
        (geneva.risk_band == RiskBand::High, GENEVA_HIGH_LABEL),
        (perc.risk_band == RiskBand::Positive, PERC_POSITIVE_LABEL),
    ]
    .into_iter()
    .filter(|(applies, _)| *applies)
    .map(|(_, label)| label)
    .collect();

    let narrative_fragment = if low_labels.len() >= 2 {
        Some(low_labels[..2].join(" and "))
    } else if let Some(first) = high_labels.first() {
        Some((*first).to_string())
    } else {
        low_labels.first().map(|label| (*label).to_string())
    };

    ScoreSummary {
        wells_low,
        geneva_low,
        perc_negative,
        any_high_risk,
        narrative_fragment,
    }
}
