//! Percival — deterministic PE rule evaluation around an ML probability.
//!
//! The upstream model produces a pulmonary-embolism probability; this crate
//! wraps it with the explainable part of the workup: Wells, revised Geneva,
//! PERC, and YEARS scoring over a loosely-typed feature record, age-adjusted
//! D-dimer interpretation, a graded disposition decision, and a relevance
//! timeline over the patient's imaging and VTE history.

pub mod assessment;
pub mod config;
pub mod timeline;

pub use assessment::{
    Assessment, AssessmentEngine, AssessmentInput, Decision, DecisionSummary,
    DefaultAssessmentEngine, EngineError, FeatureVector, RawRecord, RiskBand, ScoreResult,
    TriState,
};
pub use timeline::{classify_history, HistoryRecord, TimelineEntry};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, honoring `RUST_LOG` when set.
/// Calling it twice is a no-op, so tests may call it freely.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
