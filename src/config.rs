/// Application-level constants
pub const APP_NAME: &str = "Percival";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default probability threshold separating rule-out from continue-workup.
/// Callers may override per assessment; the guideline cutoffs inside the
/// individual scoring rules are fixed and not configurable.
pub const DEFAULT_RULE_OUT_THRESHOLD: f64 = 0.10;

/// Default cap on the number of timeline entries produced per history record.
pub const DEFAULT_TIMELINE_CAP: usize = 20;

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "percival=info"
}
