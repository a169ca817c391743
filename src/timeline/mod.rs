//! Relevance timeline — chronological view of the history behind a PE workup.
//!
//! Classifies raw history events (imaging studies, prior VTE, procedures)
//! into relevance tiers, labels each with relative time, and returns a
//! newest-first, capped `Vec<TimelineEntry>`. The timeline is derived state:
//! the same history and clock regenerate the identical timeline, so callers
//! may rebuild it whenever the underlying record changes.

mod classify;
mod types;

pub use classify::*;
pub use types::*;

// ── Tests ──────────────────────────────────────────────────────────────────
