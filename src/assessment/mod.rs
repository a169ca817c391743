//! PE risk assessment — deterministic clinical rules around a model probability.
//!
//! One pass over an immutable input snapshot:
//! 1. Feature resolution: alias lookup, unknowns kept explicit
//! 2. Rule scores: Wells, revised Geneva, PERC, YEARS
//! 3. D-dimer: unit normalization and age-adjusted threshold
//! 4. Decision: probability graded against the rule-out threshold
//! 5. Rationale: score agreement plus clinical signals, one paragraph
//!
//! Nothing here imputes. A feature the record never stated stays unknown
//! through scoring, decision, and rationale alike.

pub mod ddimer;
pub mod reference;

mod engine;
mod messages;
mod rationale;
mod resolver;
mod scores;
mod summary;
mod types;

pub use engine::*;
pub use messages::*;
pub use rationale::*;
pub use resolver::*;
pub use scores::*;
pub use summary::*;
pub use types::*;
