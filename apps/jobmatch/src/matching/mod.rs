// Matching core: fuzzy similarity, canonical dedup, and weighted scoring.
// Pure functions only; no I/O and no logging happens below this module.

pub mod dedup;
pub mod fuzzy;
pub mod scoring;
pub mod weights;

pub use dedup::dedupe;
pub use fuzzy::{is_match, similarity};
pub use scoring::{rank, HeuristicScorer, MatchScore, MatchScorer};
pub use weights::{FallbackWeights, MatchWeights};
