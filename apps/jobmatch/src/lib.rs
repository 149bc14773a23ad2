pub mod config;
pub mod errors;
pub mod matching;
pub mod models;
pub mod search;
pub mod sources;

pub use config::Config;
pub use errors::{ListingError, SourceError};
pub use matching::{HeuristicScorer, MatchScorer, MatchWeights};
pub use models::{CandidateProfile, ListingRecord};
pub use search::{AggregationEngine, SearchRequest, SearchResults, SourceAdapter};
