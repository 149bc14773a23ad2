use serde::{Deserialize, Serialize};

/// Point values for every scoring component.
///
/// Defaults reproduce the long-standing constants; `Config` can override any
/// of them through `MATCH_*` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    /// Multiplier for the covered fraction of a listing's requirements.
    pub skill_overlap: f64,
    /// Bonus when the title matches the candidate's seniority band.
    pub seniority: f64,
    /// Bonus for the first preferred location found in the listing location.
    pub preferred_location: f64,
    pub senior_min_years: u32,
    pub mid_min_years: u32,
    pub fallback: FallbackWeights,
}

/// Weights for ranking the built-in listing set when no live source answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackWeights {
    pub title_exact: f64,
    pub title_fuzzy: f64,
    pub title_fuzzy_threshold: f64,
    /// Per distinct requirement that matches a supplied skill.
    pub skill_match: f64,
    /// Per requirement that contains the query.
    pub query_in_requirement: f64,
    pub location_match: f64,
    /// Subtracted when a location filter was given and the listing misses it.
    pub location_mismatch_penalty: f64,
    pub max_results: usize,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skill_overlap: 100.0,
            seniority: 20.0,
            preferred_location: 15.0,
            senior_min_years: 5,
            mid_min_years: 2,
            fallback: FallbackWeights::default(),
        }
    }
}

impl Default for FallbackWeights {
    fn default() -> Self {
        Self {
            title_exact: 10.0,
            title_fuzzy: 5.0,
            title_fuzzy_threshold: 0.6,
            skill_match: 3.0,
            query_in_requirement: 2.0,
            location_match: 5.0,
            location_mismatch_penalty: 2.0,
            max_results: 20,
        }
    }
}
