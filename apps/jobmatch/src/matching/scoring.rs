//! Scoring Engine: heuristic relevance of a listing for a candidate.
//!
//! The score is an unbounded, non-negative sum of independent components,
//! each a pure function of `(profile, listing)`:
//!
//! 1. skill overlap: covered fraction of the listing's requirements × 100
//! 2. seniority: +20 when the title matches the candidate's experience band
//! 3. location: +15 for the first preferred location found in the listing
//!
//! Scores only compare meaningfully within a single result set.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::matching::fuzzy;
use crate::matching::weights::{FallbackWeights, MatchWeights};
use crate::models::{CandidateProfile, ListingRecord};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Per-component contributions, kept for transparency and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub seniority: f64,
    pub location: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub score: f64,
    /// One-line explanation, always derived from the skill overlap.
    pub reason: String,
    pub breakdown: ScoreBreakdown,
}

/// Skill coverage of one listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillOverlap {
    pub matched: usize,
    pub required: usize,
}

impl SkillOverlap {
    pub fn reason(&self) -> String {
        format!("{} matching skills out of {}", self.matched, self.required)
    }
}

/// Seniority band implied by years of experience. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeniorityBand {
    Senior,
    Mid,
    Junior,
}

impl SeniorityBand {
    pub fn for_years(years: u32, weights: &MatchWeights) -> Self {
        if years >= weights.senior_min_years {
            SeniorityBand::Senior
        } else if years >= weights.mid_min_years {
            SeniorityBand::Mid
        } else {
            SeniorityBand::Junior
        }
    }

    fn title_keywords(self) -> &'static [&'static str] {
        match self {
            SeniorityBand::Senior => &["senior"],
            SeniorityBand::Mid => &["mid", "intermediate"],
            SeniorityBand::Junior => &["junior", "entry"],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Pluggable scorer. The aggregation engine holds an `Arc<dyn MatchScorer>`.
pub trait MatchScorer: Send + Sync {
    fn score(&self, profile: &CandidateProfile, listing: &ListingRecord) -> MatchScore;
}

/// Default deterministic scorer built from the weighted components below.
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    weights: MatchWeights,
}

impl HeuristicScorer {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }
}

impl MatchScorer for HeuristicScorer {
    fn score(&self, profile: &CandidateProfile, listing: &ListingRecord) -> MatchScore {
        let overlap = skill_overlap(&profile.skill_set(), listing);
        let breakdown = ScoreBreakdown {
            skills: skill_points(overlap, &self.weights),
            seniority: seniority_points(profile.years_of_experience(), &listing.title, &self.weights),
            location: location_points(&profile.preferred_locations, listing, &self.weights),
        };

        MatchScore {
            score: breakdown.skills + breakdown.seniority + breakdown.location,
            reason: overlap.reason(),
            breakdown,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Components
// ────────────────────────────────────────────────────────────────────────────

/// Case-insensitive intersection of candidate skills and listing requirements.
pub fn skill_overlap(skills: &BTreeSet<String>, listing: &ListingRecord) -> SkillOverlap {
    let requirements = listing.requirement_set();
    SkillOverlap {
        matched: requirements.intersection(skills).count(),
        required: requirements.len(),
    }
}

/// `matched / max(1, required) × weight`
pub fn skill_points(overlap: SkillOverlap, weights: &MatchWeights) -> f64 {
    overlap.matched as f64 / overlap.required.max(1) as f64 * weights.skill_overlap
}

pub fn seniority_points(years: u32, title: &str, weights: &MatchWeights) -> f64 {
    let title = title.to_lowercase();
    let band = SeniorityBand::for_years(years, weights);
    if band.title_keywords().iter().any(|kw| title.contains(kw)) {
        weights.seniority
    } else {
        0.0
    }
}

/// Bonus for the first preferred location contained in the listing location.
/// Not cumulative across several matching preferences.
pub fn location_points(
    preferred_locations: &[String],
    listing: &ListingRecord,
    weights: &MatchWeights,
) -> f64 {
    let listing_location = listing.location_lower();
    let matched = preferred_locations
        .iter()
        .any(|pref| listing_location.contains(&pref.to_lowercase()));
    if matched {
        weights.preferred_location
    } else {
        0.0
    }
}

/// Query-to-title relevance used when ranking the built-in fallback set.
/// `query_lower` must already be lowercased.
pub fn title_points(query_lower: &str, title: &str, weights: &FallbackWeights) -> f64 {
    let title = title.to_lowercase();
    if title.contains(query_lower) {
        weights.title_exact
    } else if fuzzy::is_match(query_lower, &title, weights.title_fuzzy_threshold) {
        weights.title_fuzzy
    } else {
        0.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking
// ────────────────────────────────────────────────────────────────────────────

/// Scores every listing for `profile` and sorts by score, highest first.
/// The sort is stable: equal scores keep their incoming order.
pub fn rank(
    mut listings: Vec<ListingRecord>,
    profile: &CandidateProfile,
    scorer: &dyn MatchScorer,
) -> Vec<ListingRecord> {
    for listing in &mut listings {
        let result = scorer.score(profile, listing);
        listing.apply_score(result.score, result.reason);
    }
    sort_by_score(&mut listings);
    listings
}

/// Stable descending sort on `match_score`; unscored listings sort as 0.
pub fn sort_by_score(listings: &mut [ListingRecord]) {
    listings.sort_by(|a, b| {
        let a = a.match_score.unwrap_or(0.0);
        let b = b.match_score.unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
