//! Aggregation Engine: fans a query out to every source, merges, dedupes,
//! and ranks.
//!
//! Stateless per call. The only retained state is the read-only source list,
//! scorer, diagnostics sink, and fallback catalog fixed at construction.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use serde::Serialize;

use crate::matching::dedup::dedupe;
use crate::matching::scoring::{rank, HeuristicScorer, MatchScorer};
use crate::matching::weights::MatchWeights;
use crate::models::{CandidateProfile, ListingRecord};
use crate::search::adapter::{run_adapter, SearchQuery, SourceAdapter, SourceOutcome};
use crate::search::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::search::fallback::FallbackCatalog;

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

/// One search as supplied by a caller.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub location: Option<String>,
    pub skills: Option<Vec<String>>,
    pub profile: Option<CandidateProfile>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Search driven entirely by a profile: its first preferred role is the
    /// query and its first preferred location the filter.
    pub fn for_profile(profile: CandidateProfile) -> Self {
        Self {
            query: String::new(),
            location: profile.preferred_locations.first().cloned(),
            skills: Some(profile.skills.clone()),
            profile: Some(profile),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = Some(skills);
        self
    }

    pub fn with_profile(mut self, profile: CandidateProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// The explicit query, or the profile's primary role when it is blank.
    pub fn resolved_query(&self) -> String {
        let explicit = self.query.trim();
        if !explicit.is_empty() {
            return explicit.to_string();
        }
        self.profile
            .as_ref()
            .and_then(|p| p.primary_role())
            .unwrap_or_default()
            .to_string()
    }

    fn location_filter(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// Skills for source queries and fallback ranking.
    fn search_skills(&self) -> &[String] {
        match (&self.skills, &self.profile) {
            (Some(skills), _) if !skills.is_empty() => skills,
            (_, Some(profile)) => &profile.skills,
            _ => &[],
        }
    }

    /// Profile to score against: the explicit one, or one synthesized from
    /// the skill list and location filter. `None` leaves results unscored.
    fn scoring_profile(&self) -> Option<CandidateProfile> {
        if let Some(profile) = &self.profile {
            return Some(profile.clone());
        }
        match &self.skills {
            Some(skills) if !skills.is_empty() => {
                Some(CandidateProfile::from_skills(skills, self.location_filter()))
            }
            _ => None,
        }
    }
}

/// Everything a search produced, including per-source outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub listings: Vec<ListingRecord>,
    pub outcomes: Vec<SourceOutcome>,
    pub used_fallback: bool,
    pub skipped_malformed: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct AggregationEngine {
    sources: Vec<Arc<dyn SourceAdapter>>,
    scorer: Arc<dyn MatchScorer>,
    diagnostics: Arc<dyn Diagnostics>,
    fallback: FallbackCatalog,
    weights: MatchWeights,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new(MatchWeights::default())
    }
}

impl AggregationEngine {
    /// Engine with no sources, the heuristic scorer, tracing diagnostics,
    /// and the built-in fallback catalog.
    pub fn new(weights: MatchWeights) -> Self {
        Self {
            sources: Vec::new(),
            scorer: Arc::new(HeuristicScorer::new(weights.clone())),
            diagnostics: Arc::new(TracingDiagnostics),
            fallback: FallbackCatalog::default(),
            weights,
        }
    }

    /// Registers a source. Registration order fixes result concatenation
    /// order, and with it which duplicate survives dedup.
    pub fn with_source(mut self, source: Arc<dyn SourceAdapter>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn MatchScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackCatalog) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Caller-facing entry point: deduplicated, optionally ranked listings.
    pub async fn aggregate(
        &self,
        query: &str,
        location: Option<&str>,
        skills: Option<&[String]>,
        profile: Option<&CandidateProfile>,
    ) -> Vec<ListingRecord> {
        let request = SearchRequest {
            query: query.to_string(),
            location: location.map(str::to_string),
            skills: skills.map(<[String]>::to_vec),
            profile: profile.cloned(),
        };
        self.search(&request).await.listings
    }

    /// Full search with per-source outcomes. Never fails; every failure mode
    /// shrinks the result set instead.
    ///
    /// 1. Query all sources concurrently, concatenating in registration order
    /// 2. Drop malformed listings
    /// 3. Fall back to the built-in catalog if nothing is left
    /// 4. Dedupe
    /// 5. Score and stably sort when a profile is available
    pub async fn search(&self, request: &SearchRequest) -> SearchResults {
        let query = request.resolved_query();
        let location = request.location_filter();
        self.diagnostics.search_started(&query, location);

        let skills = request.search_skills();
        let (outcomes, fetched) = self
            .fetch_all(&query, location, (!skills.is_empty()).then_some(skills))
            .await;

        let mut skipped_malformed = 0;
        let mut merged: Vec<ListingRecord> = Vec::with_capacity(fetched.len());
        for listing in fetched {
            match listing.validate() {
                Ok(()) => merged.push(listing),
                Err(e) => {
                    skipped_malformed += 1;
                    self.diagnostics.listing_skipped(&listing.source, &e);
                }
            }
        }

        let used_fallback = merged.is_empty();
        if used_fallback {
            merged = self.fallback.select(
                &query,
                location,
                skills,
                &self.weights.fallback,
            );
            self.diagnostics.fallback_used(merged.len());
        }

        let unique = dedupe(merged);

        let listings = match request.scoring_profile() {
            Some(profile) => rank(unique, &profile, self.scorer.as_ref()),
            None => unique,
        };

        SearchResults {
            query,
            listings,
            outcomes,
            used_fallback,
            skipped_malformed,
        }
    }

    /// Queries every source concurrently on the caller's task. A panicking
    /// source is reported as failed. `join_all` returns results in
    /// registration order regardless of completion order. No particular
    /// async runtime is required.
    async fn fetch_all(
        &self,
        query: &str,
        location: Option<&str>,
        skills: Option<&[String]>,
    ) -> (Vec<SourceOutcome>, Vec<ListingRecord>) {
        let params = SearchQuery {
            query,
            location,
            skills,
        };

        let runs = self.sources.iter().map(|source| {
            AssertUnwindSafe(run_adapter(source.as_ref(), &params)).catch_unwind()
        });
        let joined = join_all(runs).await;

        let mut outcomes = Vec::with_capacity(self.sources.len());
        let mut listings = Vec::new();
        for (source, result) in self.sources.iter().zip(joined) {
            let (outcome, found) = result.unwrap_or_else(|panic| {
                (
                    SourceOutcome::Failed {
                        source: source.name().to_string(),
                        reason: format!("source panicked: {}", panic_message(panic.as_ref())),
                    },
                    Vec::new(),
                )
            });
            self.diagnostics.source_finished(&outcome);
            outcomes.push(outcome);
            listings.extend(found);
        }

        (outcomes, listings)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::SourceError;
    use crate::search::diagnostics::{DiagnosticEvent, RecordingDiagnostics};
    use crate::search::fallback::FALLBACK_SOURCE;

    struct StaticSource {
        name: &'static str,
        listings: Vec<ListingRecord>,
        delay_ms: u64,
    }

    impl StaticSource {
        fn new(name: &'static str, listings: Vec<ListingRecord>) -> Arc<Self> {
            Arc::new(Self {
                name,
                listings,
                delay_ms: 0,
            })
        }

        fn delayed(name: &'static str, listings: Vec<ListingRecord>, delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                name,
                listings,
                delay_ms,
            })
        }
    }

    #[async_trait]
    impl SourceAdapter for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(&self, _query: &SearchQuery<'_>) -> Result<Vec<ListingRecord>, SourceError> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            Ok(self.listings.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SourceAdapter for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn search(&self, _query: &SearchQuery<'_>) -> Result<Vec<ListingRecord>, SourceError> {
            Err(SourceError::Status {
                status: 401,
                body: "bad key".to_string(),
            })
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl SourceAdapter for PanickingSource {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn search(&self, _query: &SearchQuery<'_>) -> Result<Vec<ListingRecord>, SourceError> {
            panic!("adapter bug")
        }
    }

    /// Echoes the query it received back as a listing title.
    struct EchoSource;

    #[async_trait]
    impl SourceAdapter for EchoSource {
        fn name(&self) -> &str {
            "echo"
        }

        async fn search(&self, query: &SearchQuery<'_>) -> Result<Vec<ListingRecord>, SourceError> {
            let mut listing = ListingRecord::new("e", query.query, "Echo Co", "echo");
            if let Some(loc) = query.location {
                listing = listing.with_location(loc);
            }
            if let Some(skills) = query.skills {
                listing = listing.with_requirements(skills.iter().cloned());
            }
            Ok(vec![listing])
        }
    }

    fn job(id: &str, title: &str, company: &str, location: &str, source: &str) -> ListingRecord {
        ListingRecord::new(id, title, company, source).with_location(location)
    }

    fn quiet() -> Arc<RecordingDiagnostics> {
        Arc::new(RecordingDiagnostics::default())
    }

    #[tokio::test]
    async fn test_duplicates_across_sources_keep_first_source() {
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(StaticSource::new(
                "x",
                vec![job("1", "Backend Engineer", "Acme", "Remote", "x")],
            ))
            .with_source(StaticSource::new(
                "y",
                vec![job("1", "backend engineer", "ACME", "remote", "y")],
            ));

        let listings = engine.aggregate("engineer", None, None, None).await;
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].source, "x");
        assert!(!listings[0].is_scored());
    }

    #[tokio::test]
    async fn test_concatenation_follows_registration_not_completion_order() {
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(StaticSource::delayed(
                "slow",
                vec![job("s", "Backend Engineer", "Acme", "Remote", "slow")],
                50,
            ))
            .with_source(StaticSource::new(
                "fast",
                vec![
                    job("f", "Backend Engineer", "Acme", "Remote", "fast"),
                    job("g", "Data Scientist", "Data Corp", "Remote", "fast"),
                ],
            ));

        let listings = engine.aggregate("engineer", None, None, None).await;
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["s", "g"]);
    }

    #[tokio::test]
    async fn test_failing_source_does_not_abort_others() {
        let diagnostics = quiet();
        let engine = AggregationEngine::default()
            .with_diagnostics(diagnostics.clone())
            .with_source(Arc::new(FailingSource))
            .with_source(StaticSource::new(
                "ok",
                vec![job("1", "QA Engineer", "Quality First", "Denver, CO", "ok")],
            ));

        let results = engine.search(&SearchRequest::new("qa")).await;
        assert_eq!(results.listings.len(), 1);
        assert!(!results.used_fallback);
        assert!(results.outcomes[0].is_failure());
        assert!(diagnostics.events().contains(&DiagnosticEvent::SourceFinished {
            source: "failing".to_string(),
            failed: true
        }));
    }

    #[tokio::test]
    async fn test_panicking_source_is_treated_as_failure() {
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(Arc::new(PanickingSource))
            .with_source(StaticSource::new(
                "ok",
                vec![job("1", "QA Engineer", "Quality First", "Denver, CO", "ok")],
            ));

        let results = engine.search(&SearchRequest::new("qa")).await;
        assert_eq!(results.listings.len(), 1);
        assert!(results.outcomes[0].is_failure());
        assert_eq!(results.outcomes[0].source(), "panicking");
    }

    #[tokio::test]
    async fn test_no_sources_falls_back_to_simulated_set() {
        let diagnostics = quiet();
        let engine = AggregationEngine::default().with_diagnostics(diagnostics.clone());

        let listings = engine.aggregate("Engineer", Some("Remote"), None, None).await;
        assert!(!listings.is_empty());
        assert!(listings.iter().all(|l| l.source == FALLBACK_SOURCE));
        assert!(diagnostics
            .events()
            .iter()
            .any(|e| matches!(e, DiagnosticEvent::FallbackUsed { .. })));
    }

    #[tokio::test]
    async fn test_all_sources_empty_or_failing_falls_back() {
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(StaticSource::new("empty", vec![]))
            .with_source(Arc::new(FailingSource));

        let results = engine.search(&SearchRequest::new("developer")).await;
        assert!(results.used_fallback);
        assert!(!results.listings.is_empty());
    }

    #[tokio::test]
    async fn test_empty_fallback_catalog_yields_empty_result() {
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_fallback(FallbackCatalog::new(vec![]));

        let results = engine.search(&SearchRequest::new("developer")).await;
        assert!(results.used_fallback);
        assert!(results.listings.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_listings_are_skipped() {
        let diagnostics = quiet();
        let engine = AggregationEngine::default()
            .with_diagnostics(diagnostics.clone())
            .with_source(StaticSource::new(
                "mixed",
                vec![
                    job("bad", "  ", "Acme", "Remote", "mixed"),
                    job("good", "Backend Engineer", "Acme", "Remote", "mixed"),
                ],
            ));

        let results = engine.search(&SearchRequest::new("backend")).await;
        assert_eq!(results.skipped_malformed, 1);
        assert_eq!(results.listings.len(), 1);
        assert_eq!(results.listings[0].id, "good");
        assert!(diagnostics
            .events()
            .iter()
            .any(|e| matches!(e, DiagnosticEvent::ListingSkipped { .. })));
    }

    #[tokio::test]
    async fn test_only_malformed_listings_trigger_fallback() {
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(StaticSource::new(
                "broken",
                vec![job("bad", "Engineer", "", "Remote", "broken")],
            ));

        let results = engine.search(&SearchRequest::new("engineer")).await;
        assert!(results.used_fallback);
        assert!(results.listings.iter().all(|l| l.source == FALLBACK_SOURCE));
    }

    #[tokio::test]
    async fn test_profile_ranks_by_score_descending() {
        let profile = CandidateProfile {
            skills: vec!["Python".to_string(), "AWS".to_string()],
            preferred_roles: vec!["Engineer".to_string()],
            preferred_locations: vec!["Remote".to_string()],
            experience: "6 years".to_string(),
        };
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(StaticSource::new(
                "x",
                vec![
                    job("low", "Junior Developer", "A", "Boston, MA", "x").with_requirements(["Go"]),
                    job("high", "Senior Engineer", "B", "Remote", "x")
                        .with_requirements(["Python", "AWS"]),
                    job("mid", "Engineer", "C", "Remote", "x").with_requirements(["Python", "Go"]),
                ],
            ));

        let listings = engine.aggregate("", None, None, Some(&profile)).await;
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
        assert_eq!(listings[0].match_score, Some(135.0));
        assert_eq!(
            listings[0].match_reason.as_deref(),
            Some("2 matching skills out of 2")
        );
    }

    #[tokio::test]
    async fn test_profile_scoring_replaces_fallback_relevance() {
        let profile = CandidateProfile {
            skills: vec!["Python".to_string()],
            experience: "1 year".to_string(),
            ..Default::default()
        };
        let engine = AggregationEngine::default().with_diagnostics(quiet());

        let listings = engine.aggregate("Junior", None, None, Some(&profile)).await;
        let junior = listings
            .iter()
            .find(|l| l.title == "Junior Software Developer")
            .unwrap();
        // no Python in its requirements, junior band bonus only
        assert_eq!(junior.match_score, Some(20.0));
    }

    #[tokio::test]
    async fn test_skills_without_profile_still_rank() {
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(StaticSource::new(
                "x",
                vec![
                    job("a", "Engineer", "A", "Remote", "x").with_requirements(["Java"]),
                    job("b", "Engineer", "B", "Remote", "x").with_requirements(["Rust"]),
                ],
            ));

        let skills = vec!["rust".to_string()];
        let listings = engine.aggregate("engineer", None, Some(&skills), None).await;
        assert_eq!(listings[0].id, "b");
        assert!(listings.iter().all(|l| l.is_scored()));
    }

    #[tokio::test]
    async fn test_profile_primary_role_becomes_query() {
        let profile = CandidateProfile {
            preferred_roles: vec!["Platform Engineer".to_string()],
            preferred_locations: vec!["Lisbon".to_string()],
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(Arc::new(EchoSource));

        let results = engine.search(&SearchRequest::for_profile(profile)).await;
        assert_eq!(results.query, "Platform Engineer");
        assert_eq!(results.listings[0].title, "Platform Engineer");
        assert_eq!(results.listings[0].display_location(), "Lisbon");
        assert_eq!(results.listings[0].requirements, vec!["Rust".to_string()]);
    }

    #[tokio::test]
    async fn test_profile_skills_reach_live_sources() {
        let profile = CandidateProfile {
            skills: vec!["Rust".to_string(), "Kafka".to_string()],
            ..Default::default()
        };
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(Arc::new(EchoSource));

        let listings = engine.aggregate("engineer", None, None, Some(&profile)).await;
        assert_eq!(listings[0].requirements, profile.skills);
    }

    #[tokio::test]
    async fn test_explicit_skills_take_precedence_over_profile() {
        let profile = CandidateProfile {
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(Arc::new(EchoSource));

        let skills = vec!["Go".to_string()];
        let listings = engine
            .aggregate("engineer", None, Some(&skills), Some(&profile))
            .await;
        assert_eq!(listings[0].requirements, skills);
    }

    #[test]
    fn test_search_runs_without_tokio_runtime() {
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(Arc::new(PanickingSource))
            .with_source(StaticSource::new(
                "ok",
                vec![job("1", "QA Engineer", "Quality First", "Denver, CO", "ok")],
            ));

        let results = futures::executor::block_on(engine.search(&SearchRequest::new("qa")));
        assert_eq!(results.listings.len(), 1);
        assert!(results.outcomes[0].is_failure());
        if let SourceOutcome::Failed { reason, .. } = &results.outcomes[0] {
            assert!(reason.contains("adapter bug"));
        }
    }

    #[tokio::test]
    async fn test_ties_keep_dedup_order() {
        let profile = CandidateProfile::default();
        let engine = AggregationEngine::default()
            .with_diagnostics(quiet())
            .with_source(StaticSource::new(
                "x",
                vec![
                    job("1", "A", "Co", "Remote", "x"),
                    job("2", "B", "Co", "Remote", "x"),
                    job("3", "C", "Co", "Remote", "x"),
                ],
            ));

        let listings = engine.aggregate("any", None, None, Some(&profile)).await;
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_resolved_query_prefers_explicit() {
        let profile = CandidateProfile {
            preferred_roles: vec!["Data Engineer".to_string()],
            ..Default::default()
        };
        let request = SearchRequest::new(" Rust ").with_profile(profile.clone());
        assert_eq!(request.resolved_query(), "Rust");
        let request = SearchRequest::new("").with_profile(profile);
        assert_eq!(request.resolved_query(), "Data Engineer");
    }
}
