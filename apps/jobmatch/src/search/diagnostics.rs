use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::errors::ListingError;
use crate::search::adapter::SourceOutcome;

/// Receives the engine's operational events.
///
/// Injected into `AggregationEngine` so the engine itself stays free of
/// output side effects. `TracingDiagnostics` is the production sink.
pub trait Diagnostics: Send + Sync {
    fn search_started(&self, _query: &str, _location: Option<&str>) {}
    fn source_finished(&self, outcome: &SourceOutcome);
    fn fallback_used(&self, kept: usize);
    fn listing_skipped(&self, source: &str, error: &ListingError);
}

/// Emits every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn search_started(&self, query: &str, location: Option<&str>) {
        info!(query, location = location.unwrap_or("any"), "Searching job sources");
    }

    fn source_finished(&self, outcome: &SourceOutcome) {
        match outcome {
            SourceOutcome::Listings { source, count } => {
                info!(source = %source, count, "Source returned listings");
            }
            SourceOutcome::Failed { source, reason } => {
                warn!(source = %source, %reason, "Source search failed; continuing without it");
            }
            SourceOutcome::Unavailable { source } => {
                debug!(source = %source, "Source not configured; skipped");
            }
        }
    }

    fn fallback_used(&self, kept: usize) {
        warn!(kept, "No live listings; using simulated listing set");
    }

    fn listing_skipped(&self, source: &str, error: &ListingError) {
        warn!(source, %error, "Skipping malformed listing");
    }
}

/// Event captured by `RecordingDiagnostics`.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    SourceFinished { source: String, failed: bool },
    FallbackUsed { kept: usize },
    ListingSkipped { source: String, message: String },
}

/// Keeps events in memory. Useful wherever callers need to inspect what
/// happened during a search, tests in particular.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn source_finished(&self, outcome: &SourceOutcome) {
        self.push(DiagnosticEvent::SourceFinished {
            source: outcome.source().to_string(),
            failed: outcome.is_failure(),
        });
    }

    fn fallback_used(&self, kept: usize) {
        self.push(DiagnosticEvent::FallbackUsed { kept });
    }

    fn listing_skipped(&self, source: &str, error: &ListingError) {
        self.push(DiagnosticEvent::ListingSkipped {
            source: source.to_string(),
            message: error.to_string(),
        });
    }
}
