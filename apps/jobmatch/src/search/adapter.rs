use async_trait::async_trait;
use serde::Serialize;

use crate::errors::SourceError;
use crate::models::ListingRecord;

/// Query parameters handed to every source.
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery<'a> {
    pub query: &'a str,
    pub location: Option<&'a str>,
    pub skills: Option<&'a [String]>,
}

/// A job-listing provider.
///
/// "No results" is `Ok(vec![])`; `Err` is reserved for connectivity, auth,
/// and payload failures. Each implementation owns its own timeout.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Provenance tag, also used in diagnostics.
    fn name(&self) -> &str;

    /// Whether the source is configured well enough to be queried.
    fn is_available(&self) -> bool {
        true
    }

    async fn search(&self, query: &SearchQuery<'_>) -> Result<Vec<ListingRecord>, SourceError>;
}

/// Tagged result of querying one source.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Listings { source: String, count: usize },
    Failed { source: String, reason: String },
    Unavailable { source: String },
}

impl SourceOutcome {
    pub fn source(&self) -> &str {
        match self {
            SourceOutcome::Listings { source, .. }
            | SourceOutcome::Failed { source, .. }
            | SourceOutcome::Unavailable { source } => source,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SourceOutcome::Failed { .. })
    }
}

/// Runs one adapter and folds its result into an outcome plus listings.
/// Never fails: errors become `SourceOutcome::Failed` with no listings.
pub async fn run_adapter(
    adapter: &dyn SourceAdapter,
    query: &SearchQuery<'_>,
) -> (SourceOutcome, Vec<ListingRecord>) {
    let source = adapter.name().to_string();

    if !adapter.is_available() {
        return (SourceOutcome::Unavailable { source }, Vec::new());
    }

    match adapter.search(query).await {
        Ok(listings) => (
            SourceOutcome::Listings {
                source,
                count: listings.len(),
            },
            listings,
        ),
        Err(e) => (
            SourceOutcome::Failed {
                source,
                reason: e.to_string(),
            },
            Vec::new(),
        ),
    }
}
