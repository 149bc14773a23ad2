use thiserror::Error;

/// Why a source adapter produced no listings.
///
/// The aggregation engine never propagates these: each one is reported to
/// diagnostics and the source counts as having returned nothing.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Source not configured: {0}")]
    NotConfigured(String),

    #[error("Source failed: {0}")]
    Other(String),
}

/// A listing record that cannot take part in dedup or scoring.
#[derive(Debug, Error, PartialEq)]
pub enum ListingError {
    #[error("Listing '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },
}
