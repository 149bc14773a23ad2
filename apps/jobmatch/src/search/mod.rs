// Search orchestration: the source adapter seam, diagnostics sink,
// offline fallback catalog, and the aggregation engine tying them together.

pub mod adapter;
pub mod diagnostics;
pub mod engine;
pub mod fallback;

pub use adapter::{SearchQuery, SourceAdapter, SourceOutcome};
pub use diagnostics::{Diagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use engine::{AggregationEngine, SearchRequest, SearchResults};
pub use fallback::{FallbackCatalog, FALLBACK_SOURCE};
