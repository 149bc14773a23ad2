// Concrete job-listing sources. The engine only sees them as
// `Arc<dyn SourceAdapter>`; registration order here is result order.

pub mod indeed;
pub mod linkedin;
pub mod skills;

use std::sync::Arc;

use crate::config::Config;
use crate::errors::SourceError;
use crate::search::SourceAdapter;

pub use indeed::IndeedSource;
pub use linkedin::LinkedInSource;

/// Every bundled source, configured from `config`. Sources lacking
/// credentials are still registered and report themselves unavailable.
pub fn configured_sources(config: &Config) -> Result<Vec<Arc<dyn SourceAdapter>>, SourceError> {
    let linkedin = LinkedInSource::new(config.rapidapi_key.clone(), config.source_timeout)?
        .with_base_url(config.linkedin_base_url.clone());
    let indeed = IndeedSource::new(
        config.indeed_api_key.clone(),
        config.indeed_publisher_id.clone(),
        config.source_timeout,
    )?
    .with_base_url(config.indeed_base_url.clone());

    Ok(vec![Arc::new(linkedin), Arc::new(indeed)])
}
