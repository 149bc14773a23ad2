use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::SourceError;
use crate::models::ListingRecord;
use crate::search::adapter::{SearchQuery, SourceAdapter};

pub const SOURCE_NAME: &str = "indeed";
pub const DEFAULT_BASE_URL: &str = "http://api.indeed.com/ads/apisearch";
const PAGE_SIZE: &str = "10";

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    results: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJob {
    #[serde(rename = "jobkey")]
    job_key: Option<String>,
    #[serde(rename = "jobtitle", default)]
    job_title: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    formatted_location: Option<String>,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    url: Option<String>,
}

/// Indeed publisher search API. Needs both an API key and a publisher id.
/// Indeed returns no structured requirements, so listings carry none.
pub struct IndeedSource {
    client: Client,
    api_key: Option<String>,
    publisher_id: Option<String>,
    base_url: String,
}

impl IndeedSource {
    pub fn new(
        api_key: Option<String>,
        publisher_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            publisher_id: publisher_id.filter(|p| !p.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SourceAdapter for IndeedSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some() && self.publisher_id.is_some()
    }

    async fn search(&self, query: &SearchQuery<'_>) -> Result<Vec<ListingRecord>, SourceError> {
        let publisher = self.publisher_id.as_deref().ok_or_else(|| {
            SourceError::NotConfigured("INDEED_PUBLISHER_ID is not set".to_string())
        })?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("publisher", publisher),
                ("q", query.query),
                ("l", query.location.unwrap_or_default()),
                ("sort", "date"),
                ("format", "json"),
                ("v", "2"),
                ("limit", PAGE_SIZE),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: RawResponse = serde_json::from_str(&body)?;
        Ok(parsed.results.into_iter().map(RawJob::into_listing).collect())
    }
}

impl RawJob {
    fn into_listing(self) -> ListingRecord {
        let id = format!("{SOURCE_NAME}_{}", self.job_key.unwrap_or_default());
        let mut listing = ListingRecord::new(id, self.job_title, self.company, SOURCE_NAME)
            .with_description(self.snippet)
            .with_salary("Not specified");
        listing.location = self.formatted_location.filter(|l| !l.trim().is_empty());
        listing.url = self.url.filter(|u| !u.is_empty());
        listing
    }
}
