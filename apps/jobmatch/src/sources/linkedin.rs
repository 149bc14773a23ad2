//! LinkedIn listings through the RapidAPI job-search proxy.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::SourceError;
use crate::models::ListingRecord;
use crate::search::adapter::{SearchQuery, SourceAdapter};
use crate::sources::skills::extract_skills;

pub const SOURCE_NAME: &str = "linkedin";
pub const DEFAULT_BASE_URL: &str = "https://linkedin-job-search-api.p.rapidapi.com";
const RAPIDAPI_HOST: &str = "linkedin-job-search-api.p.rapidapi.com";
const SEARCH_PATH: &str = "/active-jb-7d";
const PAGE_SIZE: &str = "20";
const MAX_DESCRIPTION_CHARS: usize = 500;
const HOURS_PER_YEAR: f64 = 40.0 * 52.0;

#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    locations_raw: Option<Vec<RawLocation>>,
    #[serde(default)]
    description_text: Option<String>,
    #[serde(default)]
    salary_raw: Option<RawSalary>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    date_posted: Option<String>,
    #[serde(default)]
    employment_type: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLocation {
    #[serde(default)]
    address: RawAddress,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAddress {
    address_locality: Option<String>,
    address_region: Option<String>,
    address_country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSalary {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    value: Option<RawSalaryValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSalaryValue {
    #[serde(default)]
    min_value: Option<f64>,
    #[serde(default)]
    max_value: Option<f64>,
    #[serde(default)]
    unit_text: Option<String>,
}

/// Source backed by the RapidAPI LinkedIn job-search endpoint.
/// Unavailable (and never called) without an API key.
pub struct LinkedInSource {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LinkedInSource {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SourceAdapter for LinkedInSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &SearchQuery<'_>) -> Result<Vec<ListingRecord>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::NotConfigured("RAPIDAPI_KEY is not set".to_string()))?;

        let title_filter = format!("\"{}\"", query.query);
        let location_filter = location_filter(query.location);
        debug!(%title_filter, %location_filter, "Querying LinkedIn job search");

        let response = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .header("x-rapidapi-key", api_key)
            .query(&[
                ("limit", PAGE_SIZE),
                ("offset", "0"),
                ("title_filter", title_filter.as_str()),
                ("location_filter", location_filter.as_str()),
                ("description_type", "text"),
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

        let items = match serde_json::from_str::<Value>(&body)? {
            Value::Array(items) => items,
            other => {
                debug!(payload_type = %json_type(&other), "LinkedIn payload is not a list; no listings");
                return Ok(Vec::new());
            }
        };

        let listings = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<RawJob>(item) {
                Ok(raw) => Some(raw.into_listing()),
                Err(e) => {
                    warn!(error = %e, "Skipping unparseable LinkedIn item");
                    None
                }
            })
            .collect();

        Ok(listings)
    }
}

impl RawJob {
    fn into_listing(self) -> ListingRecord {
        let title = self.title.unwrap_or_default();
        let id = match self.id {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => fallback_id(&title),
        };
        let description = self.description_text.unwrap_or_default();
        let requirements = extract_skills(&description);

        let mut listing = ListingRecord::new(
            id,
            title,
            self.organization.unwrap_or_default(),
            SOURCE_NAME,
        )
        .with_description(truncate_description(&description))
        .with_requirements(requirements)
        .with_salary(format_salary(self.salary_raw.as_ref()));

        listing.location = self
            .locations_raw
            .as_deref()
            .and_then(<[RawLocation]>::first)
            .and_then(join_address);
        listing.url = self.url.filter(|u| !u.is_empty());
        listing.date_posted = self.date_posted.as_deref().and_then(parse_posted_date);
        listing.employment_type = self
            .employment_type
            .filter(|types| !types.is_empty())
            .map(|types| types.join(", "));
        listing
    }
}

/// `location_filter` parameter for the proxy. "Remote" widens to the
/// default countries plus remote postings.
fn location_filter(location: Option<&str>) -> String {
    match location {
        Some(loc) if loc.eq_ignore_ascii_case("remote") => {
            r#""United States" OR "United Kingdom" OR "Remote""#.to_string()
        }
        Some(loc) => format!("\"{loc}\""),
        None => r#""United States" OR "United Kingdom""#.to_string(),
    }
}

fn join_address(location: &RawLocation) -> Option<String> {
    let address = &location.address;
    let parts: Vec<&str> = [
        address.address_locality.as_deref(),
        address.address_region.as_deref(),
        address.address_country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|p| !p.is_empty())
    .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        let head: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

fn fallback_id(title: &str) -> String {
    let mut hasher = DefaultHasher::new();
    title.hash(&mut hasher);
    format!("{SOURCE_NAME}_{}", hasher.finish())
}

fn parse_posted_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Human-readable yearly salary range. Hourly rates are annualized at
/// 40h × 52 weeks.
fn format_salary(salary: Option<&RawSalary>) -> String {
    const NOT_SPECIFIED: &str = "Not specified";

    let Some(salary) = salary else {
        return NOT_SPECIFIED.to_string();
    };
    let Some(value) = &salary.value else {
        return NOT_SPECIFIED.to_string();
    };

    let currency = salary.currency.as_deref().unwrap_or("USD");
    let min = value.min_value.filter(|v| *v != 0.0);
    let max = value.max_value.filter(|v| *v != 0.0);
    let hourly = value.unit_text.as_deref() == Some("HOUR");

    match (min, max) {
        (Some(min), Some(max)) if hourly => format!(
            "{currency} {} - {} /year (est. from hourly)",
            format_amount(min * HOURS_PER_YEAR),
            format_amount(max * HOURS_PER_YEAR)
        ),
        (Some(min), Some(max)) => {
            format!("{currency} {} - {} /year", format_amount(min), format_amount(max))
        }
        (Some(min), None) => format!("{currency} {}+ /year", format_amount(min)),
        (None, Some(max)) => format!("Up to {currency} {} /year", format_amount(max)),
        (None, None) => NOT_SPECIFIED.to_string(),
    }
}

/// Whole-number amount with thousands separators.
fn format_amount(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
