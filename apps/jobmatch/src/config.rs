use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::matching::weights::MatchWeights;
use crate::sources::{indeed, linkedin};

/// Runtime configuration loaded from environment variables.
/// Every variable is optional; sources without credentials stay unavailable.
#[derive(Debug, Clone)]
pub struct Config {
    pub rapidapi_key: Option<String>,
    pub linkedin_base_url: String,
    pub indeed_api_key: Option<String>,
    pub indeed_publisher_id: Option<String>,
    pub indeed_base_url: String,
    pub source_timeout: Duration,
    pub rust_log: String,
    pub weights: MatchWeights,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Malformed numbers are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs: u64 = parse_var(&lookup, "SOURCE_TIMEOUT_SECS", 15)?;

        Ok(Config {
            rapidapi_key: optional("RAPIDAPI_KEY"),
            linkedin_base_url: optional("LINKEDIN_API_URL")
                .unwrap_or_else(|| linkedin::DEFAULT_BASE_URL.to_string()),
            indeed_api_key: optional("INDEED_API_KEY"),
            indeed_publisher_id: optional("INDEED_PUBLISHER_ID"),
            indeed_base_url: optional("INDEED_API_URL")
                .unwrap_or_else(|| indeed::DEFAULT_BASE_URL.to_string()),
            source_timeout: Duration::from_secs(timeout_secs),
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            weights: load_weights(&lookup)?,
        })
    }
}

fn load_weights<F>(lookup: &F) -> Result<MatchWeights>
where
    F: Fn(&str) -> Option<String>,
{
    let d = MatchWeights::default();
    let fb = d.fallback.clone();

    let mut weights = MatchWeights {
        skill_overlap: parse_var(lookup, "MATCH_SKILL_OVERLAP", d.skill_overlap)?,
        seniority: parse_var(lookup, "MATCH_SENIORITY", d.seniority)?,
        preferred_location: parse_var(lookup, "MATCH_PREFERRED_LOCATION", d.preferred_location)?,
        senior_min_years: parse_var(lookup, "MATCH_SENIOR_MIN_YEARS", d.senior_min_years)?,
        mid_min_years: parse_var(lookup, "MATCH_MID_MIN_YEARS", d.mid_min_years)?,
        fallback: fb.clone(),
    };
    weights.fallback.title_exact = parse_var(lookup, "MATCH_TITLE_EXACT", fb.title_exact)?;
    weights.fallback.title_fuzzy = parse_var(lookup, "MATCH_TITLE_FUZZY", fb.title_fuzzy)?;
    weights.fallback.title_fuzzy_threshold =
        parse_var(lookup, "MATCH_FUZZY_THRESHOLD", fb.title_fuzzy_threshold)?;
    weights.fallback.skill_match = parse_var(lookup, "MATCH_SKILL_MATCH", fb.skill_match)?;
    weights.fallback.query_in_requirement =
        parse_var(lookup, "MATCH_QUERY_IN_REQUIREMENT", fb.query_in_requirement)?;
    weights.fallback.location_match =
        parse_var(lookup, "MATCH_LOCATION_MATCH", fb.location_match)?;
    weights.fallback.location_mismatch_penalty = parse_var(
        lookup,
        "MATCH_LOCATION_MISMATCH_PENALTY",
        fb.location_mismatch_penalty,
    )?;
    weights.fallback.max_results = parse_var(lookup, "FALLBACK_MAX_RESULTS", fb.max_results)?;

    // Scores must stay finite and non-negative. The mismatch penalty is
    // subtracted, so only finiteness applies to it.
    let fb = &weights.fallback;
    for (name, value) in [
        ("MATCH_SKILL_OVERLAP", weights.skill_overlap),
        ("MATCH_SENIORITY", weights.seniority),
        ("MATCH_PREFERRED_LOCATION", weights.preferred_location),
        ("MATCH_TITLE_EXACT", fb.title_exact),
        ("MATCH_TITLE_FUZZY", fb.title_fuzzy),
        ("MATCH_SKILL_MATCH", fb.skill_match),
        ("MATCH_QUERY_IN_REQUIREMENT", fb.query_in_requirement),
        ("MATCH_LOCATION_MATCH", fb.location_match),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            bail!("{name} must be a finite, non-negative number (got {value})");
        }
    }
    if !fb.location_mismatch_penalty.is_finite() {
        bail!(
            "MATCH_LOCATION_MISMATCH_PENALTY must be finite (got {})",
            fb.location_mismatch_penalty
        );
    }
    if !(0.0..=1.0).contains(&weights.fallback.title_fuzzy_threshold) {
        bail!(
            "MATCH_FUZZY_THRESHOLD must be within 0.0..=1.0 (got {})",
            weights.fallback.title_fuzzy_threshold
        );
    }

    Ok(weights)
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();
        assert!(config.rapidapi_key.is_none());
        assert!(config.indeed_api_key.is_none());
        assert_eq!(config.source_timeout, Duration::from_secs(15));
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.weights, MatchWeights::default());
        assert_eq!(config.linkedin_base_url, linkedin::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_blank_key_counts_as_unset() {
        let config = config_from(&[("RAPIDAPI_KEY", "   ")]).unwrap();
        assert!(config.rapidapi_key.is_none());
    }

    #[test]
    fn test_weight_overrides() {
        let config = config_from(&[
            ("MATCH_PREFERRED_LOCATION", "25"),
            ("MATCH_TITLE_EXACT", "12.5"),
            ("FALLBACK_MAX_RESULTS", "5"),
        ])
        .unwrap();
        assert_eq!(config.weights.preferred_location, 25.0);
        assert_eq!(config.weights.fallback.title_exact, 12.5);
        assert_eq!(config.weights.fallback.max_results, 5);
        assert_eq!(config.weights.seniority, 20.0);
    }

    #[test]
    fn test_malformed_number_is_error() {
        let err = config_from(&[("SOURCE_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("SOURCE_TIMEOUT_SECS"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert!(config_from(&[("MATCH_SENIORITY", "-5")]).is_err());
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        assert!(config_from(&[("MATCH_SENIORITY", "NaN")]).is_err());
        assert!(config_from(&[("MATCH_SKILL_OVERLAP", "inf")]).is_err());
        assert!(config_from(&[("MATCH_LOCATION_MISMATCH_PENALTY", "NaN")]).is_err());
        assert!(config_from(&[("MATCH_FUZZY_THRESHOLD", "NaN")]).is_err());
    }

    #[test]
    fn test_negative_fallback_weight_rejected() {
        let err = config_from(&[("MATCH_TITLE_EXACT", "-10")]).unwrap_err();
        assert!(err.to_string().contains("MATCH_TITLE_EXACT"));
        assert!(config_from(&[("MATCH_SKILL_MATCH", "-1")]).is_err());
    }

    #[test]
    fn test_accepted_weights_keep_fallback_scores_non_negative() {
        let config = config_from(&[("MATCH_TITLE_EXACT", "0"), ("MATCH_TITLE_FUZZY", "0")]).unwrap();
        let selected = crate::search::FallbackCatalog::default().select(
            "Developer",
            None,
            &[],
            &config.weights.fallback,
        );
        assert!(selected.iter().all(|l| l.match_score.unwrap() >= 0.0));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        assert!(config_from(&[("MATCH_FUZZY_THRESHOLD", "1.5")]).is_err());
    }
}
