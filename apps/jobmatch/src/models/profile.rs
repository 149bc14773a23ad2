use std::collections::BTreeSet;
use std::num::IntErrorKind;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static YEARS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*year").expect("years pattern is valid"));

/// The candidate a search is run for. Read-only input to scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    /// The first role doubles as the search query when none is given.
    #[serde(default)]
    pub preferred_roles: Vec<String>,
    /// Empty means no location constraint.
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    /// Free text such as "5 years" or "3 Years of backend work".
    #[serde(default)]
    pub experience: String,
}

impl CandidateProfile {
    /// Profile built from a bare skill list and optional location filter.
    pub fn from_skills(skills: &[String], location: Option<&str>) -> Self {
        Self {
            skills: skills.to_vec(),
            preferred_roles: Vec::new(),
            preferred_locations: location.map(|l| vec![l.to_string()]).unwrap_or_default(),
            experience: String::new(),
        }
    }

    pub fn skill_set(&self) -> BTreeSet<String> {
        self.skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn primary_role(&self) -> Option<&str> {
        self.preferred_roles
            .iter()
            .map(|r| r.trim())
            .find(|r| !r.is_empty())
    }

    /// Years of experience: the first integer directly preceding "year".
    /// Zero when no such token exists.
    pub fn years_of_experience(&self) -> u32 {
        extract_years(&self.experience)
    }
}

/// Counts too large for `u32` saturate instead of reading as zero.
pub fn extract_years(experience: &str) -> u32 {
    let Some(digits) = YEARS_PATTERN.captures(experience).and_then(|caps| caps.get(1)) else {
        return 0;
    };
    match digits.as_str().parse::<u32>() {
        Ok(years) => years,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => u32::MAX,
        Err(_) => 0,
    }
}
