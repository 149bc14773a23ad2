use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::ListingError;

/// Location shown for listings whose source gave none.
pub const DEFAULT_LOCATION: &str = "Remote";

/// Recruiter / HR contact attached to a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub name: String,
}

/// A single job posting, normalized from whichever source produced it.
///
/// Everything except `match_score` / `match_reason` is fixed once the record
/// leaves its adapter. The two derived fields are written by a scoring pass
/// through [`ListingRecord::apply_score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Unique within `source` only.
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub salary: String,
    pub source: String,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_posted: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

/// Normalized (title, company, location) tuple used to decide two listings
/// describe the same posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    pub title: String,
    pub company: String,
    pub location: String,
}

impl ListingRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: company.into(),
            location: None,
            description: String::new(),
            requirements: Vec::new(),
            salary: String::new(),
            source: source.into(),
            contact: None,
            url: None,
            date_posted: None,
            employment_type: None,
            match_score: None,
            match_reason: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_requirements<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements = requirements.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = salary.into();
        self
    }

    pub fn with_contact(mut self, email: impl Into<String>, name: impl Into<String>) -> Self {
        self.contact = Some(Contact {
            email: email.into(),
            name: name.into(),
        });
        self
    }

    /// Location for display; absent locations read as "Remote".
    pub fn display_location(&self) -> &str {
        self.location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }

    /// Lowercased location, empty when the source gave none.
    pub fn location_lower(&self) -> String {
        self.location
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default()
    }

    /// Requirements as a case-folded set.
    pub fn requirement_set(&self) -> BTreeSet<String> {
        self.requirements
            .iter()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .collect()
    }

    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey {
            title: self.title.trim().to_lowercase(),
            company: self.company.trim().to_lowercase(),
            location: self
                .location
                .as_deref()
                .map(|l| l.trim().to_lowercase())
                .unwrap_or_default(),
        }
    }

    /// Rejects records missing the fields dedup and scoring depend on.
    pub fn validate(&self) -> Result<(), ListingError> {
        if self.title.trim().is_empty() {
            return Err(ListingError::MissingField {
                id: self.id.clone(),
                field: "title",
            });
        }
        if self.company.trim().is_empty() {
            return Err(ListingError::MissingField {
                id: self.id.clone(),
                field: "company",
            });
        }
        Ok(())
    }

    /// Records the outcome of a scoring pass, replacing any earlier pass.
    pub fn apply_score(&mut self, score: f64, reason: String) {
        self.match_score = Some(score);
        self.match_reason = Some(reason);
    }

    pub fn is_scored(&self) -> bool {
        self.match_score.is_some()
    }
}
