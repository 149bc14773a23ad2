//! Built-in listing set used when no live source returns anything.
//!
//! Listings here carry the `simulated` source tag so callers can always tell
//! them apart from live results.

use std::collections::BTreeSet;

use crate::matching::scoring::{self, skill_overlap, SkillOverlap};
use crate::matching::weights::FallbackWeights;
use crate::models::ListingRecord;

pub const FALLBACK_SOURCE: &str = "simulated";

/// Read-only after construction; shared freely across searches.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    listings: Vec<ListingRecord>,
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::new(builtin_listings())
    }
}

impl FallbackCatalog {
    pub fn new(listings: Vec<ListingRecord>) -> Self {
        Self { listings }
    }

    /// Ranks the catalog against the query, location filter, and skills.
    ///
    /// With a location filter, only listings scoring above zero survive;
    /// without one every listing is kept. The result is stably sorted by
    /// score and capped at `weights.max_results`. Each returned listing is
    /// stamped with its relevance score.
    pub fn select(
        &self,
        query: &str,
        location: Option<&str>,
        skills: &[String],
        weights: &FallbackWeights,
    ) -> Vec<ListingRecord> {
        let query_lower = query.trim().to_lowercase();
        let location_lower = location
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty());
        let skill_set: BTreeSet<String> = skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let mut selected: Vec<ListingRecord> = self
            .listings
            .iter()
            .filter_map(|listing| {
                let overlap = skill_overlap(&skill_set, listing);
                let score = relevance(
                    &query_lower,
                    location_lower.as_deref(),
                    overlap,
                    listing,
                    weights,
                );
                if score > 0.0 || location_lower.is_none() {
                    let mut listing = listing.clone();
                    listing.apply_score(score, overlap.reason());
                    Some(listing)
                } else {
                    None
                }
            })
            .collect();

        scoring::sort_by_score(&mut selected);
        selected.truncate(weights.max_results);
        selected
    }
}

/// Offline relevance of one listing. Can be negative only when a location
/// filter is present and the listing is elsewhere.
fn relevance(
    query_lower: &str,
    location_lower: Option<&str>,
    overlap: SkillOverlap,
    listing: &ListingRecord,
    weights: &FallbackWeights,
) -> f64 {
    let mut score = scoring::title_points(query_lower, &listing.title, weights);

    score += overlap.matched as f64 * weights.skill_match;

    let query_hits = listing
        .requirements
        .iter()
        .filter(|req| req.to_lowercase().contains(query_lower))
        .count();
    score += query_hits as f64 * weights.query_in_requirement;

    if let Some(wanted) = location_lower {
        let listing_location = listing.location_lower();
        if !listing_location.is_empty() {
            if listing_location.contains(wanted) {
                score += weights.location_match;
            } else if wanted.contains("remote") && listing_location.contains("remote") {
                score += weights.location_match;
            } else {
                score -= weights.location_mismatch_penalty;
            }
        }
    }

    score
}

#[allow(clippy::too_many_arguments)]
fn simulated(
    id: &str,
    title: &str,
    company: &str,
    location: &str,
    description: &str,
    requirements: [&str; 5],
    salary: &str,
    contact: (&str, &str),
) -> ListingRecord {
    ListingRecord::new(id, title, company, FALLBACK_SOURCE)
        .with_location(location)
        .with_description(description)
        .with_requirements(requirements)
        .with_salary(salary)
        .with_contact(contact.0, contact.1)
}

/// Representative postings across common engineering roles.
pub fn builtin_listings() -> Vec<ListingRecord> {
    vec![
        simulated(
            "1",
            "Senior Software Engineer",
            "Tech Innovations Inc",
            "Remote",
            "Senior role for full-stack development with 5+ years experience.",
            ["Python", "JavaScript", "React", "AWS", "Docker"],
            "$120,000 - $160,000",
            ("careers@techinnovations.com", "Sarah Kim"),
        ),
        simulated(
            "2",
            "Data Scientist",
            "Data Corp",
            "New York, NY",
            "Machine learning and data analysis role with statistical modeling.",
            ["Python", "Machine Learning", "SQL", "TensorFlow", "Statistics"],
            "$100,000 - $140,000",
            ("hr@datacorp.com", "Mike Chen"),
        ),
        simulated(
            "3",
            "Frontend Developer",
            "Web Solutions",
            "San Francisco, CA",
            "React and TypeScript focused role building modern web applications.",
            ["JavaScript", "React", "TypeScript", "CSS", "HTML"],
            "$90,000 - $130,000",
            ("jobs@websolutions.com", "Emily Davis"),
        ),
        simulated(
            "4",
            "DevOps Engineer",
            "Cloud Systems",
            "Remote",
            "Cloud infrastructure and automation with CI/CD pipelines.",
            ["AWS", "Kubernetes", "Docker", "Terraform", "Python"],
            "$110,000 - $150,000",
            ("recruiting@cloudsystems.com", "David Wilson"),
        ),
        simulated(
            "5",
            "Full Stack Developer",
            "StartUp Ventures",
            "Austin, TX",
            "Early-stage startup full-stack role with equity options.",
            ["Python", "JavaScript", "React", "Node.js", "MongoDB"],
            "$85,000 - $120,000",
            ("team@startupventures.com", "Alex Rodriguez"),
        ),
        simulated(
            "6",
            "Backend Engineer",
            "API Masters",
            "Remote",
            "API development and microservices architecture.",
            ["Python", "Django", "PostgreSQL", "Redis", "Docker"],
            "$95,000 - $135,000",
            ("jobs@apimasters.com", "Jessica Brown"),
        ),
        simulated(
            "7",
            "Machine Learning Engineer",
            "AI Solutions",
            "Boston, MA",
            "ML model development and deployment with MLOps practices.",
            ["Python", "PyTorch", "TensorFlow", "MLOps", "Docker"],
            "$115,000 - $155,000",
            ("careers@aisolutions.com", "Robert Taylor"),
        ),
        simulated(
            "8",
            "Junior Software Developer",
            "Digital Creations",
            "Chicago, IL",
            "Entry-level software development role with mentorship.",
            ["Java", "Spring Boot", "SQL", "JavaScript", "AWS"],
            "$60,000 - $80,000",
            ("hr@digitalcreations.com", "Lisa Anderson"),
        ),
        simulated(
            "9",
            "React Developer",
            "Mobile First",
            "Remote",
            "React and React Native development for mobile apps.",
            ["React", "React Native", "JavaScript", "TypeScript", "Redux"],
            "$85,000 - $125,000",
            ("jobs@mobilefirst.com", "Tom Martinez"),
        ),
        simulated(
            "10",
            "Python Developer",
            "Code Factory",
            "Seattle, WA",
            "Python backend development with Django framework.",
            ["Python", "Django", "PostgreSQL", "REST API", "Docker"],
            "$90,000 - $130,000",
            ("careers@codefactory.com", "Anna Lee"),
        ),
        simulated(
            "11",
            "Cloud Architect",
            "Enterprise Solutions",
            "Remote",
            "Design and implement cloud infrastructure solutions.",
            ["AWS", "Azure", "Terraform", "Kubernetes", "Python"],
            "$140,000 - $180,000",
            ("jobs@enterprisesolutions.com", "Chris Johnson"),
        ),
        simulated(
            "12",
            "QA Engineer",
            "Quality First",
            "Denver, CO",
            "Automated testing and quality assurance.",
            ["Selenium", "Python", "JavaScript", "CI/CD", "Git"],
            "$75,000 - $105,000",
            ("hr@qualityfirst.com", "Maria Garcia"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_set_is_tagged_and_well_formed() {
        let listings = builtin_listings();
        assert_eq!(listings.len(), 12);
        for l in &listings {
            assert_eq!(l.source, FALLBACK_SOURCE);
            assert!(l.validate().is_ok());
        }
    }

    #[test]
    fn test_no_location_keeps_everything_ranked_by_title() {
        let catalog = FallbackCatalog::default();
        let selected = catalog.select("Engineer", None, &[], &FallbackWeights::default());
        assert_eq!(selected.len(), 12);
        assert!(selected[0].title.to_lowercase().contains("engineer"));
        assert_eq!(selected[0].match_score, Some(10.0));
    }

    #[test]
    fn test_remote_filter_drops_mismatched_locations() {
        let catalog = FallbackCatalog::default();
        let selected = catalog.select("Engineer", Some("Remote"), &[], &FallbackWeights::default());
        assert!(!selected.is_empty());
        for l in &selected {
            assert!(l.match_score.unwrap() > 0.0);
            assert_eq!(l.source, FALLBACK_SOURCE);
        }
        // Remote engineering roles outrank on-site ones
        assert_eq!(selected[0].display_location(), "Remote");
    }

    #[test]
    fn test_skill_matches_add_three_each() {
        let catalog = FallbackCatalog::new(vec![simulated(
            "x",
            "Cloud Architect",
            "Co",
            "Remote",
            "",
            ["AWS", "Azure", "Terraform", "Kubernetes", "Python"],
            "",
            ("", ""),
        )]);
        let selected = catalog.select(
            "plumber",
            None,
            &skills(&["aws", "PYTHON", "Go"]),
            &FallbackWeights::default(),
        );
        assert_eq!(selected[0].match_score, Some(6.0));
        assert_eq!(
            selected[0].match_reason.as_deref(),
            Some("2 matching skills out of 5")
        );
    }

    #[test]
    fn test_query_in_requirements_adds_bonus() {
        let catalog = FallbackCatalog::new(vec![simulated(
            "x",
            "Frontend Developer",
            "Co",
            "Remote",
            "",
            ["React", "React Native", "CSS", "HTML", "Redux"],
            "",
            ("", ""),
        )]);
        let selected = catalog.select("react", None, &[], &FallbackWeights::default());
        assert_eq!(selected[0].match_score, Some(4.0));
    }

    #[test]
    fn test_location_mismatch_only_listing_is_filtered() {
        let catalog = FallbackCatalog::new(vec![simulated(
            "x",
            "Chef",
            "Co",
            "Denver, CO",
            "",
            ["Knives", "a", "b", "c", "d"],
            "",
            ("", ""),
        )]);
        let selected = catalog.select("zzzz", Some("Boston"), &[], &FallbackWeights::default());
        assert!(selected.is_empty());
    }

    #[test]
    fn test_cap_applies() {
        let weights = FallbackWeights {
            max_results: 3,
            ..FallbackWeights::default()
        };
        let selected = FallbackCatalog::default().select("Developer", None, &[], &weights);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let selected =
            FallbackCatalog::default().select("Developer", None, &[], &FallbackWeights::default());
        let top: Vec<&str> = selected.iter().take(4).map(|l| l.id.as_str()).collect();
        assert_eq!(top, vec!["3", "5", "8", "9"]);
    }
}
