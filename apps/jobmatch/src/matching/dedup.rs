use std::collections::HashSet;

use crate::models::{CanonicalKey, ListingRecord};

/// Collapses listings that share a canonical (title, company, location) key.
///
/// Keys compare by strict equality after trimming and lowercasing; fuzzy
/// similarity is not used here so distinct postings at the same company
/// never merge. The first occurrence of each key is kept and relative order
/// is preserved.
pub fn dedupe(listings: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let mut seen: HashSet<CanonicalKey> = HashSet::with_capacity(listings.len());
    listings
        .into_iter()
        .filter(|listing| seen.insert(listing.canonical_key()))
        .collect()
}
