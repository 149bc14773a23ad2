pub mod listing;
pub mod profile;

pub use listing::{CanonicalKey, Contact, ListingRecord, DEFAULT_LOCATION};
pub use profile::CandidateProfile;
