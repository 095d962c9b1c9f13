//! Hostel directory filtering.
//!
//! Filtering runs over an already loaded list; the backends only ever hand
//! back the full collection.

use serde::Deserialize;

use crate::models::Hostel;

/// Gender value that disables the category filter.
pub const ALL_GENDERS: &str = "all";

/// Directory filter criteria, usually taken from the query string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// `all`, or a hostel type wire value compared case-sensitively.
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub verified_only: bool,
}

fn default_gender() -> String {
    ALL_GENDERS.to_string()
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            gender: default_gender(),
            max_price: None,
            search_term: String::new(),
            verified_only: false,
        }
    }
}

impl FilterCriteria {
    /// Whether a single hostel passes every predicate.
    pub fn matches(&self, hostel: &Hostel) -> bool {
        let gender_ok = self.gender == ALL_GENDERS || hostel.hostel_type.as_str() == self.gender;
        let price_ok = self.max_price.is_none_or(|max| hostel.price <= max);
        let verified_ok = !self.verified_only || hostel.verified;

        gender_ok && price_ok && verified_ok && self.matches_text(hostel)
    }

    fn matches_text(&self, hostel: &Hostel) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        hostel.name.to_lowercase().contains(&needle)
            || hostel.location.to_lowercase().contains(&needle)
    }
}

/// Return the hostels matching `criteria`, in input order.
pub fn apply_filters(hostels: &[Hostel], criteria: &FilterCriteria) -> Vec<Hostel> {
    hostels
        .iter()
        .filter(|h| criteria.matches(h))
        .cloned()
        .collect()
}
