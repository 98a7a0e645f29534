//! Fuel category normalization and tank eligibility.
//!
//! Purchases and tanks carry free-text product labels in Arabic or English
//! ("بنزين 95", "Diesel Premium", "LPG"). Both sides are reduced to a small
//! closed set of categories before a shipment is matched against tanks.

use serde::{Deserialize, Serialize};

use crate::discharge::Container;

const DIESEL_KEYWORDS: &[&str] = &["ديزل", "diesel"];
const PETROL_KEYWORDS: &[&str] = &["بنزين", "petrol", "gasoline", "91", "95"];
const GAS_KEYWORDS: &[&str] = &["غاز", "gas", "lpg"];

/// Normalized fuel classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelCategory {
    Diesel,
    /// Includes octane-only labels such as "91" or "95".
    Petrol,
    Gas,
    /// Unrecognized label, kept as its lower-cased trimmed text.
    Other(String),
}

impl FuelCategory {
    /// Maps a free-text label to a category.
    ///
    /// Keyword tables are checked in order diesel, petrol, gas, so
    /// "gasoline" lands in petrol even though it contains "gas".
    pub fn normalize(label: &str) -> Self {
        let text = label.trim().to_lowercase();
        if contains_any(&text, DIESEL_KEYWORDS) {
            FuelCategory::Diesel
        } else if contains_any(&text, PETROL_KEYWORDS) {
            FuelCategory::Petrol
        } else if contains_any(&text, GAS_KEYWORDS) {
            FuelCategory::Gas
        } else {
            FuelCategory::Other(text)
        }
    }

    /// Returns the category token.
    pub fn as_str(&self) -> &str {
        match self {
            FuelCategory::Diesel => "diesel",
            FuelCategory::Petrol => "petrol",
            FuelCategory::Gas => "gas",
            FuelCategory::Other(token) => token,
        }
    }

    /// Returns true if a tank with the given product label may receive fuel
    /// of this category.
    ///
    /// Known categories match on their whole keyword table; anything else
    /// matches by plain containment of the token, so an empty token accepts
    /// every tank.
    pub fn matches_label(&self, label: &str) -> bool {
        let text = label.to_lowercase();
        match self {
            FuelCategory::Diesel => contains_any(&text, DIESEL_KEYWORDS),
            FuelCategory::Petrol => contains_any(&text, PETROL_KEYWORDS),
            FuelCategory::Gas => contains_any(&text, GAS_KEYWORDS),
            FuelCategory::Other(token) => text.contains(token.as_str()),
        }
    }
}

impl From<&str> for FuelCategory {
    fn from(label: &str) -> Self {
        FuelCategory::normalize(label)
    }
}

impl std::fmt::Display for FuelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filters `containers` down to those whose product label matches
/// `category`, preserving input order.
pub fn eligible_containers<'a>(
    category: &FuelCategory,
    containers: &'a [Container],
) -> Vec<&'a Container> {
    containers
        .iter()
        .filter(|c| category.matches_label(&c.product_type))
        .collect()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
