//! Search filter value object and the client-side filter/sort it implies.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE};
use crate::error::{DomainError, DomainResult};

/// Item condition. `Unset` means "any condition".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
    Refurbished,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
            Condition::Refurbished => "refurbished",
            Condition::Unset => "",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Condition::Unset)
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            "refurbished" => Ok(Condition::Refurbished),
            "" | "unset" | "any" => Ok(Condition::Unset),
            other => Err(DomainError::unknown("condition", other)),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "date-desc")]
    DateDesc,
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "popularity")]
    Popularity,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "date-desc",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::Popularity => "popularity",
        }
    }

    /// Ordering parameter understood by the catalog listing endpoint.
    pub fn remote_ordering(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "-created_at",
            SortKey::PriceAsc => "price",
            SortKey::PriceDesc => "-price",
            SortKey::Popularity => "-views",
        }
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "date-desc" => Ok(SortKey::DateDesc),
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "popularity" => Ok(SortKey::Popularity),
            other => Err(DomainError::unknown("sort key", other)),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Client-side query/sort/filter specification for product listings.
///
/// Always replaced as a whole; partial edits go through [`SearchFilter::merge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilter {
    pub query: String,
    pub category: String,
    pub min_price: f64,
    pub max_price: f64,
    pub condition: Condition,
    pub sort_by: SortKey,
    pub location: String,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: String::new(),
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
            condition: Condition::Unset,
            sort_by: SortKey::DateDesc,
            location: String::new(),
        }
    }
}

/// Partial edit of a [`SearchFilter`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilterPatch {
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub condition: Option<Condition>,
    pub sort_by: Option<SortKey>,
    pub location: Option<String>,
}

impl SearchFilter {
    /// The "clear all" filter.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Merge a partial edit and return the complete replacement filter.
    pub fn merge(&self, patch: SearchFilterPatch) -> Self {
        Self {
            query: patch.query.unwrap_or_else(|| self.query.clone()),
            category: patch.category.unwrap_or_else(|| self.category.clone()),
            min_price: patch.min_price.unwrap_or(self.min_price),
            max_price: patch.max_price.unwrap_or(self.max_price),
            condition: patch.condition.unwrap_or(self.condition),
            sort_by: patch.sort_by.unwrap_or(self.sort_by),
            location: patch.location.unwrap_or_else(|| self.location.clone()),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.min_price > self.max_price {
            return Err(DomainError::validation(format!(
                "Minimum price {} exceeds maximum price {}",
                self.min_price, self.max_price
            )));
        }
        Ok(())
    }

    /// True when the listing passes every active criterion.
    pub fn matches(&self, listing: &ProductListing) -> bool {
        let query = self.query.trim();
        if !query.is_empty() {
            let hit = contains_ci(&listing.title, query)
                || contains_ci(&listing.description, query)
                || listing.tags.iter().any(|tag| contains_ci(tag, query));
            if !hit {
                return false;
            }
        }

        let category = self.category.trim();
        if !category.is_empty() && !contains_ci(&listing.category, category) {
            return false;
        }

        if listing.price < self.min_price || listing.price > self.max_price {
            return false;
        }

        if !self.condition.is_unset() && listing.condition != self.condition {
            return false;
        }

        let location = self.location.trim();
        if !location.is_empty() && !contains_ci(&listing.location, location) {
            return false;
        }

        true
    }

    /// Filter and sort listings. The sort is stable.
    pub fn apply(&self, listings: &[ProductListing]) -> Vec<ProductListing> {
        let mut selected: Vec<ProductListing> = listings
            .iter()
            .filter(|listing| self.matches(listing))
            .cloned()
            .collect();

        selected.sort_by(|a, b| compare(self.sort_by, a, b));
        selected
    }

    /// Render as query parameters for the remote catalog listing.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        let mut push_text = |key: &str, value: &str| {
            let value = value.trim();
            if !value.is_empty() {
                pairs.push((key.to_string(), value.to_string()));
            }
        };
        push_text("search", &self.query);
        push_text("category", &self.category);

        pairs.push(("min_price".to_string(), format_price(self.min_price)));
        pairs.push(("max_price".to_string(), format_price(self.max_price)));

        if !self.condition.is_unset() {
            pairs.push(("condition".to_string(), self.condition.to_string()));
        }
        let location = self.location.trim();
        if !location.is_empty() {
            pairs.push(("location".to_string(), location.to_string()));
        }
        pairs.push((
            "ordering".to_string(),
            self.sort_by.remote_ordering().to_string(),
        ));

        pairs
    }
}

/// Catalog item as seen by the client-side filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub is_boosted: bool,
    #[serde(default)]
    pub seller_name: String,
    pub created_at: DateTime<Utc>,
}

fn compare(sort: SortKey, a: &ProductListing, b: &ProductListing) -> Ordering {
    match sort {
        SortKey::DateDesc => b.created_at.cmp(&a.created_at),
        SortKey::PriceAsc => a.price.total_cmp(&b.price),
        SortKey::PriceDesc => b.price.total_cmp(&a.price),
        SortKey::Popularity => b.views.cmp(&a.views).then_with(|| b.likes.cmp(&a.likes)),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// Whole prices render without a fractional part ("10000", not "10000.0").
fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{:.0}", price)
    } else {
        price.to_string()
    }
}
