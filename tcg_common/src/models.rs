//! Data models for the Pokemon TCG API (v2)
//!
//! Field names follow the API's camelCase JSON; unknown fields are ignored so
//! new API additions don't break deserialization.

use serde::{Deserialize, Serialize};

/// Default number of results per page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page size the API accepts
pub const MAX_PAGE_SIZE: u32 = 250;

/// A single card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub supertype: String,
    #[serde(default)]
    pub subtypes: Vec<String>,
    #[serde(default)]
    pub hp: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub artist: Option<String>,
    pub set: CardSet,
    pub images: CardImages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardImages {
    pub small: String,
    pub large: String,
}

/// An expansion set. Also embedded in every [`Card`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub printed_total: u32,
    #[serde(default)]
    pub total: u32,
    /// Release date as sent by the API, e.g. "1999/01/09"
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub images: SetImages,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetImages {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub logo: String,
}

/// Paged list response: `{"data": [...], "page", "pageSize", "count", "totalCount"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub count: u32,
    pub total_count: u32,
}

impl<T> ApiPage<T> {
    /// Number of pages needed to hold `total_count` results
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Request parameters for a list endpoint. Doubles as the cache key, so two
/// queries are the same request exactly when they compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Search expression in the API's Lucene-like syntax, e.g. `name:charizard`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Sort fields, e.g. `-set.releaseDate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl ListQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            q: None,
            order_by: None,
        }
    }

    pub fn with_search(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Clamp paging to what the API accepts and drop blank optional fields,
    /// so equivalent requests map to the same cache key.
    pub fn normalized(mut self) -> Self {
        let page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        if page_size != self.page_size {
            log::debug!(
                "Clamped page size {} to {}",
                self.page_size,
                page_size
            );
        }
        self.page = self.page.max(1);
        self.page_size = page_size;
        self.q = self.q.filter(|q| !q.trim().is_empty());
        self.order_by = self.order_by.filter(|o| !o.trim().is_empty());
        self
    }

    /// Query string parameters in the API's naming
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(ref q) = self.q {
            params.push(("q", q.clone()));
        }
        if let Some(ref order_by) = self.order_by {
            params.push(("orderBy", order_by.clone()));
        }
        params
    }
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
