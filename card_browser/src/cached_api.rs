//! Memoizing wrapper around the Pokemon TCG API client
//!
//! Responses are keyed by the normalized [`ListQuery`] and shared as `Arc`s,
//! so a cache hit hands back the very payload the first caller received.

use crate::cache::{CacheStats, TtlCache};
use crate::pokemon_api::PokemonTcgClient;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tcg_common::{ApiPage, Card, CardSet, ListQuery, Result};

/// Combined statistics for the card and set stores
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCacheStats {
    pub cards: CacheStats,
    pub sets: CacheStats,
    pub total_entries: usize,
}

/// Cached access to cards and sets
pub struct PokemonApi {
    client: PokemonTcgClient,
    cards: TtlCache<ListQuery, Arc<ApiPage<Card>>>,
    sets: TtlCache<ListQuery, Arc<ApiPage<CardSet>>>,
}

impl PokemonApi {
    /// Wrap `client`; responses stay fresh for `ttl`
    pub fn new(client: PokemonTcgClient, ttl: Duration) -> Self {
        log::info!("API response cache freshness window: {}s", ttl.as_secs());
        Self {
            client,
            cards: TtlCache::new(ttl),
            sets: TtlCache::new(ttl),
        }
    }

    /// Fetch a page of cards, checking the cache first
    pub async fn get_cards(&self, query: &ListQuery) -> Result<Arc<ApiPage<Card>>> {
        let key = query.clone().normalized();

        if let Some(page) = self.cards.get(&key) {
            log::debug!("Cache hit for cards {:?}", key);
            return Ok(page);
        }

        log::debug!("Cache miss for cards {:?}, fetching", key);
        let page = Arc::new(self.client.fetch_cards(&key).await?);
        self.cards.insert(key, Arc::clone(&page));

        Ok(page)
    }

    /// Fetch a page of sets, checking the cache first
    pub async fn get_sets(&self, query: &ListQuery) -> Result<Arc<ApiPage<CardSet>>> {
        let key = query.clone().normalized();

        if let Some(page) = self.sets.get(&key) {
            log::debug!("Cache hit for sets {:?}", key);
            return Ok(page);
        }

        log::debug!("Cache miss for sets {:?}, fetching", key);
        let page = Arc::new(self.client.fetch_sets(&key).await?);
        self.sets.insert(key, Arc::clone(&page));

        Ok(page)
    }

    /// Empty both stores. Safe to call repeatedly.
    pub fn clear_cache(&self) {
        self.cards.clear();
        self.sets.clear();
        log::info!("API response cache cleared");
    }

    pub fn cache_stats(&self) -> ApiCacheStats {
        let cards = self.cards.stats();
        let sets = self.sets.stats();
        let total_entries = cards.entries + sets.entries;

        ApiCacheStats {
            cards,
            sets,
            total_entries,
        }
    }
}

#[cfg(test)]
#[path = "cached_api_tests.rs"]
mod tests;
