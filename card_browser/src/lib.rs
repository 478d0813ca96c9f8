//! Pokemon Card Browser
//!
//! Server-rendered card and set pages over the Pokemon TCG API, with an
//! in-memory response cache and endpoints to inspect and clear it.

pub mod cache;
pub mod cached_api;
pub mod config;
pub mod images;
pub mod pages;
pub mod pokemon_api;
pub mod web;

#[cfg(test)]
mod test_support;

pub use cache::{CacheStats, TtlCache};
pub use cached_api::{ApiCacheStats, PokemonApi};
pub use config::Config;
pub use images::{ImageAllowList, ImageProxy};
pub use pages::PageCache;
pub use pokemon_api::PokemonTcgClient;
