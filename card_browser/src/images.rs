//! Proxy for remote card images
//!
//! Only hosts on the allow-list are ever fetched. Fetched images are held in
//! memory for the cache lifetime, keyed by their full URL.

use crate::cache::{CacheStats, TtlCache};
use crate::pokemon_api::{FetchedImage, PokemonTcgClient};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tcg_common::{Result, TcgError};

/// Host serving card scans and set logos
pub const DEFAULT_IMAGE_HOST: &str = "images.pokemontcg.io";

/// Upper bound on images held in memory
pub const MAX_CACHED_IMAGES: usize = 256;

/// Fixed set of hostnames images may be loaded from
#[derive(Debug, Clone)]
pub struct ImageAllowList {
    hosts: Vec<String>,
}

impl Default for ImageAllowList {
    fn default() -> Self {
        Self::new([DEFAULT_IMAGE_HOST])
    }
}

impl ImageAllowList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Parse `raw` and accept it only for http(s) URLs on an allowed host
    pub fn check(&self, raw: &str) -> Result<Url> {
        let url = Url::parse(raw).map_err(|e| TcgError::InvalidUrl(format!("{raw}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TcgError::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| TcgError::InvalidUrl(format!("missing host: {raw}")))?
            .to_ascii_lowercase();

        if self.hosts.iter().any(|allowed| *allowed == host) {
            Ok(url)
        } else {
            Err(TcgError::ImageHostNotAllowed(host))
        }
    }
}

/// Local path that serves `url` through the proxy
pub fn proxied_image_url(url: &str) -> String {
    format!("/api/image?url={}", urlencoding::encode(url))
}

/// Allow-list check plus an in-memory image cache in front of the client
pub struct ImageProxy {
    client: PokemonTcgClient,
    allow_list: ImageAllowList,
    cache: TtlCache<String, Arc<FetchedImage>>,
}

impl ImageProxy {
    pub fn new(client: PokemonTcgClient, allow_list: ImageAllowList, ttl: Duration) -> Self {
        log::info!("Image allow-list: {}", allow_list.hosts().join(", "));
        Self {
            client,
            allow_list,
            cache: TtlCache::with_max_entries(ttl, MAX_CACHED_IMAGES),
        }
    }

    /// Fetch an image, checking the allow-list and then the cache
    pub async fn get(&self, raw_url: &str) -> Result<Arc<FetchedImage>> {
        let url = self.allow_list.check(raw_url)?;
        let key = url.to_string();

        if let Some(image) = self.cache.get(&key) {
            log::debug!("Image cache hit for {}", key);
            return Ok(image);
        }

        log::info!("Image cache miss for {}, fetching", key);
        let image = Arc::new(self.client.fetch_image(&key).await?);
        self.cache.insert(key, Arc::clone(&image));

        Ok(image)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
