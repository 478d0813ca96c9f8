//! Pokemon TCG API client
//!
//! Thin async wrapper over the v2 REST API. No caching or retries here; see
//! [`crate::cached_api`] for the memoizing layer.

use serde::Deserialize;
use tcg_common::{ApiPage, Card, CardSet, ListQuery, Result, TcgError};

/// Public API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.pokemontcg.io/v2";

const USER_AGENT: &str = "PokemonCardBrowser/1.0";

/// Error document returned by the API: `{"error": {"message": "...", "code": 404}}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    code: u16,
}

/// Image bytes plus the content type the host reported
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// HTTP client for the Pokemon TCG API
#[derive(Debug, Clone)]
pub struct PokemonTcgClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    /// Never follows redirects, so an allow-listed image host can't hand
    /// the request on to a host that isn't on the list.
    image_client: reqwest::Client,
}

impl PokemonTcgClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let image_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
            image_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /cards
    pub async fn fetch_cards(&self, query: &ListQuery) -> Result<ApiPage<Card>> {
        self.fetch_page("cards", query).await
    }

    /// GET /sets
    pub async fn fetch_sets(&self, query: &ListQuery) -> Result<ApiPage<CardSet>> {
        self.fetch_page("sets", query).await
    }

    async fn fetch_page<T>(&self, resource: &str, query: &ListQuery) -> Result<ApiPage<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, resource);
        log::info!(
            "Fetching {} page {} (size {}) from Pokemon TCG API",
            resource,
            query.page,
            query.page_size
        );

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&query.to_params());
        if let Some(ref key) = self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, &response.text().await?));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch raw image bytes. Host checks happen in [`crate::images`];
    /// a redirect answer is returned as `HttpStatus` rather than followed.
    pub async fn fetch_image(&self, url: &str) -> Result<FetchedImage> {
        log::debug!("Fetching image from URL: {}", url);

        let response = self
            .image_client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TcgError::HttpStatus(status));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}

fn error_from_response(status: reqwest::StatusCode, body: &str) -> TcgError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => TcgError::Api {
            status: parsed.error.code,
            message: parsed.error.message,
        },
        Err(_) => TcgError::HttpStatus(status),
    }
}

#[cfg(test)]
#[path = "pokemon_api_tests.rs"]
mod tests;
