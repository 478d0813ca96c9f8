//! Pokemon Card Browser
//!
//! Serves card and set pages backed by the Pokemon TCG API, caching API
//! responses in memory.

use card_browser::web::{self, AppState};
use card_browser::{Config, ImageAllowList, ImageProxy, PageCache, PokemonApi, PokemonTcgClient};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    log::info!("Starting card_browser...");
    log::info!("Pokemon TCG API: {}", config.api_base_url);
    if config.api_key.is_none() {
        log::warn!("No POKEMON_TCG_API_KEY set, requests are subject to the anonymous rate limit");
    }

    let client = match PokemonTcgClient::new(config.api_base_url.clone(), config.api_key.clone())
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        api: Arc::new(PokemonApi::new(client.clone(), config.cache_ttl())),
        pages: Arc::new(PageCache::new(config.revalidate())),
        images: Arc::new(ImageProxy::new(
            client,
            ImageAllowList::new(config.image_hosts.clone()),
            config.cache_ttl(),
        )),
        page_size: config.page_size,
    };

    if let Err(e) = web::serve(state, &config.listen_addr(), &config.static_dir).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }

    log::info!("card_browser stopped.");
}
