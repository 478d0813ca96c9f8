//! Command line / environment configuration

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::images::DEFAULT_IMAGE_HOST;
use crate::pokemon_api::DEFAULT_BASE_URL;

/// Pokemon TCG card browser - cached card and set pages
#[derive(Parser, Debug, Clone)]
#[command(name = "card_browser")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    /// Base URL of the Pokemon TCG API
    #[arg(long, env = "POKEMON_TCG_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    /// API key for higher rate limits (optional)
    #[arg(long, env = "POKEMON_TCG_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// How long API responses stay fresh, in seconds
    #[arg(long, env = "CACHE_TTL_SECS", default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// How often rendered pages are regenerated, in seconds
    #[arg(long, env = "REVALIDATE_SECS", default_value_t = 3600)]
    pub revalidate_secs: u64,

    /// Results per rendered page
    #[arg(long, env = "PAGE_SIZE", default_value_t = 50)]
    pub page_size: u32,

    /// Hostname images may be loaded from (repeatable)
    #[arg(long = "image-host", default_values_t = vec![DEFAULT_IMAGE_HOST.to_string()])]
    pub image_hosts: Vec<String>,

    /// Directory with static assets (stylesheet)
    #[arg(long, default_value_os_t = default_static_dir())]
    pub static_dir: PathBuf,
}

/// Static assets shipped with the crate
fn default_static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
