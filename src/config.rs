// Application settings, loaded with the 'config' crate and 'dotenv'

use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_LISTING_URL: &str = "https://www.freetestapi.com/api/v1/cars";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_address: String,
    // Endpoint returning the JSON array of raw car records
    pub listing_url: String,
    pub page_size: usize,
    // Where the wishlist and theme preference live. Empty means in-memory only.
    pub store_path: Option<String>,
    pub proxy_url: Option<String>,
    pub user_agent: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("listing_url", DEFAULT_LISTING_URL)?
            .set_default("page_size", 10)?
            .set_default("store_path", "car_finder_store.json")?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP__LISTING_URL)
            .add_source(Environment::with_prefix("APP").prefix_separator("__").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be greater than zero");
        }
        Ok(())
    }

    /// Store path with blank values treated as "no durable store".
    pub fn store_path(&self) -> Option<&str> {
        self.store_path.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
impl Settings {
    pub fn for_tests(listing_url: &str) -> Self {
        Settings {
            server_address: "127.0.0.1:0".to_string(),
            listing_url: listing_url.to_string(),
            page_size: 10,
            store_path: None,
            proxy_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_config_file() {
        let settings = Settings::new().expect("defaults should deserialize");
        assert!(settings.page_size > 0);
        assert!(!settings.listing_url.is_empty());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut settings = Settings::for_tests(DEFAULT_LISTING_URL);
        settings.page_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn blank_store_path_means_memory_only() {
        let mut settings = Settings::for_tests(DEFAULT_LISTING_URL);
        settings.store_path = Some("   ".to_string());
        assert_eq!(settings.store_path(), None);
        settings.store_path = Some("wishlist.json".to_string());
        assert_eq!(settings.store_path(), Some("wishlist.json"));
    }
}
