// Client for the remote listing source

use anyhow::{Context, Result};
use reqwest::{Client, Proxy};
use serde_json::Value;

use crate::config::Settings;
use crate::error::CatalogError;
use crate::models::Car;
use crate::normalizer;
use crate::session::SharedSession;

// Shared client, configured once from settings
pub fn build_client(settings: &Settings) -> Result<Client> {
    let mut builder = Client::builder().user_agent(settings.user_agent.as_str());

    if let Some(proxy_url) = settings.proxy_url.as_deref().filter(|p| !p.is_empty()) {
        let proxy = Proxy::all(proxy_url).context("Invalid proxy_url in configuration")?;
        builder = builder.proxy(proxy);
        tracing::info!("Routing listing requests through configured proxy.");
    }

    builder.build().context("Failed to build reqwest client")
}

/// Fetches the listing payload once and normalizes it. Not retried.
pub async fn fetch_catalog(client: &Client, url: &str) -> Result<Vec<Car>, CatalogError> {
    tracing::info!("Fetching car listings from {}", url);

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(CatalogError::Transport)?
        .error_for_status()
        .map_err(CatalogError::Status)?;

    let payload: Value = response.json().await.map_err(CatalogError::Decode)?;

    normalizer::normalize(payload)
}

/// Runs the startup fetch in the background and settles the session with its outcome.
pub fn spawn_load(client: Client, url: String, session: SharedSession) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = fetch_catalog(&client, &url).await;
        session.lock().await.finish_load(outcome);
    })
}
