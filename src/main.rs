use anyhow::{Context, Result};
use axum::{extract::FromRef, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;
use crate::session::{Session, SharedSession};
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

// Declare modules
mod catalog;
mod config;
mod error;
mod filter;
mod models;
mod normalizer;
mod paginate;
mod routes;
mod session;
mod sort;
mod store;
mod theme;
mod view;
mod wishlist;

// Define the application state struct
#[derive(Clone, FromRef)]
struct AppState {
    session: SharedSession,
}

fn open_store(settings: &Settings) -> Result<Arc<dyn KeyValueStore>> {
    match settings.store_path() {
        Some(path) => {
            let store = JsonFileStore::open(path)
                .with_context(|| format!("Failed to open store file '{}'", path))?;
            tracing::info!("Using store file {}", store.path().display());
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No store_path configured; wishlist and theme will not survive a restart.");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "car_finder=info,tower_http=info".into()))
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing Car Finder server...");

    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let store = open_store(&settings)?;
    let session = Session::new(store, settings.page_size).shared();

    // The one asynchronous boundary: the catalog arrives whenever the fetch completes
    let http_client = catalog::build_client(&settings)?;
    catalog::spawn_load(http_client, settings.listing_url.clone(), session.clone());

    let app_state = AppState { session };

    let router: Router = routes::create_router(app_state);
    let app = router
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = match settings.server_address.parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid server address format in configuration ('{}'): {}", settings.server_address, e);
            return Err(anyhow::anyhow!("Invalid server address format: {}", settings.server_address));
        }
    };

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
