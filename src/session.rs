//! Explicit session state driving the catalog view.
//!
//! The session owns the catalog, the active criteria, sort key and page, plus the
//! persisted wishlist and theme. Filtered and sorted results are cached and rebuilt
//! only when one of their inputs changes; page changes just re-slice the cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{CatalogError, SessionError, FETCH_FAILURE_MESSAGE};
use crate::models::{Car, CarId, FilterCriteria, FilterField, SortKey};
use crate::store::KeyValueStore;
use crate::theme::Theme;
use crate::view::{self, Page};
use crate::wishlist::Wishlist;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum LoadState {
    Loading,
    Ready,
    Error(String),
}

/// User intents coming from the presentation layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    SetFilter { field: FilterField, value: String },
    SetSearch { text: String },
    SetSort { sort: SortKey },
    SetPage { page: usize },
    ToggleWishlist { id: CarId },
    ToggleTheme,
}

/// Everything the presentation layer needs to render one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub load_state: LoadState,
    pub loading: bool,
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub page: Page,
    pub wishlist: Vec<Car>,
    pub dark_mode: bool,
    pub criteria: FilterCriteria,
    pub search: String,
    pub sort: SortKey,
}

pub struct Session {
    load_state: LoadState,
    loaded_at: Option<DateTime<Utc>>,
    catalog: Vec<Car>,
    criteria: FilterCriteria,
    search: String,
    sort: SortKey,
    page_index: usize,
    page_size: usize,
    results: Vec<Car>,
    wishlist: Wishlist,
    theme: Theme,
}

impl Session {
    /// Starts in `Loading` with the wishlist and theme restored from `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, page_size: usize) -> Self {
        Session {
            load_state: LoadState::Loading,
            loaded_at: None,
            catalog: Vec::new(),
            criteria: FilterCriteria::default(),
            search: String::new(),
            sort: SortKey::None,
            page_index: 1,
            page_size,
            results: Vec::new(),
            wishlist: Wishlist::restore(store.clone()),
            theme: Theme::restore(store),
        }
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Completes the one catalog fetch. Failure is terminal: empty catalog, error message set.
    pub fn finish_load(&mut self, outcome: Result<Vec<Car>, CatalogError>) {
        if self.load_state != LoadState::Loading {
            tracing::warn!("Ignoring catalog load result, session already settled.");
            return;
        }
        match outcome {
            Ok(cars) => {
                tracing::info!("Catalog ready with {} cars.", cars.len());
                self.catalog = cars;
                self.loaded_at = Some(Utc::now());
                self.load_state = LoadState::Ready;
            }
            Err(e) => {
                tracing::error!("Catalog fetch failed: {}", e);
                self.catalog = Vec::new();
                self.load_state = LoadState::Error(FETCH_FAILURE_MESSAGE.to_string());
            }
        }
        self.refresh_results();
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn catalog(&self) -> &[Car] {
        &self.catalog
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    pub fn apply(&mut self, intent: Intent) -> Result<(), SessionError> {
        match intent {
            Intent::SetFilter { field, value } => self.set_filter(field, value),
            Intent::SetSearch { text } => self.set_search(text),
            Intent::SetSort { sort } => self.set_sort(sort),
            Intent::SetPage { page } => self.set_page(page),
            Intent::ToggleWishlist { id } => {
                self.toggle_wishlist(&id)?;
            }
            Intent::ToggleTheme => {
                self.theme.toggle()?;
            }
        }
        Ok(())
    }

    pub fn set_filter(&mut self, field: FilterField, value: String) {
        self.criteria.set(field, value);
        self.refresh_results();
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refresh_results();
    }

    pub fn set_search(&mut self, text: String) {
        self.search = text;
        self.refresh_results();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.refresh_results();
    }

    // The index is kept as given even when it points past the last page.
    pub fn set_page(&mut self, page: usize) {
        self.page_index = page;
    }

    /// Toggles a catalog car in or out of the wishlist. A car that is only known from the
    /// restored wishlist can still be removed. Returns whether the car is now wishlisted.
    pub fn toggle_wishlist(&mut self, id: &CarId) -> Result<bool, SessionError> {
        let car = self
            .catalog
            .iter()
            .find(|car| &car.id == id)
            .or_else(|| self.wishlist.get(id))
            .cloned()
            .ok_or_else(|| SessionError::UnknownCar(id.clone()))?;

        self.wishlist.toggle(&car)?;
        let wishlisted = self.wishlist.is_wishlisted(id);
        tracing::info!(
            "Car {} ({} {}) {} wishlist.",
            car.id,
            car.brand,
            car.name,
            if wishlisted { "added to" } else { "removed from" }
        );
        Ok(wishlisted)
    }

    pub fn toggle_theme(&mut self) -> Result<bool, SessionError> {
        Ok(self.theme.toggle()?)
    }

    pub fn view(&self) -> ViewState {
        let error = match &self.load_state {
            LoadState::Error(message) => Some(message.clone()),
            _ => None,
        };
        ViewState {
            load_state: self.load_state.clone(),
            loading: self.load_state == LoadState::Loading,
            error,
            loaded_at: self.loaded_at,
            page: Page::from_results(&self.results, self.page_size, self.page_index),
            wishlist: self.wishlist.entries().to_vec(),
            dark_mode: self.theme.is_dark(),
            criteria: self.criteria.clone(),
            search: self.search.clone(),
            sort: self.sort,
        }
    }

    fn refresh_results(&mut self) {
        self.results = view::derive_results(&self.catalog, &self.criteria, &self.search, self.sort);
        tracing::debug!("Recomputed results: {} of {} cars match.", self.results.len(), self.catalog.len());
    }
}
