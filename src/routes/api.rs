// Handlers for the JSON API

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    http::header,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    models::{criterion_text, Car, CarId, FilterCriteria, FilterField, SortKey},
    session::{Intent, LoadState, SharedSession, ViewState},
    view::{self, Page},
};

// Query string for the stateless catalog endpoint
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CarsQuery {
    brand: Option<String>,
    fuel: Option<String>,
    seats: Option<String>,
    min_price: Option<String>,
    max_price: Option<String>,
    search: Option<String>,
    sort: Option<String>,
    page: Option<String>,
}

impl CarsQuery {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            brand: self.brand.clone().unwrap_or_default(),
            fuel: self.fuel.clone().unwrap_or_default(),
            seats: self.seats.clone().unwrap_or_default(),
            min_price: self.min_price.clone().unwrap_or_default(),
            max_price: self.max_price.clone().unwrap_or_default(),
        }
    }

    // Unrecognized sort names fall back to catalog order
    fn sort_key(&self) -> SortKey {
        self.sort.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    fn page_index(&self) -> usize {
        self.page.as_deref().and_then(|p| p.trim().parse().ok()).unwrap_or(1)
    }
}

pub async fn get_view(State(session): State<SharedSession>) -> Json<ViewState> {
    Json(session.lock().await.view())
}

/// Runs the filter/sort/paginate pipeline over the loaded catalog without touching session state.
pub async fn query_cars(
    State(session): State<SharedSession>,
    Query(query): Query<CarsQuery>,
) -> AppResult<Json<Page>> {
    tracing::debug!("API call: query_cars with params: {:?}", query);
    let session = session.lock().await;

    match session.load_state() {
        LoadState::Ready => {}
        LoadState::Loading => return Err(AppError::Unavailable("Catalog is still loading.".to_string())),
        LoadState::Error(message) => return Err(AppError::Unavailable(message.clone())),
    }

    let page = view::derive_view(
        session.catalog(),
        &query.criteria(),
        query.search.as_deref().unwrap_or_default(),
        query.sort_key(),
        query.page_index(),
        session.page_size(),
    );
    Ok(Json(page))
}

pub async fn apply_intent(
    State(session): State<SharedSession>,
    JsonExtract(intent): JsonExtract<Intent>,
) -> AppResult<Json<ViewState>> {
    tracing::info!("API call: apply_intent {:?}", intent);
    let mut session = session.lock().await;
    session.apply(intent)?;
    Ok(Json(session.view()))
}

/// Sets every recognized criterion present in the body. Unknown keys are ignored and
/// `null` clears a criterion.
pub async fn patch_filters(
    State(session): State<SharedSession>,
    JsonExtract(patch): JsonExtract<Map<String, Value>>,
) -> Json<ViewState> {
    let mut session = session.lock().await;
    for (key, value) in &patch {
        match FilterField::from_key(key) {
            Some(field) => session.set_filter(field, criterion_text(value)),
            None => tracing::debug!("Ignoring unknown filter option '{}'", key),
        }
    }
    Json(session.view())
}

pub async fn get_wishlist(State(session): State<SharedSession>) -> Json<Vec<Car>> {
    Json(session.lock().await.wishlist().entries().to_vec())
}

pub async fn toggle_wishlist(
    State(session): State<SharedSession>,
    Path(id): Path<String>,
) -> AppResult<Json<ViewState>> {
    let id = CarId::from_path(&id);
    let mut session = session.lock().await;
    session.toggle_wishlist(&id)?;
    Ok(Json(session.view()))
}

pub async fn export_wishlist(State(session): State<SharedSession>) -> AppResult<impl IntoResponse> {
    let csv = session
        .lock()
        .await
        .wishlist()
        .to_csv()
        .map_err(|e| AppError::InternalServerError(e.context("Failed to export wishlist")))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"wishlist.csv\""),
        ],
        csv,
    ))
}

pub async fn toggle_theme(State(session): State<SharedSession>) -> AppResult<Json<ViewState>> {
    let mut session = session.lock().await;
    session.toggle_theme()?;
    Ok(Json(session.view()))
}
