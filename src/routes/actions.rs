// Form posts from the HTML page. Each applies intents and redirects back to "/".

use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{CarId, FilterCriteria, SortKey},
    session::SharedSession,
};

#[derive(Deserialize, Debug)]
pub struct FilterForm {
    #[serde(default)]
    search: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    fuel: String,
    #[serde(default)]
    seats: String,
    #[serde(default)]
    min_price: String,
    #[serde(default)]
    max_price: String,
    #[serde(default)]
    sort: String,
}

#[derive(Deserialize, Debug)]
pub struct PageForm {
    page: usize,
}

pub async fn apply_filters(
    State(session): State<SharedSession>,
    Form(form): Form<FilterForm>,
) -> impl IntoResponse {
    tracing::debug!("Filter form submitted: {:?}", form);
    let sort = form.sort.parse::<SortKey>().unwrap_or_else(|e| {
        tracing::debug!("{}, keeping catalog order", e);
        SortKey::None
    });

    let mut session = session.lock().await;
    session.set_criteria(FilterCriteria {
        brand: form.brand,
        fuel: form.fuel,
        seats: form.seats,
        min_price: form.min_price,
        max_price: form.max_price,
    });
    session.set_search(form.search);
    session.set_sort(sort);
    Redirect::to("/")
}

pub async fn change_page(
    State(session): State<SharedSession>,
    Form(form): Form<PageForm>,
) -> impl IntoResponse {
    session.lock().await.set_page(form.page);
    Redirect::to("/")
}

pub async fn toggle_wishlist(
    State(session): State<SharedSession>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    session.lock().await.toggle_wishlist(&CarId::from_path(&id))?;
    Ok(Redirect::to("/"))
}

pub async fn toggle_theme(State(session): State<SharedSession>) -> Result<impl IntoResponse, AppError> {
    session.lock().await.toggle_theme()?;
    Ok(Redirect::to("/"))
}
