use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::error::AppError;
use crate::models::{Car, SortKey};
use crate::session::{SharedSession, ViewState};

const FUEL_OPTIONS: [&str; 3] = ["Gasoline", "Diesel", "Electric"];
const WISHLIST_IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/150x100";
const SORT_OPTIONS: [(&str, &str); 2] = [("low", "Price: Low to High"), ("high", "Price: High to Low")];

struct CarCard {
    id: String,
    title: String,
    year: String,
    price: String,
    fuel: String,
    seats: String,
    image: String,
    wishlisted: bool,
}

struct WishlistCard {
    title: String,
    image: String,
}

struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

struct PageButton {
    number: usize,
    current: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    dark_mode: bool,
    loading: bool,
    error: String,
    loaded_at: String,
    search: String,
    brand: String,
    seats: String,
    min_price: String,
    max_price: String,
    fuel_options: Vec<SelectOption>,
    sort_options: Vec<SelectOption>,
    cards: Vec<CarCard>,
    pages: Vec<PageButton>,
    wishlist: Vec<WishlistCard>,
}

impl IndexTemplate {
    fn from_view(view: ViewState) -> Self {
        let wishlisted: Vec<_> = view.wishlist.iter().map(|car| car.id.clone()).collect();
        let cards = view
            .page
            .cars
            .iter()
            .map(|car| CarCard {
                id: car.id.to_string(),
                title: title(car),
                year: car.year.map(|y| y.to_string()).unwrap_or_default(),
                price: format_price(car),
                fuel: car.fuel_label().to_string(),
                seats: car.seats.clone(),
                image: car.image_url().to_string(),
                wishlisted: wishlisted.contains(&car.id),
            })
            .collect();

        let fuel = view.criteria.fuel.to_lowercase();
        let fuel_options = FUEL_OPTIONS
            .iter()
            .map(|option| SelectOption {
                value: option.to_string(),
                label: option.to_string(),
                selected: option.to_lowercase() == fuel,
            })
            .collect();
        let sort_options = SORT_OPTIONS
            .iter()
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
                selected: value.parse::<SortKey>().ok() == Some(view.sort),
            })
            .collect();

        IndexTemplate {
            dark_mode: view.dark_mode,
            loading: view.loading,
            error: view.error.unwrap_or_default(),
            loaded_at: view
                .loaded_at
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_default(),
            search: view.search,
            brand: view.criteria.brand,
            seats: view.criteria.seats,
            min_price: view.criteria.min_price,
            max_price: view.criteria.max_price,
            fuel_options,
            sort_options,
            cards,
            pages: (1..=view.page.count)
                .map(|number| PageButton {
                    number,
                    current: number == view.page.index,
                })
                .collect(),
            wishlist: view
                .wishlist
                .iter()
                .map(|car| WishlistCard {
                    title: title(car),
                    image: wishlist_image(car).to_string(),
                })
                .collect(),
        }
    }
}

// Thumbnails in the wishlist panel use a smaller placeholder than the cards.
fn wishlist_image(car: &Car) -> &str {
    match car.image.as_deref() {
        Some(url) if !url.trim().is_empty() => url,
        _ => WISHLIST_IMAGE_PLACEHOLDER,
    }
}

fn title(car: &Car) -> String {
    format!("{} {}", car.brand, car.name).trim().to_string()
}

// Rupee amount with thousands separators, e.g. "₹1,234,567.5"
fn format_price(car: &Car) -> String {
    let Some(price) = car.price_value() else {
        return "N/A".to_string();
    };
    let rounded = (price * 1000.0).round() / 1000.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let text = format!("{}", rounded.abs());
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
        None => (text, None),
    };

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match fraction {
        Some(fraction) => format!("₹{}{}.{}", sign, grouped, fraction),
        None => format!("₹{}{}", sign, grouped),
    }
}

pub async fn index_page(State(session): State<SharedSession>) -> Result<impl IntoResponse, AppError> {
    let view = session.lock().await.view();
    let template = IndexTemplate::from_view(view);
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render index template: {}", e);
            Err(AppError::InternalServerError(anyhow::Error::new(e)))
        }
    }
}
