// Filter engine: conjunction of the active criteria plus the free-text search

use crate::models::{Car, FilterCriteria, PriceBound};

/// Returns the cars matching every active criterion and the search text, in catalog order.
/// Pure: the same inputs always give the same output.
pub fn apply(catalog: &[Car], criteria: &FilterCriteria, search: &str) -> Vec<Car> {
    let predicate = Predicate::new(criteria, search);
    catalog
        .iter()
        .filter(|car| predicate.matches(car))
        .cloned()
        .collect()
}

// Criteria lowered and parsed once per evaluation rather than once per car.
struct Predicate {
    brand: String,
    fuel: String,
    seats: String,
    min_price: PriceBound,
    max_price: PriceBound,
    search: String,
}

impl Predicate {
    fn new(criteria: &FilterCriteria, search: &str) -> Self {
        Predicate {
            brand: criteria.brand.to_lowercase(),
            fuel: criteria.fuel.to_lowercase(),
            seats: criteria.seats.clone(),
            min_price: criteria.min_price_bound(),
            max_price: criteria.max_price_bound(),
            search: search.to_lowercase(),
        }
    }

    fn matches(&self, car: &Car) -> bool {
        self.brand_matches(car)
            && self.fuel_matches(car)
            && self.seats_match(car)
            && self.price_matches(car)
            && self.search_matches(car)
    }

    fn brand_matches(&self, car: &Car) -> bool {
        self.brand.is_empty() || car.brand.to_lowercase().contains(&self.brand)
    }

    fn fuel_matches(&self, car: &Car) -> bool {
        if self.fuel.is_empty() {
            return true;
        }
        car.fuel
            .as_deref()
            .is_some_and(|fuel| fuel.to_lowercase() == self.fuel)
    }

    // Compared as text against the seat placeholder, so it passes or rejects the whole catalog.
    fn seats_match(&self, car: &Car) -> bool {
        self.seats.is_empty() || car.seats == self.seats
    }

    fn price_matches(&self, car: &Car) -> bool {
        if self.min_price.is_unset() && self.max_price.is_unset() {
            return true;
        }
        let Some(price) = car.price_value() else {
            return false;
        };
        let above_min = match self.min_price {
            PriceBound::Unset => true,
            PriceBound::At(min) => price >= min,
            PriceBound::Invalid => false,
        };
        let below_max = match self.max_price {
            PriceBound::Unset => true,
            PriceBound::At(max) => price <= max,
            PriceBound::Invalid => false,
        };
        above_min && below_max
    }

    fn search_matches(&self, car: &Car) -> bool {
        self.search.is_empty() || car.name.to_lowercase().contains(&self.search)
    }
}
