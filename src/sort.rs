// Sort strategy over parsed prices

use std::cmp::Ordering;

use crate::models::{Car, SortKey};

/// Orders cars by `key`. Stable: equal prices keep their input order.
/// Cars whose price does not parse go last in either direction.
pub fn sort(mut cars: Vec<Car>, key: SortKey) -> Vec<Car> {
    match key {
        SortKey::None => {}
        SortKey::PriceAscending => cars.sort_by(|a, b| by_price(a, b, false)),
        SortKey::PriceDescending => cars.sort_by(|a, b| by_price(a, b, true)),
    }
    cars
}

fn by_price(a: &Car, b: &Car, descending: bool) -> Ordering {
    match (a.price_value(), b.price_value()) {
        (Some(x), Some(y)) => {
            let ordering = x.total_cmp(&y);
            if descending { ordering.reverse() } else { ordering }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
