// The filter -> sort -> paginate pipeline as plain functions

use serde::Serialize;

use crate::filter;
use crate::models::{Car, FilterCriteria, SortKey};
use crate::paginate::{page_count, paginate};
use crate::sort;

/// One page of the filtered and sorted catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub cars: Vec<Car>,
    /// 1-based page index that was requested
    pub index: usize,
    pub size: usize,
    /// Number of cars matching the criteria across all pages
    pub total: usize,
    /// Number of pages, `ceil(total / size)`
    pub count: usize,
}

impl Page {
    pub fn from_results(results: &[Car], page_size: usize, page_index: usize) -> Self {
        Page {
            cars: paginate(results, page_size, page_index).to_vec(),
            index: page_index,
            size: page_size,
            total: results.len(),
            count: page_count(results.len(), page_size),
        }
    }
}

/// Filter then sort. Sorting never happens before filtering.
pub fn derive_results(catalog: &[Car], criteria: &FilterCriteria, search: &str, sort_key: SortKey) -> Vec<Car> {
    sort::sort(filter::apply(catalog, criteria, search), sort_key)
}

pub fn derive_view(
    catalog: &[Car],
    criteria: &FilterCriteria,
    search: &str,
    sort_key: SortKey,
    page_index: usize,
    page_size: usize,
) -> Page {
    let results = derive_results(catalog, criteria, search, sort_key);
    Page::from_results(&results, page_size, page_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{test_car, CarId};

    fn catalog() -> Vec<Car> {
        vec![
            test_car(1, "Toyota", "Corolla", "20000"),
            test_car(2, "Honda", "Civic", "22000"),
        ]
    }

    #[test]
    fn pages_through_two_item_catalog() {
        let page = derive_view(&catalog(), &FilterCriteria::default(), "", SortKey::None, 2, 1);
        assert_eq!(page.cars.len(), 1);
        assert_eq!(page.cars[0].id, CarId::Number(2));
        assert_eq!(page.count, 2);
        assert_eq!(page.total, 2);

        let beyond = derive_view(&catalog(), &FilterCriteria::default(), "", SortKey::None, 3, 1);
        assert!(beyond.cars.is_empty());
        assert_eq!(beyond.count, 2);
    }

    #[test]
    fn sorts_after_filtering() {
        let mut catalog = catalog();
        catalog.push(test_car(3, "Toyota", "Supra", "45000"));
        let criteria = FilterCriteria {
            brand: "toyota".to_string(),
            ..Default::default()
        };
        let page = derive_view(&catalog, &criteria, "", SortKey::PriceDescending, 1, 10);
        let ids: Vec<CarId> = page.cars.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![CarId::Number(3), CarId::Number(1)]);
        assert_eq!(page.total, 2);
        assert_eq!(page.count, 1);
    }

    #[test]
    fn shrinking_results_do_not_reset_page_index() {
        let catalog: Vec<Car> = (1..=25).map(|i| test_car(i, "Ford", "Focus", "10000")).collect();
        let wide = derive_view(&catalog, &FilterCriteria::default(), "", SortKey::None, 3, 10);
        assert_eq!(wide.cars.len(), 5);

        let narrow = derive_view(&catalog, &FilterCriteria::default(), "fiesta", SortKey::None, 3, 10);
        assert!(narrow.cars.is_empty());
        assert_eq!(narrow.index, 3);
        assert_eq!(narrow.count, 0);
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let a = derive_view(&catalog(), &FilterCriteria::default(), "c", SortKey::PriceAscending, 1, 1);
        let b = derive_view(&catalog(), &FilterCriteria::default(), "c", SortKey::PriceAscending, 1, 1);
        assert_eq!(a, b);
    }
}
