// Persisted wishlist of car snapshots with toggle semantics

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::StoreError;
use crate::models::{Car, CarId};
use crate::store::{KeyValueStore, WISHLIST_KEY};

pub struct Wishlist {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<Car>,
}

impl Wishlist {
    /// Builds the wishlist from whatever the store holds.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = restore_entries(store.as_ref());
        tracing::info!("Restored {} wishlist entries.", entries.len());
        Self { store, entries }
    }

    pub fn entries(&self) -> &[Car] {
        &self.entries
    }

    pub fn is_wishlisted(&self, id: &CarId) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    pub fn get(&self, id: &CarId) -> Option<&Car> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Removes every entry with `car.id` if present, otherwise appends a snapshot of `car`.
    /// The new set is written to the store before memory changes, so a failed write
    /// leaves the wishlist as it was.
    pub fn toggle(&mut self, car: &Car) -> Result<&[Car], StoreError> {
        let updated: Vec<Car> = if self.is_wishlisted(&car.id) {
            self.entries.iter().filter(|entry| entry.id != car.id).cloned().collect()
        } else {
            let mut updated = self.entries.clone();
            updated.push(car.clone());
            updated
        };

        let payload = serde_json::to_string(&updated)?;
        self.store.set(WISHLIST_KEY, &payload)?;
        self.entries = updated;
        Ok(&self.entries)
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for car in &self.entries {
            writer
                .serialize(CsvRow::from(car))
                .with_context(|| format!("Failed to write wishlist row for car {}", car.id))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush wishlist CSV: {}", e.error()))?;
        String::from_utf8(bytes).context("Wishlist CSV is not valid UTF-8")
    }
}

/// Reads the persisted entries. Nothing stored, an unreadable store and a payload that is
/// not a JSON array all come back as an empty list. Entries that do not read as a car are
/// dropped one by one; the rest keep their stored order.
pub fn restore_entries(store: &dyn KeyValueStore) -> Vec<Car> {
    let payload = match store.get(WISHLIST_KEY) {
        Ok(Some(payload)) => payload,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Could not read persisted wishlist: {}", e);
            return Vec::new();
        }
    };
    let records = match serde_json::from_str::<Value>(&payload) {
        Ok(Value::Array(records)) => records,
        Ok(other) => {
            tracing::warn!("Ignoring persisted wishlist: expected an array, found {}", json_kind(&other));
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!("Ignoring malformed persisted wishlist: {}", e);
            return Vec::new();
        }
    };
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Car>(record) {
            Ok(car) => Some(car),
            Err(e) => {
                tracing::warn!("Skipping persisted wishlist entry #{}: {}", index, e);
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: String,
    brand: &'a str,
    name: &'a str,
    year: Option<i64>,
    price: Option<f64>,
    fuel: &'a str,
    seats: &'a str,
    image: &'a str,
}

impl<'a> From<&'a Car> for CsvRow<'a> {
    fn from(car: &'a Car) -> Self {
        CsvRow {
            id: car.id.to_string(),
            brand: &car.brand,
            name: &car.name,
            year: car.year,
            price: car.price_value(),
            fuel: car.fuel_label(),
            seats: &car.seats,
            image: car.image_url(),
        }
    }
}
