// Maps raw listing-source records onto the canonical Car shape

use serde_json::{Map, Number, Value};
use std::collections::HashSet;

use crate::error::CatalogError;
use crate::models::{Car, CarId, Price, SEATS_PLACEHOLDER};

/// Normalizes a whole listing payload. Anything other than a JSON array is a fetch failure;
/// problems with individual records only drop those records.
pub fn normalize(payload: Value) -> Result<Vec<Car>, CatalogError> {
    let records = match payload {
        Value::Array(records) => records,
        other => {
            let found = json_kind(&other);
            tracing::error!("Listing source did not return an array, got {}", found);
            return Err(CatalogError::NotAnArray { found });
        }
    };

    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let mut cars = Vec::with_capacity(total);

    for (index, record) in records.into_iter().enumerate() {
        let Value::Object(record) = record else {
            tracing::warn!("Skipping record #{}: not an object", index);
            continue;
        };
        let Some(car) = normalize_record(&record) else {
            tracing::warn!("Skipping record #{}: missing or invalid id", index);
            continue;
        };
        if !seen.insert(car.id.clone()) {
            tracing::warn!("Skipping record #{}: duplicate id {}", index, car.id);
            continue;
        }
        cars.push(car);
    }

    tracing::info!("Normalized {} of {} listing records.", cars.len(), total);
    Ok(cars)
}

/// Maps one record. Returns `None` only when the record has no usable identity.
pub fn normalize_record(record: &Map<String, Value>) -> Option<Car> {
    let id = car_id(record.get("id")?)?;

    Some(Car {
        id,
        brand: text(record, "make").unwrap_or_default(),
        name: text(record, "model").unwrap_or_default(),
        year: integer(record, "year"),
        color: text(record, "color"),
        mileage: number(record, "mileage"),
        price: price(record.get("price")),
        fuel: text(record, "fuelType"),
        transmission: text(record, "transmission"),
        engine: text(record, "engine"),
        horsepower: number(record, "horsepower"),
        features: features(record.get("features")),
        owners: integer(record, "owners"),
        image: text(record, "image").filter(|url| !url.trim().is_empty()),
        // The source has no seat data; every car gets the same estimate.
        seats: SEATS_PLACEHOLDER.to_string(),
    })
}

fn car_id(value: &Value) -> Option<CarId> {
    match value {
        Value::Number(n) => n.as_u64().map(CarId::Number),
        Value::String(s) if !s.trim().is_empty() => Some(CarId::from_path(s.trim())),
        _ => None,
    }
}

fn text(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(record: &Map<String, Value>, key: &str) -> Option<Number> {
    match record.get(key)? {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .map(Number::from)
                .or_else(|| trimmed.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => None,
    }
}

fn integer(record: &Map<String, Value>, key: &str) -> Option<i64> {
    match record.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// Price keeps whatever form the source used; parsing happens on use.
fn price(value: Option<&Value>) -> Option<Price> {
    match value? {
        Value::Number(n) => Some(Price::Number(n.clone())),
        Value::String(s) => Some(Price::Text(s.clone())),
        _ => None,
    }
}

fn features(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
