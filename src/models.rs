// Data structures shared across the catalog engine, the wishlist and the HTTP layer

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Seat count assigned to every car. The listing source carries no seat data.
pub const SEATS_PLACEHOLDER: &str = "5 (est.)";
pub const IMAGE_PLACEHOLDER: &str = "https://dummyimage.com/300x200/ccc/000.jpg&text=No+Image";

// Source-assigned identity. The listing source uses integers, but strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CarId {
    Number(u64),
    Text(String),
}

impl CarId {
    // Path segments are untyped; numeric text is read back as a numeric id.
    pub fn from_path(segment: &str) -> Self {
        match segment.parse::<u64>() {
            Ok(n) => CarId::Number(n),
            Err(_) => CarId::Text(segment.to_string()),
        }
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarId::Number(n) => write!(f, "{}", n),
            CarId::Text(s) => f.write_str(s),
        }
    }
}

// Price as it arrived from the source. Parsed only when compared or displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(Number),
    Text(String),
}

impl Price {
    pub fn value(&self) -> Option<f64> {
        match self {
            Price::Number(n) => n.as_f64(),
            Price::Text(s) => parse_float(s),
        }
    }
}

/// Reads the longest numeric prefix of `input`, ignoring leading whitespace.
/// `"123abc"` yields 123, `"abc"` yields nothing.
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

// Canonical car entity. Field names double as the persisted wishlist snapshot format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub mileage: Option<Number>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub horsepower: Option<Number>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    #[serde(default)]
    pub owners: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_seats")]
    pub seats: String,
}

fn default_seats() -> String {
    SEATS_PLACEHOLDER.to_string()
}

// Snapshots written by older builds may hold null where a value is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Car {
    pub fn price_value(&self) -> Option<f64> {
        self.price.as_ref().and_then(Price::value)
    }

    pub fn image_url(&self) -> &str {
        match self.image.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => IMAGE_PLACEHOLDER,
        }
    }

    pub fn fuel_label(&self) -> &str {
        match self.fuel.as_deref() {
            Some(fuel) if !fuel.is_empty() => fuel,
            _ => "N/A",
        }
    }
}

// Active filter constraints. Empty strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    #[serde(deserialize_with = "lenient_string")]
    pub brand: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fuel: String,
    #[serde(deserialize_with = "lenient_string")]
    pub seats: String,
    #[serde(deserialize_with = "lenient_string")]
    pub min_price: String,
    #[serde(deserialize_with = "lenient_string")]
    pub max_price: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    Brand,
    Fuel,
    Seats,
    MinPrice,
    MaxPrice,
}

impl FilterField {
    /// Maps a wire key to a field. Unknown keys are `None` and get ignored by callers.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "brand" => Some(FilterField::Brand),
            "fuel" => Some(FilterField::Fuel),
            "seats" => Some(FilterField::Seats),
            "minPrice" => Some(FilterField::MinPrice),
            "maxPrice" => Some(FilterField::MaxPrice),
            _ => None,
        }
    }
}

impl FilterCriteria {
    pub fn set(&mut self, field: FilterField, value: String) {
        let slot = match field {
            FilterField::Brand => &mut self.brand,
            FilterField::Fuel => &mut self.fuel,
            FilterField::Seats => &mut self.seats,
            FilterField::MinPrice => &mut self.min_price,
            FilterField::MaxPrice => &mut self.max_price,
        };
        *slot = value;
    }

    pub fn min_price_bound(&self) -> PriceBound {
        PriceBound::parse(&self.min_price)
    }

    pub fn max_price_bound(&self) -> PriceBound {
        PriceBound::parse(&self.max_price)
    }
}

/// A price bound as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceBound {
    Unset,
    At(f64),
    /// Non-empty text that is not a number. No price satisfies it.
    Invalid,
}

impl PriceBound {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return PriceBound::Unset;
        }
        match parse_float(raw) {
            Some(bound) => PriceBound::At(bound),
            None => {
                tracing::debug!("Price bound {:?} is not a number; nothing will match it", raw);
                PriceBound::Invalid
            }
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, PriceBound::Unset)
    }
}

// Accepts strings, numbers and null for fields that come from free-form inputs.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| criterion_text(&value))
}

pub fn criterion_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "none", alias = "")]
    None,
    #[serde(rename = "priceAscending", alias = "low")]
    PriceAscending,
    #[serde(rename = "priceDescending", alias = "high")]
    PriceDescending,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(SortKey::None),
            "low" | "priceAscending" => Ok(SortKey::PriceAscending),
            "high" | "priceDescending" => Ok(SortKey::PriceDescending),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_car(id: u64, brand: &str, name: &str, price: &str) -> Car {
    Car {
        id: CarId::Number(id),
        brand: brand.to_string(),
        name: name.to_string(),
        year: Some(2020),
        color: None,
        mileage: None,
        price: Some(Price::Text(price.to_string())),
        fuel: None,
        transmission: None,
        engine: None,
        horsepower: None,
        features: Vec::new(),
        owners: None,
        image: None,
        seats: SEATS_PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_float_reads_numeric_prefix() {
        assert_eq!(parse_float("20000"), Some(20000.0));
        assert_eq!(parse_float("  19999.5 "), Some(19999.5));
        assert_eq!(parse_float("123abc"), Some(123.0));
        assert_eq!(parse_float("-4.5e2x"), Some(-450.0));
        assert_eq!(parse_float("7e"), Some(7.0));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("-"), None);
        assert_eq!(parse_float("$20,000"), None);
    }

    #[test]
    fn price_value_handles_numbers_and_text() {
        let numeric: Price = serde_json::from_value(json!(25000)).unwrap();
        assert_eq!(numeric.value(), Some(25000.0));
        let text: Price = serde_json::from_value(json!("25000")).unwrap();
        assert_eq!(text.value(), Some(25000.0));
        let junk: Price = serde_json::from_value(json!("call us")).unwrap();
        assert_eq!(junk.value(), None);
    }

    #[test]
    fn criteria_accept_numbers_and_ignore_unknown_keys() {
        let criteria: FilterCriteria = serde_json::from_value(json!({
            "brand": "toy",
            "minPrice": 20000,
            "maxPrice": null,
            "colour": "red"
        }))
        .unwrap();
        assert_eq!(criteria.brand, "toy");
        assert_eq!(criteria.min_price_bound(), PriceBound::At(20000.0));
        assert_eq!(criteria.max_price_bound(), PriceBound::Unset);
    }

    #[test]
    fn non_numeric_bound_is_invalid() {
        let criteria = FilterCriteria {
            min_price: "cheap".to_string(),
            max_price: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(criteria.min_price_bound(), PriceBound::Invalid);
        assert_eq!(criteria.max_price_bound(), PriceBound::Invalid);
        assert_eq!(FilterCriteria::default().min_price_bound(), PriceBound::Unset);
    }

    #[test]
    fn null_snapshot_fields_fall_back_to_defaults() {
        let car: Car = serde_json::from_value(json!({
            "id": 2, "brand": null, "name": null, "features": null, "price": "15000"
        }))
        .unwrap();
        assert_eq!(car.brand, "");
        assert!(car.features.is_empty());
        assert_eq!(car.price_value(), Some(15000.0));
    }

    #[test]
    fn sort_key_accepts_wire_aliases() {
        assert_eq!("low".parse::<SortKey>().unwrap(), SortKey::PriceAscending);
        assert_eq!("high".parse::<SortKey>().unwrap(), SortKey::PriceDescending);
        assert_eq!("".parse::<SortKey>().unwrap(), SortKey::None);
        assert!("sideways".parse::<SortKey>().is_err());
        let key: SortKey = serde_json::from_value(json!("low")).unwrap();
        assert_eq!(key, SortKey::PriceAscending);
        assert_eq!(serde_json::to_value(SortKey::PriceDescending).unwrap(), json!("priceDescending"));
    }

    #[test]
    fn car_snapshot_falls_back_for_missing_fields() {
        let car: Car = serde_json::from_value(json!({ "id": 9, "brand": "Kia", "name": "Rio" })).unwrap();
        assert_eq!(car.id, CarId::Number(9));
        assert_eq!(car.seats, SEATS_PLACEHOLDER);
        assert_eq!(car.image_url(), IMAGE_PLACEHOLDER);
        assert_eq!(car.fuel_label(), "N/A");
        assert_eq!(car.price_value(), None);
    }

    #[test]
    fn car_id_from_path_prefers_numbers() {
        assert_eq!(CarId::from_path("42"), CarId::Number(42));
        assert_eq!(CarId::from_path("abc-1"), CarId::Text("abc-1".to_string()));
    }
}
