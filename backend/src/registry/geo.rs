//! `geo` payloads.

use super::escape::percent_encode;
use super::fields::{FieldSchema, FieldValues, InputKind};

const LAT: &str = "lat";
const LNG: &str = "lng";
const LABEL: &str = "label";

pub(super) const GEO_FIELDS: &[FieldSchema] = &[
    FieldSchema::required(LAT, "Latitude", InputKind::Numeric).with_validator(validate_lat),
    FieldSchema::required(LNG, "Longitude", InputKind::Numeric).with_validator(validate_lng),
    FieldSchema::optional(LABEL, "Label", InputKind::SingleLine),
];

/// Accepts both `52.52` and `52,52`.
fn normalize_coordinate(value: &str) -> String {
    value.trim().replace(',', ".")
}

fn parse_coordinate(value: &str) -> Option<f64> {
    normalize_coordinate(value)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn validate_range(value: &str, label: &str, limit: f64) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    match parse_coordinate(value) {
        Some(v) if (-limit..=limit).contains(&v) => None,
        Some(_) => Some(format!("{label} must be between -{limit} and {limit}")),
        None => Some(format!("{label} must be a number")),
    }
}

fn validate_lat(value: &str, _: &FieldValues) -> Option<String> {
    validate_range(value, "Latitude", 90.0)
}

fn validate_lng(value: &str, _: &FieldValues) -> Option<String> {
    validate_range(value, "Longitude", 180.0)
}

pub(super) fn build_geo(values: &FieldValues) -> String {
    let mut payload = format!(
        "geo:{},{}",
        normalize_coordinate(values.get(LAT)),
        normalize_coordinate(values.get(LNG))
    );
    let label = values.trimmed(LABEL);
    if !label.is_empty() {
        payload.push_str("?q=");
        payload.push_str(&percent_encode(label));
    }
    payload
}
