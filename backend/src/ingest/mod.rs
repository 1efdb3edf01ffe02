//! # Row Ingestion & Validation
//!
//! Maps raw spreadsheet rows onto the field schema of their content type,
//! validates them and builds their payloads. Every row comes back as a
//! [`ParsedRow`] so rejected rows can be shown with their errors; only rows
//! that resolved a type and passed every check become [`BatchItem`]s.

pub mod slug;

use crate::registry::{self, ContentTypeDefinition, FieldValues};
use common::model::batch::BatchItem;
use common::model::content_type::ContentType;
use common::model::row::{ParsedRow, RawRow, RowError, TYPE_ERROR_KEY};
use rayon::prelude::*;
use serde::Serialize;

/// Columns checked, in order, for the content type tag.
const TYPE_COLUMNS: [&str; 3] = ["type", "Type", "TYPE"];

/// Result of ingesting a whole sheet.
#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub valid: usize,
    pub rejected: usize,
    pub rows: Vec<ParsedRow>,
    #[serde(skip)]
    pub items: Vec<BatchItem>,
}

/// Validates every row (in parallel) and keeps their order.
pub fn ingest_rows(rows: Vec<RawRow>) -> IngestReport {
    let rows: Vec<ParsedRow> = rows
        .into_par_iter()
        .enumerate()
        .map(|(i, raw)| parse_row(i + 1, raw))
        .collect();
    let items = batch_items(&rows);
    let valid = items.len();
    let rejected = rows.len() - valid;
    log::info!("Ingested {} rows: {} valid, {} rejected", rows.len(), valid, rejected);
    IngestReport {
        valid,
        rejected,
        rows,
        items,
    }
}

/// Parses one row. `index` is 1-based.
pub fn parse_row(index: usize, raw: RawRow) -> ParsedRow {
    let slug = slug::derive(index, &raw);
    let type_cell = TYPE_COLUMNS
        .iter()
        .filter_map(|column| raw.get(column))
        .map(str::trim)
        .find(|value| !value.is_empty());
    let resolved = match type_cell {
        None => Ok(ContentType::Text),
        Some(tag) => tag.parse::<ContentType>(),
    };

    match resolved {
        Ok(tag) => {
            let definition = registry::definition(tag);
            let values = scope_fields(definition, &raw);
            let mut errors = definition.validate(&values);
            let payload = definition.build_payload(&values);
            if let Some(error) = registry::check_payload(&payload) {
                errors.push(error);
            }
            ParsedRow {
                index,
                content_type: Some(tag),
                slug,
                payload,
                errors,
                raw,
            }
        }
        Err(unknown) => ParsedRow {
            index,
            content_type: None,
            slug,
            payload: String::new(),
            errors: vec![RowError::new(TYPE_ERROR_KEY, unknown.to_string())],
            raw,
        },
    }
}

/// Picks the value of every schema field out of the row's columns, trying
/// the field name, its upper-cased form and its label.
fn scope_fields(definition: &ContentTypeDefinition, raw: &RawRow) -> FieldValues {
    let mut values = FieldValues::new();
    for field in definition.fields {
        let value = raw
            .get(field.name)
            .or_else(|| raw.get(&field.name.to_uppercase()))
            .or_else(|| raw.get(field.label));
        if let Some(value) = value {
            values.insert(field.name, value);
        }
    }
    values
}

/// The worker-facing projection of the usable rows, in row order.
pub fn batch_items(rows: &[ParsedRow]) -> Vec<BatchItem> {
    rows.iter()
        .filter(|row| row.is_valid())
        .filter_map(|row| {
            row.content_type.map(|content_type| BatchItem {
                index: row.index,
                content_type,
                payload: row.payload.clone(),
                slug: row.slug.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::row::PAYLOAD_ERROR_KEY;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn missing_type_column_defaults_to_text() {
        let parsed = parse_row(1, row(&[("text", "hello"), ("slug", "greeting")]));
        assert_eq!(parsed.content_type, Some(ContentType::Text));
        assert_eq!(parsed.payload, "hello");
        assert!(parsed.is_valid());
    }

    #[test]
    fn type_lookup_is_case_insensitive() {
        let parsed = parse_row(2, row(&[("Type", "URL"), ("url", "example.com")]));
        assert_eq!(parsed.content_type, Some(ContentType::Url));
        assert_eq!(parsed.payload, "https://example.com");
    }

    #[test]
    fn upper_case_type_column_is_recognized() {
        let parsed = parse_row(4, row(&[("TYPE", "phone"), ("phone", "+1 555 0100")]));
        assert_eq!(parsed.content_type, Some(ContentType::Tel));
        assert_eq!(parsed.payload, "tel:+15550100");
    }

    #[test]
    fn unknown_type_is_rejected_with_type_error() {
        let parsed = parse_row(3, row(&[("type", "hologram"), ("text", "x")]));
        assert_eq!(parsed.content_type, None);
        assert_eq!(parsed.errors[0].field, TYPE_ERROR_KEY);
        assert!(!parsed.is_valid());
    }

    #[test]
    fn fields_match_upper_case_and_label_columns() {
        let parsed = parse_row(
            4,
            row(&[("type", "wifi"), ("SSID", "Lobby"), ("Security", "nopass")]),
        );
        assert_eq!(parsed.payload, "WIFI:T:nopass;S:Lobby;;");
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    }

    #[test]
    fn all_field_errors_are_accumulated() {
        let parsed = parse_row(5, row(&[("type", "geo"), ("lat", "200"), ("lng", "")]));
        let fields: Vec<&str> = parsed.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["lat", "lng"]);
    }

    #[test]
    fn oversized_payload_never_becomes_an_item() {
        let big = "x".repeat(3000);
        let report = ingest_rows(vec![
            row(&[("type", "text"), ("text", big.as_str())]),
            row(&[("type", "text"), ("text", "small")]),
        ]);
        assert_eq!(report.valid, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.rows[0].errors[0].field, PAYLOAD_ERROR_KEY);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].index, 2);
    }

    #[test]
    fn unresolved_rows_never_reach_items() {
        let mut rows: Vec<RawRow> = (0..50)
            .map(|i| {
                let phone = format!("+1 555 01{i:02}");
                row(&[("type", "tel"), ("phone", phone.as_str())])
            })
            .collect();
        rows.insert(10, row(&[("type", "fax"), ("phone", "555 0100")]));
        let report = ingest_rows(rows);
        assert_eq!(report.items.len(), 50);
        assert!(report.items.iter().all(|item| item.index != 11));
        let indices: Vec<usize> = report.rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, (1..=51).collect::<Vec<_>>());
    }
}
