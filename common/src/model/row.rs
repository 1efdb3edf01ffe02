use crate::model::content_type::ContentType;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Error key used for payload-level failures (empty or over capacity).
pub const PAYLOAD_ERROR_KEY: &str = "__payload";
/// Error key used when the `type` column names no known content type.
pub const TYPE_ERROR_KEY: &str = "type";

/// One spreadsheet record as produced by the data source parser.
///
/// Column order is kept as it appears in the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    columns: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        RawRow { columns }
    }

    /// Value of the first column whose header equals `key` exactly.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value at a header position.
    pub fn value_at(&self, position: usize) -> Option<&str> {
        self.columns.get(position).map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    pub fn is_blank(&self) -> bool {
        self.columns.iter().all(|(_, v)| v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawRow::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (k, v) in &self.columns {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A validation failure attached to a row, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub field: String,
    pub message: String,
}

impl RowError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        RowError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The outcome of ingesting one spreadsheet record.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedRow {
    /// 1-based position among the data rows.
    pub index: usize,
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
    pub slug: String,
    pub payload: String,
    pub errors: Vec<RowError>,
    #[serde(skip)]
    pub raw: RawRow,
}

impl ParsedRow {
    /// A row is usable when its type resolved and nothing failed validation.
    pub fn is_valid(&self) -> bool {
        self.content_type.is_some() && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_row_keeps_header_order() {
        let row: RawRow = [("type", "url"), ("url", "example.com"), ("slug", "home")]
            .into_iter()
            .collect();
        assert_eq!(row.value_at(1), Some("example.com"));
        assert_eq!(row.get("slug"), Some("home"));
        assert_eq!(row.get("SLUG"), None);
    }

    #[test]
    fn raw_row_serializes_as_ordered_map() {
        let row: RawRow = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"b":"2","a":"1"}"#);
    }

    #[test]
    fn blank_row_detection_ignores_whitespace() {
        let row: RawRow = [("a", "  "), ("b", "")].into_iter().collect();
        assert!(row.is_blank());
    }
}
