//! Turns an uploaded CSV file into raw spreadsheet rows.
//!
//! The header line decides the delimiter (whichever of `,` `;` `\t` `|`
//! appears most often) and the column names. Data rows may be ragged: missing
//! cells read as empty, extra cells are dropped. Rows with only blank cells
//! are skipped.

use crate::error::CsvSourceError;
use common::model::row::RawRow;

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Picks the candidate delimiter with the most occurrences in the header.
/// Ties go to the earlier candidate, so plain single-column files use `,`.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = DELIMITERS[0];
    let mut best_count = 0;
    for &candidate in &DELIMITERS {
        let count = header_line.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

fn normalize_header(cell: &str) -> String {
    cell.replace('\u{00A0}', " ").trim().to_string()
}

/// Parses CSV bytes into rows keyed by the header titles.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<RawRow>, CsvSourceError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|_| CsvSourceError::Encoding)?;
    let header_line = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or(CsvSourceError::Empty)?;
    let delimiter = detect_delimiter(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let titles: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    if let Some(position) = titles.iter().position(|t| t.is_empty()) {
        return Err(CsvSourceError::EmptyHeader(position + 1));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRow = titles
            .iter()
            .enumerate()
            .map(|(i, title)| (title.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        if !row.is_blank() {
            rows.push(row);
        }
    }
    log::debug!(
        "Read {} rows with {} columns (delimiter {:?})",
        rows.len(),
        titles.len(),
        delimiter as char
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn detects_semicolon_delimiter() {
        assert_eq!(detect_delimiter("type;url;slug"), b';');
        assert_eq!(detect_delimiter("type\turl"), b'\t');
        assert_eq!(detect_delimiter("text"), b',');
    }

    #[test]
    fn reads_pipe_delimited_rows() {
        assert_eq!(detect_delimiter("type|text|slug"), b'|');
        let rows = read_rows(b"type|text|slug\ntext|a, b; c|note\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("text"), Some("a, b; c"));
        assert_eq!(rows[0].get("slug"), Some("note"));
    }

    #[test]
    fn reads_rows_in_header_order() {
        let csv = "type,url,slug\nurl,example.com,home\nurl,\"a.com/x,y\",other\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value_at(1), Some("example.com"));
        assert_eq!(rows[1].get("url"), Some("a.com/x,y"));
    }

    #[test]
    fn strips_bom_and_skips_blank_rows() {
        let csv = "\u{FEFF}type;text\ntext;hello\n;\ntext;bye\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].columns()[0].0, "type");
    }

    #[test]
    fn ragged_rows_are_padded() {
        let rows = read_rows(b"type,ssid,password\nwifi,Guest\n").unwrap();
        assert_eq!(rows[0].get("password"), Some(""));
    }

    #[test]
    fn empty_header_cell_is_rejected() {
        assert_matches!(read_rows(b"type,,slug\nurl,x,y\n"), Err(CsvSourceError::EmptyHeader(2)));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_matches!(read_rows(b""), Err(CsvSourceError::Empty));
        assert_matches!(read_rows(b"\xff\xfe"), Err(CsvSourceError::Encoding));
    }
}
