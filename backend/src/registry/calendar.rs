//! `ics` calendar event payloads.

use super::escape::escape_text_value;
use super::fields::{FieldSchema, FieldValues, InputKind};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const SUMMARY: &str = "summary";
const START: &str = "start";
const END: &str = "end";
const LOCATION: &str = "location";
const DESCRIPTION: &str = "description";

pub(super) const ICS_FIELDS: &[FieldSchema] = &[
    FieldSchema::required(SUMMARY, "Title", InputKind::SingleLine),
    FieldSchema::required(START, "Start", InputKind::SingleLine).with_validator(validate_start),
    FieldSchema::optional(END, "End", InputKind::SingleLine).with_validator(validate_end),
    FieldSchema::optional(LOCATION, "Location", InputKind::SingleLine),
    FieldSchema::optional(DESCRIPTION, "Description", InputKind::MultiLine),
];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses an ISO-8601 timestamp into UTC.
///
/// Offsets (`Z`, `+03:00`) are honoured; timestamps without an offset are
/// read in the process local time zone; a bare date is midnight UTC.
pub(crate) fn parse_iso_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim().replacen(' ', "T", 1);
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = value.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        return parse_naive(naive).map(|dt| Utc.from_utc_datetime(&dt));
    }
    if let Some(dt) = parse_naive(&value) {
        return Local
            .from_local_datetime(&dt)
            .earliest()
            .map(|local| local.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn to_ics_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn validate_timestamp(value: &str, label: &str) -> Option<String> {
    if value.trim().is_empty() || parse_iso_datetime(value).is_some() {
        None
    } else {
        Some(format!("{label} must be an ISO-8601 date/time"))
    }
}

fn validate_start(value: &str, _: &FieldValues) -> Option<String> {
    validate_timestamp(value, "Start")
}

fn validate_end(value: &str, values: &FieldValues) -> Option<String> {
    if let Some(message) = validate_timestamp(value, "End") {
        return Some(message);
    }
    match (parse_iso_datetime(values.get(START)), parse_iso_datetime(value)) {
        (Some(start), Some(end)) if end <= start => Some("End must be after start".to_string()),
        _ => None,
    }
}

struct Event<'a> {
    summary: &'a str,
    description: &'a str,
    location: &'a str,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl<'a> Event<'a> {
    fn from_values(values: &'a FieldValues) -> Self {
        Event {
            summary: values.trimmed(SUMMARY),
            description: values.get(DESCRIPTION).trim(),
            location: values.trimmed(LOCATION),
            start: parse_iso_datetime(values.get(START)),
            end: parse_iso_datetime(values.get(END)),
        }
    }

    fn payload(&self) -> String {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "BEGIN:VEVENT".to_string(),
        ];
        for (property, value) in [
            ("SUMMARY", self.summary),
            ("DESCRIPTION", self.description),
            ("LOCATION", self.location),
        ] {
            if !value.is_empty() {
                lines.push(format!("{property}:{}", escape_text_value(value)));
            }
        }
        if let Some(start) = self.start {
            lines.push(format!("DTSTART:{}", to_ics_utc(start)));
        }
        if let Some(end) = self.end {
            lines.push(format!("DTEND:{}", to_ics_utc(end)));
        }
        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());
        lines.join("\r\n")
    }
}

pub(super) fn build_ics(values: &FieldValues) -> String {
    Event::from_values(values).payload()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_converted_to_utc() {
        let values = FieldValues::from_pairs([
            (SUMMARY, "Standup"),
            (START, "2024-03-12T10:00:00+03:00"),
            (END, "2024-03-12T11:00:00+03:00"),
        ]);
        let payload = build_ics(&values);
        assert!(payload.contains("DTSTART:20240312T070000Z"));
        assert!(payload.contains("DTEND:20240312T080000Z"));
        assert!(payload.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nSUMMARY:Standup"));
        assert!(payload.ends_with("END:VEVENT\r\nEND:VCALENDAR"));
    }

    #[test]
    fn accepts_minutes_only_and_zulu() {
        assert_eq!(
            parse_iso_datetime("2024-03-12T10:00+01:00").map(to_ics_utc),
            Some("20240312T090000Z".to_string())
        );
        assert_eq!(
            parse_iso_datetime("2024-03-12T10:00Z").map(to_ics_utc),
            Some("20240312T100000Z".to_string())
        );
        assert_eq!(
            parse_iso_datetime("2024-03-12").map(to_ics_utc),
            Some("20240312T000000Z".to_string())
        );
    }

    #[test]
    fn naive_timestamps_are_local_time() {
        let expected = |y, mo, d, h, mi, s| {
            let naive = NaiveDate::from_ymd_opt(y, mo, d)
                .and_then(|date| date.and_hms_opt(h, mi, s))
                .unwrap();
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
        };
        assert_eq!(parse_iso_datetime("2024-07-01T09:30"), expected(2024, 7, 1, 9, 30, 0));
        assert_eq!(parse_iso_datetime("2024-07-01 09:30:15"), expected(2024, 7, 1, 9, 30, 15));
        assert!(parse_iso_datetime("2024-07-01T09:30").is_some());
    }

    #[test]
    fn end_must_follow_start() {
        let values = FieldValues::from_pairs([(START, "2024-03-12T10:00:00Z")]);
        assert!(validate_end("2024-03-12T10:00:00Z", &values).is_some());
        assert!(validate_end("2024-03-12T09:00:00Z", &values).is_some());
        assert!(validate_end("2024-03-12T10:30:00Z", &values).is_none());
        assert!(validate_end("", &values).is_none());
    }

    #[test]
    fn malformed_timestamps_are_reported() {
        let empty = FieldValues::new();
        assert!(validate_start("next tuesday", &empty).is_some());
        assert!(validate_end("2024-13-40", &empty).is_some());
    }

    #[test]
    fn malformed_end_is_left_out_of_payload() {
        let values = FieldValues::from_pairs([
            (SUMMARY, "Launch"),
            (START, "2024-01-01T00:00:00Z"),
            (END, "soon"),
        ]);
        assert!(!build_ics(&values).contains("DTEND"));
    }
}
