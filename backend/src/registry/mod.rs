//! # Content Type Registry
//!
//! The static catalog of payload kinds a spreadsheet row can be encoded as.
//! Every [`ContentType`] has exactly one [`ContentTypeDefinition`] holding its
//! ordered field schemas and the pure function that serializes field values
//! into the string stored in the QR symbol.
//!
//! Payload builders are total: missing fields read as empty strings, and the
//! same values always produce the same payload.

mod calendar;
mod contact;
mod escape;
mod fields;
mod geo;
mod web;
mod wifi;

pub use fields::{FieldSchema, FieldValues, InputKind, Validator};

use common::model::content_type::{ContentType, UnknownContentType};
use common::model::row::{RowError, PAYLOAD_ERROR_KEY};
use fields::pattern_matches;
use std::fmt;

/// Largest payload, in UTF-8 bytes, accepted for encoding.
///
/// This is the byte-mode capacity of a version 40 symbol at level L; payloads
/// close to it only fit the lower error correction levels.
pub const MAX_PAYLOAD_BYTES: usize = 2953;

/// A registered content type.
pub struct ContentTypeDefinition {
    pub tag: ContentType,
    pub label: &'static str,
    pub fields: &'static [FieldSchema],
    build: fn(&FieldValues) -> String,
}

impl ContentTypeDefinition {
    /// Serializes `values` into the QR payload for this type.
    pub fn build_payload(&self, values: &FieldValues) -> String {
        (self.build)(values)
    }

    /// Runs the required, pattern and validator checks of every field in
    /// schema order, collecting every failure.
    pub fn validate(&self, values: &FieldValues) -> Vec<RowError> {
        let mut errors = Vec::new();
        for field in self.fields {
            let value = values.get(field.name);
            let trimmed = value.trim();
            if trimmed.is_empty() && field.required {
                errors.push(RowError::new(field.name, format!("{} is required", field.label)));
                continue;
            }
            if let Some(pattern) = field.pattern {
                if !trimmed.is_empty() && !pattern_matches(pattern, trimmed) {
                    errors.push(RowError::new(field.name, format!("{} is not valid", field.label)));
                    continue;
                }
            }
            if let Some(message) = field.validate.and_then(|validate| validate(value, values)) {
                errors.push(RowError::new(field.name, message));
            }
        }
        errors
    }
}

impl fmt::Debug for ContentTypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentTypeDefinition")
            .field("tag", &self.tag)
            .field("label", &self.label)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

pub(crate) static REGISTRY: [ContentTypeDefinition; 10] = [
    ContentTypeDefinition {
        tag: ContentType::Url,
        label: "Website",
        fields: web::URL_FIELDS,
        build: web::build_url,
    },
    ContentTypeDefinition {
        tag: ContentType::Text,
        label: "Text",
        fields: web::TEXT_FIELDS,
        build: web::build_text,
    },
    ContentTypeDefinition {
        tag: ContentType::Tel,
        label: "Phone call",
        fields: contact::TEL_FIELDS,
        build: contact::build_tel,
    },
    ContentTypeDefinition {
        tag: ContentType::Sms,
        label: "SMS",
        fields: contact::SMS_FIELDS,
        build: contact::build_sms,
    },
    ContentTypeDefinition {
        tag: ContentType::Mailto,
        label: "Email",
        fields: contact::MAILTO_FIELDS,
        build: contact::build_mailto,
    },
    ContentTypeDefinition {
        tag: ContentType::Geo,
        label: "Location",
        fields: geo::GEO_FIELDS,
        build: geo::build_geo,
    },
    ContentTypeDefinition {
        tag: ContentType::Wifi,
        label: "Wi-Fi network",
        fields: wifi::WIFI_FIELDS,
        build: wifi::build_wifi,
    },
    ContentTypeDefinition {
        tag: ContentType::Vcard,
        label: "Contact (vCard)",
        fields: contact::VCARD_FIELDS,
        build: contact::build_vcard,
    },
    ContentTypeDefinition {
        tag: ContentType::Mecard,
        label: "Contact (MeCard)",
        fields: contact::MECARD_FIELDS,
        build: contact::build_mecard,
    },
    ContentTypeDefinition {
        tag: ContentType::Ics,
        label: "Calendar event",
        fields: calendar::ICS_FIELDS,
        build: calendar::build_ics,
    },
];

/// The definition registered for `tag`.
pub fn definition(tag: ContentType) -> &'static ContentTypeDefinition {
    let position = match tag {
        ContentType::Url => 0,
        ContentType::Text => 1,
        ContentType::Tel => 2,
        ContentType::Sms => 3,
        ContentType::Mailto => 4,
        ContentType::Geo => 5,
        ContentType::Wifi => 6,
        ContentType::Vcard => 7,
        ContentType::Mecard => 8,
        ContentType::Ics => 9,
    };
    &REGISTRY[position]
}

/// Looks a definition up by its textual tag.
pub fn lookup(tag: &str) -> Result<&'static ContentTypeDefinition, UnknownContentType> {
    tag.parse::<ContentType>().map(definition)
}

pub fn definitions() -> &'static [ContentTypeDefinition] {
    &REGISTRY
}

/// Checks the built payload itself: it must be non-empty and fit the
/// capacity ceiling.
pub fn check_payload(payload: &str) -> Option<RowError> {
    if payload.trim().is_empty() {
        return Some(RowError::new(PAYLOAD_ERROR_KEY, "Payload is empty"));
    }
    let bytes = payload.len();
    if bytes > MAX_PAYLOAD_BYTES {
        return Some(RowError::new(
            PAYLOAD_ERROR_KEY,
            format!("Payload is {bytes} bytes; the limit is {MAX_PAYLOAD_BYTES}"),
        ));
    }
    None
}
