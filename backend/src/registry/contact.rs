//! Phone, messaging and contact card payloads: `tel`, `sms`, `mailto`,
//! `vcard` and `mecard`.

use super::escape::{dial_string, digit_count, escape_structured, escape_text_value, percent_encode};
use super::fields::{FieldSchema, FieldValues, InputKind, EMAIL_PATTERN};

const PHONE: &str = "phone";
const MESSAGE: &str = "message";
const EMAIL: &str = "email";
const SUBJECT: &str = "subject";
const BODY: &str = "body";
const FIRST_NAME: &str = "first_name";
const LAST_NAME: &str = "last_name";
const ORG: &str = "org";
const TITLE: &str = "title";
const URL: &str = "url";
const NOTE: &str = "note";
const NAME: &str = "name";
const ADDRESS: &str = "address";

const MIN_DIGITS: usize = 3;
const MAX_DIGITS: usize = 20;

pub(super) const TEL_FIELDS: &[FieldSchema] = &[FieldSchema::required(
    PHONE,
    "Phone",
    InputKind::SingleLine,
)
.with_validator(validate_phone)];

pub(super) const SMS_FIELDS: &[FieldSchema] = &[
    FieldSchema::required(PHONE, "Phone", InputKind::SingleLine).with_validator(validate_phone),
    FieldSchema::optional(MESSAGE, "Message", InputKind::MultiLine),
];

pub(super) const MAILTO_FIELDS: &[FieldSchema] = &[
    FieldSchema::required(EMAIL, "Email", InputKind::Email).with_pattern(EMAIL_PATTERN),
    FieldSchema::optional(SUBJECT, "Subject", InputKind::SingleLine),
    FieldSchema::optional(BODY, "Body", InputKind::MultiLine),
];

pub(super) const VCARD_FIELDS: &[FieldSchema] = &[
    FieldSchema::required(FIRST_NAME, "First name", InputKind::SingleLine),
    FieldSchema::optional(LAST_NAME, "Last name", InputKind::SingleLine),
    FieldSchema::optional(ORG, "Organization", InputKind::SingleLine),
    FieldSchema::optional(TITLE, "Job title", InputKind::SingleLine),
    FieldSchema::optional(PHONE, "Phone", InputKind::SingleLine).with_validator(validate_phone),
    FieldSchema::optional(EMAIL, "Email", InputKind::Email).with_pattern(EMAIL_PATTERN),
    FieldSchema::optional(URL, "Website", InputKind::SingleLine),
    FieldSchema::optional(NOTE, "Note", InputKind::MultiLine),
];

pub(super) const MECARD_FIELDS: &[FieldSchema] = &[
    FieldSchema::required(NAME, "Name", InputKind::SingleLine),
    FieldSchema::optional(PHONE, "Phone", InputKind::SingleLine).with_validator(validate_phone),
    FieldSchema::optional(EMAIL, "Email", InputKind::Email).with_pattern(EMAIL_PATTERN),
    FieldSchema::optional(ADDRESS, "Address", InputKind::SingleLine),
    FieldSchema::optional(NOTE, "Note", InputKind::MultiLine),
];

fn validate_phone(value: &str, _: &FieldValues) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    let digits = digit_count(value);
    if (MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        None
    } else {
        Some(format!(
            "Phone number must contain between {MIN_DIGITS} and {MAX_DIGITS} digits"
        ))
    }
}

pub(super) fn build_tel(values: &FieldValues) -> String {
    format!("tel:{}", dial_string(values.get(PHONE)))
}

pub(super) fn build_sms(values: &FieldValues) -> String {
    format!(
        "SMSTO:{}:{}",
        dial_string(values.get(PHONE)),
        percent_encode(values.get(MESSAGE))
    )
}

pub(super) fn build_mailto(values: &FieldValues) -> String {
    let query: Vec<String> = [(SUBJECT, "subject"), (BODY, "body")]
        .into_iter()
        .filter(|(field, _)| !values.trimmed(field).is_empty())
        .map(|(field, key)| format!("{key}={}", percent_encode(values.get(field))))
        .collect();

    let mut payload = format!("mailto:{}", values.trimmed(EMAIL));
    if !query.is_empty() {
        payload.push('?');
        payload.push_str(&query.join("&"));
    }
    payload
}

struct Person<'a> {
    first_name: &'a str,
    last_name: &'a str,
    org: &'a str,
    title: &'a str,
    phone: &'a str,
    email: &'a str,
    url: &'a str,
    note: &'a str,
}

impl<'a> Person<'a> {
    fn from_values(values: &'a FieldValues) -> Self {
        Person {
            first_name: values.trimmed(FIRST_NAME),
            last_name: values.trimmed(LAST_NAME),
            org: values.trimmed(ORG),
            title: values.trimmed(TITLE),
            phone: values.trimmed(PHONE),
            email: values.trimmed(EMAIL),
            url: values.trimmed(URL),
            note: values.get(NOTE).trim(),
        }
    }

    fn full_name(&self) -> String {
        [self.first_name, self.last_name]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn vcard(&self) -> String {
        let mut lines = vec![
            "BEGIN:VCARD".to_string(),
            "VERSION:3.0".to_string(),
            format!(
                "N:{};{};;;",
                escape_text_value(self.last_name),
                escape_text_value(self.first_name)
            ),
            format!("FN:{}", escape_text_value(&self.full_name())),
        ];
        let optional = [
            ("ORG", self.org),
            ("TITLE", self.title),
            ("TEL;TYPE=CELL", self.phone),
            ("EMAIL;TYPE=INTERNET", self.email),
            ("URL", self.url),
            ("NOTE", self.note),
        ];
        for (property, value) in optional {
            if !value.is_empty() {
                lines.push(format!("{property}:{}", escape_text_value(value)));
            }
        }
        lines.push("END:VCARD".to_string());
        lines.join("\r\n")
    }
}

pub(super) fn build_vcard(values: &FieldValues) -> String {
    Person::from_values(values).vcard()
}

pub(super) fn build_mecard(values: &FieldValues) -> String {
    let mut payload = format!("MECARD:N:{};", escape_structured(values.trimmed(NAME)));
    for (key, field) in [("TEL", PHONE), ("EMAIL", EMAIL), ("ADR", ADDRESS), ("NOTE", NOTE)] {
        let value = values.trimmed(field);
        if !value.is_empty() {
            payload.push_str(&format!("{key}:{};", escape_structured(value)));
        }
    }
    payload.push(';');
    payload
}
