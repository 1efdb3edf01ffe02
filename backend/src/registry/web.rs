//! `url` and `text` payloads.

use super::fields::{FieldSchema, FieldValues, InputKind};

const URL: &str = "url";
const TEXT: &str = "text";

pub(super) const URL_FIELDS: &[FieldSchema] =
    &[FieldSchema::required(URL, "URL", InputKind::SingleLine).with_validator(validate_url)];

pub(super) const TEXT_FIELDS: &[FieldSchema] =
    &[FieldSchema::required(TEXT, "Text", InputKind::MultiLine)];

struct Link<'a> {
    url: &'a str,
}

impl<'a> Link<'a> {
    fn from_values(values: &'a FieldValues) -> Self {
        Link {
            url: values.trimmed(URL),
        }
    }

    /// Adds `https://` unless the value already names a scheme.
    fn normalized(&self) -> String {
        if self.url.is_empty() || has_scheme(self.url) {
            self.url.to_string()
        } else {
            format!("https://{}", self.url)
        }
    }
}

fn has_scheme(value: &str) -> bool {
    let Some(pos) = value.find("://") else {
        return false;
    };
    let mut chars = value[..pos].chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

fn validate_url(value: &str, _: &FieldValues) -> Option<String> {
    let link = Link { url: value.trim() };
    if link.url.is_empty() {
        return None;
    }
    match url::Url::parse(&link.normalized()) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if host.contains('.') => None,
            _ => Some("URL must include a domain such as example.com".to_string()),
        },
        Err(_) => Some("URL is not valid".to_string()),
    }
}

pub(super) fn build_url(values: &FieldValues) -> String {
    Link::from_values(values).normalized()
}

pub(super) fn build_text(values: &FieldValues) -> String {
    values.get(TEXT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(value: &str) -> FieldValues {
        FieldValues::from_pairs([(URL, value)])
    }

    #[test]
    fn bare_host_gets_https_prefix() {
        assert_eq!(build_url(&url("example.com")), "https://example.com");
        assert_eq!(build_url(&url("  example.com/path?q=1 ")), "https://example.com/path?q=1");
    }

    #[test]
    fn existing_scheme_is_kept() {
        assert_eq!(build_url(&url("http://already.com")), "http://already.com");
        assert_eq!(build_url(&url("ftp://files.example.org")), "ftp://files.example.org");
    }

    #[test]
    fn host_without_dot_is_rejected() {
        assert!(validate_url("localhost:8080", &url("")).is_some());
        assert!(validate_url("https://intranet/home", &url("")).is_some());
        assert_eq!(validate_url("example.com", &url("")), None);
    }

    #[test]
    fn text_is_verbatim() {
        let values = FieldValues::from_pairs([(TEXT, "  spaced\nout  ")]);
        assert_eq!(build_text(&values), "  spaced\nout  ");
    }
}
