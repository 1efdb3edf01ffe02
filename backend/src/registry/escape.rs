//! Text escaping shared by the payload builders.

/// Backslash-escapes the characters that are structural in `WIFI:` and
/// `MECARD:` payloads.
pub(crate) fn escape_structured(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ';' | '"' | ',' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes a vCard / iCalendar text value (RFC 6350 / RFC 5545).
pub(crate) fn escape_text_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub(crate) fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Keeps only the digits of a phone number, plus a leading `+` if present.
pub(crate) fn dial_string(value: &str) -> String {
    let trimmed = value.trim();
    let mut out = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        out.push('+');
    }
    out.extend(trimmed.chars().filter(char::is_ascii_digit));
    out
}

pub(crate) fn digit_count(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}
