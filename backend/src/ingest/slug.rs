use common::model::row::RawRow;

pub const MAX_SLUG_LEN: usize = 40;

/// Columns checked, in order, for an explicit filename.
const SLUG_COLUMNS: [&str; 4] = ["slug", "SLUG", "filename", "name"];

/// Lowercase ASCII, runs of anything else collapsed to `-`, at most
/// [`MAX_SLUG_LEN`] characters. Returns an empty string when nothing survives.
pub fn sanitize(value: &str) -> String {
    let mut hyphenated = String::with_capacity(value.len());
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            hyphenated.push(c);
        } else if !hyphenated.ends_with('-') {
            hyphenated.push('-');
        }
    }
    let trimmed = hyphenated.trim_matches('-');
    let mut slug: String = trimmed.chars().take(MAX_SLUG_LEN).collect();
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Slug for a row: an explicit slug column, else the second column, else
/// `row-{index}`.
pub fn derive(index: usize, raw: &RawRow) -> String {
    let source = SLUG_COLUMNS
        .iter()
        .filter_map(|column| raw.get(column))
        .find(|value| !value.trim().is_empty())
        .or_else(|| raw.value_at(1))
        .unwrap_or("");
    let slug = sanitize(source);
    if slug.is_empty() {
        format!("row-{index}")
    } else {
        slug
    }
}
