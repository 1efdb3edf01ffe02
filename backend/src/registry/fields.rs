use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// How a field is edited, and how the preview table hints at its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    SingleLine,
    MultiLine,
    Numeric,
    Email,
}

/// Cross-field validator: receives the field's own value and every value of
/// the row, returns an error message when the value is not acceptable.
pub type Validator = fn(&str, &FieldValues) -> Option<String>;

/// Declarative description of one input field of a content type.
#[derive(Clone, Copy)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
    pub required: bool,
    /// Regular expression a non-empty (trimmed) value must match.
    pub pattern: Option<&'static str>,
    pub validate: Option<Validator>,
}

impl FieldSchema {
    pub const fn optional(name: &'static str, label: &'static str, kind: InputKind) -> Self {
        FieldSchema {
            name,
            label,
            kind,
            required: false,
            pattern: None,
            validate: None,
        }
    }

    pub const fn required(name: &'static str, label: &'static str, kind: InputKind) -> Self {
        FieldSchema {
            required: true,
            ..FieldSchema::optional(name, label, kind)
        }
    }

    pub const fn with_pattern(self, pattern: &'static str) -> Self {
        FieldSchema {
            pattern: Some(pattern),
            ..self
        }
    }

    pub const fn with_validator(self, validate: Validator) -> Self {
        FieldSchema {
            validate: Some(validate),
            ..self
        }
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("pattern", &self.pattern)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Field values of one row, keyed by schema field name.
///
/// Missing fields read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: HashMap<&'static str, String>,
}

impl FieldValues {
    pub fn new() -> Self {
        FieldValues::default()
    }

    pub fn from_pairs<V: Into<String>>(pairs: impl IntoIterator<Item = (&'static str, V)>) -> Self {
        FieldValues {
            values: pairs.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }

    pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        self.values.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// The value with surrounding whitespace removed.
    pub fn trimmed(&self, name: &str) -> &str {
        self.get(name).trim()
    }
}

pub(crate) const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Compiled field patterns, built once from every schema in the registry.
fn compiled_patterns() -> &'static HashMap<&'static str, Regex> {
    static PATTERNS: OnceLock<HashMap<&'static str, Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        super::REGISTRY
            .iter()
            .flat_map(|def| def.fields.iter())
            .filter_map(|field| field.pattern)
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some((pattern, re)),
                Err(e) => {
                    log::error!("Ignoring invalid field pattern {pattern:?}: {e}");
                    None
                }
            })
            .collect()
    })
}

pub(crate) fn pattern_matches(pattern: &'static str, value: &str) -> bool {
    compiled_patterns()
        .get(pattern)
        .map(|re| re.is_match(value))
        .unwrap_or(true)
}
