//! Value operations applied to a mapped value before it becomes node content.
//!
//! A chain of operations plays the role of the `transform` function of
//! [`crate::record::Record::map`]: it runs once per split part.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{ScriptError, ScriptResult};

/// All available value operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Remove leading and trailing whitespace
    Trim,

    /// Convert to uppercase
    Uppercase,

    /// Convert to lowercase
    Lowercase,

    /// Replace using regex pattern
    Replace {
        pattern: Pattern,
        #[serde(default)]
        value: String,
    },

    /// Pad string at start to reach target length
    PadStart {
        length: usize,
        #[serde(default = "default_pad_char")]
        char: String,
    },

    /// Pad string at end to reach target length
    PadEnd {
        length: usize,
        #[serde(default = "default_pad_char")]
        char: String,
    },

    /// Extract year (4 digits) from a date string
    ExtractYear,

    /// Ensure string starts with given prefix
    EnsurePrefix { value: String },

    /// Ensure string ends with given suffix
    EnsureSuffix { value: String },

    /// Map values using a lookup table
    Map {
        mapping: HashMap<String, String>,
        #[serde(default)]
        case_insensitive: bool,
        /// Value to use when nothing matches; the input is kept when unset
        #[serde(default)]
        default_unmapped: Option<String>,
    },

    /// Take a character range
    Substring {
        start: usize,
        #[serde(default)]
        length: Option<usize>,
    },

    /// Remove all non-alphanumeric characters
    Alphanumeric,

    /// Remove all non-digit characters
    DigitsOnly,
}

fn default_pad_char() -> String {
    "0".to_string()
}

static YEAR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\d{4}").ok());

/// Regex compiled when the script is loaded; serialized as its source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> ScriptResult<Self> {
        let regex = Regex::new(source).map_err(|e| {
            ScriptError::InvalidScript(format!("invalid replace pattern '{}': {}", source, e))
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for Pattern {
    type Error = ScriptError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Pattern::new(&source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

impl Operation {

    /// Apply this operation to a value
    pub fn apply(&self, value: &str) -> String {
        match self {
            Operation::Trim => value.trim().to_string(),
            Operation::Uppercase => value.to_uppercase(),
            Operation::Lowercase => value.to_lowercase(),
            Operation::Replace { pattern, value: replacement } => pattern
                .regex
                .replace_all(value, replacement.as_str())
                .into_owned(),
            Operation::PadStart { length, char } => {
                let padding = padding(value, *length, char);
                format!("{}{}", padding, value)
            }
            Operation::PadEnd { length, char } => {
                let padding = padding(value, *length, char);
                format!("{}{}", value, padding)
            }
            Operation::ExtractYear => apply_extract_year(value),
            Operation::EnsurePrefix { value: prefix } => {
                if value.starts_with(prefix.as_str()) {
                    value.to_string()
                } else {
                    format!("{}{}", prefix, value)
                }
            }
            Operation::EnsureSuffix { value: suffix } => {
                if value.ends_with(suffix.as_str()) {
                    value.to_string()
                } else {
                    format!("{}{}", value, suffix)
                }
            }
            Operation::Map { mapping, case_insensitive, default_unmapped } => {
                apply_map(value, mapping, *case_insensitive, default_unmapped.as_deref())
            }
            Operation::Substring { start, length } => {
                let chars = value.chars().skip(*start);
                match length {
                    Some(len) => chars.take(*len).collect(),
                    None => chars.collect(),
                }
            }
            Operation::Alphanumeric => value.chars().filter(|c| c.is_alphanumeric()).collect(),
            Operation::DigitsOnly => value.chars().filter(|c| c.is_ascii_digit()).collect(),
        }
    }
}

/// Apply a chain of operations in order.
pub fn apply_all(operations: &[Operation], value: &str) -> String {
    operations
        .iter()
        .fold(value.to_string(), |acc, op| op.apply(&acc))
}

fn padding(value: &str, length: usize, pad_char: &str) -> String {
    let current = value.chars().count();
    if current >= length {
        return String::new();
    }
    let pad = pad_char.chars().next().unwrap_or('0');
    std::iter::repeat(pad).take(length - current).collect()
}

fn apply_extract_year(value: &str) -> String {
    YEAR.as_ref()
        .and_then(|re| re.find(value).map(|m| m.as_str().to_string()))
        .unwrap_or_default()
}

fn apply_map(
    value: &str,
    mapping: &HashMap<String, String>,
    case_insensitive: bool,
    default_unmapped: Option<&str>,
) -> String {
    let found = if case_insensitive {
        let key = value.to_lowercase();
        mapping
            .iter()
            .find(|(k, _)| k.to_lowercase() == key)
            .map(|(_, v)| v)
    } else {
        mapping.get(value)
    };

    match (found, default_unmapped) {
        (Some(v), _) => v.clone(),
        (None, Some(d)) => d.to_string(),
        (None, None) => value.to_string(),
    }
}

/// Get a description of all available operations
pub fn operations_description() -> String {
    r#"Available value operations:

| Operation | Description | Parameters |
|-----------|-------------|------------|
| trim | Remove leading/trailing whitespace | - |
| uppercase | Convert to uppercase | - |
| lowercase | Convert to lowercase | - |
| replace | Regex pattern replacement | pattern: regex, value: replacement |
| pad_start | Pad string at start | length: target length, char: pad character (default "0") |
| pad_end | Pad string at end | length: target length, char: pad character (default "0") |
| extract_year | Extract 4-digit year from date | - |
| ensure_prefix | Add prefix if not present | value: prefix string |
| ensure_suffix | Add suffix if not present | value: suffix string |
| map | Map values using lookup table | mapping: {source: target}, case_insensitive: bool, default_unmapped: string |
| substring | Extract substring | start: start index, length: optional length |
| alphanumeric | Keep only alphanumeric chars | - |
| digits_only | Keep only digits | - |

Operations run after splitting, once per part, in the order listed.

Example operations in JSON:
[
  {"type": "trim"},
  {"type": "replace", "pattern": "\\s+", "value": " "},
  {"type": "map", "mapping": {"eng": "English"}, "case_insensitive": true},
  {"type": "extract_year"}
]"#
    .to_string()
}
