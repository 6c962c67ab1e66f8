//! Domain models for the m2m conversion pipeline.
//!
//! - [`Element`] - The closed set of UNTL top-level elements
//! - [`ElementKind`] - Whether an element holds text (`basic`) or agent sub-fields (`agent`)
//! - [`AgentChild`] - Sub-elements of an agent element
//! - [`Row`] - One CSV row keyed by column name

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Element Kind
// =============================================================================

/// Declared kind of a top-level element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Text content with an optional qualifier.
    Basic,
    /// Structured name/info/type/location children.
    Agent,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    /// Exact match only; `"Basic"` is not a kind.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "agent" => Ok(Self::Agent),
            other => Err(other.to_string()),
        }
    }
}

// =============================================================================
// Schema Table
// =============================================================================

/// Top-level UNTL elements accepted under `<metadata>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Title,
    Creator,
    Contributor,
    Publisher,
    Date,
    Language,
    Description,
    Subject,
    Coverage,
    Source,
    Relation,
    Collection,
    Institution,
    Rights,
    ResourceType,
    Format,
    Identifier,
    Note,
    Degree,
    Meta,
    PrimarySource,
    Citation,
}

impl Element {
    /// Every element, in schema order.
    pub const ALL: [Element; 22] = [
        Self::Title,
        Self::Creator,
        Self::Contributor,
        Self::Publisher,
        Self::Date,
        Self::Language,
        Self::Description,
        Self::Subject,
        Self::Coverage,
        Self::Source,
        Self::Relation,
        Self::Collection,
        Self::Institution,
        Self::Rights,
        Self::ResourceType,
        Self::Format,
        Self::Identifier,
        Self::Note,
        Self::Degree,
        Self::Meta,
        Self::PrimarySource,
        Self::Citation,
    ];

    /// Look up an element by its XML tag name (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.name() == name)
    }

    /// XML tag name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Creator => "creator",
            Self::Contributor => "contributor",
            Self::Publisher => "publisher",
            Self::Date => "date",
            Self::Language => "language",
            Self::Description => "description",
            Self::Subject => "subject",
            Self::Coverage => "coverage",
            Self::Source => "source",
            Self::Relation => "relation",
            Self::Collection => "collection",
            Self::Institution => "institution",
            Self::Rights => "rights",
            Self::ResourceType => "resourceType",
            Self::Format => "format",
            Self::Identifier => "identifier",
            Self::Note => "note",
            Self::Degree => "degree",
            Self::Meta => "meta",
            Self::PrimarySource => "primarySource",
            Self::Citation => "citation",
        }
    }

    /// Declared kind of this element.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Creator | Self::Contributor | Self::Publisher => ElementKind::Agent,
            _ => ElementKind::Basic,
        }
    }

    /// Only `publisher` agents may carry a `location` child.
    pub fn allows_location(&self) -> bool {
        matches!(self, Self::Publisher)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Agent Children
// =============================================================================

/// Child elements of an agent, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentChild {
    Info,
    Type,
    Name,
    Location,
}

impl AgentChild {
    /// Fixed order in which children appear under an agent element.
    pub const ORDER: [AgentChild; 4] = [Self::Info, Self::Type, Self::Name, Self::Location];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Type => "type",
            Self::Name => "name",
            Self::Location => "location",
        }
    }
}

// =============================================================================
// CSV Row
// =============================================================================

/// One CSV row: column name to cell value.
///
/// A column declared in the header but missing from a short row is kept
/// with no value, which serializes as JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Option<String>>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), Some(value.into()));
    }

    /// Record a column that has no value in this row.
    pub fn insert_absent(&mut self, column: impl Into<String>) {
        self.0.insert(column.into(), None);
    }

    /// Value of a column, `None` if the column is unknown or has no value.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(|v| v.as_deref())
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}
