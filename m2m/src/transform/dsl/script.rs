//! Mapping scripts: how one CSV row becomes one [`Record`].
//!
//! A script is anything implementing [`MappingScript`]. Rust callers can
//! pass a closure; the command line loads a declarative [`MappingFile`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::operations::Operation;
use crate::error::{ConvertResult, ScriptError, ScriptResult};
use crate::models::Row;
use crate::record::Record;

/// Converts one row into a populated record.
///
/// Implementations build the record with [`Record::new`], call
/// [`Record::map`] for each field, and set the base directory and folder
/// name before returning.
pub trait MappingScript {
    fn process_record(&self, row: &Row) -> ConvertResult<Record>;
}

impl<F> MappingScript for F
where
    F: Fn(&Row) -> ConvertResult<Record>,
{
    fn process_record(&self, row: &Row) -> ConvertResult<Record> {
        self(row)
    }
}

/// Declarative mapping script loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingFile {
    /// Identifier credited in the `meta[metadataCreator]` node
    pub metadata_creator: String,

    /// Add a `meta[metadataCreationDate]` node
    #[serde(default)]
    pub add_date: bool,

    /// Directory records are written under
    #[serde(default)]
    pub base_directory: Option<PathBuf>,

    /// Per-record folder name, usually an identifier column
    #[serde(default)]
    pub folder_name: Option<FieldSource>,

    /// Field mappings, applied in order
    #[serde(default)]
    pub mappings: Vec<FieldMapping>,
}

/// Where a value comes from, plus the operations applied to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSource {
    /// Source column name (mutually exclusive with sources and constant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Columns to concatenate (mutually exclusive with source and constant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,

    /// Separator for concatenated sources (default: " ")
    #[serde(default = "default_concat_separator")]
    pub concat_separator: String,

    /// Constant value (mutually exclusive with source/sources)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<String>,

    /// Ordered list of operations to apply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<Operation>,
}

fn default_concat_separator() -> String {
    " ".to_string()
}

/// One call to [`Record::map`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    /// `basic` or `agent`; checked when the mapping runs
    #[serde(rename = "type")]
    pub element_type: String,

    /// Target element name; checked when the mapping runs
    pub element: String,

    /// Value source. Its operations run once per split part.
    #[serde(flatten)]
    pub value: FieldSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,

    #[serde(default = "default_required")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub split: String,
}

fn default_required() -> bool {
    true
}

impl FieldSource {
    /// Read from a single column
    pub fn from_source(source: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            concat_separator: default_concat_separator(),
            ..Self::default()
        }
    }

    /// Concatenate several columns
    pub fn from_sources(sources: Vec<String>, separator: &str) -> Self {
        Self {
            sources: Some(sources),
            concat_separator: separator.to_string(),
            ..Self::default()
        }
    }

    /// Use a fixed value
    pub fn from_constant(value: &str) -> Self {
        Self {
            constant: Some(value.to_string()),
            concat_separator: default_concat_separator(),
            ..Self::default()
        }
    }

    /// Add an operation to the chain
    pub fn with_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Raw value for `row`, before operations.
    ///
    /// `None` when the column is missing or has no value. Concatenation
    /// skips blank parts and yields `None` only when every column is absent.
    pub fn resolve(&self, row: &Row) -> Option<String> {
        if let Some(ref source) = self.source {
            return row.get(source).map(String::from);
        }

        if let Some(ref sources) = self.sources {
            let values: Vec<&str> = sources.iter().filter_map(|s| row.get(s)).collect();
            if values.is_empty() {
                return None;
            }
            let parts: Vec<&str> = values
                .into_iter()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            return Some(parts.join(&self.concat_separator));
        }

        self.constant.clone()
    }

    /// Columns this source reads
    pub fn get_sources(&self) -> Vec<String> {
        let mut result = Vec::new();
        if let Some(ref s) = self.source {
            result.push(s.clone());
        }
        if let Some(ref ss) = self.sources {
            result.extend(ss.iter().cloned());
        }
        result
    }

    fn validate(&self, context: &str) -> ScriptResult<()> {
        let count = [
            self.source.is_some(),
            self.sources.is_some(),
            self.constant.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();

        if count != 1 {
            return Err(ScriptError::InvalidScript(format!(
                "{}: exactly one of source, sources or constant is required",
                context
            )));
        }
        if matches!(self.sources, Some(ref s) if s.is_empty()) {
            return Err(ScriptError::InvalidScript(format!("{}: sources is empty", context)));
        }
        Ok(())
    }
}

impl FieldMapping {
    /// Map a column into a basic element
    pub fn basic(element: &str, source: &str) -> Self {
        Self::new("basic", element, FieldSource::from_source(source))
    }

    /// Map a column into an agent element
    pub fn agent(element: &str, source: &str) -> Self {
        Self::new("agent", element, FieldSource::from_source(source))
    }

    pub fn new(element_type: &str, element: &str, value: FieldSource) -> Self {
        Self {
            element_type: element_type.to_string(),
            element: element.to_string(),
            value,
            qualifier: None,
            required: true,
            info: String::new(),
            location: String::new(),
            agent_type: String::new(),
            split: String::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = Some(qualifier.to_string());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_info(mut self, info: &str) -> Self {
        self.info = info.to_string();
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    pub fn with_agent_type(mut self, agent_type: &str) -> Self {
        self.agent_type = agent_type.to_string();
        self
    }

    pub fn with_split(mut self, separator: &str) -> Self {
        self.split = separator.to_string();
        self
    }

    pub fn with_operation(mut self, op: Operation) -> Self {
        self.value.operations.push(op);
        self
    }
}

impl MappingFile {
    /// Empty script crediting `metadata_creator`
    pub fn new(metadata_creator: &str) -> Self {
        Self {
            metadata_creator: metadata_creator.to_string(),
            add_date: false,
            base_directory: None,
            folder_name: None,
            mappings: Vec::new(),
        }
    }

    /// Parse and validate a script from JSON
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    /// Load and validate a script file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScriptResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> ScriptResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the script is runnable.
    ///
    /// Element names and types are left to [`Record::map`] so that
    /// problems surface with the same messages as in code-based scripts.
    pub fn validate(&self) -> ScriptResult<()> {
        if self.metadata_creator.trim().is_empty() {
            return Err(ScriptError::InvalidScript(
                "metadata_creator must not be empty".to_string(),
            ));
        }
        if let Some(ref folder) = self.folder_name {
            folder.validate("folder_name")?;
        }
        for (i, mapping) in self.mappings.iter().enumerate() {
            let context = format!("mapping {} ({})", i + 1, mapping.element);
            mapping.value.validate(&context)?;
        }
        Ok(())
    }

    /// All columns referenced by the script, sorted and deduplicated
    pub fn source_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .mappings
            .iter()
            .flat_map(|m| m.value.get_sources())
            .collect();

        if let Some(ref folder) = self.folder_name {
            columns.extend(folder.get_sources());
        }

        columns.sort();
        columns.dedup();
        columns
    }

    /// Referenced columns missing from `headers`
    pub fn missing_columns(&self, headers: &[String]) -> Vec<String> {
        self.source_columns()
            .into_iter()
            .filter(|col| !headers.iter().any(|h| h == col))
            .collect()
    }
}

/// Example script for documentation and `--example-mapping`
pub fn example_mapping() -> MappingFile {
    let mut script = MappingFile::new("mphillips");
    script.base_directory = Some(PathBuf::from("records"));
    script.folder_name = Some(FieldSource::from_source("isbn").with_operation(Operation::Trim));

    script.mappings = vec![
        FieldMapping::basic("title", "title").with_qualifier("officialtitle"),
        FieldMapping::agent("creator", "author")
            .with_qualifier("aut")
            .with_agent_type("per"),
        FieldMapping::basic("date", "date")
            .with_qualifier("creation")
            .optional(),
        FieldMapping::basic("subject", "keywords")
            .with_qualifier("KWD")
            .with_split(";")
            .optional(),
        FieldMapping::agent("publisher", "publisher")
            .with_location("Denton, Texas")
            .optional(),
        FieldMapping::new("basic", "resourceType", FieldSource::from_constant("text_book")),
    ];
    script
}
