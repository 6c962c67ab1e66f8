//! Metadata record construction.
//!
//! A [`Record`] owns one [`MetadataTree`] plus the location its files are
//! written to. Values enter the tree only through [`Record::map`], which
//! validates them against the UNTL element table before appending nodes.
//!
//! # Example
//!
//! ```rust
//! use m2m::record::{MapOptions, Record};
//!
//! let mut record = Record::new("mphillips", false).unwrap();
//! record
//!     .map("basic", "title", Some("A Title"), MapOptions::new().qualifier("officialtitle"))
//!     .unwrap();
//! record
//!     .map("agent", "creator", Some("Smith, J."), MapOptions::new().qualifier("aut").agent_type("per"))
//!     .unwrap();
//! assert!(record.to_string().contains("<name>Smith, J.</name>"));
//! ```

pub mod output;
pub mod tree;
pub mod xml;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConvertError, ConvertResult};
use crate::models::{Element, ElementKind};

pub use output::{JSON_FILE_NAME, XML_FILE_NAME};
pub use tree::{AgentElement, BasicElement, MetadataTree, Node};

/// Qualifier of the bootstrap `meta` node naming the record creator.
pub const METADATA_CREATOR: &str = "metadataCreator";

/// Qualifier of the optional bootstrap `meta` node holding the creation time.
pub const METADATA_CREATION_DATE: &str = "metadataCreationDate";

/// `strftime` layout of the creation timestamp, e.g. `2020-01-31, 14:05:09`.
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%d, %H:%M:%S";

// =============================================================================
// Mapping Options
// =============================================================================

/// Optional arguments to [`Record::map`].
///
/// Defaults: no qualifier, value required, no agent sub-fields, no split,
/// no transform.
#[derive(Clone, Copy)]
pub struct MapOptions<'a> {
    qualifier: Option<&'a str>,
    required: bool,
    info: &'a str,
    location: &'a str,
    agent_type: &'a str,
    split: &'a str,
    transform: Option<&'a dyn Fn(&str) -> String>,
}

impl<'a> MapOptions<'a> {
    pub fn new() -> Self {
        Self {
            qualifier: None,
            required: true,
            info: "",
            location: "",
            agent_type: "",
            split: "",
            transform: None,
        }
    }

    /// Qualifier attribute; blank is the same as none.
    pub fn qualifier(mut self, qualifier: &'a str) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Shorthand for `required(false)`.
    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Agent `info` child.
    pub fn info(mut self, info: &'a str) -> Self {
        self.info = info;
        self
    }

    /// Agent `location` child, legal only on `publisher`.
    pub fn location(mut self, location: &'a str) -> Self {
        self.location = location;
        self
    }

    /// Agent `type` child.
    pub fn agent_type(mut self, agent_type: &'a str) -> Self {
        self.agent_type = agent_type;
        self
    }

    /// Separator producing one node per part; blank means no split.
    pub fn split(mut self, separator: &'a str) -> Self {
        self.split = separator;
        self
    }

    /// Applied to each (split) value before it becomes node content.
    pub fn transform(mut self, transform: &'a dyn Fn(&str) -> String) -> Self {
        self.transform = Some(transform);
        self
    }
}

impl Default for MapOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapOptions")
            .field("qualifier", &self.qualifier)
            .field("required", &self.required)
            .field("info", &self.info)
            .field("location", &self.location)
            .field("agent_type", &self.agent_type)
            .field("split", &self.split)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Result of a successful [`Record::map`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOutcome {
    /// No value to map; the tree is unchanged.
    NoValue,
    /// Number of nodes appended.
    Added(usize),
}

impl MapOutcome {
    pub fn is_no_value(&self) -> bool {
        matches!(self, MapOutcome::NoValue)
    }
}

// =============================================================================
// Record
// =============================================================================

/// One metadata record and its output location.
#[derive(Debug, Clone)]
pub struct Record {
    tree: MetadataTree,
    base_directory: Option<PathBuf>,
    folder_name: Option<String>,
}

impl Record {
    /// Start a record whose first node credits `metadata_creator`.
    ///
    /// With `add_date`, a second `meta` node records the local creation time.
    pub fn new(metadata_creator: &str, add_date: bool) -> ConvertResult<Self> {
        let created = add_date.then(|| Local::now().naive_local());
        Self::bootstrap(metadata_creator, created)
    }

    /// Like [`Record::new`] with a fixed creation timestamp.
    pub fn with_creation_date(metadata_creator: &str, created: NaiveDateTime) -> ConvertResult<Self> {
        Self::bootstrap(metadata_creator, Some(created))
    }

    fn bootstrap(metadata_creator: &str, created: Option<NaiveDateTime>) -> ConvertResult<Self> {
        let mut record = Self {
            tree: MetadataTree::new(),
            base_directory: None,
            folder_name: None,
        };

        record.map(
            "basic",
            Element::Meta.name(),
            Some(metadata_creator),
            MapOptions::new().qualifier(METADATA_CREATOR),
        )?;

        if let Some(created) = created {
            let stamp = created.format(CREATION_DATE_FORMAT).to_string();
            record.map(
                "basic",
                Element::Meta.name(),
                Some(stamp.as_str()),
                MapOptions::new().qualifier(METADATA_CREATION_DATE),
            )?;
        }

        Ok(record)
    }

    /// Validate a value and append it to the tree.
    ///
    /// Checks run in a fixed order so the reported error is deterministic:
    /// element type, absent value, required value, empty value, element
    /// name, element kind, location, XML-compatible text.
    pub fn map(
        &mut self,
        element_type: &str,
        element_name: &str,
        element_value: Option<&str>,
        options: MapOptions<'_>,
    ) -> ConvertResult<MapOutcome> {
        let kind: ElementKind = element_type
            .parse()
            .map_err(ConvertError::UnsupportedMappingType)?;

        let Some(raw) = element_value else {
            return Ok(MapOutcome::NoValue);
        };

        let value = raw.trim();
        if options.required && value.is_empty() {
            return Err(ConvertError::RequiredValueMissing(element_name.to_string()));
        }
        if value.is_empty() {
            return Ok(MapOutcome::NoValue);
        }

        let element = Element::from_name(element_name)
            .ok_or_else(|| ConvertError::UnknownElement(element_name.to_string()))?;

        if element.kind() != kind {
            return Err(ConvertError::ElementKindMismatch {
                element: element_name.to_string(),
                declared: element.kind(),
                attempted: kind,
            });
        }

        let location = non_blank(options.location);
        if location.is_some() && !element.allows_location() {
            return Err(ConvertError::LocationNotAllowed);
        }

        let qualifier = options
            .qualifier
            .filter(|q| !q.trim().is_empty())
            .map(String::from);

        let info = non_blank(options.info);
        let agent_type = non_blank(options.agent_type);
        let attributes = [qualifier.as_deref(), info, agent_type, location];
        if attributes.into_iter().flatten().any(|text| !is_xml_text(text)) {
            return Err(ConvertError::InvalidXmlCharacter(element_name.to_string()));
        }

        let contents: Vec<String> = split_value(value, options.split)
            .into_iter()
            .map(|part| match options.transform {
                Some(transform) => transform(part),
                None => part.to_string(),
            })
            .collect();
        if contents.iter().any(|content| !is_xml_text(content)) {
            return Err(ConvertError::InvalidXmlCharacter(element_name.to_string()));
        }
        let added = contents.len();

        for content in contents {
            let node = match kind {
                ElementKind::Basic => Node::Basic(BasicElement {
                    element,
                    qualifier: qualifier.clone(),
                    content,
                }),
                ElementKind::Agent => Node::Agent(AgentElement {
                    element,
                    qualifier: qualifier.clone(),
                    name: content,
                    info: info.map(String::from),
                    agent_type: agent_type.map(String::from),
                    location: location.map(String::from),
                }),
            };
            self.tree.push(node);
        }

        Ok(MapOutcome::Added(added))
    }

    pub fn tree(&self) -> &MetadataTree {
        &self.tree
    }

    pub fn set_base_directory(&mut self, base_directory: impl Into<PathBuf>) {
        self.base_directory = Some(base_directory.into());
    }

    pub fn set_folder_name(&mut self, folder_name: impl Into<String>) {
        self.folder_name = Some(folder_name.into());
    }

    pub fn base_directory(&self) -> Option<&Path> {
        self.base_directory.as_deref()
    }

    pub fn folder_name(&self) -> Option<&str> {
        self.folder_name.as_deref()
    }

    /// Pretty-printed XML document.
    pub fn to_xml_string(&self) -> ConvertResult<String> {
        xml::to_xml_string(&self.tree)
    }

    /// XML document as UTF-8 bytes.
    pub fn to_bytes(&self) -> ConvertResult<Vec<u8>> {
        self.to_xml_string().map(String::into_bytes)
    }

    /// Key/value projection of the tree.
    pub fn to_value(&self) -> Value {
        self.tree.to_value()
    }

    /// Write `metadata.xml` to `<base_directory>/<folder_name>/`.
    pub fn write_template_files(
        &self,
        base_directory: impl AsRef<Path>,
        folder_name: &str,
    ) -> ConvertResult<String> {
        let dir = output::ensure_directory(base_directory.as_ref(), folder_name)?;
        output::write_file(&dir, XML_FILE_NAME, &self.to_bytes()?)?;
        Ok(format!("{} finished", folder_name))
    }

    /// Write `data` as sorted, indented JSON to `<base_directory>/<folder_name>/metadata.json`.
    pub fn write_json_file<T: Serialize + ?Sized>(
        &self,
        base_directory: impl AsRef<Path>,
        folder_name: &str,
        data: &T,
    ) -> ConvertResult<String> {
        let dir = output::ensure_directory(base_directory.as_ref(), folder_name)?;
        let json = output::to_sorted_json(data)?;
        output::write_file(&dir, JSON_FILE_NAME, json.as_bytes())?;
        Ok(format!("{} finished JSON", folder_name))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = self.to_xml_string().map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}

/// Trimmed value, or `None` when blank.
fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// True when every character is allowed in XML 1.0 text.
fn is_xml_text(text: &str) -> bool {
    text.chars().all(|c| {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
    })
}

/// Split on `separator` (trimming each part) unless the separator is blank.
fn split_value<'v>(value: &'v str, separator: &str) -> Vec<&'v str> {
    if separator.trim().is_empty() {
        vec![value]
    } else {
        value.split(separator).map(str::trim).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentChild;
    use regex::Regex;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

    fn record() -> Record {
        Record::new("mphillips", false).unwrap()
    }

    /// Expected document: bootstrap creator node followed by `body` lines.
    fn expected(body: &[&str]) -> String {
        let mut xml = format!(
            "{}<metadata>\n  <meta qualifier=\"metadataCreator\">mphillips</meta>\n",
            HEADER
        );
        for line in body {
            xml.push_str("  ");
            xml.push_str(line);
            xml.push('\n');
        }
        xml.push_str("</metadata>\n");
        xml
    }

    fn err_message(result: ConvertResult<MapOutcome>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_metadata_record_setup() {
        let r = record();
        let nodes = r.tree().nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].element(), Element::Meta);
        assert_eq!(nodes[0].qualifier(), Some(METADATA_CREATOR));
        match &nodes[0] {
            Node::Basic(b) => assert_eq!(b.content, "mphillips"),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_metadata_record_setup_with_date() {
        let r = Record::new("mphillips", true).unwrap();
        let dates: Vec<&Node> = r
            .tree()
            .iter()
            .filter(|n| n.qualifier() == Some(METADATA_CREATION_DATE))
            .collect();
        assert_eq!(dates.len(), 1);

        let pattern = Regex::new(r"^\d{4}-\d{2}-\d{2}, \d{2}:\d{2}:\d{2}$").unwrap();
        match dates[0] {
            Node::Basic(b) => assert!(pattern.is_match(&b.content), "bad date {}", b.content),
            other => panic!("unexpected node {:?}", other),
        }
        assert_eq!(r.tree().nodes()[1].qualifier(), Some(METADATA_CREATION_DATE));
    }

    #[test]
    fn test_fixed_creation_date() {
        let created = NaiveDateTime::parse_from_str("2020-01-31 14:05:09", "%Y-%m-%d %H:%M:%S").unwrap();
        let r = Record::with_creation_date("mphillips", created).unwrap();
        assert!(r
            .to_string()
            .contains("<meta qualifier=\"metadataCreationDate\">2020-01-31, 14:05:09</meta>"));
    }

    #[test]
    fn test_empty_creator_is_rejected() {
        let err = Record::new("  ", false).unwrap_err();
        assert_eq!(err.to_string(), "Value required for element named \"meta\"");
    }

    #[test]
    fn test_none_element_value_equals_no_value() {
        let mut r = record();
        for (kind, name) in [("basic", "title"), ("agent", "creator"), ("basic", "author")] {
            let outcome = r.map(kind, name, None, MapOptions::new()).unwrap();
            assert_eq!(outcome, MapOutcome::NoValue);
            let outcome = r.map(kind, name, None, MapOptions::new().optional()).unwrap();
            assert!(outcome.is_no_value());
        }
        assert_eq!(r.tree().len(), 1);
    }

    #[test]
    fn test_empty_element_value_equals_no_value() {
        let mut r = record();
        let outcome = r.map("basic", "title", Some(""), MapOptions::new().optional()).unwrap();
        assert_eq!(outcome, MapOutcome::NoValue);
        let outcome = r.map("basic", "title", Some("   "), MapOptions::new().optional()).unwrap();
        assert_eq!(outcome, MapOutcome::NoValue);
        assert_eq!(r.tree().len(), 1);
    }

    #[test]
    fn test_empty_optional_value_skips_later_checks() {
        let mut r = record();
        let outcome = r
            .map("agent", "nonsense", Some(""), MapOptions::new().optional().location("X"))
            .unwrap();
        assert_eq!(outcome, MapOutcome::NoValue);
    }

    #[test]
    fn test_set_base_directory_and_folder_name() {
        let mut r = record();
        assert_eq!(r.base_directory(), None);
        r.set_base_directory("out");
        r.set_folder_name("folder");
        assert_eq!(r.base_directory(), Some(Path::new("out")));
        assert_eq!(r.folder_name(), Some("folder"));
    }

    #[test]
    fn test_element_not_in_field_type() {
        let mut r = record();
        assert_eq!(
            err_message(r.map("basic", "author", Some("text"), MapOptions::new())),
            "Element named \"author\" not in fieldTypes"
        );
    }

    #[test]
    fn test_unsupported_mapping_function_type() {
        let mut r = record();
        assert_eq!(
            err_message(r.map("simple", "title", Some("text"), MapOptions::new())),
            "Unsupported mapping function type, simple"
        );
        // Type is checked before the value is even looked at.
        assert!(matches!(
            r.map("Basic", "title", None, MapOptions::new()),
            Err(ConvertError::UnsupportedMappingType(t)) if t == "Basic"
        ));
    }

    #[test]
    fn test_missing_required_metadata_value() {
        let mut r = record();
        assert_eq!(
            err_message(r.map("basic", "title", Some(""), MapOptions::new())),
            "Value required for element named \"title\""
        );
        // Required check precedes the element lookup.
        assert!(matches!(
            r.map("basic", "author", Some(" "), MapOptions::new()),
            Err(ConvertError::RequiredValueMissing(n)) if n == "author"
        ));
    }

    #[test]
    fn test_incorrect_element_type_for_valid_element() {
        let mut r = record();
        assert_eq!(
            err_message(r.map("agent", "title", Some("test"), MapOptions::new())),
            "Element \"title\" should be of basic type, but you are attempting to add it as \"agent\" type."
        );
        assert_eq!(
            err_message(r.map("basic", "publisher", Some("test"), MapOptions::new())),
            "Element \"publisher\" should be of agent type, but you are attempting to add it as \"basic\" type."
        );
    }

    #[test]
    fn test_every_kind_mismatch_is_rejected() {
        let mut r = record();
        for element in Element::ALL {
            let wrong = match element.kind() {
                ElementKind::Basic => "agent",
                ElementKind::Agent => "basic",
            };
            match r.map(wrong, element.name(), Some("x"), MapOptions::new()) {
                Err(ConvertError::ElementKindMismatch { element: name, declared, .. }) => {
                    assert_eq!(name, element.name());
                    assert_eq!(declared, element.kind());
                }
                other => panic!("{} accepted as {}: {:?}", element, wrong, other),
            }
        }
        assert_eq!(r.tree().len(), 1);
    }

    #[test]
    fn test_split_function_of_map() {
        let mut r = record();
        let outcome = r.map("basic", "title", Some("m|f"), MapOptions::new().split("|")).unwrap();
        assert_eq!(outcome, MapOutcome::Added(2));
        assert_eq!(r.to_string(), expected(&["<title>m</title>", "<title>f</title>"]));
    }

    #[test]
    fn test_split_parts_are_trimmed() {
        let mut r = record();
        r.map("basic", "subject", Some(" maps ;  texas;rivers "), MapOptions::new().split(";"))
            .unwrap();
        assert_eq!(
            r.to_string(),
            expected(&[
                "<subject>maps</subject>",
                "<subject>texas</subject>",
                "<subject>rivers</subject>"
            ])
        );
    }

    #[test]
    fn test_empty_split_function_of_map() {
        let mut r = record();
        r.map("basic", "title", Some("m|f"), MapOptions::new().split("")).unwrap();
        assert_eq!(r.to_string(), expected(&["<title>m|f</title>"]));

        let mut r = record();
        r.map("basic", "title", Some("m f"), MapOptions::new().split(" ")).unwrap();
        assert_eq!(r.to_string(), expected(&["<title>m f</title>"]));
    }

    #[test]
    fn test_basic_map_unqualified_no_options() {
        let mut r = record();
        r.map("basic", "title", Some("test_title"), MapOptions::new()).unwrap();
        assert_eq!(r.to_string(), expected(&["<title>test_title</title>"]));
    }

    #[test]
    fn test_basic_map_qualified_no_options() {
        let mut r = record();
        r.map("basic", "title", Some("test_title"), MapOptions::new().qualifier("officialtitle"))
            .unwrap();
        assert_eq!(
            r.to_string(),
            expected(&["<title qualifier=\"officialtitle\">test_title</title>"])
        );
    }

    #[test]
    fn test_basic_map_empty_qualified_no_options() {
        let mut r = record();
        r.map("basic", "title", Some("test_title"), MapOptions::new().qualifier("")).unwrap();
        r.map("basic", "title", Some("other"), MapOptions::new().qualifier("  ")).unwrap();
        assert_eq!(
            r.to_string(),
            expected(&["<title>test_title</title>", "<title>other</title>"])
        );
    }

    #[test]
    fn test_basic_value_is_trimmed() {
        let mut r = record();
        r.map("basic", "title", Some("  padded  "), MapOptions::new()).unwrap();
        assert_eq!(r.to_string(), expected(&["<title>padded</title>"]));
    }

    #[test]
    fn test_basic_map_qualified_basic_with_function() {
        let mut r = record();
        let upper = |s: &str| s.to_uppercase();
        r.map(
            "basic",
            "title",
            Some("test_title"),
            MapOptions::new().qualifier("officialtitle").transform(&upper),
        )
        .unwrap();
        assert_eq!(
            r.to_string(),
            expected(&["<title qualifier=\"officialtitle\">TEST_TITLE</title>"])
        );
    }

    #[test]
    fn test_transform_runs_per_split_part() {
        let mut r = record();
        let bracket = |s: &str| format!("[{}]", s);
        r.map("basic", "subject", Some("a|b"), MapOptions::new().split("|").transform(&bracket))
            .unwrap();
        assert_eq!(
            r.to_string(),
            expected(&["<subject>[a]</subject>", "<subject>[b]</subject>"])
        );
    }

    #[test]
    fn test_agent_map_unqualified_no_options() {
        let mut r = record();
        r.map("agent", "creator", Some("Phillips, Mark"), MapOptions::new()).unwrap();

        let agent = match &r.tree().nodes()[1] {
            Node::Agent(a) => a.clone(),
            other => panic!("unexpected node {:?}", other),
        };
        assert_eq!(agent.children(), vec![(AgentChild::Name, "Phillips, Mark")]);
        assert_eq!(
            r.to_string(),
            expected(&["<creator>", "  <name>Phillips, Mark</name>", "</creator>"])
        );
    }

    #[test]
    fn test_agent_map_qualified_with_function() {
        let mut r = record();
        let upper = |s: &str| s.to_uppercase();
        r.map(
            "agent",
            "creator",
            Some("Phillips, Mark"),
            MapOptions::new().qualifier("aut").transform(&upper),
        )
        .unwrap();
        assert_eq!(
            r.to_string(),
            expected(&[
                "<creator qualifier=\"aut\">",
                "  <name>PHILLIPS, MARK</name>",
                "</creator>"
            ])
        );
    }

    #[test]
    fn test_agent_map_qualified_info_only() {
        let mut r = record();
        r.map(
            "agent",
            "creator",
            Some("Phillips, Mark"),
            MapOptions::new().qualifier("aut").info("First Publication"),
        )
        .unwrap();
        assert_eq!(
            r.to_string(),
            expected(&[
                "<creator qualifier=\"aut\">",
                "  <info>First Publication</info>",
                "  <name>Phillips, Mark</name>",
                "</creator>"
            ])
        );
    }

    #[test]
    fn test_agent_map_qualified_info_and_agent_type() {
        let mut r = record();
        r.map(
            "agent",
            "creator",
            Some("Phillips, Mark"),
            MapOptions::new()
                .qualifier("aut")
                .info("First Publication")
                .agent_type("per"),
        )
        .unwrap();
        assert_eq!(
            r.to_string(),
            expected(&[
                "<creator qualifier=\"aut\">",
                "  <info>First Publication</info>",
                "  <type>per</type>",
                "  <name>Phillips, Mark</name>",
                "</creator>"
            ])
        );
    }

    #[test]
    fn test_agent_map_qualified_with_location() {
        let mut r = record();
        r.map(
            "agent",
            "publisher",
            Some("UNT Libraries"),
            MapOptions::new().location("Denton, Texas"),
        )
        .unwrap();
        assert_eq!(
            r.to_string(),
            expected(&[
                "<publisher>",
                "  <name>UNT Libraries</name>",
                "  <location>Denton, Texas</location>",
                "</publisher>"
            ])
        );
    }

    #[test]
    fn test_agent_split_repeats_sub_fields() {
        let mut r = record();
        r.map(
            "agent",
            "contributor",
            Some("Doe, Jane; Roe, Rick"),
            MapOptions::new().qualifier("edt").agent_type(" per ").split(";"),
        )
        .unwrap();
        let agents: Vec<&Node> = r.tree().find(Element::Contributor).collect();
        assert_eq!(agents.len(), 2);
        for (node, name) in agents.iter().zip(["Doe, Jane", "Roe, Rick"]) {
            match node {
                Node::Agent(a) => {
                    assert_eq!(a.name, name);
                    assert_eq!(a.agent_type.as_deref(), Some("per"));
                    assert_eq!(a.qualifier.as_deref(), Some("edt"));
                }
                other => panic!("unexpected node {:?}", other),
            }
        }
    }

    #[test]
    fn test_agent_incorrect_use_of_location_that_is_not_publisher() {
        let mut r = record();
        for name in ["creator", "contributor"] {
            assert_eq!(
                err_message(r.map("agent", name, Some("Phillips, Mark"), MapOptions::new().location("aut"))),
                "location can only be used on publisher element"
            );
        }
        assert!(matches!(
            r.map("basic", "title", Some("x"), MapOptions::new().location("Denton")),
            Err(ConvertError::LocationNotAllowed)
        ));
        // Blank location is ignored.
        r.map("agent", "creator", Some("x"), MapOptions::new().location("  ")).unwrap();
        assert_eq!(r.tree().len(), 2);
    }

    #[test]
    fn test_insertion_order_matches_call_order() {
        let mut r = record();
        r.map("basic", "date", Some("2020"), MapOptions::new().qualifier("creation")).unwrap();
        r.map("agent", "creator", Some("Smith, J."), MapOptions::new()).unwrap();
        r.map("basic", "title", Some("A Title"), MapOptions::new()).unwrap();

        let order: Vec<Element> = r.tree().iter().map(Node::element).collect();
        assert_eq!(
            order,
            vec![Element::Meta, Element::Date, Element::Creator, Element::Title]
        );
    }

    #[test]
    fn test_failed_map_leaves_tree_unchanged() {
        let mut r = record();
        let _ = r.map("agent", "creator", Some("x"), MapOptions::new().location("Denton"));
        let _ = r.map("agent", "title", Some("x"), MapOptions::new());
        assert_eq!(r.tree().len(), 1);
    }

    #[test]
    fn test_write_xml_metadata_file() {
        let tmp = tempdir().unwrap();
        let mut r = record();
        r.map("agent", "publisher", Some("UNT Libraries"), MapOptions::new().location("Denton, Texas"))
            .unwrap();
        r.set_base_directory(tmp.path());
        r.set_folder_name("test_data");

        let base = r.base_directory().unwrap().to_path_buf();
        let message = r.write_template_files(&base, "test_data").unwrap();
        assert_eq!(message, "test_data finished");

        let path = tmp.path().join("test_data").join(XML_FILE_NAME);
        assert_eq!(fs::read_to_string(&path).unwrap(), r.to_string());

        // Second write into the existing directory overwrites cleanly.
        r.map("basic", "note", Some("again"), MapOptions::new()).unwrap();
        r.write_template_files(&base, "test_data").unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("<note>again</note>"));
    }

    #[test]
    fn test_write_json_metadata_file() {
        let tmp = tempdir().unwrap();
        let r = record();
        let data = serde_json::json!({ "test": "data" });

        let message = r.write_json_file(tmp.path(), "test_data", &data).unwrap();
        assert_eq!(message, "test_data finished JSON");

        let written = fs::read_to_string(tmp.path().join("test_data").join(JSON_FILE_NAME)).unwrap();
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, data);

        // Pre-existing directory is not an error.
        r.write_json_file(tmp.path(), "test_data", &data).unwrap();
    }

    #[test]
    fn test_control_characters_are_rejected() {
        let mut r = record();
        let result = r.map("basic", "title", Some("bad\u{1}\u{b}value"), MapOptions::new());
        assert_eq!(
            err_message(result),
            "Value for element named \"title\" contains characters not allowed in XML"
        );
        assert_eq!(r.tree().len(), 1);

        let result = r.map("basic", "note", Some("ok"), MapOptions::new().qualifier("no\u{0}te"));
        assert!(matches!(result, Err(ConvertError::InvalidXmlCharacter(ref e)) if e == "note"));

        let result = r.map(
            "agent",
            "creator",
            Some("Smith"),
            MapOptions::new().info("born\u{1f}1900"),
        );
        assert!(matches!(result, Err(ConvertError::InvalidXmlCharacter(ref e)) if e == "creator"));

        // A single bad part rejects the whole split value.
        let result = r.map("basic", "subject", Some("a;b\u{7}"), MapOptions::new().split(";"));
        assert!(result.is_err());
        assert_eq!(r.tree().len(), 1);
    }

    #[test]
    fn test_tab_and_newline_are_allowed() {
        let mut r = record();
        r.map("basic", "description", Some("line one\n\tline two"), MapOptions::new())
            .unwrap();
        assert!(r.to_string().contains("<description>line one\n\tline two</description>"));
    }

    #[test]
    fn test_write_into_blocked_folder_fails() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("test_data"), "not a directory").unwrap();
        let r = record();

        let err = r.write_template_files(tmp.path(), "test_data").unwrap_err();
        assert!(matches!(err, ConvertError::DirectoryCreationFailed { .. }));

        let data = serde_json::json!({ "test": "data" });
        let err = r.write_json_file(tmp.path(), "test_data", &data).unwrap_err();
        assert!(matches!(err, ConvertError::DirectoryCreationFailed { .. }));
    }

    #[test]
    fn test_to_value_projection() {
        let mut r = record();
        r.map("agent", "creator", Some("Smith, J."), MapOptions::new().qualifier("aut").agent_type("per"))
            .unwrap();
        assert_eq!(
            r.to_value(),
            serde_json::json!({
                "meta": [{ "qualifier": "metadataCreator", "content": "mphillips" }],
                "creator": [{
                    "qualifier": "aut",
                    "content": { "type": "per", "name": "Smith, J." }
                }]
            })
        );
    }
}
