//! Declarative mapping scripts.
//!
//! - `script`: the [`MappingScript`] contract and the JSON [`MappingFile`]
//! - `operations`: value operations chained into a field's transform
//! - `executor`: runs a [`MappingFile`] against a row
//!
//! ## Usage Flow
//!
//! ```text
//! CSV → parser::parse_csv_file → MappingFile::from_file → process_record → Record
//! ```
//!
//! ## Example
//!
//! ```rust
//! use m2m::parser::parse_str;
//! use m2m::transform::dsl::{MappingFile, MappingScript};
//!
//! let script = MappingFile::from_json(r#"{
//!     "metadata_creator": "mphillips",
//!     "folder_name": {"source": "isbn"},
//!     "mappings": [
//!         {"type": "basic", "element": "title", "source": "title", "qualifier": "officialtitle"}
//!     ]
//! }"#).unwrap();
//!
//! let rows = parse_str("title,isbn\nA Title,123", b',').unwrap();
//! let record = script.process_record(&rows[0]).unwrap();
//! assert_eq!(record.folder_name(), Some("123"));
//! ```

pub mod executor;
pub mod operations;
pub mod script;

pub use executor::execute;
pub use operations::{apply_all, operations_description, Operation, Pattern};
pub use script::{example_mapping, FieldMapping, FieldSource, MappingFile, MappingScript};
