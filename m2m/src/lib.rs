//! # m2m - CSV to UNTL metadata records
//!
//! m2m turns each row of a CSV file into a UNTL metadata record, driven by
//! a per-collection mapping script, and writes it as `metadata.xml` (plus an
//! optional `metadata.json` dump of the raw row).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Mapping   │────▶│  UNTL XML   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │   Script    │     │  + JSON     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use m2m::{MapOptions, Record};
//!
//! let mut record = Record::new("mphillips", false).unwrap();
//! record.map("basic", "title", Some("A Title"), MapOptions::new()).unwrap();
//! println!("{}", record);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - UNTL element table and CSV rows
//! - [`record`] - Record builder and serialization
//! - [`parser`] - CSV reading with encoding detection
//! - [`transform`] - Mapping scripts and the conversion driver
//! - [`config`] - Environment settings
//! - [`logs`] - Progress log

// Core modules
pub mod error;
pub mod models;

// Records
pub mod record;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Ambient
pub mod config;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    ConvertError,
    ConvertResult,
    CsvError,
    PipelineError,
    PipelineResult,
    ScriptError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{AgentChild, Element, ElementKind, Row};

// =============================================================================
// Re-exports - Records
// =============================================================================

pub use record::{
    MapOptions,
    MapOutcome,
    MetadataTree,
    Node,
    Record,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    parse_bytes,
    parse_csv_file,
    parse_str,
    ParseResult,
};

// =============================================================================
// Re-exports - Mapping scripts
// =============================================================================

pub use transform::dsl::{
    example_mapping,
    operations_description,
    FieldMapping,
    FieldSource,
    MappingFile,
    MappingScript,
    Operation,
    Pattern,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    process_rows,
    run,
    ConvertOptions,
    RunSummary,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::Settings;
