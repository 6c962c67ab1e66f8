//! Transformation module.
//!
//! - DSL: mapping scripts and value operations
//! - Pipeline: row selection and output dispatch

pub mod dsl;
pub mod pipeline;

pub use dsl::*;
pub use pipeline::*;
