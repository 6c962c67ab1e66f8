//! Mapping file executor
//!
//! Runs a [`MappingFile`] against one CSV row to produce a [`Record`].

use super::operations::apply_all;
use super::script::{FieldMapping, MappingFile, MappingScript};
use crate::error::ConvertResult;
use crate::models::Row;
use crate::record::{MapOptions, MapOutcome, Record};

impl MappingScript for MappingFile {
    fn process_record(&self, row: &Row) -> ConvertResult<Record> {
        execute(self, row)
    }
}

/// Execute a mapping file on a single row.
///
/// Mappings run in order; the first failing one aborts the row.
pub fn execute(script: &MappingFile, row: &Row) -> ConvertResult<Record> {
    let mut record = Record::new(&script.metadata_creator, script.add_date)?;

    for mapping in &script.mappings {
        apply_mapping(&mut record, mapping, row)?;
    }

    if let Some(ref base) = script.base_directory {
        record.set_base_directory(base.clone());
    }

    if let Some(ref folder) = script.folder_name {
        let name = folder
            .resolve(row)
            .map(|v| apply_all(&folder.operations, &v))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if let Some(name) = name {
            record.set_folder_name(name);
        }
    }

    Ok(record)
}

/// Apply one field mapping through [`Record::map`]
fn apply_mapping(record: &mut Record, mapping: &FieldMapping, row: &Row) -> ConvertResult<MapOutcome> {
    let value = mapping.value.resolve(row);
    let operations = &mapping.value.operations;
    let transform = |part: &str| apply_all(operations, part);

    let mut options = MapOptions::new()
        .required(mapping.required)
        .info(&mapping.info)
        .location(&mapping.location)
        .agent_type(&mapping.agent_type)
        .split(&mapping.split);

    if let Some(ref qualifier) = mapping.qualifier {
        options = options.qualifier(qualifier);
    }
    if !operations.is_empty() {
        options = options.transform(&transform);
    }

    record.map(&mapping.element_type, &mapping.element, value.as_deref(), options)
}
