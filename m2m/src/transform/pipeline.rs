//! Driver: run a mapping script over CSV rows and dispatch the output.
//!
//! For each selected row the script builds one record, which is then
//! written as `metadata.xml` (`write_xml`), written as a JSON dump of the
//! raw row (`write_json`), or printed when neither is requested.
//!
//! # Example
//!
//! ```rust,no_run
//! use m2m::transform::pipeline::{run, ConvertOptions};
//! use std::path::Path;
//!
//! let options = ConvertOptions { write_xml: true, ..ConvertOptions::default() };
//! let summary = run(
//!     Path::new("mapping.json"),
//!     Path::new("books.csv"),
//!     &options,
//!     &mut std::io::stdout(),
//! )?;
//! println!("{} rows", summary.processed);
//! # Ok::<(), m2m::error::PipelineError>(())
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, ConvertResult, PipelineResult};
use crate::logs::{log_info, log_success, log_warning};
use crate::models::Row;
use crate::parser::{parse_csv_file, DEFAULT_DELIMITER};
use crate::record::Record;
use crate::transform::dsl::{MappingFile, MappingScript};

/// Options for a conversion run
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Process only this 1-indexed row
    pub row: Option<usize>,

    /// Write `metadata.xml` for each record
    pub write_xml: bool,

    /// Write `metadata.json` (the raw row) for each record
    pub write_json: bool,

    /// Replaces every record's base directory
    pub output_dir: Option<PathBuf>,

    /// CSV column separator
    pub delimiter: u8,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            row: None,
            write_xml: false,
            write_json: false,
            output_dir: None,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl ConvertOptions {
    /// Records are printed when no file output is requested
    pub fn prints(&self) -> bool {
        !self.write_xml && !self.write_json
    }
}

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Rows turned into records
    pub processed: usize,
    /// `metadata.xml` files written
    pub xml_files: Vec<PathBuf>,
    /// `metadata.json` files written
    pub json_files: Vec<PathBuf>,
}

/// Pick the rows to process, paired with their 1-indexed row number.
///
/// Fails before anything is processed when `row` is 0 or past the end.
pub fn select_rows(rows: &[Row], row: Option<usize>) -> ConvertResult<Vec<(usize, &Row)>> {
    match row {
        None => Ok(rows.iter().enumerate().map(|(i, r)| (i + 1, r)).collect()),
        Some(n) => match n.checked_sub(1).and_then(|i| rows.get(i)) {
            Some(r) => Ok(vec![(n, r)]),
            None => Err(ConvertError::RowIndexOutOfRange(n)),
        },
    }
}

/// Output directory for `record`: the override or the record's own base
/// directory, joined with its folder name.
pub fn output_location<'a>(
    record: &'a Record,
    output_dir: Option<&'a Path>,
) -> ConvertResult<(&'a Path, &'a str)> {
    let folder = record
        .folder_name()
        .ok_or(ConvertError::OutputLocationUnset("folder name"))?;
    let base = output_dir
        .or_else(|| record.base_directory())
        .ok_or(ConvertError::OutputLocationUnset("base directory"))?;
    Ok((base, folder))
}

/// Run `script` over `rows`, writing printed XML to `out`.
///
/// Each record is built once and used for every requested output.
/// The first error stops the run.
pub fn process_rows<W: Write>(
    rows: &[Row],
    script: &dyn MappingScript,
    options: &ConvertOptions,
    out: &mut W,
) -> PipelineResult<RunSummary> {
    let selected = select_rows(rows, options.row)?;
    let mut summary = RunSummary::default();

    for (number, row) in selected {
        if options.write_xml {
            log_info(format!("Writing record for row {}", number));
        }
        if options.write_json {
            log_info(format!("Writing json record for row {}", number));
        }
        if options.prints() {
            log_info(format!("Processing row {}", number));
        }

        let record = script.process_record(row)?;

        if options.write_xml || options.write_json {
            let (base, folder) = output_location(&record, options.output_dir.as_deref())?;

            if options.write_xml {
                let done = record.write_template_files(base, folder)?;
                summary.xml_files.push(base.join(folder).join(crate::record::XML_FILE_NAME));
                log_success(done);
            }
            if options.write_json {
                let done = record.write_json_file(base, folder, row)?;
                summary.json_files.push(base.join(folder).join(crate::record::JSON_FILE_NAME));
                log_success(done);
            }
        }

        if options.prints() {
            write!(out, "{}", record.to_xml_string()?)?;
        }

        summary.processed += 1;
    }

    Ok(summary)
}

/// Load a mapping file and a CSV file, then process the rows.
pub fn run<W: Write>(
    mapping_path: &Path,
    csv_path: &Path,
    options: &ConvertOptions,
    out: &mut W,
) -> PipelineResult<RunSummary> {
    log_info(format!(
        "Processing CSV file {} with mapping {}",
        csv_path.display(),
        mapping_path.display()
    ));

    let script = MappingFile::from_file(mapping_path)?;
    let parsed = parse_csv_file(csv_path, options.delimiter)?;
    log_info(format!(
        "Read {} rows ({}, {} columns)",
        parsed.rows.len(),
        parsed.encoding,
        parsed.headers.len()
    ));

    let missing = script.missing_columns(&parsed.headers);
    if !missing.is_empty() {
        log_warning(format!(
            "Columns referenced by the mapping but missing from the CSV: {}",
            missing.join(", ")
        ));
    }

    let summary = process_rows(&parsed.rows, &script, options, out)?;
    log_success(format!("Processed {} rows", summary.processed));
    Ok(summary)
}
