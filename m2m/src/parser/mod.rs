//! CSV reader producing one [`Row`] per record.
//!
//! Bytes are decoded before parsing: UTF-8 is used as-is (BOM stripped),
//! anything else goes through encoding detection. Cell values are kept
//! verbatim; trimming happens when a value is mapped.

use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::Row;

/// Default column separator.
pub const DEFAULT_DELIMITER: u8 = b',';

const UTF8_BOM: &str = "\u{feff}";

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows, in file order
    pub rows: Vec<Row>,
    /// Detected encoding
    pub encoding: String,
    /// Column headers, in file order
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    match decoded.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Parse CSV text into rows keyed by the header line.
///
/// Short rows leave the trailing columns without a value; extra cells
/// beyond the header are ignored. Blank lines are skipped.
///
/// # Example
/// ```
/// use m2m::parser::parse_str;
///
/// let rows = parse_str("title,author\nA Title,\"Smith, J.\"", b',').unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].get("author"), Some("Smith, J."));
/// ```
pub fn parse_str(content: &str, delimiter: u8) -> CsvResult<Vec<Row>> {
    parse_with_headers(content, delimiter).map(|(_, rows)| rows)
}

fn parse_with_headers(content: &str, delimiter: u8) -> CsvResult<(Vec<String>, Vec<Row>)> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;

        let mut row = Row::new();
        for (i, header) in headers.iter().enumerate() {
            match record.get(i) {
                Some(value) => row.insert(header.as_str(), value),
                None => row.insert_absent(header.as_str()),
            }
        }
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Parse CSV bytes, detecting the encoding.
pub fn parse_bytes(bytes: &[u8], delimiter: u8) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let (headers, rows) = parse_with_headers(&content, delimiter)?;

    Ok(ParseResult {
        rows,
        encoding,
        headers,
    })
}

/// Parse a CSV file, detecting the encoding.
pub fn parse_csv_file<P: AsRef<Path>>(path: P, delimiter: u8) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, delimiter)
}
