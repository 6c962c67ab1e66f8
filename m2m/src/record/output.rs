//! Output files written for each record under `<base>/<folder>/`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{ConvertError, ConvertResult};

/// File name of the XML record.
pub const XML_FILE_NAME: &str = "metadata.xml";

/// File name of the JSON row dump.
pub const JSON_FILE_NAME: &str = "metadata.json";

const JSON_INDENT: &[u8] = b"    ";

/// Create `<base>/<folder>` if needed and return its path.
///
/// A directory that already exists is fine; any other failure is fatal.
pub fn ensure_directory(base_directory: &Path, folder_name: &str) -> ConvertResult<PathBuf> {
    let dir = base_directory.join(folder_name);
    match fs::create_dir_all(&dir) {
        Ok(()) => Ok(dir),
        Err(_) if dir.is_dir() => Ok(dir),
        Err(source) => Err(ConvertError::DirectoryCreationFailed { path: dir, source }),
    }
}

/// Pretty JSON with sorted keys and 4-space indentation.
pub fn to_sorted_json<T: Serialize + ?Sized>(data: &T) -> ConvertResult<String> {
    // Going through Value sorts map keys regardless of the source map type.
    let value = serde_json::to_value(data)?;

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;

    String::from_utf8(buf)
        .map_err(|e| ConvertError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Write `contents` to `<dir>/<file_name>`, replacing any existing file.
pub(crate) fn write_file(dir: &Path, file_name: &str, contents: &[u8]) -> ConvertResult<PathBuf> {
    let path = dir.join(file_name);
    fs::write(&path, contents)?;
    Ok(path)
}
