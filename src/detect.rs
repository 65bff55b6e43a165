//! Exam template format detection and validation.

use crate::container::DOCUMENT_PART;
use crate::error::{Error, Result};
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

/// Kind of zip container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// A word-processing document (has `word/document.xml`)
    WordDocument,
    /// Some other zip archive (spreadsheet, presentation, plain zip)
    OtherZip,
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::WordDocument => write!(f, "DOCX"),
            ContainerKind::OtherZip => write!(f, "ZIP"),
        }
    }
}

/// Local file header signature.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// End of central directory signature (empty archive).
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";

/// Detect the container kind from a file path.
///
/// # Arguments
/// * `path` - Path to the template file
///
/// # Example
/// ```no_run
/// use exammix::detect::detect_format_from_path;
///
/// let kind = detect_format_from_path("de_goc.docx").unwrap();
/// println!("Container: {}", kind);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<ContainerKind> {
    let data = std::fs::read(path)?;
    detect_format_from_bytes(&data)
}

/// Detect the container kind from the complete file content.
///
/// # Returns
/// * `Ok(ContainerKind)` if the data is a readable zip archive
/// * `Err(Error::UnknownFormat)` if the data is not a zip archive
pub fn detect_format_from_bytes(data: &[u8]) -> Result<ContainerKind> {
    if !is_zip_bytes(data) {
        return Err(Error::UnknownFormat);
    }

    let archive = ZipArchive::new(Cursor::new(data))?;
    if archive.index_for_name(DOCUMENT_PART).is_some() {
        Ok(ContainerKind::WordDocument)
    } else {
        Ok(ContainerKind::OtherZip)
    }
}

/// Check for zip magic bytes.
pub fn is_zip_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC) || data.starts_with(ZIP_EMPTY_MAGIC)
}

/// Check if a file is a word-processing document.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(ContainerKind::WordDocument))
}

/// Check if bytes hold a word-processing document.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    matches!(detect_format_from_bytes(data), Ok(ContainerKind::WordDocument))
}
