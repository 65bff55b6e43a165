//! Container codecs: DOCX packages, XML parts and xlsx answer sheets.

mod docx;
mod xlsx;
pub mod xml_io;

pub use docx::{
    read_archive, write_archive, DocxPackage, CONTENT_TYPES_PART, DOCUMENT_PART,
    DOCUMENT_RELS_PART,
};
pub use xlsx::{KeyCell, KeySheet};
