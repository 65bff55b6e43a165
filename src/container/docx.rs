//! Zip-based office document container.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::detect;
use crate::error::{Error, Result};
use crate::model::Element;

use super::xml_io;

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Relationships of the main document part.
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// Content type registry.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const BLANK_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const BLANK_PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const BLANK_DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

const BLANK_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body><w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

/// The parts of a zip-based office document, in archive order.
#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    /// Read every entry of a DOCX archive.
    ///
    /// # Arguments
    ///
    /// * `data` - DOCX file content as bytes
    ///
    /// # Errors
    ///
    /// `Error::UnknownFormat` if the data is not a zip archive and
    /// `Error::MissingPart` if it has no main document part.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !detect::is_zip_bytes(data) {
            return Err(Error::UnknownFormat);
        }

        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)?;
            parts.push((file.name().to_string(), buf));
        }

        let package = Self { parts };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(Error::MissingPart(DOCUMENT_PART.to_string()));
        }
        Ok(package)
    }

    /// A minimal valid package with an empty body.
    pub fn blank() -> Self {
        Self {
            parts: vec![
                (CONTENT_TYPES_PART.to_string(), BLANK_CONTENT_TYPES.as_bytes().to_vec()),
                ("_rels/.rels".to_string(), BLANK_PACKAGE_RELS.as_bytes().to_vec()),
                (DOCUMENT_PART.to_string(), BLANK_DOCUMENT.as_bytes().to_vec()),
                (DOCUMENT_RELS_PART.to_string(), BLANK_DOCUMENT_RELS.as_bytes().to_vec()),
            ],
        }
    }

    /// Get a part's raw content.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Check if a part exists.
    pub fn has_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Replace or add a part.
    pub fn set_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = data,
            None => self.parts.push((name, data)),
        }
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// Parse a part as XML.
    pub fn xml_part(&self, name: &str) -> Result<Element> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;
        xml_io::parse(data)
    }

    /// Serialize an element tree into a part.
    pub fn set_xml_part(&mut self, name: impl Into<String>, root: &Element) {
        self.set_part(name, xml_io::to_bytes(root));
    }

    /// Write the package as a DOCX archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        write_archive(self.parts.iter().map(|(n, d)| (n.as_str(), d.as_slice())))
    }
}

/// Write named entries into a deflate-compressed zip archive.
pub fn write_archive<'a>(entries: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(name, options)?;
        writer.write_all(data)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Read every file entry of a zip archive.
pub fn read_archive(data: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        entries.push((file.name().to_string(), buf));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_round_trip() {
        let bytes = DocxPackage::blank().to_bytes().unwrap();
        let package = DocxPackage::from_bytes(&bytes).unwrap();
        let names: Vec<_> = package.part_names().collect();
        assert_eq!(
            names,
            vec![CONTENT_TYPES_PART, "_rels/.rels", DOCUMENT_PART, DOCUMENT_RELS_PART]
        );
        let root = package.xml_part(DOCUMENT_PART).unwrap();
        assert_eq!(root.name, "w:document");
        assert!(root.child("w:body").is_some());
    }

    #[test]
    fn test_missing_document_part() {
        let bytes = write_archive([("hello.txt", b"hi".as_slice())]).unwrap();
        let err = DocxPackage::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::MissingPart(_)));
    }

    #[test]
    fn test_not_a_zip() {
        let err = DocxPackage::from_bytes(b"%PDF-1.7 not a docx").unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }

    #[test]
    fn test_set_part_replaces() {
        let mut package = DocxPackage::blank();
        package.set_part("word/extra.xml", b"<a/>".to_vec());
        package.set_part("word/extra.xml", b"<b/>".to_vec());
        assert_eq!(package.part("word/extra.xml"), Some(b"<b/>".as_slice()));
        assert_eq!(package.part_names().count(), 5);
    }
}
