//! Template parser: container to segmented exam.

use std::io::Read;
use std::path::Path;

use crate::detect::{detect_format_from_path, ContainerKind};
use crate::error::{Error, Result};
use crate::model::{ExamDocument, SegmentedExam};

use super::segmenter::segment;

/// Exam template parser.
pub struct ExamParser {
    document: ExamDocument,
}

/// A parsed template: the document with its body lifted out, and the body
/// split into sections.
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    /// Document shell (package parts, section properties) with an empty body
    pub document: ExamDocument,
    /// Segmented body
    pub exam: SegmentedExam,
}

impl ExamParser {
    /// Open a template file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if detect_format_from_path(path)? != ContainerKind::WordDocument {
            return Err(Error::MissingPart(crate::container::DOCUMENT_PART.to_string()));
        }

        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a template from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = ExamDocument::from_bytes(data)?;
        Ok(Self { document })
    }

    /// Parse a template from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Number of body nodes in the template.
    pub fn node_count(&self) -> usize {
        self.document.body().len()
    }

    /// Segment the body.
    pub fn parse(mut self) -> ParsedTemplate {
        let exam = segment(self.document.take_body());
        ParsedTemplate {
            document: self.document,
            exam,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentNode, SectionKind};

    #[test]
    fn test_parse_from_bytes() {
        let mut doc = ExamDocument::blank().unwrap();
        doc.body_mut().push(ContentNode::with_text("[P4] Tự luận"));
        doc.body_mut().push(ContentNode::with_text("Câu 1: Chứng minh"));
        let bytes = doc.to_bytes().unwrap();

        let parser = ExamParser::from_bytes(&bytes).unwrap();
        assert_eq!(parser.node_count(), 2);
        let parsed = parser.parse();
        assert!(parsed.document.body().is_empty());
        assert_eq!(parsed.exam.section(SectionKind::Essay).questions.len(), 1);
    }

    #[test]
    fn test_reject_garbage() {
        assert!(ExamParser::from_bytes(b"not a docx").is_err());
        assert!(ExamParser::from_reader(&b""[..]).is_err());
    }
}
