//! Parsed exam document.

use crate::container::{DocxPackage, DOCUMENT_PART};
use crate::error::{Error, Result};

use super::node::ContentNode;
use super::xml::{Element, XmlNode};

/// A DOCX document split into its body nodes.
///
/// The `w:body` children are lifted out into a flat list of
/// [`ContentNode`]s; the trailing `w:sectPr` is kept apart so that the body
/// can be cleared and rebuilt without losing page setup.
#[derive(Debug, Clone)]
pub struct ExamDocument {
    package: DocxPackage,
    root: Element,
    body: Vec<ContentNode>,
    section: Option<Element>,
}

impl ExamDocument {
    /// Open a document from DOCX bytes.
    ///
    /// # Arguments
    ///
    /// * `data` - DOCX file content as bytes
    ///
    /// # Example
    ///
    /// ```no_run
    /// use exammix::ExamDocument;
    ///
    /// let data = std::fs::read("de_goc.docx").unwrap();
    /// let doc = ExamDocument::from_bytes(&data).unwrap();
    /// println!("Body nodes: {}", doc.body().len());
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_package(DocxPackage::from_bytes(data)?)
    }

    /// Open a document from an already-read package.
    pub fn from_package(package: DocxPackage) -> Result<Self> {
        let mut root = package.xml_part(DOCUMENT_PART)?;
        let body = root
            .child_mut("w:body")
            .ok_or_else(|| Error::MissingPart(format!("{}#w:body", DOCUMENT_PART)))?;

        let mut nodes = Vec::new();
        let mut section = None;
        for child in std::mem::take(&mut body.children) {
            if let XmlNode::Element(element) = child {
                if element.is("w:sectPr") {
                    section = Some(element);
                } else {
                    nodes.push(ContentNode::new(element));
                }
            }
        }
        if section.is_none() {
            log::warn!("document body has no final section properties");
        }

        Ok(Self {
            package,
            root,
            body: nodes,
            section,
        })
    }

    /// A document with an empty body.
    pub fn blank() -> Result<Self> {
        Self::from_package(DocxPackage::blank())
    }

    /// Body nodes in order.
    pub fn body(&self) -> &[ContentNode] {
        &self.body
    }

    /// Body nodes, mutably.
    pub fn body_mut(&mut self) -> &mut Vec<ContentNode> {
        &mut self.body
    }

    /// Take all body nodes, leaving the body empty.
    pub fn take_body(&mut self) -> Vec<ContentNode> {
        std::mem::take(&mut self.body)
    }

    /// Replace the body.
    pub fn set_body(&mut self, nodes: Vec<ContentNode>) {
        self.body = nodes;
    }

    /// Final section properties, if any.
    pub fn section_properties(&self) -> Option<&Element> {
        self.section.as_ref()
    }

    /// Final section properties, created when missing.
    pub fn section_properties_mut(&mut self) -> &mut Element {
        self.section.get_or_insert_with(|| Element::new("w:sectPr"))
    }

    /// Every section-properties element: those embedded in body paragraphs
    /// followed by the final one.
    pub fn all_section_properties_mut(&mut self) -> Vec<&mut Element> {
        let mut sections = Vec::new();
        for node in &mut self.body {
            if let Some(sect) = node
                .element_mut()
                .child_mut("w:pPr")
                .and_then(|ppr| ppr.child_mut("w:sectPr"))
            {
                sections.push(sect);
            }
        }
        sections.push(self.section.get_or_insert_with(|| Element::new("w:sectPr")));
        sections
    }

    /// Underlying package.
    pub fn package(&self) -> &DocxPackage {
        &self.package
    }

    /// Underlying package, mutably.
    pub fn package_mut(&mut self) -> &mut DocxPackage {
        &mut self.package
    }

    /// Body text, one line per node.
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .map(ContentNode::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The `w:document` tree with the current body written back.
    pub fn document_element(&self) -> Element {
        let mut root = self.root.clone();
        if let Some(body) = root.child_mut("w:body") {
            body.children = self
                .body
                .iter()
                .map(|node| XmlNode::Element(node.element().clone()))
                .chain(self.section.iter().cloned().map(XmlNode::Element))
                .collect();
        }
        root
    }

    /// Serialize as DOCX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut package = self.package.clone();
        package.set_xml_part(DOCUMENT_PART, &self.document_element());
        package.to_bytes()
    }

    /// Serialize as DOCX bytes, consuming the document.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let Self {
            mut package,
            mut root,
            body,
            section,
        } = self;
        if let Some(b) = root.child_mut("w:body") {
            b.children = body
                .into_iter()
                .map(|node| XmlNode::Element(node.into_element()))
                .chain(section.map(XmlNode::Element))
                .collect();
        }
        package.set_xml_part(DOCUMENT_PART, &root);
        package.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_document() {
        let doc = ExamDocument::blank().unwrap();
        assert!(doc.body().is_empty());
        assert!(doc.section_properties().is_some());
    }

    #[test]
    fn test_body_round_trip() {
        let mut doc = ExamDocument::blank().unwrap();
        doc.body_mut().push(ContentNode::with_text("[P1] PHẦN I"));
        doc.body_mut().push(ContentNode::with_text("Câu 1: 1 + 1 = ?"));

        let bytes = doc.to_bytes().unwrap();
        let reopened = ExamDocument::from_bytes(&bytes).unwrap();
        assert_eq!(reopened.body().len(), 2);
        assert_eq!(reopened.plain_text(), "[P1] PHẦN I\nCâu 1: 1 + 1 = ?");
        assert!(reopened.section_properties().is_some());

        let again = reopened.into_bytes().unwrap();
        let third = ExamDocument::from_bytes(&again).unwrap();
        assert_eq!(third.body(), doc.body());
    }

    #[test]
    fn test_take_body_empties() {
        let mut doc = ExamDocument::blank().unwrap();
        doc.body_mut().push(ContentNode::paragraph());
        let nodes = doc.take_body();
        assert_eq!(nodes.len(), 1);
        assert!(doc.body().is_empty());
    }
}
