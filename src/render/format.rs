//! Document-wide formatting: page setup, paragraph and run normalization,
//! and the per-variant footer.

use crate::container::{CONTENT_TYPES_PART, DOCUMENT_RELS_PART};
use crate::error::Result;
use crate::model::schema::{PARAGRAPH_PROPERTIES, SECTION_PROPERTIES};
use crate::model::{text_run, Element, ExamDocument};

use super::header::{field_runs, FieldKind};
use super::visitor::{
    visit_one, walk_paragraphs, CompositeVisitor, FontVisitor, ParagraphContext, SpacingVisitor,
};

/// A4 page size in twentieths of a point.
pub const PAGE_SIZE: (u32, u32) = (11906, 16838);

/// Page margins in twentieths of a point: top, right, bottom, left.
pub const PAGE_MARGINS: (u32, u32, u32, u32) = (850, 850, 1134, 1134);

/// Footer distance from the page edge (1.27 cm).
pub const FOOTER_DISTANCE: u32 = 720;

/// Footer part written into every variant.
pub const FOOTER_PART: &str = "word/footerExamMix.xml";

/// Relationship id of the footer part.
pub const FOOTER_REL_ID: &str = "rIdExamMixFooter";

const FOOTER_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
const FOOTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
const RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const WORD_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NAMESPACE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Apply page setup, spacing and fonts, and install the footer showing
/// `code` and the page count. Running it twice gives the same result.
pub fn format_document(doc: &mut ExamDocument, code: &str) -> Result<()> {
    for sect in doc.all_section_properties_mut() {
        apply_page_setup(sect);
    }

    let mut visitor = CompositeVisitor::new()
        .with_visitor(SpacingVisitor)
        .with_visitor(FontVisitor);
    let visited = walk_paragraphs(doc.body_mut(), &mut visitor);
    log::debug!("formatted {} paragraphs", visited);

    install_footer(doc, code)
}

/// Set A4 size and the exam margins on one `w:sectPr`. Header distance and
/// gutter keep their existing values.
pub fn apply_page_setup(sect: &mut Element) {
    let size = sect.get_or_insert("w:pgSz", SECTION_PROPERTIES);
    size.set_attr("w:w", PAGE_SIZE.0.to_string());
    size.set_attr("w:h", PAGE_SIZE.1.to_string());
    size.attrs.retain(|(k, _)| k != "w:orient");

    let (top, right, bottom, left) = PAGE_MARGINS;
    let margins = sect.get_or_insert("w:pgMar", SECTION_PROPERTIES);
    let header = margins.attr("w:header").unwrap_or("708").to_string();
    let gutter = margins.attr("w:gutter").unwrap_or("0").to_string();
    margins.attrs.clear();
    margins.set_attr("w:top", top.to_string());
    margins.set_attr("w:right", right.to_string());
    margins.set_attr("w:bottom", bottom.to_string());
    margins.set_attr("w:left", left.to_string());
    margins.set_attr("w:header", header);
    margins.set_attr("w:footer", FOOTER_DISTANCE.to_string());
    margins.set_attr("w:gutter", gutter);
}

/// Replace all headers and footers with the variant footer.
pub fn install_footer(doc: &mut ExamDocument, code: &str) -> Result<()> {
    for sect in doc.all_section_properties_mut() {
        sect.remove_children("w:headerReference");
        sect.remove_children("w:footerReference");
        sect.remove_children("w:titlePg");
        sect.insert_ordered(
            Element::new("w:footerReference")
                .with_attr("w:type", "default")
                .with_attr("r:id", FOOTER_REL_ID),
            SECTION_PROPERTIES,
        );
    }

    let package = doc.package_mut();
    package.set_xml_part(FOOTER_PART, &footer_element(code));

    let mut rels = if package.has_part(DOCUMENT_RELS_PART) {
        package.xml_part(DOCUMENT_RELS_PART)?
    } else {
        Element::new("Relationships").with_attr("xmlns", RELS_NAMESPACE)
    };
    if !rels.elements().any(|r| r.attr("Id") == Some(FOOTER_REL_ID)) {
        let target = FOOTER_PART.trim_start_matches("word/");
        rels = rels.with_child(
            Element::new("Relationship")
                .with_attr("Id", FOOTER_REL_ID)
                .with_attr("Type", FOOTER_REL_TYPE)
                .with_attr("Target", target),
        );
        package.set_xml_part(DOCUMENT_RELS_PART, &rels);
    }

    let mut types = package.xml_part(CONTENT_TYPES_PART)?;
    let part_name = format!("/{}", FOOTER_PART);
    if !types
        .elements()
        .any(|o| o.is("Override") && o.attr("PartName") == Some(part_name.as_str()))
    {
        types = types.with_child(
            Element::new("Override")
                .with_attr("PartName", part_name)
                .with_attr("ContentType", FOOTER_CONTENT_TYPE),
        );
        package.set_xml_part(CONTENT_TYPES_PART, &types);
    }

    Ok(())
}

/// Footer part: `Mã đề: {code} - Trang {PAGE} / {NUMPAGES}`, centered.
fn footer_element(code: &str) -> Element {
    let mut ppr = Element::new("w:pPr");
    ppr.insert_ordered(
        Element::new("w:jc").with_attr("w:val", "center"),
        PARAGRAPH_PROPERTIES,
    );

    let mut runs = vec![text_run(format!("Mã đề: {} - Trang ", code), false)];
    runs.extend(field_runs(FieldKind::Page));
    runs.push(text_run(" / ", false));
    runs.extend(field_runs(FieldKind::NumPages));

    let mut paragraph = runs
        .into_iter()
        .fold(Element::new("w:p").with_child(ppr), |p, r| p.with_child(r));
    visit_one(&mut paragraph, ParagraphContext::Body, &mut FontVisitor);

    Element::new("w:ftr")
        .with_attr("xmlns:w", WORD_NAMESPACE)
        .with_attr("xmlns:r", REL_NAMESPACE)
        .with_child(paragraph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{element_text, ContentNode};

    fn sample() -> ExamDocument {
        let mut doc = ExamDocument::blank().unwrap();
        doc.body_mut().push(ContentNode::with_text("PHẦN I. Trắc nghiệm"));
        doc.body_mut().push(ContentNode::with_text("Câu 1: ?"));
        doc
    }

    #[test]
    fn test_page_setup() {
        let mut doc = sample();
        format_document(&mut doc, "101").unwrap();
        let sect = doc.section_properties().unwrap();
        let margins = sect.child("w:pgMar").unwrap();
        assert_eq!(margins.attr("w:top"), Some("850"));
        assert_eq!(margins.attr("w:left"), Some("1134"));
        assert_eq!(margins.attr("w:footer"), Some("720"));
        assert_eq!(margins.attr("w:header"), Some("708"));
        assert_eq!(sect.child("w:pgSz").and_then(|s| s.attr("w:w")), Some("11906"));
    }

    #[test]
    fn test_footer_installed() {
        let mut doc = sample();
        format_document(&mut doc, "204").unwrap();

        let sect = doc.section_properties().unwrap();
        let names: Vec<_> = sect.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names[0], "w:footerReference");

        let footer = doc.package().xml_part(FOOTER_PART).unwrap();
        assert!(element_text(&footer).starts_with("Mã đề: 204 - Trang "));

        let rels = doc.package().xml_part(DOCUMENT_RELS_PART).unwrap();
        assert_eq!(
            rels.elements().filter(|r| r.attr("Id") == Some(FOOTER_REL_ID)).count(),
            1
        );
    }

    #[test]
    fn test_format_is_idempotent() {
        let mut doc = sample();
        let snapshot = |doc: &ExamDocument| {
            let mut parts = vec![crate::container::xml_io::to_bytes(&doc.document_element())];
            for name in [FOOTER_PART, DOCUMENT_RELS_PART, CONTENT_TYPES_PART] {
                parts.push(doc.package().part(name).unwrap().to_vec());
            }
            parts
        };

        format_document(&mut doc, "101").unwrap();
        let once = snapshot(&doc);
        format_document(&mut doc, "101").unwrap();
        assert_eq!(snapshot(&doc), once);
    }
}
