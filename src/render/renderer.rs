//! Variant assembly: header, sections, closing, then formatting.

use crate::error::Result;
use crate::model::{ContentNode, ExamDocument, SegmentedExam};
use crate::parser::patterns;

use super::format::format_document;
use super::header::{closing_block, header_block, HeaderFields};

/// Rebuild `doc`'s body from a processed exam and format it.
///
/// The body becomes the header block, then each section's header nodes
/// followed by its questions in their final order, then the closing block.
/// Section marker nodes that mention the section keyword are set in bold;
/// instruction paragraphs keep their own formatting.
pub fn render_variant(
    doc: &mut ExamDocument,
    exam: SegmentedExam,
    fields: &HeaderFields,
    code: &str,
) -> Result<()> {
    let mut body = header_block(fields, code);
    body.extend(assemble_sections(exam));
    body.extend(closing_block());

    log::debug!("variant {}: {} body nodes", code, body.len());
    doc.set_body(body);
    format_document(doc, code)
}

/// Flatten sections into body nodes in render order.
pub fn assemble_sections(exam: SegmentedExam) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    for section in exam.sections {
        for (i, mut header) in section.header.into_iter().enumerate() {
            if section.markers.contains(&i) && patterns::has_section_keyword(&header.plain_text()) {
                header.set_all_bold();
            }
            nodes.push(header);
        }
        for question in section.questions {
            nodes.extend(question.into_nodes());
        }
    }
    nodes
}
