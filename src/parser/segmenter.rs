//! Zone segmentation of the document body.

use crate::model::{ContentNode, QuestionBlock, SectionKind, SegmentedExam};

use super::patterns::{self, SECTION_TAG};

/// Split body nodes into the four exam sections.
///
/// Nodes before the first section marker are dropped, as are end-of-exam
/// lines. A section marker node becomes part of its section's header with
/// any `[Pn]` tag removed from its text. Inside a section, each question
/// marker opens a new block; nodes between the marker and the first
/// question stay with the header.
pub fn segment(nodes: Vec<ContentNode>) -> SegmentedExam {
    let mut exam = SegmentedExam::new();
    let mut zone: Option<SectionKind> = None;
    let mut current: Option<QuestionBlock> = None;
    let mut discarded = 0usize;

    for mut node in nodes {
        let text = node.plain_text();

        if patterns::is_end_marker(&text) {
            continue;
        }

        if let Some(kind) = patterns::section_marker(&text) {
            flush(&mut exam, zone, &mut current);
            zone = Some(kind);
            node.delete_matches(&SECTION_TAG);
            let section = exam.section_mut(kind);
            section.markers.push(section.header.len());
            section.header.push(node);
            continue;
        }

        let Some(kind) = zone else {
            discarded += 1;
            continue;
        };

        if patterns::is_question_start(&text) {
            flush(&mut exam, zone, &mut current);
            current = Some(QuestionBlock::new(node));
        } else if let Some(block) = current.as_mut() {
            block.nodes.push(node);
        } else {
            exam.section_mut(kind).header.push(node);
        }
    }
    flush(&mut exam, zone, &mut current);

    if discarded > 0 {
        log::debug!("dropped {} node(s) before the first section marker", discarded);
    }
    log::debug!(
        "segmented {} question(s): {:?}",
        exam.question_count(),
        exam.sections.iter().map(|s| s.questions.len()).collect::<Vec<_>>()
    );
    exam
}

fn flush(exam: &mut SegmentedExam, zone: Option<SectionKind>, current: &mut Option<QuestionBlock>) {
    if let (Some(kind), Some(block)) = (zone, current.take()) {
        exam.section_mut(kind).questions.push(block);
    }
}
