//! Option extraction and correctness detection.

use crate::error::IssueKind;
use crate::model::{Choice, ContentNode, Element, QuestionBlock, SectionKind};
use crate::parser::patterns::{self, CORRECT_COLORS, CORRECT_MARKER};

/// Number of options a choice question must have.
pub const CHOICES_PER_QUESTION: usize = 4;

/// Split a question block into its stem and options.
///
/// On success `block.nodes` holds the stem and `block.choices` the options
/// in source order. On failure every node is put back into `block.nodes`
/// and the problem is returned.
pub fn extract_choices(block: &mut QuestionBlock, kind: SectionKind) -> Result<(), IssueKind> {
    let mut stem = Vec::new();
    let mut choices: Vec<Choice> = Vec::new();

    for mut node in std::mem::take(&mut block.nodes) {
        if !node.is_paragraph() {
            match choices.last_mut() {
                Some(choice) => choice.nodes.push(node),
                None => stem.push(node),
            }
            continue;
        }

        if patterns::is_option_start(&node.plain_text()) {
            let is_correct = take_correct_markers(&mut node);
            let mut choice = Choice::new(node);
            choice.is_correct = is_correct;
            choices.push(choice);
        } else if let Some(choice) = choices.last_mut() {
            choice.is_correct |= take_correct_markers(&mut node);
            choice.nodes.push(node);
        } else {
            stem.push(node);
        }
    }

    for choice in &mut choices {
        while choice.nodes.len() > 1 && choice.nodes.last().is_some_and(ContentNode::is_blank) {
            choice.nodes.pop();
        }
    }

    match check_choices(kind, &choices) {
        Ok(()) => {
            block.nodes = stem;
            block.choices = choices;
            Ok(())
        }
        Err(issue) => {
            block.nodes = stem;
            block.nodes.extend(choices.into_iter().flat_map(|c| c.nodes));
            Err(issue)
        }
    }
}

/// Validate option count and, for Section I, the number marked correct.
pub fn check_choices(kind: SectionKind, choices: &[Choice]) -> Result<(), IssueKind> {
    if choices.len() != CHOICES_PER_QUESTION {
        return Err(IssueKind::ChoiceCount {
            found: choices.len(),
        });
    }
    if kind == SectionKind::MultipleChoice {
        match choices.iter().filter(|c| c.is_correct).count() {
            0 => return Err(IssueKind::MissingAnswer),
            1 => {}
            count => return Err(IssueKind::MultipleCorrect { count }),
        }
    }
    Ok(())
}

/// Detect and strip every correctness marker in a paragraph.
///
/// Inline markers (`*`, `(đúng)`, ...) are deleted from the text; marking
/// colors and underlines are removed from the runs that carry them.
/// Either kind of marker is enough to flag the option.
pub fn take_correct_markers(node: &mut ContentNode) -> bool {
    let mut is_correct = node.delete_matches(&CORRECT_MARKER) > 0;
    for run in node.runs_mut() {
        is_correct |= clear_marking_format(run);
    }
    is_correct
}

/// Remove a marking color or underline from a run.
fn clear_marking_format(run: &mut Element) -> bool {
    let Some(rpr) = run.child_mut("w:rPr") else {
        return false;
    };

    let mut marked = false;
    let colored = rpr
        .child("w:color")
        .and_then(|c| c.attr("w:val"))
        .is_some_and(|val| CORRECT_COLORS.contains(&val.to_lowercase().as_str()));
    if colored {
        rpr.remove_children("w:color");
        marked = true;
    }

    let underlined = rpr
        .child("w:u")
        .is_some_and(|u| !u.attr("w:val").unwrap_or("").eq_ignore_ascii_case("none"));
    if underlined {
        rpr.remove_children("w:u");
        marked = true;
    }
    marked
}
