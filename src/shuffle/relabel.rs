//! Option label rewrite after shuffling.

use crate::model::{run_text, set_bold, text_run, Choice, ContentNode, SectionKind};
use crate::parser::patterns::OPTION_LABEL;

/// Rewrite the leading label of each option to match its position.
pub fn relabel_choices(choices: &mut [Choice], kind: SectionKind) {
    let labels = kind.labels();
    for (choice, label) in choices.iter_mut().zip(labels) {
        if let Some(first) = choice.nodes.first_mut() {
            let new_label = format!("{}{} ", label, kind.label_separator());
            if !relabel_node(first, &new_label) {
                log::debug!("option without a label: {:?}", first.plain_text());
            }
        }
    }
}

/// Replace the option label at the start of `node` with a bold `new_label`.
///
/// The old label may be split across runs. Runs that lose label characters
/// but keep some text are un-bolded, so only the new label stands out.
/// Returns `false` if the node has no label.
pub fn relabel_node(node: &mut ContentNode, new_label: &str) -> bool {
    let text = node.plain_text();
    let Some(found) = OPTION_LABEL.find(&text) else {
        return false;
    };
    let count = text[..found.end()].chars().count();

    let before: Vec<String> = node.runs_mut().iter().map(|r| run_text(r)).collect();
    node.delete_chars(0, count);
    for (run, old) in node.runs_mut().into_iter().zip(before) {
        let now = run_text(run);
        if now != old && !now.is_empty() {
            set_bold(run, false);
        }
    }

    node.insert_run_front(text_run(new_label, true));
    true
}
