//! Question renumbering after shuffling.

use crate::model::{char_span, text_run, ContentNode, SegmentedExam};
use crate::parser::patterns::QUESTION_LABEL;

/// Default counter word for reset labels.
pub const DEFAULT_COUNTER_WORD: &str = "Câu";

/// Rewrite the question labels of every section.
///
/// With `reset`, labels become `"{counter_word} {n}"` with `n` counting from
/// 1 inside each section. Without it, each question keeps its original label
/// text. Either way the label is re-emitted as a single bold run, followed by
/// the original separator (`:` when it had none).
pub fn renumber_exam(exam: &mut SegmentedExam, reset: bool, counter_word: &str) {
    for section in &mut exam.sections {
        for (i, question) in section.questions.iter_mut().enumerate() {
            let Some(first) = question.nodes.first_mut() else {
                continue;
            };
            let label = reset.then(|| format!("{} {}", counter_word, i + 1));
            if !relabel_question(first, label.as_deref()) {
                log::debug!("question without a label: {}", question.excerpt());
            }
        }
    }
}

/// Replace the question label at the start of `node`.
///
/// `label` overrides the label text; `None` keeps the original one. Returns
/// `false` (leaving the node untouched) when the node has no label.
pub fn relabel_question(node: &mut ContentNode, label: Option<&str>) -> bool {
    let text = node.plain_text();
    let Some(caps) = QUESTION_LABEL.captures(&text) else {
        return false;
    };
    let Some(whole) = caps.get(0) else {
        return false;
    };

    let leading = caps.get(1).map_or("", |m| m.as_str());
    let label = match label {
        Some(label) => label.to_string(),
        None => caps
            .get(2)
            .map_or("", |m| m.as_str())
            .replace([':', '.'], "")
            .trim()
            .to_string(),
    };
    let separator = match caps.get(4).map(|m| m.as_str()) {
        Some(".") => '.',
        _ => ':',
    };

    let (start, end) = char_span(&text, whole.start(), whole.end());
    node.delete_chars(start, end - start);
    node.insert_run_front(text_run(
        format!("{}{}{} ", leading, label, separator),
        true,
    ));
    true
}
