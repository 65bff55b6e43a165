//! Section III answer-line capture.

use crate::model::QuestionBlock;
use crate::parser::patterns;

/// Remove every answer line (`Key: ...`, `Đáp án: ...`) from a block and
/// return the first non-empty answer.
pub fn take_answer_line(block: &mut QuestionBlock) -> Option<String> {
    let mut answer: Option<String> = None;
    block.nodes.retain(|node| {
        if !node.is_paragraph() {
            return true;
        }
        match patterns::answer_line(&node.plain_text()) {
            Some(captured) => {
                if answer.is_none() && !captured.is_empty() {
                    answer = Some(captured);
                }
                false
            }
            None => true,
        }
    });
    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentNode;

    fn block(lines: &[&str]) -> QuestionBlock {
        QuestionBlock {
            nodes: lines.iter().map(|l| ContentNode::with_text(*l)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_answer_captured_and_removed() {
        let mut q = block(&["Câu 1: Tính 2^10", "Key: 1024", "Lời giải chi tiết"]);
        assert_eq!(take_answer_line(&mut q), Some("1024".to_string()));
        assert_eq!(q.nodes.len(), 2);
        assert_eq!(q.nodes[1].plain_text(), "Lời giải chi tiết");
    }

    #[test]
    fn test_every_answer_line_removed() {
        let mut q = block(&["Câu 2: ?", "Đáp án: 5", "ĐS = 6"]);
        assert_eq!(take_answer_line(&mut q), Some("5".to_string()));
        assert_eq!(q.nodes.len(), 1);
    }

    #[test]
    fn test_missing_or_empty_answer() {
        let mut q = block(&["Câu 3: ?", "không có"]);
        assert_eq!(take_answer_line(&mut q), None);
        assert_eq!(q.nodes.len(), 2);

        let mut empty = block(&["Câu 4: ?", "Key:"]);
        assert_eq!(take_answer_line(&mut empty), None);
        assert_eq!(empty.nodes.len(), 1);
    }
}
