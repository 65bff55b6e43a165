//! Exam structure: sections, question blocks, options.

use serde::{Deserialize, Serialize};

use super::ContentNode;

/// Points per Section I question.
pub const MULTIPLE_CHOICE_POINTS: f64 = 0.25;

/// Section II rubric: points for 1, 2, 3 or 4 correct sub-answers.
pub const TRUE_FALSE_RUBRIC: [f64; 4] = [0.1, 0.25, 0.5, 1.0];

/// Points per Section III question.
pub const SHORT_ANSWER_POINTS: f64 = 0.5;

/// Answer character for a true statement in Section II.
pub const TRUE_MARK: char = 'Đ';

/// Answer character for a false statement in Section II.
pub const FALSE_MARK: char = 'S';

/// One of the four ordered exam sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Section I: one correct option among A–D
    MultipleChoice,
    /// Section II: four true/false statements a–d
    TrueFalse,
    /// Section III: short free-text answer
    ShortAnswer,
    /// Section IV: free response, not shuffled or keyed
    Essay,
}

impl SectionKind {
    /// All sections in render order.
    pub const ALL: [SectionKind; 4] = [
        SectionKind::MultipleChoice,
        SectionKind::TrueFalse,
        SectionKind::ShortAnswer,
        SectionKind::Essay,
    ];

    /// Position in render order (0-based).
    pub fn index(self) -> usize {
        match self {
            SectionKind::MultipleChoice => 0,
            SectionKind::TrueFalse => 1,
            SectionKind::ShortAnswer => 2,
            SectionKind::Essay => 3,
        }
    }

    /// Roman numeral used in headings.
    pub fn roman(self) -> &'static str {
        match self {
            SectionKind::MultipleChoice => "I",
            SectionKind::TrueFalse => "II",
            SectionKind::ShortAnswer => "III",
            SectionKind::Essay => "IV",
        }
    }

    /// Whether questions of this section are shuffled and keyed.
    pub fn is_keyed(self) -> bool {
        self != SectionKind::Essay
    }

    /// Whether questions carry four discrete options.
    pub fn has_choices(self) -> bool {
        matches!(self, SectionKind::MultipleChoice | SectionKind::TrueFalse)
    }

    /// Option labels in display order.
    pub fn labels(self) -> [char; 4] {
        match self {
            SectionKind::TrueFalse => ['a', 'b', 'c', 'd'],
            _ => ['A', 'B', 'C', 'D'],
        }
    }

    /// Separator written after a rewritten option label.
    pub fn label_separator(self) -> char {
        match self {
            SectionKind::TrueFalse => ')',
            _ => '.',
        }
    }

    /// Score label recorded in answer keys.
    pub fn score_label(self) -> String {
        match self {
            SectionKind::MultipleChoice => format_points(MULTIPLE_CHOICE_POINTS),
            SectionKind::TrueFalse => TRUE_FALSE_RUBRIC
                .iter()
                .map(|p| format_points(*p))
                .collect::<Vec<_>>()
                .join(" "),
            SectionKind::ShortAnswer => format_points(SHORT_ANSWER_POINTS),
            SectionKind::Essay => String::new(),
        }
    }
}

/// Format points without trailing zeros (`0.25`, `1`).
pub fn format_points(points: f64) -> String {
    let s = format!("{:.2}", points);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// One answer choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    /// Nodes belonging to this choice; the first one carries the label
    pub nodes: Vec<ContentNode>,
    /// Whether the author marked this choice correct
    pub is_correct: bool,
}

impl Choice {
    /// Create a choice from its first node.
    pub fn new(first: ContentNode) -> Self {
        Self {
            nodes: vec![first],
            is_correct: false,
        }
    }

    /// Rendered text of the first node.
    pub fn first_text(&self) -> String {
        self.nodes
            .first()
            .map(ContentNode::plain_text)
            .unwrap_or_default()
    }
}

/// The nodes of one question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionBlock {
    /// Question nodes; after option extraction this is the stem only
    pub nodes: Vec<ContentNode>,
    /// Extracted options (Sections I and II), in final order after shuffling
    pub choices: Vec<Choice>,
    /// Canonical answer string, once known
    pub answer: Option<String>,
}

impl QuestionBlock {
    /// Create a block starting with the question marker node.
    pub fn new(first: ContentNode) -> Self {
        Self {
            nodes: vec![first],
            ..Default::default()
        }
    }

    /// Short excerpt of the first line, used in messages.
    pub fn excerpt(&self) -> String {
        let text = self
            .nodes
            .first()
            .map(ContentNode::plain_text)
            .unwrap_or_default();
        let short: String = text.trim().chars().take(40).collect();
        format!("{}...", short)
    }

    /// All nodes in render order: stem, then any options not yet merged
    /// into it.
    pub fn into_nodes(self) -> Vec<ContentNode> {
        let mut nodes = self.nodes;
        for choice in self.choices {
            nodes.extend(choice.nodes);
        }
        nodes
    }
}

/// A section: header nodes then questions.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Which section this is
    pub kind: SectionKind,
    /// Heading node(s) and any introduction before the first question
    pub header: Vec<ContentNode>,
    /// Positions in `header` of the nodes that carried a section marker
    pub markers: Vec<usize>,
    /// Questions in current order
    pub questions: Vec<QuestionBlock>,
}

impl Section {
    /// Create an empty section.
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            header: Vec::new(),
            markers: Vec::new(),
            questions: Vec::new(),
        }
    }
}

/// The exam body split into its four sections.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedExam {
    /// Sections in render order (I–IV)
    pub sections: [Section; 4],
}

impl SegmentedExam {
    /// Create an exam with four empty sections.
    pub fn new() -> Self {
        Self {
            sections: SectionKind::ALL.map(Section::new),
        }
    }

    /// Get a section.
    pub fn section(&self, kind: SectionKind) -> &Section {
        &self.sections[kind.index()]
    }

    /// Get a section mutably.
    pub fn section_mut(&mut self, kind: SectionKind) -> &mut Section {
        &mut self.sections[kind.index()]
    }

    /// Total number of questions across sections.
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }
}

impl Default for SegmentedExam {
    fn default() -> Self {
        Self::new()
    }
}

/// One keyed question of one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    /// Variant code
    pub variant: String,
    /// 1-based question number across Sections I–III
    pub question: u32,
    /// Canonical answer string
    pub answer: String,
    /// Score label
    pub score: String,
    /// Section of the question
    pub section: SectionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_labels() {
        assert_eq!(SectionKind::MultipleChoice.score_label(), "0.25");
        assert_eq!(SectionKind::TrueFalse.score_label(), "0.1 0.25 0.5 1");
        assert_eq!(SectionKind::ShortAnswer.score_label(), "0.5");
    }

    #[test]
    fn test_section_order() {
        for (i, kind) in SectionKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert!(!SectionKind::Essay.is_keyed());
        assert!(SectionKind::TrueFalse.has_choices());
        assert!(!SectionKind::ShortAnswer.has_choices());
    }

    #[test]
    fn test_excerpt_truncates() {
        let block = QuestionBlock::new(ContentNode::with_text(
            "Câu 1: Một câu hỏi rất dài vượt quá bốn mươi ký tự để kiểm tra",
        ));
        let excerpt = block.excerpt();
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 43);
    }
}
