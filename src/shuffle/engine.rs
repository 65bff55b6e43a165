//! Shuffle engine: extraction, validation, permutation and answers.

use crate::error::{IssueKind, ValidationIssue};
use crate::model::{Choice, QuestionBlock, SectionKind, SegmentedExam, FALSE_MARK, TRUE_MARK};

use super::answer_line::take_answer_line;
use super::choices::extract_choices;
use super::permute::{apply_permutation, Permuter};
use super::relabel::relabel_choices;

/// Answer recorded for a choice question that failed validation.
pub const PLACEHOLDER_CHOICE_ANSWER: &str = "A";

/// Answer recorded for a short-answer question without an answer line.
pub const PLACEHOLDER_SHORT_ANSWER: &str = "...";

/// Shuffle Sections I–III of an exam in place.
///
/// For every question: options are extracted and validated (I, II) or the
/// answer line is captured (III); valid option lists are permuted and
/// relabeled, and the canonical answer is stored on the block. Then the
/// section's question list is permuted. Section IV is left untouched.
///
/// Returns the validation issues found; the exam is only fit for rendering
/// when the list is empty.
pub fn shuffle_exam(exam: &mut SegmentedExam, permuter: &mut dyn Permuter) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for kind in SectionKind::ALL.into_iter().filter(|k| k.is_keyed()) {
        let section = exam.section_mut(kind);
        for question in &mut section.questions {
            let excerpt = question.excerpt();
            if let Err(issue) = shuffle_question(question, kind, permuter) {
                issues.push(ValidationIssue::new(kind, excerpt, issue));
            }
        }

        let order = permuter.permutation(section.questions.len());
        section.questions = apply_permutation(std::mem::take(&mut section.questions), &order);
    }

    issues
}

/// Process one question of a keyed section.
pub fn shuffle_question(
    question: &mut QuestionBlock,
    kind: SectionKind,
    permuter: &mut dyn Permuter,
) -> Result<(), IssueKind> {
    if !kind.has_choices() {
        return match take_answer_line(question) {
            Some(answer) => {
                question.answer = Some(answer);
                Ok(())
            }
            None => {
                question.answer = Some(PLACEHOLDER_SHORT_ANSWER.to_string());
                Err(IssueKind::MissingAnswerLine)
            }
        };
    }

    if let Err(issue) = extract_choices(question, kind) {
        question.answer = Some(PLACEHOLDER_CHOICE_ANSWER.to_string());
        return Err(issue);
    }

    let order = permuter.permutation(question.choices.len());
    question.choices = apply_permutation(std::mem::take(&mut question.choices), &order);
    relabel_choices(&mut question.choices, kind);
    question.answer = Some(canonical_answer(kind, &question.choices));
    Ok(())
}

/// Canonical answer for options in their final order: the label of the
/// correct option (Section I) or one `Đ`/`S` per option (Section II).
pub fn canonical_answer(kind: SectionKind, choices: &[Choice]) -> String {
    match kind {
        SectionKind::TrueFalse => choices
            .iter()
            .map(|c| if c.is_correct { TRUE_MARK } else { FALSE_MARK })
            .collect(),
        _ => choices
            .iter()
            .zip(kind.labels())
            .find(|(c, _)| c.is_correct)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| PLACEHOLDER_CHOICE_ANSWER.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentNode;
    use crate::shuffle::permute::{FixedPermuter, SeededPermuter};

    fn question(lines: &[&str]) -> QuestionBlock {
        QuestionBlock {
            nodes: lines.iter().map(|l| ContentNode::with_text(*l)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_multiple_choice_answer_follows_correct_option() {
        let mut q = question(&["Câu 1: ?", "A. 1", "B. 2*", "C. 3", "D. 4"]);
        let mut permuter = FixedPermuter::new(vec![vec![1, 3, 0, 2]]);
        shuffle_question(&mut q, SectionKind::MultipleChoice, &mut permuter).unwrap();

        assert_eq!(q.answer.as_deref(), Some("A"));
        let texts: Vec<String> = q.choices.iter().map(Choice::first_text).collect();
        assert_eq!(texts, vec!["A. 2", "B. 4", "C. 1", "D. 3"]);
    }

    #[test]
    fn test_true_false_answer_string() {
        let mut q = question(&["Câu 1: Xét", "a) p*", "b) q", "c) r*", "d) s"]);
        let mut permuter = FixedPermuter::new(vec![vec![2, 0, 3, 1]]);
        shuffle_question(&mut q, SectionKind::TrueFalse, &mut permuter).unwrap();
        assert_eq!(q.answer.as_deref(), Some("ĐĐSS"));
        assert_eq!(q.choices[0].first_text(), "a) r");
    }

    #[test]
    fn test_short_answer() {
        let mut q = question(&["Câu 1: ?", "Key: 42"]);
        shuffle_question(&mut q, SectionKind::ShortAnswer, &mut FixedPermuter::identity()).unwrap();
        assert_eq!(q.answer.as_deref(), Some("42"));
        assert_eq!(q.nodes.len(), 1);

        let mut missing = question(&["Câu 2: ?"]);
        let err = shuffle_question(
            &mut missing,
            SectionKind::ShortAnswer,
            &mut FixedPermuter::identity(),
        )
        .unwrap_err();
        assert_eq!(err, IssueKind::MissingAnswerLine);
    }

    #[test]
    fn test_shuffle_exam_collects_issues() {
        let mut exam = SegmentedExam::new();
        let mc = exam.section_mut(SectionKind::MultipleChoice);
        mc.questions.push(question(&["Câu 1: ?", "A. đỏ*", "B. sai", "C. sai", "D. sai"]));
        mc.questions.push(question(&["Câu 2: ?", "A. x", "B. y", "C. z", "D. w"]));

        let issues = shuffle_exam(&mut exam, &mut SeededPermuter::from_seed(1));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingAnswer);
        assert!(issues[0].question.starts_with("Câu 2"));
    }

    #[test]
    fn test_essay_untouched() {
        let mut exam = SegmentedExam::new();
        let essay = exam.section_mut(SectionKind::Essay);
        essay.questions.push(question(&["Câu 1: a"]));
        essay.questions.push(question(&["Câu 2: b"]));
        let before = exam.clone();

        let issues = shuffle_exam(&mut exam, &mut SeededPermuter::from_seed(3));
        assert!(issues.is_empty());
        assert_eq!(exam, before);
    }

    #[test]
    fn test_question_order_permuted() {
        let mut exam = SegmentedExam::new();
        let sa = exam.section_mut(SectionKind::ShortAnswer);
        for i in 1..=3 {
            let (stem, key) = (format!("Câu {}: ?", i), format!("Key: {}", i));
            sa.questions.push(question(&[stem.as_str(), key.as_str()]));
        }
        let mut permuter = FixedPermuter::new(vec![vec![2, 0, 1]]);
        shuffle_exam(&mut exam, &mut permuter);
        let answers: Vec<_> = exam
            .section(SectionKind::ShortAnswer)
            .questions
            .iter()
            .map(|q| q.answer.clone().unwrap())
            .collect();
        assert_eq!(answers, vec!["3", "1", "2"]);
    }
}
