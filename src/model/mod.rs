//! Document model types for exam content.
//!
//! This module defines the in-memory representation the pipeline works on:
//! an owned XML tree for package parts, body-level content nodes, the parsed
//! document, and the exam structure built from it.

mod document;
mod exam;
mod node;
pub mod schema;
mod xml;

pub use document::ExamDocument;
pub use exam::{
    format_points, AnswerKeyEntry, Choice, QuestionBlock, Section, SectionKind, SegmentedExam,
    FALSE_MARK, MULTIPLE_CHOICE_POINTS, SHORT_ANSWER_POINTS, TRUE_FALSE_RUBRIC, TRUE_MARK,
};
pub use node::{
    char_span, element_text, is_text_element, paragraph_properties_mut, run_properties_mut,
    run_text, set_bold, set_run_text, text_run, ContentNode, NodeKind,
};
pub use xml::{Element, XmlNode};
