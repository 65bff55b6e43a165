//! Template parsing module.

mod exam_parser;
pub mod patterns;
mod segmenter;

pub use exam_parser::{ExamParser, ParsedTemplate};
pub use segmenter::segment;
