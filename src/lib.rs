//! # exammix
//!
//! Randomized exam variant generation from a master DOCX template.
//!
//! One authored template goes in; N shuffled, formatting-preserving
//! variants come out, together with three mutually consistent answer-key
//! spreadsheets.
//!
//! ## Quick Start
//!
//! ```no_run
//! use exammix::{mix_file, MixOptions};
//!
//! fn main() -> exammix::Result<()> {
//!     let options = MixOptions::new().with_count(4).with_codes(["101", "102"]);
//!     let bundle = mix_file("de_goc.docx", options)?;
//!     bundle.write_zip("Tap_De_Thi.zip")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Segmenting**: the body is split into Sections I–IV and question blocks
//!   using `[P1]`..`[P4]` tags, section headings and `Câu N` markers
//! - **Shuffling**: options of Sections I and II and the question order of
//!   Sections I–III are permuted; correctness follows each option
//! - **Rendering**: options are laid out in a row, a grid or a column,
//!   questions are renumbered, and the header, footer and page setup are
//!   applied
//! - **Answer keys**: vertical, horizontal and grading-platform projections
//! - **Parallel processing**: variants are generated with Rayon

pub mod container;
pub mod detect;
pub mod error;
pub mod key;
pub mod mix;
pub mod model;
pub mod parser;
pub mod render;
pub mod shuffle;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, ContainerKind};
pub use error::{Error, IssueKind, Result, ValidationIssue, ValidationReport};
pub use key::{AnswerKey, VariantKey};
pub use mix::{BundleFile, ExamMixer, MixBundle, MixOptions, MixStats, TemplateSummary};
pub use model::{
    AnswerKeyEntry, Choice, ContentNode, ExamDocument, QuestionBlock, Section, SectionKind,
    SegmentedExam,
};
pub use parser::{ExamParser, ParsedTemplate};
pub use render::{HeaderFields, LayoutCounts, OptionLayout};
pub use shuffle::{FixedPermuter, Permuter, SeededPermuter};

use std::io::Read;
use std::path::Path;

/// Generate variants from a template file.
///
/// # Arguments
///
/// * `path` - Path to the template DOCX
/// * `options` - Mixing options
///
/// # Returns
///
/// A `Result` containing the generated `MixBundle`, or
/// `Error::Validation` listing every malformed question.
///
/// # Example
///
/// ```no_run
/// use exammix::{mix_file, MixOptions};
///
/// let bundle = mix_file("de_goc.docx", MixOptions::new().with_count(2)).unwrap();
/// println!("Files: {:?}", bundle.file_names());
/// ```
pub fn mix_file<P: AsRef<Path>>(path: P, options: MixOptions) -> Result<MixBundle> {
    let data = std::fs::read(path)?;
    mix_bytes(&data, options)
}

/// Generate variants from template bytes.
///
/// # Example
///
/// ```no_run
/// use exammix::{mix_bytes, MixOptions};
///
/// let data = std::fs::read("de_goc.docx").unwrap();
/// let bundle = mix_bytes(&data, MixOptions::new().with_seed(42)).unwrap();
/// ```
pub fn mix_bytes(data: &[u8], options: MixOptions) -> Result<MixBundle> {
    ExamMixer::new(options).generate(data)
}

/// Generate variants from a reader.
pub fn mix_reader<R: Read>(mut reader: R, options: MixOptions) -> Result<MixBundle> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    mix_bytes(&data, options)
}

/// Segment and validate a template file without generating anything.
///
/// # Example
///
/// ```no_run
/// use exammix::inspect_file;
///
/// let summary = inspect_file("de_goc.docx").unwrap();
/// for issue in &summary.issues {
///     println!("{}", issue);
/// }
/// ```
pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<TemplateSummary> {
    let data = std::fs::read(path)?;
    ExamMixer::default().inspect(&data)
}

/// Extract the plain text of a template, one line per body node.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let data = std::fs::read(path)?;
    Ok(ExamDocument::from_bytes(&data)?.plain_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_mix_bytes_empty_data() {
        let data: [u8; 0] = [];
        let result = mix_bytes(&data, MixOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_mix_bytes_not_zip() {
        let result = mix_bytes(b"<!DOCTYPE html><html></html>", MixOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_mix_bytes_zip_without_document() {
        let data = container::write_archive([("hello.txt", &b"hi"[..])]).unwrap();
        let result = mix_bytes(&data, MixOptions::default());
        assert!(matches!(result, Err(Error::MissingPart(_))));
    }

    #[test]
    fn test_detect_format_empty_data() {
        let result = detect_format_from_bytes(&[]);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_blank_document() {
        let data = ExamDocument::blank().unwrap().to_bytes().unwrap();
        assert_eq!(
            detect_format_from_bytes(&data).unwrap(),
            ContainerKind::WordDocument
        );
    }

    // ==================== Builder Pattern Tests ====================

    #[test]
    fn test_mixer_builder_chained() {
        let mixer = ExamMixer::new(
            MixOptions::new()
                .with_count(3)
                .with_seed(11)
                .keep_numbering()
                .with_counter_word("Question"),
        )
        .sequential();

        let options = mixer.options();
        assert_eq!(options.exam_count, 3);
        assert_eq!(options.seed, Some(11));
        assert!(!options.reset_numbering);
        assert_eq!(options.counter_word, "Question");
    }

    #[test]
    fn test_mix_reader() {
        let mut doc = ExamDocument::blank().unwrap();
        doc.body_mut().push(ContentNode::with_text("[P4] Tự luận"));
        doc.body_mut().push(ContentNode::with_text("Câu 1: Chứng minh"));
        let data = doc.to_bytes().unwrap();

        let bundle = mix_reader(std::io::Cursor::new(data), MixOptions::default()).unwrap();
        assert_eq!(bundle.files.len(), 4);
        assert_eq!(bundle.stats.keyed_questions(), 0);
    }
}
