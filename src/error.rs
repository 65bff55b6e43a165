//! Error types for exammix library.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SectionKind;

/// Result type alias for exammix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while mixing an exam.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a zip-based office container.
    #[error("Unknown file format: not a DOCX container")]
    UnknownFormat,

    /// Error reading or writing a zip archive.
    #[error("Zip container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A required package part is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Malformed XML inside a package part.
    #[error("XML error: {0}")]
    Xml(String),

    /// Error writing an answer-key spreadsheet.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// Invalid mixing options.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The template failed validation; no output was produced.
    #[error("{0}")]
    Validation(ValidationReport),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Check if this error is a template validation failure rather than a
    /// system error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Get the validation issues, if this is a validation failure.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Error::Validation(report) => &report.issues,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// The kind of problem found in a question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    /// The question does not have exactly four options.
    ChoiceCount {
        /// Number of options found
        found: usize,
    },
    /// No option is marked correct.
    MissingAnswer,
    /// More than one option is marked correct where exactly one is allowed.
    MultipleCorrect {
        /// Number of options marked correct
        count: usize,
    },
    /// A short-answer question has no answer line.
    MissingAnswerLine,
}

/// A validation problem tied to one question of the template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Section the question belongs to
    pub section: SectionKind,
    /// Short excerpt of the question's first line
    pub question: String,
    /// What is wrong
    pub kind: IssueKind,
}

impl ValidationIssue {
    /// Create a new issue.
    pub fn new(section: SectionKind, question: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            section,
            question: question.into(),
            kind,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = format!("Section {}", self.section.roman());
        match &self.kind {
            IssueKind::ChoiceCount { found } => write!(
                f,
                "{} - {} format error: expected 4 separate options, found {}",
                section, self.question, found
            ),
            IssueKind::MissingAnswer => write!(
                f,
                "{} - {} missing answer: no option is marked correct",
                section, self.question
            ),
            IssueKind::MultipleCorrect { count } => write!(
                f,
                "{} - {} logic error: {} options marked correct, exactly one allowed",
                section, self.question, count
            ),
            IssueKind::MissingAnswerLine => write!(
                f,
                "{} - {} missing answer line (e.g. \"Key: 123\")",
                section, self.question
            ),
        }
    }
}

/// De-duplicated list of validation issues for a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Issues in first-seen order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Build a report from issues, dropping duplicates but keeping order.
    pub fn from_issues(issues: impl IntoIterator<Item = ValidationIssue>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let issues = issues
            .into_iter()
            .filter(|issue| seen.insert(issue.clone()))
            .collect();
        Self { issues }
    }

    /// Check if there are no issues.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of distinct issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Template validation failed with {} issue(s)",
            self.issues.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(err.to_string(), "Unknown file format: not a DOCX container");

        let err = Error::MissingPart("word/document.xml".into());
        assert_eq!(err.to_string(), "Missing package part: word/document.xml");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_report_deduplicates_in_order() {
        let a = ValidationIssue::new(SectionKind::MultipleChoice, "Câu 2", IssueKind::MissingAnswer);
        let b = ValidationIssue::new(
            SectionKind::ShortAnswer,
            "Câu 1",
            IssueKind::MissingAnswerLine,
        );
        let report = ValidationReport::from_issues(vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(report.issues, vec![a, b]);
    }

    #[test]
    fn test_validation_error_exposes_issues() {
        let issue = ValidationIssue::new(
            SectionKind::MultipleChoice,
            "Câu 3",
            IssueKind::MultipleCorrect { count: 2 },
        );
        let err = Error::Validation(ValidationReport::from_issues(vec![issue]));
        assert!(err.is_validation());
        assert_eq!(err.issues().len(), 1);
        assert!(err.issues()[0].to_string().contains("exactly one allowed"));
    }
}
