//! Generated output: variant documents, answer keys and statistics.

use std::path::Path;

use serde::Serialize;

use crate::container::write_archive;
use crate::error::{Result, ValidationIssue};
use crate::key::AnswerKey;
use crate::model::{SectionKind, SegmentedExam};
use crate::render::LayoutCounts;

/// Name of a variant document inside the bundle.
pub fn variant_file_name(code: &str) -> String {
    format!("De_Ma_{}.docx", code)
}

/// One output file.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleFile {
    /// File name inside the bundle
    pub name: String,
    /// File content
    pub data: Vec<u8>,
}

/// Statistics collected while generating a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MixStats {
    /// Number of variants generated
    pub variants: usize,

    /// Questions per section (I–IV) of one variant
    pub questions: [usize; 4],

    /// Option layouts chosen, over all variants
    pub layouts: LayoutCounts,
}

impl MixStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the section sizes of an exam.
    pub fn count_questions(&mut self, exam: &SegmentedExam) {
        for section in &exam.sections {
            self.questions[section.kind.index()] = section.questions.len();
        }
    }

    /// Questions in one section.
    pub fn section_questions(&self, kind: SectionKind) -> usize {
        self.questions[kind.index()]
    }

    /// Keyed questions per variant (Sections I–III).
    pub fn keyed_questions(&self) -> usize {
        SectionKind::ALL
            .iter()
            .filter(|k| k.is_keyed())
            .map(|k| self.section_questions(*k))
            .sum()
    }

    /// Merge another variant's statistics into this one.
    pub fn merge(&mut self, other: &MixStats) {
        self.variants += other.variants;
        self.layouts.merge(other.layouts);
        if self.questions == [0; 4] {
            self.questions = other.questions;
        }
    }
}

/// Result of a successful batch.
#[derive(Debug, Clone)]
pub struct MixBundle {
    /// Variant documents followed by the three key spreadsheets
    pub files: Vec<BundleFile>,

    /// Aggregated answer key
    pub answer_key: AnswerKey,

    /// Generation statistics
    pub stats: MixStats,
}

impl MixBundle {
    /// Get a file by name.
    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.data.as_slice())
    }

    /// File names in bundle order.
    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    /// Pack every file into one zip archive.
    pub fn to_zip(&self) -> Result<Vec<u8>> {
        write_archive(self.files.iter().map(|f| (f.name.as_str(), f.data.as_slice())))
    }

    /// Write the zip archive to a file.
    pub fn write_zip<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_zip()?)?;
        Ok(())
    }

    /// Write every file into a directory, creating it if needed.
    pub fn write_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for file in &self.files {
            std::fs::write(dir.join(&file.name), &file.data)?;
        }
        Ok(())
    }
}

/// Result of inspecting a template without rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateSummary {
    /// Body nodes in the template
    pub node_count: usize,

    /// Questions per section (I–IV)
    pub questions: [usize; 4],

    /// Validation issues found
    pub issues: Vec<ValidationIssue>,
}

impl TemplateSummary {
    /// Check if the template would generate without issues.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}
