//! Orchestrator: one template in, N variants and the answer keys out.
//!
//! Each variant parses its own copy of the template, so variants share no
//! state and run in parallel. Validation issues from every variant are
//! merged before the batch is accepted or rejected; a rejected batch
//! produces no files.

mod bundle;
mod options;

pub use bundle::{variant_file_name, BundleFile, MixBundle, MixStats, TemplateSummary};
pub use options::{MixOptions, AUTO_CODE_BASE, MAX_EXAM_COUNT};

use rayon::prelude::*;

use crate::error::{Error, Result, ValidationIssue, ValidationReport};
use crate::key::{collect_entries, AnswerKey};
use crate::model::AnswerKeyEntry;
use crate::parser::{ExamParser, ParsedTemplate};
use crate::render::{apply_layouts, render_variant, renumber_exam, HeaderFields};
use crate::shuffle::{shuffle_exam, SeededPermuter};

/// Exam mixer with configurable options.
///
/// # Example
///
/// ```no_run
/// use exammix::{ExamMixer, MixOptions};
///
/// let template = std::fs::read("de_goc.docx").unwrap();
/// let mixer = ExamMixer::new(MixOptions::new().with_count(4).with_seed(7));
/// let bundle = mixer.generate(&template).unwrap();
/// bundle.write_zip("Tap_De_Thi.zip").unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExamMixer {
    options: MixOptions,
    sequential: bool,
}

/// Output of one variant before merging.
struct VariantOutput {
    code: String,
    document: Option<Vec<u8>>,
    entries: Vec<AnswerKeyEntry>,
    issues: Vec<ValidationIssue>,
    stats: MixStats,
}

impl ExamMixer {
    /// Create a mixer with the given options.
    pub fn new(options: MixOptions) -> Self {
        Self {
            options,
            sequential: false,
        }
    }

    /// Enable or disable parallel generation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.sequential = !parallel;
        self
    }

    /// Generate variants one after another.
    pub fn sequential(mut self) -> Self {
        self.sequential = true;
        self
    }

    /// The options in use.
    pub fn options(&self) -> &MixOptions {
        &self.options
    }

    /// Generate every variant and the answer keys.
    ///
    /// # Errors
    ///
    /// `Error::Config` for invalid options, `Error::Validation` with the
    /// de-duplicated issues of all variants when the template is malformed,
    /// and container errors when the template cannot be read.
    pub fn generate(&self, template: &[u8]) -> Result<MixBundle> {
        self.options.validate()?;
        let codes = self.options.resolved_codes();
        let fields = self.options.header_fields();
        log::info!("generating {} variant(s)", codes.len());

        let outputs: Vec<Result<VariantOutput>> = if self.sequential {
            codes
                .iter()
                .enumerate()
                .map(|(i, code)| self.mix_variant(template, i, code, &fields))
                .collect()
        } else {
            codes
                .par_iter()
                .enumerate()
                .map(|(i, code)| self.mix_variant(template, i, code, &fields))
                .collect()
        };
        let outputs = outputs.into_iter().collect::<Result<Vec<_>>>()?;

        let report = ValidationReport::from_issues(
            outputs.iter().flat_map(|o| o.issues.iter().cloned()),
        );
        if !report.is_empty() {
            log::warn!("template rejected: {} issue(s)", report.len());
            return Err(Error::Validation(report));
        }

        let mut files = Vec::with_capacity(outputs.len() + 3);
        let mut answer_key = AnswerKey::new();
        let mut stats = MixStats::new();
        for output in outputs {
            stats.merge(&output.stats);
            if let Some(data) = output.document {
                files.push(BundleFile {
                    name: variant_file_name(&output.code),
                    data,
                });
            }
            answer_key.push(output.code, output.entries);
        }
        for (name, data) in answer_key.to_files()? {
            files.push(BundleFile {
                name: name.to_string(),
                data,
            });
        }

        log::info!(
            "generated {} variant(s), {} keyed question(s) each",
            stats.variants,
            stats.keyed_questions()
        );
        Ok(MixBundle {
            files,
            answer_key,
            stats,
        })
    }

    /// Segment and validate a template without rendering anything.
    pub fn inspect(&self, template: &[u8]) -> Result<TemplateSummary> {
        let parser = ExamParser::from_bytes(template)?;
        let node_count = parser.node_count();
        let ParsedTemplate { mut exam, .. } = parser.parse();

        let mut questions = [0; 4];
        for section in &exam.sections {
            questions[section.kind.index()] = section.questions.len();
        }

        let mut permuter = SeededPermuter::for_variant(self.options.seed, 0);
        let issues = ValidationReport::from_issues(shuffle_exam(&mut exam, &mut permuter)).issues;

        Ok(TemplateSummary {
            node_count,
            questions,
            issues,
        })
    }

    fn mix_variant(
        &self,
        template: &[u8],
        index: usize,
        code: &str,
        fields: &HeaderFields,
    ) -> Result<VariantOutput> {
        let ParsedTemplate {
            mut document,
            mut exam,
        } = ExamParser::from_bytes(template)?.parse();

        let mut stats = MixStats {
            variants: 1,
            ..Default::default()
        };
        stats.count_questions(&exam);

        let mut permuter = SeededPermuter::for_variant(self.options.seed, index);
        let issues = shuffle_exam(&mut exam, &mut permuter);
        if !issues.is_empty() {
            log::debug!("variant {}: {} issue(s)", code, issues.len());
            return Ok(VariantOutput {
                code: code.to_string(),
                document: None,
                entries: Vec::new(),
                issues,
                stats,
            });
        }

        for section in &mut exam.sections {
            stats.layouts.merge(apply_layouts(section));
        }
        renumber_exam(
            &mut exam,
            self.options.reset_numbering,
            &self.options.counter_word,
        );
        let entries = collect_entries(code, &exam);

        render_variant(&mut document, exam, fields, code)?;
        let data = document.into_bytes()?;
        log::debug!("variant {}: {} bytes", code, data.len());

        Ok(VariantOutput {
            code: code.to_string(),
            document: Some(data),
            entries,
            issues: Vec::new(),
            stats,
        })
    }
}
