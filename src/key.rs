//! Answer-key aggregation and its three spreadsheet projections.
//!
//! Every variant contributes one [`AnswerKeyEntry`] per keyed question. The
//! entries are projected three ways:
//!
//! - vertical: one row per (variant, question)
//! - horizontal: one row per question, one column per variant
//! - grading platform: one row per variant, Section II expanded to four
//!   sub-columns

use std::collections::BTreeMap;

use serde::Serialize;

use crate::container::{KeyCell, KeySheet};
use crate::error::Result;
use crate::model::{
    format_points, AnswerKeyEntry, SectionKind, SegmentedExam, FALSE_MARK, MULTIPLE_CHOICE_POINTS,
    SHORT_ANSWER_POINTS, TRUE_FALSE_RUBRIC,
};

/// File name of the vertical key.
pub const VERTICAL_FILE: &str = "DapAn_ChiTiet_Doc.xlsx";
/// File name of the horizontal key.
pub const HORIZONTAL_FILE: &str = "DapAn_DeTron_Ngang.xlsx";
/// File name of the grading-platform key.
pub const GRADING_FILE: &str = "DapAn_OLM.xlsx";

const VERTICAL_TITLE: &str = "Dap An Doc";
const HORIZONTAL_TITLE: &str = "Dap An Ngang";
const GRADING_TITLE: &str = "Dap An OLM";

const VERTICAL_HEADER: [&str; 4] = ["Mã đề", "Câu hỏi", "Đáp án", "Điểm"];
const HORIZONTAL_QUESTION: &str = "Câu hỏi";
const HORIZONTAL_SCORE: &str = "diem";

const GRADING_BAND_I: &str = "Phần Ⅰ: Mỗi câu 0.25đ";
const GRADING_BAND_II: &str = "Phần Ⅱ: Mỗi câu tối đa 1đ: đúng 1 ý 0.1đ, đúng 2 ý: 0.25đ, đúng 3 ý: 0.5đ, đúng 4 ý: 1đ.";
const GRADING_BAND_III: &str = "Phần Ⅲ: Mỗi câu 0.5 điểm";
const GRADING_SCORE_LABEL: &str = "Điểm";

/// Sub-columns per Section II question in the grading-platform key.
const SUB_ANSWERS: usize = 4;

/// Collect the keyed answers of one processed exam.
///
/// Question numbers form a single counter across Sections I–III, in final
/// order. Questions without a recorded answer get an empty one.
pub fn collect_entries(code: &str, exam: &SegmentedExam) -> Vec<AnswerKeyEntry> {
    let mut entries = Vec::new();
    let mut number = 0u32;
    for section in exam.sections.iter().filter(|s| s.kind.is_keyed()) {
        let score = section.kind.score_label();
        for question in &section.questions {
            number += 1;
            entries.push(AnswerKeyEntry {
                variant: code.to_string(),
                question: number,
                answer: question.answer.clone().unwrap_or_default(),
                score: score.clone(),
                section: section.kind,
            });
        }
    }
    entries
}

/// Answer entries of one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantKey {
    /// Variant code
    pub code: String,
    /// Entries in question order
    pub entries: Vec<AnswerKeyEntry>,
}

impl VariantKey {
    /// Number of entries in a section.
    pub fn section_count(&self, kind: SectionKind) -> usize {
        self.entries.iter().filter(|e| e.section == kind).count()
    }
}

/// Answer key of a whole batch, variants in generation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerKey {
    /// Per-variant entries
    pub variants: Vec<VariantKey>,
}

impl AnswerKey {
    /// Create an empty key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variant's entries.
    pub fn push(&mut self, code: impl Into<String>, entries: Vec<AnswerKeyEntry>) {
        self.variants.push(VariantKey {
            code: code.into(),
            entries,
        });
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Check if the key has no variants.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Look up the answer to question `question` of variant `code`.
    pub fn answer(&self, code: &str, question: u32) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.code == code)
            .and_then(|v| v.entries.iter().find(|e| e.question == question))
            .map(|e| e.answer.as_str())
    }

    /// Vertical projection: `[Mã đề, Câu hỏi, Đáp án, Điểm]`, one row per
    /// question per variant.
    pub fn vertical(&self) -> KeySheet {
        let mut sheet = KeySheet::new(VERTICAL_TITLE);
        sheet.push_row(VERTICAL_HEADER.iter().map(|h| KeyCell::from(*h)).collect());
        for variant in &self.variants {
            for entry in &variant.entries {
                sheet.push_row(vec![
                    KeyCell::text(&variant.code),
                    KeyCell::from(entry.question),
                    KeyCell::text(&entry.answer),
                    KeyCell::text(&entry.score),
                ]);
            }
        }
        sheet
    }

    /// Horizontal projection: `[Câu hỏi, <code>..., diem]`, one row per
    /// question index. The score comes from the first variant; variants with
    /// fewer questions leave their cell empty.
    pub fn horizontal(&self) -> KeySheet {
        let mut sheet = KeySheet::new(HORIZONTAL_TITLE);
        let mut header = vec![KeyCell::from(HORIZONTAL_QUESTION)];
        header.extend(self.variants.iter().map(|v| KeyCell::text(&v.code)));
        header.push(KeyCell::from(HORIZONTAL_SCORE));
        sheet.push_row(header);

        let rows = self
            .variants
            .iter()
            .map(|v| v.entries.len())
            .max()
            .unwrap_or(0);
        for index in 0..rows {
            let mut row = vec![KeyCell::text((index + 1).to_string())];
            for variant in &self.variants {
                row.push(
                    variant
                        .entries
                        .get(index)
                        .map_or(KeyCell::Empty, |e| KeyCell::text(&e.answer)),
                );
            }
            row.push(
                self.variants
                    .first()
                    .and_then(|v| v.entries.get(index))
                    .map_or(KeyCell::Empty, |e| KeyCell::text(&e.score)),
            );
            sheet.push_row(row);
        }
        sheet
    }

    /// Grading-platform projection.
    ///
    /// Three header rows (section bands, sub-labels, per-column score)
    /// followed by one row per variant. Section counts come from the first
    /// variant. Section II answers are padded with `S` and cut to four
    /// characters, one per sub-column.
    pub fn grading_platform(&self) -> KeySheet {
        let mut sheet = KeySheet::new(GRADING_TITLE);
        let Some(first) = self.variants.first() else {
            return sheet;
        };
        let counts = [
            first.section_count(SectionKind::MultipleChoice),
            first.section_count(SectionKind::TrueFalse),
            first.section_count(SectionKind::ShortAnswer),
        ];

        let mut bands = vec![KeyCell::Empty];
        let mut labels = vec![KeyCell::Empty];
        let mut scores = vec![KeyCell::from(GRADING_SCORE_LABEL)];

        let band = |row: &mut Vec<KeyCell>, label: &str, width: usize| {
            if width > 0 {
                row.push(KeyCell::from(label));
                row.extend(std::iter::repeat(KeyCell::Empty).take(width - 1));
            }
        };
        band(&mut bands, GRADING_BAND_I, counts[0]);
        band(&mut bands, GRADING_BAND_II, counts[1] * SUB_ANSWERS);
        band(&mut bands, GRADING_BAND_III, counts[2]);

        for i in 1..=counts[0] {
            labels.push(KeyCell::text(i.to_string()));
            scores.push(KeyCell::text(format_points(MULTIPLE_CHOICE_POINTS)));
        }
        for i in 1..=counts[1] {
            for sub in SectionKind::TrueFalse.labels() {
                labels.push(KeyCell::text(format!("{}{}", i, sub)));
                scores.push(KeyCell::text(format_points(TRUE_FALSE_RUBRIC[1])));
            }
        }
        for i in 1..=counts[2] {
            labels.push(KeyCell::text(format!("Câu {}", i)));
            scores.push(KeyCell::text(format_points(SHORT_ANSWER_POINTS)));
        }

        sheet.push_row(bands);
        sheet.push_row(labels);
        sheet.push_row(scores);

        for variant in &self.variants {
            let mut row = vec![KeyCell::text(&variant.code)];
            for entry in &variant.entries {
                match entry.section {
                    SectionKind::TrueFalse => {
                        row.extend(expand_true_false(&entry.answer).into_iter().map(KeyCell::from));
                    }
                    SectionKind::Essay => {}
                    _ => row.push(KeyCell::text(&entry.answer)),
                }
            }
            sheet.push_row(row);
        }
        sheet
    }

    /// The three key files, named as they appear in the bundle.
    pub fn to_files(&self) -> Result<Vec<(&'static str, Vec<u8>)>> {
        Ok(vec![
            (VERTICAL_FILE, self.vertical().to_xlsx()?),
            (HORIZONTAL_FILE, self.horizontal().to_xlsx()?),
            (GRADING_FILE, self.grading_platform().to_xlsx()?),
        ])
    }
}

/// Pad a Section II answer with `S` and cut it to four single-character
/// strings.
pub fn expand_true_false(answer: &str) -> Vec<String> {
    answer
        .trim()
        .chars()
        .chain(std::iter::repeat(FALSE_MARK))
        .take(SUB_ANSWERS)
        .map(String::from)
        .collect()
}

/// Read a vertical sheet back into `(variant, question) -> answer`.
pub fn answers_from_vertical(sheet: &KeySheet) -> BTreeMap<(String, u32), String> {
    sheet
        .rows
        .iter()
        .skip(1)
        .filter_map(|row| {
            let code = row.first()?.display();
            let question = row.get(1)?.display().parse().ok()?;
            let answer = row.get(2)?.display();
            Some(((code, question), answer))
        })
        .collect()
}

/// Read a horizontal sheet back into `(variant, question) -> answer`.
/// Empty cells are skipped.
pub fn answers_from_horizontal(sheet: &KeySheet) -> BTreeMap<(String, u32), String> {
    let Some(header) = sheet.rows.first() else {
        return BTreeMap::new();
    };
    // first column is the question, last one the score
    let codes: Vec<String> = header
        .iter()
        .skip(1)
        .take(header.len().saturating_sub(2))
        .map(KeyCell::display)
        .collect();

    let mut answers = BTreeMap::new();
    for row in sheet.rows.iter().skip(1) {
        let Some(question) = row.first().and_then(|c| c.display().parse::<u32>().ok()) else {
            continue;
        };
        for (i, code) in codes.iter().enumerate() {
            if let Some(cell) = row.get(i + 1) {
                let answer = cell.display();
                if !answer.is_empty() {
                    answers.insert((code.clone(), question), answer);
                }
            }
        }
    }
    answers
}
