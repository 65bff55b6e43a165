//! Recognition patterns for markers in exam text.
//!
//! Matching runs on flattened node text. Detection normalizes to NFC first;
//! patterns whose match length feeds a character deletion run on the raw
//! text and accept both composed and decomposed spellings instead.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::SectionKind;

/// Explicit section tag `[P1]`..`[P4]` and the whitespace after it.
pub static SECTION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[P([1-4])\]\s*").expect("valid regex"));

/// Section heading at the start of a line, optionally after a tag.
pub static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\[P[1-4]\]\s*)?(?:PHẦN|SECTION|PART)\s+(IV|III|II|I|4|3|2|1|MỘT|HAI|BA|BỐN|ONE|TWO|THREE|FOUR)\b",
    )
    .expect("valid regex")
});

/// Section keyword as a whole word anywhere in a line.
pub static SECTION_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:PHẦN|SECTION|PART)\b").expect("valid regex"));

/// Start of a question block.
pub static QUESTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:Câu|Question)\s+(\d+)(?:[:.]|\s|$)").expect("valid regex")
});

/// Question label on raw text: leading space, the label, its separator and
/// the space after it.
pub static QUESTION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\s*)((?:C(?:â|a\x{0302})u|Question)\s+(\d+)\s*([:.])?)\s*")
        .expect("valid regex")
});

/// End-of-exam line (`HẾT`, `---Hết---`, `THE END.`).
pub static END_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-*\s*(?:HẾT|THE\s+END)\s*-*\s*\.?$").expect("valid regex")
});

/// Option label at the start of a line, optionally preceded by a star, plus
/// the whitespace after it. Labels are matched case-insensitively in both
/// option sections.
pub static OPTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*[*∗]?\s*([A-D])[.)]\s*").expect("valid regex"));

/// Inline correctness markers.
pub static CORRECT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[*∗]|\(\s*(?:đ(?:úng)?|correct)\s*\)").expect("valid regex")
});

/// Section III answer line.
pub static ANSWER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:Đáp\s*án|ĐS|Key|Answer)\s*[:=]\s*(.*)$").expect("valid regex")
});

/// Run colors that mark the correct option.
pub const CORRECT_COLORS: &[&str] = &["ff0000", "red", "c00000", "e36c09", "e52237"];

/// Normalize text to NFC.
pub fn normalize(text: &str) -> String {
    text.nfc().collect()
}

/// Detect a section marker: an explicit tag anywhere, or a heading.
pub fn section_marker(text: &str) -> Option<SectionKind> {
    let text = normalize(text);
    if let Some(caps) = SECTION_TAG.captures(&text) {
        return section_from_numeral(&caps[1]);
    }
    SECTION_HEADING
        .captures(&text)
        .and_then(|caps| section_from_numeral(&caps[1]))
}

fn section_from_numeral(numeral: &str) -> Option<SectionKind> {
    match numeral.to_uppercase().as_str() {
        "I" | "1" | "MỘT" | "ONE" => Some(SectionKind::MultipleChoice),
        "II" | "2" | "HAI" | "TWO" => Some(SectionKind::TrueFalse),
        "III" | "3" | "BA" | "THREE" => Some(SectionKind::ShortAnswer),
        "IV" | "4" | "BỐN" | "FOUR" => Some(SectionKind::Essay),
        _ => None,
    }
}

/// Check if a line is a section heading.
pub fn is_section_heading(text: &str) -> bool {
    SECTION_HEADING.is_match(&normalize(text.trim()))
}

/// Check if a line mentions the section keyword.
pub fn has_section_keyword(text: &str) -> bool {
    SECTION_KEYWORD.is_match(&normalize(text))
}

/// Check if a line starts a question.
pub fn is_question_start(text: &str) -> bool {
    QUESTION_START.is_match(&normalize(text))
}

/// Check if a line is the end-of-exam marker.
pub fn is_end_marker(text: &str) -> bool {
    END_MARKER.is_match(&normalize(text.trim()))
}

/// Check if a line starts an option.
pub fn is_option_start(text: &str) -> bool {
    OPTION_LABEL.is_match(text)
}

/// Capture a Section III answer from a line.
pub fn answer_line(text: &str) -> Option<String> {
    let text = normalize(text.trim());
    ANSWER_LINE
        .captures(&text)
        .map(|caps| caps[1].trim().to_string())
}
