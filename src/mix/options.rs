//! Mixing options and configuration.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::render::{HeaderFields, DEFAULT_COUNTER_WORD};

/// First auto-assigned variant code.
pub const AUTO_CODE_BASE: u32 = 100;

/// Largest number of variants in one batch.
pub const MAX_EXAM_COUNT: u32 = 1000;

/// Options for generating a batch of variants.
///
/// Deserializes from camelCase JSON; the short field names used by older
/// front ends (`soDe`, `maDeList`, ...) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MixOptions {
    /// Number of variants to generate
    #[serde(alias = "soDe", deserialize_with = "count_from_any")]
    pub exam_count: u32,

    /// Codes for the first variants; the rest are numbered automatically
    #[serde(alias = "maDeList")]
    pub variant_codes: Vec<String>,

    /// Restart question labels at 1 in each section
    #[serde(alias = "resetChiSo")]
    pub reset_numbering: bool,

    /// Word used in reset labels
    #[serde(alias = "nhanCau")]
    pub counter_word: String,

    /// Issuing department
    #[serde(alias = "donVi")]
    pub institution: String,

    /// School name
    #[serde(alias = "truong")]
    pub school: String,

    /// Exam title
    #[serde(alias = "kyThi")]
    pub exam_title: String,

    /// Subject
    #[serde(alias = "monThi")]
    pub subject: String,

    /// Duration in minutes
    #[serde(alias = "thoiGian", deserialize_with = "text_from_any")]
    pub duration_minutes: String,

    /// Random seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl MixOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON. Missing keys take their defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use exammix::MixOptions;
    ///
    /// let options = MixOptions::from_json(r#"{"soDe": "3", "maDeList": ["201"]}"#).unwrap();
    /// assert_eq!(options.exam_count, 3);
    /// assert_eq!(options.resolved_codes(), vec!["201", "101", "102"]);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the number of variants.
    pub fn with_count(mut self, count: u32) -> Self {
        self.exam_count = count;
        self
    }

    /// Set the listed variant codes.
    pub fn with_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variant_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable label reset.
    pub fn with_reset_numbering(mut self, reset: bool) -> Self {
        self.reset_numbering = reset;
        self
    }

    /// Keep the template's own question labels.
    pub fn keep_numbering(mut self) -> Self {
        self.reset_numbering = false;
        self
    }

    /// Set the counter word.
    pub fn with_counter_word(mut self, word: impl Into<String>) -> Self {
        self.counter_word = word.into();
        self
    }

    /// Set the header fields.
    pub fn with_header(mut self, fields: HeaderFields) -> Self {
        self.institution = fields.institution;
        self.school = fields.school;
        self.exam_title = fields.exam_title;
        self.subject = fields.subject;
        self.duration_minutes = fields.duration;
        self
    }

    /// Check the options before generating.
    pub fn validate(&self) -> Result<()> {
        if self.exam_count == 0 {
            return Err(Error::Config("exam count must be at least 1".to_string()));
        }
        if self.exam_count > MAX_EXAM_COUNT {
            return Err(Error::Config(format!(
                "exam count must be at most {}, got {}",
                MAX_EXAM_COUNT, self.exam_count
            )));
        }
        let mut seen = HashSet::new();
        for code in &self.variant_codes {
            let code = code.trim();
            if code.is_empty() {
                return Err(Error::Config("variant codes must not be empty".to_string()));
            }
            if !is_safe_code(code) {
                return Err(Error::Config(format!(
                    "variant code {:?} must not contain path separators, '..' or control characters",
                    code
                )));
            }
            if !seen.insert(code) {
                return Err(Error::Config(format!("duplicate variant code: {}", code)));
            }
        }
        Ok(())
    }

    /// Codes of all variants, in generation order.
    ///
    /// Listed codes are used first. Variant `i` past the list gets
    /// `100 + i`, moved up past any code already in use.
    pub fn resolved_codes(&self) -> Vec<String> {
        let mut used: HashSet<String> = HashSet::new();
        let mut codes = Vec::with_capacity(self.exam_count.min(MAX_EXAM_COUNT) as usize);
        for i in 0..self.exam_count {
            let code = match self.variant_codes.get(i as usize) {
                Some(listed) => listed.trim().to_string(),
                None => {
                    let mut candidate = u64::from(AUTO_CODE_BASE) + u64::from(i);
                    while used.contains(&candidate.to_string()) {
                        candidate += 1;
                    }
                    candidate.to_string()
                }
            };
            used.insert(code.clone());
            codes.push(code);
        }
        codes
    }

    /// Code of variant `index`.
    pub fn variant_code(&self, index: usize) -> Option<String> {
        self.resolved_codes().into_iter().nth(index)
    }

    /// Header fields for rendering.
    pub fn header_fields(&self) -> HeaderFields {
        HeaderFields {
            institution: self.institution.clone(),
            school: self.school.clone(),
            exam_title: self.exam_title.clone(),
            subject: self.subject.clone(),
            duration: self.duration_minutes.clone(),
        }
    }
}

impl Default for MixOptions {
    fn default() -> Self {
        Self {
            exam_count: 1,
            variant_codes: vec!["101".to_string()],
            reset_numbering: true,
            counter_word: DEFAULT_COUNTER_WORD.to_string(),
            institution: "LÂM ĐỒNG".to_string(),
            school: "THCS & THPT TUY ĐỨC".to_string(),
            exam_title: "GIỮA KÌ 1".to_string(),
            subject: "TOÁN HỌC".to_string(),
            duration_minutes: "90".to_string(),
            seed: None,
        }
    }
}

/// Codes end up in file names inside the bundle and in `write_dir`.
fn is_safe_code(code: &str) -> bool {
    !code.contains(['/', '\\'])
        && !code.contains("..")
        && !code.chars().any(char::is_control)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Number(u64),
    Text(String),
}

fn count_from_any<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Number(n) => u32::try_from(n).map_err(serde::de::Error::custom),
        TextOrNumber::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn text_from_any<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Number(n) => n.to_string(),
        TextOrNumber::Text(s) => s,
    })
}
