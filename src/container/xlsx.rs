//! Spreadsheet output for answer-key grids.

use rust_xlsxwriter::Workbook;
use serde::Serialize;

use crate::error::Result;

/// One spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeyCell {
    /// A string cell
    Text(String),
    /// A numeric cell
    Number(f64),
    /// No value
    Empty,
}

impl KeyCell {
    /// Create a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        KeyCell::Text(value.into())
    }

    /// Cell content as displayed.
    pub fn display(&self) -> String {
        match self {
            KeyCell::Text(s) => s.clone(),
            KeyCell::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            KeyCell::Number(n) => n.to_string(),
            KeyCell::Empty => String::new(),
        }
    }
}

impl From<&str> for KeyCell {
    fn from(value: &str) -> Self {
        KeyCell::Text(value.to_string())
    }
}

impl From<String> for KeyCell {
    fn from(value: String) -> Self {
        KeyCell::Text(value)
    }
}

impl From<u32> for KeyCell {
    fn from(value: u32) -> Self {
        KeyCell::Number(f64::from(value))
    }
}

/// A single-worksheet grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeySheet {
    /// Worksheet name
    pub title: String,
    /// Rows from the top, each a list of cells from column A
    pub rows: Vec<Vec<KeyCell>>,
}

impl KeySheet {
    /// Create an empty sheet.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Vec<KeyCell>) {
        self.rows.push(row);
    }

    /// Get a cell by zero-based row and column.
    pub fn cell(&self, row: usize, col: usize) -> Option<&KeyCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Write the sheet as an xlsx workbook.
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.title)?;

        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    KeyCell::Text(s) if !s.is_empty() => {
                        worksheet.write_string(r, c, s)?;
                    }
                    KeyCell::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    KeyCell::Text(_) | KeyCell::Empty => {}
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::read_archive;

    #[test]
    fn test_cell_display() {
        assert_eq!(KeyCell::from(3u32).display(), "3");
        assert_eq!(KeyCell::Number(0.25).display(), "0.25");
        assert_eq!(KeyCell::Empty.display(), "");
        assert_eq!(KeyCell::from("Đ").display(), "Đ");
    }

    #[test]
    fn test_to_xlsx_is_workbook() {
        let mut sheet = KeySheet::new("Dap An Doc");
        sheet.push_row(vec!["Mã đề".into(), "Câu hỏi".into()]);
        sheet.push_row(vec!["101".into(), 1u32.into()]);

        let bytes = sheet.to_xlsx().unwrap();
        let entries = read_archive(&bytes).unwrap();
        assert!(entries.iter().any(|(name, _)| name == "xl/workbook.xml"));
        let workbook = entries
            .iter()
            .find(|(name, _)| name == "xl/workbook.xml")
            .map(|(_, data)| String::from_utf8_lossy(data).into_owned())
            .unwrap();
        assert!(workbook.contains("Dap An Doc"));
    }
}
