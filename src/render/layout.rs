//! Option layout selection and borderless option tables.

use serde::Serialize;

use crate::model::schema::{CELL_PROPERTIES, TABLE_BORDERS, TABLE_PROPERTIES};
use crate::model::{
    paragraph_properties_mut, Choice, ContentNode, Element, QuestionBlock, Section, SectionKind,
};

/// Longest option that still fits four to a row.
pub const ROW_MAX_CHARS: usize = 12;
/// Longest option that still fits a 2×2 grid.
pub const GRID_MAX_CHARS: usize = 40;
/// Longest option with an embedded object that still fits a 2×2 grid.
pub const COMPLEX_GRID_MAX_CHARS: usize = 20;

/// Text width of the page in twentieths of a point (17.5 cm).
pub const TEXT_WIDTH_TWIPS: u32 = 9921;

/// Full table width in fiftieths of a percent.
const FULL_WIDTH_PCT: u32 = 5000;

/// Visual arrangement of a question's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionLayout {
    /// One option per line
    SingleColumn,
    /// Two rows of two
    Grid,
    /// All four on one row
    Row,
}

impl OptionLayout {
    /// Table rows and columns, or `None` for a single column.
    pub fn dimensions(self) -> Option<(usize, usize)> {
        match self {
            OptionLayout::SingleColumn => None,
            OptionLayout::Grid => Some((2, 2)),
            OptionLayout::Row => Some((1, 4)),
        }
    }
}

/// Number of questions laid out each way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayoutCounts {
    /// Questions with one option per line
    pub single_column: usize,
    /// Questions with a 2×2 grid
    pub grid: usize,
    /// Questions with a 1×4 row
    pub row: usize,
}

impl LayoutCounts {
    /// Count one layout decision.
    pub fn record(&mut self, layout: OptionLayout) {
        match layout {
            OptionLayout::SingleColumn => self.single_column += 1,
            OptionLayout::Grid => self.grid += 1,
            OptionLayout::Row => self.row += 1,
        }
    }

    /// Add another set of counts.
    pub fn merge(&mut self, other: LayoutCounts) {
        self.single_column += other.single_column;
        self.grid += other.grid;
        self.row += other.row;
    }

    /// Total decisions counted.
    pub fn total(&self) -> usize {
        self.single_column + self.grid + self.row
    }
}

/// Choose the layout for a question's options.
///
/// Multi-node options, options with a line break, and all of Section II
/// stay in a single column. Otherwise the longest option decides: short
/// ones go four to a row, medium ones into a 2×2 grid. An embedded object
/// anywhere lowers the grid threshold and rules out the row.
pub fn select_layout(kind: SectionKind, choices: &[Choice]) -> OptionLayout {
    let mergeable = choices.iter().all(|c| c.nodes.len() == 1);
    let has_break = choices
        .iter()
        .any(|c| c.nodes.iter().any(ContentNode::has_line_break));
    if kind == SectionKind::TrueFalse || !mergeable || has_break || choices.is_empty() {
        return OptionLayout::SingleColumn;
    }

    let max_len = choices
        .iter()
        .map(|c| c.first_text().chars().count())
        .max()
        .unwrap_or(0);
    let has_complex = choices
        .iter()
        .any(|c| c.nodes.first().is_some_and(ContentNode::has_embedded_object));

    if has_complex {
        if max_len <= COMPLEX_GRID_MAX_CHARS {
            OptionLayout::Grid
        } else {
            OptionLayout::SingleColumn
        }
    } else if max_len <= ROW_MAX_CHARS {
        OptionLayout::Row
    } else if max_len <= GRID_MAX_CHARS {
        OptionLayout::Grid
    } else {
        OptionLayout::SingleColumn
    }
}

/// Move a question's options into its node list using `layout`.
pub fn arrange_options(question: &mut QuestionBlock, layout: OptionLayout) {
    let choices = std::mem::take(&mut question.choices);
    match layout.dimensions() {
        None => {
            for choice in choices {
                question.nodes.extend(choice.nodes);
            }
        }
        Some((rows, cols)) => {
            let table = option_table(rows, cols, choices);
            question.nodes.push(ContentNode::new(table));
        }
    }
}

/// Lay out every question of a choice section. Questions whose options were
/// not extracted are left alone.
pub fn apply_layouts(section: &mut Section) -> LayoutCounts {
    let mut counts = LayoutCounts::default();
    if !section.kind.has_choices() {
        return counts;
    }
    for question in &mut section.questions {
        if question.choices.is_empty() {
            continue;
        }
        let layout = select_layout(section.kind, &question.choices);
        log::debug!("{:?} layout for {}", layout, question.excerpt());
        arrange_options(question, layout);
        counts.record(layout);
    }
    counts
}

/// Build a borderless full-width table and move the options into its cells,
/// left to right and top to bottom.
pub fn option_table(rows: usize, cols: usize, choices: Vec<Choice>) -> Element {
    let mut tbl_pr = Element::new("w:tblPr");
    tbl_pr.insert_ordered(
        Element::new("w:tblW")
            .with_attr("w:w", FULL_WIDTH_PCT.to_string())
            .with_attr("w:type", "pct"),
        TABLE_PROPERTIES,
    );
    tbl_pr.insert_ordered(
        Element::new("w:tblLayout").with_attr("w:type", "fixed"),
        TABLE_PROPERTIES,
    );
    tbl_pr.insert_ordered(no_borders(), TABLE_PROPERTIES);

    let col_twips = TEXT_WIDTH_TWIPS / cols as u32;
    let mut grid = Element::new("w:tblGrid");
    for _ in 0..cols {
        grid = grid.with_child(Element::new("w:gridCol").with_attr("w:w", col_twips.to_string()));
    }

    let mut table = Element::new("w:tbl").with_child(tbl_pr).with_child(grid);
    let mut choices = choices.into_iter();
    for _ in 0..rows {
        let mut row = Element::new("w:tr");
        for _ in 0..cols {
            let nodes = choices.next().map(|c| c.nodes).unwrap_or_default();
            row = row.with_child(option_cell(cols, nodes));
        }
        table = table.with_child(row);
    }
    table
}

fn no_borders() -> Element {
    TABLE_BORDERS.iter().fold(Element::new("w:tblBorders"), |borders, edge| {
        borders.with_child(Element::new(format!("w:{}", edge)).with_attr("w:val", "none"))
    })
}

fn option_cell(cols: usize, nodes: Vec<ContentNode>) -> Element {
    let mut tc_pr = Element::new("w:tcPr");
    tc_pr.insert_ordered(
        Element::new("w:tcW")
            .with_attr("w:w", (FULL_WIDTH_PCT / cols as u32).to_string())
            .with_attr("w:type", "pct"),
        CELL_PROPERTIES,
    );

    let mut cell = Element::new("w:tc").with_child(tc_pr);
    for node in nodes {
        let mut element = node.into_element();
        if element.is("w:p") {
            clear_paragraph_layout(&mut element);
        }
        cell = cell.with_child(element);
    }
    // a cell must end with a paragraph
    if !cell.children.last().and_then(|n| n.as_element()).is_some_and(|e| e.is("w:p")) {
        cell = cell.with_child(Element::new("w:p"));
    }
    cell
}

/// Drop indentation, alignment and tab characters carried over from the
/// stem's formatting.
fn clear_paragraph_layout(paragraph: &mut Element) {
    let ppr = paragraph_properties_mut(paragraph);
    ppr.remove_children("w:ind");
    ppr.remove_children("w:jc");
    if ppr.children.is_empty() {
        paragraph.remove_children("w:pPr");
    }
    let mut runs = Vec::new();
    paragraph.collect_mut(&|e| e.is("w:r"), &mut runs);
    for run in runs {
        run.remove_children("w:tab");
    }
}
