//! Exam header and closing blocks.

use serde::{Deserialize, Serialize};

use crate::model::schema::{PARAGRAPH_PROPERTIES, RUN_PROPERTIES, TABLE_BORDERS, TABLE_PROPERTIES};
use crate::model::{run_properties_mut, text_run, ContentNode, Element};

/// Header column widths in twentieths of a point (8 cm and 9.5 cm).
const HEADER_COLUMNS: [u32; 2] = [4536, 5386];

/// Width of the variant-code box (4.5 cm).
const CODE_BOX_WIDTH: u32 = 2551;

/// Variant code font size in half-points (14 pt).
pub const CODE_FONT_HALF_POINTS: u32 = 28;

const DIVIDER: &str = "-----------------------";
const CANDIDATE_LINE: &str = "Họ tên :.................................................................................. Số báo danh : ..............................................";
const RULE_LINE: &str = "____________________________________________________________________________________";

/// Text placed in the exam header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFields {
    /// Issuing department, after "SỞ GD&ĐT"
    pub institution: String,
    /// School name, after "TRƯỜNG"
    pub school: String,
    /// Exam title, after "KIỂM TRA"
    pub exam_title: String,
    /// Subject, after "MÔN THI:"
    pub subject: String,
    /// Duration in minutes
    pub duration: String,
}

/// Word field kinds used in headers and footers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Current page number
    Page,
    /// Total page count
    NumPages,
}

impl FieldKind {
    fn instruction(self) -> &'static str {
        match self {
            FieldKind::Page => " PAGE \\* MERGEFORMAT ",
            FieldKind::NumPages => " NUMPAGES \\* MERGEFORMAT ",
        }
    }
}

/// Runs of a complex field: begin, instruction, separator, placeholder
/// result and end.
pub fn field_runs(kind: FieldKind) -> Vec<Element> {
    let fld_char = |ty: &str| {
        Element::new("w:r").with_child(Element::new("w:fldChar").with_attr("w:fldCharType", ty))
    };
    vec![
        fld_char("begin"),
        Element::new("w:r").with_child(
            Element::new("w:instrText")
                .with_attr("xml:space", "preserve")
                .with_text(kind.instruction()),
        ),
        fld_char("separate"),
        text_run("1", false),
        fld_char("end"),
    ]
}

/// Build the header block for one variant: institution/title table with the
/// boxed variant code, a blank line, the candidate line and a rule.
pub fn header_block(fields: &HeaderFields, code: &str) -> Vec<ContentNode> {
    let mut left = Vec::new();
    left.push(text_run(format!("SỞ GD&ĐT {}", fields.institution.to_uppercase()), true));
    left.push(line_break());
    left.push(text_run(format!("TRƯỜNG {}", fields.school.to_uppercase()), true));
    left.push(line_break());
    left.push(text_run(DIVIDER, true));
    left.push(line_break());
    left.push(text_run("Đề chính thức", false));
    left.push(line_break());
    left.push(italic(text_run("(Đề thi có ", false)));
    left.extend(field_runs(FieldKind::NumPages));
    left.push(italic(text_run(" trang)", false)));

    let right = vec![
        text_run(format!("KIỂM TRA {}", fields.exam_title.to_uppercase()), true),
        line_break(),
        text_run(format!("MÔN THI: {}", fields.subject.to_uppercase()), true),
        line_break(),
        italic(text_run(format!("Thời gian làm bài : {} phút", fields.duration), true)),
    ];

    let left_cell = cell(HEADER_COLUMNS[0], vec![paragraph(left, true, Some((0, 0)))]);
    let right_cell = cell(
        HEADER_COLUMNS[1],
        vec![
            paragraph(right, true, Some((0, 0))),
            code_box(code),
            Element::new("w:p"),
        ],
    );

    let table = Element::new("w:tbl")
        .with_child(table_properties(borders("none"), None))
        .with_child(grid(&HEADER_COLUMNS))
        .with_child(Element::new("w:tr").with_child(left_cell).with_child(right_cell));

    vec![
        ContentNode::new(table),
        ContentNode::paragraph(),
        ContentNode::new(paragraph(vec![text_run(CANDIDATE_LINE, false)], false, None)),
        ContentNode::new(paragraph(vec![text_run(RULE_LINE, true)], true, Some((0, 240)))),
    ]
}

/// Build the closing block: a blank line, the end marker and the two
/// proctoring notes.
pub fn closing_block() -> Vec<ContentNode> {
    vec![
        ContentNode::paragraph(),
        ContentNode::new(paragraph(vec![text_run("---Hết---", true)], true, None)),
        ContentNode::new(paragraph(
            vec![italic(text_run("- Cán bộ coi thi không giải thích gì thêm.", false))],
            true,
            None,
        )),
        ContentNode::new(paragraph(
            vec![italic(text_run("- Học sinh không được sử dụng tài liệu.", false))],
            true,
            None,
        )),
    ]
}

/// Bordered single-cell table holding the variant code.
fn code_box(code: &str) -> Element {
    let mut label = text_run(format!("Mã đề: {}", code), true);
    let rpr = run_properties_mut(&mut label);
    for name in ["w:sz", "w:szCs"] {
        rpr.insert_ordered(
            Element::new(name).with_attr("w:val", CODE_FONT_HALF_POINTS.to_string()),
            RUN_PROPERTIES,
        );
    }

    Element::new("w:tbl")
        .with_child(table_properties(
            borders("single"),
            Some(Element::new("w:jc").with_attr("w:val", "center")),
        ))
        .with_child(grid(&[CODE_BOX_WIDTH]))
        .with_child(Element::new("w:tr").with_child(cell(
            CODE_BOX_WIDTH,
            vec![paragraph(vec![label], true, Some((120, 120)))],
        )))
}

fn table_properties(borders: Element, jc: Option<Element>) -> Element {
    let mut tbl_pr = Element::new("w:tblPr");
    tbl_pr.insert_ordered(
        Element::new("w:tblW").with_attr("w:w", "0").with_attr("w:type", "auto"),
        TABLE_PROPERTIES,
    );
    if let Some(jc) = jc {
        tbl_pr.insert_ordered(jc, TABLE_PROPERTIES);
    }
    tbl_pr.insert_ordered(borders, TABLE_PROPERTIES);
    tbl_pr.insert_ordered(
        Element::new("w:tblLayout").with_attr("w:type", "fixed"),
        TABLE_PROPERTIES,
    );
    tbl_pr
}

fn borders(style: &str) -> Element {
    TABLE_BORDERS.iter().fold(Element::new("w:tblBorders"), |acc, edge| {
        let mut border = Element::new(format!("w:{}", edge)).with_attr("w:val", style);
        if style != "none" {
            border = border
                .with_attr("w:sz", "4")
                .with_attr("w:space", "0")
                .with_attr("w:color", "auto");
        }
        acc.with_child(border)
    })
}

fn grid(widths: &[u32]) -> Element {
    widths.iter().fold(Element::new("w:tblGrid"), |acc, w| {
        acc.with_child(Element::new("w:gridCol").with_attr("w:w", w.to_string()))
    })
}

fn cell(width: u32, content: Vec<Element>) -> Element {
    let tc_pr = Element::new("w:tcPr").with_child(
        Element::new("w:tcW")
            .with_attr("w:w", width.to_string())
            .with_attr("w:type", "dxa"),
    );
    content
        .into_iter()
        .fold(Element::new("w:tc").with_child(tc_pr), |acc, e| acc.with_child(e))
}

/// Paragraph of runs, optionally centered, with optional before/after
/// spacing in twentieths of a point.
fn paragraph(runs: Vec<Element>, center: bool, spacing: Option<(u32, u32)>) -> Element {
    let mut ppr = Element::new("w:pPr");
    if let Some((before, after)) = spacing {
        ppr.insert_ordered(
            Element::new("w:spacing")
                .with_attr("w:before", before.to_string())
                .with_attr("w:after", after.to_string()),
            PARAGRAPH_PROPERTIES,
        );
    }
    if center {
        ppr.insert_ordered(
            Element::new("w:jc").with_attr("w:val", "center"),
            PARAGRAPH_PROPERTIES,
        );
    }

    let mut p = Element::new("w:p");
    if !ppr.children.is_empty() {
        p = p.with_child(ppr);
    }
    runs.into_iter().fold(p, |acc, r| acc.with_child(r))
}

fn line_break() -> Element {
    Element::new("w:r").with_child(Element::new("w:br"))
}

fn italic(mut run: Element) -> Element {
    let rpr = run_properties_mut(&mut run);
    for name in ["w:i", "w:iCs"] {
        rpr.replace_ordered(Element::new(name), RUN_PROPERTIES);
    }
    run
}
