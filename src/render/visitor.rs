//! Visitor pattern for paragraph-level formatting passes.
//!
//! The formatting pass walks every body paragraph (and every paragraph in a
//! top-level table cell) and hands it to a visitor, then hands each of its
//! runs over. New rules are added as visitors without touching the walk.
//!
//! # Example
//!
//! ```
//! use exammix::model::{ContentNode, Element};
//! use exammix::render::visitor::{walk_paragraphs, ParagraphContext, ParagraphVisitor};
//!
//! struct CountRuns(usize);
//!
//! impl ParagraphVisitor for CountRuns {
//!     fn visit_run(&mut self, _run: &mut Element, _ctx: ParagraphContext) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let mut body = vec![
//!     ContentNode::with_text("PHẦN I. Trắc nghiệm"),
//!     ContentNode::with_text("Câu 1: 1 + 1 = ?"),
//! ];
//! let mut counter = CountRuns(0);
//! let visited = walk_paragraphs(&mut body, &mut counter);
//! assert_eq!(visited, 2);
//! assert_eq!(counter.0, 2);
//! ```

use crate::model::schema::{PARAGRAPH_PROPERTIES, RUN_PROPERTIES};
use crate::model::{element_text, paragraph_properties_mut, run_properties_mut, ContentNode, Element};
use crate::parser::patterns;

/// Body font applied to every run.
pub const BODY_FONT: &str = "Times New Roman";

/// Body font size in half-points (12 pt).
pub const BODY_SIZE_HALF_POINTS: u32 = 24;

/// Run size left alone by [`FontVisitor`] (the 14 pt variant code).
pub const PRESERVED_SIZE_HALF_POINTS: u32 = 28;

/// Spacing before and after section headings (6 pt).
pub const HEADING_SPACING: u32 = 120;

/// Where a paragraph lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphContext {
    /// Directly in the document body
    Body,
    /// In a cell of a top-level table
    TableCell,
}

/// Action returned by [`ParagraphVisitor::visit_paragraph`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisitorAction {
    /// Visit the paragraph's runs too.
    #[default]
    Continue,

    /// Do not visit this paragraph's runs.
    SkipRuns,
}

impl VisitorAction {
    /// Check if the runs should be skipped.
    pub fn skips_runs(&self) -> bool {
        matches!(self, VisitorAction::SkipRuns)
    }
}

/// Trait for paragraph formatting passes.
///
/// Both methods do nothing by default.
pub trait ParagraphVisitor: Send {
    /// Called once per paragraph, before its runs.
    ///
    /// # Arguments
    /// * `paragraph` - The `w:p` element
    /// * `ctx` - Where the paragraph lives
    ///
    /// # Returns
    /// Whether the runs of this paragraph should be visited
    fn visit_paragraph(&mut self, paragraph: &mut Element, ctx: ParagraphContext) -> VisitorAction {
        let _ = (paragraph, ctx);
        VisitorAction::Continue
    }

    /// Called for each run of a paragraph.
    ///
    /// # Arguments
    /// * `run` - The `w:r` element
    /// * `ctx` - Where the owning paragraph lives
    fn visit_run(&mut self, run: &mut Element, ctx: ParagraphContext) {
        let _ = (run, ctx);
    }
}

/// Sets paragraph spacing: 6 pt around section headings, none elsewhere,
/// single line spacing. Paragraphs with formulas or pictures keep theirs.
#[derive(Debug, Clone, Default)]
pub struct SpacingVisitor;

impl ParagraphVisitor for SpacingVisitor {
    fn visit_paragraph(&mut self, paragraph: &mut Element, _ctx: ParagraphContext) -> VisitorAction {
        if has_object(paragraph) {
            return VisitorAction::SkipRuns;
        }
        let around = if patterns::is_section_heading(&element_text(paragraph)) {
            HEADING_SPACING
        } else {
            0
        };
        let spacing = paragraph_properties_mut(paragraph).get_or_insert("w:spacing", PARAGRAPH_PROPERTIES);
        spacing.set_attr("w:before", around.to_string());
        spacing.set_attr("w:after", around.to_string());
        spacing.set_attr("w:line", "240");
        spacing.set_attr("w:lineRule", "auto");
        VisitorAction::SkipRuns
    }
}

fn has_object(paragraph: &Element) -> bool {
    paragraph.any_descendant(&|e| {
        matches!(e.local_name(), "oMath" | "oMathPara" | "drawing" | "imagedata" | "pict")
    })
}

/// Applies the body font to every run and normalizes its size.
#[derive(Debug, Clone, Default)]
pub struct FontVisitor;

impl ParagraphVisitor for FontVisitor {
    fn visit_run(&mut self, run: &mut Element, _ctx: ParagraphContext) {
        apply_body_font(run);
    }
}

/// Set the body font and size on one run.
pub fn apply_body_font(run: &mut Element) {
    let rpr = run_properties_mut(run);

    let fonts = rpr.get_or_insert("w:rFonts", RUN_PROPERTIES);
    fonts
        .attrs
        .retain(|(k, _)| !matches!(k.as_str(), "w:asciiTheme" | "w:hAnsiTheme" | "w:cstheme"));
    for key in ["w:ascii", "w:hAnsi", "w:cs"] {
        fonts.set_attr(key, BODY_FONT);
    }

    let preserved = PRESERVED_SIZE_HALF_POINTS.to_string();
    if rpr.child("w:sz").and_then(|s| s.attr("w:val")) == Some(preserved.as_str()) {
        return;
    }
    let size = BODY_SIZE_HALF_POINTS.to_string();
    for name in ["w:sz", "w:szCs"] {
        rpr.get_or_insert(name, RUN_PROPERTIES).set_attr("w:val", size.as_str());
    }
}

/// Composite visitor that chains multiple visitors.
///
/// Every visitor sees every paragraph, in order. A visitor that returns
/// [`VisitorAction::SkipRuns`] is not shown that paragraph's runs; the
/// others still are.
pub struct CompositeVisitor {
    visitors: Vec<Box<dyn ParagraphVisitor>>,
    skipping: Vec<bool>,
}

impl CompositeVisitor {
    /// Create a new composite visitor.
    pub fn new() -> Self {
        Self {
            visitors: Vec::new(),
            skipping: Vec::new(),
        }
    }

    /// Add a visitor to the chain.
    pub fn with_visitor<V: ParagraphVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitors.push(Box::new(visitor));
        self.skipping.push(false);
        self
    }

    /// Number of visitors in the chain.
    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }
}

impl Default for CompositeVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ParagraphVisitor for CompositeVisitor {
    fn visit_paragraph(&mut self, paragraph: &mut Element, ctx: ParagraphContext) -> VisitorAction {
        for (visitor, skip) in self.visitors.iter_mut().zip(self.skipping.iter_mut()) {
            *skip = visitor.visit_paragraph(paragraph, ctx).skips_runs();
        }
        if self.skipping.iter().all(|s| *s) {
            VisitorAction::SkipRuns
        } else {
            VisitorAction::Continue
        }
    }

    fn visit_run(&mut self, run: &mut Element, ctx: ParagraphContext) {
        for (visitor, skip) in self.visitors.iter_mut().zip(&self.skipping) {
            if !skip {
                visitor.visit_run(run, ctx);
            }
        }
    }
}

/// Walk body paragraphs and the paragraphs of top-level table cells.
///
/// Returns the number of paragraphs visited.
pub fn walk_paragraphs(body: &mut [ContentNode], visitor: &mut dyn ParagraphVisitor) -> usize {
    let mut visited = 0;
    for node in body {
        let element = node.element_mut();
        if element.is("w:p") {
            visit_one(element, ParagraphContext::Body, visitor);
            visited += 1;
        } else if element.is("w:tbl") {
            for row in element.elements_mut().filter(|e| e.is("w:tr")) {
                for cell in row.elements_mut().filter(|e| e.is("w:tc")) {
                    for paragraph in cell.elements_mut().filter(|e| e.is("w:p")) {
                        visit_one(paragraph, ParagraphContext::TableCell, visitor);
                        visited += 1;
                    }
                }
            }
        }
    }
    visited
}

/// Visit a standalone paragraph (e.g. one in a footer part).
pub fn visit_one(paragraph: &mut Element, ctx: ParagraphContext, visitor: &mut dyn ParagraphVisitor) {
    if visitor.visit_paragraph(paragraph, ctx).skips_runs() {
        return;
    }
    let mut runs = Vec::new();
    paragraph.collect_mut(&|e| e.is("w:r"), &mut runs);
    for run in runs {
        visitor.visit_run(run, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::text_run;

    fn spacing_of(node: &ContentNode) -> Vec<(String, String)> {
        node.element()
            .child("w:pPr")
            .and_then(|p| p.child("w:spacing"))
            .map(|s| s.attrs.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_visitor_action_default() {
        assert_eq!(VisitorAction::default(), VisitorAction::Continue);
        assert!(VisitorAction::SkipRuns.skips_runs());
    }

    #[test]
    fn test_spacing_heading_and_body() {
        let mut body = vec![
            ContentNode::with_text("PHẦN I. Trắc nghiệm"),
            ContentNode::with_text("Câu 1: ?"),
        ];
        walk_paragraphs(&mut body, &mut SpacingVisitor);

        assert!(spacing_of(&body[0]).contains(&("w:before".to_string(), "120".to_string())));
        assert!(spacing_of(&body[1]).contains(&("w:after".to_string(), "0".to_string())));
    }

    #[test]
    fn test_spacing_skips_formula_paragraph() {
        let mut body = vec![ContentNode::from_xml(
            "<w:p><m:oMath><m:r><m:t>x</m:t></m:r></m:oMath></w:p>",
        )
        .unwrap()];
        walk_paragraphs(&mut body, &mut SpacingVisitor);
        assert!(spacing_of(&body[0]).is_empty());
    }

    #[test]
    fn test_font_keeps_code_size() {
        let mut normal = text_run("x", false);
        apply_body_font(&mut normal);
        let rpr = normal.child("w:rPr").unwrap();
        assert_eq!(rpr.child("w:rFonts").and_then(|f| f.attr("w:ascii")), Some(BODY_FONT));
        assert_eq!(rpr.child("w:sz").and_then(|s| s.attr("w:val")), Some("24"));

        let mut code = Element::new("w:r").with_child(
            Element::new("w:rPr").with_child(Element::new("w:sz").with_attr("w:val", "28")),
        );
        apply_body_font(&mut code);
        let rpr = code.child("w:rPr").unwrap();
        assert_eq!(rpr.child("w:sz").and_then(|s| s.attr("w:val")), Some("28"));
    }

    #[test]
    fn test_theme_fonts_removed() {
        let mut run = Element::new("w:r").with_child(
            Element::new("w:rPr").with_child(Element::new("w:rFonts").with_attr("w:asciiTheme", "minorHAnsi")),
        );
        apply_body_font(&mut run);
        let fonts = run.child("w:rPr").and_then(|p| p.child("w:rFonts")).unwrap();
        assert!(fonts.attr("w:asciiTheme").is_none());
        assert_eq!(fonts.attr("w:hAnsi"), Some(BODY_FONT));
    }

    #[test]
    fn test_composite_visits_table_cells() {
        let mut body = vec![ContentNode::from_xml(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>A. 1</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>B. 2</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        )
        .unwrap()];
        let mut composite = CompositeVisitor::new()
            .with_visitor(SpacingVisitor)
            .with_visitor(FontVisitor);
        assert_eq!(composite.len(), 2);

        assert_eq!(walk_paragraphs(&mut body, &mut composite), 2);
        let mut sizes = Vec::new();
        body[0]
            .element()
            .descendants_where(&|e| e.is("w:sz"), &mut sizes);
        assert_eq!(sizes.len(), 2);
    }
}
