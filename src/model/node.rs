//! Content nodes and run-level helpers.

use regex::Regex;

use crate::container::xml_io;
use crate::error::Result;

use super::schema::RUN_PROPERTIES;
use super::xml::{Element, XmlNode};

/// Local names of inline objects that make an option "complex".
const EMBEDDED_OBJECTS: &[&str] = &["object", "oMath", "oMathPara", "pict", "shape", "drawing"];

/// What kind of body child a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `w:p`
    Paragraph,
    /// `w:tbl`
    Table,
    /// Anything else (bookmarks, structured document tags, ...)
    Other,
}

/// One body-level unit of document structure.
///
/// Nodes are moved between containers, never rebuilt, so every formatting
/// attribute the author set survives the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    element: Element,
}

impl ContentNode {
    /// Wrap an element.
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    /// Create an empty paragraph.
    pub fn paragraph() -> Self {
        Self::new(Element::new("w:p"))
    }

    /// Create a paragraph holding a single plain run.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(Element::new("w:p").with_child(text_run(text, false)))
    }

    /// Parse a node from an XML fragment such as `<w:p>...</w:p>`.
    pub fn from_xml(xml: &str) -> Result<Self> {
        xml_io::parse_fragment(xml).map(Self::new)
    }

    /// Node kind.
    pub fn kind(&self) -> NodeKind {
        match self.element.name.as_str() {
            "w:p" => NodeKind::Paragraph,
            "w:tbl" => NodeKind::Table,
            _ => NodeKind::Other,
        }
    }

    /// Check if this node is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        self.kind() == NodeKind::Paragraph
    }

    /// Underlying element.
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Underlying element, mutably.
    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    /// Unwrap into the element.
    pub fn into_element(self) -> Element {
        self.element
    }

    /// Flattened rendered text: every `w:t` / `m:t` in document order.
    pub fn plain_text(&self) -> String {
        element_text(&self.element)
    }

    /// Check if the node has no visible text and no embedded object.
    pub fn is_blank(&self) -> bool {
        self.plain_text().trim().is_empty() && !self.has_embedded_object()
    }

    /// Check for an explicit line break.
    pub fn has_line_break(&self) -> bool {
        self.element.any_descendant(&|e| e.is("w:br"))
    }

    /// Check for an embedded object, formula, image or vector shape.
    pub fn has_embedded_object(&self) -> bool {
        self.element
            .any_descendant(&|e| EMBEDDED_OBJECTS.contains(&e.local_name()))
    }

    /// All runs, not descending into runs (textbox content stays out).
    pub fn runs_mut(&mut self) -> Vec<&mut Element> {
        let mut runs = Vec::new();
        self.element.collect_mut(&|e| e.is("w:r"), &mut runs);
        runs
    }

    /// Paragraph properties, created when missing.
    pub fn paragraph_properties_mut(&mut self) -> &mut Element {
        paragraph_properties_mut(&mut self.element)
    }

    /// Insert a run at the front of the paragraph, after its properties.
    pub fn insert_run_front(&mut self, run: Element) {
        let index = self.element.position("w:pPr").map(|i| i + 1).unwrap_or(0);
        self.element.children.insert(index, XmlNode::Element(run));
    }

    /// Force every run bold.
    pub fn set_all_bold(&mut self) {
        for run in self.runs_mut() {
            set_bold(run, true);
        }
    }

    /// Delete `count` characters starting at character `start` of the
    /// flattened text, wherever the characters physically live.
    ///
    /// Text may be split across any number of runs. The deletion walks the
    /// text elements left to right with a budget of characters still to
    /// delete, shortening or blanking each one until the budget is spent.
    pub fn delete_chars(&mut self, start: usize, count: usize) {
        let end = start + count;
        let mut budget = count;
        let mut offset = 0;

        let mut texts = Vec::new();
        self.element.collect_mut(&is_text_element, &mut texts);

        for t in texts {
            if budget == 0 {
                break;
            }
            let text = t.text();
            let len = text.chars().count();
            let from = start.max(offset);
            let to = end.min(offset + len);
            if from < to {
                let (local_from, local_to) = (from - offset, to - offset);
                let kept: String = text
                    .chars()
                    .take(local_from)
                    .chain(text.chars().skip(local_to))
                    .collect();
                t.set_text(kept);
                if t.is("w:t") {
                    t.set_attr("xml:space", "preserve");
                }
                budget -= to - from;
            }
            offset += len;
        }
    }

    /// Delete every match of `pattern` in the flattened text.
    ///
    /// Returns the number of matches removed.
    pub fn delete_matches(&mut self, pattern: &Regex) -> usize {
        let text = self.plain_text();
        let spans: Vec<(usize, usize)> = pattern
            .find_iter(&text)
            .map(|m| char_span(&text, m.start(), m.end()))
            .collect();
        // Back to front so earlier offsets stay valid.
        for &(start, end) in spans.iter().rev() {
            self.delete_chars(start, end - start);
        }
        spans.len()
    }
}

impl From<Element> for ContentNode {
    fn from(element: Element) -> Self {
        Self::new(element)
    }
}

/// Convert a byte range of `text` into a character range.
pub fn char_span(text: &str, start: usize, end: usize) -> (usize, usize) {
    let from = text[..start].chars().count();
    (from, from + text[start..end].chars().count())
}

/// Flattened text of any element: every `w:t` / `m:t` below it.
pub fn element_text(element: &Element) -> String {
    let mut texts = Vec::new();
    element.descendants_where(&is_text_element, &mut texts);
    texts.iter().map(|t| t.text()).collect()
}

/// Paragraph properties of a `w:p`, created at the front when missing.
pub fn paragraph_properties_mut(paragraph: &mut Element) -> &mut Element {
    if paragraph.position("w:pPr").is_none() {
        paragraph
            .children
            .insert(0, XmlNode::Element(Element::new("w:pPr")));
    }
    paragraph.get_or_insert("w:pPr", &["w:pPr"])
}

/// Check for a text-bearing element.
pub fn is_text_element(e: &Element) -> bool {
    e.is("w:t") || e.is("m:t")
}

/// Create a run with preserved-space text.
pub fn text_run(text: impl Into<String>, bold: bool) -> Element {
    let mut run = Element::new("w:r");
    if bold {
        set_bold(&mut run, true);
    }
    run.children.push(XmlNode::Element(
        Element::new("w:t")
            .with_attr("xml:space", "preserve")
            .with_text(text),
    ));
    run
}

/// Text of a run (its `w:t` children).
pub fn run_text(run: &Element) -> String {
    run.elements()
        .filter(|e| e.is("w:t"))
        .map(|t| t.text())
        .collect()
}

/// Set a run's text, reusing its first `w:t` and dropping the others.
pub fn set_run_text(run: &mut Element, text: &str) {
    match run.position("w:t") {
        Some(first) => {
            let mut index = 0;
            run.children.retain(|n| {
                let keep = index == first || !matches!(n, XmlNode::Element(e) if e.is("w:t"));
                index += 1;
                keep
            });
            if let Some(t) = run.child_mut("w:t") {
                t.set_text(text);
                t.set_attr("xml:space", "preserve");
            }
        }
        None if !text.is_empty() => {
            run.children.push(XmlNode::Element(
                Element::new("w:t")
                    .with_attr("xml:space", "preserve")
                    .with_text(text),
            ));
        }
        None => {}
    }
}

/// Run properties, created at the front of the run when missing.
pub fn run_properties_mut(run: &mut Element) -> &mut Element {
    if run.position("w:rPr").is_none() {
        run.children
            .insert(0, XmlNode::Element(Element::new("w:rPr")));
    }
    run.get_or_insert("w:rPr", &["w:rPr"])
}

/// Turn bold on or off for a run.
pub fn set_bold(run: &mut Element, bold: bool) {
    if bold {
        let rpr = run_properties_mut(run);
        for name in ["w:b", "w:bCs"] {
            rpr.replace_ordered(Element::new(name), RUN_PROPERTIES);
        }
    } else if let Some(rpr) = run.child_mut("w:rPr") {
        rpr.remove_children("w:b");
        rpr.remove_children("w:bCs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Element {
        Element::new("w:r").with_child(Element::new("w:t").with_text(text))
    }

    fn fragmented(parts: &[&str]) -> ContentNode {
        let mut p = Element::new("w:p").with_child(Element::new("w:pPr"));
        for part in parts {
            p = p.with_child(run(part));
        }
        ContentNode::new(p)
    }

    #[test]
    fn test_plain_text_concatenates_runs() {
        let node = fragmented(&["Câ", "u 1", ": Tính"]);
        assert_eq!(node.plain_text(), "Câu 1: Tính");
        assert_eq!(node.kind(), NodeKind::Paragraph);
    }

    #[test]
    fn test_delete_chars_across_runs() {
        let mut node = fragmented(&["Câ", "u 1", ": Tính"]);
        node.delete_chars(0, 7);
        assert_eq!(node.plain_text(), "Tính");
        let texts: Vec<String> = node.runs_mut().iter().map(|r| run_text(r)).collect();
        assert_eq!(texts, vec!["", "", "Tính"]);
    }

    #[test]
    fn test_delete_chars_in_middle() {
        let mut node = fragmented(&["Phần I ", "[P", "1] ", "Trắc nghiệm"]);
        node.delete_chars(7, 5);
        assert_eq!(node.plain_text(), "Phần I Trắc nghiệm");
    }

    #[test]
    fn test_delete_matches_straddling_runs() {
        let mut node = fragmented(&["B. sai (đ", "úng) ", "nhé"]);
        let pattern = Regex::new(r"\(\s*đúng\s*\)\s*").unwrap();
        assert_eq!(node.delete_matches(&pattern), 1);
        assert_eq!(node.plain_text(), "B. sai nhé");
    }

    #[test]
    fn test_insert_run_front_after_properties() {
        let mut node = fragmented(&["text"]);
        node.insert_run_front(text_run("Câu 1: ", true));
        let names: Vec<_> = node.element().elements().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["w:pPr", "w:r", "w:r"]);
        assert_eq!(node.plain_text(), "Câu 1: text");
    }

    #[test]
    fn test_set_bold_toggles() {
        let mut r = run("x");
        set_bold(&mut r, true);
        assert!(r.child("w:rPr").and_then(|p| p.child("w:b")).is_some());
        set_bold(&mut r, false);
        assert!(r.child("w:rPr").and_then(|p| p.child("w:b")).is_none());
    }

    #[test]
    fn test_blank_and_objects() {
        let empty = fragmented(&["  "]);
        assert!(empty.is_blank());

        let picture = ContentNode::new(
            Element::new("w:p").with_child(Element::new("w:r").with_child(Element::new("w:drawing"))),
        );
        assert!(picture.has_embedded_object());
        assert!(!picture.is_blank());
    }

    #[test]
    fn test_set_run_text_drops_extra_text_elements() {
        let mut r = run("a").with_child(Element::new("w:t").with_text("b"));
        set_run_text(&mut r, "c");
        assert_eq!(run_text(&r), "c");
    }
}
