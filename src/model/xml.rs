//! Owned XML element tree used for package parts.
//!
//! WordprocessingML is kept as qualified names (`w:p`, `w:r`, ...) exactly
//! as they appear in the part, so moving a node between trees never loses
//! attributes or unknown children.

/// A node inside an element's child list.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// A nested element
    Element(Element),
    /// Character data (already unescaped)
    Text(String),
}

impl XmlNode {
    /// Get the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        }
    }

    /// Get the element mutably if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        }
    }
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Qualified name, e.g. `w:p`
    pub name: String,
    /// Attributes in source order
    pub attrs: Vec<(String, String)>,
    /// Child nodes in source order
    pub children: Vec<XmlNode>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: append character data.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    /// Check the qualified name.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Get an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Iterate over child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Iterate mutably over child elements.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// First child element with the given name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// Index (in `children`) of the first child element with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.name == name))
    }

    /// Remove every child element with the given name. Returns how many were removed.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if e.name == name));
        before - self.children.len()
    }

    /// Insert a child element respecting a schema sequence.
    ///
    /// The child is placed before the first existing sibling that comes later
    /// in `order`. Names missing from `order` are appended.
    pub fn insert_ordered(&mut self, child: Element, order: &[&str]) -> usize {
        let rank = |name: &str| order.iter().position(|n| *n == name);
        let index = match rank(&child.name) {
            Some(new_rank) => self
                .children
                .iter()
                .position(|n| match n {
                    XmlNode::Element(e) => rank(&e.name).is_some_and(|r| r > new_rank),
                    XmlNode::Text(_) => false,
                })
                .unwrap_or(self.children.len()),
            None => self.children.len(),
        };
        self.children.insert(index, XmlNode::Element(child));
        index
    }

    /// Get a child element, creating it in schema order when missing.
    pub fn get_or_insert(&mut self, name: &str, order: &[&str]) -> &mut Element {
        let index = match self.position(name) {
            Some(i) => i,
            None => self.insert_ordered(Element::new(name), order),
        };
        match &mut self.children[index] {
            XmlNode::Element(e) => e,
            XmlNode::Text(_) => unreachable!("position() only returns element indices"),
        }
    }

    /// Replace a child element (or insert it in schema order).
    pub fn replace_ordered(&mut self, child: Element, order: &[&str]) {
        self.remove_children(&child.name);
        self.insert_ordered(child, order);
    }

    /// Concatenated direct character data.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Replace all direct character data with `text`, keeping child elements.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|n| matches!(n, XmlNode::Element(_)));
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    /// Check whether any descendant (not including self) satisfies `pred`.
    pub fn any_descendant(&self, pred: &dyn Fn(&Element) -> bool) -> bool {
        self.elements()
            .any(|e| pred(e) || e.any_descendant(pred))
    }

    /// Collect descendants satisfying `pred` in document order.
    pub fn descendants_where<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if pred(child) {
                out.push(child);
            }
            child.descendants_where(pred, out);
        }
    }

    /// Collect mutable references to descendants satisfying `pred`, in document
    /// order. Matched elements are not searched further.
    pub fn collect_mut<'a>(
        &'a mut self,
        pred: &dyn Fn(&Element) -> bool,
        out: &mut Vec<&'a mut Element>,
    ) {
        for child in self.elements_mut() {
            if pred(child) {
                out.push(child);
            } else {
                child.collect_mut(pred, out);
            }
        }
    }
}
