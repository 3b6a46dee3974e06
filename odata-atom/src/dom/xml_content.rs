//! XML content types for DOM nodes.
//!
//! This module provides `XmlContent`, which represents the content of a DOM
//! node: an element (qualified name, expanded name, attributes), text, or a
//! comment.

use super::namespace::{split_qname, ExpandedName};

/// Represents the content of a DOM node.
#[derive(Debug, Clone)]
pub enum XmlContent {
    /// An XML element with a qualified name and attributes.
    Element(XmlElement),
    /// XML text content.
    Text(XmlText),
    /// XML comment.
    Comment(XmlComment),
}

impl XmlContent {
    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, XmlContent::Element(_))
    }

    /// Returns true if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, XmlContent::Text(_))
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlContent::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a mutable reference to the element, if this is an element node.
    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlContent::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a reference to the text, if this is a text node.
    pub fn as_text(&self) -> Option<&XmlText> {
        match self {
            XmlContent::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// A namespace-resolved attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Qualified name as written (e.g. `m:type`).
    pub qname: String,
    /// Resolved name. Unprefixed attributes have no namespace.
    pub name: ExpandedName,
    /// Unescaped value.
    pub value: String,
}

impl XmlAttribute {
    /// Creates an attribute.
    pub fn new(qname: impl Into<String>, name: ExpandedName, value: impl Into<String>) -> Self {
        XmlAttribute {
            qname: qname.into(),
            name,
            value: value.into(),
        }
    }

    /// Returns the prefix of the qualified name, if any.
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.qname).0
    }
}

/// An XML element with a qualified name and attributes.
#[derive(Debug, Clone)]
pub struct XmlElement {
    /// The qualified name of the element (e.g., "entry", "m:inline").
    qname: String,
    /// The expanded name (namespace URI + local name).
    name: ExpandedName,
    /// Namespace declarations written on this element (prefix -> URI).
    namespace_decls: Vec<(String, String)>,
    /// Attributes in document order, `xmlns` declarations excluded.
    attributes: Vec<XmlAttribute>,
}

impl XmlElement {
    /// Creates a new element with no attributes.
    pub fn new(qname: impl Into<String>, name: ExpandedName) -> Self {
        Self::new_with_namespace(qname, name, Vec::new(), Vec::new())
    }

    /// Creates a new element with namespace declarations and attributes.
    pub fn new_with_namespace(
        qname: impl Into<String>,
        name: ExpandedName,
        namespace_decls: Vec<(String, String)>,
        attributes: Vec<XmlAttribute>,
    ) -> Self {
        XmlElement {
            qname: qname.into(),
            name,
            namespace_decls,
            attributes,
        }
    }

    /// Returns the qualified name of the element.
    pub fn qname(&self) -> &str {
        &self.qname
    }

    /// Returns the prefix of the qualified name, if any.
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.qname).0
    }

    /// Returns the expanded name.
    pub fn expanded_name(&self) -> &ExpandedName {
        &self.name
    }

    /// Returns the namespace URI (empty for no namespace).
    pub fn namespace_uri(&self) -> &str {
        &self.name.namespace_uri
    }

    /// Returns the local name.
    pub fn local_name(&self) -> &str {
        &self.name.local_name
    }

    /// Returns namespace declarations on this element.
    pub fn namespace_decls(&self) -> &[(String, String)] {
        &self.namespace_decls
    }

    /// Returns the attributes in document order.
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Returns the value of a namespace-less attribute.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attribute_ns("", local)
    }

    /// Returns the value of an attribute by namespace URI and local name.
    pub fn attribute_ns(&self, uri: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(uri, local))
            .map(|a| a.value.as_str())
    }

    /// Sets an attribute, replacing any attribute with the same expanded name.
    pub fn set_attribute(&mut self, attr: XmlAttribute) {
        match self.attributes.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => *existing = attr,
            None => self.attributes.push(attr),
        }
    }

    /// Removes an attribute by namespace URI and local name.
    ///
    /// Returns true if an attribute was removed.
    pub fn remove_attribute_ns(&mut self, uri: &str, local: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| !a.name.is(uri, local));
        before != self.attributes.len()
    }
}

impl std::fmt::Display for XmlElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {{", self.qname)?;
        for attr in &self.attributes {
            write!(f, " {}={}", attr.qname, attr.value)?;
        }
        write!(f, "}}")
    }
}

/// XML text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlText {
    text: String,
}

impl XmlText {
    /// Creates a new text node from a string.
    pub fn new(text: impl Into<String>) -> Self {
        XmlText { text: text.into() }
    }

    /// Returns the text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Appends text, used when adjacent text and references are merged.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

impl std::fmt::Display for XmlText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// XML comment content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlComment {
    /// The comment text (without the <!-- and --> markers).
    text: String,
}

impl XmlComment {
    /// Creates a new comment node from a string.
    pub fn new(text: impl Into<String>) -> Self {
        XmlComment { text: text.into() }
    }

    /// Returns the comment text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for XmlComment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<!--{}-->", self.text)
    }
}
