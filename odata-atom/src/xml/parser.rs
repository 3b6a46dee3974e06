//! XML parser that builds DOM trees.
//!
//! This parser uses quick-xml's streaming API and resolves namespace
//! prefixes itself through a scoped `NamespaceContext`, so every element and
//! attribute in the resulting tree carries its expanded name.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::dom::{
    new_element, new_node_ref, split_qname, xmlns_prefix, DomNode, ExpandedName, NamespaceContext,
    NodeRef, XmlAttribute, XmlComment, XmlContent, XmlElement, XmlText,
};
use crate::error::{Error, Result};

/// Namespace-aware XML parser that builds DOM trees.
#[derive(Debug, Default)]
pub struct XmlParser {
    /// Keep whitespace-only text between elements.
    preserve_whitespace: bool,
}

impl XmlParser {
    /// Creates a new parser that drops whitespace-only text nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps whitespace-only text nodes.
    pub fn preserve_whitespace(mut self, preserve: bool) -> Self {
        self.preserve_whitespace = preserve;
        self
    }

    /// Parses XML from a string and returns the root element.
    pub fn parse_str(&self, xml: &str) -> Result<NodeRef> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a file and returns the root element.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<NodeRef> {
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a quick-xml Reader.
    pub fn parse_reader<R: BufRead>(&self, reader: &mut Reader<R>) -> Result<NodeRef> {
        let mut ns = NamespaceContext::new();
        let mut root: Option<NodeRef> = None;
        let mut node_stack: Vec<NodeRef> = Vec::new();
        let mut current_text: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    self.flush_text(&mut current_text, &node_stack);
                    ns.push_scope();
                    let node = new_element(self.parse_element(e, reader, &mut ns)?);
                    Self::attach(&mut root, &node_stack, node.clone())?;
                    node_stack.push(node);
                }
                Ok(Event::End(_)) => {
                    self.flush_text(&mut current_text, &node_stack);
                    node_stack.pop();
                    ns.pop_scope();
                }
                Ok(Event::Empty(ref e)) => {
                    // Self-closing tag - handle like Start + End
                    self.flush_text(&mut current_text, &node_stack);
                    ns.push_scope();
                    let node = new_element(self.parse_element(e, reader, &mut ns)?);
                    Self::attach(&mut root, &node_stack, node)?;
                    ns.pop_scope();
                }
                Ok(Event::Text(e)) => {
                    let raw =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    current_text.get_or_insert_with(String::new).push_str(&text);
                }
                Ok(Event::GeneralRef(e)) => {
                    // Entity and character references arrive separately from text
                    let name =
                        std::str::from_utf8(&e).map_err(|e| Error::Parse(e.to_string()))?;
                    let reference = format!("&{};", name);
                    let resolved = unescape(&reference)
                        .map_err(|e| Error::Parse(format!("unknown entity {}: {}", reference, e)))?;
                    current_text.get_or_insert_with(String::new).push_str(&resolved);
                }
                Ok(Event::CData(ref e)) => {
                    let text = String::from_utf8_lossy(e.as_ref());
                    current_text.get_or_insert_with(String::new).push_str(&text);
                }
                Ok(Event::Comment(ref e)) => {
                    self.flush_text(&mut current_text, &node_stack);
                    // Comments outside the root element are not kept
                    if let Some(parent) = node_stack.last() {
                        let text = String::from_utf8_lossy(e.as_ref()).to_string();
                        let comment =
                            new_node_ref(DomNode::new(XmlContent::Comment(XmlComment::new(text))));
                        DomNode::append_child(parent, comment);
                    }
                }
                Ok(Event::Decl(_)) | Ok(Event::PI(_)) | Ok(Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Parse(format!("XML parse error: {}", e))),
            }
            buf.clear();
        }

        if !node_stack.is_empty() {
            return Err(Error::Parse("unexpected end of document".to_string()));
        }
        root.ok_or_else(|| Error::Parse("document has no root element".to_string()))
    }

    /// Adds a freshly parsed element to the open parent, or makes it the root.
    fn attach(root: &mut Option<NodeRef>, node_stack: &[NodeRef], node: NodeRef) -> Result<()> {
        match node_stack.last() {
            Some(parent) => DomNode::append_child(parent, node),
            None if root.is_none() => *root = Some(node),
            None => return Err(Error::Parse("multiple root elements".to_string())),
        }
        Ok(())
    }

    /// Emits accumulated text as a text node under the open element.
    fn flush_text(&self, current_text: &mut Option<String>, node_stack: &[NodeRef]) {
        let Some(text) = current_text.take() else {
            return;
        };
        if text.trim().is_empty() && !self.preserve_whitespace {
            return;
        }
        if let Some(parent) = node_stack.last() {
            DomNode::append_child(
                parent,
                new_node_ref(DomNode::new(XmlContent::Text(XmlText::new(text)))),
            );
        }
    }

    /// Parses an element's name, namespace declarations and attributes.
    ///
    /// The caller must have pushed a fresh scope for the element.
    fn parse_element<R: BufRead>(
        &self,
        e: &BytesStart,
        reader: &Reader<R>,
        ns: &mut NamespaceContext,
    ) -> Result<XmlElement> {
        let qname = reader
            .decoder()
            .decode(e.name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();

        // Declarations must be bound before any name on this element resolves
        let mut namespace_decls = Vec::new();
        let mut raw_attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
            let key = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            match xmlns_prefix(&key) {
                Some(prefix) => {
                    ns.bind(prefix, &value);
                    namespace_decls.push((prefix.to_string(), value));
                }
                None => raw_attributes.push((key, value)),
            }
        }

        let name = Self::resolve_element_name(&qname, ns)?;
        let mut attributes = Vec::with_capacity(raw_attributes.len());
        for (key, value) in raw_attributes {
            let attr_name = match split_qname(&key) {
                (Some(prefix), local) => {
                    let uri = ns
                        .resolve(prefix)
                        .ok_or_else(|| Error::Parse(format!("unbound prefix in {}", key)))?;
                    ExpandedName::new(uri, local)
                }
                (None, local) => ExpandedName::no_namespace(local),
            };
            attributes.push(XmlAttribute::new(key, attr_name, value));
        }

        Ok(XmlElement::new_with_namespace(
            qname,
            name,
            namespace_decls,
            attributes,
        ))
    }

    fn resolve_element_name(qname: &str, ns: &NamespaceContext) -> Result<ExpandedName> {
        match split_qname(qname) {
            (Some(prefix), local) => ns
                .resolve(prefix)
                .map(|uri| ExpandedName::new(uri, local))
                .ok_or_else(|| Error::Parse(format!("unbound prefix in {}", qname))),
            (None, local) => Ok(match ns.default_namespace() {
                Some(uri) => ExpandedName::new(uri, local),
                None => ExpandedName::no_namespace(local),
            }),
        }
    }
}

/// Parses XML from a file with default settings.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<NodeRef> {
    XmlParser::new().parse_file(path)
}

/// Parses XML from a string with default settings.
pub fn parse_str(xml: &str) -> Result<NodeRef> {
    XmlParser::new().parse_str(xml)
}
