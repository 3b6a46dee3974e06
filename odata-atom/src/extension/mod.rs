//! Extension registry and dispatch.
//!
//! Extensions teach the registry how to turn DOM elements into typed nodes.
//! Each extension answers for the (namespace URI, local name) pairs it knows
//! and silently declines everything else by returning `None`. The registry
//! asks the registered extensions in registration order and falls back to the
//! built-in [`AtomExtension`]; the first answer wins.
//!
//! Dispatch is stateless and takes `&self` only, so typed nodes may re-enter
//! the registry while computing their properties (an inline feed parses its
//! nested feed this way). Recursion depth is bounded by document nesting.

mod atom;
mod odata;

pub use atom::AtomExtension;
pub use odata::ODataExtension;

use std::path::Path;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::constants::{ATOM_NS, ATOM_PREFIX};
use crate::document::Document;
use crate::dom::{new_element, split_qname, ExpandedName, NodeRef, XmlElement};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::xml::XmlParser;

/// Recognizes and creates documents.
pub trait DocumentExtension {
    /// Wraps a parsed document whose root element is `root`, or declines.
    fn parse_document(&self, extensions: &Rc<Extensions>, root: &NodeRef) -> Option<Document>;

    /// Creates a new empty document for the qualified name `name`.
    ///
    /// `Ok(None)` declines; an error means the name belongs to this extension
    /// but cannot be created.
    fn create_document(&self, extensions: &Rc<Extensions>, name: &str)
        -> Result<Option<Document>>;
}

/// Recognizes and creates elements.
pub trait ElementExtension {
    /// Wraps a parsed DOM element found under `parent`, or declines.
    fn parse_element(&self, parent: &dyn Node, element: &NodeRef) -> Option<Element>;

    /// Creates a new element under `parent` for the symbolic name `name`.
    ///
    /// `Ok(None)` declines; an error means the name belongs to this extension
    /// but cannot be created.
    fn create_element(&self, parent: &dyn Node, name: &str) -> Result<Option<Element>>;
}

/// Contributes namespace prefixes.
pub trait NamespaceExtension {
    /// Returns the fixed prefix to namespace URI bindings.
    fn namespaces(&self) -> &'static [(&'static str, &'static str)];
}

/// The registry of extensions every typed node dispatches through.
pub struct Extensions {
    documents: Vec<Rc<dyn DocumentExtension>>,
    elements: Vec<Rc<dyn ElementExtension>>,
    namespaces: Vec<Rc<dyn NamespaceExtension>>,
    fallback: AtomExtension,
}

impl Default for Extensions {
    fn default() -> Self {
        Self::new()
    }
}

impl Extensions {
    /// Creates a registry that only knows plain Atom.
    pub fn new() -> Self {
        Extensions {
            documents: Vec::new(),
            elements: Vec::new(),
            namespaces: Vec::new(),
            fallback: AtomExtension,
        }
    }

    /// Creates a shared registry with the OData extension registered.
    pub fn odata() -> Rc<Self> {
        let mut extensions = Self::new();
        extensions.register(ODataExtension);
        Rc::new(extensions)
    }

    /// Registers an extension that handles documents, elements and namespaces.
    pub fn register<E>(&mut self, extension: E)
    where
        E: DocumentExtension + ElementExtension + NamespaceExtension + 'static,
    {
        let extension = Rc::new(extension);
        self.documents.push(extension.clone());
        self.elements.push(extension.clone());
        self.namespaces.push(extension);
    }

    /// Registers a document extension.
    pub fn register_document(&mut self, extension: Rc<dyn DocumentExtension>) {
        self.documents.push(extension);
    }

    /// Registers an element extension.
    pub fn register_element(&mut self, extension: Rc<dyn ElementExtension>) {
        self.elements.push(extension);
    }

    /// Registers a namespace extension.
    pub fn register_namespaces(&mut self, extension: Rc<dyn NamespaceExtension>) {
        self.namespaces.push(extension);
    }

    fn document_extensions(
        &self,
    ) -> impl Iterator<Item = &(dyn DocumentExtension + 'static)> + '_ {
        let fallback: &(dyn DocumentExtension + 'static) = &self.fallback;
        self.documents
            .iter()
            .map(|e| &**e)
            .chain(std::iter::once(fallback))
    }

    fn element_extensions(&self) -> impl Iterator<Item = &(dyn ElementExtension + 'static)> + '_ {
        let fallback: &(dyn ElementExtension + 'static) = &self.fallback;
        self.elements
            .iter()
            .map(|e| &**e)
            .chain(std::iter::once(fallback))
    }

    /// Wraps a parsed document, or returns `None` if no extension knows its
    /// root element.
    pub fn parse_document(self: &Rc<Self>, root: &NodeRef) -> Option<Document> {
        for extension in self.document_extensions() {
            if let Some(document) = extension.parse_document(self, root) {
                debug!(kind = document.kind(), "document recognized");
                return Some(document);
            }
        }
        trace!(root = %describe(root), "document declined");
        None
    }

    /// Parses XML text and wraps the resulting document.
    ///
    /// Returns `Ok(None)` if the XML is well-formed but no extension knows
    /// its root element.
    pub fn parse_document_str(self: &Rc<Self>, xml: &str) -> Result<Option<Document>> {
        let root = XmlParser::new().parse_str(xml)?;
        Ok(self.parse_document(&root))
    }

    /// Parses an XML file and wraps the resulting document.
    pub fn parse_document_file<P: AsRef<Path>>(
        self: &Rc<Self>,
        path: P,
    ) -> Result<Option<Document>> {
        let root = XmlParser::new().parse_file(path)?;
        Ok(self.parse_document(&root))
    }

    /// Creates a new empty document for the qualified name `name`.
    pub fn create_document(self: &Rc<Self>, name: &str) -> Result<Option<Document>> {
        for extension in self.document_extensions() {
            if let Some(document) = extension.create_document(self, name)? {
                debug!(name, kind = document.kind(), "document created");
                return Ok(Some(document));
            }
        }
        trace!(name, "document creation declined");
        Ok(None)
    }

    /// Wraps a DOM element found under `parent`, or returns `None` if no
    /// extension knows it.
    pub fn parse_element(&self, parent: &dyn Node, element: &NodeRef) -> Option<Element> {
        for extension in self.element_extensions() {
            if let Some(typed) = extension.parse_element(parent, element) {
                trace!(element = %describe(element), kind = typed.kind(), "element recognized");
                return Some(typed);
            }
        }
        trace!(element = %describe(element), parent = parent.kind(), "element declined");
        None
    }

    /// Creates a new element under `parent` for the symbolic name `name`.
    pub fn create_element(&self, parent: &dyn Node, name: &str) -> Result<Option<Element>> {
        for extension in self.element_extensions() {
            if let Some(typed) = extension.create_element(parent, name)? {
                debug!(name, kind = typed.kind(), parent = parent.kind(), "element created");
                return Ok(Some(typed));
            }
        }
        trace!(name, parent = parent.kind(), "element creation declined");
        Ok(None)
    }

    /// Creates an element through [`Extensions::create_element`], treating a
    /// decline as an invalid argument.
    pub fn create_required_element(&self, parent: &dyn Node, name: &str) -> Result<Element> {
        self.create_element(parent, name)?
            .ok_or_else(|| Error::InvalidArgument(format!("no extension creates {}", name)))
    }

    /// Returns the merged prefix table: the built-in Atom bindings first,
    /// then each registered extension's bindings in registration order.
    /// The first binding of a prefix wins.
    pub fn namespaces(&self) -> Vec<(&'static str, &'static str)> {
        let mut merged: Vec<(&'static str, &'static str)> = Vec::new();
        let tables = std::iter::once(self.fallback.namespaces())
            .chain(self.namespaces.iter().map(|e| e.namespaces()));
        for table in tables {
            for &(prefix, uri) in table {
                if !merged.iter().any(|(p, _)| *p == prefix) {
                    merged.push((prefix, uri));
                }
            }
        }
        merged
    }

    /// Resolves a prefix through the merged prefix table.
    pub fn namespace_uri(&self, prefix: &str) -> Option<String> {
        std::iter::once(self.fallback.namespaces())
            .chain(self.namespaces.iter().map(|e| e.namespaces()))
            .flat_map(|table| table.iter())
            .find(|(p, _)| *p == prefix)
            .map(|(_, uri)| uri.to_string())
    }

    /// Resolves an element qualified name. Unprefixed names have no
    /// namespace.
    pub fn resolve_qname(&self, qname: &str) -> Result<ExpandedName> {
        match split_qname(qname) {
            (Some(prefix), local) => self
                .namespace_uri(prefix)
                .map(|uri| ExpandedName::new(uri, local))
                .ok_or_else(|| Error::UnknownPrefix(prefix.to_string())),
            (None, local) => Ok(ExpandedName::no_namespace(local)),
        }
    }

    /// Resolves an attribute qualified name.
    ///
    /// Same rules as elements; kept separate so the two can diverge.
    pub fn resolve_attribute_qname(&self, qname: &str) -> Result<ExpandedName> {
        self.resolve_qname(qname)
    }

    /// Creates a detached DOM element for a qualified name.
    pub fn create_dom_element(&self, qname: &str) -> Result<NodeRef> {
        let name = self.resolve_qname(qname)?;
        Ok(new_element(XmlElement::new(qname, name)))
    }

    /// Creates a detached document root element.
    ///
    /// The root uses its namespace as the default namespace and declares
    /// every other registered prefix, so elements created beneath it later
    /// need no declarations of their own.
    pub fn create_root_element(&self, qname: &str) -> Result<NodeRef> {
        let name = self.resolve_qname(qname)?;
        let mut decls = vec![(String::new(), name.namespace_uri.to_string())];
        for (prefix, uri) in self.namespaces() {
            if prefix == "xml" || uri == &*name.namespace_uri || uri == ATOM_NS {
                continue;
            }
            decls.push((prefix.to_string(), uri.to_string()));
        }
        if &*name.namespace_uri != ATOM_NS {
            decls.push((ATOM_PREFIX.to_string(), ATOM_NS.to_string()));
        }
        let local = name.local_name.clone();
        Ok(new_element(XmlElement::new_with_namespace(
            local,
            name,
            decls,
            Vec::new(),
        )))
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("documents", &self.documents.len())
            .field("elements", &self.elements.len())
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

/// Renders an element's expanded name for log output.
fn describe(node: &NodeRef) -> String {
    node.borrow()
        .element()
        .map(|e| e.expanded_name().to_string())
        .unwrap_or_else(|| "#text".to_string())
}
