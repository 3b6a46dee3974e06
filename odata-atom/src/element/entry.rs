use std::rc::Rc;

use super::{parse_child, parse_children, Content, Element, LinkNode, Properties};
use crate::constants::{ODATA_SCHEME_NS, XML_CONTENT_TYPE};
use crate::dom::{DomNode, NodeRef, XmlAttribute};
use crate::error::{Error, Result};
use crate::extension::Extensions;
use crate::node::{Node, NodeCore};
use crate::query::QueryFlags;

/// Accessors shared by plain Atom and OData entries.
pub trait EntryNode: Node {
    /// The entry identifier.
    fn id(&self) -> Result<String> {
        self.cache()
            .get_cached_property("id", || self.required_child_text("atom:id"))
    }

    fn set_id(&self, id: &str) -> Result<()> {
        self.cache().write_through("id", || {
            self.set_child_text("atom:id", id)?;
            Ok(id.to_string())
        })?;
        Ok(())
    }

    fn title(&self) -> Result<String> {
        self.cache()
            .get_cached_property("title", || self.required_child_text("atom:title"))
    }

    fn set_title(&self, title: &str) -> Result<()> {
        self.cache().write_through("title", || {
            self.set_child_text("atom:title", title)?;
            Ok(title.to_string())
        })?;
        Ok(())
    }

    /// The last update timestamp, as written in the document.
    fn updated(&self) -> Result<String> {
        self.cache()
            .get_cached_property("updated", || self.required_child_text("atom:updated"))
    }

    fn set_updated(&self, updated: &str) -> Result<()> {
        self.cache().write_through("updated", || {
            self.set_child_text("atom:updated", updated)?;
            Ok(updated.to_string())
        })?;
        Ok(())
    }

    /// The entry's links in document order, typed by the registry.
    fn links(&self) -> Result<Vec<Element>> {
        self.cache()
            .get_cached_property("links", || parse_children(self.as_node(), "atom:link"))
    }

    /// Returns the first link with relation `rel`.
    fn link_by_rel(&self, rel: &str) -> Result<Option<Element>> {
        for link in self.links()? {
            if let Some(node) = link.as_link_node() {
                if node.rel()? == rel {
                    return Ok(Some(link));
                }
            }
        }
        Ok(None)
    }

    /// Appends a link created through the registry.
    fn add_link(&self, rel: &str, href: &str) -> Result<Element> {
        let mut links = self.links()?;
        self.cache().write_through_with("links", || {
            let link = self
                .extensions()
                .create_required_element(self.as_node(), "link")?;
            let node = link.as_link_node().ok_or_else(|| {
                Error::InvalidArgument(format!("link created as {}", link.kind()))
            })?;
            node.set_rel(rel)?;
            node.set_href(href)?;
            links.push(link.clone());
            Ok((links, link))
        })
    }

    /// The `atom:content` child, if any.
    fn content(&self) -> Result<Option<Content>> {
        self.cache().get_cached_property("content", || {
            Ok(parse_child(self.as_node(), "atom:content")?.and_then(Element::into_content))
        })
    }

    /// Returns the `atom:content` child with its media type set to
    /// `content_type`, creating the child if the entry has none.
    fn add_content(&self, content_type: &str) -> Result<Content> {
        let existing = self.content()?;
        self.cache().write_through_with("content", || {
            let content = match existing {
                Some(content) => content,
                None => self
                    .extensions()
                    .create_required_element(self.as_node(), "atom:content")?
                    .into_content()
                    .ok_or_else(|| {
                        Error::InvalidArgument("content created as another type".into())
                    })?,
            };
            content.set_content_type(content_type)?;
            Ok((Some(content.clone()), content))
        })
    }
}

/// A plain Atom entry.
#[derive(Debug, Clone)]
pub struct AtomEntry {
    core: Rc<NodeCore>,
}

impl AtomEntry {
    pub(crate) fn from_element(extensions: Rc<Extensions>, element: NodeRef) -> Self {
        AtomEntry {
            core: NodeCore::new(extensions, element),
        }
    }

    /// Creates an empty `atom:entry` under `parent`.
    pub fn new(parent: &dyn Node) -> Result<Self> {
        Ok(AtomEntry {
            core: NodeCore::create_in(parent, "atom:entry")?,
        })
    }
}

impl Node for AtomEntry {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "atom-entry"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }

    fn is_content_bearing(&self) -> bool {
        true
    }
}

impl EntryNode for AtomEntry {}

/// An OData entry.
///
/// Adds the entity type carried by the OData category and the entity
/// properties, which live under `atom:content` or, for media link entries,
/// directly under the entry.
#[derive(Debug, Clone)]
pub struct Entry {
    core: Rc<NodeCore>,
}

impl Entry {
    pub(crate) fn from_element(extensions: Rc<Extensions>, element: NodeRef) -> Self {
        Entry {
            core: NodeCore::new(extensions, element),
        }
    }

    /// Creates an empty `atom:entry` under `parent`.
    pub fn new(parent: &dyn Node) -> Result<Self> {
        Ok(Entry {
            core: NodeCore::create_in(parent, "atom:entry")?,
        })
    }

    fn entity_category(&self) -> Result<Option<NodeRef>> {
        let scheme = self.extensions().resolve_attribute_qname("scheme")?;
        Ok(self
            .query("atom:category", QueryFlags::ALL)?
            .into_iter()
            .find(|category| {
                category
                    .borrow()
                    .element()
                    .and_then(|e| e.attribute_ns(&scheme.namespace_uri, &scheme.local_name))
                    == Some(ODATA_SCHEME_NS)
            }))
    }

    /// The entity type name, e.g. `NorthwindModel.Product`.
    pub fn entity_type(&self) -> Result<Option<String>> {
        self.cache().get_cached_property("entity_type", || {
            let Some(category) = self.entity_category()? else {
                return Ok(None);
            };
            let term = category
                .borrow()
                .element()
                .and_then(|e| e.attribute("term"))
                .map(str::to_string);
            Ok(term)
        })
    }

    pub fn set_entity_type(&self, term: &str) -> Result<()> {
        self.cache().write_through("entity_type", || {
            let category = match self.entity_category()? {
                Some(category) => category,
                None => {
                    let category = self.extensions().create_dom_element("atom:category")?;
                    DomNode::append_child(&self.dom_element(), category.clone());
                    category
                }
            };
            let attributes = [("scheme", ODATA_SCHEME_NS), ("term", term)];
            for (qname, value) in attributes {
                let name = self.extensions().resolve_attribute_qname(qname)?;
                if let Some(element) = category.borrow_mut().element_mut() {
                    element.set_attribute(XmlAttribute::new(qname, name, value));
                }
            }
            Ok(Some(term.to_string()))
        })?;
        Ok(())
    }

    /// The entity properties, looked up under `atom:content` first.
    ///
    /// The content lookup is not cached here, so properties added through
    /// the content are seen at once.
    pub fn properties(&self) -> Result<Option<Properties>> {
        if let Some(content) = self.content()? {
            if let Some(properties) = content.properties()? {
                return Ok(Some(properties));
            }
        }
        self.cache().get_cached_property("media_properties", || {
            Ok(parse_child(self, "m:properties")?.and_then(Element::into_properties))
        })
    }

    /// Returns the properties container, creating `atom:content` and
    /// `m:properties` as needed.
    pub fn ensure_properties(&self) -> Result<Properties> {
        if let Some(properties) = self.properties()? {
            return Ok(properties);
        }
        let content = match self.content()? {
            Some(content) => content,
            None => self.add_content(XML_CONTENT_TYPE)?,
        };
        content.add_properties()
    }
}

impl Node for Entry {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "entry"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }

    fn is_content_bearing(&self) -> bool {
        true
    }
}

impl EntryNode for Entry {}
