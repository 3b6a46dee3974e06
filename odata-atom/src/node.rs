//! Typed node framework.
//!
//! A typed node binds one DOM element to one concrete element or document
//! type. The DOM stays the source of truth: typed nodes hold a handle to
//! their element, the shared extension registry and a private
//! [`PropertyCache`]. Dropping a typed node never removes its element.

use std::rc::Rc;

use crate::cache::PropertyCache;
use crate::dom::{DomNode, NodeRef, XmlAttribute};
use crate::error::{Error, Result};
use crate::extension::Extensions;
use crate::query::{self, QueryFlags};

/// State shared by every typed node.
pub struct NodeCore {
    element: NodeRef,
    extensions: Rc<Extensions>,
    cache: Rc<PropertyCache>,
}

impl NodeCore {
    /// Wraps an existing DOM element.
    ///
    /// The cache is registered on the element so that mutations made through
    /// other typed nodes can invalidate it.
    pub fn new(extensions: Rc<Extensions>, element: NodeRef) -> Rc<Self> {
        let cache = Rc::new(PropertyCache::new());
        DomNode::attach_cache(&element, &cache);
        Rc::new(NodeCore {
            element,
            extensions,
            cache,
        })
    }

    /// Creates a new empty element named `qname` and appends it to `parent`.
    ///
    /// Caches of other typed nodes over the parent element are cleared, since
    /// a new child may change any value derived from it. The caller keeps its
    /// own cache current through [`PropertyCache::write_through_with`].
    pub fn create_in(parent: &dyn Node, qname: &str) -> Result<Rc<Self>> {
        let extensions = parent.extensions().clone();
        let element = extensions.create_dom_element(qname)?;
        let parent_element = parent.dom_element();
        DomNode::append_child(&parent_element, element.clone());
        DomNode::clear_caches_except(&parent_element, parent.cache());
        Ok(Self::new(extensions, element))
    }
}

impl std::fmt::Debug for NodeCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let element = self.element.borrow();
        let name = element
            .element()
            .map(|e| e.expanded_name().to_string())
            .unwrap_or_default();
        f.debug_struct("NodeCore")
            .field("element", &name)
            .field("cache", &self.cache)
            .finish()
    }
}

/// Behavior shared by typed elements and documents.
///
/// Implementors only provide [`Node::core`]; everything else is derived.
pub trait Node {
    /// Returns the shared node state.
    fn core(&self) -> &NodeCore;

    /// Returns a short name of the concrete type, used in logs and outlines.
    fn kind(&self) -> &'static str;

    /// Upcasts to a trait object, used as the parent context for dispatch.
    fn as_node(&self) -> &dyn Node;

    /// Returns true if `m:properties` may appear directly under this node.
    fn is_content_bearing(&self) -> bool {
        false
    }

    /// Returns the wrapped DOM element.
    fn dom_element(&self) -> NodeRef {
        self.core().element.clone()
    }

    /// Returns the extension registry this node was built with.
    fn extensions(&self) -> &Rc<Extensions> {
        &self.core().extensions
    }

    /// Returns the property cache of this node.
    fn cache(&self) -> &PropertyCache {
        &self.core().cache
    }

    /// Drops the cached value `name` from every typed node wrapping this
    /// node's element, this one included.
    fn invalidate_shared(&self, name: &str) {
        DomNode::invalidate_cached(&self.core().element, name);
    }

    /// Returns true if both handles wrap the same node instance.
    fn same_node(&self, other: &dyn Node) -> bool {
        std::ptr::eq(self.core(), other.core())
    }

    /// Runs a structural query from this node's element.
    fn query(&self, path: &str, flags: QueryFlags) -> Result<Vec<NodeRef>> {
        let extensions = self.extensions();
        query::query(
            &self.core().element,
            path,
            |prefix| extensions.namespace_uri(prefix),
            flags,
        )
    }

    /// Returns the first element matching `path`, if any.
    fn query_single(&self, path: &str) -> Result<Option<NodeRef>> {
        Ok(self.query(path, QueryFlags::SINGLE)?.into_iter().next())
    }

    /// Returns the first element matching `path`, failing with
    /// [`Error::MalformedNode`] when there is none.
    fn query_required(&self, path: &str) -> Result<NodeRef> {
        self.query(path, QueryFlags::SINGLE | QueryFlags::REQUIRED)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::malformed(format!("missing {}", path)))
    }

    /// Returns the text of the child element at `path`, if present.
    fn child_text(&self, path: &str) -> Result<Option<String>> {
        Ok(self.query_single(path)?.map(|n| DomNode::text_content(&n)))
    }

    /// Returns the text of the child element at `path`, which must exist.
    fn required_child_text(&self, path: &str) -> Result<String> {
        Ok(DomNode::text_content(&self.query_required(path)?))
    }

    /// Sets the text of the child element `qname`, creating it if missing.
    fn set_child_text(&self, qname: &str, text: &str) -> Result<()> {
        let child = match self.query_single(qname)? {
            Some(child) => child,
            None => {
                let child = self.extensions().create_dom_element(qname)?;
                DomNode::append_child(&self.core().element, child.clone());
                child
            }
        };
        DomNode::set_text_content(&child, text);
        Ok(())
    }

    /// Returns an attribute of this node's element by qualified name.
    ///
    /// Unprefixed names have no namespace.
    fn attribute(&self, qname: &str) -> Result<Option<String>> {
        let name = self.extensions().resolve_attribute_qname(qname)?;
        Ok(self
            .core()
            .element
            .borrow()
            .element()
            .and_then(|e| e.attribute_ns(&name.namespace_uri, &name.local_name))
            .map(str::to_string))
    }

    /// Sets an attribute of this node's element by qualified name.
    fn set_attribute(&self, qname: &str, value: &str) -> Result<()> {
        let name = self.extensions().resolve_attribute_qname(qname)?;
        if let Some(element) = self.core().element.borrow_mut().element_mut() {
            element.set_attribute(XmlAttribute::new(qname, name, value));
        }
        Ok(())
    }

    /// Removes an attribute of this node's element by qualified name.
    fn remove_attribute(&self, qname: &str) -> Result<()> {
        let name = self.extensions().resolve_attribute_qname(qname)?;
        if let Some(element) = self.core().element.borrow_mut().element_mut() {
            element.remove_attribute_ns(&name.namespace_uri, &name.local_name);
        }
        Ok(())
    }
}
