//! DOM node structures.
//!
//! The DOM is the single source of truth for document structure. Nodes are
//! shared through `NodeRef` handles; parents own their children and children
//! keep a weak back-reference to their parent.

mod namespace;
mod xml_content;

pub use namespace::{split_qname, xmlns_prefix, ExpandedName, NamespaceContext};
pub use xml_content::{XmlAttribute, XmlComment, XmlContent, XmlElement, XmlText};

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::PropertyCache;

/// Global counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique node ID.
fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A reference-counted pointer to a DOM node.
pub type NodeRef = Rc<RefCell<DomNode>>;

/// A non-owning pointer to a DOM node.
pub type WeakNodeRef = Weak<RefCell<DomNode>>;

/// Creates a new node reference.
pub fn new_node_ref(inner: DomNode) -> NodeRef {
    Rc::new(RefCell::new(inner))
}

/// Creates a detached element node.
pub fn new_element(element: XmlElement) -> NodeRef {
    new_node_ref(DomNode::new(XmlContent::Element(element)))
}

/// Creates a detached text node.
pub fn new_text(text: impl Into<String>) -> NodeRef {
    new_node_ref(DomNode::new(XmlContent::Text(XmlText::new(text))))
}

/// A node in the DOM tree.
#[derive(Debug)]
pub struct DomNode {
    /// Unique identifier for this node.
    id: u64,
    /// Child nodes in document order.
    children: Vec<NodeRef>,
    /// XML content of this node.
    content: XmlContent,
    /// Weak reference to parent node.
    parent: WeakNodeRef,
    /// Property caches of the typed nodes wrapping this element.
    caches: Vec<Weak<PropertyCache>>,
}

impl DomNode {
    /// Creates a detached node with the given content.
    pub fn new(content: XmlContent) -> Self {
        DomNode {
            id: next_node_id(),
            children: Vec::new(),
            content,
            parent: Weak::new(),
            caches: Vec::new(),
        }
    }

    /// Returns the unique ID of this node.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the content of this node.
    pub fn content(&self) -> &XmlContent {
        &self.content
    }

    /// Returns a mutable reference to the content.
    pub fn content_mut(&mut self) -> &mut XmlContent {
        &mut self.content
    }

    /// Returns the element content, if this is an element node.
    pub fn element(&self) -> Option<&XmlElement> {
        self.content.as_element()
    }

    /// Returns the mutable element content, if this is an element node.
    pub fn element_mut(&mut self) -> Option<&mut XmlElement> {
        self.content.as_element_mut()
    }

    /// Returns true if this is an element named `local` in namespace `uri`.
    pub fn is_element(&self, uri: &str, local: &str) -> bool {
        self.element()
            .is_some_and(|e| e.expanded_name().is(uri, local))
    }

    /// Returns the number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the children as a slice.
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Returns a weak reference to the parent.
    pub fn parent(&self) -> &WeakNodeRef {
        &self.parent
    }
}

/// Tree operations. These work on `NodeRef` handles because they need to
/// link parent and child together.
impl DomNode {
    /// Appends `child` as the last child of `parent`.
    ///
    /// A child that already has a parent is moved, not copied.
    pub fn append_child(parent_ref: &NodeRef, child_ref: NodeRef) {
        Self::detach(&child_ref);
        child_ref.borrow_mut().parent = Rc::downgrade(parent_ref);
        parent_ref.borrow_mut().children.push(child_ref);
    }

    /// Inserts `child` at `index` among the children of `parent`.
    ///
    /// The index is clamped to the child count.
    pub fn insert_child(parent_ref: &NodeRef, index: usize, child_ref: NodeRef) {
        Self::detach(&child_ref);
        child_ref.borrow_mut().parent = Rc::downgrade(parent_ref);
        let mut parent = parent_ref.borrow_mut();
        let index = index.min(parent.children.len());
        parent.children.insert(index, child_ref);
    }

    /// Removes `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(parent_ref: &NodeRef, child_ref: &NodeRef) -> bool {
        let removed = {
            let mut parent = parent_ref.borrow_mut();
            match parent.children.iter().position(|c| Rc::ptr_eq(c, child_ref)) {
                Some(pos) => {
                    parent.children.remove(pos);
                    true
                }
                None => false,
            }
        };
        if removed {
            child_ref.borrow_mut().parent = Weak::new();
        }
        removed
    }

    /// Removes all children of `parent`.
    pub fn remove_children(parent_ref: &NodeRef) {
        let children = std::mem::take(&mut parent_ref.borrow_mut().children);
        for child in children {
            child.borrow_mut().parent = Weak::new();
        }
    }

    /// Detaches a node from its parent, if it has one.
    pub fn detach(node_ref: &NodeRef) {
        let parent = node_ref.borrow().parent.upgrade();
        if let Some(parent) = parent {
            Self::remove_child(&parent, node_ref);
        }
    }

    /// Returns the parent node, if attached.
    pub fn parent_of(node_ref: &NodeRef) -> Option<NodeRef> {
        node_ref.borrow().parent.upgrade()
    }

    /// Returns the element children of a node in document order.
    pub fn element_children(node_ref: &NodeRef) -> Vec<NodeRef> {
        node_ref
            .borrow()
            .children
            .iter()
            .filter(|c| c.borrow().content.is_element())
            .cloned()
            .collect()
    }

    /// Returns the first child that is an element, skipping text and comments.
    pub fn first_element_child(node_ref: &NodeRef) -> Option<NodeRef> {
        node_ref
            .borrow()
            .children
            .iter()
            .find(|c| c.borrow().content.is_element())
            .cloned()
    }

    /// Returns the first child element named `local` in namespace `uri`.
    pub fn child_element(node_ref: &NodeRef, uri: &str, local: &str) -> Option<NodeRef> {
        node_ref
            .borrow()
            .children
            .iter()
            .find(|c| c.borrow().is_element(uri, local))
            .cloned()
    }

    /// Returns the concatenated text of all descendant text nodes.
    pub fn text_content(node_ref: &NodeRef) -> String {
        let mut out = String::new();
        Self::collect_text(node_ref, &mut out);
        out
    }

    fn collect_text(node_ref: &NodeRef, out: &mut String) {
        let node = node_ref.borrow();
        match &node.content {
            XmlContent::Text(t) => out.push_str(t.text()),
            XmlContent::Element(_) => {
                for child in &node.children {
                    Self::collect_text(child, out);
                }
            }
            XmlContent::Comment(_) => {}
        }
    }

    /// Registers the property cache of a typed node wrapping `node`.
    pub fn attach_cache(node_ref: &NodeRef, cache: &Rc<PropertyCache>) {
        let mut node = node_ref.borrow_mut();
        node.caches.retain(|c| c.strong_count() > 0);
        node.caches.push(Rc::downgrade(cache));
    }

    /// Drops the cached value `name` from every typed node wrapping `node`.
    pub fn invalidate_cached(node_ref: &NodeRef, name: &str) {
        for cache in Self::live_caches(node_ref) {
            cache.invalidate(name);
        }
    }

    /// Drops every cached value of every typed node wrapping `node`, except
    /// for the cache `keep`.
    pub fn clear_caches_except(node_ref: &NodeRef, keep: &PropertyCache) {
        for cache in Self::live_caches(node_ref) {
            if !std::ptr::eq(Rc::as_ptr(&cache), keep) {
                cache.clear();
            }
        }
    }

    // Upgraded before use so no DOM borrow is held while caches are touched.
    fn live_caches(node_ref: &NodeRef) -> Vec<Rc<PropertyCache>> {
        node_ref
            .borrow()
            .caches
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// Replaces all children of `node` with a single text node.
    ///
    /// An empty string leaves the node without children.
    pub fn set_text_content(node_ref: &NodeRef, text: &str) {
        Self::remove_children(node_ref);
        if !text.is_empty() {
            Self::append_child(node_ref, new_text(text));
        }
    }
}
