//! Typed element variants.
//!
//! Plain Atom elements (`Feed`, `AtomEntry`, `Link`, `Content`) are what the
//! built-in Atom extension produces. The OData extension replaces entries
//! with [`Entry`] and links with [`InlineFeedLink`], and adds [`Properties`].
//! Shared entry and link behavior lives in the [`EntryNode`] and
//! [`LinkNode`] traits.

mod content;
mod entry;
mod feed;
mod inline_feed_link;
mod link;
mod properties;

pub use content::Content;
pub use entry::{AtomEntry, Entry, EntryNode};
pub use feed::Feed;
pub use inline_feed_link::InlineFeedLink;
pub use link::{Link, LinkNode};
pub use properties::{Properties, PropertyValue};

use crate::error::Result;
use crate::node::{Node, NodeCore};
use crate::query::QueryFlags;

/// A typed element produced by the extension registry.
#[derive(Debug, Clone)]
pub enum Element {
    /// An Atom `feed`.
    Feed(Feed),
    /// An Atom `entry` without OData semantics.
    AtomEntry(AtomEntry),
    /// An OData entry.
    Entry(Entry),
    /// An Atom `link` without OData semantics.
    Link(Link),
    /// A link that may embed a feed.
    InlineFeedLink(InlineFeedLink),
    /// An Atom `content`.
    Content(Content),
    /// An OData `m:properties` container.
    Properties(Properties),
}

impl Element {
    fn node(&self) -> &dyn Node {
        match self {
            Element::Feed(e) => e,
            Element::AtomEntry(e) => e,
            Element::Entry(e) => e,
            Element::Link(e) => e,
            Element::InlineFeedLink(e) => e,
            Element::Content(e) => e,
            Element::Properties(e) => e,
        }
    }

    /// Returns the element as an entry of either flavor.
    pub fn as_entry_node(&self) -> Option<&dyn EntryNode> {
        match self {
            Element::AtomEntry(e) => Some(e),
            Element::Entry(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the element as a link of either flavor.
    pub fn as_link_node(&self) -> Option<&dyn LinkNode> {
        match self {
            Element::Link(e) => Some(e),
            Element::InlineFeedLink(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the feed, if this is one.
    pub fn as_feed(&self) -> Option<&Feed> {
        match self {
            Element::Feed(e) => Some(e),
            _ => None,
        }
    }

    /// Converts into a feed, if this is one.
    pub fn into_feed(self) -> Option<Feed> {
        match self {
            Element::Feed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the OData entry, if this is one.
    pub fn as_entry(&self) -> Option<&Entry> {
        match self {
            Element::Entry(e) => Some(e),
            _ => None,
        }
    }

    /// Converts into an OData entry, if this is one.
    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Element::Entry(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the inline feed link, if this is one.
    pub fn as_inline_feed_link(&self) -> Option<&InlineFeedLink> {
        match self {
            Element::InlineFeedLink(e) => Some(e),
            _ => None,
        }
    }

    /// Converts into an inline feed link, if this is one.
    pub fn into_inline_feed_link(self) -> Option<InlineFeedLink> {
        match self {
            Element::InlineFeedLink(e) => Some(e),
            _ => None,
        }
    }

    /// Converts into a content element, if this is one.
    pub fn into_content(self) -> Option<Content> {
        match self {
            Element::Content(e) => Some(e),
            _ => None,
        }
    }

    /// Converts into a properties container, if this is one.
    pub fn into_properties(self) -> Option<Properties> {
        match self {
            Element::Properties(e) => Some(e),
            _ => None,
        }
    }
}

impl Node for Element {
    fn core(&self) -> &NodeCore {
        self.node().core()
    }

    fn kind(&self) -> &'static str {
        self.node().kind()
    }

    fn as_node(&self) -> &dyn Node {
        self.node()
    }

    fn is_content_bearing(&self) -> bool {
        self.node().is_content_bearing()
    }
}

/// Parses every element at `path` under `parent` through the registry.
///
/// Elements no extension recognizes are skipped.
pub(crate) fn parse_children(parent: &dyn Node, path: &str) -> Result<Vec<Element>> {
    let extensions = parent.extensions().clone();
    Ok(parent
        .query(path, QueryFlags::ALL)?
        .iter()
        .filter_map(|element| extensions.parse_element(parent, element))
        .collect())
}

/// Parses the first element at `path` under `parent` through the registry.
pub(crate) fn parse_child(parent: &dyn Node, path: &str) -> Result<Option<Element>> {
    Ok(parent
        .query_single(path)?
        .and_then(|element| parent.extensions().parse_element(parent, &element)))
}
