use std::rc::Rc;

use super::{parse_children, Element, EntryNode};
use crate::dom::NodeRef;
use crate::error::Result;
use crate::extension::Extensions;
use crate::node::{Node, NodeCore};

/// An Atom feed.
#[derive(Debug, Clone)]
pub struct Feed {
    core: Rc<NodeCore>,
}

impl Feed {
    pub(crate) fn from_element(extensions: Rc<Extensions>, element: NodeRef) -> Self {
        Feed {
            core: NodeCore::new(extensions, element),
        }
    }

    pub(crate) fn from_core(core: Rc<NodeCore>) -> Self {
        Feed { core }
    }

    /// Creates an empty `atom:feed` under `parent`.
    pub fn new(parent: &dyn Node) -> Result<Self> {
        Ok(Feed {
            core: NodeCore::create_in(parent, "atom:feed")?,
        })
    }

    /// The feed identifier.
    pub fn id(&self) -> Result<String> {
        self.cache()
            .get_cached_property("id", || self.required_child_text("atom:id"))
    }

    pub fn set_id(&self, id: &str) -> Result<()> {
        self.cache().write_through("id", || {
            self.set_child_text("atom:id", id)?;
            Ok(id.to_string())
        })?;
        Ok(())
    }

    /// The feed title.
    pub fn title(&self) -> Result<String> {
        self.cache()
            .get_cached_property("title", || self.required_child_text("atom:title"))
    }

    pub fn set_title(&self, title: &str) -> Result<()> {
        self.cache().write_through("title", || {
            self.set_child_text("atom:title", title)?;
            Ok(title.to_string())
        })?;
        Ok(())
    }

    /// The feed's entries in document order, typed by the registry.
    pub fn entries(&self) -> Result<Vec<Element>> {
        self.cache()
            .get_cached_property("entries", || parse_children(self, "atom:entry"))
    }

    /// Appends a new empty entry.
    pub fn add_entry(&self) -> Result<Element> {
        let mut entries = self.entries()?;
        self.cache().write_through_with("entries", || {
            let entry = self
                .extensions()
                .create_required_element(self, "atom:entry")?;
            entries.push(entry.clone());
            Ok((entries, entry))
        })
    }

    /// The feed-level links.
    pub fn links(&self) -> Result<Vec<Element>> {
        self.cache()
            .get_cached_property("links", || parse_children(self, "atom:link"))
    }

    /// Returns the entry whose id is `id`.
    pub fn entry_by_id(&self, id: &str) -> Result<Option<Element>> {
        for entry in self.entries()? {
            if let Some(node) = entry.as_entry_node() {
                if node.id()? == id {
                    return Ok(Some(entry));
                }
            }
        }
        Ok(None)
    }
}

impl Node for Feed {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "feed"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::query::QueryFlags;

    const FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">
      <id>urn:feed</id>
      <title>Products</title>
      <link rel="self" href="Products"/>
      <entry><id>urn:1</id><title>One</title><updated>2024-01-01T00:00:00Z</updated></entry>
      <entry><id>urn:2</id><title>Two</title><updated>2024-01-02T00:00:00Z</updated></entry>
    </feed>"#;

    fn feed() -> Feed {
        let extensions = Extensions::odata();
        let document = extensions.parse_document_str(FEED).unwrap().unwrap();
        document.into_feed().unwrap().feed()
    }

    #[test]
    fn test_feed_fields() {
        let feed = feed();
        assert_eq!(feed.id().unwrap(), "urn:feed");
        assert_eq!(feed.title().unwrap(), "Products");
        assert_eq!(feed.links().unwrap().len(), 1);
    }

    #[test]
    fn test_entries_are_cached() {
        let feed = feed();
        let first = feed.entries().unwrap();
        let second = feed.entries().unwrap();
        assert_eq!(first.len(), 2);
        assert!(first[0].same_node(&second[0]));
        assert!(matches!(first[0], Element::Entry(_)));
    }

    #[test]
    fn test_entry_by_id() {
        let feed = feed();
        let entry = feed.entry_by_id("urn:2").unwrap().unwrap();
        assert_eq!(entry.as_entry_node().unwrap().title().unwrap(), "Two");
        assert!(feed.entry_by_id("urn:3").unwrap().is_none());
    }

    #[test]
    fn test_add_entry() {
        let feed = feed();
        feed.entries().unwrap();
        let added = feed.add_entry().unwrap();
        added.as_entry_node().unwrap().set_id("urn:3").unwrap();

        let entries = feed.entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[2].same_node(&added));
        assert_eq!(feed.query("atom:entry", QueryFlags::ALL).unwrap().len(), 3);
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let extensions = Extensions::odata();
        let document = extensions.create_document("atom:feed").unwrap().unwrap();
        let feed = document.into_feed().unwrap().feed();
        assert!(matches!(feed.title(), Err(Error::MalformedNode(_))));

        feed.set_title("Orders").unwrap();
        assert_eq!(feed.title().unwrap(), "Orders");
        assert_eq!(feed.required_child_text("atom:title").unwrap(), "Orders");
    }
}
