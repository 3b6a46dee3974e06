//! Built-in Atom extension.
//!
//! Always consulted last, after every registered extension has declined.

use std::rc::Rc;

use super::{DocumentExtension, ElementExtension, Extensions, NamespaceExtension};
use crate::constants::{ATOM_NS, ATOM_PREFIX, XML_NS};
use crate::document::{Document, EntryDocument, FeedDocument};
use crate::dom::NodeRef;
use crate::element::{AtomEntry, Content, Element, Feed, Link};
use crate::error::Result;
use crate::node::Node;

const NAMESPACES: &[(&str, &str)] = &[(ATOM_PREFIX, ATOM_NS), ("xml", XML_NS)];

/// Plain Atom feeds, entries, links and content.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomExtension;

impl DocumentExtension for AtomExtension {
    fn parse_document(&self, extensions: &Rc<Extensions>, root: &NodeRef) -> Option<Document> {
        let extensions = extensions.clone();
        if root.borrow().is_element(ATOM_NS, "feed") {
            Some(Document::Feed(FeedDocument::from_root(extensions, root.clone())))
        } else if root.borrow().is_element(ATOM_NS, "entry") {
            Some(Document::Entry(EntryDocument::from_root(extensions, root.clone())))
        } else {
            None
        }
    }

    fn create_document(
        &self,
        extensions: &Rc<Extensions>,
        name: &str,
    ) -> Result<Option<Document>> {
        Ok(match name {
            "atom:feed" => Some(Document::Feed(FeedDocument::new(extensions)?)),
            "atom:entry" => Some(Document::Entry(EntryDocument::new(extensions)?)),
            _ => None,
        })
    }
}

impl ElementExtension for AtomExtension {
    fn parse_element(&self, parent: &dyn Node, element: &NodeRef) -> Option<Element> {
        let local = {
            let node = element.borrow();
            let element = node.element()?;
            if element.namespace_uri() != ATOM_NS {
                return None;
            }
            element.local_name().to_string()
        };
        let extensions = parent.extensions().clone();
        let element = element.clone();
        match local.as_str() {
            "feed" => Some(Element::Feed(Feed::from_element(extensions, element))),
            "entry" => Some(Element::AtomEntry(AtomEntry::from_element(extensions, element))),
            "link" => Some(Element::Link(Link::from_element(extensions, element))),
            "content" => Some(Element::Content(Content::from_element(extensions, element))),
            _ => None,
        }
    }

    fn create_element(&self, parent: &dyn Node, name: &str) -> Result<Option<Element>> {
        Ok(match name {
            "atom:feed" => Some(Element::Feed(Feed::new(parent)?)),
            "atom:entry" => Some(Element::AtomEntry(AtomEntry::new(parent)?)),
            "atom:link" | "link" => Some(Element::Link(Link::new(parent)?)),
            "atom:content" => Some(Element::Content(Content::new(parent)?)),
            _ => None,
        })
    }
}

impl NamespaceExtension for AtomExtension {
    fn namespaces(&self) -> &'static [(&'static str, &'static str)] {
        NAMESPACES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn test_plain_atom_documents() {
        let extensions = Rc::new(Extensions::new());
        let feed = parse_str(r#"<feed xmlns="http://www.w3.org/2005/Atom"/>"#).unwrap();
        let entry = parse_str(r#"<entry xmlns="http://www.w3.org/2005/Atom"/>"#).unwrap();
        let other = parse_str(r#"<feed xmlns="urn:other"/>"#).unwrap();

        assert!(matches!(
            AtomExtension.parse_document(&extensions, &feed),
            Some(Document::Feed(_))
        ));
        assert!(matches!(
            AtomExtension.parse_document(&extensions, &entry),
            Some(Document::Entry(_))
        ));
        assert!(AtomExtension.parse_document(&extensions, &other).is_none());
    }

    #[test]
    fn test_plain_atom_elements() {
        let extensions = Rc::new(Extensions::new());
        let document = extensions.create_document("atom:feed").unwrap().unwrap();

        let entry = AtomExtension.create_element(&document, "atom:entry").unwrap();
        assert!(matches!(entry, Some(Element::AtomEntry(_))));
        let link = AtomExtension.create_element(&document, "link").unwrap();
        assert!(matches!(link, Some(Element::Link(_))));
        assert!(AtomExtension
            .create_element(&document, "m:properties")
            .unwrap()
            .is_none());

        let link = link.unwrap();
        let parsed = AtomExtension.parse_element(&document, &link.dom_element());
        assert!(matches!(parsed, Some(Element::Link(_))));
    }
}
