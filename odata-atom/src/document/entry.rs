use std::rc::Rc;

use crate::dom::NodeRef;
use crate::element::{Element, Entry};
use crate::error::{Error, Result};
use crate::extension::Extensions;
use crate::node::{Node, NodeCore};

/// A document whose root is a single Atom entry.
#[derive(Debug, Clone)]
pub struct EntryDocument {
    core: Rc<NodeCore>,
}

impl EntryDocument {
    pub(crate) fn from_root(extensions: Rc<Extensions>, root: NodeRef) -> Self {
        EntryDocument {
            core: NodeCore::new(extensions, root),
        }
    }

    /// Creates a document with an empty `entry` root.
    pub fn new(extensions: &Rc<Extensions>) -> Result<Self> {
        let root = extensions.create_root_element("atom:entry")?;
        Ok(Self::from_root(extensions.clone(), root))
    }

    /// The root entry, typed by the registry.
    pub fn entry(&self) -> Result<Element> {
        self.cache().get_cached_property("entry", || {
            self.extensions()
                .parse_element(self, &self.dom_element())
                .filter(|element| element.as_entry_node().is_some())
                .ok_or_else(|| Error::malformed("document root is not a recognized entry"))
        })
    }

    /// The root entry as an OData entry.
    pub fn odata_entry(&self) -> Result<Entry> {
        let entry = self.entry()?;
        let kind = entry.kind();
        entry
            .into_entry()
            .ok_or_else(|| Error::malformed(format!("root entry is a {}, not an OData entry", kind)))
    }
}

impl Node for EntryDocument {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "entry-document"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::EntryNode;

    const ENTRY: &str = r#"<entry xmlns="http://www.w3.org/2005/Atom"><id>urn:1</id></entry>"#;

    #[test]
    fn test_entry_is_cached() {
        let extensions = Extensions::odata();
        let document = extensions.parse_document_str(ENTRY).unwrap().unwrap();
        let document = document.as_entry().unwrap();
        let first = document.entry().unwrap();
        let second = document.entry().unwrap();
        assert!(first.same_node(&second));
        assert!(Rc::ptr_eq(&first.dom_element(), &document.dom_element()));
        assert_eq!(document.odata_entry().unwrap().id().unwrap(), "urn:1");
    }

    #[test]
    fn test_plain_atom_entry() {
        let extensions = Rc::new(Extensions::new());
        let document = extensions.parse_document_str(ENTRY).unwrap().unwrap();
        let document = document.as_entry().unwrap();
        assert!(matches!(document.entry().unwrap(), Element::AtomEntry(_)));
        assert!(matches!(document.odata_entry(), Err(Error::MalformedNode(_))));
    }
}
