//! OData extension.
//!
//! Recognizes OData-flavored entries, error documents, `m:properties`
//! containers and links that can embed feeds. Names under the OData
//! prefixes that it does not know how to create are rejected rather than
//! passed on, since no other extension owns those namespaces.

use std::rc::Rc;

use tracing::debug;

use super::{DocumentExtension, ElementExtension, Extensions, NamespaceExtension};
use crate::constants::{
    ATOM_NS, ODATA_DATA_NS, ODATA_DATA_PREFIX, ODATA_META_NS, ODATA_META_PREFIX,
};
use crate::document::{Document, EntryDocument, ErrorDocument};
use crate::dom::{split_qname, NodeRef};
use crate::element::{Element, Entry, InlineFeedLink, Properties};
use crate::error::{Error, Result};
use crate::node::Node;

const NAMESPACES: &[(&str, &str)] = &[
    (ODATA_META_PREFIX, ODATA_META_NS),
    (ODATA_DATA_PREFIX, ODATA_DATA_NS),
];

/// The OData extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct ODataExtension;

impl ODataExtension {
    fn is_reserved(name: &str) -> bool {
        matches!(split_qname(name).0, Some(prefix) if NAMESPACES.iter().any(|(p, _)| *p == prefix))
    }

    fn unsupported(name: &str) -> Error {
        Error::InvalidArgument(format!("{} cannot be created", name))
    }
}

impl DocumentExtension for ODataExtension {
    fn parse_document(&self, extensions: &Rc<Extensions>, root: &NodeRef) -> Option<Document> {
        let extensions = extensions.clone();
        if root.borrow().is_element(ATOM_NS, "entry") {
            Some(Document::Entry(EntryDocument::from_root(extensions, root.clone())))
        } else if root.borrow().is_element(ODATA_META_NS, "error") {
            Some(Document::Error(ErrorDocument::from_root(extensions, root.clone())))
        } else {
            None
        }
    }

    fn create_document(
        &self,
        extensions: &Rc<Extensions>,
        name: &str,
    ) -> Result<Option<Document>> {
        match name {
            "atom:entry" => Ok(Some(Document::Entry(EntryDocument::new(extensions)?))),
            _ if Self::is_reserved(name) => Err(Self::unsupported(name)),
            _ => Ok(None),
        }
    }
}

impl ElementExtension for ODataExtension {
    fn parse_element(&self, parent: &dyn Node, element: &NodeRef) -> Option<Element> {
        let (uri, local) = {
            let node = element.borrow();
            let element = node.element()?;
            (
                element.namespace_uri().to_string(),
                element.local_name().to_string(),
            )
        };
        let extensions = parent.extensions().clone();
        let element = element.clone();
        match (uri.as_str(), local.as_str()) {
            (ATOM_NS, "entry") => Some(Element::Entry(Entry::from_element(extensions, element))),
            (ATOM_NS, "link") | (ODATA_META_NS, "link") => Some(Element::InlineFeedLink(
                InlineFeedLink::from_element(extensions, element),
            )),
            (ODATA_META_NS, "properties") if parent.is_content_bearing() => Some(
                Element::Properties(Properties::from_element(extensions, element)),
            ),
            _ => None,
        }
    }

    fn create_element(&self, parent: &dyn Node, name: &str) -> Result<Option<Element>> {
        match name {
            "atom:entry" => Ok(Some(Element::Entry(Entry::new(parent)?))),
            "link" => Ok(Some(Element::InlineFeedLink(InlineFeedLink::new(parent)?))),
            "m:properties" => {
                if !parent.is_content_bearing() {
                    debug!(parent = parent.kind(), "properties rejected");
                    return Err(Error::InvalidArgument(format!(
                        "m:properties cannot be created under {}",
                        parent.kind()
                    )));
                }
                Ok(Some(Element::Properties(Properties::new(parent)?)))
            }
            _ if Self::is_reserved(name) => Err(Self::unsupported(name)),
            _ => Ok(None),
        }
    }
}

impl NamespaceExtension for ODataExtension {
    fn namespaces(&self) -> &'static [(&'static str, &'static str)] {
        NAMESPACES
    }
}
