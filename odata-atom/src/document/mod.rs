//! Typed documents.
//!
//! A document wraps the root element of a parsed or newly created XML tree.
//! The root is also reachable as a typed element (`FeedDocument::feed`,
//! `EntryDocument::entry`).

mod entry;
mod error;
mod feed;

pub use entry::EntryDocument;
pub use error::ErrorDocument;
pub use feed::FeedDocument;

use crate::error::Result;
use crate::node::{Node, NodeCore};
use crate::xml::{print_to_string, print_to_string_pretty};

/// A typed document produced by the extension registry.
#[derive(Debug, Clone)]
pub enum Document {
    Feed(FeedDocument),
    Entry(EntryDocument),
    /// An OData error response.
    Error(ErrorDocument),
}

impl Document {
    fn node(&self) -> &dyn Node {
        match self {
            Document::Feed(d) => d,
            Document::Entry(d) => d,
            Document::Error(d) => d,
        }
    }

    pub fn as_feed(&self) -> Option<&FeedDocument> {
        match self {
            Document::Feed(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_feed(self) -> Option<FeedDocument> {
        match self {
            Document::Feed(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_entry(&self) -> Option<&EntryDocument> {
        match self {
            Document::Entry(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_entry(self) -> Option<EntryDocument> {
        match self {
            Document::Entry(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorDocument> {
        match self {
            Document::Error(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_error(self) -> Option<ErrorDocument> {
        match self {
            Document::Error(d) => Some(d),
            _ => None,
        }
    }

    /// Serializes the document, with an XML declaration.
    pub fn to_xml(&self) -> Result<String> {
        Ok(print_to_string(&self.dom_element())?)
    }

    /// Serializes the document with indentation.
    pub fn to_xml_pretty(&self) -> Result<String> {
        Ok(print_to_string_pretty(&self.dom_element())?)
    }
}

impl Node for Document {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::EntryNode;
    use crate::extension::Extensions;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_created_entry_serializes() {
        let extensions = Extensions::odata();
        let document = extensions.create_document("atom:entry").unwrap().unwrap();
        let entry = document.as_entry().unwrap().odata_entry().unwrap();
        entry.set_id("urn:1").unwrap();
        entry.set_title("First").unwrap();

        assert_eq!(
            document.to_xml().unwrap(),
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<entry xmlns=\"http://www.w3.org/2005/Atom\"",
                " xmlns:m=\"http://schemas.microsoft.com/ado/2007/08/dataservices/metadata\"",
                " xmlns:d=\"http://schemas.microsoft.com/ado/2007/08/dataservices\">",
                "<id>urn:1</id><title>First</title></entry>\n"
            )
        );
    }

    #[test]
    fn test_serialized_document_parses_back() {
        let extensions = Extensions::odata();
        let document = extensions.create_document("atom:feed").unwrap().unwrap();
        let feed = document.as_feed().unwrap().feed();
        feed.set_id("urn:feed").unwrap();
        feed.set_title("Feed").unwrap();
        feed.add_entry().unwrap();

        let xml = document.to_xml_pretty().unwrap();
        let reparsed = extensions.parse_document_str(&xml).unwrap().unwrap();
        let feed = reparsed.into_feed().unwrap().feed();
        assert_eq!(feed.id().unwrap(), "urn:feed");
        assert_eq!(feed.entries().unwrap().len(), 1);
    }
}
