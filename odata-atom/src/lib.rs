//! OData Atom - typed OData documents over an Atom/XML DOM
//!
//! This library turns Atom feeds and entries, as produced by OData services,
//! into typed nodes that read their values lazily from the underlying XML
//! tree and write changes back into it.
//!
//! # Overview
//!
//! Documents are parsed into a namespace-aware DOM. An [`Extensions`]
//! registry then maps DOM elements to typed nodes by namespace URI and local
//! name. The built-in Atom extension knows feeds, entries, links and content;
//! the [`ODataExtension`] adds OData entries, error documents, `m:properties`
//! containers and links that embed whole feeds.
//!
//! Every typed node memoizes the values it derives from the DOM. Setters
//! update the DOM and the memoized value together, so reads after writes
//! never walk the tree again.
//!
//! # Example
//!
//! ```
//! use odata_atom::{EntryNode, Extensions};
//!
//! let extensions = Extensions::odata();
//! let document = extensions
//!     .parse_document_str(
//!         r#"<entry xmlns="http://www.w3.org/2005/Atom"><id>urn:1</id></entry>"#,
//!     )
//!     .unwrap()
//!     .unwrap();
//! let entry = document.as_entry().unwrap().odata_entry().unwrap();
//! assert_eq!(entry.id().unwrap(), "urn:1");
//! ```

pub mod cache;
pub mod constants;
pub mod document;
pub mod dom;
pub mod element;
pub mod error;
pub mod extension;
pub mod node;
pub mod query;
pub mod xml;

// Re-export commonly used types
pub use cache::PropertyCache;
pub use constants::*;
pub use document::{Document, EntryDocument, ErrorDocument, FeedDocument};
pub use dom::{DomNode, ExpandedName, NodeRef, XmlContent, XmlElement};
pub use element::{
    AtomEntry, Content, Element, Entry, EntryNode, Feed, InlineFeedLink, Link, LinkNode,
    Properties, PropertyValue,
};
pub use error::{Error, Result};
pub use extension::{
    AtomExtension, DocumentExtension, ElementExtension, Extensions, NamespaceExtension,
    ODataExtension,
};
pub use node::{Node, NodeCore};
pub use query::QueryFlags;
pub use xml::{parse_file, parse_str, XmlParser, XmlPrinter, XmlPrinterOptions};
