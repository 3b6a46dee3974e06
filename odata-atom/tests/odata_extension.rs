//! Registry dispatch tests against OData service responses.

use std::cell::Cell;
use std::rc::Rc;

use odata_atom::{
    Document, DocumentExtension, Element, ElementExtension, EntryNode, Error, Extensions,
    NamespaceExtension, Node, NodeRef, ODataExtension, PropertyValue, ATOM_NS, ODATA_DATA_NS,
    ODATA_META_NS, XML_NS,
};
use pretty_assertions::assert_eq;

const ORDER: &str = include_str!("fixtures/order_entry.xml");
const PRODUCTS: &str = include_str!("fixtures/products_feed.xml");
const ERROR: &str = include_str!("fixtures/error.xml");

#[test]
fn test_documents_by_root() {
    let extensions = Extensions::odata();
    assert!(matches!(
        extensions.parse_document_str(ORDER).unwrap(),
        Some(Document::Entry(_))
    ));
    assert!(matches!(
        extensions.parse_document_str(PRODUCTS).unwrap(),
        Some(Document::Feed(_))
    ));
    assert!(matches!(
        extensions.parse_document_str(ERROR).unwrap(),
        Some(Document::Error(_))
    ));
    assert!(extensions
        .parse_document_str(r#"<service xmlns="http://www.w3.org/2007/app"/>"#)
        .unwrap()
        .is_none());
}

#[test]
fn test_error_document() {
    let extensions = Extensions::odata();
    let document = extensions.parse_document_str(ERROR).unwrap().unwrap();
    let error = document.as_error().unwrap();
    assert_eq!(error.code().unwrap(), "ResourceNotFound");
    assert_eq!(
        error.message().unwrap(),
        "Resource not found for the segment 'Prodcts'."
    );
    assert_eq!(error.message_lang().unwrap().as_deref(), Some("en-US"));
}

#[test]
fn test_plain_registry_has_no_error_documents() {
    let extensions = Rc::new(Extensions::new());
    assert!(extensions.parse_document_str(ERROR).unwrap().is_none());
    let entry = extensions.parse_document_str(ORDER).unwrap().unwrap();
    let entry = entry.into_entry().unwrap().entry().unwrap();
    assert!(matches!(entry, Element::AtomEntry(_)));
    assert!(entry
        .as_entry_node()
        .unwrap()
        .links()
        .unwrap()
        .iter()
        .all(|l| matches!(l, Element::Link(_))));
}

#[test]
fn test_feed_entries_and_media_link_properties() {
    let extensions = Extensions::odata();
    let document = extensions.parse_document_str(PRODUCTS).unwrap().unwrap();
    let feed = document.as_feed().unwrap().feed();
    assert_eq!(feed.title().unwrap(), "Products");

    let entries = feed.entries().unwrap();
    assert_eq!(entries.len(), 2);

    let chai = entries[0].as_entry().unwrap();
    let chai_properties = chai.properties().unwrap().unwrap();
    assert_eq!(
        chai_properties.get("Discontinued").unwrap(),
        Some(PropertyValue::Boolean(false))
    );

    let chang = entries[1].as_entry().unwrap();
    let content = chang.content().unwrap().unwrap();
    assert_eq!(content.src().unwrap().as_deref(), Some("Products(2)/$value"));
    assert!(content.properties().unwrap().is_none());
    let chang_properties = chang.properties().unwrap().unwrap();
    assert_eq!(
        chang_properties.names(),
        vec!["ProductID", "ProductName", "Discontinued"]
    );
}

#[test]
fn test_properties_rejected_under_feed() {
    let extensions = Extensions::odata();
    let document = extensions.parse_document_str(PRODUCTS).unwrap().unwrap();
    let feed = document.as_feed().unwrap().feed();
    let count = feed.query_required("m:count").unwrap();
    assert!(extensions.parse_element(&feed, &count).is_none());

    let entry = feed.entries().unwrap().remove(1);
    let stray = entry.query_required("m:properties").unwrap();
    // The same element is recognized under the entry but not under the feed
    assert!(matches!(
        extensions.parse_element(&entry, &stray),
        Some(Element::Properties(_))
    ));
    assert!(extensions.parse_element(&feed, &stray).is_none());
}

#[test]
fn test_create_names() {
    let extensions = Extensions::odata();
    let document = extensions.create_document("atom:entry").unwrap().unwrap();
    let entry = document.as_entry().unwrap().odata_entry().unwrap();

    // Foreign names decline everywhere; the prefix is never resolved
    assert!(matches!(
        extensions.create_element(&entry, "foo:bar"),
        Ok(None)
    ));
    assert!(matches!(
        extensions.create_required_element(&entry, "foo:bar"),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        extensions.create_element(&entry, "m:bogus"),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        extensions.create_document("m:bogus"),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        extensions.create_element(&entry, "atom:content"),
        Ok(Some(Element::Content(_)))
    ));
}

#[test]
fn test_prefix_table() {
    let extensions = Extensions::odata();
    assert_eq!(
        extensions.namespaces(),
        vec![
            ("atom", ATOM_NS),
            ("xml", XML_NS),
            ("m", ODATA_META_NS),
            ("d", ODATA_DATA_NS),
        ]
    );
    assert_eq!(
        ODataExtension.namespaces(),
        &[("m", ODATA_META_NS), ("d", ODATA_DATA_NS)]
    );
}

/// Counts how often the registry asks it, then declines.
struct Spy {
    asked: Rc<Cell<usize>>,
}

impl DocumentExtension for Spy {
    fn parse_document(&self, _: &Rc<Extensions>, _: &NodeRef) -> Option<Document> {
        self.asked.set(self.asked.get() + 1);
        None
    }

    fn create_document(&self, _: &Rc<Extensions>, _: &str) -> odata_atom::Result<Option<Document>> {
        Ok(None)
    }
}

impl ElementExtension for Spy {
    fn parse_element(&self, _: &dyn Node, _: &NodeRef) -> Option<Element> {
        self.asked.set(self.asked.get() + 1);
        None
    }

    fn create_element(&self, _: &dyn Node, _: &str) -> odata_atom::Result<Option<Element>> {
        Ok(None)
    }
}

impl NamespaceExtension for Spy {
    fn namespaces(&self) -> &'static [(&'static str, &'static str)] {
        &[("m", "urn:shadowed"), ("app", "http://www.w3.org/2007/app")]
    }
}

#[test]
fn test_registration_order() {
    let asked = Rc::new(Cell::new(0));
    let mut extensions = Extensions::new();
    extensions.register(ODataExtension);
    extensions.register(Spy {
        asked: asked.clone(),
    });
    let extensions = Rc::new(extensions);

    // The OData extension answers first, so the spy is never asked
    let document = extensions.parse_document_str(ERROR).unwrap().unwrap();
    assert!(matches!(document, Document::Error(_)));
    assert_eq!(asked.get(), 0);

    // Feeds pass through the OData extension and the spy to the Atom fallback
    let document = extensions.parse_document_str(PRODUCTS).unwrap().unwrap();
    assert!(matches!(document, Document::Feed(_)));
    assert_eq!(asked.get(), 1);

    // The first binding of a prefix wins
    assert_eq!(extensions.namespace_uri("m").as_deref(), Some(ODATA_META_NS));
    assert_eq!(
        extensions.namespace_uri("app").as_deref(),
        Some("http://www.w3.org/2007/app")
    );
}

#[test]
fn test_write_then_read_uses_cache() {
    let extensions = Extensions::odata();
    let document = extensions.parse_document_str(ORDER).unwrap().unwrap();
    let entry = document.as_entry().unwrap().odata_entry().unwrap();
    let properties = entry.properties().unwrap().unwrap();

    assert_eq!(properties.get("ShippedDate").unwrap(), Some(PropertyValue::Null));
    properties
        .set(
            "ShippedDate",
            &PropertyValue::DateTime("1996-07-16T00:00:00".to_string()),
        )
        .unwrap();
    assert_eq!(
        properties.get("ShippedDate").unwrap(),
        Some(PropertyValue::DateTime("1996-07-16T00:00:00".to_string()))
    );

    let xml = document.to_xml().unwrap();
    assert!(xml.contains(r#"<d:ShippedDate m:type="Edm.DateTime">1996-07-16T00:00:00</d:ShippedDate>"#));
}
