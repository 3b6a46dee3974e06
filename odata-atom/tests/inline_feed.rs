//! Inline feed tests over a realistic OData order entry with embedded
//! order details.

use std::rc::Rc;

use odata_atom::{
    Element, EntryNode, Extensions, Feed, InlineFeedLink, LinkNode, Node, PropertyValue,
    QueryFlags,
};
use pretty_assertions::assert_eq;

const ORDER: &str = include_str!("fixtures/order_entry.xml");
const PRODUCTS: &str = include_str!("fixtures/products_feed.xml");
const DETAILS_REL: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/related/Order_Details";
const CUSTOMER_REL: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/related/Customer";

fn order_link(rel: &str) -> InlineFeedLink {
    let extensions = Extensions::odata();
    let document = extensions.parse_document_str(ORDER).unwrap().unwrap();
    let entry = document.into_entry().unwrap().odata_entry().unwrap();
    entry
        .link_by_rel(rel)
        .unwrap()
        .and_then(Element::into_inline_feed_link)
        .unwrap()
}

fn products_feed(extensions: &Rc<Extensions>) -> Feed {
    extensions
        .parse_document_str(PRODUCTS)
        .unwrap()
        .unwrap()
        .into_feed()
        .unwrap()
        .feed()
}

#[test]
fn test_embedded_feed_round_trip() {
    let link = order_link(DETAILS_REL);
    let feed = link.feed().unwrap().unwrap();

    let embedded = link
        .query_required("m:inline/atom:feed")
        .unwrap();
    assert!(Rc::ptr_eq(&feed.dom_element(), &embedded));
    assert_eq!(feed.title().unwrap(), "Order_Details");
}

#[test]
fn test_embedded_entries_are_typed() {
    let link = order_link(DETAILS_REL);
    let feed = link.feed().unwrap().unwrap();
    let entries = feed.entries().unwrap();
    assert_eq!(entries.len(), 2);

    let detail = entries[1].as_entry().unwrap();
    assert_eq!(
        detail.entity_type().unwrap().as_deref(),
        Some("NorthwindModel.Order_Detail")
    );
    let properties = detail.properties().unwrap().unwrap();
    assert_eq!(properties.get("ProductID").unwrap(), Some(PropertyValue::Int32(42)));
    assert_eq!(properties.get("Quantity").unwrap(), Some(PropertyValue::Int32(10)));
    assert_eq!(properties.get("UnitPrice").unwrap(), Some(PropertyValue::Double(9.8)));
}

#[test]
fn test_metadata_link_inside_embedded_entry() {
    let link = order_link(DETAILS_REL);
    let feed = link.feed().unwrap().unwrap();
    let entries = feed.entries().unwrap();
    let detail = entries[0].as_entry().unwrap();

    // m:link is not an atom:link, so it is not among the entry's links
    assert_eq!(detail.links().unwrap().len(), 1);
    let meta = detail.query_required("m:link").unwrap();
    let typed = detail.extensions().parse_element(detail, &meta).unwrap();
    let typed = typed.into_inline_feed_link().unwrap();
    assert!(typed.feed().unwrap().is_none());
    assert_eq!(
        typed.href().unwrap(),
        "Order_Details(OrderID=10248,ProductID=11)/Product"
    );
}

#[test]
fn test_absent_wrapper_means_no_feed() {
    let link = order_link(CUSTOMER_REL);
    assert!(!link.is_inline().unwrap());
    assert!(link.feed().unwrap().is_none());
    // Still no wrapper after the lookup
    assert!(link.query("m:inline", QueryFlags::ALL).unwrap().is_empty());
}

#[test]
fn test_set_feed_twice_keeps_one_child() {
    let link = order_link(CUSTOMER_REL);
    let extensions = link.extensions().clone();
    let first = products_feed(&extensions);
    let second = products_feed(&extensions);

    link.set_feed(&first).unwrap();
    link.set_feed(&second).unwrap();

    let current = link.feed().unwrap().unwrap();
    assert!(current.same_node(&second));

    let wrapper = link.query_required("m:inline").unwrap();
    let children = wrapper.borrow().children().to_vec();
    assert_eq!(children.len(), 1);
    assert!(Rc::ptr_eq(&children[0], &second.dom_element()));
    assert!(link.is_inline().unwrap());
}

#[test]
fn test_set_feed_reuses_existing_wrapper() {
    let link = order_link(DETAILS_REL);
    let extensions = link.extensions().clone();
    let replacement = products_feed(&extensions);

    link.set_feed(&replacement).unwrap();

    assert_eq!(link.query("m:inline", QueryFlags::ALL).unwrap().len(), 1);
    let feed = link.feed().unwrap().unwrap();
    assert_eq!(feed.title().unwrap(), "Products");
}

#[test]
fn test_set_feed_from_created_document() {
    let link = order_link(CUSTOMER_REL);
    let extensions = link.extensions().clone();
    let document = extensions.create_document("atom:feed").unwrap().unwrap();
    let feed = document.as_feed().unwrap().feed();
    feed.set_id("urn:customers").unwrap();
    feed.set_title("Customers").unwrap();

    link.set_feed(&feed).unwrap();

    let xml = odata_atom::xml::print_to_string(&link.dom_element()).unwrap();
    assert!(xml.contains(
        "<m:inline xmlns:m=\"http://schemas.microsoft.com/ado/2007/08/dataservices/metadata\">\
         <feed xmlns=\"http://www.w3.org/2005/Atom\" \
         xmlns:m=\"http://schemas.microsoft.com/ado/2007/08/dataservices/metadata\" \
         xmlns:d=\"http://schemas.microsoft.com/ado/2007/08/dataservices\">\
         <id>urn:customers</id><title>Customers</title></feed></m:inline>"
    ));
}

#[test]
fn test_moving_feed_clears_source_link() {
    let extensions = Extensions::odata();
    let document = extensions.parse_document_str(ORDER).unwrap().unwrap();
    let order = document.into_entry().unwrap().odata_entry().unwrap();
    let link = |rel| {
        order
            .link_by_rel(rel)
            .unwrap()
            .and_then(Element::into_inline_feed_link)
            .unwrap()
    };
    let details = link(DETAILS_REL);
    let customer = link(CUSTOMER_REL);
    let feed = details.feed().unwrap().unwrap();

    customer.set_feed(&feed).unwrap();

    assert!(details.feed().unwrap().is_none());
    assert!(customer.feed().unwrap().unwrap().same_node(&feed));
    assert_eq!(
        details.query("m:inline/atom:feed", QueryFlags::ALL).unwrap().len(),
        0
    );
    assert_eq!(feed.entries().unwrap().len(), 2);
}

#[test]
fn test_added_entry_properties_visible_from_entry() {
    let extensions = Extensions::odata();
    let feed = products_feed(&extensions);
    let added = feed.add_entry().unwrap();
    let entry = added.as_entry().unwrap();
    assert!(entry.properties().unwrap().is_none());

    let content = entry.add_content("application/xml").unwrap();
    let properties = content.add_properties().unwrap();
    properties.set("ProductID", &PropertyValue::Int32(99)).unwrap();

    let seen = entry.properties().unwrap().unwrap();
    assert!(seen.same_node(&properties));
    assert_eq!(seen.get("ProductID").unwrap(), Some(PropertyValue::Int32(99)));
    assert!(content.add_properties().unwrap().same_node(&properties));
    assert_eq!(
        entry
            .query("atom:content/m:properties", QueryFlags::ALL)
            .unwrap()
            .len(),
        1
    );
}
