use std::rc::Rc;

use super::{parse_child, Element, Properties};
use crate::dom::{DomNode, NodeRef};
use crate::error::{Error, Result};
use crate::extension::Extensions;
use crate::node::{Node, NodeCore};

/// An Atom `content` element.
///
/// OData entries carry their entity properties inside it.
#[derive(Debug, Clone)]
pub struct Content {
    core: Rc<NodeCore>,
}

impl Content {
    pub(crate) fn from_element(extensions: Rc<Extensions>, element: NodeRef) -> Self {
        Content {
            core: NodeCore::new(extensions, element),
        }
    }

    /// Creates an empty `atom:content` under `parent`.
    pub fn new(parent: &dyn Node) -> Result<Self> {
        Ok(Content {
            core: NodeCore::create_in(parent, "atom:content")?,
        })
    }

    pub fn content_type(&self) -> Result<Option<String>> {
        self.cache()
            .get_cached_property("type", || self.attribute("type"))
    }

    pub fn set_content_type(&self, content_type: &str) -> Result<()> {
        self.cache().write_through("type", || {
            self.set_attribute("type", content_type)?;
            Ok(Some(content_type.to_string()))
        })?;
        Ok(())
    }

    /// The out-of-line source, for media link entries.
    pub fn src(&self) -> Result<Option<String>> {
        self.attribute("src")
    }

    /// The inline text of the content.
    pub fn text(&self) -> String {
        DomNode::text_content(&self.dom_element())
    }

    /// The `m:properties` child, if any.
    pub fn properties(&self) -> Result<Option<Properties>> {
        self.cache().get_cached_property("properties", || {
            Ok(parse_child(self, "m:properties")?.and_then(Element::into_properties))
        })
    }

    /// Returns the `m:properties` child, appending an empty one if there is
    /// none.
    pub fn add_properties(&self) -> Result<Properties> {
        let existing = self.properties()?;
        self.cache().write_through_with("properties", || {
            let properties = match existing {
                Some(properties) => properties,
                None => self
                    .extensions()
                    .create_required_element(self, "m:properties")?
                    .into_properties()
                    .ok_or_else(|| {
                        Error::InvalidArgument("m:properties created as another type".to_string())
                    })?,
            };
            Ok((Some(properties.clone()), properties))
        })
    }
}

impl Node for Content {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "content"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }

    fn is_content_bearing(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{EntryNode, PropertyValue};
    use crate::query::QueryFlags;

    #[test]
    fn test_properties_through_registry() {
        let extensions = Extensions::odata();
        let document = extensions
            .parse_document_str(
                r#"<entry xmlns="http://www.w3.org/2005/Atom"
                    xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata"
                    xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices">
                  <content type="application/xml">
                    <m:properties><d:Price m:type="Edm.Double">18.5</d:Price></m:properties>
                  </content>
                </entry>"#,
            )
            .unwrap()
            .unwrap();
        let entry = document.into_entry().unwrap().odata_entry().unwrap();
        let content = entry.content().unwrap().unwrap();

        assert_eq!(content.content_type().unwrap().as_deref(), Some("application/xml"));
        assert_eq!(content.src().unwrap(), None);
        let properties = content.properties().unwrap().unwrap();
        assert_eq!(
            properties.get("Price").unwrap(),
            Some(PropertyValue::Double(18.5))
        );
    }

    #[test]
    fn test_plain_atom_has_no_properties() {
        let extensions = Rc::new(Extensions::new());
        let document = extensions
            .parse_document_str(
                r#"<entry xmlns="http://www.w3.org/2005/Atom"
                    xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
                  <content type="text">Hello <b xmlns="">world</b></content>
                  <content><m:properties/></content>
                </entry>"#,
            )
            .unwrap()
            .unwrap();
        let entry = document.into_entry().unwrap().entry().unwrap();
        let content = entry.as_entry_node().unwrap().content().unwrap().unwrap();

        assert_eq!(content.text(), "Hello world");
        // Without the OData extension the m prefix is not registered
        assert!(matches!(content.properties(), Err(Error::UnknownPrefix(p)) if p == "m"));
        assert!(matches!(content.add_properties(), Err(Error::UnknownPrefix(_))));
        assert!(!content.cache().contains("properties"));
    }

    #[test]
    fn test_add_properties_twice_returns_existing() {
        let extensions = Extensions::odata();
        let document = extensions.create_document("atom:entry").unwrap().unwrap();
        let entry = document.into_entry().unwrap().odata_entry().unwrap();
        let content = entry.add_content("application/xml").unwrap();

        let first = content.add_properties().unwrap();
        first.set("Name", &PropertyValue::String("Chai".to_string())).unwrap();
        let second = content.add_properties().unwrap();
        assert!(second.same_node(&first));

        let containers = content.query("m:properties", QueryFlags::ALL).unwrap();
        assert_eq!(containers.len(), 1);
        assert!(Rc::ptr_eq(&containers[0], &first.dom_element()));
        assert_eq!(
            content.properties().unwrap().unwrap().get("Name").unwrap(),
            Some(PropertyValue::String("Chai".to_string()))
        );
    }
}
