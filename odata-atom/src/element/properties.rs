use std::fmt;
use std::rc::Rc;

use crate::constants::{ODATA_DATA_NS, ODATA_META_NS};
use crate::dom::{DomNode, NodeRef, XmlAttribute};
use crate::error::{Error, Result};
use crate::extension::Extensions;
use crate::node::{Node, NodeCore};

/// A typed entity property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `m:null="true"`.
    Null,
    /// `Edm.String`, also used when `m:type` is absent.
    String(String),
    /// `Edm.Int32`, `Edm.Int16`, `Edm.Byte` and `Edm.SByte`.
    Int32(i32),
    Int64(i64),
    /// `Edm.Double`, `Edm.Single` and `Edm.Decimal`.
    Double(f64),
    Boolean(bool),
    /// `Edm.DateTime` or `Edm.DateTimeOffset`, kept as written.
    DateTime(String),
    /// Any other EDM type, kept as raw text.
    Other { edm_type: String, text: String },
}

impl PropertyValue {
    /// Interprets the text of a property element.
    pub fn parse(edm_type: Option<&str>, text: &str) -> Result<Self> {
        let invalid = |ty: &str| Error::malformed(format!("{:?} is not a valid {}", text, ty));
        let trimmed = text.trim();
        Ok(match edm_type {
            None | Some("Edm.String") => PropertyValue::String(text.to_string()),
            Some(ty @ ("Edm.Int32" | "Edm.Int16" | "Edm.Byte" | "Edm.SByte")) => {
                PropertyValue::Int32(trimmed.parse().map_err(|_| invalid(ty))?)
            }
            Some(ty @ "Edm.Int64") => PropertyValue::Int64(trimmed.parse().map_err(|_| invalid(ty))?),
            Some(ty @ ("Edm.Double" | "Edm.Single" | "Edm.Decimal")) => {
                PropertyValue::Double(trimmed.parse().map_err(|_| invalid(ty))?)
            }
            Some(ty @ "Edm.Boolean") => match trimmed {
                "true" | "1" => PropertyValue::Boolean(true),
                "false" | "0" => PropertyValue::Boolean(false),
                _ => return Err(invalid(ty)),
            },
            Some("Edm.DateTime" | "Edm.DateTimeOffset") => {
                PropertyValue::DateTime(trimmed.to_string())
            }
            Some(other) => PropertyValue::Other {
                edm_type: other.to_string(),
                text: text.to_string(),
            },
        })
    }

    /// The `m:type` written for this value, if any.
    pub fn edm_type(&self) -> Option<&str> {
        match self {
            PropertyValue::Null | PropertyValue::String(_) => None,
            PropertyValue::Int32(_) => Some("Edm.Int32"),
            PropertyValue::Int64(_) => Some("Edm.Int64"),
            PropertyValue::Double(_) => Some("Edm.Double"),
            PropertyValue::Boolean(_) => Some("Edm.Boolean"),
            PropertyValue::DateTime(_) => Some("Edm.DateTime"),
            PropertyValue::Other { edm_type, .. } => Some(edm_type),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => Ok(()),
            PropertyValue::String(s) | PropertyValue::DateTime(s) => write!(f, "{}", s),
            PropertyValue::Int32(v) => write!(f, "{}", v),
            PropertyValue::Int64(v) => write!(f, "{}", v),
            PropertyValue::Double(v) => write!(f, "{}", v),
            PropertyValue::Boolean(v) => write!(f, "{}", v),
            PropertyValue::Other { text, .. } => write!(f, "{}", text),
        }
    }
}

/// An OData `m:properties` container.
///
/// Each `d:*` child is one property. Values are cached per property name.
#[derive(Debug, Clone)]
pub struct Properties {
    core: Rc<NodeCore>,
}

impl Properties {
    pub(crate) fn from_element(extensions: Rc<Extensions>, element: NodeRef) -> Self {
        Properties {
            core: NodeCore::new(extensions, element),
        }
    }

    /// Creates an empty `m:properties` under `parent`.
    pub fn new(parent: &dyn Node) -> Result<Self> {
        Ok(Properties {
            core: NodeCore::create_in(parent, "m:properties")?,
        })
    }

    /// Property names in document order.
    pub fn names(&self) -> Vec<String> {
        DomNode::element_children(&self.dom_element())
            .iter()
            .filter_map(|child| {
                let child = child.borrow();
                let element = child.element()?;
                (element.namespace_uri() == ODATA_DATA_NS).then(|| element.local_name().to_string())
            })
            .collect()
    }

    fn property_element(&self, name: &str) -> Option<NodeRef> {
        DomNode::child_element(&self.dom_element(), ODATA_DATA_NS, name)
    }

    /// Returns the value of property `name`, or `None` if there is no such
    /// property.
    pub fn get(&self, name: &str) -> Result<Option<PropertyValue>> {
        self.cache().get_cached_property(&cache_key(name), || {
            let Some(element) = self.property_element(name) else {
                return Ok(None);
            };
            let (null, edm_type) = {
                let node = element.borrow();
                let attrs = node.element();
                (
                    attrs.and_then(|e| e.attribute_ns(ODATA_META_NS, "null")) == Some("true"),
                    attrs
                        .and_then(|e| e.attribute_ns(ODATA_META_NS, "type"))
                        .map(str::to_string),
                )
            };
            if null {
                return Ok(Some(PropertyValue::Null));
            }
            let text = DomNode::text_content(&element);
            PropertyValue::parse(edm_type.as_deref(), &text)
                .map(Some)
                .map_err(|e| Error::malformed(format!("d:{}: {}", name, e)))
        })
    }

    /// Sets property `name`, creating the element if needed.
    pub fn set(&self, name: &str, value: &PropertyValue) -> Result<()> {
        check_name(name)?;
        let key = cache_key(name);
        self.invalidate_shared(&key);
        self.cache().write_through(&key, || {
            let element = match self.property_element(name) {
                Some(element) => element,
                None => {
                    let element = self.extensions().create_dom_element(&format!("d:{}", name))?;
                    DomNode::append_child(&self.dom_element(), element.clone());
                    element
                }
            };
            self.set_meta_attribute(&element, "m:type", value.edm_type())?;
            self.set_meta_attribute(&element, "m:null", value.is_null().then_some("true"))?;
            DomNode::set_text_content(&element, &value.to_string());
            Ok(Some(value.clone()))
        })?;
        Ok(())
    }

    /// Removes property `name`, including any duplicate elements of that
    /// name. Returns false if it was not present.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let key = cache_key(name);
        self.invalidate_shared(&key);
        self.cache().write_through_with(&key, || {
            let container = self.dom_element();
            let matching: Vec<NodeRef> = DomNode::element_children(&container)
                .into_iter()
                .filter(|child| child.borrow().is_element(ODATA_DATA_NS, name))
                .collect();
            for element in &matching {
                DomNode::remove_child(&container, element);
            }
            Ok((None::<PropertyValue>, !matching.is_empty()))
        })
    }

    fn set_meta_attribute(&self, element: &NodeRef, qname: &str, value: Option<&str>) -> Result<()> {
        let name = self.extensions().resolve_attribute_qname(qname)?;
        if let Some(element) = element.borrow_mut().element_mut() {
            match value {
                Some(value) => element.set_attribute(XmlAttribute::new(qname, name, value)),
                None => {
                    element.remove_attribute_ns(&name.namespace_uri, &name.local_name);
                }
            }
        }
        Ok(())
    }
}

impl Node for Properties {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "properties"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }
}

fn cache_key(name: &str) -> String {
    format!("d:{}", name)
}

fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("invalid property name {:?}", name)))
    }
}
