use std::rc::Rc;

use crate::constants::DEFAULT_LINK_REL;
use crate::dom::NodeRef;
use crate::error::{Error, Result};
use crate::extension::Extensions;
use crate::node::{Node, NodeCore};

/// Attribute accessors shared by every kind of link.
pub trait LinkNode: Node {
    /// The link relation, `alternate` when the attribute is absent.
    fn rel(&self) -> Result<String> {
        self.cache().get_cached_property("rel", || {
            Ok(self
                .attribute("rel")?
                .unwrap_or_else(|| DEFAULT_LINK_REL.to_string()))
        })
    }

    fn set_rel(&self, rel: &str) -> Result<()> {
        self.cache().write_through("rel", || {
            self.set_attribute("rel", rel)?;
            Ok(rel.to_string())
        })?;
        Ok(())
    }

    /// The link target. A link without `href` is malformed.
    fn href(&self) -> Result<String> {
        self.cache().get_cached_property("href", || {
            self.attribute("href")?
                .ok_or_else(|| Error::malformed(format!("{} has no href", self.kind())))
        })
    }

    fn set_href(&self, href: &str) -> Result<()> {
        self.cache().write_through("href", || {
            self.set_attribute("href", href)?;
            Ok(href.to_string())
        })?;
        Ok(())
    }

    /// The advertised media type of the target.
    fn link_type(&self) -> Result<Option<String>> {
        self.cache()
            .get_cached_property("type", || self.attribute("type"))
    }

    fn set_link_type(&self, link_type: Option<&str>) -> Result<()> {
        self.cache().write_through("type", || {
            match link_type {
                Some(value) => self.set_attribute("type", value)?,
                None => self.remove_attribute("type")?,
            }
            Ok(link_type.map(str::to_string))
        })?;
        Ok(())
    }

    fn title(&self) -> Result<Option<String>> {
        self.cache()
            .get_cached_property("title", || self.attribute("title"))
    }

    fn set_title(&self, title: Option<&str>) -> Result<()> {
        self.cache().write_through("title", || {
            match title {
                Some(value) => self.set_attribute("title", value)?,
                None => self.remove_attribute("title")?,
            }
            Ok(title.map(str::to_string))
        })?;
        Ok(())
    }
}

/// A plain Atom link.
#[derive(Debug, Clone)]
pub struct Link {
    core: Rc<NodeCore>,
}

impl Link {
    pub(crate) fn from_element(extensions: Rc<Extensions>, element: NodeRef) -> Self {
        Link {
            core: NodeCore::new(extensions, element),
        }
    }

    /// Creates an empty `atom:link` under `parent`.
    pub fn new(parent: &dyn Node) -> Result<Self> {
        Ok(Link {
            core: NodeCore::create_in(parent, "atom:link")?,
        })
    }
}

impl Node for Link {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "link"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }
}

impl LinkNode for Link {}
