use std::rc::Rc;

use crate::constants::XML_NS;
use crate::dom::NodeRef;
use crate::error::Result;
use crate::extension::Extensions;
use crate::node::{Node, NodeCore};

/// An OData error response, rooted at `m:error`.
///
/// ```xml
/// <m:error xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
///   <m:code>ResourceNotFound</m:code>
///   <m:message xml:lang="en-US">Resource not found for the segment 'Products'.</m:message>
/// </m:error>
/// ```
#[derive(Debug, Clone)]
pub struct ErrorDocument {
    core: Rc<NodeCore>,
}

impl ErrorDocument {
    pub(crate) fn from_root(extensions: Rc<Extensions>, root: NodeRef) -> Self {
        ErrorDocument {
            core: NodeCore::new(extensions, root),
        }
    }

    /// The service-defined error code.
    pub fn code(&self) -> Result<String> {
        self.cache()
            .get_cached_property("code", || self.required_child_text("m:code"))
    }

    /// The human readable message.
    pub fn message(&self) -> Result<String> {
        self.cache()
            .get_cached_property("message", || self.required_child_text("m:message"))
    }

    /// The `xml:lang` of the message, if given.
    pub fn message_lang(&self) -> Result<Option<String>> {
        self.cache().get_cached_property("message_lang", || {
            let Some(message) = self.query_single("m:message")? else {
                return Ok(None);
            };
            let lang = message
                .borrow()
                .element()
                .and_then(|e| e.attribute_ns(XML_NS, "lang"))
                .map(str::to_string);
            Ok(lang)
        })
    }

    /// The text of `m:innererror`, which services use for debug details.
    pub fn inner_error(&self) -> Result<Option<String>> {
        self.cache()
            .get_cached_property("inner_error", || self.child_text("m:innererror"))
    }
}

impl Node for ErrorDocument {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "error-document"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }
}
