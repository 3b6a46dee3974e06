use std::rc::Rc;

use crate::dom::NodeRef;
use crate::element::Feed;
use crate::error::Result;
use crate::extension::Extensions;
use crate::node::{Node, NodeCore};

/// A document whose root is an Atom feed.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    core: Rc<NodeCore>,
}

impl FeedDocument {
    pub(crate) fn from_root(extensions: Rc<Extensions>, root: NodeRef) -> Self {
        FeedDocument {
            core: NodeCore::new(extensions, root),
        }
    }

    /// Creates a document with an empty `feed` root.
    pub fn new(extensions: &Rc<Extensions>) -> Result<Self> {
        let root = extensions.create_root_element("atom:feed")?;
        Ok(Self::from_root(extensions.clone(), root))
    }

    /// The root feed. Shares this document's property cache.
    pub fn feed(&self) -> Feed {
        Feed::from_core(self.core.clone())
    }
}

impl Node for FeedDocument {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "feed-document"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }
}
