use std::rc::Rc;

use tracing::debug;

use super::{Feed, LinkNode};
use crate::constants::ODATA_META_NS;
use crate::dom::{DomNode, NodeRef};
use crate::error::{Error, Result};
use crate::extension::Extensions;
use crate::node::{Node, NodeCore};

const INLINE: &str = "m:inline";
const INLINE_FEED: &str = "m:inline/atom:feed";

/// A link that may embed a complete feed.
///
/// The embedded feed lives in an `m:inline` wrapper directly under the link.
/// The wrapper holds at most one child, the root element of the feed.
#[derive(Debug, Clone)]
pub struct InlineFeedLink {
    core: Rc<NodeCore>,
}

impl InlineFeedLink {
    pub(crate) fn from_element(extensions: Rc<Extensions>, element: NodeRef) -> Self {
        InlineFeedLink {
            core: NodeCore::new(extensions, element),
        }
    }

    /// Creates an empty `atom:link` under `parent`.
    pub fn new(parent: &dyn Node) -> Result<Self> {
        Ok(InlineFeedLink {
            core: NodeCore::create_in(parent, "atom:link")?,
        })
    }

    /// Returns true if the link has an `m:inline` wrapper, even an empty one.
    pub fn is_inline(&self) -> Result<bool> {
        Ok(self.query_single(INLINE)?.is_some())
    }

    /// The embedded feed, or `None` when the link does not embed one.
    ///
    /// The feed is parsed through the extension registry on first access, so
    /// links inside it are inline feed links in turn.
    pub fn feed(&self) -> Result<Option<Feed>> {
        self.cache().get_cached_property("feed", || {
            let Some(element) = self.query_single(INLINE_FEED)? else {
                return Ok(None);
            };
            self.extensions()
                .parse_element(self, &element)
                .and_then(|typed| typed.into_feed())
                .map(Some)
                .ok_or_else(|| Error::malformed("embedded feed was not recognized as a feed"))
        })
    }

    /// Embeds `feed`, replacing any feed embedded before.
    ///
    /// The feed's root element is moved into the wrapper; it is detached from
    /// wherever it was. A link that embedded it before no longer reports it.
    /// The DOM is not restored if this fails partway.
    pub fn set_feed(&self, feed: &Feed) -> Result<()> {
        let root = feed.dom_element();
        let link = self.dom_element();
        if is_ancestor_or_self(&root, &link) {
            return Err(Error::InvalidArgument(
                "a link cannot embed a feed that contains it".to_string(),
            ));
        }

        if let Some(source) = embedding_link(&root) {
            debug!("feed is already embedded, moving it");
            DomNode::invalidate_cached(&source, "feed");
        }
        self.invalidate_shared("feed");
        self.cache().write_through("feed", || {
            let wrapper = match self.query_single(INLINE)? {
                Some(wrapper) => wrapper,
                None => {
                    debug!("creating m:inline wrapper");
                    let wrapper = self.extensions().create_dom_element(INLINE)?;
                    DomNode::append_child(&link, wrapper.clone());
                    wrapper
                }
            };
            let replaced = wrapper.borrow().child_count();
            DomNode::remove_children(&wrapper);
            DomNode::append_child(&wrapper, root.clone());
            debug!(replaced, "inline feed set");
            Ok(Some(feed.clone()))
        })?;
        Ok(())
    }

    /// Removes the `m:inline` wrapper and the feed in it.
    pub fn clear_feed(&self) -> Result<()> {
        self.invalidate_shared("feed");
        self.cache().write_through("feed", || {
            if let Some(wrapper) = self.query_single(INLINE)? {
                DomNode::detach(&wrapper);
            }
            Ok(None::<Feed>)
        })?;
        Ok(())
    }
}

impl Node for InlineFeedLink {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "inline-feed-link"
    }

    fn as_node(&self) -> &dyn Node {
        self
    }
}

impl LinkNode for InlineFeedLink {}

/// Returns the element holding the `m:inline` wrapper that `root` sits in.
fn embedding_link(root: &NodeRef) -> Option<NodeRef> {
    let wrapper = DomNode::parent_of(root)?;
    if !wrapper.borrow().is_element(ODATA_META_NS, "inline") {
        return None;
    }
    DomNode::parent_of(&wrapper)
}

fn is_ancestor_or_self(candidate: &NodeRef, node: &NodeRef) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if Rc::ptr_eq(&n, candidate) {
            return true;
        }
        current = DomNode::parent_of(&n);
    }
    false
}
