//! XPath-like structural queries over DOM elements.
//!
//! A query path is a `/`-separated list of child steps evaluated from a
//! context element. Each step is `prefix:local`, an unprefixed `local`
//! (matches elements without a namespace), `prefix:*`, or `*`. A lone `.`
//! selects the context element itself. Prefixes resolve through the prefix
//! table of the extension registry, not through the document's declarations.

use bitflags::bitflags;

use crate::dom::{split_qname, DomNode, NodeRef};
use crate::error::{Error, Result};

bitflags! {
    /// Flags that shape a query result.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct QueryFlags: u8 {
        /// Return all matches.
        const ALL = 0;
        /// Stop at the first match.
        const SINGLE = 1;
        /// An empty result is a malformed-node error.
        const REQUIRED = 2;
    }
}

/// A single resolved path step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// The context node.
    SelfNode,
    /// Any element child.
    Any,
    /// Any element child in the given namespace.
    AnyIn(String),
    /// An element child with the given namespace and local name.
    Named(String, String),
}

impl Step {
    fn matches(&self, node: &NodeRef) -> bool {
        let borrowed = node.borrow();
        let Some(element) = borrowed.element() else {
            return false;
        };
        match self {
            Step::SelfNode => true,
            Step::Any => true,
            Step::AnyIn(uri) => element.namespace_uri() == uri,
            Step::Named(uri, local) => element.expanded_name().is(uri, local),
        }
    }
}

/// Resolves every step of `path` through `resolve_prefix`.
fn compile<F>(path: &str, resolve_prefix: F) -> Result<Vec<Step>>
where
    F: Fn(&str) -> Option<String>,
{
    if path.is_empty() {
        return Err(Error::InvalidArgument("empty query path".to_string()));
    }
    path.split('/')
        .map(|step| match split_qname(step) {
            (_, "") => Err(Error::InvalidArgument(format!("empty step in {}", path))),
            (None, ".") => Ok(Step::SelfNode),
            (None, "*") => Ok(Step::Any),
            (None, local) => Ok(Step::Named(String::new(), local.to_string())),
            (Some(prefix), local) => {
                let uri = resolve_prefix(prefix)
                    .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))?;
                Ok(if local == "*" {
                    Step::AnyIn(uri)
                } else {
                    Step::Named(uri, local.to_string())
                })
            }
        })
        .collect()
}

/// Evaluates `path` from `context`.
///
/// With [`QueryFlags::SINGLE`] at most one node is returned. With
/// [`QueryFlags::REQUIRED`] an empty result becomes [`Error::MalformedNode`].
pub fn query<F>(
    context: &NodeRef,
    path: &str,
    resolve_prefix: F,
    flags: QueryFlags,
) -> Result<Vec<NodeRef>>
where
    F: Fn(&str) -> Option<String>,
{
    let steps = compile(path, resolve_prefix)?;
    let mut current = vec![context.clone()];
    for step in &steps {
        let mut next = Vec::new();
        for node in &current {
            if *step == Step::SelfNode {
                next.push(node.clone());
                continue;
            }
            next.extend(
                node.borrow()
                    .children()
                    .iter()
                    .filter(|c| step.matches(c))
                    .cloned(),
            );
        }
        current = next;
        if current.is_empty() {
            break;
        }
    }

    if flags.contains(QueryFlags::SINGLE) {
        current.truncate(1);
    }
    if current.is_empty() && flags.contains(QueryFlags::REQUIRED) {
        let owner = context
            .borrow()
            .element()
            .map(|e| e.qname().to_string())
            .unwrap_or_default();
        return Err(Error::malformed(format!(
            "<{}> has no required {} element",
            owner, path
        )));
    }
    Ok(current)
}

/// Returns the text of the first match of `path`, if any.
pub fn query_text<F>(context: &NodeRef, path: &str, resolve_prefix: F) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(query(context, path, resolve_prefix, QueryFlags::SINGLE)?
        .first()
        .map(DomNode::text_content))
}
