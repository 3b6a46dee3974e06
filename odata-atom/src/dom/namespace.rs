//! Namespace handling for XML elements.

use std::collections::HashMap;
use std::rc::Rc;

use crate::constants::XML_NS;

/// Represents an expanded XML name (namespace URI + local name).
///
/// This is the dispatch key used to route DOM elements to typed nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    /// The namespace URI (empty string for no namespace).
    pub namespace_uri: Rc<str>,
    /// The local part of the name (without prefix).
    pub local_name: String,
}

impl ExpandedName {
    /// Creates a new expanded name with a namespace.
    pub fn new(uri: impl Into<Rc<str>>, local: impl Into<String>) -> Self {
        Self {
            namespace_uri: uri.into(),
            local_name: local.into(),
        }
    }

    /// Creates an expanded name with no namespace.
    pub fn no_namespace(local: impl Into<String>) -> Self {
        Self {
            namespace_uri: "".into(),
            local_name: local.into(),
        }
    }

    /// Returns true if this name is `local` in namespace `uri`.
    pub fn is(&self, uri: &str, local: &str) -> bool {
        &*self.namespace_uri == uri && self.local_name == local
    }

    /// Returns true if the name has no namespace.
    pub fn has_namespace(&self) -> bool {
        !self.namespace_uri.is_empty()
    }
}

impl std::fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace_uri.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace_uri, self.local_name)
        }
    }
}

/// Tracks namespace bindings while walking a tree (parsing or printing).
pub struct NamespaceContext {
    /// URI interning cache for memory efficiency.
    uri_cache: HashMap<String, Rc<str>>,
    /// Stack of scopes, each containing prefix -> URI bindings.
    scopes: Vec<HashMap<String, Rc<str>>>,
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext {
    /// Creates a new namespace context with the `xml` prefix pre-bound.
    pub fn new() -> Self {
        let mut ctx = NamespaceContext {
            uri_cache: HashMap::new(),
            scopes: vec![HashMap::new()],
        };
        ctx.bind("xml", XML_NS);
        ctx
    }

    /// Pushes a new scope for entering an element.
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the current scope when leaving an element.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Binds a prefix to a URI in the current scope. The empty prefix is the
    /// default namespace.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        let uri_rc = self.intern_uri(uri);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(prefix.to_string(), uri_rc);
        }
    }

    /// Resolves a prefix to its URI, searching from innermost scope.
    pub fn resolve(&self, prefix: &str) -> Option<Rc<str>> {
        for scope in self.scopes.iter().rev() {
            if let Some(uri) = scope.get(prefix) {
                return Some(uri.clone());
            }
        }
        None
    }

    /// Returns true if `prefix` currently resolves to `uri`.
    ///
    /// An unbound empty prefix counts as bound to "no namespace".
    pub fn is_bound(&self, prefix: &str, uri: &str) -> bool {
        match self.resolve(prefix) {
            Some(bound) => &*bound == uri,
            None => prefix.is_empty() && uri.is_empty(),
        }
    }

    /// Returns the default namespace (empty prefix binding).
    pub fn default_namespace(&self) -> Option<Rc<str>> {
        self.resolve("").filter(|uri| !uri.is_empty())
    }

    /// Interns a URI string for memory efficiency.
    pub fn intern_uri(&mut self, uri: &str) -> Rc<str> {
        if let Some(cached) = self.uri_cache.get(uri) {
            cached.clone()
        } else {
            let rc: Rc<str> = uri.into();
            self.uri_cache.insert(uri.to_string(), rc.clone());
            rc
        }
    }
}

/// Splits a qualified name into prefix and local name.
///
/// Returns (Some(prefix), local) for "prefix:local"
/// Returns (None, name) for "name" without prefix
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some(pos) = qname.find(':') {
        (Some(&qname[..pos]), &qname[pos + 1..])
    } else {
        (None, qname)
    }
}

/// Returns the prefix declared by an `xmlns` attribute, if it is one.
///
/// `xmlns` declares the default namespace and yields `Some("")`.
pub fn xmlns_prefix(attr_name: &str) -> Option<&str> {
    if attr_name == "xmlns" {
        Some("")
    } else {
        attr_name.strip_prefix("xmlns:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ATOM_NS, ODATA_META_NS};

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("m:inline"), (Some("m"), "inline"));
        assert_eq!(split_qname("link"), (None, "link"));
        assert_eq!(split_qname("ns:foo:bar"), (Some("ns"), "foo:bar"));
    }

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.bind("m", ODATA_META_NS);

        assert_eq!(ctx.resolve("m").as_deref(), Some(ODATA_META_NS));
        assert!(ctx.is_bound("m", ODATA_META_NS));

        ctx.pop_scope();
        assert!(ctx.resolve("m").is_none());
    }

    #[test]
    fn test_xmlns_prefix() {
        assert_eq!(xmlns_prefix("xmlns"), Some(""));
        assert_eq!(xmlns_prefix("xmlns:m"), Some("m"));
        assert_eq!(xmlns_prefix("xml:lang"), None);
        assert_eq!(xmlns_prefix("href"), None);
    }

    #[test]
    fn test_default_namespace() {
        let mut ctx = NamespaceContext::new();
        assert!(ctx.default_namespace().is_none());
        assert!(ctx.is_bound("", ""));

        ctx.push_scope();
        ctx.bind("", ATOM_NS);
        assert_eq!(ctx.default_namespace().as_deref(), Some(ATOM_NS));
        assert!(!ctx.is_bound("", ""));

        // xmlns="" undeclares the default namespace
        ctx.push_scope();
        ctx.bind("", "");
        assert!(ctx.default_namespace().is_none());
        assert!(ctx.is_bound("", ""));
    }

    #[test]
    fn test_expanded_name() {
        let name = ExpandedName::new(ATOM_NS, "link");
        assert!(name.is(ATOM_NS, "link"));
        assert!(!name.is(ODATA_META_NS, "link"));
        assert_eq!(name.to_string(), format!("{{{}}}link", ATOM_NS));
        assert_eq!(ExpandedName::no_namespace("href").to_string(), "href");
    }
}
