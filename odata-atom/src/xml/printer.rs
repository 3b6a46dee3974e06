//! XML printer that outputs DOM trees.
//!
//! The printer tracks namespace bindings in scope while it walks the tree and
//! declares any prefix an element or attribute needs but its ancestors do not
//! provide. Subtrees moved between documents therefore still print as
//! well-formed, namespace-correct XML.

use std::io::Write;

use crate::dom::{NamespaceContext, NodeRef, XmlContent, XmlElement};

/// Options for XML printing.
#[derive(Debug, Clone)]
pub struct XmlPrinterOptions {
    /// Whether to pretty-print with indentation.
    pub pretty_print: bool,
    /// Whether to write the `<?xml ...?>` declaration.
    pub declaration: bool,
}

impl Default for XmlPrinterOptions {
    fn default() -> Self {
        XmlPrinterOptions {
            pretty_print: false,
            declaration: true,
        }
    }
}

/// XML printer that outputs DOM trees.
pub struct XmlPrinter<W: Write> {
    writer: W,
    options: XmlPrinterOptions,
    ns: NamespaceContext,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new XML printer.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XmlPrinterOptions::default())
    }

    /// Creates a new XML printer with the given options.
    pub fn with_options(writer: W, options: XmlPrinterOptions) -> Self {
        XmlPrinter {
            writer,
            options,
            ns: NamespaceContext::new(),
        }
    }

    /// Prints a tree rooted at `root` as a complete document.
    pub fn print(&mut self, root: &NodeRef) -> std::io::Result<()> {
        if self.options.declaration {
            write!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
            writeln!(self.writer)?;
        }
        self.print_node(root, 0)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    /// Prints a tree as a fragment (no XML declaration, no trailing newline).
    pub fn print_fragment(&mut self, root: &NodeRef) -> std::io::Result<()> {
        self.print_node(root, 0)
    }

    fn print_node(&mut self, node: &NodeRef, depth: usize) -> std::io::Result<()> {
        let borrowed = node.borrow();
        match borrowed.content() {
            XmlContent::Text(text) => write!(self.writer, "{}", to_entities(text.text(), false)),
            XmlContent::Comment(comment) => write!(self.writer, "<!--{}-->", comment.text()),
            XmlContent::Element(element) => {
                self.ns.push_scope();
                let result = self.print_element(element, borrowed.children(), depth);
                self.ns.pop_scope();
                result
            }
        }
    }

    fn print_element(
        &mut self,
        element: &XmlElement,
        children: &[NodeRef],
        depth: usize,
    ) -> std::io::Result<()> {
        let (name, decls) = self.declarations_for(element);

        let mut tag = String::new();
        tag.push('<');
        tag.push_str(&name);
        for (prefix, uri) in &decls {
            if prefix.is_empty() {
                tag.push_str(" xmlns=\"");
            } else {
                tag.push_str(" xmlns:");
                tag.push_str(prefix);
                tag.push_str("=\"");
            }
            tag.push_str(&to_entities(uri, true));
            tag.push('"');
        }
        for attr in element.attributes() {
            tag.push(' ');
            tag.push_str(&attr.qname);
            tag.push_str("=\"");
            tag.push_str(&to_entities(&attr.value, true));
            tag.push('"');
        }

        if children.is_empty() {
            tag.push_str(" />");
            return write!(self.writer, "{}", tag);
        }
        tag.push('>');
        write!(self.writer, "{}", tag)?;

        // Only indent element-only content, mixed content is printed verbatim
        let indent = self.options.pretty_print
            && children.iter().all(|c| !c.borrow().content().is_text());
        for child in children {
            if indent {
                writeln!(self.writer)?;
                write!(self.writer, "{}", Self::indent_str(depth + 1))?;
            }
            self.print_node(child, depth + 1)?;
        }
        if indent {
            writeln!(self.writer)?;
            write!(self.writer, "{}", Self::indent_str(depth))?;
        }
        write!(self.writer, "</{}>", name)
    }

    /// Picks the tag name and binds every namespace declaration this element
    /// must carry.
    ///
    /// Declarations written on the element are kept; prefixes used by the
    /// element or its attributes that are not in scope are added. A prefixed
    /// element whose prefix is unbound but whose namespace is the default one
    /// in scope is written with its local name.
    fn declarations_for(&mut self, element: &XmlElement) -> (String, Vec<(String, String)>) {
        let mut decls: Vec<(String, String)> = Vec::new();
        for (prefix, uri) in element.namespace_decls() {
            self.ns.bind(prefix, uri);
            decls.push((prefix.clone(), uri.clone()));
        }

        let uri = element.namespace_uri();
        let mut name = element.qname().to_string();
        let mut required = Vec::new();
        match element.prefix() {
            Some(prefix)
                if !self.ns.is_bound(prefix, uri)
                    && self.ns.default_namespace().as_deref() == Some(uri) =>
            {
                name = element.local_name().to_string();
            }
            prefix => required.push((prefix.unwrap_or("").to_string(), uri.to_string())),
        }
        for attr in element.attributes() {
            if let Some(prefix) = attr.prefix() {
                required.push((prefix.to_string(), attr.name.namespace_uri.to_string()));
            }
        }

        for (prefix, uri) in required {
            if prefix == "xml" || self.ns.is_bound(&prefix, &uri) {
                continue;
            }
            self.ns.bind(&prefix, &uri);
            decls.retain(|(p, _)| *p != prefix);
            decls.push((prefix, uri));
        }
        (name, decls)
    }

    fn indent_str(level: usize) -> String {
        "  ".repeat(level)
    }
}

/// Converts special characters to XML entities.
fn to_entities(s: &str, attribute: bool) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if attribute => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Prints a tree to a string.
pub fn print_to_string(root: &NodeRef) -> std::io::Result<String> {
    print_with_options(root, XmlPrinterOptions::default())
}

/// Prints a tree to a string with pretty printing.
pub fn print_to_string_pretty(root: &NodeRef) -> std::io::Result<String> {
    print_with_options(
        root,
        XmlPrinterOptions {
            pretty_print: true,
            ..XmlPrinterOptions::default()
        },
    )
}

/// Prints a tree to a string with the given options.
pub fn print_with_options(root: &NodeRef, options: XmlPrinterOptions) -> std::io::Result<String> {
    let mut output = Vec::new();
    {
        let mut printer = XmlPrinter::with_options(&mut output, options);
        printer.print(root)?;
    }
    Ok(String::from_utf8_lossy(&output).to_string())
}
