//! OData Atom document tool
//!
//! Inspects OData Atom responses and creates empty documents through the
//! extension registry.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::rc::Rc;

use clap::{Parser, Subcommand};
use odata_atom::{
    Document, Element, EntryNode, Extensions, Feed, LinkNode, Node, Properties, PropertyValue,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// OData Atom document tool
#[derive(Parser)]
#[command(name = "odata")]
#[command(version)]
#[command(about = "Inspect and create OData Atom documents", long_about = None)]
struct Cli {
    /// Only use the plain Atom extension
    #[arg(long, global = true)]
    atom_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an outline of a document
    #[command(visible_alias = "i")]
    Inspect {
        /// Document to read
        file: String,
    },

    /// Create an empty document, e.g. `atom:entry`
    #[command(visible_alias = "c")]
    Create {
        /// Qualified name of the document root
        name: String,
        /// Output file (default: stdout)
        output: Option<String>,

        /// Indent the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the registered namespace prefixes
    #[command(visible_alias = "ns")]
    Namespaces,
}

fn main() -> std::process::ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let extensions = if cli.atom_only {
        Rc::new(Extensions::new())
    } else {
        Extensions::odata()
    };
    debug!(?extensions, "registry ready");

    let result = match cli.command {
        Commands::Inspect { file } => run_inspect(&extensions, &file),
        Commands::Create {
            name,
            output,
            pretty,
        } => run_create(&extensions, &name, output.as_deref(), pretty),
        Commands::Namespaces => run_namespaces(&extensions),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

/// Parses a document and prints its outline.
fn run_inspect(extensions: &Rc<Extensions>, path: &str) -> CliResult<()> {
    let document = extensions
        .parse_document_file(path)?
        .ok_or_else(|| format!("{}: no extension recognizes the root element", path))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &document {
        Document::Feed(feed) => print_feed(&mut out, &feed.feed(), 0)?,
        Document::Entry(entry) => print_entry(&mut out, &entry.entry()?, 0)?,
        Document::Error(error) => {
            writeln!(out, "error {}", error.code()?)?;
            match error.message_lang()? {
                Some(lang) => writeln!(out, "  message [{}]: {}", lang, error.message()?)?,
                None => writeln!(out, "  message: {}", error.message()?)?,
            }
            if let Some(inner) = error.inner_error()? {
                writeln!(out, "  inner: {}", inner.trim())?;
            }
        }
    }
    Ok(())
}

/// Creates an empty document and writes it out.
fn run_create(
    extensions: &Rc<Extensions>,
    name: &str,
    output_path: Option<&str>,
    pretty: bool,
) -> CliResult<()> {
    let document = extensions
        .create_document(name)?
        .ok_or_else(|| format!("no extension creates {} documents", name))?;
    let xml = if pretty {
        document.to_xml_pretty()?
    } else {
        document.to_xml()?
    };

    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    output.write_all(xml.as_bytes())?;
    output.flush()?;
    Ok(())
}

fn run_namespaces(extensions: &Rc<Extensions>) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (prefix, uri) in extensions.namespaces() {
        writeln!(out, "{:<6} {}", prefix, uri)?;
    }
    Ok(())
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Required values are shown as `?` when missing instead of aborting the
/// whole outline.
fn or_missing(value: odata_atom::Result<String>) -> String {
    value.unwrap_or_else(|_| "?".to_string())
}

fn print_feed(out: &mut impl Write, feed: &Feed, depth: usize) -> CliResult<()> {
    writeln!(
        out,
        "{}feed {} \"{}\"",
        indent(depth),
        or_missing(feed.id()),
        or_missing(feed.title())
    )?;
    for link in feed.links()? {
        print_link(out, &link, depth + 1)?;
    }
    for entry in feed.entries()? {
        print_entry(out, &entry, depth + 1)?;
    }
    Ok(())
}

fn print_entry(out: &mut impl Write, element: &Element, depth: usize) -> CliResult<()> {
    let Some(entry) = element.as_entry_node() else {
        return Ok(());
    };
    let pad = indent(depth);
    writeln!(
        out,
        "{}{} {} \"{}\"",
        pad,
        element.kind(),
        or_missing(entry.id()),
        or_missing(entry.title())
    )?;
    if let Some(odata) = element.as_entry() {
        if let Some(entity_type) = odata.entity_type()? {
            writeln!(out, "{}  type {}", pad, entity_type)?;
        }
        if let Some(properties) = odata.properties()? {
            print_properties(out, &properties, depth + 1)?;
        }
    }
    for link in entry.links()? {
        print_link(out, &link, depth + 1)?;
    }
    Ok(())
}

fn print_link(out: &mut impl Write, element: &Element, depth: usize) -> CliResult<()> {
    let Some(link) = element.as_link_node() else {
        return Ok(());
    };
    writeln!(
        out,
        "{}link {} -> {}",
        indent(depth),
        link.rel()?,
        or_missing(link.href())
    )?;
    if let Some(inline) = element.as_inline_feed_link() {
        if let Some(feed) = inline.feed()? {
            print_feed(out, &feed, depth + 1)?;
        }
    }
    Ok(())
}

fn print_properties(out: &mut impl Write, properties: &Properties, depth: usize) -> CliResult<()> {
    let pad = indent(depth);
    for name in properties.names() {
        match properties.get(&name) {
            Ok(Some(PropertyValue::Null)) => writeln!(out, "{}{} = null", pad, name)?,
            Ok(Some(value)) => writeln!(
                out,
                "{}{}: {} = {}",
                pad,
                name,
                value.edm_type().unwrap_or("Edm.String"),
                value
            )?,
            Ok(None) => {}
            Err(e) => writeln!(out, "{}{} = <{}>", pad, name, e)?,
        }
    }
    Ok(())
}
