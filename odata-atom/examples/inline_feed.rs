//! Example: embed a feed into a link of an OData entry
//!
//! Reads an entry document, finds the link with the given relation and
//! embeds the feed read from a second file into it, then prints the result.
//!
//! Usage: cargo run --example inline_feed <entry.xml> <feed.xml> <rel>

use std::env;

use odata_atom::{EntryNode, Extensions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 4 {
        eprintln!("Usage: {} <entry.xml> <feed.xml> <rel>", args[0]);
        std::process::exit(1);
    }

    let extensions = Extensions::odata();

    eprintln!("Parsing entry: {}", args[1]);
    let document = extensions
        .parse_document_file(&args[1])?
        .ok_or("unrecognized document")?;
    let entry = document
        .as_entry()
        .ok_or("not an entry document")?
        .odata_entry()?;

    eprintln!("Parsing feed: {}", args[2]);
    let feed = extensions
        .parse_document_file(&args[2])?
        .and_then(|d| d.into_feed())
        .ok_or("not a feed document")?
        .feed();

    let link = match entry.link_by_rel(&args[3])? {
        Some(link) => link,
        None => entry.add_link(&args[3], &feed.id()?)?,
    };
    let link = link
        .as_inline_feed_link()
        .ok_or("link cannot embed feeds")?;
    link.set_feed(&feed)?;

    eprintln!(
        "Embedded {} entries into {}",
        feed.entries()?.len(),
        entry.id()?
    );
    print!("{}", document.to_xml_pretty()?);
    Ok(())
}
