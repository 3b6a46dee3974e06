//! XML parsing and output.
//!
//! The parser builds namespace-aware DOM trees from text; the printer writes
//! them back, declaring namespaces where the tree needs them.

mod parser;
mod printer;

pub use parser::{parse_file, parse_str, XmlParser};
pub use printer::{
    print_to_string, print_to_string_pretty, print_with_options, XmlPrinter, XmlPrinterOptions,
};
