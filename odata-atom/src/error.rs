//! Error types for the OData Atom layer.

use thiserror::Error;

/// Result type alias for OData Atom operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, querying or building typed nodes.
///
/// Dispatch declines are not errors: they surface as `None`.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// A structurally mandatory sub-element or value is missing or invalid.
    #[error("Malformed node: {0}")]
    MalformedNode(String),

    /// A creation request for a name this extension claims but cannot satisfy.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A qualified name uses a prefix no registered extension binds.
    #[error("Unknown namespace prefix: {0}")]
    UnknownPrefix(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl Error {
    /// Shorthand for a [`Error::MalformedNode`] with a formatted message.
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedNode(msg.into())
    }
}
