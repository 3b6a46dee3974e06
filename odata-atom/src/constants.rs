//! Namespace URIs and well-known names.

/// The Atom syndication namespace.
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// The OData metadata namespace (prefix `m`).
pub const ODATA_META_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";

/// The OData data namespace (prefix `d`).
pub const ODATA_DATA_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices";

/// Category scheme that marks an entry's entity type.
pub const ODATA_SCHEME_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/scheme";

/// The `xml` prefix namespace, always bound.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix for the Atom namespace in symbolic names and queries.
pub const ATOM_PREFIX: &str = "atom";

/// Prefix for the OData metadata namespace.
pub const ODATA_META_PREFIX: &str = "m";

/// Prefix for the OData data namespace.
pub const ODATA_DATA_PREFIX: &str = "d";

/// Relation used by links without an explicit `rel` attribute.
pub const DEFAULT_LINK_REL: &str = "alternate";

/// Content type of entries whose content carries `m:properties`.
pub const XML_CONTENT_TYPE: &str = "application/xml";
