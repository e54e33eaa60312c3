//! Reelforge-XML: namespace-aware element access and schema validation
//!
//! This crate provides the XML layer every DCP reader builds on.
//!
//! # Modules
//!
//! - `document` - Owned element tree with namespace-resolved lookups
//! - `schema` - Dialect-aware schema selection and the [`SchemaValidator`] seam
//! - `error` - [`XmlError`] for unreadable documents, [`SchemaError`] for
//!   schema failures
//!
//! # Example
//!
//! ```
//! use reelforge_xml::Document;
//!
//! let doc = Document::parse(
//!     r#"<PackingList xmlns="http://www.smpte-ra.org/schemas/429-8/2007/PKL">
//!          <Id>urn:uuid:0c0c6a4c-6c10-4f5a-9b0e-93c1f7f1b001</Id>
//!        </PackingList>"#,
//! )
//! .unwrap();
//! let ns = doc.namespace();
//! assert_eq!(
//!     doc.root().child_text("Id", ns),
//!     Some("urn:uuid:0c0c6a4c-6c10-4f5a-9b0e-93c1f7f1b001")
//! );
//! ```

pub mod document;
pub mod error;
pub mod schema;

pub use document::{namespace_of, Attribute, Descendants, Document, Element, INLINE_ORIGIN};
pub use error::{Result, SchemaError, Violation, XmlError};
pub use schema::{
    DocumentKind, SchemaCatalog, SchemaCheck, SchemaSet, SchemaValidator, StructuralValidator,
};
