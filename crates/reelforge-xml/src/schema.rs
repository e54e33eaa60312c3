//! Schema validation of DCP manifests.
//!
//! Full XSD validation is delegated to whatever implements
//! [`SchemaValidator`]. The crate ships [`StructuralValidator`], which checks
//! the parts of a schema that matter for ingest: the root element and its
//! namespace, and the presence of every element a sequence declares as
//! required, recursively through named and inline complex types.
//!
//! Which schema applies is decided by the document's root namespace
//! ([`Dialect::detect`]) and its [`DocumentKind`], resolved against a schema
//! directory laid out as:
//!
//! ```text
//! <schema_dir>/smpte/{am,pkl,cpl,kdm}.xsd
//! <schema_dir>/interop/{am,pkl,cpl,kdm}.xsd
//! <schema_dir>/xmldsig-core-schema.xsd   (imported by pkl, cpl, kdm)
//! <schema_dir>/xenc-schema.xsd           (imported by kdm)
//! ```

use reelforge_common::Dialect;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::document::{Document, Element};
use crate::error::{SchemaError, Violation};

const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";
const XMLDSIG_SCHEMA: &str = "xmldsig-core-schema.xsd";
const XENC_SCHEMA: &str = "xenc-schema.xsd";

/// Nesting limit for recursive content-model checks.
const MAX_DEPTH: usize = 32;

/// The manifest types that carry a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    AssetMap,
    PackingList,
    CompositionPlaylist,
    Kdm,
}

impl DocumentKind {
    fn file_name(self) -> &'static str {
        match self {
            Self::AssetMap => "am.xsd",
            Self::PackingList => "pkl.xsd",
            Self::CompositionPlaylist => "cpl.xsd",
            Self::Kdm => "kdm.xsd",
        }
    }

    fn imports(self) -> &'static [&'static str] {
        match self {
            Self::AssetMap => &[],
            Self::PackingList | Self::CompositionPlaylist => &[XMLDSIG_SCHEMA],
            Self::Kdm => &[XMLDSIG_SCHEMA, XENC_SCHEMA],
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssetMap => write!(f, "ASSETMAP"),
            Self::PackingList => write!(f, "PKL"),
            Self::CompositionPlaylist => write!(f, "CPL"),
            Self::Kdm => write!(f, "KDM"),
        }
    }
}

/// A primary schema plus the auxiliary schemas it imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSet {
    pub primary: PathBuf,
    pub imports: Vec<PathBuf>,
}

/// Resolves schema sets from a fixed local directory.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    root: PathBuf,
}

impl SchemaCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Schema set for a document kind in a dialect.
    pub fn schema_set(&self, kind: DocumentKind, dialect: Dialect) -> SchemaSet {
        SchemaSet {
            primary: self.root.join(dialect.to_string()).join(kind.file_name()),
            imports: kind.imports().iter().map(|name| self.root.join(name)).collect(),
        }
    }
}

/// Confirms a document conforms to a schema set.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait SchemaValidator: Send + Sync {
    /// Human-readable name identifying this validator implementation.
    fn name(&self) -> &'static str;

    /// Validate `document` against `schemas`.
    ///
    /// Returns [`SchemaError::Invalid`] with every violation found, or
    /// [`SchemaError::SchemaUnreadable`] when a schema file cannot be loaded.
    fn validate(&self, document: &Document, schemas: &SchemaSet) -> Result<(), SchemaError>;
}

/// Validator that checks root declaration, namespace and required elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaValidator for StructuralValidator {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn validate(&self, document: &Document, schemas: &SchemaSet) -> Result<(), SchemaError> {
        let primary = load_schema(&schemas.primary)?;
        for import in &schemas.imports {
            load_schema(import)?;
        }

        let model = SchemaModel::new(primary.root());
        let violations = model.check_root(document.root());
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid {
                path: document.origin().to_path_buf(),
                violations,
            })
        }
    }
}

fn load_schema(path: &Path) -> Result<Document, SchemaError> {
    let doc = Document::from_file(path).map_err(|e| SchemaError::SchemaUnreadable {
        schema: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if !doc.root().is("schema", Some(XS_NS)) {
        return Err(SchemaError::SchemaUnreadable {
            schema: path.to_path_buf(),
            message: format!("root element <{}> is not xs:schema", doc.root().name()),
        });
    }
    Ok(doc)
}

/// Strip a `prefix:` from a QName-valued schema attribute.
fn local_part(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

struct SchemaModel<'a> {
    schema: &'a Element,
    target_namespace: Option<&'a str>,
}

impl<'a> SchemaModel<'a> {
    fn new(schema: &'a Element) -> Self {
        Self {
            schema,
            target_namespace: schema.attribute("targetNamespace"),
        }
    }

    fn check_root(&self, root: &Element) -> Vec<Violation> {
        let mut violations = Vec::new();
        let location = format!("/{}", root.name());

        if root.namespace() != self.target_namespace {
            violations.push(Violation {
                path: location.clone(),
                message: format!(
                    "namespace {:?} does not match schema target namespace {:?}",
                    root.namespace().unwrap_or_default(),
                    self.target_namespace.unwrap_or_default()
                ),
            });
        }

        match self.element_decl(root.name()) {
            Some(decl) => self.check_element(root, decl, &location, &mut violations, 0),
            None => violations.push(Violation {
                path: location,
                message: format!("root element <{}> is not declared by the schema", root.name()),
            }),
        }

        violations
    }

    /// Top-level `xs:element` declaration by name.
    fn element_decl(&self, name: &str) -> Option<&'a Element> {
        self.schema
            .children("element", Some(XS_NS))
            .find(|decl| decl.attribute("name") == Some(name))
    }

    /// Content model of a declaration: inline complex type, or a named one.
    fn complex_type(&self, decl: &'a Element) -> Option<&'a Element> {
        if let Some(inline) = decl.child("complexType", Some(XS_NS)) {
            return Some(inline);
        }
        let type_name = local_part(decl.attribute("type")?);
        self.schema
            .children("complexType", Some(XS_NS))
            .find(|t| t.attribute("name") == Some(type_name))
    }

    /// Name and effective declaration of a particle (`name=` or `ref=`).
    fn particle(&self, particle: &'a Element) -> Option<(&'a str, Option<&'a Element>)> {
        if let Some(reference) = particle.attribute("ref") {
            let name = local_part(reference);
            return Some((name, self.element_decl(name)));
        }
        particle.attribute("name").map(|name| (name, Some(particle)))
    }

    fn check_element(
        &self,
        element: &Element,
        decl: &'a Element,
        location: &str,
        violations: &mut Vec<Violation>,
        depth: usize,
    ) {
        if depth > MAX_DEPTH {
            return;
        }
        let Some(complex) = self.complex_type(decl) else {
            return;
        };

        let groups = complex
            .children("sequence", Some(XS_NS))
            .chain(complex.children("all", Some(XS_NS)));
        for group in groups {
            for particle in group.children("element", Some(XS_NS)) {
                let Some((name, child_decl)) = self.particle(particle) else {
                    continue;
                };
                let required = particle.attribute("minOccurs") != Some("0");
                let mut matches = element.children(name, None).peekable();

                if matches.peek().is_none() {
                    if required {
                        violations.push(Violation {
                            path: location.to_string(),
                            message: format!("missing required element <{name}>"),
                        });
                    }
                    continue;
                }

                if let Some(child_decl) = child_decl {
                    let child_location = format!("{location}/{name}");
                    for child in matches {
                        self.check_element(
                            child,
                            child_decl,
                            &child_location,
                            violations,
                            depth + 1,
                        );
                    }
                }
            }
        }
    }
}

/// A validator bound to a schema catalog: the unit readers consult before
/// extracting fields.
#[derive(Clone)]
pub struct SchemaCheck {
    catalog: SchemaCatalog,
    validator: Arc<dyn SchemaValidator>,
}

impl SchemaCheck {
    pub fn new(catalog: SchemaCatalog, validator: Arc<dyn SchemaValidator>) -> Self {
        Self { catalog, validator }
    }

    /// [`StructuralValidator`] over the schemas in `schema_dir`.
    pub fn structural(schema_dir: impl Into<PathBuf>) -> Self {
        Self::new(SchemaCatalog::new(schema_dir), Arc::new(StructuralValidator::new()))
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Validate a parsed document, selecting the schema set by its dialect.
    pub fn check(&self, document: &Document, kind: DocumentKind) -> Result<(), SchemaError> {
        let dialect = Dialect::detect(document.namespace());
        let schemas = self.catalog.schema_set(kind, dialect);
        debug!(
            document = %document.origin().display(),
            kind = %kind,
            dialect = %dialect,
            schema = %schemas.primary.display(),
            validator = self.validator.name(),
            "validating against schema"
        );
        self.validator.validate(document, &schemas)
    }

    /// Parse and validate a file. A document that is not well-formed is
    /// reported as [`SchemaError::Invalid`].
    pub fn check_file(&self, path: &Path, kind: DocumentKind) -> Result<(), SchemaError> {
        let document = Document::from_file(path)?;
        self.check(&document, kind)
    }
}

impl fmt::Debug for SchemaCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCheck")
            .field("catalog", &self.catalog)
            .field("validator", &self.validator.name())
            .finish()
    }
}
