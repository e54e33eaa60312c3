//! Owned, namespace-resolved element tree.
//!
//! Every element records the namespace URI its prefix resolved to, so lookups
//! work the same whether a manifest uses a default namespace
//! (`<AssetMap xmlns="...">`) or a prefixed one (`<am:AssetMap xmlns:am="...">`).
//!
//! Lookups take a local name and an optional namespace URI. `None` matches
//! the local name in any namespace, which is what reel asset lists need:
//! stereoscopic pictures and composition metadata live in their own
//! namespaces but share child element names with the CPL namespace.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, XmlError};

/// Origin recorded for documents parsed from memory.
pub const INLINE_ORIGIN: &str = "<inline>";

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
    origin: PathBuf,
}

impl Document {
    /// Parse a document held in memory.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_with_origin(xml, Path::new(INLINE_ORIGIN))
    }

    /// Read and parse a document from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| XmlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_with_origin(&content, path)
    }

    /// Parse a document, attributing errors to `origin`.
    pub fn parse_with_origin(xml: &str, origin: &Path) -> Result<Self> {
        let xml = xml.trim_start_matches('\u{feff}');
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let position = reader.buffer_position();
            match reader.read_resolved_event() {
                Ok((ns, Event::Start(start))) => {
                    let namespace = resolve_namespace(ns, origin)?;
                    stack.push(build_element(&reader, namespace, &start, origin)?);
                }
                Ok((ns, Event::Empty(start))) => {
                    let namespace = resolve_namespace(ns, origin)?;
                    let element = build_element(&reader, namespace, &start, origin)?;
                    attach(&mut stack, &mut root, element, origin)?;
                }
                Ok((_, Event::End(_))) => {
                    let element = stack.pop().ok_or_else(|| {
                        let message = format!("unexpected end tag at byte {position}");
                        XmlError::malformed(origin, message)
                    })?;
                    attach(&mut stack, &mut root, element, origin)?;
                }
                Ok((_, Event::Text(text))) => {
                    let text = text.unescape().map_err(|e| {
                        XmlError::malformed(origin, format!("at byte {position}: {e}"))
                    })?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok((_, Event::CData(data))) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Ok((_, Event::Eof)) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(XmlError::malformed(origin, format!("at byte {position}: {e}")));
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::malformed(
                origin,
                format!("element <{}> is never closed", open.name),
            ));
        }

        let root = root.ok_or_else(|| XmlError::Empty {
            path: origin.to_path_buf(),
        })?;

        Ok(Self {
            root,
            origin: origin.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Namespace URI of the root element.
    pub fn namespace(&self) -> Option<&str> {
        self.root.namespace()
    }

    /// Where the document came from (a file path or [`INLINE_ORIGIN`]).
    pub fn origin(&self) -> &Path {
        &self.origin
    }
}

fn resolve_namespace(ns: ResolveResult<'_>, origin: &Path) -> Result<Option<String>> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(XmlError::malformed(
            origin,
            format!(
                "undeclared namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            ),
        )),
    }
}

fn build_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
    origin: &Path,
) -> Result<Element> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::malformed(origin, e.to_string()))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (attr_ns, local) = reader.resolve_attribute(attr.key);
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::malformed(origin, e.to_string()))?;
        attributes.push(Attribute {
            namespace: match attr_ns {
                ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
                _ => None,
            },
            name: String::from_utf8_lossy(local.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }

    Ok(Element {
        namespace,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    origin: &Path,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::malformed(
            origin,
            format!("second root element <{}>", element.name),
        ));
    }
    *root = Some(element);
    Ok(())
}

/// An attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

/// An element with resolved namespace, attributes, children and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local (unprefixed) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clark notation: `{uri}LocalName`, or the bare local name without a namespace.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{}}}{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Trimmed text content.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// All child elements in document order.
    pub fn elements(&self) -> std::slice::Iter<'_, Element> {
        self.children.iter()
    }

    /// Whether this element has the given local name (and namespace, if given).
    pub fn is(&self, name: &str, ns: Option<&str>) -> bool {
        self.name == name && ns.map_or(true, |ns| self.namespace.as_deref() == Some(ns))
    }

    /// First child matching `name` in `ns` (`None` matches any namespace).
    pub fn child(&self, name: &str, ns: Option<&str>) -> Option<&Element> {
        self.children.iter().find(|c| c.is(name, ns))
    }

    /// First child with the local name, whatever its namespace.
    pub fn child_any_ns(&self, name: &str) -> Option<&Element> {
        self.child(name, None)
    }

    /// Trimmed text of the first matching child. Empty elements read as absent.
    pub fn child_text(&self, name: &str, ns: Option<&str>) -> Option<&str> {
        self.child(name, ns)
            .map(Element::text)
            .filter(|text| !text.is_empty())
    }

    /// All direct children matching `name` in `ns`.
    pub fn children<'a>(
        &'a self,
        name: &'a str,
        ns: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(name, ns))
    }

    /// All matching elements below this one, depth-first in document order.
    /// The element itself is not included.
    pub fn descendants<'a>(&'a self, name: &'a str, ns: Option<&'a str>) -> Descendants<'a> {
        Descendants {
            stack: self.children.iter().rev().collect(),
            name,
            ns,
        }
    }
}

/// Iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
    name: &'a str,
    ns: Option<&'a str>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(element) = self.stack.pop() {
            self.stack.extend(element.children.iter().rev());
            if element.is(self.name, self.ns) {
                return Some(element);
            }
        }
        None
    }
}

/// Namespace URI of a Clark-notation tag (`{uri}Local` → `uri`).
///
/// # Examples
///
/// ```
/// use reelforge_xml::namespace_of;
///
/// assert_eq!(
///     namespace_of("{http://www.smpte-ra.org/schemas/429-9/2007/AM}AssetMap"),
///     Some("http://www.smpte-ra.org/schemas/429-9/2007/AM")
/// );
/// assert_eq!(namespace_of("AssetMap"), None);
/// ```
pub fn namespace_of(tag: &str) -> Option<&str> {
    let rest = tag.strip_prefix('{')?;
    let end = rest.rfind('}')?;
    Some(&rest[..end])
}
