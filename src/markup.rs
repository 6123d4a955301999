//! Lenient markup handling for feed classification and link discovery.
//!
//! Real-world feeds and the pages that link to them are frequently not
//! well-formed XML: unclosed tags, mismatched end tags, encoding
//! declarations that disagree with the actual bytes. [`Document::parse`]
//! therefore never fails: it collects whatever elements quick-xml can
//! produce and stops silently at the first unrecoverable error. Callers
//! see fewer matches, never an error.
//!
//! Two query shapes cover everything the crate needs:
//!
//! - [`Document::count_roots`]: how many document-root elements match a
//!   [`RootQuery`] (a root name plus an optional required `version`
//!   attribute). Dialect rules require *exactly one* match.
//! - [`Document::select`]: all elements with a given name whose
//!   attribute has a given value, in document order. Used for
//!   `<link type="application/rss+xml">`-style autodiscovery hints.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A structural query against the document root: element name plus an
/// optional required `version` attribute value.
///
/// This is the crate's rendition of root-signature XPath tests such as
/// `/rss[@version='2.0']`. Names match ASCII-case-insensitively (markup
/// in the wild uses `<LINK>`, `<Rss>`, ...); attribute values match
/// exactly.
#[derive(Debug, Clone, Copy)]
pub struct RootQuery {
    /// Qualified root element name, compared as written (prefixes count).
    pub root: &'static str,
    /// Required `version` attribute value, if any.
    pub version: Option<&'static str>,
}

/// A single parsed element: qualified name, nesting depth, attributes.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    depth: usize,
    attrs: Vec<(String, String)>,
}

impl Element {
    /// Returns the attribute value for `name` (ASCII-case-insensitive),
    /// or `None` if the element has no such attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Qualified element name as written in the markup.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A leniently parsed markup document supporting structural queries.
#[derive(Debug)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    /// Parses `markup` as leniently as quick-xml allows. Never fails:
    /// a parse error ends collection and the document holds whatever
    /// elements were seen up to that point.
    pub fn parse(markup: &str) -> Self {
        let mut reader = Reader::from_str(markup);
        let config = reader.config_mut();
        config.trim_text(true);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut elements = Vec::new();
        let mut depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    elements.push(element_from(&start, depth));
                    depth += 1;
                }
                Ok(Event::Empty(start)) => {
                    elements.push(element_from(&start, depth));
                }
                Ok(Event::End(_)) => {
                    depth = depth.saturating_sub(1);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(error) => {
                    tracing::trace!(error = %error, "Stopping lenient parse at malformed markup");
                    break;
                }
            }
        }

        Self { elements }
    }

    /// Counts document-root elements matching `query`.
    ///
    /// Well-formed XML has at most one root, but lenient parsing of
    /// broken markup can surface several top-level elements; callers
    /// that need an unambiguous signature test for a count of exactly 1.
    pub fn count_roots(&self, query: &RootQuery) -> usize {
        self.elements
            .iter()
            .filter(|element| element.depth == 0)
            .filter(|element| element.name.eq_ignore_ascii_case(query.root))
            .filter(|element| match query.version {
                Some(version) => element.attr("version") == Some(version),
                None => true,
            })
            .count()
    }

    /// Returns all elements named `name` whose attribute `attr` equals
    /// `value`, in document order. Names compare case-insensitively,
    /// the attribute value exactly.
    pub fn select<'a>(
        &'a self,
        name: &'a str,
        attr: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .iter()
            .filter(move |element| element.name.eq_ignore_ascii_case(name))
            .filter(move |element| element.attr(attr) == Some(value))
    }
}

/// Builds an [`Element`] from a start tag, tolerating broken attributes.
///
/// Attribute checks are disabled (duplicates and oddities pass through)
/// and unescape failures fall back to the raw value — an unknown entity
/// in one attribute must not cost us the rest of the element.
fn element_from(start: &BytesStart<'_>, depth: usize) -> Element {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attrs = Vec::new();
    for attr in start.attributes().with_checks(false) {
        let Ok(attr) = attr else { break };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        attrs.push((key, value));
    }

    Element { name, depth, attrs }
}
