//! Dialect-specific feed parser construction.
//!
//! [`get_parser`] is a fixed factory: content is classified, and the
//! dialect tag is resolved through a static constructor table to one of
//! five parser implementations — never by name-based instantiation.
//! The factory itself parses nothing; each [`FeedParser`] delegates
//! body work to feed-rs when asked and normalizes entries into the flat
//! [`ParsedEntry`] shape.

use crate::config::Config;
use crate::feed::format::{detect_format, FeedDialect};
use serde::Deserialize;
use sha2::{Digest, Sha256, Sha512};
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when constructing or running a feed parser.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Content could not be classified into any known dialect. Distinct
    /// from discovery's not-found case: this fires after a feed has
    /// already been located and fetched, at parser-construction time.
    #[error("unsupported feed format")]
    UnsupportedFeedFormat,
    /// The feed body could not be parsed
    #[error("feed parse error: {0}")]
    Parse(String),
}

/// Hash function used to synthesize entry GUIDs when a feed omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

/// A feed entry normalized out of any dialect.
#[derive(Debug, Clone)]
pub struct ParsedEntry {
    /// The entry's own id, or a hash synthesized from its fields.
    pub guid: String,
    pub title: String,
    pub url: Option<String>,
    /// Publication time as epoch seconds, when the feed provides one.
    pub published: Option<i64>,
    pub summary: Option<String>,
}

/// The parser collaborator boundary: one implementation per dialect.
///
/// Parsers are constructed with `(content, encoding, source_url)` and
/// configured by the factory before being handed out.
pub trait FeedParser {
    /// The dialect this parser is bound to.
    fn dialect(&self) -> FeedDialect;

    /// Sets the GUID-synthesis hash preference.
    fn set_hash_algorithm(&mut self, algorithm: HashAlgorithm);

    /// Injects the active configuration object.
    fn set_config(&mut self, config: Arc<Config>);

    /// Declared content encoding, as passed at construction.
    fn encoding(&self) -> &str;

    /// The URL the content was fetched from.
    fn source_url(&self) -> &str;

    /// Parses the feed body into normalized entries.
    ///
    /// # Errors
    ///
    /// [`ParserError::Parse`] when the body cannot be parsed.
    fn parse(&self) -> Result<Vec<ParsedEntry>, ParserError>;
}

/// State shared by all five dialect parsers.
#[derive(Debug, Clone)]
struct ParserCore {
    content: Vec<u8>,
    encoding: String,
    source_url: String,
    hash_algorithm: HashAlgorithm,
    config: Option<Arc<Config>>,
}

impl ParserCore {
    fn new(content: &[u8], encoding: &str, source_url: &str) -> Self {
        Self {
            content: content.to_vec(),
            encoding: encoding.to_owned(),
            source_url: source_url.to_owned(),
            hash_algorithm: HashAlgorithm::default(),
            config: None,
        }
    }

    /// Parses the body via feed-rs and normalizes the entries.
    ///
    /// The declared `encoding` is retained as metadata only: feed-rs
    /// resolves the actual byte encoding from the XML declaration.
    fn parse_entries(&self) -> Result<Vec<ParsedEntry>, ParserError> {
        let feed = feed_rs::parser::parse(self.content.as_slice())
            .map_err(|e| ParserError::Parse(e.to_string()))?;

        let entries = feed
            .entries
            .into_iter()
            .map(|entry| {
                let url = entry.links.first().map(|l| l.href.clone());
                let published = entry.published.or(entry.updated).map(|dt| dt.timestamp());
                let summary = entry
                    .summary
                    .map(|s| strip_control_chars(&s.content).into_owned())
                    .or_else(|| entry.content.and_then(|c| c.body));
                let title = strip_control_chars(
                    &entry
                        .title
                        .map(|t| t.content)
                        .unwrap_or_else(|| "Untitled".to_string()),
                )
                .into_owned();

                let existing_id = if entry.id.is_empty() {
                    None
                } else {
                    Some(entry.id.as_str())
                };
                let guid = generate_guid(
                    self.hash_algorithm,
                    existing_id,
                    url.as_deref(),
                    &title,
                    published,
                );

                ParsedEntry {
                    guid,
                    title,
                    url,
                    published,
                    summary,
                }
            })
            .collect();

        Ok(entries)
    }
}

/// Implements [`FeedParser`] for one dialect struct by delegating to
/// its `core` field.
macro_rules! impl_feed_parser {
    ($parser:ident, $dialect:expr) => {
        impl $parser {
            pub fn new(content: &[u8], encoding: &str, source_url: &str) -> Self {
                Self {
                    core: ParserCore::new(content, encoding, source_url),
                }
            }

            fn boxed(content: &[u8], encoding: &str, source_url: &str) -> Box<dyn FeedParser> {
                Box::new(Self::new(content, encoding, source_url))
            }
        }

        impl FeedParser for $parser {
            fn dialect(&self) -> FeedDialect {
                $dialect
            }

            fn set_hash_algorithm(&mut self, algorithm: HashAlgorithm) {
                self.core.hash_algorithm = algorithm;
            }

            fn set_config(&mut self, config: Arc<Config>) {
                self.core.config = Some(config);
            }

            fn encoding(&self) -> &str {
                &self.core.encoding
            }

            fn source_url(&self) -> &str {
                &self.core.source_url
            }

            fn parse(&self) -> Result<Vec<ParsedEntry>, ParserError> {
                self.core.parse_entries()
            }
        }
    };
}

/// Parser for Atom feeds.
pub struct AtomParser {
    core: ParserCore,
}

/// Parser for RSS 2.0 feeds.
pub struct Rss20Parser {
    core: ParserCore,
}

/// Parser for RSS 0.92 feeds.
pub struct Rss92Parser {
    core: ParserCore,
}

/// Parser for RSS 0.91 feeds.
pub struct Rss91Parser {
    core: ParserCore,
}

/// Parser for RSS 1.0 (RDF) feeds.
pub struct Rss10Parser {
    core: ParserCore,
}

impl_feed_parser!(AtomParser, FeedDialect::Atom);
impl_feed_parser!(Rss20Parser, FeedDialect::Rss20);
impl_feed_parser!(Rss92Parser, FeedDialect::Rss92);
impl_feed_parser!(Rss91Parser, FeedDialect::Rss91);
impl_feed_parser!(Rss10Parser, FeedDialect::Rss10);

type Constructor = fn(&[u8], &str, &str) -> Box<dyn FeedParser>;

/// Fixed dialect → constructor mapping. `Unknown` is deliberately
/// absent: it has no parser.
const PARSER_CONSTRUCTORS: [(FeedDialect, Constructor); 5] = [
    (FeedDialect::Atom, AtomParser::boxed),
    (FeedDialect::Rss20, Rss20Parser::boxed),
    (FeedDialect::Rss92, Rss92Parser::boxed),
    (FeedDialect::Rss91, Rss91Parser::boxed),
    (FeedDialect::Rss10, Rss10Parser::boxed),
];

/// Classifies `content` and constructs the matching dialect parser,
/// configured with the hash preference and config object from `config`.
///
/// # Errors
///
/// [`ParserError::UnsupportedFeedFormat`] when classification yields
/// `Unknown`; no parser instance is constructed in that case.
pub fn get_parser(
    url: &str,
    content: &[u8],
    encoding: &str,
    config: &Arc<Config>,
) -> Result<Box<dyn FeedParser>, ParserError> {
    let dialect = detect_format(&String::from_utf8_lossy(content));

    let constructor = PARSER_CONSTRUCTORS
        .iter()
        .find(|(candidate, _)| *candidate == dialect)
        .map(|(_, constructor)| constructor)
        .ok_or(ParserError::UnsupportedFeedFormat)?;

    let mut parser = constructor(content, encoding, url);
    parser.set_hash_algorithm(config.hash_algorithm);
    parser.set_config(Arc::clone(config));
    Ok(parser)
}

/// Synthesizes a stable GUID for entries that omit one, by hashing the
/// fields that identify the entry. A present, non-blank id wins.
fn generate_guid(
    algorithm: HashAlgorithm,
    existing: Option<&str>,
    url: Option<&str>,
    title: &str,
    published: Option<i64>,
) -> String {
    if let Some(guid) = existing {
        let trimmed = guid.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let input = format!(
        "{}|{}|{}",
        url.unwrap_or(""),
        title,
        published.map(|p| p.to_string()).unwrap_or_default()
    );
    match algorithm {
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(input.as_bytes())),
        HashAlgorithm::Sha512 => format!("{:x}", Sha512::digest(input.as_bytes())),
    }
}

/// Strips terminal control characters from attacker-controlled feed
/// text (titles, summaries) so escape sequences cannot leak into logs
/// or a UI. Tabs and newlines survive.
fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|c| !is_stripped_control(*c)).collect())
}

fn is_stripped_control(c: char) -> bool {
    c.is_control() && c != '\t' && c != '\n' && c != '\r'
}
