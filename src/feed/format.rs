//! Feed dialect classification.
//!
//! Classification is a pure function of document content: HTTP metadata
//! (Content-Type and friends) is never consulted, because servers lie
//! about feed MIME types constantly. The raw markup is parsed leniently
//! and tested against an ordered table of root-signature rules; the
//! first rule whose query matches exactly one root element wins.

use crate::markup::{Document, RootQuery};

/// The feed dialects this crate can classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedDialect {
    /// Atom 1.0 (`<feed>` root)
    Atom,
    /// RSS 2.0 (`<rss version="2.0">`)
    Rss20,
    /// RSS 0.92 (`<rss version="0.92">`)
    Rss92,
    /// RSS 0.91 (`<rss version="0.91">`)
    Rss91,
    /// RSS 1.0 / RDF (`<rdf:RDF>` root)
    Rss10,
    /// No recognizable feed signature
    Unknown,
}

impl std::fmt::Display for FeedDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FeedDialect::Atom => "Atom",
            FeedDialect::Rss20 => "RSS 2.0",
            FeedDialect::Rss92 => "RSS 0.92",
            FeedDialect::Rss91 => "RSS 0.91",
            FeedDialect::Rss10 => "RSS 1.0",
            FeedDialect::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One classification rule: a dialect and the root-signature query that
/// identifies it.
struct DialectRule {
    dialect: FeedDialect,
    query: RootQuery,
}

/// Rule table. Order is a correctness invariant, not a style choice:
/// the queries are not mutually exclusive for pathological documents,
/// and the first rule whose query matches exactly one root element is
/// authoritative.
///
/// The RSS 1.0 rule queries the unprefixed root name `RDF`; the common
/// prefixed serialization (`<rdf:RDF ...>`) does not match it and is
/// handled by the textual fallback in [`detect_format`] instead.
const DIALECT_RULES: [DialectRule; 5] = [
    DialectRule {
        dialect: FeedDialect::Atom,
        query: RootQuery {
            root: "feed",
            version: None,
        },
    },
    DialectRule {
        dialect: FeedDialect::Rss20,
        query: RootQuery {
            root: "rss",
            version: Some("2.0"),
        },
    },
    DialectRule {
        dialect: FeedDialect::Rss92,
        query: RootQuery {
            root: "rss",
            version: Some("0.92"),
        },
    },
    DialectRule {
        dialect: FeedDialect::Rss91,
        query: RootQuery {
            root: "rss",
            version: Some("0.91"),
        },
    },
    DialectRule {
        dialect: FeedDialect::Rss10,
        query: RootQuery {
            root: "RDF",
            version: None,
        },
    },
];

/// Closing tag of a prefix-namespaced RDF root. Feeds that serialize
/// their root as `<rdf:RDF ...>` slip past the structural `RDF` query,
/// so the raw text is checked for this literal as a last resort.
const RDF_CLOSING_TAG: &str = "</rdf:RDF>";

/// Classifies raw markup into a [`FeedDialect`].
///
/// Total and deterministic for any string input. Malformed or
/// unparsable content never errors: it simply matches no rule and
/// yields [`FeedDialect::Unknown`] (modulo the RDF textual fallback).
///
/// A rule matches only when its query finds *exactly one* root element:
/// zero matches means the signature is absent, more than one means the
/// document is too ambiguous for that rule to be trusted, and in both
/// cases evaluation continues down the table.
pub fn detect_format(content: &str) -> FeedDialect {
    let doc = Document::parse(content);

    for rule in &DIALECT_RULES {
        if doc.count_roots(&rule.query) == 1 {
            return rule.dialect;
        }
    }

    if content.contains(RDF_CLOSING_TAG) {
        return FeedDialect::Rss10;
    }

    FeedDialect::Unknown
}
