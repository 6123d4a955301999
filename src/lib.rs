//! feedscout resolves an arbitrary URL — a feed, or a web page that
//! merely links to one — into a downloaded, correctly-typed feed
//! document ready for structural parsing.
//!
//! The interesting parts:
//!
//! - **Format detection** ([`feed::detect_format`]): an ordered table
//!   of root-signature rules classifies raw markup into one of five
//!   feed dialects, with a textual fallback for prefix-namespaced RDF
//!   roots that the structural query misses.
//! - **Autodiscovery** ([`feed::discover`]): when the fetched payload
//!   is an ordinary HTML page, its `<link>` autodiscovery hints are
//!   extracted, resolved to absolute URLs, and the first candidate is
//!   fetched.
//!
//! Everything is tolerant of the real world: feeds are routinely
//! malformed XML, so classification and hint extraction degrade to
//! "no match" rather than erroring.

pub mod config;
pub mod feed;
pub mod markup;
