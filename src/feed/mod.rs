//! Feed resolution: fetch, classify, discover, construct a parser.
//!
//! This module is the crate's core. Four cooperating pieces, composed
//! in strict dependency order:
//!
//! - [`fetcher`] - One conditional HTTP GET per call, surfaced as a
//!   [`FetchResult`]
//! - [`format`] - Classify raw markup into a [`FeedDialect`] via an
//!   ordered table of root-signature rules
//! - [`discovery`] - The top-level entry point: fetch, classify, and
//!   when the payload is an HTML page, follow its feed-autodiscovery
//!   link hints
//! - [`parser`] - Construct the dialect-specific parser for classified
//!   content
//!
//! # Example
//!
//! ```ignore
//! use feedscout::config::Config;
//! use feedscout::feed::{discover, detect_format, get_parser, Conditional, Fetcher};
//!
//! let config = std::sync::Arc::new(Config::default());
//! let fetcher = Fetcher::new(config.clone())?;
//!
//! let result = discover(&fetcher, "example.com/blog", &Conditional::none(), None).await?;
//! let parser = get_parser(&result.final_url, &result.content, "utf-8", &config)?;
//! let entries = parser.parse()?;
//! ```

mod discovery;
mod fetcher;
mod format;
mod parser;

pub use discovery::{discover, find, DiscoveryError};
pub use fetcher::{
    prepend_scheme, Conditional, Credentials, FetchError, FetchResult, Fetcher,
};
pub use format::{detect_format, FeedDialect};
pub use parser::{get_parser, FeedParser, HashAlgorithm, ParsedEntry, ParserError};
