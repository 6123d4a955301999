//! Feed autodiscovery: resolve any URL to an actual feed document.
//!
//! [`discover`] is the crate's top-level entry point. It fetches the
//! given URL once; if the payload already classifies as a feed (or the
//! server said 304 Not Modified) that result is returned as-is.
//! Otherwise the payload is treated as an HTML page, scanned for
//! `<link type="application/atom+xml">` / `application/rss+xml`
//! autodiscovery hints, and the first candidate is fetched. One hop
//! only — the re-fetched content is returned without further
//! validation, and there is no loop.

use crate::feed::fetcher::{Conditional, Credentials, FetchError, FetchResult, Fetcher};
use crate::feed::format::{detect_format, FeedDialect};
use crate::markup::Document;
use thiserror::Error;

/// Hint MIME types, in evaluation order. Atom hints are collected
/// before RSS hints regardless of where they sit in the markup; within
/// one type, document order is kept.
const FEED_HINT_TYPES: [&str; 2] = ["application/atom+xml", "application/rss+xml"];

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The page fetched successfully but is not a feed and carries no
    /// feed-autodiscovery link hints.
    #[error("no feed found at {url}")]
    SubscriptionNotFound { url: String },
    /// A fetch failed; the transport error passes through unmodified.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Resolves `url` to a fetched feed document.
///
/// State machine, per call:
///
/// 1. Fetch `url`.
/// 2. If the server answered 304 (`is_modified == false`), or the body
///    already classifies as a feed dialect, return that result —
///    nothing to discover.
/// 3. Extract autodiscovery candidates from the HTML via [`find`].
///    None found → [`DiscoveryError::SubscriptionNotFound`].
/// 4. Fetch the first candidate with the same conditional and auth
///    parameters, and return whatever comes back.
///
/// # Errors
///
/// [`DiscoveryError::SubscriptionNotFound`] when a successful,
/// modified, non-feed page carries no extractable hint; fetch failures
/// propagate as [`DiscoveryError::Fetch`].
pub async fn discover(
    fetcher: &Fetcher,
    url: &str,
    conditional: &Conditional,
    credentials: Option<&Credentials>,
) -> Result<FetchResult, DiscoveryError> {
    let first = fetcher.fetch(url, conditional, credentials).await?;

    // A not-modified answer has no body to classify; honor the signal
    if !first.is_modified {
        return Ok(first);
    }

    let body = first.text().into_owned();
    if detect_format(&body) != FeedDialect::Unknown {
        return Ok(first);
    }

    let candidates = find(&first.final_url, &body);
    let Some(feed_url) = candidates.first() else {
        return Err(DiscoveryError::SubscriptionNotFound {
            url: first.final_url,
        });
    };

    tracing::info!(page = %first.final_url, feed = %feed_url, "Following autodiscovery hint");
    Ok(fetcher.fetch(feed_url, conditional, credentials).await?)
}

/// Extracts feed-autodiscovery candidates from an HTML page.
///
/// Scans `html` for `<link>` elements typed `application/atom+xml`,
/// then `application/rss+xml`, keeping document order within each
/// type. Empty `href` values are skipped; relative ones are resolved
/// against the base of `page_url`. Duplicates are kept; callers only
/// ever consume the first element.
///
/// Pure given its two inputs: no network I/O, markup however broken
/// never errors, only a diagnostic log line escapes.
pub fn find(page_url: &str, html: &str) -> Vec<String> {
    let doc = Document::parse(html);

    let mut candidates = Vec::new();
    for hint_type in FEED_HINT_TYPES {
        for link in doc.select("link", "type", hint_type) {
            let Some(href) = link.attr("href") else {
                continue;
            };
            if href.is_empty() {
                continue;
            }
            candidates.push(resolve_href(href, page_url));
        }
    }

    tracing::debug!(page = %page_url, candidates = ?candidates, "Feed hints extracted");
    candidates
}

/// Resolves a potentially relative `href` against the page it came from.
fn resolve_href(href: &str, page_url: &str) -> String {
    // Already absolute
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_owned();
    }

    // Relative (including protocol-relative): resolve against the base
    if let Ok(base) = url::Url::parse(page_url) {
        if let Ok(resolved) = base.join(href) {
            return resolved.to_string();
        }
    }

    // Fallback: return as-is
    href.to_owned()
}
