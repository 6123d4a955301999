//! Integration tests for the full resolution pipeline: fetch a page,
//! follow its autodiscovery hint, classify the feed, construct the
//! dialect parser, and read the entries out.
//!
//! Each test runs against its own wiremock server; request-count
//! expectations pin down exactly how many fetches each path performs.

use std::sync::Arc;

use feedscout::config::Config;
use feedscout::feed::{
    detect_format, discover, find, get_parser, Conditional, FeedDialect, Fetcher,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BLOG_PAGE: &str = r#"<!DOCTYPE html>
<html><head>
  <title>A Blog</title>
  <link rel="stylesheet" href="/style.css">
  <link rel="alternate" type="application/rss+xml" title="RSS" href="/feed.xml">
</head><body><h1>Posts</h1></body></html>"#;

const RSS_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>A Blog</title>
  <link>https://example.com</link>
  <item>
    <guid>post-1</guid>
    <title>Hello World</title>
    <link>https://example.com/post/1</link>
  </item>
  <item>
    <title>Untracked Post</title>
    <link>https://example.com/post/2</link>
  </item>
</channel></rss>"#;

fn test_config() -> Arc<Config> {
    Arc::new(Config::default())
}

#[tokio::test]
async fn page_to_feed_to_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BLOG_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RSS_FEED))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config();
    let fetcher = Fetcher::new(Arc::clone(&config)).unwrap();

    // Page → hint → feed
    let url = format!("{}/blog", mock_server.uri());
    let result = discover(&fetcher, &url, &Conditional::none(), None)
        .await
        .unwrap();
    assert_eq!(result.final_url, format!("{}/feed.xml", mock_server.uri()));
    assert_eq!(detect_format(&result.text()), FeedDialect::Rss20);

    // Feed → parser → entries
    let parser = get_parser(&result.final_url, &result.content, "utf-8", &config).unwrap();
    assert_eq!(parser.dialect(), FeedDialect::Rss20);

    let entries = parser.parse().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].guid, "post-1");
    assert_eq!(entries[0].title, "Hello World");
    // The second entry has no guid in the feed; a synthesized id stands in
    assert!(!entries[1].guid.is_empty());
}

#[tokio::test]
async fn direct_feed_needs_no_discovery() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RSS_FEED))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config();
    let fetcher = Fetcher::new(Arc::clone(&config)).unwrap();

    let result = discover(&fetcher, &mock_server.uri(), &Conditional::none(), None)
        .await
        .unwrap();
    assert_eq!(detect_format(&result.text()), FeedDialect::Rss20);

    let entries = get_parser(&result.final_url, &result.content, "utf-8", &config)
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn validators_round_trip_through_fetch_results() {
    // First fetch yields validators; replaying them gets a 304 that
    // discovery honors without a second request.
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(wiremock::matchers::header("If-None-Match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(RSS_FEED)
                .insert_header("ETag", "\"v1\""),
        )
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(test_config()).unwrap();

    let first = discover(&fetcher, &mock_server.uri(), &Conditional::none(), None)
        .await
        .unwrap();
    assert!(first.is_modified);
    assert_eq!(first.etag.as_deref(), Some("\"v1\""));

    let conditional = Conditional {
        last_modified: first.last_modified.clone(),
        etag: first.etag.clone(),
    };
    let second = discover(&fetcher, &mock_server.uri(), &conditional, None)
        .await
        .unwrap();
    assert!(!second.is_modified);
}

#[test]
fn find_orders_atom_hints_first_across_a_real_page() {
    let html = r#"<!DOCTYPE html>
<html><head>
  <link rel="alternate" type="application/rss+xml" href="/rss.xml">
  <link rel="alternate" type="application/atom+xml" href="/atom.xml">
  <link rel="alternate" type="application/rss+xml" href="https://cdn.example.com/mirror.xml">
</head><body></body></html>"#;

    let candidates = find("https://example.com/blog", html);
    assert_eq!(
        candidates,
        vec![
            "https://example.com/atom.xml".to_owned(),
            "https://example.com/rss.xml".to_owned(),
            "https://cdn.example.com/mirror.xml".to_owned(),
        ]
    );
}
