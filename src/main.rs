use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use feedscout::config::Config;
use feedscout::feed::{
    detect_format, discover, get_parser, Conditional, Credentials, Fetcher, ParserError,
};

/// Get the config file path (~/.config/feedscout/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("feedscout")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "feedscout",
    about = "Resolve a URL to its RSS/Atom feed via format detection and autodiscovery"
)]
struct Args {
    /// URL to resolve (scheme optional; bare hosts get http://)
    url: String,

    /// Basic-auth username
    #[arg(long)]
    username: Option<String>,

    /// Basic-auth password
    #[arg(long)]
    password: Option<String>,

    /// Last-Modified validator from a previous fetch (sent as If-Modified-Since)
    #[arg(long, value_name = "HTTP_DATE")]
    last_modified: Option<String>,

    /// ETag validator from a previous fetch (sent as If-None-Match)
    #[arg(long)]
    etag: Option<String>,

    /// Path to a config file (defaults to ~/.config/feedscout/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Arc::new(Config::load(&config_path).context("Failed to load configuration")?);

    let fetcher = Fetcher::new(Arc::clone(&config)).context("Failed to build HTTP client")?;

    let conditional = Conditional {
        last_modified: args.last_modified,
        etag: args.etag,
    };
    let credentials = args
        .username
        .map(|username| Credentials::new(username, args.password.unwrap_or_default()));

    let result = discover(&fetcher, &args.url, &conditional, credentials.as_ref()).await?;

    if !result.is_modified {
        println!("Not modified: {}", result.final_url);
        return Ok(());
    }

    let dialect = detect_format(&result.text());
    println!("Feed URL: {}", result.final_url);
    println!("Format:   {}", dialect);
    if let Some(last_modified) = &result.last_modified {
        println!("Last-Modified: {last_modified}");
    }
    if let Some(etag) = &result.etag {
        println!("ETag: {etag}");
    }

    match get_parser(&result.final_url, &result.content, "utf-8", &config) {
        Ok(parser) => {
            let entries = parser.parse().context("Failed to parse feed body")?;
            println!("Entries:  {}", entries.len());
            for entry in entries.iter().take(10) {
                match &entry.url {
                    Some(url) => println!("  - {} ({url})", entry.title),
                    None => println!("  - {}", entry.title),
                }
            }
        }
        Err(ParserError::UnsupportedFeedFormat) => {
            // Discovery performs exactly one hop and does not validate
            // the re-fetched payload; surface that honestly
            anyhow::bail!(
                "Resolved {} but its content is not a recognizable feed",
                result.final_url
            );
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
