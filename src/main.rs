use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use feed_aggregation::config::{Config, RefreshMode};
use feed_aggregation::feed::{FeedRetriever, ReqwestClient};
use feed_aggregation::{server, FeedAggregation, FeedSet, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "feed-aggregation",
    about = "Serve a fixed set of RSS/Atom feeds as one HTML page or JSON document"
)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", default_value = "feeds.toml")]
    config: PathBuf,

    /// Feed URL to aggregate, after those in the config file (repeatable)
    #[arg(long = "feed", value_name = "URL")]
    feeds: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web server (default)
    Serve {
        /// Listen address, overriding the config file
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Fetch every feed once and print the document to stdout
    Render {
        /// Print JSON instead of HTML
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    config
        .add_feeds(args.feeds)
        .context("Invalid --feed argument")?;
    let urls = config.require_feeds()?.to_vec();

    let client =
        ReqwestClient::build(config.max_feed_size).context("Failed to build HTTP client")?;
    let retriever = FeedRetriever::new(client)
        .with_timeout(config.timeout())
        .with_max_concurrent(config.max_concurrent);

    match args.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Render { json } => {
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Html
            };
            let document = FeedAggregation::new(retriever.retrieve_all(&urls).await)
                .render(format)
                .context("Failed to render feeds")?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", document.body).context("Failed to write document")?;
        }
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.bind.clone());
            let feeds = match config.refresh {
                RefreshMode::PerRequest => FeedSet::live(retriever, urls),
                RefreshMode::Startup => {
                    let feeds = FeedSet::resolve_once(&retriever, &urls).await;
                    tracing::info!(feeds = urls.len(), "Fetched feeds at startup");
                    feeds
                }
            };
            server::run_server(&addr, feeds)
                .await
                .with_context(|| format!("Server on {addr} failed"))?;
        }
    }

    Ok(())
}
