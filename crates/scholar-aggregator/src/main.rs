//! Scholar Aggregator - Entry Point
//!
//! Runs the MCP server over stdio or HTTP, or a one-shot search printed to stdout.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use scholar_aggregator::{
    Aggregator, Config, SearchSession,
    client::HttpClient,
    features::{FeatureExtractor, HttpFeatureExtractor},
    models::{ResponseFormat, ScoringMode, SortOption},
    server::McpServer,
    tools::render_view,
};

#[derive(Parser, Debug)]
#[command(name = "scholar-aggregator")]
#[command(about = "Multi-source scholarly article search with deduplication and ranking")]
#[command(version)]
struct Cli {
    /// Transport mode: stdio, http, or query for a one-shot search
    #[arg(long, default_value = "stdio")]
    transport: Transport,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Search query (required with --transport query)
    #[arg(long, short)]
    query: Option<String>,

    /// Number of pages to fetch in query mode
    #[arg(long, default_value = "1")]
    pages: u32,

    /// Sort order in query mode: relevance, citationCount, date
    #[arg(long, default_value = "relevance")]
    sort: SortOption,

    /// Output format in query mode
    #[arg(long, default_value = "markdown")]
    format: ResponseFormat,

    /// Maximum articles printed in query mode
    #[arg(long, default_value = "20")]
    limit: usize,

    /// Relevance scoring: lexical or semantic (overrides SCORING_MODE)
    #[arg(long)]
    scoring: Option<ScoringMode>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output
    #[default]
    Stdio,
    /// Streamable HTTP
    Http,
    /// One-shot search printed to stdout
    Query,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting scholar aggregator"
    );

    let mut config = Config::from_env()?;
    if let Some(mode) = cli.scoring {
        config.scoring_mode = mode;
    }

    let client = HttpClient::new(&config)?;
    let aggregator = Aggregator::new(&config, &client);

    match cli.transport {
        Transport::Stdio => {
            let features = feature_extractor(&client, &config);
            McpServer::new(aggregator, features).run_stdio().await?;
        }
        Transport::Http => {
            tracing::info!(port = cli.port, "Running in HTTP mode");
            let features = feature_extractor(&client, &config);
            McpServer::new(aggregator, features).run_http(cli.port).await?;
        }
        Transport::Query => {
            let Some(query) = cli.query.as_deref().filter(|q| !q.trim().is_empty()) else {
                anyhow::bail!("--query is required with --transport query");
            };
            run_query(&aggregator, query, &cli).await?;
        }
    }

    Ok(())
}

async fn run_query(aggregator: &Aggregator, query: &str, cli: &Cli) -> anyhow::Result<()> {
    let mut session = SearchSession::new();
    session.set_sort(cli.sort);
    session.search(aggregator, query, cli.scoring).await;

    for _ in 1..cli.pages.max(1) {
        if session.load_more(aggregator).await == Some(0) {
            tracing::info!(page = session.page(), "No new articles, stopping");
            break;
        }
    }

    println!("{}", render_view(&session, cli.limit, cli.format)?);
    Ok(())
}

fn feature_extractor(client: &HttpClient, config: &Config) -> Option<Arc<dyn FeatureExtractor>> {
    HttpFeatureExtractor::from_config(client.clone(), config)
        .map(|extractor| Arc::new(extractor) as Arc<dyn FeatureExtractor>)
}
