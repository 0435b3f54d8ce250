//! Scholar Aggregator
//!
//! Multi-source scholarly article search: fetches Crossref, CORE, arXiv and Papers with
//! Code concurrently, normalizes the records into one schema, removes duplicates by
//! DOI and title, and ranks the result with BM25 or embedding relevance combined with
//! citation impact, recency and title match. Served as a Model Context Protocol (MCP)
//! server or used as a library.
//!
//! # Pipeline
//!
//! - **Sources**: one [`sources::SourceAdapter`] per catalog, fanned out per page
//! - **Normalize**: markup-free abstracts, placeholder strings for missing fields
//! - **Deduplicate**: DOI first, case-normalized title otherwise
//! - **Score**: BM25 over the page, or cosine similarity of embeddings
//! - **Rank**: `0.4 relevance + 0.3 citations + 0.2 recency + 0.1 exact match`
//! - **View**: filters and sort derived from the session corpus
//!
//! # Example
//!
//! ```no_run
//! use scholar_aggregator::{Aggregator, Config, SearchSession, client::HttpClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = HttpClient::new(&config)?;
//!     let aggregator = Aggregator::new(&config, &client);
//!
//!     let mut session = SearchSession::new();
//!     session.search(&aggregator, "quantum error correction", None).await;
//!     for article in session.filtered_articles().iter().take(5) {
//!         println!("{:.3} {}", article.ranking_score, article.article.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod embedding;
pub mod error;
pub mod features;
pub mod formatters;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod sources;
pub mod tools;

pub use config::Config;
pub use error::{ClientError, EmbeddingError, ToolError};
pub use models::{Article, EnhancedArticle, FilterCriteria, ScoringMode, SortOption};
pub use search::{Aggregator, SearchSession};
