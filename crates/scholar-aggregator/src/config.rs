//! Configuration for the article aggregator.

use std::time::Duration;

use crate::models::ScoringMode;

/// Upstream API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Crossref works endpoint.
    pub const CROSSREF_API: &str = "https://api.crossref.org";

    /// CORE v3 API endpoint.
    pub const CORE_API: &str = "https://api.core.ac.uk/v3";

    /// arXiv Atom export endpoint.
    pub const ARXIV_API: &str = "https://export.arxiv.org/api";

    /// Papers with Code REST endpoint.
    pub const PAPERS_WITH_CODE_API: &str = "https://paperswithcode.com/api/v1";

    /// OpenCitations COCI index (citation counts by DOI).
    pub const OPENCITATIONS_API: &str = "https://opencitations.net/index/coci/api/v1";

    /// Items requested from every source per page.
    pub const ITEMS_PER_SOURCE: u32 = 25;

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Requests per second allowed against a single upstream host.
    pub const REQUESTS_PER_SECOND: u32 = 5;

    /// Response cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum response cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Citation count cache TTL (24 hours).
    pub const CITATION_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Maximum number of cached citation counts.
    pub const CITATION_CACHE_MAX_SIZE: u64 = 10_000;

    /// Timeout applied to each embedding or feature-extraction call.
    pub const EMBEDDING_TIMEOUT: Duration = Duration::from_secs(10);

    /// Texts sent per embedding request.
    pub const EMBEDDING_BATCH_SIZE: usize = 16;

    /// Embedding requests in flight at once.
    pub const EMBEDDING_CONCURRENCY: usize = 4;

    /// Citation lookups in flight at once.
    pub const CITATION_CONCURRENCY: usize = 8;
}

/// Ranking constants. Untuned defaults; every one is overridable through [`Config`].
pub mod ranking {
    /// BM25 term-frequency saturation.
    pub const BM25_K1: f64 = 1.2;

    /// BM25 length normalization.
    pub const BM25_B: f64 = 0.75;

    /// Weight of the relevance score.
    pub const RELEVANCE_WEIGHT: f64 = 0.4;

    /// Weight of the log-scaled citation count.
    pub const CITATION_WEIGHT: f64 = 0.3;

    /// Weight of publication recency.
    pub const RECENCY_WEIGHT: f64 = 0.2;

    /// Weight of the fuzzy title-match bonus.
    pub const EXACT_MATCH_WEIGHT: f64 = 0.1;

    /// Citation count at which the log scale reaches 1.0.
    pub const CITATION_LOG_BASE: f64 = 1000.0;

    /// Age in years at which recency reaches 0.
    pub const RECENCY_HORIZON_YEARS: f64 = 10.0;

    /// Minimum word similarity and matched-word fraction for a title match.
    pub const FUZZY_MATCH_THRESHOLD: f64 = 0.8;
}

/// Placeholder strings substituted for missing source fields.
pub mod placeholders {
    pub const NO_TITLE: &str = "No title available";
    pub const NO_AUTHORS: &str = "No authors available";
    pub const NO_DATE: &str = "No date available";
    pub const NO_JOURNAL: &str = "No journal available";
    pub const NO_ABSTRACT: &str = "No abstract available";
    pub const NO_DOI: &str = "No DOI available";
}

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalization.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: ranking::BM25_K1, b: ranking::BM25_B }
    }
}

/// Weights and scales of the composite ranking score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingWeights {
    pub relevance: f64,
    pub citations: f64,
    pub recency: f64,
    pub exact_match: f64,
    /// Citation count mapped to 1.0 on the log scale.
    pub citation_log_base: f64,
    /// Years until recency decays to 0.
    pub recency_horizon_years: f64,
    /// Fuzzy title-match threshold.
    pub match_threshold: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            relevance: ranking::RELEVANCE_WEIGHT,
            citations: ranking::CITATION_WEIGHT,
            recency: ranking::RECENCY_WEIGHT,
            exact_match: ranking::EXACT_MATCH_WEIGHT,
            citation_log_base: ranking::CITATION_LOG_BASE,
            recency_horizon_years: ranking::RECENCY_HORIZON_YEARS,
            match_threshold: ranking::FUZZY_MATCH_THRESHOLD,
        }
    }
}

/// Aggregator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for Crossref (overridable for mock servers).
    pub crossref_api_url: String,

    /// Base URL for CORE.
    pub core_api_url: String,

    /// CORE API key. The CORE source is skipped without it.
    pub core_api_key: Option<String>,

    /// Base URL for arXiv.
    pub arxiv_api_url: String,

    /// Base URL for Papers with Code.
    pub papers_with_code_api_url: String,

    /// Base URL for OpenCitations.
    pub opencitations_api_url: String,

    /// Feature-extraction inference endpoint for the embedding model.
    pub embedding_api_url: Option<String>,

    /// Bearer token for the embedding and feature endpoints.
    pub embedding_api_key: Option<String>,

    /// Question-answering inference endpoint for abstract insights.
    pub features_api_url: Option<String>,

    /// Items requested from every source per page.
    pub items_per_source: u32,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Requests per second per upstream host (0 disables limiting).
    pub requests_per_second: u32,

    /// Response cache TTL.
    pub cache_ttl: Duration,

    /// Maximum response cache size.
    pub cache_max_size: u64,

    /// Citation count cache TTL.
    pub citation_cache_ttl: Duration,

    /// Look up missing citation counts by DOI after deduplication.
    pub enrich_citations: bool,

    /// Relevance scoring strategy.
    pub scoring_mode: ScoringMode,

    /// Timeout per embedding call.
    pub embedding_timeout: Duration,

    /// Texts per embedding request.
    pub embedding_batch_size: usize,

    /// Concurrent embedding requests.
    pub embedding_concurrency: usize,

    /// BM25 parameters.
    pub bm25: Bm25Params,

    /// Composite ranking weights.
    pub weights: RankingWeights,
}

impl Config {
    /// Create a configuration pointing at the public upstream APIs.
    #[must_use]
    pub fn new(core_api_key: Option<String>) -> Self {
        Self {
            crossref_api_url: api::CROSSREF_API.to_string(),
            core_api_url: api::CORE_API.to_string(),
            core_api_key,
            arxiv_api_url: api::ARXIV_API.to_string(),
            papers_with_code_api_url: api::PAPERS_WITH_CODE_API.to_string(),
            opencitations_api_url: api::OPENCITATIONS_API.to_string(),
            embedding_api_url: None,
            embedding_api_key: None,
            features_api_url: None,
            items_per_source: api::ITEMS_PER_SOURCE,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            requests_per_second: api::REQUESTS_PER_SECOND,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            citation_cache_ttl: api::CITATION_CACHE_TTL,
            enrich_citations: false,
            scoring_mode: ScoringMode::Lexical,
            embedding_timeout: api::EMBEDDING_TIMEOUT,
            embedding_batch_size: api::EMBEDDING_BATCH_SIZE,
            embedding_concurrency: api::EMBEDDING_CONCURRENCY,
            bm25: Bm25Params::default(),
            weights: RankingWeights::default(),
        }
    }

    /// Create a test configuration with every upstream pointed at one mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            crossref_api_url: format!("{}/crossref", base_url),
            core_api_url: format!("{}/core/v3", base_url),
            core_api_key: Some("test-core-key".to_string()),
            arxiv_api_url: format!("{}/arxiv/api", base_url),
            papers_with_code_api_url: format!("{}/pwc/api/v1", base_url),
            opencitations_api_url: format!("{}/opencitations", base_url),
            embedding_api_url: None,
            embedding_api_key: None,
            features_api_url: None,
            items_per_source: api::ITEMS_PER_SOURCE,
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            requests_per_second: 0, // No rate limiting in tests
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
            citation_cache_ttl: api::CITATION_CACHE_TTL,
            enrich_citations: false,
            scoring_mode: ScoringMode::Lexical,
            embedding_timeout: Duration::from_secs(2),
            embedding_batch_size: api::EMBEDDING_BATCH_SIZE,
            embedding_concurrency: api::EMBEDDING_CONCURRENCY,
            bm25: Bm25Params::default(),
            weights: RankingWeights::default(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if `SCORING_MODE` or `ENRICH_CITATIONS` hold invalid values.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(non_empty_var("CORE_API_KEY"));
        config.embedding_api_url = non_empty_var("EMBEDDING_API_URL");
        config.embedding_api_key = non_empty_var("EMBEDDING_API_KEY");
        config.features_api_url = non_empty_var("FEATURES_API_URL");

        if let Some(mode) = non_empty_var("SCORING_MODE") {
            config.scoring_mode = mode.parse().map_err(anyhow::Error::msg)?;
        }

        if let Some(flag) = non_empty_var("ENRICH_CITATIONS") {
            config.enrich_citations = match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => anyhow::bail!("invalid ENRICH_CITATIONS value: {other}"),
            };
        }

        Ok(config)
    }

    /// Check if a CORE API key is configured.
    #[must_use]
    pub const fn has_core_key(&self) -> bool {
        self.core_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
