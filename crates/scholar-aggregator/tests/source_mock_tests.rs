//! Mock-based source adapter tests using wiremock.
//!
//! Every adapter is exercised against a mock catalog: request shape, decoding, and
//! degradation on failures.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scholar_aggregator::client::HttpClient;
use scholar_aggregator::config::Config;
use scholar_aggregator::models::{RawRecord, SourceKind};
use scholar_aggregator::pipeline::normalize;
use scholar_aggregator::sources::{
    ArxivSource, CoreSource, CrossrefSource, PapersWithCodeSource, SourceAdapter, fetch_all,
};

fn setup(mock_server: &MockServer) -> (Config, HttpClient) {
    let config = Config::for_testing(&mock_server.uri());
    let client = HttpClient::new(&config).unwrap();
    (config, client)
}

fn crossref_item(doi: &str, title: &str, citations: u64) -> serde_json::Value {
    json!({
        "DOI": doi,
        "title": [title],
        "author": [{"given": "Ada", "family": "Lovelace"}],
        "container-title": ["Physical Review A"],
        "published": {"date-parts": [[2021, 5, 3]]},
        "abstract": "<jats:p>Abstract for <jats:italic>quantum</jats:italic> work.</jats:p>",
        "subject": ["Physics"],
        "is-referenced-by-count": citations,
        "reference": [{}, {}]
    })
}

fn crossref_body(items: Vec<serde_json::Value>) -> serde_json::Value {
    json!({"status": "ok", "message": {"items": items}})
}

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <entry>
    <id>http://arxiv.org/abs/1706.03762v5</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <summary>The dominant sequence transduction models are based on recurrent networks.</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

// =============================================================================
// Crossref
// =============================================================================

#[tokio::test]
async fn test_crossref_merges_best_match_and_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crossref/works"))
        .and(query_param("query.bibliographic", "quantum walks"))
        .and(query_param("rows", "1"))
        .and(query_param("filter", "type:journal-article"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_body(vec![crossref_item(
            "10.1000/BEST",
            "Quantum Walks",
            7,
        )])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/crossref/works"))
        .and(query_param("query", "quantum walks"))
        .and(query_param("rows", "25"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_body(vec![
            crossref_item("10.1000/best", "Quantum Walks", 7),
            crossref_item("10.1000/other", "Continuous-time walks", 2),
            crossref_item("10.1000/other/fig-1", "Figure 1", 0),
            json!({"DOI": "10.1000/noabstract", "title": ["No abstract"]}),
        ])))
        .mount(&mock_server)
        .await;

    let (config, client) = setup(&mock_server);
    let records = CrossrefSource::new(client, &config).fetch("quantum walks", 1).await.unwrap();

    assert_eq!(records.len(), 2);
    let articles: Vec<_> = records.iter().map(normalize).collect();
    assert_eq!(articles[0].doi, "10.1000/BEST");
    assert_eq!(articles[0].title, "Quantum Walks");
    assert_eq!(articles[0].authors, "Ada Lovelace");
    assert_eq!(articles[0].date, "2021-05-03");
    assert_eq!(articles[0].journal, "Physical Review A");
    assert_eq!(articles[0].r#abstract, "Abstract for quantum work.");
    assert_eq!(articles[0].citation_count, 7);
    assert_eq!(articles[0].reference_count, 2);
    assert_eq!(articles[1].doi, "10.1000/other");
}

#[tokio::test]
async fn test_crossref_server_error_fails_adapter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crossref/works"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&mock_server)
        .await;

    let (config, client) = setup(&mock_server);
    let result = CrossrefSource::new(client, &config).fetch("anything", 1).await;
    assert!(result.is_err());
}

// =============================================================================
// CORE
// =============================================================================

#[tokio::test]
async fn test_core_search_works() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/core/v3/search/works/"))
        .and(query_param("q", "graphene"))
        .and(query_param("offset", "25"))
        .and(query_param("api_key", "test-core-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalHits": 1,
            "results": [{
                "title": "Graphene transistors",
                "authors": [{"name": "K. Novoselov"}, {"name": "A. Geim"}],
                "yearPublished": 2010,
                "publisher": "Nature Publishing Group",
                "abstract": "Graphene &amp; friends.",
                "doi": "10.1038/nnano.2010.89",
                "fullTextIdentifier": "https://core.ac.uk/download/1.pdf",
                "citationCount": "120"
            }]
        })))
        .mount(&mock_server)
        .await;

    let (config, client) = setup(&mock_server);
    let records = CoreSource::new(client, &config).fetch("graphene", 2).await.unwrap();

    assert_eq!(records.len(), 1);
    let article = normalize(&records[0]);
    assert_eq!(article.authors, "K. Novoselov, A. Geim");
    assert_eq!(article.date, "2010");
    assert_eq!(article.r#abstract, "Graphene & friends.");
    assert_eq!(article.citation_count, 120);
    assert_eq!(article.download_url.as_deref(), Some("https://core.ac.uk/download/1.pdf"));
    assert_eq!(article.source, Some(SourceKind::Core));
}

#[tokio::test]
async fn test_core_without_key_is_empty() {
    let mock_server = MockServer::start().await;
    let (mut config, client) = setup(&mock_server);
    config.core_api_key = None;

    let records = CoreSource::new(client, &config).fetch("graphene", 1).await.unwrap();
    assert!(records.is_empty());
    assert!(mock_server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_core_missing_results_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/core/v3/search/works/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "quota"})))
        .mount(&mock_server)
        .await;

    let (config, client) = setup(&mock_server);
    assert!(CoreSource::new(client, &config).fetch("graphene", 1).await.is_err());
}

// =============================================================================
// arXiv
// =============================================================================

#[tokio::test]
async fn test_arxiv_feed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .and(query_param("search_query", "attention"))
        .and(query_param("start", "0"))
        .and(query_param("max_results", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARXIV_FEED))
        .mount(&mock_server)
        .await;

    let (config, client) = setup(&mock_server);
    let records = ArxivSource::new(client, &config).fetch("attention", 1).await.unwrap();

    assert_eq!(records.len(), 1);
    let article = normalize(&records[0]);
    assert_eq!(article.doi, "arxiv:1706.03762v5");
    assert_eq!(article.arxiv_id.as_deref(), Some("1706.03762v5"));
    assert_eq!(article.journal, "arXiv");
    assert_eq!(article.authors, "Ashish Vaswani, Noam Shazeer");
    assert_eq!(article.tags, vec!["cs.CL".to_string()]);
    assert_eq!(article.download_url.as_deref(), Some("https://arxiv.org/pdf/1706.03762v5"));
}

#[tokio::test]
async fn test_arxiv_non_feed_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let (config, client) = setup(&mock_server);
    assert!(ArxivSource::new(client, &config).fetch("attention", 1).await.is_err());
}

// =============================================================================
// Papers with Code
// =============================================================================

#[tokio::test]
async fn test_papers_with_code_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pwc/api/v1/search/"))
        .and(query_param("q", "attention"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{
                "paper": {
                    "id": "attention-is-all-you-need",
                    "arxiv_id": "1706.03762",
                    "title": "Attention Is All You Need",
                    "abstract": "Transformers.",
                    "authors": ["Ashish Vaswani"],
                    "published": "2017-06-12",
                    "proceeding": "NeurIPS 2017",
                    "url_pdf": "https://arxiv.org/pdf/1706.03762v5.pdf"
                },
                "repository": {"url": "https://github.com/tensorflow/tensor2tensor", "stars": 12000}
            }, "not an object"]
        })))
        .mount(&mock_server)
        .await;

    let (config, client) = setup(&mock_server);
    let records = PapersWithCodeSource::new(client, &config).fetch("attention", 1).await.unwrap();

    assert_eq!(records.len(), 1, "undecodable items are skipped");
    let article = normalize(&records[0]);
    assert_eq!(article.doi, "arxiv:1706.03762");
    assert_eq!(article.journal, "NeurIPS 2017");
    assert_eq!(article.repository_url.as_deref(), Some("https://github.com/tensorflow/tensor2tensor"));
    assert_eq!(article.download_url.as_deref(), Some("https://arxiv.org/pdf/1706.03762v5.pdf"));
}

// =============================================================================
// Fan-out
// =============================================================================

#[tokio::test]
async fn test_fetch_all_survives_failing_sources() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARXIV_FEED))
        .mount(&mock_server)
        .await;

    // Crossref, CORE and Papers with Code are not mounted and answer 404.
    let (config, client) = setup(&mock_server);
    let sources: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(CrossrefSource::new(client.clone(), &config)),
        Arc::new(CoreSource::new(client.clone(), &config)),
        Arc::new(ArxivSource::new(client.clone(), &config)),
        Arc::new(PapersWithCodeSource::new(client, &config)),
    ];

    let records = fetch_all(&sources, "attention", 1).await;

    assert_eq!(records.len(), 1);
    assert!(matches!(records[0], RawRecord::Arxiv(_)));
}
