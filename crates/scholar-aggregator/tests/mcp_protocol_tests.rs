//! Tests for MCP protocol JSON-RPC handling.
//!
//! Exercises request dispatch directly and the HTTP transport over a real socket.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scholar_aggregator::client::HttpClient;
use scholar_aggregator::config::Config;
use scholar_aggregator::server::session::SessionManager;
use scholar_aggregator::server::transport::{JsonRpcRequest, SESSION_HEADER, dispatch, router_with_sessions};
use scholar_aggregator::tools::{McpTool, ToolContext, register_all_tools};
use scholar_aggregator::Aggregator;

fn request(value: serde_json::Value) -> JsonRpcRequest {
    serde_json::from_value(value).unwrap()
}

fn offline_context() -> ToolContext {
    let config = Config::for_testing("http://127.0.0.1:9");
    ToolContext::new(Arc::new(Aggregator::with_sources(&config, Vec::new())), None)
}

async fn mock_catalog() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crossref/works"))
        .and(query_param("rows", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"items": [{
                "DOI": "10.1000/mcp",
                "title": ["Protocol buffers for science"],
                "container-title": ["Journal of Protocols"],
                "published": {"date-parts": [[2022, 2]]},
                "abstract": "Science over protocols.",
                "is-referenced-by-count": 9
            }]}
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/crossref/works"))
        .and(query_param("rows", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": {"items": []}})))
        .mount(&mock_server)
        .await;
    mock_server
}

// =============================================================================
// Dispatch
// =============================================================================

#[tokio::test]
async fn test_initialize() {
    let tools = register_all_tools();
    let response = dispatch(
        &request(json!({"jsonrpc": "2.0", "method": "initialize", "id": 1, "params": {"protocolVersion": "2025-03-26"}})),
        &tools,
        &offline_context(),
    )
    .await
    .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], "2025-03-26");
    assert_eq!(result["serverInfo"]["name"], "scholar-aggregator");
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_tools_list_names() {
    let tools = register_all_tools();
    let response = dispatch(&request(json!({"jsonrpc": "2.0", "method": "tools/list", "id": 2})), &tools, &offline_context())
        .await
        .unwrap();

    let listed: Vec<String> = response.result.unwrap()["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();

    for name in [
        "search_articles",
        "load_more",
        "sort_articles",
        "apply_filters",
        "clear_filters",
        "clear_search",
        "list_venues",
        "extract_features",
    ] {
        assert!(listed.iter().any(|n| n == name), "missing tool {name}");
    }
}

#[tokio::test]
async fn test_unknown_method_and_tool() {
    let tools = register_all_tools();
    let ctx = offline_context();

    let response = dispatch(&request(json!({"jsonrpc": "2.0", "method": "resources/list", "id": 3})), &tools, &ctx)
        .await
        .unwrap();
    assert_eq!(response.error.unwrap().code, -32601);

    let response = dispatch(
        &request(json!({"jsonrpc": "2.0", "method": "tools/call", "id": 4, "params": {"name": "nope"}})),
        &tools,
        &ctx,
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);

    let response = dispatch(
        &request(json!({"jsonrpc": "2.0", "method": "tools/call", "id": 5, "params": {}})),
        &tools,
        &ctx,
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn test_tool_error_is_jsonrpc_error() {
    let tools = register_all_tools();
    let response = dispatch(
        &request(json!({"jsonrpc": "2.0", "method": "tools/call", "id": 6, "params": {"name": "load_more"}})),
        &tools,
        &offline_context(),
    )
    .await
    .unwrap();

    let error = response.error.unwrap();
    assert_eq!(error.code, -32000);
    assert!(error.message.contains("search_articles"));
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let tools = register_all_tools();
    let response = dispatch(
        &request(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
        &tools,
        &offline_context(),
    )
    .await;
    assert!(response.is_none());
}

#[tokio::test]
async fn test_search_then_sort_via_tools_call() {
    let mock_server = mock_catalog().await;
    let config = Config::for_testing(&mock_server.uri());
    let client = HttpClient::new(&config).unwrap();
    let ctx = ToolContext::new(Arc::new(Aggregator::new(&config, &client)), None);
    let tools = register_all_tools();

    let response = dispatch(
        &request(json!({
            "jsonrpc": "2.0", "method": "tools/call", "id": 7,
            "params": {"name": "search_articles", "arguments": {"query": "protocol science"}}
        })),
        &tools,
        &ctx,
    )
    .await
    .unwrap();

    let text = response.result.unwrap()["content"][0]["text"].as_str().unwrap().to_string();
    assert!(text.contains("## 1. Protocol buffers for science"));
    assert!(text.contains("**Citations**: 9"));

    let sort = tools.iter().find(|t| t.name() == "sort_articles").unwrap();
    let out = sort.execute(&ctx, json!({"sortBy": "date", "responseFormat": "json"})).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["sortBy"], "date");
    assert_eq!(parsed["articles"][0]["date"], "2022-02");
}

// =============================================================================
// HTTP transport
// =============================================================================

async fn spawn_http(ctx: ToolContext, sessions: Arc<SessionManager>) -> String {
    let router = router_with_sessions(register_all_tools(), ctx, sessions);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_http_health() {
    let base = spawn_http(offline_context(), Arc::new(SessionManager::new())).await;
    let body: serde_json::Value =
        reqwest::get(format!("{base}/health")).await.unwrap().json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tools"], 8);
}

#[tokio::test]
async fn test_http_sessions_are_isolated() {
    let mock_server = mock_catalog().await;
    let config = Config::for_testing(&mock_server.uri());
    let client = HttpClient::new(&config).unwrap();
    let ctx = ToolContext::new(Arc::new(Aggregator::new(&config, &client)), None);
    let sessions = Arc::new(SessionManager::new());
    let base = spawn_http(ctx, Arc::clone(&sessions)).await;
    let http = reqwest::Client::new();

    let search = json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "search_articles", "arguments": {"query": "protocol science"}}
    });
    let response = http.post(format!("{base}/mcp")).json(&search).send().await.unwrap();
    let session_id = response.headers().get(SESSION_HEADER).unwrap().to_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&session_id).is_ok());

    let venues = json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 2,
        "params": {"name": "list_venues", "arguments": {"responseFormat": "json"}}
    });

    // Same session sees the corpus.
    let body: serde_json::Value = http
        .post(format!("{base}/mcp"))
        .header(SESSION_HEADER, &session_id)
        .json(&venues)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Journal of Protocols"));

    // A new client starts empty.
    let body: serde_json::Value =
        http.post(format!("{base}/mcp")).json(&venues).send().await.unwrap().json().await.unwrap();
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert!(!text.contains("Journal of Protocols"));

    assert_eq!(sessions.session_count().await, 2);

    let deleted = http.delete(format!("{base}/mcp")).header(SESSION_HEADER, &session_id).send().await.unwrap();
    assert_eq!(deleted.status(), reqwest::StatusCode::NO_CONTENT);
    assert_eq!(sessions.session_count().await, 1);
}
