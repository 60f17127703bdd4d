use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use paper_search_core::{BackendClient, ChatMessage, DisplayItem, Submitter, Variant};
use serde_json::{json, Value};

/// Serve `router` on an ephemeral port and return its base URL.
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL nothing is listening on
fn dead_backend() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

async fn query_handler(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["state"], json!({}));
    let input = body["input"].as_str().unwrap_or_default().to_string();
    if input == "missing" {
        return Json(json!({ "error": "not found" }));
    }
    Json(json!({
        "messages": [
            { "content": format!("Received query: {}", input) },
            { "content": "done" }
        ]
    }))
}

async fn papers_handler(Json(body): Json<Value>) -> Json<Value> {
    let query = body["messages"][0]["content"].as_str().unwrap_or_default();
    if query.is_empty() {
        return Json(json!({ "error": "No query provided" }));
    }
    let max = body["max_results"].as_u64().unwrap_or(0);
    let results: Vec<Value> = (1..=max.min(2))
        .map(|i| {
            json!({
                "title": format!("{} paper {}", query, i),
                "authors": ["Ada Lovelace", "Alan Turing"],
                "summary": "A summary."
            })
        })
        .collect();
    Json(json!({ "results": results }))
}

async fn agent_handler(Json(body): Json<Value>) -> Json<Value> {
    let messages = body["messages"].as_array().cloned().unwrap_or_default();
    let last = messages
        .last()
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();
    Json(json!({ "content": format!("{} messages, last: {}", messages.len(), last) }))
}

fn backend_router() -> Router {
    Router::new()
        .route("/query", post(query_handler))
        .route("/copilotkit_remote", post(papers_handler))
        .route("/api/copilotkit_remote", post(agent_handler))
}

fn texts(items: &[DisplayItem]) -> Vec<String> {
    items.iter().map(|i| i.headline().to_string()).collect()
}

#[tokio::test]
async fn test_search_round_trip() {
    let client = BackendClient::new(&spawn_backend(backend_router()).await);
    let mut submitter = Submitter::new(Variant::Search);

    let items = submitter.submit(&client, "graph neural networks").await;
    assert_eq!(
        texts(&items),
        vec!["Received query: graph neural networks", "done"]
    );
    assert!(!submitter.is_busy());
}

#[tokio::test]
async fn test_search_backend_error() {
    let client = BackendClient::new(&spawn_backend(backend_router()).await);
    let mut submitter = Submitter::new(Variant::Search);

    let items = submitter.submit(&client, "missing").await;
    assert_eq!(texts(&items), vec!["Error: not found"]);
}

#[tokio::test]
async fn test_search_is_idempotent() {
    let client = BackendClient::new(&spawn_backend(backend_router()).await);
    let mut submitter = Submitter::new(Variant::Search);

    let first = submitter.submit(&client, "rust").await;
    let second = submitter.submit(&client, "rust").await;
    assert_eq!(first, second);
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn test_papers_round_trip() {
    let client = BackendClient::new(&spawn_backend(backend_router()).await);
    let mut submitter = Submitter::new(Variant::Papers);

    let items = submitter.submit(&client, "transformers").await;
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        DisplayItem::Paper {
            title: "transformers paper 1".to_string(),
            authors: vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()],
            summary: "A summary.".to_string(),
        }
    );
}

#[tokio::test]
async fn test_papers_error_reply_shows_nothing() {
    let client = BackendClient::new(&spawn_backend(backend_router()).await);
    let mut submitter = Submitter::new(Variant::Papers);

    let items = submitter.submit(&client, "").await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_chat_accumulates_history() {
    let client = BackendClient::new(&spawn_backend(backend_router()).await);
    let mut submitter = Submitter::new(Variant::Chat);

    submitter.submit(&client, "hello").await;
    submitter.submit(&client, "hi").await;

    assert_eq!(
        submitter.history(),
        &[
            ChatMessage::user("hello"),
            ChatMessage::assistant("1 messages, last: hello"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("3 messages, last: hi"),
        ]
    );
}

#[tokio::test]
async fn test_unreachable_backend() {
    let client = BackendClient::new(&dead_backend());
    let mut submitter = Submitter::new(Variant::Search);

    let items = submitter.submit(&client, "rust").await;
    assert_eq!(texts(&items), vec!["An error occurred while fetching results."]);
    assert!(!submitter.is_busy());
}

#[tokio::test]
async fn test_unreachable_agent_in_chat() {
    let client = BackendClient::new(&dead_backend());
    let mut submitter = Submitter::new(Variant::Chat);

    submitter.submit(&client, "hi").await;
    assert_eq!(
        submitter.history(),
        &[
            ChatMessage::user("hi"),
            ChatMessage::assistant("Error: Could not reach the server"),
        ]
    );
}

#[tokio::test]
async fn test_non_json_reply() {
    let router = Router::new().route(
        "/query",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
    );
    let client = BackendClient::new(&spawn_backend(router).await);
    let mut submitter = Submitter::new(Variant::Search);

    let items = submitter.submit(&client, "rust").await;
    assert_eq!(texts(&items), vec!["An error occurred while fetching results."]);
}

#[tokio::test]
async fn test_error_body_with_failure_status_is_shown() {
    let router = Router::new().route(
        "/query",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "index offline" })),
            )
        }),
    );
    let client = BackendClient::new(&spawn_backend(router).await);
    let mut submitter = Submitter::new(Variant::Search);

    let items = submitter.submit(&client, "rust").await;
    assert_eq!(texts(&items), vec!["Error: index offline"]);
}
