//! HTTP answering client against a local axum server

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use mark_assistant::answering::{AnsweringError, AnsweringService, ChatRequest, HttpAnsweringService};
use mark_assistant::core::{BranchScope, Role};

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn chat_ok(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.bodies.lock().unwrap().push(body);
    Json(json!({"answer": "Branch 1 sold 42", "resolved_query": "Sales of Branch 1 today"}))
}

async fn suggest_ok(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    let input = body["input"].as_str().unwrap_or_default().to_string();
    recorded.bodies.lock().unwrap().push(body);
    Json(json!({"suggestions": [format!("{} this month", input)]}))
}

async fn categories_ok() -> Json<Value> {
    Json(json!({
        "Branch Insights": ["Sales of Branch 1 today"],
        "Trends": ["Past 3 months sales"],
    }))
}

/// Serve `router` on an ephemeral port and return its base URL
async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn manager_request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        role: Role::Manager,
        branch_id: BranchScope::Branch("1".to_string()),
    }
}

#[tokio::test]
async fn test_chat_posts_identity_and_parses_reply() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/chat", post(chat_ok))
        .with_state(recorded.clone());
    let url = spawn_server(router).await;

    let client = HttpAnsweringService::new(&url, None).unwrap();
    let reply = client.chat(&manager_request("sales today")).await.unwrap();

    assert_eq!(reply.answer.as_deref(), Some("Branch 1 sold 42"));
    assert_eq!(reply.resolved_query.as_deref(), Some("Sales of Branch 1 today"));
    assert_eq!(
        recorded.bodies.lock().unwrap()[0],
        json!({"message": "sales today", "role": "MANAGER", "branch_id": "1"})
    );
}

#[tokio::test]
async fn test_chat_all_branches_sends_all() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/chat", post(chat_ok))
        .with_state(recorded.clone());
    let url = spawn_server(router).await;

    let client = HttpAnsweringService::new(&format!("{}/", url), None).unwrap();
    let request = ChatRequest {
        message: "Compare Branch 1 and Branch 2".to_string(),
        role: Role::BusinessOwner,
        branch_id: BranchScope::All,
    };
    client.chat(&request).await.unwrap();

    let body = recorded.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["role"], "BUSINESS_OWNER");
    assert_eq!(body["branch_id"], "ALL");
}

#[tokio::test]
async fn test_chat_non_success_is_status_error() {
    let router = Router::new().route(
        "/chat",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }),
    );
    let url = spawn_server(router).await;

    let client = HttpAnsweringService::new(&url, None).unwrap();
    let err = client.chat(&manager_request("sales")).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.is_retryable());
    assert!(!err.is_connectivity());
}

#[tokio::test]
async fn test_chat_unexpected_body_is_empty_reply() {
    let router = Router::new().route("/chat", post(|| async { "definitely not json" }));
    let url = spawn_server(router).await;

    let client = HttpAnsweringService::new(&url, None).unwrap();
    let reply = client.chat(&manager_request("sales")).await.unwrap();

    assert!(reply.answer.is_none());
    assert!(reply.resolved_query.is_none());
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpAnsweringService::new(&format!("http://{}", addr), None).unwrap();
    let err = client.chat(&manager_request("sales")).await.unwrap_err();
    assert!(matches!(err, AnsweringError::Network(_)));
    assert!(err.is_connectivity());
}

#[tokio::test]
async fn test_suggest_round_trip() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/suggest", post(suggest_ok))
        .with_state(recorded.clone());
    let url = spawn_server(router).await;

    let client = HttpAnsweringService::new(&url, None).unwrap();
    let suggestions = client.suggest("Sales").await.unwrap();

    assert_eq!(suggestions, vec!["Sales this month".to_string()]);
    assert_eq!(recorded.bodies.lock().unwrap()[0], json!({"input": "Sales"}));
}

#[tokio::test]
async fn test_suggestion_categories() {
    let router = Router::new().route("/suggestions", get(categories_ok));
    let url = spawn_server(router).await;

    let client = HttpAnsweringService::new(&url, None).unwrap();
    let mut categories = client.suggestion_categories().await.unwrap();
    categories.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Branch Insights");
    assert_eq!(categories[1].items, vec!["Past 3 months sales".to_string()]);
}

#[tokio::test]
async fn test_empty_categories_shape() {
    let router = Router::new().route(
        "/suggestions",
        get(|| async { Json(json!({"suggestions": []})) }),
    );
    let url = spawn_server(router).await;

    let client = HttpAnsweringService::new(&url, None).unwrap();
    assert!(client.suggestion_categories().await.unwrap().is_empty());
}
