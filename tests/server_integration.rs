//! Router-level API tests
//!
//! Requests go through `create_router` via tower's `oneshot`, backed by a
//! temporary SQLite database and stub providers defined below.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use chatvault::providers::{ChatClient, ChatMessage, Completion, Provider};
use chatvault::server::{create_router, AppState};
use chatvault::storage::{Sender, SqliteStorage};
use chatvault::Result;

/// Always replies with the same text
struct FixedProvider {
    reply: String,
}

#[async_trait]
impl Provider for FixedProvider {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<Completion> {
        Ok(Completion::with_tokens(self.reply.clone(), 7))
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

/// Always fails, like an unreachable provider
struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<Completion> {
        Err(anyhow!("connection refused"))
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

/// Picks a reply based on which derivation prompt it was given
struct AnalysisProvider;

#[async_trait]
impl Provider for AnalysisProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let prompt = &messages.last().expect("non-empty prompt").content;
        let reply = if prompt.contains("concise summary") {
            "A conversation about planning a trip to Japan."
        } else if prompt.contains("main topics") {
            r#"["travel", "Japan"]"#
        } else if prompt.contains("key points") {
            r#"["Visit in spring", "Book flights early"]"#
        } else if prompt.contains("overall sentiment") {
            "Positive!"
        } else {
            "unexpected prompt"
        };
        Ok(Completion::new(reply))
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

fn app(provider: impl Provider + 'static) -> (Router, Arc<AppState>, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let storage =
        SqliteStorage::new_with_path(dir.path().join("chatvault.db")).expect("storage init");
    let state = Arc::new(AppState::new(storage, ChatClient::new(Box::new(provider))));
    (create_router(state.clone()), state, dir)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn test_health_endpoint() {
    let (router, _state, _dir) = app(FixedProvider {
        reply: "hi".to_string(),
    });

    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "chatvault");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_conversation_returns_created() {
    let (router, _state, _dir) = app(FixedProvider {
        reply: "hi".to_string(),
    });

    let (status, body) = send(
        &router,
        post_json("/api/conversations", json!({"title": "Trip planning"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["conversation"]["title"], "Trip planning");
    assert_eq!(body["conversation"]["status"], "active");
    assert_eq!(body["conversation"]["message_count"], 0);
}

#[tokio::test]
async fn test_get_missing_conversation_is_404_envelope() {
    let (router, _state, _dir) = app(FixedProvider {
        reply: "hi".to_string(),
    });

    let (status, body) = send(&router, get("/api/conversations/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Conversation not found");
}

#[tokio::test]
async fn test_list_rejects_invalid_status_filter() {
    let (router, _state, _dir) = app(FixedProvider {
        reply: "hi".to_string(),
    });

    let (status, body) = send(&router, get("/api/conversations?status=archived")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status filter: archived");
}

#[tokio::test]
async fn test_send_message_stores_both_sides_and_titles() {
    let (router, state, _dir) = app(FixedProvider {
        reply: "Spring is the best season.".to_string(),
    });

    let conversation = state.storage.create_conversation(None).unwrap();

    let (status, body) = send(
        &router,
        post_json(
            "/api/conversations/send_message",
            json!({
                "conversation_id": conversation.id,
                "message": "When should I visit Japan?"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user_message"]["sender"], "user");
    assert_eq!(body["ai_response"]["content"], "Spring is the best season.");
    assert_eq!(body["ai_response"]["tokens_used"], 7);
    assert_eq!(body["ai_response"]["model_used"], "stub-model");

    // First exchange auto-titles the conversation
    let updated = state
        .storage
        .get_conversation(&conversation.id)
        .unwrap()
        .unwrap();
    assert_eq!(updated.title.as_deref(), Some("When should I visit Japan?"));
    assert_eq!(state.storage.count_messages(&conversation.id).unwrap(), 2);
}

#[tokio::test]
async fn test_send_message_to_ended_conversation_is_rejected() {
    let (router, state, _dir) = app(FixedProvider {
        reply: "hi".to_string(),
    });

    let conversation = state.storage.create_conversation(Some("Done")).unwrap();
    state
        .storage
        .finalize_conversation(&conversation.id, "over", &[], &[], "neutral")
        .unwrap();

    let (status, body) = send(
        &router,
        post_json(
            "/api/conversations/send_message",
            json!({"conversation_id": conversation.id, "message": "hello?"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Conversation is not active");
    assert_eq!(state.storage.count_messages(&conversation.id).unwrap(), 0);
}

#[tokio::test]
async fn test_send_message_provider_failure_keeps_user_message() {
    let (router, state, _dir) = app(FailingProvider);

    let conversation = state.storage.create_conversation(None).unwrap();

    let (status, body) = send(
        &router,
        post_json(
            "/api/conversations/send_message",
            json!({"conversation_id": conversation.id, "message": "Hello"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Error communicating with AI provider"));

    // The user message was persisted before the provider call
    let messages = state.storage.messages_for(&conversation.id).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, Sender::User);
}

#[tokio::test]
async fn test_end_conversation_stores_derived_fields() {
    let (router, state, _dir) = app(AnalysisProvider);

    let conversation = state.storage.create_conversation(Some("Japan")).unwrap();
    state
        .storage
        .append_message(&conversation.id, "Plan my trip", Sender::User, None, None)
        .unwrap();
    state
        .storage
        .append_message(&conversation.id, "Go in spring", Sender::Ai, None, None)
        .unwrap();

    let (status, body) = send(
        &router,
        post_json(
            "/api/conversations/end_conversation",
            json!({"conversation_id": conversation.id}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Conversation ended and analyzed successfully");

    let ended = body["conversation"].clone();
    assert_eq!(ended["status"], "ended");
    assert_eq!(
        ended["summary"],
        "A conversation about planning a trip to Japan."
    );
    assert_eq!(ended["topics"], json!(["travel", "Japan"]));
    assert_eq!(
        ended["key_points"],
        json!(["Visit in spring", "Book flights early"])
    );
    // "Positive!" is normalized to a bare word
    assert_eq!(ended["sentiment"], "positive");
    assert!(ended["end_timestamp"].is_string());
}

#[tokio::test]
async fn test_end_conversation_twice_is_rejected() {
    let (router, state, _dir) = app(AnalysisProvider);

    let conversation = state.storage.create_conversation(None).unwrap();
    state
        .storage
        .append_message(&conversation.id, "Hello", Sender::User, None, None)
        .unwrap();
    state
        .storage
        .finalize_conversation(&conversation.id, "done", &[], &[], "neutral")
        .unwrap();

    let (status, body) = send(
        &router,
        post_json(
            "/api/conversations/end_conversation",
            json!({"conversation_id": conversation.id}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Conversation is already ended");
}

#[tokio::test]
async fn test_end_empty_conversation_is_rejected() {
    let (router, state, _dir) = app(AnalysisProvider);

    let conversation = state.storage.create_conversation(None).unwrap();

    let (status, body) = send(
        &router,
        post_json(
            "/api/conversations/end_conversation",
            json!({"conversation_id": conversation.id}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot end conversation with no messages");
}

#[tokio::test]
async fn test_query_with_no_match_short_circuits() {
    let (router, _state, _dir) = app(FailingProvider);

    // No ended conversations at all, so the provider is never called
    let (status, body) = send(
        &router,
        post_json(
            "/api/conversations/query_conversations",
            json!({"query": "Japan"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["answer"],
        "No relevant conversations found for your query."
    );
    assert_eq!(body["count"], 0);
    assert_eq!(body["relevant_conversations"], json!([]));
}

#[tokio::test]
async fn test_query_returns_answer_and_ranked_conversations() {
    let (router, state, _dir) = app(FixedProvider {
        reply: "You planned a spring trip to Japan.".to_string(),
    });

    let japan = state.storage.create_conversation(Some("Japan Trip")).unwrap();
    state
        .storage
        .append_message(&japan.id, "Plan my trip", Sender::User, None, None)
        .unwrap();
    state
        .storage
        .finalize_conversation(
            &japan.id,
            "Trip planning",
            &["travel".to_string()],
            &[],
            "positive",
        )
        .unwrap();

    let other = state.storage.create_conversation(Some("Recipes")).unwrap();
    state
        .storage
        .append_message(&other.id, "Pasta ideas", Sender::User, None, None)
        .unwrap();
    state
        .storage
        .finalize_conversation(&other.id, "Cooking", &[], &[], "neutral")
        .unwrap();

    let (status, body) = send(
        &router,
        post_json(
            "/api/conversations/query_conversations",
            json!({"query": "japan"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["answer"], "You planned a spring trip to Japan.");
    assert_eq!(body["count"], 1);
    assert_eq!(body["relevant_conversations"][0]["id"], japan.id);
}

#[tokio::test]
async fn test_delete_conversation() {
    let (router, state, _dir) = app(FixedProvider {
        reply: "hi".to_string(),
    });

    let conversation = state.storage.create_conversation(Some("Gone")).unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/conversations/{}", conversation.id))
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Conversation deleted");
    assert!(state
        .storage
        .get_conversation(&conversation.id)
        .unwrap()
        .is_none());
}
