//! HTTP route handlers for the ChatVault API.
//!
//! Every response carries a `success` flag; failures add an `error` string
//! and an appropriate 4xx/5xx status. Domain rules (messaging an ended
//! conversation, ending twice, ending with no messages) map to 400.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::intelligence::{
    analyzer, rank_conversations, ConversationContext, TranscriptMessage,
};
use crate::providers::ChatMessage;
use crate::storage::{Conversation, ConversationStatus, Message, Sender};

use super::state::AppState;

/// System prompt prefixed to every assistant exchange
const ASSISTANT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Default number of candidates for cross-conversation queries
const DEFAULT_QUERY_LIMIT: usize = 5;

/// Title length cap for auto-generated titles
const AUTO_TITLE_CHARS: usize = 50;

type ApiResponse = (StatusCode, Json<Value>);
type ApiResult = Result<ApiResponse, ApiResponse>;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/api/conversations/:id",
            get(get_conversation).delete(delete_conversation),
        )
        .route("/api/conversations/send_message", post(send_message))
        .route(
            "/api/conversations/end_conversation",
            post(end_conversation),
        )
        .route(
            "/api/conversations/query_conversations",
            post(query_conversations),
        )
        .with_state(state)
}

/// Envelope for a failed request
fn failure(status: StatusCode, error: impl Into<String>) -> ApiResponse {
    (status, Json(json!({ "success": false, "error": error.into() })))
}

/// Envelope for an unexpected orchestration error
fn internal(context: &str, error: impl std::fmt::Display) -> ApiResponse {
    tracing::error!("{}: {}", context, error);
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("{}: {}", context, error),
    )
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "chatvault",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List-view JSON for a conversation (no message bodies)
fn conversation_json(conversation: &Conversation, message_count: usize) -> Value {
    json!({
        "id": conversation.id,
        "title": conversation.title,
        "status": conversation.status,
        "start_timestamp": conversation.start_timestamp,
        "end_timestamp": conversation.end_timestamp,
        "summary": conversation.summary,
        "topics": conversation.topics,
        "key_points": conversation.key_points,
        "sentiment": conversation.sentiment,
        "message_count": message_count,
        "duration_seconds": conversation.duration_seconds(),
        "created_at": conversation.created_at,
        "updated_at": conversation.updated_at,
    })
}

fn message_json(message: &Message) -> Value {
    json!({
        "id": message.id,
        "conversation_id": message.conversation_id,
        "content": message.content,
        "sender": message.sender,
        "timestamp": message.timestamp,
        "tokens_used": message.tokens_used,
        "model_used": message.model_used,
        "created_at": message.created_at,
    })
}

/// Detail-view JSON with full message history
fn conversation_detail_json(conversation: &Conversation, messages: &[Message]) -> Value {
    let mut value = conversation_json(conversation, messages.len());
    value["messages"] = Value::Array(messages.iter().map(message_json).collect());
    value
}

/// Auto-generated title from the first user message
fn auto_title(user_message: &str) -> String {
    let truncated: String = user_message.chars().take(AUTO_TITLE_CHARS).collect();
    if user_message.chars().count() > AUTO_TITLE_CHARS {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

#[derive(Debug, Deserialize)]
struct ListParams {
    status: Option<String>,
    search: Option<String>,
}

/// GET /api/conversations
async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    let status = match params.status.as_deref() {
        None => None,
        Some(raw) => match ConversationStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return Err(failure(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid status filter: {}", raw),
                ))
            }
        },
    };

    let conversations = state
        .storage
        .list_conversations(status, params.search.as_deref())
        .map_err(|e| internal("Error listing conversations", e))?;

    let mut payload = Vec::with_capacity(conversations.len());
    for conversation in &conversations {
        let count = state
            .storage
            .count_messages(&conversation.id)
            .map_err(|e| internal("Error listing conversations", e))?;
        payload.push(conversation_json(conversation, count));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "count": payload.len(),
            "conversations": payload,
        })),
    ))
}

/// GET /api/conversations/:id
async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let conversation = state
        .storage
        .get_conversation(&id)
        .map_err(|e| internal("Error loading conversation", e))?
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Conversation not found"))?;

    let messages = state
        .storage
        .messages_for(&id)
        .map_err(|e| internal("Error loading conversation", e))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "conversation": conversation_detail_json(&conversation, &messages),
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct CreateRequest {
    title: Option<String>,
}

/// POST /api/conversations
async fn create_conversation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRequest>,
) -> ApiResult {
    let conversation = state
        .storage
        .create_conversation(request.title.as_deref())
        .map_err(|e| internal("Error creating conversation", e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "conversation": conversation_json(&conversation, 0),
            "message": "Conversation created successfully",
        })),
    ))
}

/// DELETE /api/conversations/:id
async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    state
        .storage
        .get_conversation(&id)
        .map_err(|e| internal("Error deleting conversation", e))?
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Conversation not found"))?;

    state
        .storage
        .delete_conversation(&id)
        .map_err(|e| internal("Error deleting conversation", e))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Conversation deleted",
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    conversation_id: String,
    message: String,
}

/// POST /api/conversations/send_message
///
/// The user message is persisted before the provider call, so a provider
/// failure returns 500 with the user message already stored and no AI
/// message appended.
async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult {
    let conversation = state
        .storage
        .get_conversation(&request.conversation_id)
        .map_err(|e| internal("Error processing message", e))?
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Conversation not found"))?;

    if conversation.status != ConversationStatus::Active {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Conversation is not active",
        ));
    }

    let user_message = state
        .storage
        .append_message(
            &conversation.id,
            &request.message,
            Sender::User,
            None,
            None,
        )
        .map_err(|e| internal("Error processing message", e))?;

    // Build role-tagged history including the message just stored
    let history = state
        .storage
        .messages_for(&conversation.id)
        .map_err(|e| internal("Error processing message", e))?;

    let mut chat_messages = vec![ChatMessage::system(ASSISTANT_SYSTEM_PROMPT)];
    for message in &history {
        chat_messages.push(match message.sender {
            Sender::User => ChatMessage::user(&message.content),
            Sender::Ai => ChatMessage::assistant(&message.content),
        });
    }

    let reply = state.chat.chat(&chat_messages).await;
    if reply.error {
        return Err(failure(StatusCode::INTERNAL_SERVER_ERROR, reply.response));
    }

    let ai_message = state
        .storage
        .append_message(
            &conversation.id,
            &reply.response,
            Sender::Ai,
            reply.tokens_used,
            Some(&reply.model),
        )
        .map_err(|e| internal("Error processing message", e))?;

    // Title the conversation after the first exchange
    let count = state
        .storage
        .count_messages(&conversation.id)
        .map_err(|e| internal("Error processing message", e))?;
    if count == 2 && conversation.title.is_none() {
        state
            .storage
            .set_title(&conversation.id, &auto_title(&request.message))
            .map_err(|e| internal("Error processing message", e))?;
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "user_message": message_json(&user_message),
            "ai_response": message_json(&ai_message),
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct EndConversationRequest {
    conversation_id: String,
}

/// POST /api/conversations/end_conversation
async fn end_conversation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EndConversationRequest>,
) -> ApiResult {
    let conversation = state
        .storage
        .get_conversation(&request.conversation_id)
        .map_err(|e| internal("Error ending conversation", e))?
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Conversation not found"))?;

    if conversation.status == ConversationStatus::Ended {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Conversation is already ended",
        ));
    }

    let messages = state
        .storage
        .messages_for(&conversation.id)
        .map_err(|e| internal("Error ending conversation", e))?;

    if messages.is_empty() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Cannot end conversation with no messages",
        ));
    }

    let transcript: Vec<TranscriptMessage> = messages
        .iter()
        .map(|m| TranscriptMessage::new(m.sender.as_str(), m.content.clone()))
        .collect();

    let summary = analyzer::generate_summary(&state.chat, &transcript).await;
    let topics = analyzer::extract_topics(&state.chat, &transcript).await;
    let key_points = analyzer::extract_key_points(&state.chat, &transcript).await;
    let sentiment = analyzer::analyze_sentiment(&state.chat, &transcript).await;

    state
        .storage
        .finalize_conversation(&conversation.id, &summary, &topics, &key_points, &sentiment)
        .map_err(|e| internal("Error ending conversation", e))?;

    let updated = state
        .storage
        .get_conversation(&conversation.id)
        .map_err(|e| internal("Error ending conversation", e))?
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Conversation not found"))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "conversation": conversation_detail_json(&updated, &messages),
            "message": "Conversation ended and analyzed successfully",
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
    limit: Option<usize>,
}

/// POST /api/conversations/query_conversations
async fn query_conversations(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> ApiResult {
    let limit = request.limit.unwrap_or(DEFAULT_QUERY_LIMIT);

    let candidates = state
        .storage
        .list_ended_between(request.date_from, request.date_to)
        .map_err(|e| internal("Error querying conversations", e))?;

    let mut contexts = Vec::with_capacity(candidates.len());
    for conversation in &candidates {
        let messages = state
            .storage
            .messages_for(&conversation.id)
            .map_err(|e| internal("Error querying conversations", e))?;
        contexts.push(ConversationContext {
            id: conversation.id.clone(),
            title: conversation.title.clone(),
            summary: conversation.summary.clone(),
            topics: conversation.topics.clone(),
            start_timestamp: conversation.start_timestamp,
            messages: messages
                .iter()
                .map(|m| TranscriptMessage::new(m.sender.as_str(), m.content.clone()))
                .collect(),
        });
    }

    let ranked = rank_conversations(&request.query, &contexts, limit);

    if ranked.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(json!({
                "success": true,
                "query": request.query,
                "answer": "No relevant conversations found for your query.",
                "relevant_conversations": [],
                "count": 0,
            })),
        ));
    }

    let outcome = analyzer::query_conversations(&state.chat, &request.query, &ranked).await;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "query": request.query,
            "answer": outcome.answer,
            "relevant_conversations": ranked,
            "count": ranked.len(),
        })),
    ))
}
