//! Transcript derivation and cross-conversation querying
//!
//! Each derivation is one chat call with a fixed system/user prompt pair,
//! followed by normalization of whatever the model returned. Provider
//! failures degrade to fallback values rather than errors.

use crate::intelligence::parse;
use crate::intelligence::{transcript_text, ConversationContext, TranscriptMessage};
use crate::providers::{ChatClient, ChatMessage};

/// Fallback summary when the model reply is empty or errored
const SUMMARY_FALLBACK: &str = "Summary generation failed";

/// Per-message sample length in query context blocks
const CONTEXT_SNIPPET_CHARS: usize = 200;

/// Messages sampled per conversation in query context blocks
const CONTEXT_SAMPLE_MESSAGES: usize = 5;

/// Generate a concise summary of a transcript
///
/// Returns the model's reply text unchanged, or the fallback literal when
/// the call failed or produced nothing.
pub async fn generate_summary(client: &ChatClient, messages: &[TranscriptMessage]) -> String {
    let prompt = vec![
        ChatMessage::system(
            "You are an AI assistant that creates concise, informative summaries of conversations.",
        ),
        ChatMessage::user(format!(
            "Please provide a concise summary of the following conversation:\n\n{}",
            transcript_text(messages)
        )),
    ];

    let reply = client.chat(&prompt).await;
    if reply.error || reply.response.trim().is_empty() {
        return SUMMARY_FALLBACK.to_string();
    }
    reply.response
}

/// Extract up to five main topics from a transcript
pub async fn extract_topics(client: &ChatClient, messages: &[TranscriptMessage]) -> Vec<String> {
    let prompt = vec![
        ChatMessage::system(
            "You are an AI that extracts key topics from conversations. \
             Return only a JSON array of topics.",
        ),
        ChatMessage::user(format!(
            "Extract 3-5 main topics from this conversation as a JSON array:\n\n{}",
            transcript_text(messages)
        )),
    ];

    let reply = client.chat(&prompt).await;
    if reply.error {
        return Vec::new();
    }
    parse::parse_topics(&reply.response)
}

/// Extract up to ten key points, decisions, and action items
pub async fn extract_key_points(
    client: &ChatClient,
    messages: &[TranscriptMessage],
) -> Vec<String> {
    let prompt = vec![
        ChatMessage::system(
            "You are an AI that extracts key points, decisions, and action items. \
             Return a JSON array of strings.",
        ),
        ChatMessage::user(format!(
            "Extract key points, decisions, and action items from this conversation \
             as a JSON array:\n\n{}",
            transcript_text(messages)
        )),
    ];

    let reply = client.chat(&prompt).await;
    if reply.error {
        return Vec::new();
    }
    parse::parse_key_points(&reply.response)
}

/// Classify the overall sentiment of a transcript
///
/// Always returns one of "positive", "negative", "neutral".
pub async fn analyze_sentiment(client: &ChatClient, messages: &[TranscriptMessage]) -> String {
    let prompt = vec![
        ChatMessage::system(
            "You are an AI that analyzes sentiment. Respond with only one word: \
             positive, negative, or neutral.",
        ),
        ChatMessage::user(format!(
            "What is the overall sentiment of this conversation?\n\n{}",
            transcript_text(messages)
        )),
    ];

    let reply = client.chat(&prompt).await;
    parse::normalize_sentiment(&reply.response)
}

/// Result of a cross-conversation query
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// The model's answer, or its error description
    pub answer: String,
    /// IDs of every candidate that was put in front of the model
    pub relevant_conversations: Vec<String>,
    /// Whether the provider call failed
    pub error: bool,
}

/// Answer a natural-language question over a set of candidate conversations
///
/// Builds one context block per conversation (header, title, summary,
/// topics, and a sample of its first messages), asks the model once, and
/// returns the answer together with the IDs of all candidates.
pub async fn query_conversations(
    client: &ChatClient,
    query: &str,
    candidates: &[ConversationContext],
) -> QueryOutcome {
    let context = candidates
        .iter()
        .map(context_block)
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = vec![
        ChatMessage::system(
            "You are an AI assistant that helps users find information in their past \
             conversations. Provide clear, specific answers with references to \
             conversation IDs when relevant.",
        ),
        ChatMessage::user(format!(
            "Based on these past conversations:\n\n{}\n\nUser question: {}\n\n\
             Provide a helpful answer with specific references.",
            context, query
        )),
    ];

    let reply = client.chat(&prompt).await;

    QueryOutcome {
        answer: reply.response,
        relevant_conversations: candidates.iter().map(|c| c.id.clone()).collect(),
        error: reply.error,
    }
}

/// One context block for a candidate conversation
fn context_block(conversation: &ConversationContext) -> String {
    let mut block = format!(
        "\n--- Conversation {} ({}) ---\n",
        conversation.id,
        conversation.start_timestamp.to_rfc3339()
    );
    block.push_str(&format!(
        "Title: {}\n",
        conversation.title.as_deref().unwrap_or("Untitled")
    ));
    block.push_str(&format!(
        "Summary: {}\n",
        conversation.summary.as_deref().unwrap_or("No summary")
    ));
    block.push_str(&format!("Topics: {}\n", conversation.topics.join(", ")));

    for message in conversation.messages.iter().take(CONTEXT_SAMPLE_MESSAGES) {
        let snippet: String = message.content.chars().take(CONTEXT_SNIPPET_CHARS).collect();
        block.push_str(&format!("{}: {}...\n", message.sender, snippet));
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::base::MockProvider;
    use crate::providers::Completion;
    use anyhow::anyhow;
    use chrono::Utc;

    fn client_returning(text: &'static str) -> ChatClient {
        let mut provider = MockProvider::new();
        provider
            .expect_chat()
            .returning(move |_| Ok(Completion::new(text)));
        provider.expect_model().return_const("test-model".to_string());
        ChatClient::new(Box::new(provider))
    }

    fn failing_client() -> ChatClient {
        let mut provider = MockProvider::new();
        provider
            .expect_chat()
            .returning(|_| Err(anyhow!("provider down")));
        provider.expect_model().return_const("test-model".to_string());
        ChatClient::new(Box::new(provider))
    }

    fn transcript() -> Vec<TranscriptMessage> {
        vec![
            TranscriptMessage::new("user", "I want to visit Japan"),
            TranscriptMessage::new("ai", "Great choice! Spring is ideal."),
        ]
    }

    #[tokio::test]
    async fn test_generate_summary_passthrough() {
        let client = client_returning("A chat about visiting Japan.");
        let summary = generate_summary(&client, &transcript()).await;
        assert_eq!(summary, "A chat about visiting Japan.");
    }

    #[tokio::test]
    async fn test_generate_summary_fallback_on_error() {
        let client = failing_client();
        let summary = generate_summary(&client, &transcript()).await;
        assert_eq!(summary, "Summary generation failed");
    }

    #[tokio::test]
    async fn test_generate_summary_fallback_on_empty() {
        let client = client_returning("   ");
        let summary = generate_summary(&client, &transcript()).await;
        assert_eq!(summary, "Summary generation failed");
    }

    #[tokio::test]
    async fn test_extract_topics_json_reply() {
        let client = client_returning(r#"["travel", "Japan"]"#);
        let topics = extract_topics(&client, &transcript()).await;
        assert_eq!(topics, vec!["travel", "Japan"]);
    }

    #[tokio::test]
    async fn test_extract_topics_fallback_reply() {
        let client = client_returning("travel, Japan, food");
        let topics = extract_topics(&client, &transcript()).await;
        assert_eq!(topics, vec!["travel", "Japan", "food"]);
    }

    #[tokio::test]
    async fn test_extract_topics_empty_on_error() {
        let client = failing_client();
        let topics = extract_topics(&client, &transcript()).await;
        assert!(topics.is_empty());
    }

    #[tokio::test]
    async fn test_extract_key_points_bullets() {
        let client = client_returning("- Visit Tokyo\n- Book in March");
        let points = extract_key_points(&client, &transcript()).await;
        assert_eq!(points, vec!["Visit Tokyo", "Book in March"]);
    }

    #[tokio::test]
    async fn test_analyze_sentiment_normalizes() {
        let client = client_returning("Positive.");
        let sentiment = analyze_sentiment(&client, &transcript()).await;
        assert_eq!(sentiment, "positive");
    }

    #[tokio::test]
    async fn test_analyze_sentiment_neutral_on_error() {
        let client = failing_client();
        let sentiment = analyze_sentiment(&client, &transcript()).await;
        assert_eq!(sentiment, "neutral");
    }

    #[tokio::test]
    async fn test_query_conversations_returns_all_candidate_ids() {
        let client = client_returning("You discussed Japan in conversation c1.");
        let candidates = vec![
            ConversationContext {
                id: "c1".to_string(),
                title: Some("Japan Trip".to_string()),
                summary: Some("Trip planning".to_string()),
                topics: vec!["japan".to_string()],
                start_timestamp: Utc::now(),
                messages: transcript(),
            },
            ConversationContext {
                id: "c2".to_string(),
                title: None,
                summary: None,
                topics: vec![],
                start_timestamp: Utc::now(),
                messages: vec![],
            },
        ];

        let outcome = query_conversations(&client, "What did I plan?", &candidates).await;
        assert!(!outcome.error);
        assert_eq!(outcome.answer, "You discussed Japan in conversation c1.");
        assert_eq!(outcome.relevant_conversations, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_query_conversations_error_flag() {
        let client = failing_client();
        let outcome = query_conversations(&client, "anything", &[]).await;
        assert!(outcome.error);
        assert!(outcome.answer.contains("provider down"));
    }

    #[test]
    fn test_context_block_format() {
        let conversation = ConversationContext {
            id: "c1".to_string(),
            title: None,
            summary: None,
            topics: vec!["a".to_string(), "b".to_string()],
            start_timestamp: Utc::now(),
            messages: vec![TranscriptMessage::new("user", "Hello")],
        };

        let block = context_block(&conversation);
        assert!(block.contains("--- Conversation c1 ("));
        assert!(block.contains("Title: Untitled"));
        assert!(block.contains("Summary: No summary"));
        assert!(block.contains("Topics: a, b"));
        assert!(block.contains("user: Hello..."));
    }

    #[test]
    fn test_context_block_truncates_messages() {
        let long = "x".repeat(500);
        let conversation = ConversationContext {
            id: "c1".to_string(),
            title: None,
            summary: None,
            topics: vec![],
            start_timestamp: Utc::now(),
            messages: (0..8)
                .map(|_| TranscriptMessage::new("user", long.clone()))
                .collect(),
        };

        let block = context_block(&conversation);
        // Only the first 5 messages are sampled, each capped at 200 chars
        assert_eq!(block.matches("user: ").count(), 5);
        assert!(!block.contains(&"x".repeat(201)));
        assert!(block.contains(&"x".repeat(200)));
    }
}
