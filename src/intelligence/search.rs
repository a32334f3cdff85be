//! Keyword relevance ranking over conversations
//!
//! A fixed-weight scoring scheme stands in for vector similarity: title
//! matches weigh most, then summary, topics, and individual messages.

use crate::intelligence::ConversationContext;

/// Score a single conversation against a lowercased query
///
/// Weights: 5 for a title match, 3 for a summary match, 2 per matching
/// topic, 1 per matching message. All matches are case-insensitive
/// substring checks.
pub fn score_conversation(query_lower: &str, conversation: &ConversationContext) -> u32 {
    let mut score = 0;

    if let Some(title) = &conversation.title {
        if title.to_lowercase().contains(query_lower) {
            score += 5;
        }
    }

    if let Some(summary) = &conversation.summary {
        if summary.to_lowercase().contains(query_lower) {
            score += 3;
        }
    }

    for topic in &conversation.topics {
        if topic.to_lowercase().contains(query_lower) {
            score += 2;
        }
    }

    for message in &conversation.messages {
        if message.content.to_lowercase().contains(query_lower) {
            score += 1;
        }
    }

    score
}

/// Rank conversations by keyword relevance
///
/// Conversations scoring zero are dropped; the rest are sorted by score
/// descending (ties keep their input order) and truncated to `limit`.
pub fn rank_conversations(
    query: &str,
    conversations: &[ConversationContext],
    limit: usize,
) -> Vec<ConversationContext> {
    let query_lower = query.to_lowercase();

    let mut scored: Vec<(u32, &ConversationContext)> = conversations
        .iter()
        .map(|conv| (score_conversation(&query_lower, conv), conv))
        .filter(|(score, _)| *score > 0)
        .collect();

    // sort_by is stable, so equal scores keep input order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(limit)
        .map(|(_, conv)| conv.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::TranscriptMessage;
    use chrono::Utc;

    fn context(
        id: &str,
        title: Option<&str>,
        summary: Option<&str>,
        topics: &[&str],
        messages: &[&str],
    ) -> ConversationContext {
        ConversationContext {
            id: id.to_string(),
            title: title.map(|t| t.to_string()),
            summary: summary.map(|s| s.to_string()),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            start_timestamp: Utc::now(),
            messages: messages
                .iter()
                .map(|m| TranscriptMessage::new("user", *m))
                .collect(),
        }
    }

    #[test]
    fn test_score_weights() {
        // title (5) + topic (2) = 7
        let conv = context(
            "c1",
            Some("Japan Trip"),
            Some("Planning a vacation"),
            &["japan", "travel"],
            &["What should I see?"],
        );
        assert_eq!(score_conversation("japan", &conv), 7);
    }

    #[test]
    fn test_score_counts_each_message() {
        let conv = context(
            "c1",
            None,
            None,
            &[],
            &["japan first", "japan second", "unrelated"],
        );
        assert_eq!(score_conversation("japan", &conv), 2);
    }

    #[test]
    fn test_score_is_case_insensitive() {
        let conv = context("c1", Some("JAPAN trip"), None, &[], &[]);
        assert_eq!(score_conversation("japan", &conv), 5);
    }

    #[test]
    fn test_score_zero_without_match() {
        let conv = context("c1", Some("Recipes"), Some("Cooking"), &["food"], &["pasta"]);
        assert_eq!(score_conversation("japan", &conv), 0);
    }

    #[test]
    fn test_rank_drops_zero_scores() {
        let conversations = vec![
            context("match", Some("Japan"), None, &[], &[]),
            context("nomatch", Some("Recipes"), None, &[], &[]),
        ];
        let ranked = rank_conversations("japan", &conversations, 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "match");
    }

    #[test]
    fn test_rank_sorts_descending() {
        let conversations = vec![
            context("low", None, None, &[], &["japan"]),
            context("high", Some("Japan"), None, &["japan"], &[]),
            context("mid", None, Some("japan"), &[], &[]),
        ];
        let ranked = rank_conversations("japan", &conversations, 5);
        let ids: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let conversations = vec![
            context("first", Some("japan"), None, &[], &[]),
            context("second", Some("japan"), None, &[], &[]),
        ];
        let ranked = rank_conversations("japan", &conversations, 5);
        let ids: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_rank_respects_limit() {
        let conversations: Vec<ConversationContext> = (0..10)
            .map(|i| context(&format!("c{}", i), Some("japan"), None, &[], &[]))
            .collect();
        let ranked = rank_conversations("japan", &conversations, 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_rank_empty_input() {
        let ranked = rank_conversations("japan", &[], 5);
        assert!(ranked.is_empty());
    }
}
