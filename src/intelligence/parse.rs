//! Two-tier parsing of LLM list and sentiment output
//!
//! Models are asked for JSON arrays but frequently return prose, bulleted
//! lists, or comma-joined fragments. Parsing is therefore two-tier: a
//! strict JSON pass first, then a permissive text split. Malformed output
//! never produces an error, only a smaller (possibly empty) list.

/// Maximum number of topics retained
pub const MAX_TOPICS: usize = 5;

/// Maximum number of key points retained
pub const MAX_KEY_POINTS: usize = 10;

/// Parse a topic list from model output
///
/// Strict tier: a JSON array (non-string elements are stringified).
/// Permissive tier: split on commas and trim. Truncated to [`MAX_TOPICS`].
pub fn parse_topics(text: &str) -> Vec<String> {
    if let Some(items) = parse_json_array(text) {
        return items.into_iter().take(MAX_TOPICS).collect();
    }

    text.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(MAX_TOPICS)
        .collect()
}

/// Parse a key-point list from model output
///
/// Strict tier: a JSON array. Permissive tier: split on lines, stripping
/// leading bullet characters. Truncated to [`MAX_KEY_POINTS`].
pub fn parse_key_points(text: &str) -> Vec<String> {
    if let Some(items) = parse_json_array(text) {
        return items.into_iter().take(MAX_KEY_POINTS).collect();
    }

    text.lines()
        .map(|line| line.trim_start_matches(['-', '•', '*', ' ', '\t']).trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .take(MAX_KEY_POINTS)
        .collect()
}

/// Normalize a sentiment reply to one of positive, negative, neutral
///
/// The reply is lowercased, trimmed, and stripped of trailing punctuation
/// before matching; anything else coerces to "neutral".
pub fn normalize_sentiment(text: &str) -> String {
    let sentiment = text
        .trim()
        .to_lowercase()
        .trim_end_matches(['.', '!'])
        .to_string();

    match sentiment.as_str() {
        "positive" | "negative" | "neutral" => sentiment,
        _ => "neutral".to_string(),
    }
}

/// Strict tier shared by both list parsers
fn parse_json_array(text: &str) -> Option<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    let array = value.as_array()?;
    Some(
        array
            .iter()
            .map(|item| match item.as_str() {
                Some(s) => s.to_string(),
                None => item.to_string(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_topics_json() {
        let topics = parse_topics(r#"["travel", "Japan", "food"]"#);
        assert_eq!(topics, vec!["travel", "Japan", "food"]);
    }

    #[test]
    fn test_parse_topics_comma_fallback() {
        let topics = parse_topics("travel, Japan, food");
        assert_eq!(topics, vec!["travel", "Japan", "food"]);
    }

    #[test]
    fn test_parse_topics_truncates_to_five() {
        let topics = parse_topics("a, b, c, d, e, f, g");
        assert_eq!(topics.len(), 5);
        assert_eq!(topics[4], "e");
    }

    #[test]
    fn test_parse_topics_json_truncates_to_five() {
        let topics = parse_topics(r#"["a","b","c","d","e","f"]"#);
        assert_eq!(topics.len(), 5);
    }

    #[test]
    fn test_parse_topics_single_word() {
        let topics = parse_topics("travel");
        assert_eq!(topics, vec!["travel"]);
    }

    #[test]
    fn test_parse_topics_empty() {
        assert!(parse_topics("").is_empty());
    }

    #[test]
    fn test_parse_topics_non_string_json_elements() {
        let topics = parse_topics(r#"[1, "two"]"#);
        assert_eq!(topics, vec!["1", "two"]);
    }

    #[test]
    fn test_parse_key_points_json() {
        let points = parse_key_points(r#"["Decided on Tokyo", "Book flights in March"]"#);
        assert_eq!(points, vec!["Decided on Tokyo", "Book flights in March"]);
    }

    #[test]
    fn test_parse_key_points_bullet_fallback() {
        let points = parse_key_points("- First point\n• Second point\n* Third point");
        assert_eq!(points, vec!["First point", "Second point", "Third point"]);
    }

    #[test]
    fn test_parse_key_points_drops_empty_lines() {
        let points = parse_key_points("- One\n\n   \n- Two");
        assert_eq!(points, vec!["One", "Two"]);
    }

    #[test]
    fn test_parse_key_points_truncates_to_ten() {
        let input = (1..=12)
            .map(|i| format!("- point {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let points = parse_key_points(&input);
        assert_eq!(points.len(), 10);
    }

    #[test]
    fn test_normalize_sentiment_exact() {
        assert_eq!(normalize_sentiment("positive"), "positive");
        assert_eq!(normalize_sentiment("negative"), "negative");
        assert_eq!(normalize_sentiment("neutral"), "neutral");
    }

    #[test]
    fn test_normalize_sentiment_case_and_whitespace() {
        assert_eq!(normalize_sentiment("  Positive "), "positive");
        assert_eq!(normalize_sentiment("NEGATIVE"), "negative");
    }

    #[test]
    fn test_normalize_sentiment_trailing_punctuation() {
        assert_eq!(normalize_sentiment("Positive."), "positive");
        assert_eq!(normalize_sentiment("negative!"), "negative");
    }

    #[test]
    fn test_normalize_sentiment_coerces_unknown() {
        assert_eq!(normalize_sentiment("mixed feelings"), "neutral");
        assert_eq!(normalize_sentiment(""), "neutral");
        assert_eq!(
            normalize_sentiment("The sentiment is positive"),
            "neutral"
        );
    }
}
