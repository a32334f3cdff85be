//! Sample data for demos and manual testing
//!
//! Inserts a fixed set of conversations directly through storage, with
//! pre-written summaries, topics, sentiments, and key points. No LLM
//! calls are made.

use crate::error::Result;
use crate::storage::{Sender, SqliteStorage};

struct SampleConversation {
    title: &'static str,
    ended: bool,
    summary: &'static str,
    topics: &'static [&'static str],
    key_points: &'static [&'static str],
    sentiment: &'static str,
    messages: &'static [(&'static str, &'static str)],
}

const SAMPLES: &[SampleConversation] = &[
    SampleConversation {
        title: "Trip to Japan Planning",
        ended: true,
        summary: "User discussed planning a trip to Japan for spring, focusing on Tokyo and \
                  Kyoto. Key points included booking flights, finding accommodations, and \
                  visiting during cherry blossom season.",
        topics: &["travel", "Japan", "Tokyo", "Kyoto", "cherry blossoms"],
        key_points: &[
            "Book flights by next week",
            "Research hotels in Tokyo and Kyoto",
            "Visit during cherry blossom season (late March - early April)",
            "Budget approximately $3000 for 10-day trip",
        ],
        sentiment: "positive",
        messages: &[
            ("user", "I want to plan a trip to Japan next spring. Can you help me?"),
            (
                "ai",
                "Of course! Japan in spring is beautiful, especially during cherry blossom \
                 season. When exactly were you thinking of going, and for how long?",
            ),
            ("user", "I'm thinking late March or early April for about 10 days. Is that good timing?"),
            (
                "ai",
                "Perfect timing! Late March to early April is peak cherry blossom season. For \
                 10 days, I'd recommend splitting your time between Tokyo (5 days) and Kyoto \
                 (4 days), with maybe a day trip. What's your budget looking like?",
            ),
            ("user", "I'm thinking around $3000 total. Is that realistic?"),
            (
                "ai",
                "Yes, $3000 is reasonable for a 10-day trip if you're mindful of expenses. \
                 That covers flights, accommodation, food, transportation, and activities. \
                 Would you like me to help you plan the itinerary?",
            ),
            ("user", "Yes please! What are the must-visit places?"),
            (
                "ai",
                "In Tokyo: Shibuya, Senso-ji Temple, Tokyo Skytree, and a day trip to Mount \
                 Fuji. In Kyoto: Fushimi Inari Shrine, the Arashiyama Bamboo Grove, \
                 Kinkaku-ji, and the Gion District.",
            ),
        ],
    },
    SampleConversation {
        title: "Learning React Hooks",
        ended: true,
        summary: "User learned about React hooks, specifically useState and useEffect. \
                  Discussed practical examples and best practices for managing state and \
                  side effects in functional components.",
        topics: &["programming", "React", "hooks", "JavaScript", "web development"],
        key_points: &[
            "useState for managing component state",
            "useEffect for side effects like API calls",
            "Dependency arrays control when effects run",
            "Custom hooks for reusable logic",
        ],
        sentiment: "positive",
        messages: &[
            ("user", "I'm trying to learn React hooks. Can you explain useState?"),
            (
                "ai",
                "Absolutely! useState is a React hook that lets you add state to functional \
                 components: const [count, setCount] = useState(0). Would you like to see a \
                 practical example?",
            ),
            ("user", "Yes, please show me an example!"),
            (
                "ai",
                "Here's a simple counter: every click calls setCount(count + 1), and the \
                 component re-renders with the new value.",
            ),
            ("user", "Cool! What about useEffect?"),
            (
                "ai",
                "useEffect handles side effects like fetching data or setting up \
                 subscriptions. The dependency array controls when the effect runs.",
            ),
        ],
    },
    SampleConversation {
        title: "Starting a Fitness Routine",
        ended: true,
        summary: "User sought advice on starting a fitness routine as a beginner. Discussed \
                  workout schedules, proper form, nutrition basics, and the importance of \
                  rest days.",
        topics: &["fitness", "health", "exercise", "nutrition", "wellness"],
        key_points: &[
            "Start with 3 days per week for beginners",
            "Combine cardio and strength training",
            "Proper form is more important than weight",
            "Nutrition: Focus on protein and whole foods",
            "Rest days are crucial for recovery",
        ],
        sentiment: "positive",
        messages: &[
            ("user", "I want to start working out but I'm a complete beginner. Where do I start?"),
            (
                "ai",
                "Great decision! Start with 3 days a week, mix cardio and basic strength \
                 training, and focus on proper form over heavy weights. Do you have access \
                 to a gym?",
            ),
            ("user", "I have a gym membership. What exercises should I do?"),
            (
                "ai",
                "A beginner-friendly split: upper body one day, lower body the next, then a \
                 full-body session with cardio. Start with lighter weights to master form!",
            ),
            ("user", "Mainly lose weight and get toned. Should I work out every day?"),
            (
                "ai",
                "No! Rest days are crucial. Your muscles recover between sessions. Stick to \
                 3-4 days per week, create a modest calorie deficit, and be patient.",
            ),
        ],
    },
    SampleConversation {
        title: "Career Advice Discussion",
        ended: false,
        summary: "",
        topics: &[],
        key_points: &[],
        sentiment: "",
        messages: &[
            (
                "user",
                "I'm thinking about switching careers from marketing to software \
                 development. Is it a good idea?",
            ),
            (
                "ai",
                "That's a significant career change! It's definitely possible and many \
                 people have made successful transitions into tech. Can you tell me about \
                 your current experience with programming?",
            ),
            (
                "user",
                "I've done some online courses in Python and JavaScript. I enjoy it but I'm \
                 not sure if I'm good enough to make it a career.",
            ),
            (
                "ai",
                "Imposter syndrome is very common in career transitions! Build a portfolio, \
                 contribute to open source, and network with developers. Your marketing \
                 background is valuable in developer relations and product roles.",
            ),
        ],
    },
];

/// Insert the sample conversations
///
/// When `fresh` is set, existing conversations are removed first.
pub fn run(storage: &SqliteStorage, fresh: bool) -> Result<()> {
    if fresh {
        tracing::info!("Clearing existing conversations");
        storage.delete_all_conversations()?;
    }

    for sample in SAMPLES {
        let conversation = storage.create_conversation(Some(sample.title))?;

        for (sender, content) in sample.messages {
            let sender = match *sender {
                "user" => Sender::User,
                _ => Sender::Ai,
            };
            storage.append_message(&conversation.id, content, sender, None, None)?;
        }

        if sample.ended {
            let topics: Vec<String> = sample.topics.iter().map(|t| t.to_string()).collect();
            let key_points: Vec<String> =
                sample.key_points.iter().map(|k| k.to_string()).collect();
            storage.finalize_conversation(
                &conversation.id,
                sample.summary,
                &topics,
                &key_points,
                sample.sentiment,
            )?;
        }

        tracing::info!("Seeded conversation: {}", sample.title);
    }

    tracing::info!("Seeded {} sample conversations", SAMPLES.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ConversationStatus;
    use tempfile::tempdir;

    #[test]
    fn test_seed_inserts_samples() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(dir.path().join("seed.db")).unwrap();

        run(&storage, false).unwrap();

        let all = storage.list_conversations(None, None).unwrap();
        assert_eq!(all.len(), 4);

        let ended = storage
            .list_conversations(Some(ConversationStatus::Ended), None)
            .unwrap();
        assert_eq!(ended.len(), 3);

        let active = storage
            .list_conversations(Some(ConversationStatus::Active), None)
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title.as_deref(), Some("Career Advice Discussion"));
    }

    #[test]
    fn test_seed_fresh_clears_existing() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(dir.path().join("seed.db")).unwrap();
        storage.create_conversation(Some("Pre-existing")).unwrap();

        run(&storage, true).unwrap();

        let all = storage.list_conversations(None, None).unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|c| c.title.as_deref() != Some("Pre-existing")));
    }

    #[test]
    fn test_seed_ended_samples_have_derived_fields() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(dir.path().join("seed.db")).unwrap();

        run(&storage, false).unwrap();

        let ended = storage
            .list_conversations(Some(ConversationStatus::Ended), None)
            .unwrap();
        for conversation in ended {
            assert!(conversation.summary.is_some());
            assert!(!conversation.topics.is_empty());
            assert!(conversation.sentiment.is_some());
            assert!(conversation.end_timestamp.is_some());
            let count = storage.count_messages(&conversation.id).unwrap();
            assert!(count > 0);
        }
    }
}
