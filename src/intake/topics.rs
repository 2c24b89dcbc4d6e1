// src/intake/topics.rs
// Topic heuristic: counts the intake categories a single message touches

use serde::{Deserialize, Serialize};

/// Intake topic categories recognized by keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicCategory {
    Name,
    Age,
    Phone,
    Email,
    Household,
    Employment,
    Financial,
    Housing,
    Health,
    Legal,
    Benefits,
    Emergency,
}

impl TopicCategory {
    pub const ALL: [TopicCategory; 12] = [
        TopicCategory::Name,
        TopicCategory::Age,
        TopicCategory::Phone,
        TopicCategory::Email,
        TopicCategory::Household,
        TopicCategory::Employment,
        TopicCategory::Financial,
        TopicCategory::Housing,
        TopicCategory::Health,
        TopicCategory::Legal,
        TopicCategory::Benefits,
        TopicCategory::Emergency,
    ];

    /// Lower-case substrings that mark this category
    fn keywords(self) -> &'static [&'static str] {
        match self {
            TopicCategory::Name => &["name is", "called", "i'm "],
            TopicCategory::Age => &["years old", "age", "born"],
            TopicCategory::Phone => &["phone", "number", "555", "cell"],
            TopicCategory::Email => &["email", "e-mail", "@"],
            TopicCategory::Household => &[
                "household",
                "people",
                "wife",
                "husband",
                "child",
                "daughter",
                "son",
                "kids",
                "family members",
            ],
            TopicCategory::Employment => &["unemployed", "employed", "job", "work"],
            TopicCategory::Financial => {
                &["income", "monthly", "$", "earn", "make", "salary", "unemployment benefits"]
            }
            TopicCategory::Housing => {
                &["rent", "own", "homeless", "apartment", "house", "mortgage", "housing", "shelter"]
            }
            TopicCategory::Health => {
                &["disability", "disabled", "insurance", "medical", "health", "doctor"]
            }
            TopicCategory::Legal => &["citizen", "resident", "legal status", "immigra"],
            TopicCategory::Benefits => {
                &["benefits", "snap", "medicaid", "tanf", "assistance", "receiving"]
            }
            TopicCategory::Emergency => {
                &["urgent", "emergency", "behind on", "struggling", "desperate", "need help"]
            }
        }
    }

    fn is_mentioned_in(self, lowered: &str) -> bool {
        self.keywords().iter().any(|kw| lowered.contains(kw))
    }
}

/// Categories the message touches, in declaration order
pub fn topics_in(message: &str) -> Vec<TopicCategory> {
    let lowered = message.to_lowercase();
    TopicCategory::ALL
        .into_iter()
        .filter(|topic| topic.is_mentioned_in(&lowered))
        .collect()
}

/// Number of distinct categories the message touches; each counts at most once
pub fn count_topics(message: &str) -> usize {
    topics_in(message).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_TOPIC_MESSAGE: &str = "My name is Maria Lopez, I am 34 years old and my phone \
        is 555-0142. There are 3 people in my household with my two kids. Our income is $900 \
        monthly and we rent an apartment. I have a disability and no insurance. I am a US \
        citizen, we get SNAP benefits, and it's urgent because we are behind on rent.";

    #[test]
    fn test_ten_topic_message() {
        let topics = topics_in(TEN_TOPIC_MESSAGE);
        assert_eq!(topics.len(), 10, "got {:?}", topics);
        assert!(!topics.contains(&TopicCategory::Email));
        assert!(!topics.contains(&TopicCategory::Employment));
    }

    #[test]
    fn test_each_category_counts_once() {
        assert_eq!(count_topics("rent rent apartment renting housing"), 1);
    }

    #[test]
    fn test_keywords_match_inside_words() {
        // Substring matching: "mortgage" also carries the age marker
        assert_eq!(topics_in("mortgage"), vec![TopicCategory::Age, TopicCategory::Housing]);
        assert_eq!(topics_in("my homework"), vec![TopicCategory::Employment]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(topics_in("I AM HOMELESS"), vec![TopicCategory::Housing]);
    }

    #[test]
    fn test_empty_and_unrelated() {
        assert_eq!(count_topics(""), 0);
        assert_eq!(count_topics("hello there"), 0);
    }

    #[test]
    fn test_all_twelve_reachable() {
        let message = "My name is Sam, 40 years old, phone 555-1212, email sam@example.com. \
            Household of 4 people. I'm unemployed and looking for work, income $0 monthly. \
            We rent. I have a disability. I'm a citizen. We receive SNAP benefits. This is urgent.";
        assert_eq!(count_topics(message), 12);
    }
}
