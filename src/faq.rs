//! Banking FAQ matcher
//!
//! Scores a free-text query against a fixed question→answer table using
//! word-overlap heuristics plus topical trigger bonuses. Pure lookup:
//! no external calls, the tables are built once and never mutated.

use tracing::debug;

/// An immutable question/answer pair, identified by a stable key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub key: String,
    pub question: String,
    pub answer: String,
}

/// A topical trigger: any query containing one of `triggers` adds a
/// fixed bonus to the entry whose key equals `topic_key`.
#[derive(Debug, Clone)]
pub struct TopicBoost {
    pub triggers: Vec<String>,
    pub topic_key: String,
}

/// Points per query word found in the entry question text.
const QUESTION_WORD_SCORE: u32 = 2;
/// Points per query word found in the entry answer text.
const ANSWER_WORD_SCORE: u32 = 1;
/// Bonus when a topical trigger substring matches the entry's topic.
const TOPIC_BONUS: u32 = 5;

/// FAQ table plus boost rules, searchable by word overlap.
///
/// Entries keep their insertion order; ties on score resolve to the
/// earliest entry.
pub struct FaqIndex {
    entries: Vec<FaqEntry>,
    boosts: Vec<TopicBoost>,
}

impl FaqIndex {
    pub fn new(entries: Vec<FaqEntry>, boosts: Vec<TopicBoost>) -> Self {
        Self { entries, boosts }
    }

    /// Build the index over the stock banking FAQ table.
    pub fn with_default_entries() -> Self {
        Self::new(default_entries(), default_boosts())
    }

    /// Find the best-matching entry for a free-text query, or `None`
    /// when nothing scores above zero.
    pub fn search(&self, query: &str) -> Option<&FaqEntry> {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return None;
        }

        // Exact question match wins outright (greeting phrases).
        for entry in &self.entries {
            if query_lower == entry.question.to_lowercase() {
                return Some(entry);
            }
        }

        let query_words: Vec<&str> = query_lower.split_whitespace().collect();

        let mut best_match: Option<&FaqEntry> = None;
        let mut best_score = 0u32;

        for entry in &self.entries {
            let score = self.score_entry(entry, &query_lower, &query_words);

            // Strictly greater: ties keep the first entry in table order.
            if score > best_score {
                best_score = score;
                best_match = Some(entry);
            }
        }

        debug!(best_score, matched = best_match.is_some(), "FAQ search scored");

        best_match
    }

    fn score_entry(&self, entry: &FaqEntry, query_lower: &str, query_words: &[&str]) -> u32 {
        let mut score = 0u32;

        let question_lower = entry.question.to_lowercase();
        let question_words: Vec<&str> = question_lower.split_whitespace().collect();
        let answer_lower = entry.answer.to_lowercase();
        let answer_words: Vec<&str> = answer_lower.split_whitespace().collect();

        for word in query_words {
            if question_words.contains(word) {
                score += QUESTION_WORD_SCORE;
            }
            if answer_words.contains(word) {
                score += ANSWER_WORD_SCORE;
            }
        }

        for boost in &self.boosts {
            if entry.key == boost.topic_key
                && boost.triggers.iter().any(|t| query_lower.contains(t.as_str()))
            {
                score += TOPIC_BONUS;
            }
        }

        score
    }
}

impl Default for FaqIndex {
    fn default() -> Self {
        Self::with_default_entries()
    }
}

fn entry(key: &str, question: &str, answer: &str) -> FaqEntry {
    FaqEntry {
        key: key.to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

fn boost(triggers: &[&str], topic_key: &str) -> TopicBoost {
    TopicBoost {
        triggers: triggers.iter().map(|t| t.to_string()).collect(),
        topic_key: topic_key.to_string(),
    }
}

/// Stock banking FAQ table. Sample data: bilingual Georgian/English,
/// matching the tone of the rest of the assistant.
fn default_entries() -> Vec<FaqEntry> {
    vec![
        entry(
            "greetings",
            "hello",
            "გამარჯობა! Hello! I'm the bank's AI assistant. How can I help you today?",
        ),
        entry(
            "greetings_hi",
            "hi",
            "გამარჯობა! I'm the bank's virtual assistant. How can I help?",
        ),
        entry(
            "greetings_gamarjoba",
            "გამარჯობა",
            "გამარჯობა! I can help you with banking questions, exchange rates, weather and time.",
        ),
        entry(
            "account_types",
            "What account types do you offer?",
            "You can open: 1) a current (salary) account, 2) a savings account, \
             3) a foreign currency account (USD, EUR), 4) a business account. \
             All accounts can be opened online or at a branch.",
        ),
        entry(
            "card_fees",
            "What are the card fees?",
            "Card fees: 1) annual service 15-25 GEL depending on the card type, \
             2) ATM withdrawal 1-2 GEL, 3) use at foreign banks 2-3% plus a commission. \
             Some premium cards are free.",
        ),
        entry(
            "transfer_limits",
            "What are the transfer limits?",
            "Transfer limits: 1) daily 50,000 GEL (standard), 2) monthly 500,000 GEL, \
             3) international 25,000 USD equivalent per day. \
             Visit a branch to request higher limits.",
        ),
        entry(
            "loan_requirements",
            "What documents do I need for a loan?",
            "For a loan you need: 1) a passport or ID card, 2) a salary statement or \
             6 months of account history, 3) an employment certificate, \
             4) property documents where applicable. A first loan requires \
             3-6 months of work experience.",
        ),
        entry(
            "security_tips",
            "How do I keep my bank account safe?",
            "Security tips: 1) never share your PIN or SMS codes, 2) only use the \
             official banking app, 3) do not follow unknown links, 4) enable SMS \
             notifications, 5) change your passwords regularly.",
        ),
        entry(
            "online_banking",
            "How do I open online banking?",
            "To register for online banking: 1) open the bank's website, 2) choose \
             'Login' then 'Register', 3) enter your personal and card numbers, \
             4) confirm the SMS code, 5) set a password. The first login requires \
             verification at a branch.",
        ),
    ]
}

/// Topical trigger substrings, English and Georgian variants per topic.
fn default_boosts() -> Vec<TopicBoost> {
    vec![
        boost(&["fee", "commission", "საკომისიო"], "card_fees"),
        boost(&["account", "ანგარიში"], "account_types"),
        boost(&["loan", "სესხ"], "loan_requirements"),
        boost(&["security", "უსაფრთხოებ"], "security_tips"),
        boost(&["online", "ონლაინ"], "online_banking"),
    ]
}
