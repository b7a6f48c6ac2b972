use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Final sentiment label. The raw score stays internal; only the trichotomy
/// is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        };
        write!(f, "{}", name)
    }
}

/// Fatigue vocabulary shared with the intent cascade.
pub const FATIGUE_TERMS: &[&str] = &[
    "tired",
    "exhausted",
    "worn out",
    "drained",
    "sleepy",
    "fatigued",
    "weary",
    "no energy",
    "burned out",
    "burnt out",
    "rough day",
    "long day",
];

/// Trailing markers that read as a weary sigh.
pub const WEARY_MARKERS: &[&str] = &["...", "…", "zzz", "ugh"];

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "awesome", "love", "happy", "thank", "nice", "fun", "wonderful",
    "excited", "amazing", "cool", "glad", "enjoy", "beautiful", "lovely", "perfect",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "hate", "awful", "terrible", "angry", "sad", "tired", "exhausted", "worried",
    "annoyed", "gloomy", "miserable", "lonely", "stressed", "sick", "upset", "cold", "drained",
];

const POSITIVE_MARKERS: &[&str] = &["!", "♪", ":)", "😊", "😄"];

const NEGATIVE_MARKERS: &[&str] = &["...", "…", ":(", "😞", "😢"];

const STRONG_NEGATIVE_PATTERNS: &[&str] = &[
    r"can'?t (take|stand|handle) (this|it) anymore",
    r"want to (give up|disappear|cry)",
    r"worst day (ever|of my life)",
    r"completely (burned|burnt) out",
    r"at my limit",
];

/// True when a fatigue term co-occurs with a weary trailing marker. Used by
/// the sentiment score and by the top of the intent cascade.
pub fn weary_cooccurrence(text: &str) -> bool {
    let lower = text.to_lowercase();
    let trimmed = lower.trim_end();
    FATIGUE_TERMS.iter().any(|term| lower.contains(term))
        && WEARY_MARKERS.iter().any(|marker| trimmed.ends_with(marker))
}

/// Lexicon-and-marker scorer over whitespace tokens. No model, fully
/// deterministic.
pub struct SentimentAnalyzer {
    strong_negative: Vec<Regex>,
}

impl SentimentAnalyzer {
    pub fn new() -> Result<Self> {
        let strong_negative = STRONG_NEGATIVE_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(SentimentAnalyzer { strong_negative })
    }

    pub fn analyze(&self, text: &str) -> SentimentLabel {
        let score = self.score(text);
        if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    fn score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut score = 0.0;

        for token in lower.split_whitespace() {
            if POSITIVE_WORDS.iter().any(|word| token.contains(word)) {
                score += 1.0;
            }
            if NEGATIVE_WORDS.iter().any(|word| token.contains(word)) {
                score -= 1.0;
            }
        }

        if POSITIVE_MARKERS.iter().any(|marker| lower.contains(marker)) {
            score += 0.5;
        }
        let trimmed = lower.trim_end();
        for marker in NEGATIVE_MARKERS {
            if trimmed.ends_with(marker) {
                score -= 0.5;
            }
        }

        if weary_cooccurrence(&lower) {
            score -= 1.0;
        }

        for pattern in &self.strong_negative {
            if pattern.is_match(&lower) {
                score -= 1.5;
            }
        }

        score
    }
}
