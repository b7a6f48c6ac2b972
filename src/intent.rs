use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::sentiment::weary_cooccurrence;

/// Closed set of intent labels. Every message resolves to exactly one;
/// anything unmatched falls through to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    FatigueSupport,
    WeatherInquiry,
    ClothingInquiry,
    WeatherTalk,
    Greeting,
    Farewell,
    ActivityRequest,
    Appreciation,
    HelpRequest,
    Question,
    General,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Intent::FatigueSupport => "fatigue_support",
            Intent::WeatherInquiry => "weather_inquiry",
            Intent::ClothingInquiry => "clothing_inquiry",
            Intent::WeatherTalk => "weather_talk",
            Intent::Greeting => "greeting",
            Intent::Farewell => "farewell",
            Intent::ActivityRequest => "activity_request",
            Intent::Appreciation => "appreciation",
            Intent::HelpRequest => "help_request",
            Intent::Question => "question",
            Intent::General => "general",
        };
        write!(f, "{}", name)
    }
}

struct IntentRule {
    intent: Intent,
    lexicon: &'static [&'static str],
    patterns: Vec<Regex>,
}

impl IntentRule {
    fn matches(&self, text: &str) -> bool {
        if self.lexicon.iter().any(|phrase| text.contains(phrase)) {
            return true;
        }
        if self.patterns.iter().any(|pattern| pattern.is_match(text)) {
            return true;
        }
        // A fatigue term next to a trailing sigh is enough on its own,
        // even when no single lexicon phrase hits.
        self.intent == Intent::FatigueSupport && weary_cooccurrence(text)
    }
}

/// Ordered rule cascade, highest priority first. The first rule that
/// matches wins; there is no scoring.
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    pub fn new() -> Result<Self> {
        let rules = vec![
            IntentRule {
                intent: Intent::FatigueSupport,
                lexicon: &[
                    "exhausted",
                    "so tired",
                    "worn out",
                    "drained",
                    "burned out",
                    "burnt out",
                    "need a break",
                    "can't keep going",
                    "no energy",
                ],
                patterns: vec![],
            },
            IntentRule {
                intent: Intent::WeatherInquiry,
                lexicon: &[
                    "what's the weather",
                    "whats the weather",
                    "how's the weather",
                    "hows the weather",
                    "weather today",
                    "weather forecast",
                    "weather like",
                    "will it rain",
                    "is it raining",
                    "going to rain",
                    "how hot is it",
                    "how cold is it",
                ],
                patterns: vec![Regex::new(r"(what|how).{0,30}weather.*\?")?],
            },
            IntentRule {
                intent: Intent::ClothingInquiry,
                lexicon: &[
                    "what should i wear",
                    "what to wear",
                    "should i wear",
                    "do i need a coat",
                    "need a jacket",
                    "need an umbrella",
                    "dress for",
                    "outfit for",
                ],
                patterns: vec![Regex::new(r"wear.*\?")?],
            },
            IntentRule {
                intent: Intent::WeatherTalk,
                lexicon: &[
                    "weather",
                    "rain",
                    "sunny",
                    "cloudy",
                    "snow",
                    "windy",
                    "humid",
                    "forecast",
                    "temperature",
                    "storm",
                    "freezing",
                ],
                patterns: vec![],
            },
            IntentRule {
                intent: Intent::Greeting,
                lexicon: &[
                    "hello",
                    "good morning",
                    "good afternoon",
                    "good evening",
                    "hi there",
                    "hiya",
                    "howdy",
                ],
                patterns: vec![Regex::new(r"^(hi|hey|yo)\b")?],
            },
            IntentRule {
                intent: Intent::Farewell,
                lexicon: &[
                    "goodbye",
                    "bye",
                    "good night",
                    "see you",
                    "see ya",
                    "farewell",
                    "talk later",
                ],
                patterns: vec![],
            },
            IntentRule {
                intent: Intent::ActivityRequest,
                lexicon: &[
                    "what should i do",
                    "what can i do",
                    "what can we do",
                    "anything to do",
                    "something to do",
                    "suggest something",
                    "recommend something",
                    "any plans",
                    "i'm bored",
                    "im bored",
                ],
                patterns: vec![],
            },
            IntentRule {
                intent: Intent::Appreciation,
                lexicon: &[
                    "thank",
                    "thanks",
                    "appreciate",
                    "grateful",
                    "well done",
                    "great job",
                    "you're the best",
                ],
                patterns: vec![],
            },
            IntentRule {
                intent: Intent::HelpRequest,
                lexicon: &["help", "can you", "could you", "how do i", "please"],
                patterns: vec![],
            },
            IntentRule {
                intent: Intent::Question,
                lexicon: &["what", "why", "how", "when", "where", "who", "which"],
                patterns: vec![Regex::new(r"\?\s*$")?],
            },
        ];
        Ok(IntentClassifier { rules })
    }

    pub fn classify(&self, message: &str) -> Intent {
        let text = message.to_lowercase();
        let text = text.trim();
        for rule in &self.rules {
            if rule.matches(text) {
                return rule.intent;
            }
        }
        Intent::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new().unwrap()
    }

    #[test]
    fn test_fatigue_beats_weather_inquiry() {
        let intent = classifier().classify("I'm exhausted today, what's the weather like?");
        assert_eq!(intent, Intent::FatigueSupport);
    }

    #[test]
    fn test_fatigue_via_weary_sigh() {
        // "tired" alone is not in the support lexicon; the trailing sigh
        // tips it over.
        let c = classifier();
        assert_eq!(c.classify("tired..."), Intent::FatigueSupport);
        assert_ne!(c.classify("tired"), Intent::FatigueSupport);
    }

    #[test]
    fn test_weather_inquiry() {
        let c = classifier();
        assert_eq!(c.classify("What's the weather today?"), Intent::WeatherInquiry);
        assert_eq!(c.classify("will it rain tomorrow"), Intent::WeatherInquiry);
        assert_eq!(
            c.classify("how is the weather over there?"),
            Intent::WeatherInquiry
        );
    }

    #[test]
    fn test_clothing_inquiry() {
        assert_eq!(
            classifier().classify("What should I wear tomorrow?"),
            Intent::ClothingInquiry
        );
    }

    #[test]
    fn test_weather_talk_catches_loose_mentions() {
        assert_eq!(
            classifier().classify("all this rain lately huh"),
            Intent::WeatherTalk
        );
    }

    #[test]
    fn test_greeting_needs_a_real_greeting() {
        let c = classifier();
        assert_eq!(c.classify("hey"), Intent::Greeting);
        assert_eq!(c.classify("good morning"), Intent::Greeting);
        // "hi" buried inside a word must not trigger
        assert_ne!(c.classify("this is nothing"), Intent::Greeting);
    }

    #[test]
    fn test_farewell() {
        assert_eq!(classifier().classify("ok bye now"), Intent::Farewell);
    }

    #[test]
    fn test_activity_request() {
        assert_eq!(
            classifier().classify("i'm bored, suggest something"),
            Intent::ActivityRequest
        );
    }

    #[test]
    fn test_appreciation() {
        assert_eq!(classifier().classify("thanks a lot"), Intent::Appreciation);
    }

    #[test]
    fn test_bare_question_mark() {
        assert_eq!(classifier().classify("is that so?"), Intent::Question);
    }

    #[test]
    fn test_unmatched_text_defaults_to_general() {
        assert_eq!(classifier().classify("purple elephants"), Intent::General);
    }
}
