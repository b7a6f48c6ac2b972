use anyhow::Result;
use serde::Serialize;
use tokio::time::timeout;

use crate::ai_provider::{BackendClient, PromptMessage};
use crate::composer::{ComposerInput, ResponseComposer, WeatherAdvice};
use crate::config::Config;
use crate::conversation::{ConversationHistory, Speaker};
use crate::intent::{Intent, IntentClassifier};
use crate::mascot::{MascotEngine, MascotState};
use crate::preferences::UserPreferences;
use crate::sentiment::{SentimentAnalyzer, SentimentLabel};
use crate::weather::{normalize, RawObservation};

/// One engine invocation's worth of input. The message must be non-empty
/// after trimming; callers validate that before reaching the engine.
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub observation: Option<&'a RawObservation>,
    pub preferences: Option<&'a UserPreferences>,
    pub history: Option<&'a ConversationHistory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanionReply {
    pub intent: Intent,
    pub sentiment: SentimentLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mascot_state: Option<MascotState>,
    pub response_text: String,
    pub tone: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_advice: Option<WeatherAdvice>,
}

/// The companion: wires the normalizer, classifiers, mascot engine and
/// composer into one pipeline. Holds no state between calls beyond its
/// random generators.
pub struct Companion {
    config: Config,
    intents: IntentClassifier,
    sentiment: SentimentAnalyzer,
    mascot: MascotEngine,
    composer: ResponseComposer,
}

impl Companion {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Companion {
            config: config.clone(),
            intents: IntentClassifier::new()?,
            sentiment: SentimentAnalyzer::new()?,
            mascot: MascotEngine::new(),
            composer: ResponseComposer::new(),
        })
    }

    /// Seeded variant: identical inputs produce identical replies.
    pub fn with_seed(config: &Config, seed: u64) -> Result<Self> {
        Ok(Companion {
            config: config.clone(),
            intents: IntentClassifier::new()?,
            sentiment: SentimentAnalyzer::new()?,
            mascot: MascotEngine::with_seed(seed),
            composer: ResponseComposer::with_seed(seed),
        })
    }

    /// The deterministic rule-based path. Never fails: missing weather,
    /// preferences or history all degrade to defined defaults.
    pub fn respond(&mut self, request: &ChatRequest) -> CompanionReply {
        let weather = request.observation.map(normalize);
        let intent = self.intents.classify(request.message);
        let sentiment = self.sentiment.analyze(request.message);
        let mascot_state = weather.as_ref().map(|w| self.mascot.state(w));

        let composed = self.composer.compose(&ComposerInput {
            intent,
            sentiment,
            mascot: mascot_state.as_ref(),
            weather: weather.as_ref(),
            preferences: request.preferences,
            history: request.history,
        });

        CompanionReply {
            intent,
            sentiment,
            mascot_state,
            response_text: composed.text,
            tone: composed.tone,
            suggestions: composed.suggestions,
            weather_advice: composed.weather_advice,
        }
    }

    /// Rule-based reply, then a bounded attempt to let the generative
    /// backend rephrase it. Timeout, backend errors and missing credentials
    /// all fall back to the rule-based text with the same output shape.
    pub async fn respond_enhanced(
        &mut self,
        request: &ChatRequest<'_>,
        provider: Option<String>,
        model: Option<String>,
    ) -> CompanionReply {
        let mut reply = self.respond(request);

        let backend = match self.config.backend_config(provider, model) {
            Ok(backend) => backend,
            Err(_) => return reply,
        };
        let limit = backend.timeout;
        let client = match BackendClient::new(backend) {
            Ok(client) => client,
            Err(_) => return reply,
        };

        let system_prompt = self.system_prompt(&reply);
        let mut messages = Vec::new();
        if let Some(history) = request.history {
            for turn in history.recent() {
                messages.push(match turn.speaker {
                    Speaker::User => PromptMessage::user(&turn.text),
                    Speaker::Mascot => PromptMessage::assistant(&turn.text),
                });
            }
        }
        messages.push(PromptMessage::user(request.message));

        match timeout(limit, client.complete(&system_prompt, &messages)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                reply.response_text = text.trim().to_string();
            }
            _ => {} // keep the rule-based text
        }

        reply
    }

    fn system_prompt(&self, reply: &CompanionReply) -> String {
        let mut prompt = format!(
            "You are {}, a small weather-companion mascot. ",
            self.config.mascot_name
        );

        if let Some(state) = &reply.mascot_state {
            prompt.push_str(&format!(
                "Your current mood is {} (energy {}, happiness {}, comfort {}). ",
                state.mood, state.energy, state.happiness, state.comfort
            ));
        }
        prompt.push_str(&format!(
            "The user's message reads as {} with {} sentiment. ",
            reply.intent, reply.sentiment
        ));
        prompt.push_str(&format!(
            "Here is your draft reply: \"{}\". Rephrase it naturally without changing its meaning, mood or advice. ",
            reply.response_text
        ));
        prompt.push_str("Keep responses short, warm and conversational.");

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{MISSING_HUMIDITY, MISSING_METRIC, MISSING_PRESSURE};
    use std::collections::HashMap;

    fn test_config() -> Config {
        Config {
            data_dir: std::env::temp_dir(),
            mascot_name: "Sora".to_string(),
            default_provider: "ollama".to_string(),
            providers: HashMap::new(),
            enhance_timeout_secs: 10,
        }
    }

    fn sunny_observation() -> RawObservation {
        RawObservation {
            code: Some(110),
            label: None,
            temperature: 21.0,
            humidity: MISSING_HUMIDITY,
            precipitation: MISSING_METRIC,
            wind_speed: MISSING_METRIC,
            pressure: MISSING_PRESSURE,
        }
    }

    #[test]
    fn test_full_pipeline_with_weather() {
        let config = test_config();
        let mut companion = Companion::with_seed(&config, 5).unwrap();
        let observation = sunny_observation();

        let reply = companion.respond(&ChatRequest {
            message: "What's the weather like?",
            observation: Some(&observation),
            preferences: None,
            history: None,
        });

        assert_eq!(reply.intent, Intent::WeatherInquiry);
        let state = reply.mascot_state.expect("weather given, state expected");
        assert_eq!(state.energy, 75);
        assert!(!reply.response_text.is_empty());
        assert!(reply.weather_advice.is_some());
    }

    #[test]
    fn test_pipeline_without_weather_still_replies() {
        let config = test_config();
        let mut companion = Companion::with_seed(&config, 5).unwrap();

        let reply = companion.respond(&ChatRequest {
            message: "What should I wear today?",
            observation: None,
            preferences: None,
            history: None,
        });

        assert_eq!(reply.intent, Intent::ClothingInquiry);
        assert!(reply.mascot_state.is_none());
        assert!(!reply.response_text.is_empty());
        assert!(!reply.suggestions.is_empty());
    }

    #[test]
    fn test_fatigue_wins_over_weather_in_pipeline() {
        let config = test_config();
        let mut companion = Companion::with_seed(&config, 5).unwrap();

        let reply = companion.respond(&ChatRequest {
            message: "I'm exhausted today, what's the weather like?",
            observation: None,
            preferences: None,
            history: None,
        });

        assert_eq!(reply.intent, Intent::FatigueSupport);
        assert_eq!(reply.sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn test_seeded_companions_agree() {
        let config = test_config();
        let observation = sunny_observation();
        let request = ChatRequest {
            message: "hello!",
            observation: Some(&observation),
            preferences: None,
            history: None,
        };

        let a = Companion::with_seed(&config, 11).unwrap().respond(&request);
        let b = Companion::with_seed(&config, 11).unwrap().respond(&request);

        assert_eq!(a.response_text, b.response_text);
        assert_eq!(a.intent, b.intent);
        assert_eq!(a.sentiment, b.sentiment);
        let (sa, sb) = (a.mascot_state.unwrap(), b.mascot_state.unwrap());
        assert_eq!(sa.reaction, sb.reaction);
        assert_eq!(sa.energy, sb.energy);
    }

    #[tokio::test]
    async fn test_enhancement_falls_back_without_provider() {
        let config = test_config(); // no providers configured
        let mut companion = Companion::with_seed(&config, 5).unwrap();
        let observation = sunny_observation();

        let rule_based = companion.respond(&ChatRequest {
            message: "What's the weather like?",
            observation: Some(&observation),
            preferences: None,
            history: None,
        });

        let mut companion = Companion::with_seed(&config, 5).unwrap();
        let enhanced = companion
            .respond_enhanced(
                &ChatRequest {
                    message: "What's the weather like?",
                    observation: Some(&observation),
                    preferences: None,
                    history: None,
                },
                None,
                None,
            )
            .await;

        assert_eq!(enhanced.response_text, rule_based.response_text);
        assert_eq!(enhanced.intent, rule_based.intent);
    }
}
