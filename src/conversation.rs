use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// How many recent turns the composer is allowed to look at.
pub const PROMPT_WINDOW: usize = 3;
/// How many turns the store retains on disk.
pub const RETAIN_CAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Mascot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Insertion-ordered sliding window of recent turns. The engine only ever
/// reads this; pushing and persistence stay with the owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.turns.push(ConversationTurn {
            id: Uuid::new_v4().to_string(),
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        });
        if self.turns.len() > RETAIN_CAP {
            let excess = self.turns.len() - RETAIN_CAP;
            self.turns.drain(0..excess);
        }
    }

    /// The most recent turns, capped to the prompt window.
    pub fn recent(&self) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(PROMPT_WINDOW);
        &self.turns[start..]
    }

    pub fn last_user_text(&self) -> Option<&str> {
        self.recent()
            .iter()
            .rev()
            .find(|turn| turn.speaker == Speaker::User)
            .map(|turn| turn.text.as_str())
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

/// JSON-file-backed owner of the chat history. The engine never touches
/// this; the CLI records turns here and hands the engine a read-only view.
pub struct HistoryStore {
    path: PathBuf,
    history: ConversationHistory,
}

impl HistoryStore {
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.history_file();
        let history = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .context("Failed to read history file")?;
            serde_json::from_str(&content).context("Failed to parse history file")?
        } else {
            ConversationHistory::default()
        };
        Ok(HistoryStore { path, history })
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn record(&mut self, speaker: Speaker, text: impl Into<String>) -> Result<()> {
        self.history.push(speaker, text);
        self.save()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.history = ConversationHistory::default();
        self.save()
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.history)
            .context("Failed to serialize history")?;
        std::fs::write(&self.path, content).context("Failed to write history file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_cap() {
        let mut history = ConversationHistory::default();
        for i in 0..15 {
            history.push(Speaker::User, format!("message {}", i));
        }
        assert_eq!(history.len(), RETAIN_CAP);
        assert_eq!(history.turns()[0].text, "message 5");
    }

    #[test]
    fn test_recent_window() {
        let mut history = ConversationHistory::default();
        for i in 0..5 {
            history.push(Speaker::User, format!("message {}", i));
        }
        let recent = history.recent();
        assert_eq!(recent.len(), PROMPT_WINDOW);
        assert_eq!(recent[0].text, "message 2");
        assert_eq!(recent[2].text, "message 4");
    }

    #[test]
    fn test_recent_window_on_short_history() {
        let mut history = ConversationHistory::default();
        history.push(Speaker::User, "only one");
        assert_eq!(history.recent().len(), 1);
    }

    #[test]
    fn test_last_user_text_skips_mascot_turns() {
        let mut history = ConversationHistory::default();
        history.push(Speaker::User, "hello there");
        history.push(Speaker::Mascot, "hi!");
        assert_eq!(history.last_user_text(), Some("hello there"));
    }
}
