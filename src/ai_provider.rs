use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    OpenAi,
    Ollama,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::OpenAi => write!(f, "openai"),
            BackendKind::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Ok(BackendKind::OpenAi),
            "ollama" => Ok(BackendKind::Ollama),
            _ => Err(anyhow!("Unknown provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        PromptMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        PromptMessage {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Thin chat-completion client over the configured backend. Callers treat
/// every failure the same way: keep the rule-based reply.
pub struct BackendClient {
    config: BackendConfig,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(BackendClient { config, http })
    }

    pub async fn complete(
        &self,
        system_prompt: &str,
        messages: &[PromptMessage],
    ) -> Result<String> {
        match self.config.kind {
            BackendKind::OpenAi => self.complete_openai(system_prompt, messages).await,
            BackendKind::Ollama => self.complete_ollama(system_prompt, messages).await,
        }
    }

    fn payload_messages(
        &self,
        system_prompt: &str,
        messages: &[PromptMessage],
    ) -> Vec<serde_json::Value> {
        let mut payload = vec![serde_json::json!({
            "role": "system",
            "content": system_prompt,
        })];
        for message in messages {
            payload.push(serde_json::json!({
                "role": message.role,
                "content": message.content,
            }));
        }
        payload
    }

    async fn complete_openai(
        &self,
        system_prompt: &str,
        messages: &[PromptMessage],
    ) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("OpenAI API key required"))?;

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": self.payload_messages(system_prompt, messages),
        });

        let response = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("OpenAI API error: {}", error_text));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid OpenAI response format"))?
            .to_string();

        Ok(content)
    }

    async fn complete_ollama(
        &self,
        system_prompt: &str,
        messages: &[PromptMessage],
    ) -> Result<String> {
        let default_url = "http://localhost:11434".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_url);

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": self.payload_messages(system_prompt, messages),
            "stream": false,
        });

        let response = self
            .http
            .post(format!("{}/api/chat", base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("Ollama API error: {}", error_text));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid Ollama response format"))?
            .to_string();

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert_eq!("gpt".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert_eq!("ollama".parse::<BackendKind>().unwrap(), BackendKind::Ollama);
        assert!("other".parse::<BackendKind>().is_err());
    }
}
