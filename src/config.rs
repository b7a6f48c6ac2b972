use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ai_provider::{BackendConfig, BackendKind};
use crate::preferences::UserPreferences;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub mascot_name: String,
    pub default_provider: String,
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default = "default_enhance_timeout")]
    pub enhance_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub default_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_enhance_timeout() -> u64 {
    10
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("skymood")
        });

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let config_path = data_dir.join("config.json");
        if config_path.exists() {
            let config_str =
                std::fs::read_to_string(&config_path).context("Failed to read config.json")?;
            if !config_str.trim().is_empty() {
                match serde_json::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        config.data_dir = data_dir;
                        // Pick up the API key from the environment when the
                        // file leaves it blank
                        if let Some(openai) = config.providers.get_mut("openai") {
                            if openai.api_key.as_ref().map_or(true, |key| key.is_empty()) {
                                openai.api_key = std::env::var("OPENAI_API_KEY").ok();
                            }
                        }
                        return Ok(config);
                    }
                    Err(e) => {
                        eprintln!("Failed to parse existing config.json: {}", e);
                        eprintln!("Recreating default configuration...");
                    }
                }
            }
        }

        let config = Self::default_config(data_dir);
        let json_str =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config")?;
        std::fs::write(&config_path, json_str).context("Failed to write default config.json")?;

        Ok(config)
    }

    fn default_config(data_dir: PathBuf) -> Self {
        let mut providers = HashMap::new();

        providers.insert(
            "ollama".to_string(),
            ProviderConfig {
                default_model: "qwen2.5".to_string(),
                host: Some("http://localhost:11434".to_string()),
                api_key: None,
            },
        );

        providers.insert(
            "openai".to_string(),
            ProviderConfig {
                default_model: "gpt-4o-mini".to_string(),
                host: None,
                api_key: std::env::var("OPENAI_API_KEY").ok(),
            },
        );

        Config {
            data_dir,
            mascot_name: "Sora".to_string(),
            default_provider: "ollama".to_string(),
            providers,
            enhance_timeout_secs: default_enhance_timeout(),
        }
    }

    pub fn get_provider(&self, provider_name: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider_name)
    }

    pub fn backend_config(
        &self,
        provider: Option<String>,
        model: Option<String>,
    ) -> Result<BackendConfig> {
        let provider_name = provider.as_deref().unwrap_or(&self.default_provider);
        let provider_config = self
            .get_provider(provider_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown provider: {}", provider_name))?;

        let kind: BackendKind = provider_name.parse()?;
        let model = model.unwrap_or_else(|| provider_config.default_model.clone());

        Ok(BackendConfig {
            kind,
            model,
            api_key: provider_config.api_key.clone(),
            base_url: provider_config.host.clone(),
            timeout: Duration::from_secs(self.enhance_timeout_secs),
        })
    }

    /// Stored preferences, if the user wrote any. Absence is not an error.
    pub fn load_preferences(&self) -> Result<Option<UserPreferences>> {
        let path = self.preferences_file();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).context("Failed to read preferences file")?;
        let preferences =
            serde_json::from_str(&content).context("Failed to parse preferences file")?;
        Ok(Some(preferences))
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("history.json")
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }
}
