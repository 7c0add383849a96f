use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ParlanceError, Result};

/// Top-level configuration for the Parlance application.
///
/// Loaded from `~/.parlance/config.toml` by default. Each section corresponds
/// to one subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParlanceConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl ParlanceConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParlanceConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ParlanceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for store files and the check-in database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.parlance/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Hosted speech/LLM service identifiers.
///
/// These are pass-through configuration values for the injected service
/// implementations; Parlance never inspects the services themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Speech-to-text model name.
    pub stt_model: String,
    /// Language model name.
    pub llm_model: String,
    /// Text-to-speech voice identifier.
    pub tts_voice: String,
    /// Text-to-speech delivery style.
    pub tts_style: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt_model: "nova-3".to_string(),
            llm_model: "gemini-2.5-flash".to_string(),
            tts_voice: "en-US-matthew".to_string(),
            tts_style: "Conversational".to_string(),
        }
    }
}

/// Store file locations, relative to the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Orders store file (JSON array).
    pub orders_file: String,
    /// Leads store file (JSON array).
    pub leads_file: String,
    /// Check-in SQLite database file.
    pub checkins_db: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            orders_file: "orders.json".to_string(),
            leads_file: "leads.json".to_string(),
            checkins_db: "checkins.db".to_string(),
        }
    }
}

/// Conversation behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Spoken greeting on session start.
    pub greeting: String,
    /// Default number of orders returned by the history tool.
    pub history_limit: usize,
    /// Maximum characters per synthesized speech chunk.
    pub reply_chunk_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello! I'm your shopping assistant. I can help you browse \
                       products, check prices, and place orders. What would you \
                       like to do today?"
                .to_string(),
            history_limit: 5,
            reply_chunk_chars: 700,
        }
    }
}
