use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_API_KEY_ENV, DEFAULT_GEMINI_MODEL, HTTP_REQUEST_TIMEOUT_SECS, LISTEN_TIMEOUT_SECS,
    PROVIDER_PACING_DELAY_MS,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generative-response provider configuration
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Speech capture and playback configuration
    #[serde(default)]
    pub speech: SpeechSettings,

    /// Terminal rendering configuration
    #[serde(default)]
    pub ui: UIConfig,
}

/// Which backend the provider gateway talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    OpenaiCompatible,
}

/// Provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Backend kind (gemini, openai_compatible)
    pub kind: ProviderKind,
    /// Model name
    pub model: String,
    /// Override for the backend's base URL
    pub base_url: Option<String>,
    /// Environment variable containing the API key
    pub api_key_env: String,
    /// Inline API key (takes precedence over `api_key_env`)
    pub api_key: Option<String>,
    /// HTTP request timeout
    pub request_timeout_secs: u64,
    /// Fixed delay applied before every dispatch
    pub pacing_delay_ms: u64,
    /// System prompt sent alongside every request
    pub system_prompt: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Gemini,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            request_timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
            pacing_delay_ms: PROVIDER_PACING_DELAY_MS,
            system_prompt: None,
        }
    }
}

impl ProviderSettings {
    /// Resolve the credential: inline key first, then the configured env var
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }
}

/// Speech settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Master switch for both speech channels
    pub enabled: bool,
    /// Submit automatically after a non-empty dictation
    pub auto_submit: bool,
    /// External transcription command (argv); prints the transcript on stdout
    pub listen_command: Option<Vec<String>>,
    /// Upper bound on a single dictation
    pub listen_timeout_secs: u64,
    /// Text-to-speech program; auto-detected when unset
    pub speak_command: Option<String>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_submit: true,
            listen_command: None,
            listen_timeout_secs: LISTEN_TIMEOUT_SECS,
            speak_command: None,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    /// Render answers as styled markdown instead of raw text
    pub render_markdown: bool,
    /// Prefix turns with their wall-clock time
    pub show_timestamps: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            render_markdown: true,
            show_timestamps: false,
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir()?;
    let global_config = config_dir.join("config.toml");
    let local_config = PathBuf::from(".aiconnect/config.toml");

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    // AICONNECT_PROVIDER__MODEL=... style overrides
    figment = figment.merge(Env::prefixed("AICONNECT_").split("__"));

    figment.extract().context("Failed to load configuration")
}

/// Load configuration from an explicit file, layered over the defaults
pub fn load_config_from(path: &Path) -> Result<Config> {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "aiconnect") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("aiconnect");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<()> {
    let config_dir = get_config_dir()?;
    let config_file = config_dir.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
        println!("Created default configuration at: {}", config_file.display());
    }

    let local_example = PathBuf::from(".aiconnect/config.toml.example");
    if !local_example.exists() {
        if let Some(parent) = local_example.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let example_config = r#"# AI Connect Project Configuration
# This file overrides global settings for this directory

[provider]
kind = "gemini"
model = "gemini-2.0-flash"
api_key_env = "GEMINI_API_KEY"
pacing_delay_ms = 1000

[speech]
auto_submit = true
# listen_command = ["whisper-dictate", "--once"]
# speak_command = "espeak-ng"
"#;
        std::fs::write(&local_example, example_config)?;
        println!("Created example configuration at: {}", local_example.display());
    }

    Ok(())
}
