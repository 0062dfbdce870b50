//! Configuration loaded from `config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::IntakeError;

const DEFAULT_TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Host the app is running on. Only `Web` exposes a dictation capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Web,
    Ios,
    Android,
}

impl Platform {
    pub fn is_web(self) -> bool {
        matches!(self, Platform::Web)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Tesseract executable
    #[serde(default = "default_ocr_command")]
    pub command: String,
    /// Tesseract language pack
    #[serde(default = "default_ocr_language")]
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: default_ocr_command(),
            language: default_ocr_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API key (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_voice_model")]
    pub model: String,
    #[serde(default = "default_voice_language")]
    pub language: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: default_voice_model(),
            language: default_voice_language(),
        }
    }
}

impl VoiceConfig {
    /// Key from the config file, falling back to `OPENAI_API_KEY`
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(expand_env_vars)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

fn default_ocr_command() -> String {
    "tesseract".into()
}

fn default_ocr_language() -> String {
    "eng".into()
}

fn default_api_url() -> String {
    DEFAULT_TRANSCRIPTION_URL.into()
}

fn default_voice_model() -> String {
    "whisper-1".into()
}

fn default_voice_language() -> String {
    "en".into()
}

impl Config {
    /// Load from `path`, or from the user config dir when no path is given.
    /// A missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, IntakeError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        tracing::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, IntakeError> {
        Ok(toml::from_str(content)?)
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pantry-intake").join("config.toml"))
}

/// Replace every `${VAR}` with the variable's value (empty when unset)
fn expand_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &rest[start + 2..start + len];
        match std::env::var(name) {
            Ok(value) => out.push_str(&value),
            Err(_) => tracing::warn!("Environment variable {} is not set", name),
        }
        rest = &rest[start + len + 1..];
    }

    out.push_str(rest);
    out
}
