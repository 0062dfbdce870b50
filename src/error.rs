//! Error types shared across the intake pipeline

use thiserror::Error;

use crate::config::Platform;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to process receipt")]
    Processing,
}

/// Reasons a dictation session could not be started
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech recognition is not available on mobile. Please use the image upload feature instead.")]
    PlatformUnsupported(Platform),

    #[error("Speech recognition is not supported in this browser")]
    CapabilityUnavailable,

    #[error("Failed to start speech recognition: {0:#}")]
    SessionStart(anyhow::Error),
}
