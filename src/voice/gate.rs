//! Capability gate around a platform speech recognizer
//!
//! The gate decides whether dictation is usable on the current platform and
//! runs at most one recognition session at a time. Failures never escape as
//! errors: they are logged and reported through the caller's error callback.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use super::types::{
    RecognitionErrorEvent, RecognitionEvent, RecognitionProvider, RecognitionSession,
    SessionOptions, Transcript,
};
use crate::{config::Platform, error::SpeechError};

/// Message handed to `on_error` when a session could not be started
pub const START_FAILED_MESSAGE: &str = "Failed to start speech recognition";

pub struct SpeechGate {
    platform: Platform,
    session: Option<Box<dyn RecognitionSession>>,
    listening: Arc<AtomicBool>,
    /// Bumped on every start; errors from earlier runs leave `listening` alone
    run: Arc<AtomicU64>,
}

impl SpeechGate {
    /// Only web platforms ask the provider for a session.
    pub fn new(platform: Platform, provider: &dyn RecognitionProvider) -> Self {
        let session = if platform.is_web() {
            provider.create_session()
        } else {
            None
        };

        tracing::debug!(
            "Speech gate on {:?}, recognizer {}",
            platform,
            if session.is_some() { "available" } else { "absent" }
        );

        Self {
            platform,
            session,
            listening: Arc::new(AtomicBool::new(false)),
            run: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.platform.is_web() && self.session.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Start a dictation session. Does nothing if one is already running.
    pub async fn start<R, E>(&mut self, on_result: R, on_error: E)
    where
        R: Fn(Transcript) + Send + Sync + 'static,
        E: Fn(String) + Send + Sync + 'static,
    {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let on_error = Arc::new(on_error);
        match self.begin(on_result, on_error.clone()) {
            Ok(()) => tracing::info!("Speech recognition started"),
            Err(err @ SpeechError::PlatformUnsupported(platform)) => {
                self.listening.store(false, Ordering::SeqCst);
                tracing::warn!("Dictation requested on {:?}", platform);
                on_error(err.to_string());
            }
            Err(err) => {
                self.listening.store(false, Ordering::SeqCst);
                tracing::error!("Speech recognition error: {}", err);
                on_error(START_FAILED_MESSAGE.to_string());
            }
        }
    }

    fn begin<R, E>(&mut self, on_result: R, on_error: Arc<E>) -> Result<(), SpeechError>
    where
        R: Fn(Transcript) + Send + Sync + 'static,
        E: Fn(String) + Send + Sync + 'static,
    {
        if !self.platform.is_web() {
            return Err(SpeechError::PlatformUnsupported(self.platform));
        }
        let session = self
            .session
            .as_mut()
            .ok_or(SpeechError::CapabilityUnavailable)?;

        session.configure(SessionOptions {
            continuous: true,
            interim_results: true,
        });

        session.on_result(Arc::new(move |event: RecognitionEvent| {
            if let Some(transcript) = event.latest() {
                on_result(transcript);
            }
        }));

        let this_run = self.run.fetch_add(1, Ordering::SeqCst) + 1;
        let run = self.run.clone();
        let listening = self.listening.clone();
        session.on_error(Arc::new(move |event: RecognitionErrorEvent| {
            tracing::debug!("Recognizer error {}: {}", event.error, event.message);
            if run.load(Ordering::SeqCst) == this_run {
                listening.store(false, Ordering::SeqCst);
            } else {
                tracing::debug!("Error belongs to an earlier run, gate state kept");
            }
            on_error(event.error);
        }));

        session.start().map_err(SpeechError::SessionStart)
    }

    /// Stop the running session. Errors from the recognizer are logged only.
    pub async fn stop(&mut self) {
        if !self.is_listening() {
            return;
        }

        if self.platform.is_web() {
            if let Some(session) = self.session.as_mut() {
                if let Err(e) = session.stop() {
                    tracing::error!("Error stopping speech recognition: {:#}", e);
                }
            }
        }

        self.listening.store(false, Ordering::SeqCst);
    }
}
