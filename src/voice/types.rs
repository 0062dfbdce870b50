//! Types exchanged between the speech gate and recognition backends

use serde::Serialize;
use std::sync::Arc;

/// A transcript delivered to the gate's caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub text: String,
    pub confidence: f32,
}

/// One candidate reading of a recognized phrase
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: f32,
}

/// All results recognized so far in a session, oldest first. Each result
/// holds its alternatives, best first.
#[derive(Debug, Clone, Default)]
pub struct RecognitionEvent {
    pub results: Vec<Vec<Alternative>>,
}

impl RecognitionEvent {
    /// Best alternative of the most recent result
    pub fn latest(&self) -> Option<Transcript> {
        let best = self.results.last()?.first()?;
        Some(Transcript {
            text: best.transcript.clone(),
            confidence: best.confidence,
        })
    }
}

/// Error reported by a backend while a session is running
#[derive(Debug, Clone)]
pub struct RecognitionErrorEvent {
    /// Short machine-readable code, e.g. `not-allowed` or `network`
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    /// Keep listening after the first phrase
    pub continuous: bool,
    /// Deliver partial results while the user is still speaking
    pub interim_results: bool,
}

pub type ResultHandler = Arc<dyn Fn(RecognitionEvent) + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(RecognitionErrorEvent) + Send + Sync>;

/// A platform speech recognizer. Results and errors arrive later through
/// the installed handlers, possibly from another thread.
pub trait RecognitionSession: Send {
    fn configure(&mut self, options: SessionOptions);
    fn on_result(&mut self, handler: ResultHandler);
    fn on_error(&mut self, handler: ErrorHandler);
    fn start(&mut self) -> anyhow::Result<()>;
    fn stop(&mut self) -> anyhow::Result<()>;
}

/// Source of recognition sessions; `None` when the capability is absent
pub trait RecognitionProvider {
    fn create_session(&self) -> Option<Box<dyn RecognitionSession>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(transcript: &str, confidence: f32) -> Alternative {
        Alternative {
            transcript: transcript.into(),
            confidence,
        }
    }

    #[test]
    fn test_latest_uses_last_result_first_alternative() {
        let event = RecognitionEvent {
            results: vec![
                vec![alt("milk", 0.4)],
                vec![alt("milk three ninety nine", 0.8), alt("silk", 0.1)],
            ],
        };
        assert_eq!(
            event.latest(),
            Some(Transcript {
                text: "milk three ninety nine".into(),
                confidence: 0.8
            })
        );
    }

    #[test]
    fn test_latest_on_empty_event() {
        assert_eq!(RecognitionEvent::default().latest(), None);
        let event = RecognitionEvent {
            results: vec![vec![]],
        };
        assert_eq!(event.latest(), None);
    }
}
