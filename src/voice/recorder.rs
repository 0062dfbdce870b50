//! Microphone capture with cpal, transcribed by Whisper once stopped

use anyhow::Result;
use cpal::{FromSample, SizedSample};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread::JoinHandle;
use std::time::Duration;

use super::types::{
    Alternative, ErrorHandler, RecognitionErrorEvent, RecognitionEvent, RecognitionProvider,
    RecognitionSession, ResultHandler, SessionOptions,
};
use super::whisper::transcribe;
use crate::config::VoiceConfig;

/// Hands out Whisper sessions when an API key is configured
pub struct WhisperProvider {
    config: VoiceConfig,
}

impl WhisperProvider {
    pub fn new(config: VoiceConfig) -> Self {
        Self { config }
    }
}

impl RecognitionProvider for WhisperProvider {
    fn create_session(&self) -> Option<Box<dyn RecognitionSession>> {
        let Some(api_key) = self.config.resolved_api_key() else {
            tracing::info!("No transcription API key configured, dictation disabled");
            return None;
        };
        Some(Box::new(WhisperSession::new(self.config.clone(), api_key)))
    }
}

/// Records from the default input device until stopped, then sends the
/// audio for transcription and reports a single result.
pub struct WhisperSession {
    config: VoiceConfig,
    api_key: String,
    options: SessionOptions,
    on_result: Option<ResultHandler>,
    on_error: Option<ErrorHandler>,
    recording: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl WhisperSession {
    pub fn new(config: VoiceConfig, api_key: String) -> Self {
        Self {
            config,
            api_key,
            options: SessionOptions::default(),
            on_result: None,
            on_error: None,
            recording: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl RecognitionSession for WhisperSession {
    fn configure(&mut self, options: SessionOptions) {
        // Whisper only returns final transcripts
        if options.interim_results {
            tracing::debug!("Interim results are not available from Whisper");
        }
        self.options = options;
    }

    fn on_result(&mut self, handler: ResultHandler) {
        self.on_result = Some(handler);
    }

    fn on_error(&mut self, handler: ErrorHandler) {
        self.on_error = Some(handler);
    }

    fn start(&mut self) -> Result<()> {
        if self.recording.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Recognition has already started"));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| anyhow::anyhow!("Transcription needs a running tokio runtime"))?;

        if let Some(worker) = self.worker.take() {
            if !worker.is_finished() {
                tracing::debug!("Previous capture still finishing, leaving it detached");
            } else if worker.join().is_err() {
                tracing::error!("Previous capture thread panicked");
            }
        }

        // Each run gets its own flag so an earlier worker cannot touch this one
        self.recording = Arc::new(AtomicBool::new(true));

        let recording = self.recording.clone();
        let config = self.config.clone();
        let api_key = self.api_key.clone();
        let on_result = self.on_result.clone();
        let on_error = self.on_error.clone();
        let report = move |error: &str, message: String| {
            tracing::error!("Dictation {}: {}", error, message);
            if let Some(on_error) = &on_error {
                on_error(RecognitionErrorEvent {
                    error: error.to_string(),
                    message,
                });
            }
        };

        // cpal streams are not Send, so capture lives on its own thread
        let worker = std::thread::spawn(move || {
            let (samples, sample_rate) = match capture(&recording) {
                Ok(captured) => captured,
                Err(e) => {
                    recording.store(false, Ordering::SeqCst);
                    report("audio-capture", e.to_string());
                    return;
                }
            };

            if samples.is_empty() {
                report("no-speech", "No audio recorded".to_string());
                return;
            }

            runtime.spawn(async move {
                match transcribe(&samples, sample_rate, &config, &api_key).await {
                    Ok(transcript) if transcript.text.is_empty() => {
                        report("no-speech", "Nothing was recognized".to_string());
                    }
                    Ok(transcript) => {
                        if let Some(on_result) = &on_result {
                            on_result(RecognitionEvent {
                                results: vec![vec![Alternative {
                                    transcript: transcript.text,
                                    confidence: transcript.confidence,
                                }]],
                            });
                        }
                    }
                    Err(e) => report("network", format!("{:#}", e)),
                }
            });
        });

        self.worker = Some(worker);
        tracing::debug!(
            "Recording started (continuous: {}, interim: {})",
            self.options.continuous,
            self.options.interim_results
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.recording.swap(false, Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Recognition is not running"));
        }
        tracing::debug!("Recording stopped, transcribing");
        Ok(())
    }
}

impl Drop for WhisperSession {
    fn drop(&mut self) {
        self.recording.store(false, Ordering::SeqCst);
    }
}

/// Record mono samples until `recording` is cleared
fn capture(recording: &Arc<AtomicBool>) -> Result<(Vec<f32>, u32)> {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("No input device available"))?;

    let config = device.default_input_config()?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    tracing::debug!("Recording at {} Hz, {} channels", sample_rate, channels);

    let samples = Arc::new(Mutex::new(Vec::new()));
    let stream_config = config.config();

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            input_stream::<f32>(&device, &stream_config, channels, &samples, recording)?
        }
        cpal::SampleFormat::I16 => {
            input_stream::<i16>(&device, &stream_config, channels, &samples, recording)?
        }
        cpal::SampleFormat::U16 => {
            input_stream::<u16>(&device, &stream_config, channels, &samples, recording)?
        }
        other => return Err(anyhow::anyhow!("Unsupported sample format {:?}", other)),
    };

    stream.play()?;

    while recording.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(10));
    }

    drop(stream);

    let samples = samples
        .lock()
        .map(|mut samples| std::mem::take(&mut *samples))
        .map_err(|_| anyhow::anyhow!("Sample buffer poisoned"))?;

    Ok((samples, sample_rate))
}

fn input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    samples: &Arc<Mutex<Vec<f32>>>,
    recording: &Arc<AtomicBool>,
) -> Result<cpal::Stream>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    use cpal::traits::DeviceTrait;

    let samples = samples.clone();
    let recording = recording.clone();

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            if !recording.load(Ordering::SeqCst) {
                return;
            }
            let Ok(mut samples) = samples.lock() else {
                return;
            };
            samples.extend(downmix(data, channels));
        },
        |err| {
            tracing::error!("Audio input error: {}", err);
        },
        None,
    )?;

    Ok(stream)
}

/// Average interleaved frames into mono f32
fn downmix<T>(data: &[T], channels: usize) -> impl Iterator<Item = f32> + '_
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    data.chunks(channels).map(move |frame| {
        frame.iter().map(|&s| f32::from_sample_(s)).sum::<f32>() / channels as f32
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo_f32() {
        let mono: Vec<f32> = downmix(&[0.5f32, -0.5, 1.0, 0.0], 2).collect();
        assert_eq!(mono, [0.0, 0.5]);
    }

    #[test]
    fn test_downmix_converts_integer_samples() {
        let mono: Vec<f32> = downmix(&[i16::MIN, 0], 1).collect();
        assert_eq!(mono, [-1.0, 0.0]);

        let mono: Vec<f32> = downmix(&[32768u16], 1).collect();
        assert_eq!(mono, [0.0]);
    }

    #[test]
    fn test_provider_without_key_has_no_session() {
        let provider = WhisperProvider::new(VoiceConfig {
            api_key: Some("${PANTRY_INTAKE_MISSING_KEY_VAR}".into()),
            ..VoiceConfig::default()
        });
        assert!(provider.create_session().is_none());
    }

    #[test]
    fn test_provider_with_key_creates_session() {
        let provider = WhisperProvider::new(VoiceConfig {
            api_key: Some("sk-test".into()),
            ..VoiceConfig::default()
        });
        assert!(provider.create_session().is_some());
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let mut session = WhisperSession::new(VoiceConfig::default(), "sk-test".into());
        assert!(session.start().is_err());
        assert!(session.stop().is_err());
    }

    #[tokio::test]
    async fn test_restart_does_not_wait_for_previous_capture() {
        let mut session = WhisperSession::new(VoiceConfig::default(), "sk-test".into());
        let release = Arc::new(AtomicBool::new(false));
        let held = release.clone();
        session.worker = Some(std::thread::spawn(move || {
            while !held.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(5));
            }
        }));
        let previous = session.recording.clone();

        session.start().unwrap();

        assert!(!Arc::ptr_eq(&previous, &session.recording));
        assert!(!previous.load(Ordering::SeqCst));

        // Capture may already have failed on machines without a microphone
        let _ = session.stop();
        assert!(!session.recording.load(Ordering::SeqCst));
        release.store(true, Ordering::SeqCst);
    }
}
