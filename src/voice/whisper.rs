//! Hosted Whisper transcription

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::types::Transcript;
use crate::config::VoiceConfig;

/// Whisper expects 16 kHz mono
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    avg_logprob: f64,
}

/// Transcribe mono samples recorded at `sample_rate`
pub async fn transcribe(
    samples: &[f32],
    sample_rate: u32,
    config: &VoiceConfig,
    api_key: &str,
) -> Result<Transcript> {
    let samples = resample(samples, sample_rate, WHISPER_SAMPLE_RATE);
    let wav_data = encode_wav(&samples, WHISPER_SAMPLE_RATE)?;

    let part = Part::bytes(wav_data)
        .file_name("audio.wav")
        .mime_str("audio/wav")?;

    let form = Form::new()
        .part("file", part)
        .text("model", config.model.clone())
        .text("language", config.language.clone())
        .text("response_format", "verbose_json");

    let client = reqwest::Client::new();
    let response = client
        .post(&config.api_url)
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await?;

    if !response.status().is_success() {
        let error = response.text().await?;
        return Err(anyhow::anyhow!("Whisper API error: {}", error));
    }

    let result: TranscriptionResponse = response.json().await?;
    let confidence = confidence(&result.segments);
    tracing::debug!("Whisper transcript ({:.2}): {}", confidence, result.text);

    Ok(Transcript {
        text: result.text.trim().to_string(),
        confidence,
    })
}

/// Geometric mean token probability across segments
fn confidence(segments: &[Segment]) -> f32 {
    if segments.is_empty() {
        return 1.0;
    }
    let mean = segments.iter().map(|s| s.avg_logprob).sum::<f64>() / segments.len() as f64;
    mean.exp().clamp(0.0, 1.0) as f32
}

/// Linear interpolation between neighbouring samples
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let step = from_rate as f64 / to_rate as f64;
    let len = (samples.len() as f64 / step) as usize;

    (0..len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            match (samples.get(idx), samples.get(idx + 1)) {
                (Some(a), Some(b)) => a * (1.0 - frac) + b * frac,
                (Some(a), None) => *a,
                _ => 0.0,
            }
        })
        .collect()
}

/// 16-bit PCM WAV
fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    use std::io::Cursor;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_from_segments() {
        assert_eq!(confidence(&[]), 1.0);

        let certain = [Segment { avg_logprob: 0.0 }];
        assert_eq!(confidence(&certain), 1.0);

        let mixed = [Segment { avg_logprob: -0.5 }, Segment { avg_logprob: -1.5 }];
        assert!((confidence(&mixed) - (-1.0f64).exp() as f32).abs() < 1e-6);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<f32> = (0..32).map(|i| i as f32).collect();
        let out = resample(&samples, 32000, 16000);
        assert_eq!(out.len(), 16);
        assert_eq!(out[1], 2.0);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_encode_wav_header() {
        let wav = encode_wav(&[0.0, 0.5, -0.5, 2.0], 16000).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 44 byte header + 4 samples * 2 bytes
        assert_eq!(wav.len(), 44 + 8);
    }

    #[test]
    fn test_parse_verbose_response() {
        let json = r#"{"text":" milk three dollars ","segments":[{"id":0,"avg_logprob":-0.2}]}"#;
        let response: TranscriptionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.segments.len(), 1);
        assert_eq!(response.text, " milk three dollars ");
    }
}
