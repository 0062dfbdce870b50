//! Receipt OCR through an external Tesseract process

use anyhow::Result;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{parse_receipt, Receipt};
use crate::{config::OcrConfig, error::IntakeError};

/// Something that can read the text off an image
pub trait TextRecognizer {
    fn recognize(&self, image: &Path) -> impl Future<Output = Result<String>> + Send;
}

/// Runs `tesseract <image> stdout -l <language>`
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            command: config.command.clone(),
            language: config.language.clone(),
        }
    }
}

impl TextRecognizer for TesseractOcr {
    async fn recognize(&self, image: &Path) -> Result<String> {
        tracing::info!("Running OCR on {}", image.display());

        let output = Command::new(&self.command)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| anyhow::anyhow!("Could not run {}: {}", self.command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::anyhow!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// OCR an image and parse the extracted text
pub async fn process_receipt<R: TextRecognizer>(
    recognizer: &R,
    image: &Path,
) -> Result<Receipt, IntakeError> {
    let text = recognizer.recognize(image).await.map_err(|e| {
        tracing::error!("Error processing receipt: {:#}", e);
        IntakeError::Processing
    })?;

    tracing::debug!("OCR returned {} bytes", text.len());
    Ok(parse_receipt(&text))
}
