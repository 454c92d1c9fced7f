use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::app::ports::OcrPort;
use crate::config::OcrConfig;
use crate::constants::SERVICE_OCR;
use crate::error::ExternalServiceError;

/// Runs the `tesseract` CLI, feeding the image on stdin and reading text from stdout.
pub struct TesseractOcr {
    config: OcrConfig,
    timeout: Duration,
}

impl TesseractOcr {
    pub fn new(config: OcrConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["stdin".to_string(), "stdout".to_string()];
        if let Some(lang) = &self.config.language {
            args.push("-l".to_string());
            args.push(lang.clone());
        }
        args
    }

    async fn run(&self, image: &[u8]) -> Result<String, ExternalServiceError> {
        let mut child = Command::new(&self.config.command)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExternalServiceError::Ocr(format!("could not start '{}': {e}", self.config.command))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(image)
                .await
                .map_err(|e| ExternalServiceError::Ocr(format!("could not send image: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExternalServiceError::Ocr(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExternalServiceError::Ocr(format!(
                "{} exited with {}: {}",
                self.config.command,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl OcrPort for TesseractOcr {
    #[instrument(skip_all, fields(bytes = image.len()))]
    async fn recognize(&self, image: &[u8]) -> Result<String, ExternalServiceError> {
        let text = tokio::time::timeout(self.timeout, self.run(image))
            .await
            .map_err(|_| ExternalServiceError::Timeout { service: SERVICE_OCR })??;
        debug!(chars = text.len(), "Tesseract finished");
        Ok(text)
    }
}
