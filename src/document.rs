use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::app::ports::OcrPort;
use crate::constants::{ACCEPTED_CONTENT_TYPES, ACCEPTED_EXTENSIONS, SERVICE_OCR};
use crate::error::{ExternalServiceError, ValidationError};
use crate::observability::metrics;
use crate::types::UploadedDocument;

static TAX_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{3}\.\d{3}\.\d{3}-\d{2}").expect("valid tax ID pattern"));

/// First punctuated tax ID (`ddd.ddd.ddd-dd`) found in recognized text.
pub fn find_tax_id(text: &str) -> Option<&str> {
    TAX_ID_PATTERN.find(text).map(|m| m.as_str())
}

/// Only PNG and JPEG uploads are handed to OCR.
pub fn check_document_type(document: &UploadedDocument) -> Result<(), ValidationError> {
    let by_extension = document
        .file_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()));
    let by_content_type = document
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase())
        .filter(|ct| ACCEPTED_CONTENT_TYPES.contains(&ct.as_str()));

    if by_extension.is_some() || by_content_type.is_some() {
        return Ok(());
    }
    let described = document
        .file_name
        .clone()
        .or_else(|| document.content_type.clone())
        .unwrap_or_else(|| "unknown".to_string());
    Err(ValidationError::UnsupportedDocument(described))
}

/// Runs OCR over uploaded documents and pulls out the tax ID.
pub struct DocumentExtractor<'a> {
    ocr: &'a dyn OcrPort,
}

impl<'a> DocumentExtractor<'a> {
    pub fn new(ocr: &'a dyn OcrPort) -> Self {
        Self { ocr }
    }

    /// Returns the first tax ID in the document, or `None` when the text has none.
    #[instrument(skip_all, fields(bytes = image.len()))]
    pub async fn extract_tax_id(&self, image: &[u8]) -> Result<Option<String>, ExternalServiceError> {
        let started = Instant::now();
        let text = self.ocr.recognize(image).await;
        metrics::external_call(SERVICE_OCR, started.elapsed(), text.is_ok());
        let text = text?;

        debug!(chars = text.len(), "OCR finished");
        let found = find_tax_id(&text).map(str::to_string);
        info!(found = found.is_some(), "Document scanned for tax ID");
        Ok(found)
    }
}
