use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::app::ports::{FanStorePort, LanguageModelPort, OcrPort};
use crate::classify::LinkRelevanceClassifier;
use crate::document::{check_document_type, DocumentExtractor};
use crate::error::{ConsistencyError, Field, FieldErrors, Result};
use crate::observability::{fingerprint, metrics};
use crate::types::{
    FanSubmission, SubmissionContext, SubmissionForm, SubmissionReceipt, UploadedDocument,
};
use crate::validation::{validate_name, validate_tax_id, TaxId};

/// Where a submission attempt is. Rejection can happen in any stage before `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Validating,
    Extracting,
    Persisting,
    Submitted,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStage::Validating => "validating",
            SubmissionStage::Extracting => "extracting",
            SubmissionStage::Persisting => "persisting",
            SubmissionStage::Submitted => "submitted",
        };
        f.write_str(s)
    }
}

/// Checks the form fields and the document type. All warnings are collected, not just the first.
pub fn validate_form(
    form: &SubmissionForm,
    document: Option<&UploadedDocument>,
) -> std::result::Result<TaxId, FieldErrors> {
    let mut errors = FieldErrors::default();
    if let Err(e) = validate_name(&form.name) {
        errors.push(Field::Name, e);
    }
    let tax_id = match validate_tax_id(&form.tax_id) {
        Ok(id) => Some(id),
        Err(e) => {
            errors.push(Field::TaxId, e);
            None
        }
    };
    if let Some(doc) = document {
        if let Err(e) = check_document_type(doc) {
            errors.push(Field::Document, e);
        }
    }
    match tax_id {
        Some(id) if errors.is_empty() => Ok(id),
        _ => Err(errors),
    }
}

/// Validates, verifies the identity document, reviews links and writes one row.
///
/// Any failure ends the attempt with nothing written; the user resubmits from scratch.
pub struct SubmissionUseCase {
    ocr: Arc<dyn OcrPort>,
    model: Arc<dyn LanguageModelPort>,
    store: Arc<dyn FanStorePort>,
}

impl SubmissionUseCase {
    pub fn new(
        ocr: Arc<dyn OcrPort>,
        model: Arc<dyn LanguageModelPort>,
        store: Arc<dyn FanStorePort>,
    ) -> Self {
        Self { ocr, model, store }
    }

    pub async fn submit(
        &self,
        form: &SubmissionForm,
        document: Option<&UploadedDocument>,
        context: &SubmissionContext,
    ) -> Result<SubmissionReceipt> {
        let span = info_span!("submission", id = %Uuid::new_v4());
        let result = self.run(form, document, context).instrument(span).await;
        match &result {
            Ok(_) => metrics::submission_accepted(),
            Err(e) => {
                warn!(reason = e.reason(), "Submission rejected: {}", e);
                metrics::submission_rejected(e.reason());
            }
        }
        result
    }

    async fn run(
        &self,
        form: &SubmissionForm,
        document: Option<&UploadedDocument>,
        context: &SubmissionContext,
    ) -> Result<SubmissionReceipt> {
        debug!(stage = %SubmissionStage::Validating, "Stage entered");
        let tax_id = validate_form(form, document)?;
        let tax_fp = fingerprint(&tax_id.digits());

        debug!(stage = %SubmissionStage::Extracting, tax_id = %tax_fp, "Stage entered");
        let document = document.ok_or(ConsistencyError::DocumentMissing)?;
        let extracted = DocumentExtractor::new(self.ocr.as_ref())
            .extract_tax_id(&document.bytes)
            .await?
            .ok_or(ConsistencyError::TaxIdNotFound)?;
        if !tax_id.matches(&extracted) {
            return Err(ConsistencyError::Mismatch {
                typed: form.tax_id.trim().to_string(),
                extracted,
            }
            .into());
        }

        debug!(stage = %SubmissionStage::Persisting, "Stage entered");
        let link_review = LinkRelevanceClassifier::new(self.model.as_ref())
            .review(&form.profile_links, &form.interests)
            .await?;

        let profile = context.profile.as_ref();
        let submission = FanSubmission {
            name: form.name.trim().to_string(),
            tax_id: tax_id.formatted(),
            address: form.address.trim().to_string(),
            interests: form.interests.trim().to_string(),
            events_2024: form.events_2024.trim().to_string(),
            purchases_2024: form.purchases_2024.trim().to_string(),
            detected_themes: profile.map(|p| p.detected_themes_joined()).unwrap_or_default(),
            followed_channels: profile
                .map(|p| p.followed_channels_joined())
                .unwrap_or_default(),
            validated_links: link_review.raw.clone(),
            submitted_at: Utc::now(),
        };
        self.store.insert(&submission).await?;

        info!(
            stage = %SubmissionStage::Submitted,
            tax_id = %tax_fp,
            relevant_links = link_review.entries.len(),
            "Submission stored"
        );
        Ok(SubmissionReceipt {
            submission,
            link_review,
        })
    }
}
