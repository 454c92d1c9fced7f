//! Model-backed classifiers: interest categories from followed channels and
//! relevance of user-supplied profile links.

pub mod interests;
pub mod links;

use std::time::Instant;

use crate::app::ports::LanguageModelPort;
use crate::constants::SERVICE_MODEL;
use crate::error::ExternalServiceError;
use crate::observability::metrics;

pub use interests::InterestClassifier;
pub use links::LinkRelevanceClassifier;

pub(crate) async fn ask(
    model: &dyn LanguageModelPort,
    prompt: &str,
) -> Result<String, ExternalServiceError> {
    let started = Instant::now();
    let answer = model.complete(prompt).await;
    metrics::external_call(SERVICE_MODEL, started.elapsed(), answer.is_ok());
    answer
}

/// Drops one pair of surrounding backticks the model likes to add.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let t = t
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
        .map(|inner| match inner.split_once('\n') {
            Some((tag, body)) if tag.chars().all(|c| c.is_ascii_alphanumeric()) => body,
            _ => inner,
        })
        .unwrap_or(t);
    let t = t.trim();
    t.strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
        .unwrap_or(t)
        .trim()
}

pub(crate) fn malformed(detail: impl Into<String>) -> ExternalServiceError {
    ExternalServiceError::MalformedResponse {
        service: SERVICE_MODEL,
        detail: detail.into(),
    }
}
