use std::fmt;
use thiserror::Error;

/// Why a name failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameIssue {
    Empty,
    SingleWord,
}

impl fmt::Display for NameIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameIssue::Empty => write!(f, "Name is required."),
            NameIssue::SingleWord => write!(f, "Name must contain at least two words."),
        }
    }
}

/// Recoverable input problems: the user corrects the field and resubmits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidName(NameIssue),

    #[error("Tax ID must contain 11 digits.")]
    TooShort,

    #[error("Tax ID has more than 11 digits.")]
    TooLong,

    #[error("Invalid tax ID.")]
    AllDigitsEqual,

    #[error("Invalid tax ID.")]
    CheckDigitMismatch,

    #[error("Unsupported document type '{0}', upload a PNG or JPEG image.")]
    UnsupportedDocument(String),
}

/// Form fields that can carry a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    TaxId,
    Document,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::TaxId => "tax ID",
            Field::Document => "document",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub error: ValidationError,
}

/// Every field warning raised by one submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: Field, error: ValidationError) {
        self.0.push(FieldError { field, error });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: Field) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field == field).map(|e| &e.error)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("Error in {}: {}", e.field.label(), e.error))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Failures of OAuth, OCR or model calls. Terminal for the attempt, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalServiceError {
    #[error("{service} request failed: {message}")]
    Http { service: &'static str, message: String },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned a malformed response: {detail}")]
    MalformedResponse { service: &'static str, detail: String },

    #[error("{service} authentication failed: {message}")]
    Auth { service: &'static str, message: String },

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("{service} did not answer in time")]
    Timeout { service: &'static str },
}

impl ExternalServiceError {
    pub fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ExternalServiceError::Timeout { service };
        }
        ExternalServiceError::Http {
            service,
            message: err.to_string(),
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            ExternalServiceError::Http { service, .. }
            | ExternalServiceError::Status { service, .. }
            | ExternalServiceError::MalformedResponse { service, .. }
            | ExternalServiceError::Auth { service, .. }
            | ExternalServiceError::Timeout { service, .. } => *service,
            ExternalServiceError::Ocr(_) => "ocr",
        }
    }
}

/// The uploaded document does not back up the typed tax ID.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("A document upload is required.")]
    DocumentMissing,

    #[error("Tax ID not found in the uploaded document.")]
    TaxIdNotFound,

    #[error("The typed tax ID ({typed}) does not match the tax ID in the document ({extracted}).")]
    Mismatch { typed: String, extracted: String },
}

#[derive(Error, Debug)]
pub enum FanError {
    #[error("{0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    ExternalService(#[from] ExternalServiceError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<FieldErrors> for FanError {
    fn from(errors: FieldErrors) -> Self {
        FanError::Validation(errors)
    }
}

impl From<rusqlite::Error> for FanError {
    fn from(err: rusqlite::Error) -> Self {
        FanError::Database {
            message: err.to_string(),
        }
    }
}

impl FanError {
    /// Short label used for the rejection metric.
    pub fn reason(&self) -> &'static str {
        match self {
            FanError::Validation(_) => "validation",
            FanError::ExternalService(_) => "external_service",
            FanError::Consistency(ConsistencyError::Mismatch { .. }) => "mismatch",
            FanError::Consistency(_) => "document",
            FanError::Database { .. } => "database",
            FanError::Config(_) | FanError::Io(_) | FanError::Toml(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, FanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_render_per_field_warnings() {
        let mut errors = FieldErrors::default();
        errors.push(Field::Name, ValidationError::InvalidName(NameIssue::SingleWord));
        errors.push(Field::TaxId, ValidationError::CheckDigitMismatch);

        assert_eq!(
            errors.to_string(),
            "Error in name: Name must contain at least two words. Error in tax ID: Invalid tax ID."
        );
        assert_eq!(
            errors.for_field(Field::TaxId),
            Some(&ValidationError::CheckDigitMismatch)
        );
        assert!(errors.for_field(Field::Document).is_none());
    }

    #[test]
    fn mismatch_reports_both_values() {
        let err = FanError::from(ConsistencyError::Mismatch {
            typed: "111.444.777-35".into(),
            extracted: "222.444.777-35".into(),
        });
        let msg = err.to_string();
        assert!(msg.contains("111.444.777-35"));
        assert!(msg.contains("222.444.777-35"));
        assert_eq!(err.reason(), "mismatch");
    }
}
