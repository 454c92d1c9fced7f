// Observability: metrics and log redaction

pub mod metrics;
pub mod redact;

pub use redact::fingerprint;
