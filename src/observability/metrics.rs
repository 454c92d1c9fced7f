//! Prometheus metrics for the intake service.
//!
//! Recording functions are no-ops until [`install`] registers the recorder,
//! so unit tests can call them freely.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::time::Duration;
use tracing::info;

use crate::error::{FanError, Result};

/// All metric names used in the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    SubmissionsAccepted,
    SubmissionsRejected,
    ExternalCallDuration,
    ExternalCallErrors,
    PlatformLinks,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SubmissionsAccepted => "fan_submissions_accepted_total",
            MetricName::SubmissionsRejected => "fan_submissions_rejected_total",
            MetricName::ExternalCallDuration => "fan_external_call_duration_seconds",
            MetricName::ExternalCallErrors => "fan_external_call_errors_total",
            MetricName::PlatformLinks => "fan_platform_links_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the global Prometheus recorder and return the handle used by `/metrics`.
pub fn install() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| FanError::Config(format!("Failed to install Prometheus recorder: {e}")))?;
    info!("Metrics recorder installed");
    Ok(handle)
}

pub fn submission_accepted() {
    ::metrics::counter!(MetricName::SubmissionsAccepted.as_str()).increment(1);
}

pub fn submission_rejected(reason: &'static str) {
    ::metrics::counter!(MetricName::SubmissionsRejected.as_str(), "reason" => reason).increment(1);
}

pub fn external_call(service: &'static str, elapsed: Duration, ok: bool) {
    ::metrics::histogram!(MetricName::ExternalCallDuration.as_str(), "service" => service)
        .record(elapsed.as_secs_f64());
    if !ok {
        ::metrics::counter!(MetricName::ExternalCallErrors.as_str(), "service" => service).increment(1);
    }
}

pub fn platform_link(outcome: &'static str) {
    ::metrics::counter!(MetricName::PlatformLinks.as_str(), "outcome" => outcome).increment(1);
}
