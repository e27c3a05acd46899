//! Metric names and recording helpers.
//!
//! Meridian records through the `metrics` facade and never installs an
//! exporter itself; whichever recorder the application installs receives
//! the values. Without a recorder every call is a no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `meridian_requests_total` | Counter | `outcome`, `status` | Dispatched requests |
//! | `meridian_request_duration_seconds` | Histogram | `outcome` | Dispatch latency |
//! | `meridian_in_flight_requests` | Gauge | - | Requests being dispatched |
//! | `meridian_fatal_errors_total` | Counter | - | Fatal fallback responses |

use std::fmt;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Counter of dispatched requests.
pub const REQUESTS_TOTAL: &str = "meridian_requests_total";

/// Histogram of dispatch latency in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "meridian_request_duration_seconds";

/// Gauge of requests currently being dispatched.
pub const IN_FLIGHT_REQUESTS: &str = "meridian_in_flight_requests";

/// Counter of responses produced by the fatal fallback.
pub const FATAL_ERRORS_TOTAL: &str = "meridian_fatal_errors_total";

/// How a dispatched request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// A 1xx, 2xx or 3xx response.
    Success,
    /// A 4xx response.
    ClientError,
    /// A 5xx response from the error handler.
    ServerError,
    /// A response from the fatal fallback.
    Fatal,
    /// The error was returned to the caller because error catching is off.
    Propagated,
}

impl Outcome {
    /// Classifies a final status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Success,
        }
    }

    /// Returns the label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::Fatal => "fatal",
            Self::Propagated => "propagated",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registers descriptions for all standard metrics with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of requests dispatched");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Request dispatch duration in seconds");
    describe_gauge!(IN_FLIGHT_REQUESTS, "Number of requests currently being dispatched");
    describe_counter!(FATAL_ERRORS_TOTAL, "Total number of fatal fallback responses");
}

/// Records a completed request.
pub fn record_request(outcome: Outcome, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "outcome" => outcome.as_str(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION_SECONDS, "outcome" => outcome.as_str())
        .record(duration.as_secs_f64());
}

/// Records a fatal fallback response.
pub fn record_fatal_error() {
    counter!(FATAL_ERRORS_TOTAL).increment(1);
}

/// Guard that tracks one in-flight request.
///
/// Increments the gauge on creation and decrements it on drop, so the
/// gauge stays correct on early returns.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}
