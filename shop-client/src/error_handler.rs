//! Global error handler
//!
//! Backstop for failures nobody handled locally. Any `anyhow::Error` is
//! classified into a [`Severity`], logged, and fanned out to subscribers
//! (typically the UI layer, which shows a toast or a blocking alert).

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::error::{ClientError, ErrorKind};

const REPORT_CAPACITY: usize = 32;

/// Error severity, ordered from least to most serious
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// A classified failure
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub severity: Severity,
    /// Message suitable for display
    pub message: String,
    pub code: Option<String>,
    /// Where the error surfaced, e.g. "checkout"
    pub context: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorReport {
    /// Whether a blocking alert should be shown instead of a toast
    pub fn should_alert(&self) -> bool {
        self.severity >= Severity::High
    }
}

#[derive(Debug, Clone)]
pub struct ErrorHandler {
    reports: broadcast::Sender<ErrorReport>,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorHandler {
    pub fn new() -> Self {
        let (reports, _) = broadcast::channel(REPORT_CAPACITY);
        Self { reports }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ErrorReport> {
        self.reports.subscribe()
    }

    /// Classify, log and publish an error
    pub fn handle(&self, error: &anyhow::Error, context: &str) -> ErrorReport {
        let client_error = error.downcast_ref::<ClientError>();
        let severity = client_error.map_or(Severity::Critical, classify);
        let report = ErrorReport {
            severity,
            message: client_error.map_or_else(|| error.to_string(), display_message),
            code: client_error.and_then(|e| e.code.clone()),
            context: context.to_string(),
            timestamp: Utc::now(),
        };

        match severity {
            Severity::Low => tracing::debug!(context, "{error:#}"),
            Severity::Medium => tracing::warn!(context, code = ?report.code, "{error:#}"),
            Severity::High | Severity::Critical => {
                tracing::error!(context, severity = severity.as_str(), code = ?report.code, "{error:#}")
            }
        }

        // nobody listening is fine
        let _ = self.reports.send(report.clone());
        report
    }
}

/// Severity of a normalized client error
pub fn classify(error: &ClientError) -> Severity {
    match error.kind {
        ErrorKind::Validation | ErrorKind::Cancelled => Severity::Low,
        ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Offline => Severity::Medium,
        ErrorKind::Http => match error.status {
            Some(status) if status >= 500 => Severity::High,
            _ => Severity::Medium,
        },
        ErrorKind::Unauthorized
        | ErrorKind::SessionExpired
        | ErrorKind::InvalidResponse
        | ErrorKind::Storage => Severity::High,
        ErrorKind::Config => Severity::Critical,
    }
}

fn display_message(error: &ClientError) -> String {
    match error.kind {
        ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Offline => {
            format!("{}. Check your internet connection and try again.", error.message)
        }
        _ => error.message.clone(),
    }
}
