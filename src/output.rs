//! Output formatting for lookup results.
//!
//! This module carries the caller-facing wire contract: a success payload of
//! `{query, server, result}` and a failure payload of `{error, message}`,
//! rendered either as JSON or as plain text. Both the CLI and the HTTP
//! service render through these formatters so the two surfaces cannot drift.

use std::io;

use serde::{Deserialize, Serialize};

use crate::errors::WhoisRelayError;
use crate::lookup::LookupReport;

/// Success payload: exactly the three fields of the caller contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireReport {
    /// The validated query as sent on the wire
    pub query: String,

    /// Final server: the referral target if one was followed, else the first
    pub server: String,

    /// Raw WHOIS response text (empty when the upstream was unreachable)
    pub result: String,
}

impl From<&LookupReport> for WireReport {
    fn from(report: &LookupReport) -> Self {
        Self {
            query: report.query.clone(),
            server: report.server.clone(),
            result: report.response.clone(),
        }
    }
}

/// Failure payload for the JSON mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireError {
    /// Stable code: `invalid_query` or `rate_limited`
    pub error: String,

    /// Human-readable detail
    pub message: String,
}

impl From<&WhoisRelayError> for WireError {
    fn from(err: &WhoisRelayError) -> Self {
        Self {
            error: err.wire_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Output format options for the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable text
    Text,

    /// JSON, optionally pretty-printed
    Json { pretty: bool },
}

/// Report formatter trait - dyn-compatible, no generic methods.
///
/// `Send + Sync` because the HTTP handler holds a boxed formatter across
/// await points.
pub trait ReportFormatter: Send + Sync {
    /// Format a completed lookup
    fn format_report(&self, report: &LookupReport) -> io::Result<String>;

    /// Format a failure
    fn format_error(&self, err: &WhoisRelayError) -> io::Result<String>;

    /// Get the MIME type for this format
    fn mime_type(&self) -> &'static str;
}

/// Plain-text formatter: the same information rendered for direct display.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format_report(&self, report: &LookupReport) -> io::Result<String> {
        let mut output = String::new();
        output.push_str(&format!("Query:  {}\n", report.query));
        output.push_str(&format!("Server: {}\n", report.server));
        output.push('\n');
        if report.response.is_empty() {
            output.push_str("(no response)\n");
        } else {
            output.push_str(&report.response);
            output.push('\n');
        }
        Ok(output)
    }

    fn format_error(&self, err: &WhoisRelayError) -> io::Result<String> {
        Ok(format!("Error: {}\n", err))
    }

    fn mime_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }
}

/// JSON formatter for the programmatic contract.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> io::Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value).map_err(io::Error::other)?
        } else {
            serde_json::to_string(value).map_err(io::Error::other)?
        };
        Ok(format!("{}\n", json))
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_report(&self, report: &LookupReport) -> io::Result<String> {
        self.render(&WireReport::from(report))
    }

    fn format_error(&self, err: &WhoisRelayError) -> io::Result<String> {
        self.render(&WireError::from(err))
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }
}

/// Create a formatter for the requested format
pub fn create_formatter(format: ReportFormat) -> Box<dyn ReportFormatter> {
    match format {
        ReportFormat::Text => Box::new(TextFormatter),
        ReportFormat::Json { pretty } => Box::new(JsonFormatter::new(pretty)),
    }
}
