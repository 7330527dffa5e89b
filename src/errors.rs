//! Unified error handling.
//!
//! A `thiserror`-based model with:
//!   * Typed variants for the failure domains of a relay request
//!   * A categorization layer (`ErrorCategory`) for the service log lines
//!   * Wire codes for the JSON error contract
//!   * Helper constructors
//!
//! Unreachable upstream servers are deliberately NOT propagated as errors
//! through the lookup path: the transport reports them in its reply type and
//! the orchestrator degrades to an empty result. The variants here cover the
//! seams where a failure is surfaced to a caller (validation, throttling) or
//! needs context while still inside the transport.
//!
//! Categories are intentionally coarse:
//!   - Input: user / query / configuration issues
//!   - Policy: request throttling
//!   - Network: remote-service problems

use thiserror::Error;

/// High-level classification for the service log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Policy,
    Network,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Policy => "policy",
            ErrorCategory::Network => "network",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum WhoisRelayError {
    // ------------------------ Input / Validation ----------------------------
    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ----------------------------- Policy -----------------------------------
    #[error("Rate limited: client '{client}' must wait before querying again")]
    RateLimited { client: String },

    // ----------------------------- Network ----------------------------------
    #[error("WHOIS {operation} to '{server}' failed: {reason}")]
    Upstream {
        server: String,
        operation: String,
        reason: String,
    },

    #[error("Network {operation} timed out after {seconds}s")]
    NetworkTimeout { operation: String, seconds: u64 },
}

impl WhoisRelayError {
    /// Categorize the error for the service log lines.
    pub fn category(&self) -> ErrorCategory {
        use WhoisRelayError::*;
        match self {
            InvalidQuery { .. } | Configuration { .. } => ErrorCategory::Input,
            RateLimited { .. } => ErrorCategory::Policy,
            Upstream { .. } | NetworkTimeout { .. } => ErrorCategory::Network,
        }
    }

    /// Stable code for the JSON `error` field.
    ///
    /// Only `invalid_query` and `rate_limited` ever reach the wire; the rest
    /// exist so the mapping stays total for diagnostics.
    pub fn wire_code(&self) -> &'static str {
        use WhoisRelayError::*;
        match self {
            InvalidQuery { .. } => "invalid_query",
            RateLimited { .. } => "rate_limited",
            Upstream { .. } | NetworkTimeout { .. } => "upstream_unreachable",
            Configuration { .. } => "internal_error",
        }
    }

    // ---------------------------- Constructors -----------------------------

    pub fn invalid_query(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            query: query.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn rate_limited(client: impl Into<String>) -> Self {
        Self::RateLimited {
            client: client.into(),
        }
    }

    pub fn upstream(
        server: impl Into<String>,
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            server: server.into(),
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        Self::NetworkTimeout {
            operation: operation.into(),
            seconds,
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, WhoisRelayError>;
