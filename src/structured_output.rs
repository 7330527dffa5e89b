//! Structured output module for JSON and YAML serialization.
//!
//! This module defines the full diagnostic document for one lookup: the wire
//! contract fields plus everything the relay knows about how the result was
//! obtained (query classification, referral handling, timing, warnings).
//! The document is versioned and schema-annotated so downstream consumers
//! can validate against `--generate-schema` output.

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lookup::LookupReport;
use crate::validate::QueryKind;

/// Root structure for all relay output in structured formats
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct LookupOutput {
    /// Tool version and metadata
    pub metadata: OutputMetadata,

    /// Input information that was looked up
    pub input: InputInfo,

    /// How the final server was arrived at
    pub resolution: ResolutionInfo,

    /// The lookup result
    pub result: ResultInfo,

    /// Warnings encountered during processing (non-fatal)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Tool metadata and versioning information
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct OutputMetadata {
    /// Tool name
    pub tool_name: String,

    /// Tool version
    pub version: String,

    /// Timestamp when the lookup was performed
    pub generated_at: chrono::DateTime<chrono::Utc>,

    /// Schema version for this output format
    pub schema_version: String,
}

/// Information about what was looked up
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct InputInfo {
    /// The validated query as sent on the wire
    pub query: String,

    /// Classification of the query
    pub query_kind: QueryClass,
}

/// Classification of an accepted query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryClass {
    /// IPv4 address literal
    Ipv4,
    /// IPv6 address literal
    Ipv6,
    /// Domain name
    Domain,
}

impl From<QueryKind> for QueryClass {
    fn from(kind: QueryKind) -> Self {
        match kind {
            QueryKind::Ipv4 => QueryClass::Ipv4,
            QueryKind::Ipv6 => QueryClass::Ipv6,
            QueryKind::Domain => QueryClass::Domain,
        }
    }
}

/// How the final server was chosen
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ResolutionInfo {
    /// Server the response came from (the referral target if followed)
    pub server: String,

    /// Referral target seen in the primary response, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,

    /// Whether the referral was actually followed
    pub referral_followed: bool,

    /// Whether the primary server could not be reached at all
    pub upstream_unreachable: bool,
}

/// The lookup result and timing
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ResultInfo {
    /// Raw WHOIS response text (empty when the upstream was unreachable)
    pub response: String,

    /// Total processing time in milliseconds
    pub duration_ms: u64,
}

impl LookupOutput {
    /// Build the document from a completed lookup
    pub fn from_report(report: &LookupReport) -> Self {
        Self {
            metadata: OutputMetadata {
                tool_name: crate::NAME.to_string(),
                version: crate::VERSION.to_string(),
                generated_at: chrono::Utc::now(),
                schema_version: "1.0.0".to_string(),
            },
            input: InputInfo {
                query: report.query.clone(),
                query_kind: report.kind.into(),
            },
            resolution: ResolutionInfo {
                server: report.server.clone(),
                referral: report.referral.clone(),
                referral_followed: report.referral_followed,
                upstream_unreachable: report.upstream_unreachable,
            },
            result: ResultInfo {
                response: report.response.clone(),
                duration_ms: report.duration_ms,
            },
            warnings: report.warnings.clone(),
        }
    }

    /// Generate JSON schema for this output format
    pub fn generate_json_schema() -> Result<String> {
        let schema = schemars::schema_for!(LookupOutput);
        Ok(serde_json::to_string_pretty(&schema)?)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
