use std::sync::Arc;
use std::time::Instant;

use crate::errors::Result;
use crate::referral::find_referral;
use crate::servers::ServerTable;
use crate::transport::{QueryEnv, QueryReply, WhoisTransport};
use crate::validate::{QueryKind, check_query};

/// Options for a single lookup.
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Skip resolution and ask this server (`host` or `host:port`) first.
    pub server_override: Option<String>,
    /// Follow a single referral hop (the default).
    pub follow_referral: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        LookupOptions {
            server_override: None,
            follow_referral: true,
        }
    }
}

/// Everything known about one completed lookup.
///
/// `query`, `server` and `response` are the caller contract; the rest is
/// diagnostics (never part of the wire payload).
#[derive(Debug, Clone)]
pub struct LookupReport {
    pub query: String,
    /// Final server: the referral target if one was followed, else the first.
    pub server: String,
    pub response: String,
    pub kind: QueryKind,
    /// Referral target seen in the primary response, followed or not.
    pub referral: Option<String>,
    pub referral_followed: bool,
    /// True when the first server could not be reached at all; the response
    /// is then empty, which is exactly what the caller contract reports.
    pub upstream_unreachable: bool,
    pub duration_ms: u64,
    pub warnings: Vec<String>,
}

/// High-level facade: validate, resolve, query, follow one referral.
///
/// One instance is shared by the CLI and the HTTP service; it holds only the
/// immutable routing table and the transport timeouts, so it is cheap to
/// clone and safe to use from concurrent tasks.
#[derive(Debug, Clone)]
pub struct LookupClient {
    table: Arc<ServerTable>,
    transport: WhoisTransport,
}

impl LookupClient {
    pub fn new(table: Arc<ServerTable>, transport: WhoisTransport) -> Self {
        LookupClient { table, transport }
    }

    pub fn table(&self) -> &ServerTable {
        &self.table
    }

    /// Perform one relay lookup.
    ///
    /// The query is re-checked here so direct library callers get the same
    /// injection protection as the HTTP pipeline. Unreachable upstreams come
    /// back as an empty response with `upstream_unreachable` set, not as an
    /// error. At most two WHOIS exchanges happen, sequentially.
    pub async fn lookup<E: QueryEnv + ?Sized>(
        &self,
        query: &str,
        options: &LookupOptions,
        env: &E,
    ) -> Result<LookupReport> {
        let kind = check_query(query)?;
        let query = query.trim();
        let start = Instant::now();
        let mut warnings = Vec::new();

        let mut server = match &options.server_override {
            Some(s) => s.clone(),
            None => self.table.resolve(query),
        };

        let primary = self.transport.query(&server, query, env).await;
        let upstream_unreachable = primary.is_unreachable();
        if let QueryReply::Unreachable { reason } = &primary {
            warnings.push(format!("{server} unreachable: {reason}"));
        }
        let mut response = primary.into_text();

        let referral = find_referral(&response);
        let mut referral_followed = false;
        if options.follow_referral
            && let Some(target) = referral.as_deref()
        {
            if target == server {
                // Self-referral; the answer we have is already authoritative.
                if env.is_trace() {
                    eprintln!("Referral points back to {server}; not re-querying");
                }
            } else {
                if env.is_trace() {
                    eprintln!("Following referral to {target}");
                }
                match self.transport.query(target, query, env).await {
                    QueryReply::Answered { text } if !text.is_empty() => {
                        server = target.to_string();
                        response = text;
                        referral_followed = true;
                    }
                    QueryReply::Answered { .. } => {
                        warnings.push(format!(
                            "referral {target} returned an empty response; keeping primary result"
                        ));
                    }
                    QueryReply::Unreachable { reason } => {
                        warnings.push(format!(
                            "referral {target} unreachable ({reason}); keeping primary result"
                        ));
                    }
                }
            }
        }

        Ok(LookupReport {
            query: query.to_string(),
            server,
            response,
            kind,
            referral,
            referral_followed,
            upstream_unreachable,
            duration_ms: start.elapsed().as_millis() as u64,
            warnings,
        })
    }
}
