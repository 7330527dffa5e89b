use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::cli::Cli;
use crate::errors::{Result, WhoisRelayError};

/// Abstraction over environment / verbosity for WHOIS exchanges. This removes
/// the direct dependency of the transport on the concrete CLI type and lets
/// the HTTP service run it silently.
pub trait QueryEnv {
    fn show_commands(&self) -> bool;
    fn is_trace(&self) -> bool;
    fn warn_enabled(&self) -> bool;
}

impl QueryEnv for Cli {
    fn show_commands(&self) -> bool {
        self.show_commands
    }
    fn is_trace(&self) -> bool {
        self.is_trace()
    }
    fn warn_enabled(&self) -> bool {
        self.warn_enabled()
    }
}

/// Environment that suppresses all diagnostics (service mode, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentEnv;

impl QueryEnv for SilentEnv {
    fn show_commands(&self) -> bool {
        false
    }
    fn is_trace(&self) -> bool {
        false
    }
    fn warn_enabled(&self) -> bool {
        false
    }
}

/// WHOIS TCP port.
pub const WHOIS_PORT: u16 = 43;

/// Outcome of one WHOIS exchange.
///
/// An answered exchange may carry empty text (a genuine empty record); an
/// unreachable server is a distinct case that callers fold back into "empty"
/// for the wire contract, keeping the reason for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryReply {
    Answered { text: String },
    Unreachable { reason: String },
}

impl QueryReply {
    /// Response text; empty for unreachable servers.
    pub fn text(&self) -> &str {
        match self {
            QueryReply::Answered { text } => text,
            QueryReply::Unreachable { .. } => "",
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, QueryReply::Unreachable { .. })
    }

    pub fn into_text(self) -> String {
        match self {
            QueryReply::Answered { text } => text,
            QueryReply::Unreachable { .. } => String::new(),
        }
    }
}

/// One-shot WHOIS protocol client: one line out, stream in until close.
#[derive(Debug, Clone)]
pub struct WhoisTransport {
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl WhoisTransport {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        WhoisTransport {
            connect_timeout,
            read_timeout,
        }
    }

    /// Query `server` (either `host` or `host:port`, port 43 by default) and
    /// return the tagged reply. Connection problems never escape as errors.
    pub async fn query<E: QueryEnv + ?Sized>(
        &self,
        server: &str,
        query: &str,
        env: &E,
    ) -> QueryReply {
        let (host, port) = split_target(server);
        if env.show_commands() {
            if port == WHOIS_PORT {
                eprintln!("(cmd) whois -h {host} {query}");
            } else {
                eprintln!("(cmd) whois -h {host} -p {port} {query}");
            }
        }
        if env.is_trace() {
            eprintln!("WHOIS query to {host}:{port}");
        }

        match self.exchange(host, port, query).await {
            Ok(text) => QueryReply::Answered { text },
            Err(e) => {
                if env.warn_enabled() {
                    eprintln!("WHOIS warning on {server}: {e}");
                }
                QueryReply::Unreachable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// The raw exchange. WHOIS has no length framing; the response ends only
    /// when the peer closes, so this reads to EOF under the read timeout.
    async fn exchange(&self, host: &str, port: u16, query: &str) -> Result<String> {
        let mut stream = match timeout(self.connect_timeout, TcpStream::connect((host, port))).await
        {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => return Err(WhoisRelayError::upstream(host, "connect", e.to_string())),
            Err(_) => {
                return Err(WhoisRelayError::timeout(
                    "connect",
                    self.connect_timeout.as_secs(),
                ));
            }
        };

        // Canonical WHOIS request: "<query>\r\n"
        let line = format!("{}\r\n", query.trim());
        match timeout(self.read_timeout, stream.write_all(line.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(WhoisRelayError::upstream(host, "write", e.to_string())),
            Err(_) => {
                return Err(WhoisRelayError::timeout(
                    "write",
                    self.read_timeout.as_secs(),
                ));
            }
        }

        let mut buf = Vec::new();
        match timeout(self.read_timeout, stream.read_to_end(&mut buf)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(WhoisRelayError::upstream(host, "read", e.to_string())),
            // Deadline hit mid-stream: a slow server yields whatever it sent
            // so far. A server that sent nothing at all counts as a timeout.
            Err(_) if buf.is_empty() => {
                return Err(WhoisRelayError::timeout(
                    "read",
                    self.read_timeout.as_secs(),
                ));
            }
            Err(_) => {}
        }

        Ok(String::from_utf8_lossy(&buf).trim().to_string())
    }
}

/// Split an optional `host:port` target; plain hosts get the WHOIS port.
/// Bare IPv6 literals (multiple colons) are left untouched.
fn split_target(server: &str) -> (&str, u16) {
    if let Some((host, port)) = server.rsplit_once(':')
        && !host.is_empty()
        && !host.contains(':')
        && let Ok(p) = port.parse::<u16>()
    {
        return (host, p);
    }
    (server, WHOIS_PORT)
}
