//! WhoisRelay Library
//!
//! A Rust library for referral-following WHOIS lookups. Given a domain name
//! or IP address it:
//!
//! - Validates the query (rejecting control characters and CRLF injection)
//! - Picks the authoritative WHOIS server from a static TLD table
//! - Performs the port-43 exchange (one line out, stream in until close)
//! - Follows at most one referral to a secondary server
//! - Returns `{query, server, result}` plus diagnostics
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use whoisrelay::lookup::{LookupClient, LookupOptions};
//! use whoisrelay::servers::ServerTable;
//! use whoisrelay::transport::{SilentEnv, WhoisTransport};
//!
//! # async fn run() -> whoisrelay::Result<()> {
//! let client = LookupClient::new(
//!     Arc::new(ServerTable::builtin()),
//!     WhoisTransport::new(Duration::from_secs(10), Duration::from_secs(10)),
//! );
//! let report = client.lookup("example.com", &LookupOptions::default(), &SilentEnv).await?;
//! println!("{} answered via {}", report.query, report.server);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod http;
pub mod lookup;
pub mod output;
pub mod ratelimit;
pub mod referral;
pub mod servers;
pub mod structured_output;
pub mod styled_output;
pub mod transport;
pub mod validate;

// Re-export commonly used types and functions for convenience
pub use errors::{Result, WhoisRelayError};
pub use lookup::{LookupClient, LookupOptions, LookupReport};
pub use referral::find_referral;
pub use servers::{DEFAULT_SERVER, IP_REGISTRY_SERVER, ServerTable};
pub use styled_output::StyledFormatter;
pub use transport::{QueryReply, WhoisTransport};
pub use validate::{QueryKind, check_query, validate};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
