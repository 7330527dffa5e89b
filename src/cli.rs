use clap::{Parser, ValueEnum};

/// Command-line interface definition.
/// One-shot WHOIS relay lookups plus an HTTP service mode.
///
/// Verbosity levels:
/// 0 - silent (only final output)
/// 1 - errors (default)
/// 2 - warnings + errors
/// 5 - trace/debug
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "WHOIS lookup relay: resolve the authoritative server, query it, follow one referral"
)]
pub struct Cli {
    /// Domain name or IP address to look up. Required unless --serve or
    /// --generate-schema is given.
    #[arg(required_unless_present_any = ["serve", "generate_schema"])]
    pub query: Option<String>,

    /// Run as an HTTP service instead of a one-shot lookup
    #[arg(long)]
    pub serve: bool,

    /// Bind address for --serve (host:port)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Skip server resolution and query this server (host or host:port) first
    #[arg(long, value_name = "HOST")]
    pub server: Option<String>,

    /// JSON file of TLD-to-server overrides merged over the built-in table
    #[arg(long = "servers-file", value_name = "FILE")]
    pub servers_file: Option<String>,

    /// Output format for one-shot lookups
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Connect/read timeout in seconds for each WHOIS exchange
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Minimum seconds between requests from one client (service mode)
    #[arg(long = "rate-interval", value_name = "SECS")]
    pub rate_interval: Option<u64>,

    /// Do not follow a referral to a secondary server
    #[arg(long = "no-referral")]
    pub no_referral: bool,

    /// Show approximate shell-equivalent commands
    #[arg(long)]
    pub show_commands: bool,

    /// Disable colored terminal output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Verbosity level (0,1,2,5)
    #[arg(long, default_value_t = 1)]
    pub verbose: u8,

    /// Print the JSON schema of the structured output document and exit
    #[arg(long = "generate-schema")]
    pub generate_schema: bool,
}

/// Output format for one-shot lookups.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Styled human-readable text
    Text,
    /// Structured JSON document
    Json,
    /// Structured YAML document
    Yaml,
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Convenience: are we in very verbose/debug mode?
    pub fn is_trace(&self) -> bool {
        self.verbose >= 5
    }

    /// Are warning-level messages enabled?
    pub fn warn_enabled(&self) -> bool {
        self.verbose >= 2
    }

    /// Are error-level messages enabled?
    pub fn error_enabled(&self) -> bool {
        self.verbose >= 1
    }

    /// Structured formats bypass the styled terminal renderer.
    pub fn is_structured_output(&self) -> bool {
        matches!(self.format, OutputFormat::Json | OutputFormat::Yaml)
    }
}
