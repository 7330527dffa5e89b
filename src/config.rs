//! Configuration management for the relay.
//!
//! Structured configuration loaded from environment variables and merged with
//! command-line arguments. It centralizes the WHOIS timeouts, the rate-limit
//! interval, and the service bind address, and loads the optional server
//! overrides file once at startup.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Network operation settings
    pub network: NetworkConfig,

    /// HTTP service settings
    pub service: ServiceConfig,
}

/// Network-related configuration options
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Timeout for establishing a connection to a WHOIS server
    pub connect_timeout: Duration,

    /// Timeout for reading a WHOIS response to EOF
    pub read_timeout: Duration,

    /// Optional path to a JSON file of TLD-to-server overrides
    pub servers_file: Option<String>,
}

/// HTTP service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the service binds to
    pub bind: String,

    /// Minimum interval between permitted requests per client
    pub rate_interval: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            servers_file: None,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:4343".to_string(),
            rate_interval: Duration::from_secs(3),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("WHOISRELAY_TIMEOUT_SECS")
            && let Ok(secs) = timeout.parse::<u64>()
        {
            config.network.connect_timeout = Duration::from_secs(secs);
            config.network.read_timeout = Duration::from_secs(secs);
        }

        if let Ok(path) = std::env::var("WHOISRELAY_SERVERS_FILE") {
            config.network.servers_file = Some(path);
        }

        if let Ok(bind) = std::env::var("WHOISRELAY_BIND") {
            config.service.bind = bind;
        }

        if let Ok(interval) = std::env::var("WHOISRELAY_RATE_INTERVAL_SECS")
            && let Ok(secs) = interval.parse::<u64>()
        {
            config.service.rate_interval = Duration::from_secs(secs);
        }

        config
    }

    /// Merge with CLI arguments, giving CLI precedence
    pub fn merge_with_cli(&mut self, cli: &crate::cli::Cli) {
        if let Some(secs) = cli.timeout {
            self.network.connect_timeout = Duration::from_secs(secs);
            self.network.read_timeout = Duration::from_secs(secs);
        }

        if let Some(ref path) = cli.servers_file {
            self.network.servers_file = Some(path.clone());
        }

        if let Some(ref bind) = cli.bind {
            self.service.bind = bind.clone();
        }

        if let Some(secs) = cli.rate_interval {
            self.service.rate_interval = Duration::from_secs(secs);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.connect_timeout.as_secs() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.connect_timeout".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.network.read_timeout.as_secs() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.read_timeout".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.service.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "service.bind".to_string(),
                value: self.service.bind.clone(),
                reason: "Bind address must be host:port".to_string(),
            });
        }

        Ok(())
    }

    /// Load the server overrides file, if configured.
    ///
    /// The file is a flat JSON object of TLD to server hostname. It is read
    /// once here; the resulting table never changes afterwards.
    pub fn load_server_overrides(&self) -> Result<HashMap<String, String>, ConfigError> {
        let Some(ref path) = self.network.servers_file else {
            return Ok(HashMap::new());
        };
        read_overrides_file(path)
    }
}

fn read_overrides_file<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>, ConfigError> {
    let content = fs::read_to_string(&path).map_err(|e| ConfigError::FileRead {
        path: path.as_ref().to_string_lossy().to_string(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        format: "JSON".to_string(),
        reason: e.to_string(),
    })
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    FileRead {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse configuration format
    Parse { format: String, reason: String },

    /// Invalid configuration value
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path, source)
            }
            ConfigError::Parse { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value '{}' for '{}': {}", value, field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileRead { source, .. } => Some(source),
            _ => None,
        }
    }
}
