use std::sync::Arc;

use whoisrelay::cli::{Cli, OutputFormat};
use whoisrelay::config::Config;
use whoisrelay::http::{self, AppState};
use whoisrelay::lookup::{LookupClient, LookupOptions};
use whoisrelay::output::{ReportFormat, create_formatter};
use whoisrelay::servers::ServerTable;
use whoisrelay::structured_output::LookupOutput;
use whoisrelay::styled_output::StyledFormatter;
use whoisrelay::transport::WhoisTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::from_args();

    // Handle schema generation early exit
    if cli.generate_schema {
        match LookupOutput::generate_json_schema() {
            Ok(schema) => {
                println!("{}", schema);
                return Ok(());
            }
            Err(e) => {
                anyhow::bail!("Error generating JSON schema: {}", e);
            }
        }
    }

    // Load configuration
    let mut config = Config::from_env();
    config.merge_with_cli(&cli);

    if let Err(e) = config.validate() {
        if cli.error_enabled() {
            eprintln!("Configuration error: {}", e);
        }
        std::process::exit(2);
    }

    let overrides = match config.load_server_overrides() {
        Ok(overrides) => overrides,
        Err(e) => {
            if cli.error_enabled() {
                eprintln!("Configuration error: {}", e);
            }
            std::process::exit(2);
        }
    };
    let table = if overrides.is_empty() {
        ServerTable::builtin()
    } else {
        ServerTable::with_overrides(overrides)
    };

    let transport = WhoisTransport::new(
        config.network.connect_timeout,
        config.network.read_timeout,
    );
    let client = LookupClient::new(Arc::new(table), transport);

    if cli.serve {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let state = AppState::new(client, config.service.rate_interval);
        return http::serve(&config.service.bind, state).await;
    }

    // One-shot lookup. The query is present: clap requires it without --serve.
    let query = cli.query.as_deref().unwrap_or_default();
    let options = LookupOptions {
        server_override: cli.server.clone(),
        follow_referral: !cli.no_referral,
    };

    let report = match client.lookup(query, &options, &cli).await {
        Ok(report) => report,
        Err(e) => {
            if cli.error_enabled() {
                eprintln!("Error: {}", e);
            }
            std::process::exit(1);
        }
    };

    match cli.format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let document = LookupOutput::from_report(&report);
            let output = match cli.format {
                OutputFormat::Json => document.to_json(),
                OutputFormat::Yaml => document.to_yaml(),
                _ => unreachable!(),
            };
            match output {
                Ok(formatted) => println!("{}", formatted),
                Err(e) => {
                    eprintln!("Error formatting structured output: {}", e);
                    std::process::exit(1);
                }
            }
        }
        OutputFormat::Text => {
            let formatter = if cli.no_color {
                StyledFormatter::without_colors()
            } else {
                StyledFormatter::new()
            };

            if let Err(e) = formatter.print_report(&report) {
                eprintln!("Error formatting styled output: {}", e);
                // Fall back to plain text output
                let plain = create_formatter(ReportFormat::Text);
                match plain.format_report(&report) {
                    Ok(text) => print!("{}", text),
                    Err(e) => {
                        eprintln!("Output formatting failed: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
    }

    Ok(())
}
