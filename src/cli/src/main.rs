//! Vigil CLI - Command-line interface for querying Vigil health endpoints.

mod client;
mod commands;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::health;
use output::OutputFormat;

/// Vigil - Health-Check Aggregation Engine CLI
#[derive(Parser)]
#[command(
    name = "vigil",
    author = "Aezi <aezi.zhu@icloud.com>",
    version = "0.1.0",
    about = "Vigil - Health-Check Aggregation Engine",
    long_about = "Query the readiness and liveness endpoints of a Vigil server.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// API server URL
    #[arg(
        long,
        global = true,
        env = "VIGIL_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check readiness (fails when the service is unhealthy)
    Health,

    /// Check liveness
    Live,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let client = match client::ApiClient::new(&cli.api_url) {
        Ok(client) => client,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };
    let format = cli.output;

    let result = match cli.command {
        Commands::Health => health::execute(health::Endpoint::Ready, &client, format).await,
        Commands::Live => health::execute(health::Endpoint::Live, &client, format).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
