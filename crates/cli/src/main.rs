//! `discharge` entry point.

use clap::Parser;
use cli::{Cli, CliError, Config, execute};
use station::{DischargeCoordinator, HttpStationClient};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

async fn run(cli: Cli, config: Config) -> Result<String, CliError> {
    let base_url = cli.base_url.unwrap_or(config.base_url.clone());
    let client = HttpStationClient::new(
        base_url,
        station::services::http::DEFAULT_REQUEST_TIMEOUT,
    )?;
    let coordinator = DischargeCoordinator::new(
        client.clone(),
        client.clone(),
        client,
        config.discharge_config(),
    );
    execute(&coordinator, cli.command).await
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // Logs go to stderr so command output stays clean on stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli, config).await {
        Ok(output) => print!("{output}"),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}
