//! space-snapshots CLI binary.
//!
//! Creates or downloads snapshots for the selected Space scopes.

use clap::Parser;
use space_snapshots::cli::Cli;
use space_snapshots::{output, run, Scope, SpaceClient, ZipExtractor};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("space_snapshots=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let filter = match cli.scope_filter() {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match SpaceClient::from_env() {
        Ok(c) => c.with_retry_policy(cli.retry_policy()),
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Check the SPACE_API_URL environment variable");
            return ExitCode::FAILURE;
        }
    };

    match execute(&client, &cli, filter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(
    client: &SpaceClient,
    cli: &Cli,
    filter: Option<Scope>,
) -> space_snapshots::Result<()> {
    let options = cli.options();
    let report = run(client, cli.action, filter, &options, &ZipExtractor).await?;
    println!("{}", output::render(&report, cli.json)?);
    Ok(())
}
