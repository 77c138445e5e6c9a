//! elastic-email - verify email addresses from the command line
//!
//! Checks one or more addresses against the Elastic Email API, reusing cached
//! results where allowed.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use elastic_email::cli::{self, Cli, RunConfig};
use elastic_email::{BatchResults, ElasticEmailClient};

/// Installs a stderr logger; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "elastic_email=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = RunConfig::from_cli(&cli)?;

    let mut client = ElasticEmailClient::new(config.client.clone());
    if let Some(cache) = config.build_cache()? {
        client = client.with_cache(cache);
    }

    let results = match config.emails.as_slice() {
        [email] => {
            let outcome = client.check(email, config.options).await;
            let key = match &outcome {
                Ok(result) if !result.email.is_empty() => result.email.clone(),
                _ => email.clone(),
            };
            let mut results = BatchResults::new();
            results.insert(key, outcome);
            results
        }
        emails => client.check_many(emails.iter().cloned(), config.options).await,
    };

    if config.json {
        println!("{}", serde_json::to_string_pretty(&cli::results_to_json(&results))?);
    } else {
        print!("{}", cli::format_results(&results));
    }

    Ok(cli::all_succeeded(&results))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
