//! tdq - submit a query to a hosted analytics engine and fetch the result.

use td_query::cli::Cli;
use td_query::config::ApiConfig;
use td_query::error::Result;
use td_query::{client, logging, runner};
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    // Usage errors exit from inside parse_args with the user-error code
    let cli = Cli::parse_args();

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config()?;
    let api = ApiConfig::from_env()?;

    let client = client::connect(&api).await?;
    let out_dir = std::env::current_dir()?;

    // run() closes the client exactly once on every path
    runner::run(client.as_ref(), &config, &out_dir).await?;
    Ok(())
}
