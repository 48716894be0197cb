mod cli;
mod config;
mod fetch;
mod fonts;
mod portal;
mod routes;
mod server;
mod util;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{cli::Cli, util::Result};

#[tokio::main]
async fn main() -> Result<()> {
  #[cfg(feature = "dotenv")]
  dotenv::dotenv().ok();

  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level)),
    )
    .init();

  cli.run().await
}
