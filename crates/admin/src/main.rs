//! `catalog-admin` -- command-line catalog administration.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                  | Description                   |
//! |------------------------|----------|--------------------------|-------------------------------|
//! | `CATALOG_API_URL`      | no       | `http://127.0.0.1:8000`  | Catalog service base URL      |
//! | `CATALOG_TIMEOUT_SECS` | no       | `30`                     | Per-request HTTP timeout      |
//! | `CATALOG_DEBOUNCE_MS`  | no       | `250`                    | Schema fetch debounce         |
//! | `RUST_LOG`             | no       | `catalog_admin=info,...` | Log filter; logs go to stderr |

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_admin::cli::Cli;
use catalog_admin::commands;
use catalog_client::{CatalogApi, ClientConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "catalog_admin=info,catalog_ui=info,catalog_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    tracing::debug!(api_url = %config.api_url, "Using catalog service");

    let api = CatalogApi::new(&config).context("Failed to build HTTP client")?;
    let mut stdout = std::io::stdout().lock();
    commands::run(cli.command, Arc::new(api), &mut stdout).await
}
