// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! redistribute-posts
//!
//! Spreads the posts of one category evenly and randomly across a set of
//! target categories. Credentials and options come from flags or the
//! environment; run with `--help` for the full list.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use post_redistributor::{Args, RedistributorConfig, run};
use sanity_client::{ContentStore, SanityClient};
use tracing::{info, warn};

const DEFAULT_LOG_FILTER: &str = "post_redistributor=info,sanity_client=info";

fn print_version() {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let buildstamp = option_env!("STAMP").unwrap_or("no-STAMP");
    println!("{} {} ({})", name, version, buildstamp);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the summary tables
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        ))
        .with_writer(std::io::stderr)
        .init();

    print_version();

    let config = RedistributorConfig::from_args(args).context("Invalid configuration")?;

    info!(
        base_url = %config.store.base_url(),
        dataset = %config.store.dataset,
        source = %config.job.source_category,
        targets = config.job.targets.len(),
        dry_run = config.job.dry_run,
        "Starting post redistribution"
    );

    let client =
        SanityClient::new(&config.store).context("Failed to create content store client")?;
    let store: Arc<dyn ContentStore> = Arc::new(client);

    let outcome = run(store, &config.job)
        .await
        .context("Redistribution failed")?;

    if let Some(report) = outcome.report
        && report.failed > 0
    {
        warn!(
            failed = report.failed,
            "Some posts were not updated; rerun to redistribute the remaining posts"
        );
    }

    Ok(())
}
