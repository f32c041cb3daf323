// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! One end-to-end redistribution run

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sanity_client::{ContentStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use crate::categories::load_categories;
use crate::config::JobOptions;
use crate::distribute::{DistributeError, DistributionPlan, distribute};
use crate::output;
use crate::updater::{UpdateReport, apply_updates};

/// Fatal job errors. Per-post patch failures are counted, not raised.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to load categories: {0}")]
    LoadCategories(#[source] StoreError),

    #[error("failed to fetch posts in category {category}: {source}")]
    FetchPosts {
        category: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Distribute(#[from] DistributeError),

    #[error("interrupted before any update was applied")]
    Interrupted,
}

/// What a run did
#[derive(Debug)]
pub struct JobOutcome {
    /// Posts found in the source category
    pub fetched: usize,
    pub seed: u64,
    pub plan: DistributionPlan,
    /// `None` for dry runs and when there was nothing to update
    pub report: Option<UpdateReport>,
}

/// Load, distribute and (unless dry-running) apply.
pub async fn run(
    store: Arc<dyn ContentStore>,
    options: &JobOptions,
) -> Result<JobOutcome, JobError> {
    let categories = load_categories(store.as_ref())
        .await
        .map_err(JobError::LoadCategories)?;

    let missing = categories.missing(&options.targets);
    if !missing.is_empty() {
        warn!(missing = ?missing, "Target categories not found; their posts will be skipped");
    }

    let posts = store
        .fetch_posts_in_category(&options.source_category)
        .await
        .map_err(|source| JobError::FetchPosts {
            category: options.source_category.clone(),
            source,
        })?;

    info!(
        source = %options.source_category,
        posts = posts.len(),
        "Fetched posts to redistribute"
    );

    // Log the seed so a run can be replayed with --seed
    let seed = options.seed.unwrap_or_else(|| StdRng::from_os_rng().random());
    info!(seed, "Shuffling posts");
    let mut rng = StdRng::seed_from_u64(seed);

    let plan = distribute(&posts, &options.targets, &categories, &mut rng)?;
    output::print_distribution(&plan);

    let mut outcome = JobOutcome {
        fetched: posts.len(),
        seed,
        plan,
        report: None,
    };

    if outcome.plan.instructions.is_empty() {
        info!("Nothing to update");
        return Ok(outcome);
    }

    if options.dry_run {
        output::print_plan(&outcome.plan);
        info!("Dry run, no posts were changed");
        return Ok(outcome);
    }

    wait_before_apply(options.apply_delay).await?;

    let report = apply_updates(
        store,
        outcome.plan.instructions.clone(),
        options.batch_size,
    )
    .await;
    output::print_report(&report);
    outcome.report = Some(report);

    Ok(outcome)
}

/// Give the operator a window to abort with Ctrl-C.
async fn wait_before_apply(delay: Duration) -> Result<(), JobError> {
    if delay.is_zero() {
        return Ok(());
    }

    println!(
        "\nApplying updates in {} seconds. Press Ctrl-C to cancel.",
        delay.as_secs()
    );

    tokio::select! {
        _ = tokio::time::sleep(delay) => Ok(()),
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                // Without a signal handler the countdown still applies
                warn!(error = %e, "Unable to listen for Ctrl-C");
                tokio::time::sleep(delay).await;
                return Ok(());
            }
            warn!("Cancelled by operator");
            Err(JobError::Interrupted)
        }
    }
}
