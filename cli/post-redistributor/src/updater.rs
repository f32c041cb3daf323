// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Batched application of update instructions
//!
//! Instructions are patched in chunks of `batch_size`. Every chunk is
//! dispatched concurrently and fully drained before the next one starts, so
//! no more than `batch_size` patches are ever in flight. A failed patch is
//! logged and counted; it never stops the run.

use std::collections::HashMap;
use std::sync::Arc;

use sanity_client::ContentStore;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::distribute::UpdateInstruction;

/// Counts accumulated over one updater run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub succeeded: usize,
    /// Successful patches that also set the main image
    pub images_added: usize,
    pub failed: usize,
    pub batches: usize,
}

impl UpdateReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Result of one patch task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Updated { image_added: bool },
    Failed,
}

impl UpdateReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Updated { image_added } => {
                self.succeeded += 1;
                if image_added {
                    self.images_added += 1;
                }
            }
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// Apply every instruction to the store.
///
/// `batch_size` is clamped to `1..=Semaphore::MAX_PERMITS`.
pub async fn apply_updates(
    store: Arc<dyn ContentStore>,
    instructions: Vec<UpdateInstruction>,
    batch_size: usize,
) -> UpdateReport {
    let batch_size = batch_size.clamp(1, Semaphore::MAX_PERMITS);
    let total = instructions.len();
    let mut report = UpdateReport::default();

    info!(total, batch_size, "Applying updates");

    // Chunks never exceed batch_size, so the permits only cap a batch
    let semaphore = Arc::new(Semaphore::new(batch_size));

    let mut pending = instructions.into_iter().peekable();
    while pending.peek().is_some() {
        let batch: Vec<UpdateInstruction> = pending.by_ref().take(batch_size).collect();
        report.batches += 1;

        debug!(batch = report.batches, size = batch.len(), "Dispatching batch");

        let mut tasks: JoinSet<Outcome> = JoinSet::new();
        // Lets a panicked task still be attributed to its post
        let mut in_flight = HashMap::new();

        for instruction in batch {
            let sem = Arc::clone(&semaphore);
            let store = Arc::clone(&store);
            let label = (instruction.post_id.clone(), instruction.title.clone());

            let handle = tasks.spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    error!(post_id = %instruction.post_id, "Semaphore closed, skipping post");
                    return Outcome::Failed;
                };
                patch_one(store.as_ref(), &instruction).await
            });
            in_flight.insert(handle.id(), label);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, outcome)) => {
                    in_flight.remove(&id);
                    report.record(outcome);
                }
                Err(e) => {
                    let (post_id, title) = in_flight.remove(&e.id()).unwrap_or_default();
                    error!(
                        post_id = %post_id,
                        title = %title,
                        error = %e,
                        "Update task panicked"
                    );
                    report.record(Outcome::Failed);
                }
            }
        }

        info!("Updated {}/{} posts", report.total(), total);
    }

    info!(
        succeeded = report.succeeded,
        images_added = report.images_added,
        failed = report.failed,
        "Updates complete"
    );

    report
}

async fn patch_one(store: &dyn ContentStore, instruction: &UpdateInstruction) -> Outcome {
    match store
        .patch_post(&instruction.post_id, &instruction.patch)
        .await
    {
        Ok(()) => {
            debug!(
                post_id = %instruction.post_id,
                category = %instruction.category,
                "Post updated"
            );
            Outcome::Updated {
                image_added: instruction.patch.has_image(),
            }
        }
        Err(e) => {
            error!(
                post_id = %instruction.post_id,
                title = %instruction.title,
                error = %e,
                "Failed to update post"
            );
            Outcome::Failed
        }
    }
}
