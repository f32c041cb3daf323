// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Post redistribution
//!
//! Moves every post of a source category into a fixed list of target
//! categories in equal random shares. A run:
//!
//! - loads the category references from the content store
//! - fetches the posts of the source category
//! - shuffles them and cuts the permutation into one bucket per target,
//!   backfilling a main image from the post body where one is missing
//! - patches the posts in bounded concurrent batches
//!
//! The store sits behind [`sanity_client::ContentStore`], so every stage
//! can run against an in-memory store in tests.

pub mod categories;
pub mod config;
pub mod distribute;
pub mod job;
pub mod output;
pub mod updater;

pub use categories::{CategoryMap, load_categories};
pub use config::{Args, ConfigError, JobOptions, RedistributorConfig};
pub use distribute::{
    DistributeError, DistributionPlan, SkippedPost, UpdateInstruction, bucket_index, distribute,
    shuffle,
};
pub use job::{JobError, JobOutcome, run};
pub use updater::{UpdateReport, apply_updates};
