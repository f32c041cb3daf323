// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Equal-share assignment of posts to target categories
//!
//! The posts are shuffled, then the shuffled sequence is cut into
//! `targets.len()` contiguous buckets of `n / targets.len()` posts. Bucket
//! `k` goes to `targets[k]`. The `n % targets.len()` posts left over after
//! the last full bucket all join the final category; this is a prefix
//! partition of the permutation, not round-robin.
//!
//! Bucket sizes depend only on `(n, targets.len())`; the shuffle only
//! decides membership.

use content_types::{CategorySlug, Post, PostId, PostPatch};
use indexmap::IndexMap;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::categories::CategoryMap;

/// Emit a progress line every this many posts
const PROGRESS_INTERVAL: usize = 100;

/// Distribution errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DistributeError {
    #[error("no target categories given")]
    NoTargets,

    /// More target categories than posts would make the bucket size zero
    #[error("cannot split {records} post(s) across {targets} categories: fewer posts than categories")]
    NotEnoughRecords { records: usize, targets: usize },
}

/// One pending patch: move `post_id` to `category`, maybe with image fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInstruction {
    pub post_id: PostId,
    /// Display label used in logs
    pub title: String,
    pub category: CategorySlug,
    pub patch: PostPatch,
}

/// A post assigned to a slug that had no loaded category reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPost {
    pub post_id: PostId,
    pub title: String,
    pub category: CategorySlug,
}

/// Result of [`distribute`]
#[derive(Debug, Clone, Default)]
pub struct DistributionPlan {
    /// Pending patches in shuffled order
    pub instructions: Vec<UpdateInstruction>,
    /// Posts assigned per target slug, in target order. Includes skipped
    /// posts, so it always reflects the bucket shape.
    pub tally: IndexMap<CategorySlug, usize>,
    pub skipped: Vec<SkippedPost>,
    pub bucket_size: usize,
}

impl DistributionPlan {
    /// Number of instructions that also backfill the main image
    pub fn image_backfills(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| i.patch.has_image())
            .count()
    }
}

/// Uniformly random permutation of `items` (Durstenfeld's Fisher-Yates).
///
/// The input is left untouched; the permutation is built on a copy.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Bucket of the post at shuffled `position`. Positions past the last full
/// bucket are clamped into the final one.
///
/// `bucket_size` and `target_count` must both be non-zero.
pub fn bucket_index(position: usize, bucket_size: usize, target_count: usize) -> usize {
    debug_assert!(bucket_size > 0 && target_count > 0);
    (position / bucket_size).min(target_count - 1)
}

/// Build the patch list that spreads `posts` across `targets`.
///
/// Posts without a main image get one backfilled from their first image
/// block. Posts assigned to a slug missing from `categories` are reported in
/// [`DistributionPlan::skipped`] instead of producing an instruction.
///
/// An empty `posts` slice yields an empty plan. Fewer posts than targets is
/// an error.
pub fn distribute<R: Rng + ?Sized>(
    posts: &[Post],
    targets: &[CategorySlug],
    categories: &CategoryMap,
    rng: &mut R,
) -> Result<DistributionPlan, DistributeError> {
    if targets.is_empty() {
        return Err(DistributeError::NoTargets);
    }

    let mut plan = DistributionPlan {
        tally: targets.iter().map(|slug| (slug.clone(), 0)).collect(),
        ..Default::default()
    };

    if posts.is_empty() {
        return Ok(plan);
    }

    if targets.len() > posts.len() {
        return Err(DistributeError::NotEnoughRecords {
            records: posts.len(),
            targets: targets.len(),
        });
    }

    let refs: Vec<&Post> = posts.iter().collect();
    let shuffled = shuffle(&refs, rng);
    let total = shuffled.len();
    plan.bucket_size = total / targets.len();

    debug!(
        posts = total,
        targets = targets.len(),
        bucket_size = plan.bucket_size,
        "Distributing posts"
    );

    for (position, post) in shuffled.into_iter().enumerate() {
        if (position + 1) % PROGRESS_INTERVAL == 0 {
            debug!("Processed {}/{} posts", position + 1, total);
        }

        let slug = &targets[bucket_index(position, plan.bucket_size, targets.len())];
        *plan.tally.entry(slug.clone()).or_insert(0) += 1;

        let Some(category) = categories.get(slug) else {
            warn!(post_id = %post.id, category = %slug, "Category not loaded, skipping post");
            plan.skipped.push(SkippedPost {
                post_id: post.id.clone(),
                title: post.display_title(),
                category: slug.clone(),
            });
            continue;
        };

        let mut patch = PostPatch::category(category.clone());
        if !post.has_main_image()
            && let Some(image) = post.featured_image()
        {
            patch = patch.with_image(image);
        }

        plan.instructions.push(UpdateInstruction {
            post_id: post.id.clone(),
            title: post.display_title(),
            category: slug.clone(),
            patch,
        });
    }

    Ok(plan)
}
