// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

// Allow expect/unwrap in tests - they provide clear panic messages on failure
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Updater and full-run tests against an in-memory content store.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use content_types::{Category, CategoryRef, ContentBlock, ImageBlock, Post, PostPatch};
use post_redistributor::{
    CategoryMap, JobError, JobOptions, UpdateInstruction, UpdateReport, apply_updates, run,
};
use pretty_assertions::assert_eq;
use sanity_client::{ContentStore, StoreError};
use test_case::test_case;

/// In-memory store that records patches and the peak number of concurrent
/// patch calls.
#[derive(Default)]
struct MockStore {
    categories: Vec<Category>,
    posts: Vec<Post>,
    failing_ids: HashSet<String>,
    fail_categories: bool,
    patch_delay: Duration,
    patches: Mutex<HashMap<String, PostPatch>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockStore {
    fn with_posts(categories: &[(&str, &str)], posts: Vec<Post>) -> Self {
        Self {
            categories: categories
                .iter()
                .map(|(id, slug)| Category {
                    id: id.to_string(),
                    slug: Some(slug.to_string()),
                })
                .collect(),
            posts,
            ..Default::default()
        }
    }

    fn patches(&self) -> HashMap<String, PostPatch> {
        self.patches.lock().unwrap().clone()
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MockStore {
    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        if self.fail_categories {
            return Err(StoreError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.categories.clone())
    }

    async fn fetch_posts_in_category(&self, _slug: &str) -> Result<Vec<Post>, StoreError> {
        Ok(self.posts.clone())
    }

    async fn patch_post(&self, id: &str, patch: &PostPatch) -> Result<(), StoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.patch_delay.is_zero() {
            tokio::time::sleep(self.patch_delay).await;
        }

        let result = if self.failing_ids.contains(id) {
            Err(StoreError::Status {
                status: 409,
                body: "revision mismatch".to_string(),
            })
        } else {
            self.patches
                .lock()
                .unwrap()
                .insert(id.to_string(), patch.clone());
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn post(n: usize) -> Post {
    Post {
        id: format!("post-{n}"),
        title: Some(format!("समाचार {n}")),
        ..Default::default()
    }
}

fn instruction(n: usize) -> UpdateInstruction {
    UpdateInstruction {
        post_id: format!("post-{n}"),
        title: format!("समाचार {n}"),
        category: "target".to_string(),
        patch: PostPatch::category(CategoryRef::to("cat-target")),
    }
}

fn options(targets: &[&str]) -> JobOptions {
    JobOptions {
        targets: targets.iter().map(|s| s.to_string()).collect(),
        apply_delay: Duration::ZERO,
        seed: Some(42),
        ..Default::default()
    }
}

const TARGETS: [(&str, &str); 5] = [
    ("cat-1", "jayapura"),
    ("cat-2", "nagar"),
    ("cat-3", "khel"),
    ("cat-4", "photo"),
    ("cat-5", "english"),
];

fn target_slugs() -> Vec<&'static str> {
    TARGETS.iter().map(|(_, slug)| *slug).collect()
}

#[test_case(23, 10, 3; "two full batches and a partial")]
#[test_case(20, 10, 2; "exact batches")]
#[test_case(5, 10, 1; "single short batch")]
#[test_case(4, 1, 4; "serial")]
#[tokio::test]
async fn test_batches_are_counted(count: usize, batch_size: usize, batches: usize) {
    let store = Arc::new(MockStore::default());
    let instructions = (0..count).map(instruction).collect();

    let report = apply_updates(store.clone(), instructions, batch_size).await;

    assert_eq!(report.total(), count);
    assert_eq!(store.patches().len(), count);
    assert_eq!(report.batches, batches);
}

#[tokio::test]
async fn test_failures_do_not_stop_the_run() {
    let store = Arc::new(MockStore {
        failing_ids: ["post-3", "post-17"].iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    });
    let instructions = (0..23).map(instruction).collect();

    let report = apply_updates(store.clone(), instructions, 10).await;

    assert_eq!(
        report,
        UpdateReport {
            succeeded: 21,
            images_added: 0,
            failed: 2,
            batches: 3,
        }
    );
    let patched = store.patches();
    assert!(!patched.contains_key("post-3"));
    assert!(patched.contains_key("post-22"));
}

#[tokio::test]
async fn test_concurrency_bounded_by_batch_size() {
    let store = Arc::new(MockStore {
        patch_delay: Duration::from_millis(20),
        ..Default::default()
    });
    let instructions = (0..25).map(instruction).collect();

    let report = apply_updates(store.clone(), instructions, 4).await;

    assert_eq!(report.succeeded, 25);
    assert!(
        store.max_in_flight() <= 4,
        "saw {} concurrent patches",
        store.max_in_flight()
    );
}

#[tokio::test]
async fn test_oversized_batch_size_is_clamped() {
    let store = Arc::new(MockStore::default());
    let instructions = (0..3).map(instruction).collect();

    let report = apply_updates(store.clone(), instructions, usize::MAX).await;

    assert_eq!(report.succeeded, 3);
    assert_eq!(report.batches, 1);
}

#[tokio::test]
async fn test_empty_instruction_list() {
    let store = Arc::new(MockStore::default());
    let report = apply_updates(store, Vec::new(), 10).await;
    assert_eq!(report, UpdateReport::default());
}

#[tokio::test]
async fn test_run_moves_every_post() {
    let store = Arc::new(MockStore::with_posts(
        &TARGETS,
        (0..23).map(post).collect(),
    ));

    let outcome = run(store.clone(), &options(&target_slugs())).await.unwrap();

    assert_eq!(outcome.fetched, 23);
    assert_eq!(outcome.seed, 42);
    assert_eq!(
        outcome.plan.tally.values().copied().collect::<Vec<_>>(),
        vec![4, 4, 4, 4, 7]
    );

    let report = outcome.report.expect("updates were applied");
    assert_eq!(report.succeeded, 23);
    assert_eq!(report.failed, 0);

    // Each patch points at the category its bucket was assigned
    let expected: HashMap<String, CategoryRef> = TARGETS
        .iter()
        .map(|(id, slug)| (slug.to_string(), CategoryRef::to(*id)))
        .collect();
    let patches = store.patches();
    assert_eq!(patches.len(), 23);
    for instruction in &outcome.plan.instructions {
        assert_eq!(
            patches[&instruction.post_id].category,
            expected[&instruction.category]
        );
    }
}

#[tokio::test]
async fn test_run_backfills_featured_images() {
    let mut with_body_image = post(1);
    with_body_image.content = Some(vec![ContentBlock::Image(ImageBlock {
        url: Some("https://img/1.jpg".to_string()),
        alt: Some("alt".to_string()),
        caption: None,
    })]);
    let store = Arc::new(MockStore::with_posts(
        &[("cat-1", "jayapura")],
        vec![with_body_image, post(2)],
    ));

    let outcome = run(store.clone(), &options(&["jayapura"])).await.unwrap();

    assert_eq!(outcome.report.map(|r| r.images_added), Some(1));
    let patch = &store.patches()["post-1"];
    assert_eq!(patch.main_image_url.as_deref(), Some("https://img/1.jpg"));
    assert_eq!(patch.main_image_alt.as_deref(), Some("alt"));
    assert_eq!(patch.main_image_caption.as_deref(), Some(""));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let store = Arc::new(MockStore::with_posts(
        &TARGETS,
        (0..12).map(post).collect(),
    ));
    let mut options = options(&target_slugs());
    options.dry_run = true;

    let outcome = run(store.clone(), &options).await.unwrap();

    assert_eq!(outcome.plan.instructions.len(), 12);
    assert!(outcome.report.is_none());
    assert!(store.patches().is_empty());
}

#[tokio::test]
async fn test_category_failure_aborts_before_patching() {
    let store = Arc::new(MockStore {
        fail_categories: true,
        posts: (0..10).map(post).collect(),
        ..Default::default()
    });

    let err = run(store.clone(), &options(&target_slugs()))
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::LoadCategories(_)));
    assert!(store.patches().is_empty());
}

#[tokio::test]
async fn test_unresolved_target_skips_its_bucket() {
    // "photo" has no category document
    let categories: Vec<(&str, &str)> = TARGETS
        .iter()
        .copied()
        .filter(|(_, slug)| *slug != "photo")
        .collect();
    let store = Arc::new(MockStore::with_posts(
        &categories,
        (0..10).map(post).collect(),
    ));

    let outcome = run(store.clone(), &options(&target_slugs())).await.unwrap();

    assert_eq!(outcome.plan.skipped.len(), 2);
    assert_eq!(outcome.plan.instructions.len(), 8);
    assert_eq!(store.patches().len(), 8);
    assert_eq!(outcome.plan.tally.get("photo"), Some(&2));
}

#[tokio::test]
async fn test_more_targets_than_posts_is_fatal() {
    let store = Arc::new(MockStore::with_posts(&TARGETS, (0..3).map(post).collect()));

    let err = run(store.clone(), &options(&target_slugs()))
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Distribute(_)));
    assert!(store.patches().is_empty());
}

#[tokio::test]
async fn test_empty_source_category() {
    let store = Arc::new(MockStore::with_posts(&TARGETS, Vec::new()));

    let outcome = run(store.clone(), &options(&target_slugs())).await.unwrap();

    assert_eq!(outcome.fetched, 0);
    assert!(outcome.report.is_none());
}

#[test]
fn test_category_map_from_store_documents() {
    let map = CategoryMap::from_categories(vec![Category {
        id: "cat-1".to_string(),
        slug: Some("jayapura".to_string()),
    }]);
    assert_eq!(map.missing(&["jayapura".to_string(), "x".to_string()]), vec!["x"]);
}
