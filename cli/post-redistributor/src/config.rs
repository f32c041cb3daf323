// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Configuration for the redistribution job
//!
//! Every option can be given as a flag or through the environment, so the
//! job still runs as a single argument-less command once the credentials
//! are exported.

use std::collections::HashSet;
use std::time::Duration;

use clap::Parser;
use content_types::CategorySlug;
use sanity_client::SanityConfig;
use secrecy::SecretString;
use thiserror::Error;

/// Category whose posts are redistributed by default
pub const DEFAULT_SOURCE_CATEGORY: &str = "duniya-jahan";

/// Categories that receive the posts by default, in bucket order
pub const DEFAULT_TARGET_CATEGORIES: &[&str] = &[
    "jayapura-20251116081606",
    "nagardagara-20251116081650",
    "khela-snsaara-20251116082055",
    "photo-pheechara-20251116082033",
    "sangopang-english-20251116082148",
];

/// Number of patches dispatched together
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 1000;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_APPLY_DELAY_SECS: u64 = 5;

fn default_targets() -> Vec<String> {
    DEFAULT_TARGET_CATEGORIES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "redistribute-posts")]
#[command(about = "Randomly redistribute the posts of one category across target categories")]
#[command(version)]
pub struct Args {
    /// Content store project id
    #[arg(long, env = "SANITY_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Dataset holding the posts
    #[arg(long, env = "SANITY_DATASET", default_value = "production")]
    pub dataset: String,

    /// Dated API version
    #[arg(long, env = "SANITY_API_VERSION", default_value = "2024-01-01")]
    pub api_version: String,

    /// API token with write access
    #[arg(long, env = "SANITY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Override the API base URL (derived from the project id by default)
    #[arg(long, env = "SANITY_API_URL")]
    pub api_url: Option<String>,

    /// Slug of the category whose posts are redistributed
    #[arg(long, env = "SOURCE_CATEGORY", default_value = DEFAULT_SOURCE_CATEGORY)]
    pub source_category: String,

    /// Comma-separated target category slugs, in bucket order
    #[arg(
        long = "targets",
        env = "TARGET_CATEGORIES",
        value_delimiter = ',',
        default_values_t = default_targets()
    )]
    pub targets: Vec<String>,

    /// Number of patches dispatched concurrently per batch
    #[arg(long, env = "BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,

    /// Seconds to wait between printing the plan and applying it
    #[arg(long, env = "APPLY_DELAY_SECS", default_value_t = DEFAULT_APPLY_DELAY_SECS)]
    pub apply_delay_secs: u64,

    /// Seed for the shuffle; a fresh random seed is used when unset
    #[arg(long, env = "REDISTRIBUTE_SEED")]
    pub seed: Option<u64>,

    /// Print the plan without patching anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API token is required (set SANITY_TOKEN or pass --token)")]
    MissingToken,

    #[error("project id is required (set SANITY_PROJECT_ID or pass --project-id)")]
    MissingProject,

    #[error("source category must not be empty")]
    EmptySourceCategory,

    #[error("at least one target category is required")]
    NoTargets,

    #[error("target category listed more than once: {0}")]
    DuplicateTarget(String),

    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("batch size {0} exceeds the maximum of {MAX_BATCH_SIZE}")]
    BatchSizeTooLarge(usize),
}

/// Options that drive one redistribution run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOptions {
    pub source_category: CategorySlug,
    pub targets: Vec<CategorySlug>,
    pub batch_size: usize,
    pub apply_delay: Duration,
    pub seed: Option<u64>,
    pub dry_run: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            source_category: DEFAULT_SOURCE_CATEGORY.to_string(),
            targets: default_targets(),
            batch_size: DEFAULT_BATCH_SIZE,
            apply_delay: Duration::from_secs(DEFAULT_APPLY_DELAY_SECS),
            seed: None,
            dry_run: false,
        }
    }
}

/// Validated configuration
#[derive(Debug)]
pub struct RedistributorConfig {
    pub store: SanityConfig,
    pub job: JobOptions,
}

impl RedistributorConfig {
    /// Validate parsed arguments
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let token = args
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let project_id = args.project_id.unwrap_or_default().trim().to_string();
        let api_url = args.api_url.filter(|u| !u.trim().is_empty());
        if project_id.is_empty() && api_url.is_none() {
            return Err(ConfigError::MissingProject);
        }

        let source_category = args.source_category.trim().to_string();
        if source_category.is_empty() {
            return Err(ConfigError::EmptySourceCategory);
        }

        // A trailing comma in TARGET_CATEGORIES yields empty entries
        let targets: Vec<CategorySlug> = args
            .targets
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let mut seen = HashSet::new();
        for target in &targets {
            if !seen.insert(target.as_str()) {
                return Err(ConfigError::DuplicateTarget(target.clone()));
            }
        }

        if args.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if args.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::BatchSizeTooLarge(args.batch_size));
        }

        Ok(Self {
            store: SanityConfig {
                project_id,
                dataset: args.dataset,
                api_version: args.api_version,
                token: SecretString::from(token),
                api_url,
                timeout_secs: args.http_timeout_secs,
            },
            job: JobOptions {
                source_category,
                targets,
                batch_size: args.batch_size,
                apply_delay: Duration::from_secs(args.apply_delay_secs),
                seed: args.seed,
                dry_run: args.dry_run,
            },
        })
    }
}
