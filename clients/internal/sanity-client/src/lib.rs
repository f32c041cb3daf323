// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Content store client
//!
//! A small async client for the hosted content store's HTTP API, plus the
//! [`ContentStore`] trait the maintenance tools are written against. The
//! trait is the seam tests use to substitute an in-memory store.
//!
//! Only two endpoints are used:
//!
//! - `GET  /v{apiVersion}/data/query/{dataset}` runs a GROQ query
//! - `POST /v{apiVersion}/data/mutate/{dataset}` commits a transaction

mod client;

pub use client::{MutateResponse, MutateResult, SanityClient, SanityConfig};

use async_trait::async_trait;
use content_types::{Category, Post, PostPatch};
use thiserror::Error;

/// Characters of an error response body kept in [`StoreError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 512;

/// GROQ projection for every category with its slug
pub const CATEGORIES_QUERY: &str = r#"*[_type == "category"] { _id, "slug": slug.current }"#;

/// GROQ projection for the posts of one category, bound to `$source`
pub const POSTS_IN_CATEGORY_QUERY: &str = r#"*[_type == "post" && category->slug.current == $source] {
  _id,
  title,
  content,
  mainImageUrl,
  mainImageAlt,
  mainImageCaption,
  "slug": slug.current
}"#;

/// Content store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid store URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn status(status: u16, body: &str) -> Self {
        StoreError::Status {
            status,
            body: content_types::truncate_chars(body, MAX_ERROR_BODY_CHARS),
        }
    }
}

/// Operations the redistribution tools need from the content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every category document.
    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Every post whose category reference resolves to `slug`.
    async fn fetch_posts_in_category(&self, slug: &str) -> Result<Vec<Post>, StoreError>;

    /// Set the fields in `patch` on post `id`, committed atomically.
    async fn patch_post(&self, id: &str, patch: &PostPatch) -> Result<(), StoreError>;
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.query(CATEGORIES_QUERY, &[]).await
    }

    async fn fetch_posts_in_category(&self, slug: &str) -> Result<Vec<Post>, StoreError> {
        self.query(POSTS_IN_CATEGORY_QUERY, &[("source", slug)])
            .await
    }

    async fn patch_post(&self, id: &str, patch: &PostPatch) -> Result<(), StoreError> {
        let response = self.patch_set(id, patch).await?;
        tracing::debug!(
            post_id = %id,
            transaction_id = %response.transaction_id,
            "Patched post"
        );
        Ok(())
    }
}
