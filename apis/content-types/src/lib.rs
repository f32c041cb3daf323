// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Shared types for posts and categories held in the content store.
//!
//! These mirror the document shapes returned by the store's query endpoint
//! (after GROQ projection) and the `set` body accepted by its patch
//! mutation. Nothing here performs I/O.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// Document identifier (`_id`) of a post
pub type PostId = String;

/// Category slug (`slug.current`), e.g. "khela-snsaara-20251116082055"
pub type CategorySlug = String;

/// Number of characters of a title shown in logs and tables
pub const TITLE_PREVIEW_CHARS: usize = 50;

// ============================================================================
// Categories
// ============================================================================

/// A category document as projected by `{ _id, "slug": slug.current }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Document identifier, used as the reference target
    #[serde(rename = "_id")]
    pub id: String,
    /// Category slug; categories created without one project to null
    #[serde(default)]
    pub slug: Option<CategorySlug>,
}

/// A strong reference from a post to a category document.
///
/// Serializes as `{"_type": "reference", "_ref": "<id>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(rename = "_type")]
    pub ref_type: String,
    #[serde(rename = "_ref")]
    pub id: String,
}

impl CategoryRef {
    /// Create a reference to the category with document id `id`
    pub fn to(id: impl Into<String>) -> Self {
        Self {
            ref_type: "reference".to_string(),
            id: id.into(),
        }
    }
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        CategoryRef::to(category.id.clone())
    }
}

// ============================================================================
// Content Blocks
// ============================================================================

/// One typed unit of rich content inside a post's `content` array.
///
/// Block kinds this crate does not know about deserialize to [`Other`] so a
/// single unusual block never fails a whole fetch.
///
/// [`Other`]: ContentBlock::Other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum ContentBlock {
    /// Paragraph / heading text made of spans
    #[serde(rename = "block")]
    Text(TextBlock),
    /// Single uploaded image
    #[serde(rename = "cloudinaryImage")]
    Image(ImageBlock),
    /// Image gallery
    #[serde(rename = "gallery")]
    Gallery(GalleryBlock),
    #[serde(rename = "youtube")]
    Youtube(VideoBlock),
    #[serde(rename = "videoEmbed")]
    VideoEmbed(VideoBlock),
    #[serde(rename = "video")]
    Video(VideoBlock),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<Span>>,
}

impl TextBlock {
    /// Concatenated text of all spans in this block
    pub fn text(&self) -> String {
        self.children
            .iter()
            .flatten()
            .filter_map(|span| span.text.as_deref())
            .collect()
    }
}

/// A run of text inside a [`TextBlock`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryBlock {
    #[serde(default)]
    pub images: Option<Vec<ImageBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoBlock {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

// ============================================================================
// Posts
// ============================================================================

/// A post document as projected by the redistribution query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: PostId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    /// Ordered rich content; block order is never changed by these tools
    #[serde(default)]
    pub content: Option<Vec<ContentBlock>>,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub main_image_alt: Option<String>,
    #[serde(default)]
    pub main_image_caption: Option<String>,
}

/// Main image fields derived from the first image block of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedImage {
    pub url: String,
    pub alt: String,
    pub caption: String,
}

impl Post {
    fn blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content.iter().flatten()
    }

    /// Whether the post already carries a non-empty main image url
    pub fn has_main_image(&self) -> bool {
        self.main_image_url
            .as_deref()
            .is_some_and(|url| !url.is_empty())
    }

    /// Text of all text blocks joined with single spaces.
    pub fn plain_text(&self) -> String {
        self.blocks()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Main image derived from the first image block. `None` when there is
    /// no image block or the first one has no url; later image blocks are
    /// never considered.
    ///
    /// The alt text falls back from the block caption to the block alt to an
    /// empty string.
    pub fn featured_image(&self) -> Option<FeaturedImage> {
        let image = self.blocks().find_map(|block| match block {
            ContentBlock::Image(image) => Some(image),
            _ => None,
        })?;
        let url = non_empty(image.url.as_deref())?;
        let caption = non_empty(image.caption.as_deref()).unwrap_or_default();
        let alt = non_empty(image.caption.as_deref())
            .or_else(|| non_empty(image.alt.as_deref()))
            .unwrap_or_default();
        Some(FeaturedImage {
            url: url.to_string(),
            alt: alt.to_string(),
            caption: caption.to_string(),
        })
    }

    /// Short human label for logs: the title, or the start of the body text
    /// when the title is empty, or the id as a last resort.
    pub fn display_title(&self) -> String {
        if let Some(title) = non_empty(self.title.as_deref()) {
            return truncate_chars(title, TITLE_PREVIEW_CHARS);
        }
        let text = self.plain_text();
        let text = text.trim();
        if text.is_empty() {
            self.id.clone()
        } else {
            truncate_chars(text, TITLE_PREVIEW_CHARS)
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Truncate to at most `max` characters (not bytes), appending "..." when
/// anything was cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

// ============================================================================
// Patches
// ============================================================================

/// The `set` body of a post patch.
///
/// The category is always written. The three main image fields are written
/// together or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub category: CategoryRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_caption: Option<String>,
}

impl PostPatch {
    /// A patch that only moves the post to `category`
    pub fn category(category: CategoryRef) -> Self {
        Self {
            category,
            main_image_url: None,
            main_image_alt: None,
            main_image_caption: None,
        }
    }

    pub fn with_image(mut self, image: FeaturedImage) -> Self {
        self.main_image_url = Some(image.url);
        self.main_image_alt = Some(image.alt);
        self.main_image_caption = Some(image.caption);
        self
    }

    pub fn has_image(&self) -> bool {
        self.main_image_url.is_some()
    }
}
