// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Category lookup
//!
//! Categories are loaded once per run and never change while it lasts.

use std::collections::HashMap;

use content_types::{Category, CategoryRef, CategorySlug};
use sanity_client::{ContentStore, StoreError};
use tracing::{debug, info};

/// Map from category slug to the reference a post patch links to.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    refs: HashMap<CategorySlug, CategoryRef>,
}

impl CategoryMap {
    /// Build the map, ignoring categories without a slug. When two
    /// categories share a slug the later one wins.
    pub fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut refs = HashMap::new();
        for category in categories {
            let Some(slug) = category.slug.as_deref().filter(|s| !s.is_empty()) else {
                debug!(category_id = %category.id, "Ignoring category without slug");
                continue;
            };
            refs.insert(slug.to_string(), CategoryRef::from(&category));
        }
        Self { refs }
    }

    pub fn get(&self, slug: &str) -> Option<&CategoryRef> {
        self.refs.get(slug)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Target slugs that have no loaded reference, in target order
    pub fn missing<'a>(&self, targets: &'a [CategorySlug]) -> Vec<&'a str> {
        targets
            .iter()
            .filter(|slug| !self.refs.contains_key(slug.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Load every category from the store.
///
/// Any store failure is returned as-is; callers must abort rather than
/// continue with a partial map.
pub async fn load_categories(store: &dyn ContentStore) -> Result<CategoryMap, StoreError> {
    let categories = store.fetch_categories().await?;
    let fetched = categories.len();
    let map = CategoryMap::from_categories(categories);

    info!(fetched, usable = map.len(), "Loaded categories");

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn category(id: &str, slug: Option<&str>) -> Category {
        Category {
            id: id.to_string(),
            slug: slug.map(str::to_string),
        }
    }

    #[test]
    fn test_map_skips_missing_slugs() {
        let map = CategoryMap::from_categories(vec![
            category("c1", Some("jaipur")),
            category("c2", None),
            category("c3", Some("")),
        ]);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("jaipur"), Some(&CategoryRef::to("c1")));
    }

    #[test]
    fn test_duplicate_slug_last_wins() {
        let map = CategoryMap::from_categories(vec![
            category("c1", Some("jaipur")),
            category("c2", Some("jaipur")),
        ]);

        assert_eq!(map.get("jaipur"), Some(&CategoryRef::to("c2")));
    }

    #[test]
    fn test_missing_targets_in_order() {
        let map = CategoryMap::from_categories(vec![category("c1", Some("b"))]);
        let targets = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        assert_eq!(map.missing(&targets), vec!["a", "c"]);
    }
}
