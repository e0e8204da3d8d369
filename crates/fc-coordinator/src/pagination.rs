//! Cursor pagination resolver
//!
//! Provides [`CursorPagination`], which answers a read of a paginated root
//! field by stitching together every page recorded for that field, whatever
//! arguments each page was fetched with.
//!
//! # Resolution
//! 1. No page recorded for the field: [`Resolution::Miss`]
//! 2. Otherwise the items of all pages are concatenated in recording order
//!    (no de-duplication, evicted entities skipped)
//! 3. `has_more` is false once any page reports `hasMore: false`
//! 4. `partial` is set when the page for the requested arguments itself is
//!    not cached yet

use crate::documents::{PAGINATED_POSTS, PAGINATED_REPLIES, POSTS_FIELD, REPLIES_FIELD};
use fc_store::{fields_named, Arguments, Cache, EntityKey, FieldKey, FieldValue, Link};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const HAS_MORE: &str = "hasMore";
const TYPENAME: &str = "__typename";

/// Where later pages go relative to earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Later pages are prepended
    Before,
    /// Later pages are appended
    #[default]
    After,
}

/// Shape of one paginated root field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Root field holding the pages, e.g. `posts`
    pub field_name: String,
    /// Typename of the page aggregate, e.g. `PaginatedPosts`
    pub typename: String,
    /// List field inside each page
    pub list_field: String,
    /// Page merge order
    #[serde(default)]
    pub merge_mode: MergeMode,
}

impl PaginationConfig {
    /// Create config for `field_name` whose pages are `typename { list_field hasMore }`
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        typename: impl Into<String>,
        list_field: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            typename: typename.into(),
            list_field: list_field.into(),
            merge_mode: MergeMode::default(),
        }
    }

    /// `posts` → `PaginatedPosts { posts hasMore }`
    #[must_use]
    pub fn posts() -> Self {
        Self::new(POSTS_FIELD, PAGINATED_POSTS, POSTS_FIELD)
    }

    /// `replies` → `PaginatedReplies { replies hasMore }`
    #[must_use]
    pub fn replies() -> Self {
        Self::new(REPLIES_FIELD, PAGINATED_REPLIES, REPLIES_FIELD)
    }

    /// With merge mode
    #[inline]
    #[must_use]
    pub fn with_merge_mode(mut self, merge_mode: MergeMode) -> Self {
        self.merge_mode = merge_mode;
        self
    }
}

/// Synthesized aggregate of all cached pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedResult {
    /// Typename of the aggregate
    pub typename: String,
    /// Name of the list field in the response
    pub list_field: String,
    /// Entity keys of every page, merged
    pub items: Vec<EntityKey>,
    /// Whether the server may have more items
    pub has_more: bool,
}

/// Outcome of resolving a paginated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing cached for the field; fetch from the network
    Miss,
    /// Cached pages merged
    Hit {
        /// Merged result
        result: PaginatedResult,
        /// The requested page is not cached yet; refetch in the background
        partial: bool,
    },
}

impl Resolution {
    /// Whether this is a miss
    #[inline]
    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }
}

/// Resolver merging every cached page of a root field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPagination {
    config: PaginationConfig,
}

impl CursorPagination {
    /// Create resolver
    #[inline]
    #[must_use]
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    /// Resolver configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Resolve the field on `parent` for the requested `arguments`
    #[must_use]
    pub fn resolve(&self, cache: &dyn Cache, parent: &EntityKey, arguments: &Arguments) -> Resolution {
        let field_name = self.config.field_name.as_str();
        let recorded = fields_named(cache, parent, field_name);
        if recorded.is_empty() {
            tracing::trace!(parent = %parent, field = field_name, "no pages cached");
            return Resolution::Miss;
        }

        let requested = FieldKey::new(field_name, arguments.clone());
        let partial = self.page_items(cache, parent, &requested).is_none();

        let mut has_more = true;
        let mut items: Vec<EntityKey> = Vec::new();
        for info in &recorded {
            let Some(page) = cache
                .resolve(parent, &info.field_key)
                .and_then(|value| value.as_entity().cloned())
            else {
                continue;
            };

            let page_has_more = cache
                .resolve(&page, &FieldKey::plain(HAS_MORE))
                .and_then(|value| value.as_bool());
            if page_has_more == Some(false) {
                has_more = false;
            }

            let Some(page_items) = self.page_items(cache, parent, &info.field_key) else {
                continue;
            };
            let page_items = page_items.into_iter().filter(|key| is_cached(cache, key));
            match self.config.merge_mode {
                MergeMode::After => items.extend(page_items),
                MergeMode::Before => {
                    let mut merged: Vec<EntityKey> = page_items.collect();
                    merged.append(&mut items);
                    items = merged;
                }
            }
        }

        tracing::trace!(
            parent = %parent,
            field = field_name,
            pages = recorded.len(),
            items = items.len(),
            has_more,
            partial,
            "pages merged"
        );

        Resolution::Hit {
            result: PaginatedResult {
                typename: self.config.typename.clone(),
                list_field: self.config.list_field.clone(),
                items,
                has_more,
            },
            partial,
        }
    }

    /// Item keys of the page linked from `field_key`, if that page and its list are cached
    fn page_items(
        &self,
        cache: &dyn Cache,
        parent: &EntityKey,
        field_key: &FieldKey,
    ) -> Option<Vec<EntityKey>> {
        let page = cache.resolve(parent, field_key)?.as_entity()?.clone();
        match cache.resolve(&page, &FieldKey::plain(self.config.list_field.as_str()))? {
            FieldValue::Link(Link::List(items)) => Some(items.into_iter().flatten().collect()),
            // an empty page has no objects to link
            FieldValue::Scalar(Value::Array(items)) if items.is_empty() => Some(Vec::new()),
            _ => None,
        }
    }
}

fn is_cached(cache: &dyn Cache, key: &EntityKey) -> bool {
    cache.resolve(key, &FieldKey::plain(TYPENAME)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_store::NormalizedCache;
    use serde_json::json;

    fn page_key(cursor: &str) -> EntityKey {
        EntityKey::entity("Page", cursor)
    }

    /// Record one page by hand: `Query.posts(cursor) -> Page:<cursor> { posts, hasMore }`
    fn record_page(cache: &mut NormalizedCache, cursor: &str, ids: &[u32], has_more: Option<bool>) {
        let root = EntityKey::root();
        let page = page_key(cursor);
        cache.write_field(
            &root,
            FieldKey::new("posts", Arguments::new().with("cursor", cursor)),
            FieldValue::Link(Link::Single(page.clone())),
        );
        let mut items = Vec::new();
        for id in ids {
            let key = EntityKey::entity("Post", &id.to_string());
            cache.write_field(&key, FieldKey::plain("__typename"), FieldValue::Scalar(json!("Post")));
            items.push(Some(key));
        }
        cache.write_field(&page, FieldKey::plain("posts"), FieldValue::Link(Link::List(items)));
        if let Some(has_more) = has_more {
            cache.write_field(&page, FieldKey::plain("hasMore"), FieldValue::Scalar(json!(has_more)));
        }
    }

    fn ids(resolution: &Resolution) -> Vec<String> {
        match resolution {
            Resolution::Hit { result, .. } => result.items.iter().map(|k| k.to_string()).collect(),
            Resolution::Miss => Vec::new(),
        }
    }

    fn cursor(c: &str) -> Arguments {
        Arguments::new().with("cursor", c)
    }

    #[test]
    fn miss_when_nothing_recorded() {
        let cache = NormalizedCache::new();
        let resolver = CursorPagination::new(PaginationConfig::posts());
        assert!(resolver.resolve(&cache, &EntityKey::root(), &cursor("a")).is_miss());
    }

    #[test]
    fn merges_in_recording_order_after() {
        let mut cache = NormalizedCache::new();
        record_page(&mut cache, "a", &[1, 2], Some(true));
        record_page(&mut cache, "b", &[2, 3], Some(true));

        let resolver = CursorPagination::new(PaginationConfig::posts());
        let resolution = resolver.resolve(&cache, &EntityKey::root(), &cursor("b"));
        assert_eq!(ids(&resolution), vec!["Post:1", "Post:2", "Post:2", "Post:3"]);
        assert!(matches!(resolution, Resolution::Hit { partial: false, result } if result.has_more));
    }

    #[test]
    fn merges_before_when_configured() {
        let mut cache = NormalizedCache::new();
        record_page(&mut cache, "a", &[1], Some(true));
        record_page(&mut cache, "b", &[2], Some(true));
        record_page(&mut cache, "c", &[3], Some(true));

        let resolver =
            CursorPagination::new(PaginationConfig::posts().with_merge_mode(MergeMode::Before));
        let resolution = resolver.resolve(&cache, &EntityKey::root(), &cursor("a"));
        assert_eq!(ids(&resolution), vec!["Post:3", "Post:2", "Post:1"]);
    }

    #[test]
    fn exhausted_page_clears_has_more() {
        let mut cache = NormalizedCache::new();
        record_page(&mut cache, "a", &[1], Some(false));
        record_page(&mut cache, "b", &[2], Some(true));

        let resolver = CursorPagination::new(PaginationConfig::posts());
        let Resolution::Hit { result, .. } = resolver.resolve(&cache, &EntityKey::root(), &cursor("a"))
        else {
            panic!("expected hit");
        };
        assert!(!result.has_more);
    }

    #[test]
    fn unreadable_has_more_leaves_flag_unchanged() {
        let mut cache = NormalizedCache::new();
        record_page(&mut cache, "a", &[1], None);

        let resolver = CursorPagination::new(PaginationConfig::posts());
        let Resolution::Hit { result, .. } = resolver.resolve(&cache, &EntityKey::root(), &cursor("a"))
        else {
            panic!("expected hit");
        };
        assert!(result.has_more);
    }

    #[test]
    fn partial_when_requested_page_missing() {
        let mut cache = NormalizedCache::new();
        record_page(&mut cache, "a", &[1], Some(true));

        let resolver = CursorPagination::new(PaginationConfig::posts());
        let resolution = resolver.resolve(&cache, &EntityKey::root(), &cursor("z"));
        assert_eq!(ids(&resolution), vec!["Post:1"]);
        assert!(matches!(resolution, Resolution::Hit { partial: true, .. }));
    }

    #[test]
    fn pages_without_links_are_skipped() {
        let mut cache = NormalizedCache::new();
        record_page(&mut cache, "a", &[1], Some(true));
        cache.write_field(
            &EntityKey::root(),
            FieldKey::new("posts", cursor("broken")),
            FieldValue::Scalar(json!(null)),
        );

        let resolver = CursorPagination::new(PaginationConfig::posts());
        let resolution = resolver.resolve(&cache, &EntityKey::root(), &cursor("broken"));
        assert_eq!(ids(&resolution), vec!["Post:1"]);
        assert!(matches!(resolution, Resolution::Hit { partial: true, .. }));
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config: PaginationConfig = serde_json::from_value(json!({
            "field_name": "replies",
            "typename": "PaginatedReplies",
            "list_field": "replies",
            "merge_mode": "before"
        }))
        .unwrap();
        assert_eq!(config, PaginationConfig::replies().with_merge_mode(MergeMode::Before));
    }
}
