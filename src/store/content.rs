//! Owner-scoped content table.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{ContentItem, ContentType};
use crate::store::IdAllocator;

/// Default and maximum number of items returned by a listing
pub const DEFAULT_LIST_LIMIT: usize = 200;

/// Conjunctive search criteria; absent fields filter nothing
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Case-insensitive substring matched against title and body
    pub query: Option<String>,

    /// Keep items created at or after this instant
    pub from: Option<DateTime<Utc>>,

    /// Keep items created at or before this instant
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Tables {
    items: HashMap<u64, ContentItem>,
    by_owner: HashMap<u64, Vec<u64>>,
}

/// In-memory content table with a secondary owner index.
///
/// Every read, list, search, and delete filters by owner; a foreign item
/// behaves exactly like a missing one, so existence never leaks across
/// owners. Both maps mutate under one write lock, so readers never see an
/// item without its index entry.
#[derive(Debug)]
pub struct ContentStore {
    ids: IdAllocator,
    tables: RwLock<Tables>,
}

impl ContentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Insert a new item and return the full record.
    ///
    /// `owner_id` is a soft reference; its existence is deliberately not
    /// checked here.
    pub async fn create(
        &self,
        owner_id: u64,
        title: String,
        content_text: String,
        content_type: ContentType,
        source: String,
        metadata: HashMap<String, serde_json::Value>,
    ) -> ContentItem {
        let mut tables = self.tables.write().await;

        let now = Utc::now();
        let item = ContentItem {
            id: self.ids.next(),
            owner_id,
            title,
            content_text,
            content_type,
            source,
            metadata,
            created_at: now,
            updated_at: now,
        };

        tables.by_owner.entry(owner_id).or_default().push(item.id);
        tables.items.insert(item.id, item.clone());

        item
    }

    /// Fetch an item if it exists and belongs to `owner_id`.
    ///
    /// Returns `None` both for missing ids and for ids owned by someone
    /// else.
    pub async fn get_by_owner_and_id(&self, owner_id: u64, id: u64) -> Option<ContentItem> {
        let tables = self.tables.read().await;
        tables
            .items
            .get(&id)
            .filter(|item| item.owner_id == owner_id)
            .cloned()
    }

    /// List an owner's items, newest first, capped at `DEFAULT_LIST_LIMIT`.
    ///
    /// Equal timestamps are broken by id descending so the order is a
    /// deterministic total order.
    pub async fn list_by_owner(&self, owner_id: u64, limit: Option<usize>) -> Vec<ContentItem> {
        let tables = self.tables.read().await;
        let mut items = Self::owned_items(&tables, owner_id);

        items.sort_by(newest_first);
        items.truncate(limit.unwrap_or(DEFAULT_LIST_LIMIT).min(DEFAULT_LIST_LIMIT));
        items
    }

    /// Delete an item if it exists and belongs to `owner_id`.
    ///
    /// Returns whether a deletion occurred; missing or foreign ids are a
    /// no-op returning `false`, never an error.
    pub async fn delete_by_owner_and_id(&self, owner_id: u64, id: u64) -> bool {
        let mut tables = self.tables.write().await;

        let owned = tables
            .items
            .get(&id)
            .map(|item| item.owner_id == owner_id)
            .unwrap_or(false);
        if !owned {
            return false;
        }

        tables.items.remove(&id);
        if let Some(ids) = tables.by_owner.get_mut(&owner_id) {
            ids.retain(|&other| other != id);
        }
        true
    }

    /// Filter an owner's items by substring and creation-time bounds.
    ///
    /// Filters compose conjunctively; the result is ordered and capped
    /// exactly like `list_by_owner`, so an unfiltered search and a
    /// listing return the same page. Empty titles or bodies never match
    /// a query.
    pub async fn search(&self, owner_id: u64, filter: &SearchFilter) -> Vec<ContentItem> {
        let tables = self.tables.read().await;
        let mut items = Self::owned_items(&tables, owner_id);

        if let Some(query) = &filter.query {
            let needle = query.to_lowercase();
            items.retain(|item| {
                item.title.to_lowercase().contains(&needle)
                    || item.content_text.to_lowercase().contains(&needle)
            });
        }

        if let Some(from) = filter.from {
            items.retain(|item| item.created_at >= from);
        }

        if let Some(to) = filter.to {
            items.retain(|item| item.created_at <= to);
        }

        items.sort_by(newest_first);
        items.truncate(DEFAULT_LIST_LIMIT);
        items
    }

    fn owned_items(tables: &Tables, owner_id: u64) -> Vec<ContentItem> {
        tables
            .by_owner
            .get(&owner_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.items.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Created-at descending, id descending on ties
fn newest_first(a: &ContentItem, b: &ContentItem) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(store: &ContentStore, owner: u64, title: &str, body: &str) -> ContentItem {
        store
            .create(
                owner,
                title.to_string(),
                body.to_string(),
                ContentType::Text,
                String::new(),
                HashMap::new(),
            )
            .await
    }

    #[tokio::test]
    async fn test_create_allocates_increasing_ids() {
        let store = ContentStore::new();
        let a = seed(&store, 1, "first", "").await;
        let b = seed(&store, 1, "second", "").await;

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn test_ownership_isolation() {
        let store = ContentStore::new();
        let item = seed(&store, 1, "mine", "").await;

        // A foreign owner sees the item as missing, for both reads and
        // deletes.
        assert!(store.get_by_owner_and_id(2, item.id).await.is_none());
        assert!(!store.delete_by_owner_and_id(2, item.id).await);

        // And it is still there for the real owner.
        assert!(store.get_by_owner_and_id(1, item.id).await.is_some());
    }

    #[tokio::test]
    async fn test_delete_then_get_then_delete_again() {
        let store = ContentStore::new();
        let item = seed(&store, 1, "ephemeral", "").await;

        assert!(store.delete_by_owner_and_id(1, item.id).await);
        assert!(store.get_by_owner_and_id(1, item.id).await.is_none());
        assert!(!store.delete_by_owner_and_id(1, item.id).await);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_with_id_tiebreak() {
        let store = ContentStore::new();
        for i in 0..5 {
            seed(&store, 1, &format!("item {}", i), "").await;
        }

        let items = store.list_by_owner(1, None).await;
        assert_eq!(items.len(), 5);

        // Items created back-to-back may share a timestamp; the id
        // tie-break keeps the order strictly descending either way.
        for pair in items.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.created_at > b.created_at || (a.created_at == b.created_at && a.id > b.id),
                "order violated between {} and {}",
                a.id,
                b.id
            );
        }
    }

    #[tokio::test]
    async fn test_list_limit_is_capped() {
        let store = ContentStore::new();
        for i in 0..10 {
            seed(&store, 1, &format!("item {}", i), "").await;
        }

        assert_eq!(store.list_by_owner(1, Some(3)).await.len(), 3);
        // A caller cannot raise the cap past the maximum.
        assert_eq!(store.list_by_owner(1, Some(500)).await.len(), 10);
    }

    #[tokio::test]
    async fn test_search_query_matches_title_or_body() {
        let store = ContentStore::new();
        seed(&store, 1, "Hello there", "").await;
        seed(&store, 1, "Goodbye", "nothing relevant").await;
        seed(&store, 1, "Notes", "say hello to the body").await;

        let filter = SearchFilter {
            query: Some("HELLO".to_string()),
            ..Default::default()
        };
        let items = store.search(1, &filter).await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.title != "Goodbye"));
    }

    #[tokio::test]
    async fn test_search_without_filters_equals_list() {
        let store = ContentStore::new();
        for i in 0..4 {
            seed(&store, 1, &format!("item {}", i), "").await;
        }
        seed(&store, 2, "other owner", "").await;

        let searched = store.search(1, &SearchFilter::default()).await;
        let listed = store.list_by_owner(1, None).await;

        let searched_ids: Vec<u64> = searched.iter().map(|i| i.id).collect();
        let listed_ids: Vec<u64> = listed.iter().map(|i| i.id).collect();
        assert_eq!(searched_ids, listed_ids);
    }

    #[tokio::test]
    async fn test_search_is_capped_like_list() {
        let store = ContentStore::new();
        for i in 0..DEFAULT_LIST_LIMIT + 10 {
            seed(&store, 1, &format!("item {}", i), "").await;
        }

        let searched = store.search(1, &SearchFilter::default()).await;
        let listed = store.list_by_owner(1, None).await;

        assert_eq!(searched.len(), DEFAULT_LIST_LIMIT);
        let searched_ids: Vec<u64> = searched.iter().map(|i| i.id).collect();
        let listed_ids: Vec<u64> = listed.iter().map(|i| i.id).collect();
        assert_eq!(searched_ids, listed_ids);
    }

    #[tokio::test]
    async fn test_search_date_bounds_compose() {
        let store = ContentStore::new();
        let item = seed(&store, 1, "bounded", "").await;

        let one_hour = chrono::Duration::hours(1);

        let inside = SearchFilter {
            from: Some(item.created_at - one_hour),
            to: Some(item.created_at + one_hour),
            ..Default::default()
        };
        assert_eq!(store.search(1, &inside).await.len(), 1);

        let before = SearchFilter {
            to: Some(item.created_at - one_hour),
            ..Default::default()
        };
        assert!(store.search(1, &before).await.is_empty());

        let after = SearchFilter {
            from: Some(item.created_at + one_hour),
            ..Default::default()
        };
        assert!(store.search(1, &after).await.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_ids_are_not_reused() {
        let store = ContentStore::new();
        let first = seed(&store, 1, "first", "").await;
        store.delete_by_owner_and_id(1, first.id).await;

        let second = seed(&store, 1, "second", "").await;
        assert!(second.id > first.id);
    }
}
