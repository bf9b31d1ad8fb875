//! Incremental search over the item endpoint.
//!
//! Typing a name one character at a time would otherwise hit the network on
//! every keystroke. [`SearchCache`] keeps the last fetched result set and
//! answers narrower queries by filtering it locally.
//!
//! ## Decision policy
//!
//! With `min` the configured minimum fragment length, lengths in characters:
//!
//! 1. fewer than `min` characters and no tags: forget the cache, no search
//! 2. exactly `min` characters and no tags: always fetch
//! 3. otherwise
//!    - tags differ from the cached tags: fetch
//!    - a cache exists and the fragment extends the cached fragment: filter
//!      the cached items by case-insensitive name match
//!    - else: fetch
//!
//! Every fetch replaces the cache wholesale. A failed fetch leaves the cache
//! as it was and the error goes to the caller; nothing is retried.
//!
//! ## Overlapping searches
//!
//! [`SearchCache::search`] borrows the cache mutably across the fetch, so
//! calls through it are serialized. Callers that want to keep typing while a
//! fetch is in flight use the split form: [`SearchCache::plan`] decides and
//! hands out a [`FetchTicket`], the caller fetches without holding the cache,
//! then [`SearchCache::complete`] installs the response. Only the ticket of
//! the most recent `plan` call may complete; older responses are dropped so
//! a slow early fetch can never overwrite what a later keystroke showed.

use crate::error::Result;
use crate::model::Item;
use async_trait::async_trait;

/// Where search results come from.
#[async_trait]
pub trait ItemSource {
    /// Items whose name contains `name` and that carry every tag in `tags`.
    async fn search_items(&self, name: &str, tags: &[String]) -> Result<Vec<Item>>;
}

/// The outcome of planning a search.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Not enough input to search
    Insufficient,
    /// Served from the cache
    Cached(Vec<Item>),
    /// The caller must fetch and hand the response to [`SearchCache::complete`]
    Fetch(FetchTicket),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    pub fragment: String,
    pub tags: Vec<String>,
}

#[derive(Debug)]
pub struct SearchCache {
    min_characters: usize,
    items: Option<Vec<Item>>,
    tags: Vec<String>,
    fragment: String,
    latest: u64,
}

impl SearchCache {
    pub fn new(min_characters: usize) -> Self {
        Self {
            min_characters,
            items: None,
            tags: Vec::new(),
            fragment: String::new(),
            latest: 0,
        }
    }

    pub fn min_characters(&self) -> usize {
        self.min_characters
    }

    pub fn cached_items(&self) -> Option<&[Item]> {
        self.items.as_deref()
    }

    /// Searches `fragment` within `tags`, fetching from `source` only when
    /// the cache cannot answer. `None` means the input is too short to search.
    pub async fn search<S>(
        &mut self,
        source: &S,
        fragment: &str,
        tags: &[String],
    ) -> Result<Option<Vec<Item>>>
    where
        S: ItemSource + ?Sized,
    {
        match self.plan(fragment, tags) {
            Lookup::Insufficient => Ok(None),
            Lookup::Cached(items) => Ok(Some(items)),
            Lookup::Fetch(ticket) => {
                let items = source.search_items(&ticket.fragment, &ticket.tags).await?;
                Ok(self.complete(ticket, items))
            }
        }
    }

    /// Decides how to answer a search. Each call supersedes every ticket
    /// handed out before it.
    pub fn plan(&mut self, fragment: &str, tags: &[String]) -> Lookup {
        self.latest += 1;
        let length = fragment.chars().count();

        if tags.is_empty() && length < self.min_characters {
            tracing::debug!(fragment, "search input too short");
            self.clear();
            return Lookup::Insufficient;
        }

        if tags.is_empty() && length == self.min_characters {
            return self.ticket(fragment, tags, "minimum length");
        }

        if tags != self.tags.as_slice() {
            return self.ticket(fragment, tags, "tags changed");
        }

        if let Some(items) = &self.items {
            if extends(fragment, &self.fragment) {
                let filtered: Vec<Item> = items
                    .iter()
                    .filter(|item| item.name_matches(fragment))
                    .cloned()
                    .collect();
                tracing::debug!(
                    fragment,
                    cached = items.len(),
                    matched = filtered.len(),
                    "search served from cache"
                );
                return Lookup::Cached(filtered);
            }
        }

        self.ticket(fragment, tags, "no usable cache")
    }

    /// Installs the response for `ticket` and returns it, or drops it and
    /// returns `None` when a later `plan` call superseded the ticket.
    pub fn complete(&mut self, ticket: FetchTicket, items: Vec<Item>) -> Option<Vec<Item>> {
        if ticket.seq != self.latest {
            tracing::debug!(
                fragment = %ticket.fragment,
                seq = ticket.seq,
                latest = self.latest,
                "dropping superseded search response"
            );
            return None;
        }

        self.items = Some(items.clone());
        self.tags = ticket.tags;
        self.fragment = ticket.fragment;
        Some(items)
    }

    pub fn clear(&mut self) {
        self.items = None;
        self.tags.clear();
        self.fragment.clear();
    }

    fn ticket(&self, fragment: &str, tags: &[String], reason: &str) -> Lookup {
        tracing::debug!(fragment, ?tags, reason, "search needs a fetch");
        Lookup::Fetch(FetchTicket {
            seq: self.latest,
            fragment: fragment.to_string(),
            tags: tags.to_vec(),
        })
    }
}

fn extends(fragment: &str, cached: &str) -> bool {
    fragment.to_lowercase().contains(&cached.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MerchError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        items: Vec<Item>,
        calls: Mutex<Vec<(String, Vec<String>)>>,
        failing: AtomicBool,
    }

    impl FakeSource {
        fn with_names(names: &[&str]) -> Self {
            Self {
                items: names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| Item::new(i as u32 + 1, *name))
                    .collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_call(&self) -> (String, Vec<String>) {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ItemSource for FakeSource {
        async fn search_items(&self, name: &str, tags: &[String]) -> Result<Vec<Item>> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), tags.to_vec()));
            if self.failing.load(Ordering::SeqCst) {
                return Err(MerchError::Status {
                    status: 503,
                    url: "http://test/api/v1/items/".into(),
                });
            }
            Ok(self.items.clone())
        }
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|t| t.to_string()).collect()
    }

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|item| item.name.as_str()).collect()
    }

    #[tokio::test]
    async fn short_fragment_is_not_searched() {
        let source = FakeSource::with_names(&["abcdef"]);
        let mut cache = SearchCache::new(3);

        assert_eq!(cache.search(&source, "ab", &[]).await.unwrap(), None);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn minimum_length_always_fetches() {
        let source = FakeSource::with_names(&["abcdef", "xyz"]);
        let mut cache = SearchCache::new(3);

        cache.search(&source, "abc", &[]).await.unwrap();
        let second = cache.search(&source, "abc", &[]).await.unwrap().unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(names(&second), ["abcdef", "xyz"]);
    }

    #[tokio::test]
    async fn growing_fragment_filters_locally() {
        let source = FakeSource::with_names(&["abcdef", "xyz"]);
        let mut cache = SearchCache::new(3);

        cache.search(&source, "abc", &[]).await.unwrap();
        let narrowed = cache.search(&source, "abcd", &[]).await.unwrap().unwrap();

        assert_eq!(names(&narrowed), ["abcdef"]);
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.cached_items().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn local_filter_ignores_case() {
        let source = FakeSource::with_names(&["Rune axe", "Rune scimitar"]);
        let mut cache = SearchCache::new(3);

        cache.search(&source, "run", &[]).await.unwrap();
        let narrowed = cache.search(&source, "RUNE A", &[]).await.unwrap().unwrap();

        assert_eq!(names(&narrowed), ["Rune axe"]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn identical_search_is_served_from_cache() {
        let source = FakeSource::with_names(&["abcdef"]);
        let mut cache = SearchCache::new(3);

        let first = cache.search(&source, "abcd", &[]).await.unwrap();
        let second = cache.search(&source, "abcd", &[]).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn changing_tags_refetches() {
        let source = FakeSource::with_names(&["abcdef"]);
        let mut cache = SearchCache::new(3);

        cache.search(&source, "abcd", &tags(&["rune"])).await.unwrap();
        cache.search(&source, "abcd", &tags(&["dragon"])).await.unwrap();
        cache.search(&source, "abcd", &tags(&["dragon", "rune"])).await.unwrap();
        cache.search(&source, "abcd", &[]).await.unwrap();

        assert_eq!(source.calls(), 4);
        assert_eq!(source.last_call(), ("abcd".to_string(), vec![]));
    }

    #[tokio::test]
    async fn tags_alone_are_enough_to_search() {
        let source = FakeSource::with_names(&["Dragon dagger", "Dragon scimitar"]);
        let mut cache = SearchCache::new(3);
        let dragon = tags(&["dragon"]);

        let all = cache.search(&source, "", &dragon).await.unwrap().unwrap();
        let narrowed = cache.search(&source, "s", &dragon).await.unwrap().unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(names(&narrowed), ["Dragon scimitar"]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn fragment_that_does_not_extend_the_cache_refetches() {
        let source = FakeSource::with_names(&["abcdef"]);
        let mut cache = SearchCache::new(3);

        cache.search(&source, "abcdef", &[]).await.unwrap();
        cache.search(&source, "abcd", &[]).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(source.last_call().0, "abcd");
    }

    #[tokio::test]
    async fn too_short_input_forgets_the_cache() {
        let source = FakeSource::with_names(&["abcdef"]);
        let mut cache = SearchCache::new(3);

        cache.search(&source, "abc", &[]).await.unwrap();
        cache.search(&source, "ab", &[]).await.unwrap();
        assert!(cache.cached_items().is_none());

        cache.search(&source, "abcd", &[]).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_the_previous_cache() {
        let source = FakeSource::with_names(&["abcdef", "xyz"]);
        let mut cache = SearchCache::new(3);
        cache.search(&source, "abc", &[]).await.unwrap();

        source.failing.store(true, Ordering::SeqCst);
        let failed = cache.search(&source, "abc", &tags(&["rune"])).await;
        assert!(matches!(failed, Err(MerchError::Status { status: 503, .. })));

        let narrowed = cache.search(&source, "abcd", &[]).await.unwrap().unwrap();
        assert_eq!(names(&narrowed), ["abcdef"]);
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn latest_request_wins() {
        let mut cache = SearchCache::new(3);
        let rune = tags(&["rune"]);
        let dragon = tags(&["dragon"]);

        let Lookup::Fetch(early) = cache.plan("axe", &rune) else {
            panic!("expected a fetch");
        };
        let Lookup::Fetch(late) = cache.plan("axe", &dragon) else {
            panic!("expected a fetch");
        };

        let late_items = vec![Item::new(2, "Dragon axe")];
        assert_eq!(cache.complete(late, late_items.clone()), Some(late_items));
        assert_eq!(cache.complete(early, vec![Item::new(1, "Rune axe")]), None);

        match cache.plan("axe", &dragon) {
            Lookup::Cached(items) => assert_eq!(names(&items), ["Dragon axe"]),
            other => panic!("expected cached lookup, got {:?}", other),
        }
    }

    #[test]
    fn response_after_a_cleared_search_is_dropped() {
        let mut cache = SearchCache::new(3);

        let Lookup::Fetch(ticket) = cache.plan("abc", &[]) else {
            panic!("expected a fetch");
        };
        assert_eq!(cache.plan("a", &[]), Lookup::Insufficient);

        assert_eq!(cache.complete(ticket, vec![Item::new(1, "abc")]), None);
        assert!(cache.cached_items().is_none());
    }
}
