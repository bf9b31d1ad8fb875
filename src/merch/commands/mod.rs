use crate::config::MerchConfig;
use crate::model::{Item, PriceLog, User};

pub mod bar;
pub mod config;
pub mod favorites;
pub mod interactive;
pub mod item;
pub mod prices;
pub mod search;
pub mod token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Text and tags of the search bar after a command ran.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BarState {
    pub text: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// `None` when no list applies, `Some(empty)` when a search found nothing
    pub listed_items: Option<Vec<Item>>,
    pub item: Option<Item>,
    pub price_logs: Vec<PriceLog>,
    pub user: Option<User>,
    pub token: Option<String>,
    pub bar: Option<BarState>,
    pub config: Option<MerchConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_listed_items(mut self, items: Vec<Item>) -> Self {
        self.listed_items = Some(items);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }

    pub fn with_price_logs(mut self, logs: Vec<PriceLog>) -> Self {
        self.price_logs = logs;
        self
    }

    pub fn with_user(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }

    pub fn with_bar(mut self, bar: BarState) -> Self {
        self.bar = Some(bar);
        self
    }

    pub fn with_config(mut self, config: MerchConfig) -> Self {
        self.config = Some(config);
        self
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod test_support {
    use crate::client::Catalog;
    use crate::error::{MerchError, Result};
    use crate::model::{Item, PriceLog, User};
    use crate::search::ItemSource;
    use async_trait::async_trait;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// An in-memory item API. Searches match names case-insensitively and
    /// ignore tags; every search is recorded.
    #[derive(Default)]
    pub struct FakeCatalog {
        pub items: Vec<Item>,
        pub price_logs: HashMap<u32, Vec<PriceLog>>,
        pub users: HashMap<String, User>,
        pub favorites: Mutex<BTreeSet<u32>>,
        pub searches: Mutex<Vec<(String, Vec<String>)>>,
        pub offline: AtomicBool,
    }

    impl FakeCatalog {
        pub fn with_items(mut self, names: &[&str]) -> Self {
            let start = self.items.len() as u32;
            for (i, name) in names.iter().enumerate() {
                self.items.push(Item::new(start + i as u32 + 1, *name));
            }
            self
        }

        pub fn with_price_logs(mut self, item_id: u32, logs: Vec<PriceLog>) -> Self {
            self.price_logs.insert(item_id, logs);
            self
        }

        pub fn with_user(mut self, token: &str, user: User) -> Self {
            self.users.insert(token.to_string(), user);
            self
        }

        pub fn offline(self) -> Self {
            self.set_offline(true);
            self
        }

        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub fn search_count(&self) -> usize {
            self.searches.lock().unwrap().len()
        }

        fn reachable(&self) -> Result<()> {
            if self.offline.load(Ordering::SeqCst) {
                Err(MerchError::Status {
                    status: 503,
                    url: "http://fake/api/v1/".to_string(),
                })
            } else {
                Ok(())
            }
        }

        fn authorized(&self, token: &str) -> Result<()> {
            if self.users.contains_key(token) {
                Ok(())
            } else {
                Err(MerchError::Status {
                    status: 401,
                    url: "http://fake/api/v1/".to_string(),
                })
            }
        }
    }

    #[async_trait]
    impl ItemSource for FakeCatalog {
        async fn search_items(&self, name: &str, tags: &[String]) -> Result<Vec<Item>> {
            self.searches
                .lock()
                .unwrap()
                .push((name.to_string(), tags.to_vec()));
            self.reachable()?;
            Ok(self
                .items
                .iter()
                .filter(|item| item.name_matches(name))
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn items(&self) -> Result<Vec<Item>> {
            self.reachable()?;
            Ok(self.items.clone())
        }

        async fn item(&self, item_id: u32, token: Option<&str>) -> Result<Option<Item>> {
            self.reachable()?;
            let favorites = self.favorites.lock().unwrap();
            Ok(self
                .items
                .iter()
                .find(|item| item.item_id == item_id)
                .cloned()
                .map(|mut item| {
                    if token.is_some() {
                        item.favorited = Some(favorites.contains(&item_id));
                    }
                    item
                }))
        }

        async fn price_logs(&self, item_id: u32) -> Result<Option<Vec<PriceLog>>> {
            self.reachable()?;
            if !self.items.iter().any(|item| item.item_id == item_id) {
                return Ok(None);
            }
            Ok(Some(self.price_logs.get(&item_id).cloned().unwrap_or_default()))
        }

        async fn latest_prices(&self) -> Result<Vec<PriceLog>> {
            self.reachable()?;
            Ok(self
                .price_logs
                .values()
                .filter_map(|logs| logs.iter().max_by_key(|log| log.date).cloned())
                .collect())
        }

        async fn favorites(&self, token: &str) -> Result<Vec<Item>> {
            self.reachable()?;
            self.authorized(token)?;
            let favorites = self.favorites.lock().unwrap();
            Ok(self
                .items
                .iter()
                .filter(|item| favorites.contains(&item.item_id))
                .cloned()
                .collect())
        }

        async fn favorite(&self, item_id: u32, token: &str) -> Result<bool> {
            self.reachable()?;
            if self.authorized(token).is_err() {
                return Ok(false);
            }
            Ok(self.favorites.lock().unwrap().insert(item_id))
        }

        async fn unfavorite(&self, item_id: u32, token: &str) -> Result<bool> {
            self.reachable()?;
            if self.authorized(token).is_err() {
                return Ok(false);
            }
            Ok(self.favorites.lock().unwrap().remove(&item_id))
        }

        async fn user(&self, token: &str) -> Result<Option<User>> {
            self.reachable()?;
            Ok(self.users.get(token).cloned())
        }
    }
}
