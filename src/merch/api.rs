//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the
//! single entry point for all merch operations, regardless of the UI.
//!
//! The facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (search words into one fragment, the stored token
//!   into the per-user calls)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no business logic, no printing and no formatting.
//!
//! ## Generic Over Store and Catalog
//!
//! `MerchApi<S: KeyValueStore, C: Catalog>`:
//! - Production: `MerchApi<FileStore, MerchClient>`
//! - Testing: `MerchApi<InMemoryStore, FakeCatalog>`
//!
//! so the facade is tested without a filesystem or a server.

use crate::client::Catalog;
use crate::commands;
use crate::commands::interactive::Repl;
use crate::config::MerchConfig;
use crate::error::{MerchError, Result};
use crate::search::{SearchCache, MAX_TAGS};
use crate::session::Session;
use crate::store::KeyValueStore;
use std::path::{Path, PathBuf};

/// The main API facade for merch operations.
pub struct MerchApi<S: KeyValueStore, C: Catalog> {
    store: S,
    catalog: C,
    config: MerchConfig,
    data_dir: PathBuf,
}

impl<S: KeyValueStore, C: Catalog> MerchApi<S, C> {
    pub fn new(store: S, catalog: C, config: MerchConfig, data_dir: PathBuf) -> Self {
        Self {
            store,
            catalog,
            config,
            data_dir,
        }
    }

    /// One-shot search, independent of the saved search bar.
    pub async fn search<W: AsRef<str>>(
        &self,
        words: &[W],
        tags: &[String],
    ) -> Result<commands::CmdResult> {
        if tags.len() > MAX_TAGS {
            return Err(MerchError::Api(format!(
                "A search can have at most {} tags",
                MAX_TAGS
            )));
        }
        let fragment = words
            .iter()
            .map(|word| word.as_ref())
            .collect::<Vec<&str>>()
            .join(" ");
        let mut cache = SearchCache::new(self.config.min_characters);
        commands::search::run(&self.catalog, &mut cache, &fragment, tags).await
    }

    /// Searches with whatever the search bar currently holds.
    pub async fn saved_search(&mut self) -> Result<commands::CmdResult> {
        commands::search::run_saved(&mut self.store, &self.catalog, self.config.min_characters)
            .await
    }

    pub async fn all_items(&self) -> Result<commands::CmdResult> {
        commands::prices::all_items(&self.catalog).await
    }

    pub async fn bar(&mut self, action: BarAction) -> Result<commands::CmdResult> {
        commands::bar::run(
            &mut self.store,
            &self.catalog,
            self.config.min_characters,
            action,
        )
        .await
    }

    pub async fn item(&mut self, item_id: u32) -> Result<commands::CmdResult> {
        let session = Session::load(&mut self.store)?;
        commands::item::run(&self.catalog, item_id, session.token()).await
    }

    pub async fn prices(&self, limit: Option<usize>) -> Result<commands::CmdResult> {
        commands::prices::run(&self.catalog, limit).await
    }

    pub async fn favorites(&mut self, action: FavoriteAction) -> Result<commands::CmdResult> {
        let session = Session::load(&mut self.store)?;
        let token = session.require_token()?;
        commands::favorites::run(&self.catalog, token, action).await
    }

    pub async fn token(&mut self, action: TokenAction) -> Result<commands::CmdResult> {
        let mut session = Session::load(&mut self.store)?;
        commands::token::run(&mut session, &self.catalog, action).await
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.data_dir, action)
    }

    /// A search session bound to the saved search bar.
    pub fn interactive(&mut self) -> Result<Repl<'_, &mut S, C>> {
        Repl::new(&mut self.store, &self.catalog, self.config.min_characters)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

pub use crate::commands::bar::BarAction;
pub use crate::commands::config::ConfigAction;
pub use crate::commands::favorites::FavoriteAction;
pub use crate::commands::interactive::{parse_line, Input, Step};
pub use crate::commands::token::TokenAction;
pub use crate::commands::{BarState, CmdMessage, CmdResult, MessageLevel};
