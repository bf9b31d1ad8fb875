//! # Storage Layer
//!
//! The durable key-value storage used by the client. Everything the client
//! remembers between runs is a string under a well-known key: the search bar
//! text and tags, the api token and the user it belongs to.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production storage, a single `storage.json` object in
//!   the data directory. Every `set` writes the file through, so two processes
//!   sharing a data directory see each other's writes on the next `get`.
//!
//! - [`memory::InMemoryStore`]: In-memory storage for testing
//!   - No persistence
//!   - Fast, isolated test execution
//!
//! ## Keys
//!
//! ```text
//! search   free text of the search bar
//! tags     search bar tags joined by ","
//! token    api token
//! user     JSON encoded user the token is registered to
//! ```

use crate::error::Result;
use std::cell::RefCell;
use std::rc::Rc;

pub mod fs;
pub mod memory;

pub const SEARCH_KEY: &str = "search";
pub const TAGS_KEY: &str = "tags";
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Abstract interface for durable string storage.
pub trait KeyValueStore {
    /// Get the value under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set (create or replace) the value under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove the value under `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// One store shared by several owners, e.g. a search bar and a session
/// living side by side.
impl<S: KeyValueStore> KeyValueStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.borrow_mut().remove(key)
    }
}
