//! # Session
//!
//! The api token and the user it belongs to. A token unlocks the per-user
//! endpoints (favorites, favorite status on item pages).
//!
//! [`Session`] is plain application state: it is created from the store,
//! passed to whoever needs it, and changed only through its setters, which
//! persist first and then call every registered listener.
//!
//! Another process sharing the data directory may change the token behind
//! our back. Whoever watches for that calls [`Session::on_storage_changed`]
//! with the changed key; the session rereads the key and notifies only if
//! its view actually changed.

use crate::client::Catalog;
use crate::error::{MerchError, Result};
use crate::model::User;
use crate::store::{KeyValueStore, TOKEN_KEY, USER_KEY};

pub const TOKEN_LENGTH: usize = 40;

pub type Listener = Box<dyn FnMut(Option<&str>, Option<&User>)>;

/// Api tokens are 40 hex digits.
pub fn is_valid_token(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.chars().all(|c| c.is_ascii_hexdigit())
}

pub struct Session<S: KeyValueStore> {
    store: S,
    token: Option<String>,
    user: Option<User>,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn load(store: S) -> Result<Self> {
        let token = read_token(&store)?;
        let user = read_user(&store)?;
        Ok(Self {
            store,
            token,
            user,
            listeners: Vec::new(),
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The token, or [`MerchError::TokenRequired`].
    pub fn require_token(&self) -> Result<&str> {
        self.token().ok_or(MerchError::TokenRequired)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(Option<&str>, Option<&User>) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn set_token(&mut self, token: Option<String>) -> Result<()> {
        match &token {
            Some(token) => self.store.set(TOKEN_KEY, token)?,
            None => self.store.remove(TOKEN_KEY)?,
        }
        self.token = token;
        self.notify();
        Ok(())
    }

    pub fn set_user(&mut self, user: Option<User>) -> Result<()> {
        match &user {
            Some(user) => self.store.set(USER_KEY, &serde_json::to_string(user)?)?,
            None => self.store.remove(USER_KEY)?,
        }
        self.user = user;
        self.notify();
        Ok(())
    }

    /// Rereads `key` from the store after an outside change. Returns whether
    /// the session changed.
    pub fn on_storage_changed(&mut self, key: &str) -> Result<bool> {
        let changed = match key {
            TOKEN_KEY => {
                let token = read_token(&self.store)?;
                let changed = token != self.token;
                self.token = token;
                changed
            }
            USER_KEY => {
                let user = read_user(&self.store)?;
                let changed = user != self.user;
                self.user = user;
                changed
            }
            _ => false,
        };

        if changed {
            tracing::debug!(key, "session changed in storage");
            self.notify();
        }
        Ok(changed)
    }

    /// Verifies `token` against the server and keeps it together with its
    /// user. An empty token signs out. A well-formed token the server does
    /// not know leaves the session untouched and returns `None`.
    pub async fn register_token<C>(&mut self, catalog: &C, token: &str) -> Result<Option<User>>
    where
        C: Catalog + ?Sized,
    {
        let token = token.trim();
        if token.is_empty() {
            self.set_token(None)?;
            self.set_user(None)?;
            return Ok(None);
        }
        if !is_valid_token(token) {
            return Err(MerchError::InvalidToken);
        }

        let user = catalog.user(token).await?;
        match &user {
            Some(user) => {
                self.set_token(Some(token.to_string()))?;
                self.set_user(Some(user.clone()))?;
            }
            None => tracing::warn!("token was rejected by the server"),
        }
        Ok(user)
    }

    /// Fetches the user for a stored token that has none yet.
    pub async fn ensure_user<C>(&mut self, catalog: &C) -> Result<Option<&User>>
    where
        C: Catalog + ?Sized,
    {
        if self.user.is_none() {
            if let Some(token) = self.token.clone() {
                if let Some(user) = catalog.user(&token).await? {
                    self.set_user(Some(user))?;
                }
            }
        }
        Ok(self.user.as_ref())
    }

    fn notify(&mut self) {
        let token = self.token.as_deref();
        let user = self.user.as_ref();
        for listener in self.listeners.iter_mut() {
            listener(token, user);
        }
    }
}

fn read_token<S: KeyValueStore>(store: &S) -> Result<Option<String>> {
    Ok(store.get(TOKEN_KEY)?.filter(|token| !token.is_empty()))
}

fn read_user<S: KeyValueStore>(store: &S) -> Result<Option<User>> {
    let Some(raw) = store.get(USER_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(user) => Ok(Some(user)),
        Err(err) => {
            tracing::warn!(%err, "ignoring unreadable stored user");
            Ok(None)
        }
    }
}
