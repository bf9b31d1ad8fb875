//! The tag-aware search bar.
//!
//! [`SearchBar`] owns the free text and the tags of a search, keeps both in a
//! [`KeyValueStore`] so a search survives restarts, and tells its subscribers
//! about every change. Two key gestures drive the tags:
//!
//! - **Enter** (commit) cuts the word at the cursor out of the text and turns
//!   it into a tag, as long as fewer than [`MAX_TAGS`] tags exist.
//! - **Backspace** (delete) at the very start of the text pops the last tag.
//!   The tag goes back to the front of the text, or is discarded outright
//!   when shift is held.
//!
//! Every mutation persists first and notifies second, so a subscriber that
//! reads the store sees the state it is being told about.

use super::word::extract_word_at;
use crate::error::Result;
use crate::store::{KeyValueStore, SEARCH_KEY, TAGS_KEY};

pub const MAX_TAGS: usize = 3;
pub const TAG_DELIMITER: char = ',';

pub type Subscriber = Box<dyn FnMut(&str, &[String])>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Enter,
    Backspace,
    Other,
}

/// A keyboard event as delivered by the gesture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub shift: bool,
    /// Whether the event targets the control this bar is bound to
    pub on_bar: bool,
    /// Character offset of the caret in the bar's text
    pub cursor: usize,
}

impl KeyEvent {
    pub fn enter(cursor: usize) -> Self {
        Self {
            code: KeyCode::Enter,
            shift: false,
            on_bar: true,
            cursor,
        }
    }

    pub fn backspace(cursor: usize, shift: bool) -> Self {
        Self {
            code: KeyCode::Backspace,
            shift,
            on_bar: true,
            cursor,
        }
    }
}

/// Whether the bar consumed a gesture. `Suppressed` means the caller must
/// cancel the key's default effect (inserting a newline, deleting a char).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Suppressed,
}

pub struct SearchBar<S: KeyValueStore> {
    store: S,
    text: String,
    tags: Vec<String>,
    focused: bool,
    attached: bool,
    subscribers: Vec<Subscriber>,
}

impl<S: KeyValueStore> SearchBar<S> {
    /// Hydrates the bar from `store`. Missing keys mean an empty search.
    pub fn load(store: S) -> Result<Self> {
        let text = store.get(SEARCH_KEY)?.unwrap_or_default();
        let tags = store
            .get(TAGS_KEY)?
            .map(|joined| parse_tags(&joined))
            .unwrap_or_default();

        Ok(Self {
            store,
            text,
            tags,
            focused: true,
            attached: true,
            subscribers: Vec::new(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&str, &[String]) + 'static) {
        if self.attached {
            self.subscribers.push(Box::new(subscriber));
        }
    }

    /// Replaces the free text. Tags are untouched.
    pub fn on_text_changed(&mut self, text: impl Into<String>) -> Result<()> {
        if !self.attached {
            return Ok(());
        }
        self.text = text.into();
        self.store.set(SEARCH_KEY, &self.text)?;
        self.emit();
        Ok(())
    }

    /// Turns the word at `cursor` into a tag.
    pub fn on_commit(&mut self, cursor: usize) -> Result<EventOutcome> {
        if !self.accepts_gestures() || self.tags.len() >= MAX_TAGS {
            return Ok(EventOutcome::Ignored);
        }

        let extraction = extract_word_at(&self.text, cursor);
        if extraction.is_empty() {
            return Ok(EventOutcome::Ignored);
        }
        if extraction.word.contains(TAG_DELIMITER) || self.tags.contains(&extraction.word) {
            tracing::debug!(word = %extraction.word, "word cannot become a tag");
            return Ok(EventOutcome::Ignored);
        }

        let mut tags = self.tags.clone();
        tags.push(extraction.word);
        self.persist(extraction.remainder, tags)?;
        self.emit();
        Ok(EventOutcome::Suppressed)
    }

    /// Pops the last tag when the cursor is at the start of the text.
    /// With `discard` the tag is dropped, otherwise it is put back in front
    /// of the text.
    pub fn on_delete(&mut self, cursor: usize, discard: bool) -> Result<EventOutcome> {
        if !self.accepts_gestures() || cursor != 0 {
            return Ok(EventOutcome::Ignored);
        }
        let mut tags = self.tags.clone();
        let Some(tag) = tags.pop() else {
            return Ok(EventOutcome::Ignored);
        };

        let text = if discard {
            self.text.clone()
        } else {
            let needs_space =
                !self.text.is_empty() && !self.text.starts_with(char::is_whitespace);
            let separator = if needs_space { " " } else { "" };
            format!("{}{}{}", tag, separator, self.text)
        };

        self.persist(text, tags)?;
        self.emit();
        Ok(EventOutcome::Suppressed)
    }

    /// Entry point for the keyboard gesture source.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Result<EventOutcome> {
        if !event.on_bar {
            return Ok(EventOutcome::Ignored);
        }
        match event.code {
            KeyCode::Enter => self.on_commit(event.cursor),
            KeyCode::Backspace => self.on_delete(event.cursor, event.shift),
            KeyCode::Other => Ok(EventOutcome::Ignored),
        }
    }

    /// Unbinds the bar: subscribers are dropped and gestures ignored.
    pub fn detach(&mut self) {
        self.attached = false;
        self.subscribers.clear();
    }

    /// Hands the store back, e.g. to build the next bar on it.
    pub fn into_store(self) -> S {
        self.store
    }

    fn accepts_gestures(&self) -> bool {
        self.attached && self.focused
    }

    /// Stores both halves of a gesture, then adopts them. If the text
    /// cannot be written the stored tags are put back, so the store and the
    /// bar both keep the state from before the gesture.
    fn persist(&mut self, text: String, tags: Vec<String>) -> Result<()> {
        self.store.set(TAGS_KEY, &join_tags(&tags))?;
        if let Err(err) = self.store.set(SEARCH_KEY, &text) {
            if let Err(restore) = self.store.set(TAGS_KEY, &join_tags(&self.tags)) {
                tracing::warn!(error = %restore, "could not restore stored tags");
            }
            return Err(err);
        }
        self.text = text;
        self.tags = tags;
        Ok(())
    }

    fn emit(&mut self) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&self.text, &self.tags);
        }
    }
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(&TAG_DELIMITER.to_string())
}

/// Splits stored tags, dropping empty and repeated entries.
pub fn parse_tags(joined: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in joined.split(TAG_DELIMITER) {
        if tags.len() == MAX_TAGS {
            break;
        }
        if !tag.is_empty() && !tags.iter().any(|seen| seen == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
