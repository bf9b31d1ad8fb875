//! # Search
//!
//! The interactive part of the client, in three pieces:
//!
//! - [`word`]: cutting the word at the cursor out of the search text
//! - [`bar`]: the search bar that turns words into tags and remembers them
//! - [`cache`]: answering narrowing searches without going back to the server
//!
//! A keystroke flows through them in that order: the bar mutates its text and
//! tags, persists them and notifies; the subscriber hands `(text, tags)` to
//! the cache, which either filters what it has or fetches.

pub mod bar;
pub mod cache;
pub mod word;

pub use bar::{EventOutcome, KeyCode, KeyEvent, SearchBar, MAX_TAGS};
pub use cache::{FetchTicket, ItemSource, Lookup, SearchCache};
pub use word::{extract_word_at, WordExtraction};
