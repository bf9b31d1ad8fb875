//! # Merch Architecture
//!
//! Merch is a **UI-agnostic marketplace lookup library**: item search with
//! tags, price history and favorites against a remote item API. The `merch`
//! binary is one client of it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic over the search bar, cache and session    │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                         │
//!                    ▼                         ▼
//! ┌──────────────────────────────┐ ┌────────────────────────────┐
//! │  Storage (store/)            │ │  Item API (client.rs)      │
//! │  KeyValueStore trait         │ │  Catalog trait             │
//! │  FileStore, InMemoryStore    │ │  MerchClient (reqwest)     │
//! └──────────────────────────────┘ └────────────────────────────┘
//! ```
//!
//! ## The Search Bar
//!
//! A search is free text plus up to three tags. Committing a word turns the
//! word at the cursor into a tag; deleting at the start of the text pops the
//! last tag back into the text. Text and tags survive restarts through the
//! store. See [`search::bar`] and [`search::word`].
//!
//! Search results are cached: once a fragment has been fetched, longer
//! fragments that extend it are filtered locally. See [`search::cache`].
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust arguments, returns
//! `Result<CmdResult>`, and **never** writes to stdout/stderr or exits the
//! process. Network access happens only behind the [`client::Catalog`] and
//! [`search::ItemSource`] traits.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): unit tests against `InMemoryStore` and
//!    the recording `FakeCatalog`. Most tests live here.
//! 2. **API** (`api.rs`): dispatch tests.
//! 3. **CLI** (`tests/`): offline runs of the binary.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`search`]: Word extraction, the tag-aware search bar, the result cache
//! - [`session`]: Api token and user
//! - [`client`]: The item API over HTTP
//! - [`store`]: Key-value storage abstraction and implementations
//! - [`model`]: Items, price logs, users
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod search;
pub mod session;
pub mod store;
