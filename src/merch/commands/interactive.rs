//! Line-driven search session.
//!
//! One [`SearchBar`] and one [`SearchCache`] live for the whole session, so
//! typing further characters narrows the last fetched list locally instead of
//! asking the server again. Every change of the bar reaches the cache through
//! the bar's subscriber.
//!
//! The session also watches the api token. Before each line it rereads the
//! token and user from the store, and reports when another `merch` process
//! registered or cleared a token meanwhile.
//!
//! Input lines:
//!
//! - plain text replaces the search text
//! - `+text` appends to it, the way typing further keys would
//! - `:tag [N]` commits the word at cursor `N` (default: end of text)
//! - `:untag` pops the last tag back into the text, `:drop` discards it
//! - `:show`, `:help`, `:quit`

use crate::commands::bar::{self, BarAction};
use crate::commands::{search, BarState, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Item;
use crate::search::{ItemSource, SearchBar, SearchCache};
use crate::session::Session;
use crate::store::{KeyValueStore, TOKEN_KEY, USER_KEY};
use std::cell::RefCell;
use std::rc::Rc;

pub const HELP: &str = "text: search | +text: type more | :tag [N] | :untag | :drop | :show | :quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Replace(String),
    Append(String),
    Tag(Option<usize>),
    Untag { discard: bool },
    Show,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(rest) = line.strip_prefix('+') {
        return Input::Append(rest.to_string());
    }
    let Some(command) = line.strip_prefix(':') else {
        return Input::Replace(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "tag" | "t" => Input::Tag(parts.next().and_then(|at| at.parse().ok())),
        "untag" | "u" => Input::Untag { discard: false },
        "drop" | "d" => Input::Untag { discard: true },
        "show" | "s" => Input::Show,
        "quit" | "q" | "exit" => Input::Quit,
        _ => Input::Help,
    }
}

/// What the session does after one line.
#[derive(Debug)]
pub enum Step {
    Continue(CmdResult),
    Quit,
}

type Shared<S> = Rc<RefCell<S>>;

pub struct Repl<'a, S: KeyValueStore, C: ItemSource + ?Sized> {
    bar: SearchBar<Shared<S>>,
    session: Session<Shared<S>>,
    cache: SearchCache,
    source: &'a C,
    pending: Rc<RefCell<Option<BarState>>>,
    signed_in: Rc<RefCell<Option<bool>>>,
    shown: Option<Vec<Item>>,
}

impl<'a, S, C> Repl<'a, S, C>
where
    S: KeyValueStore,
    C: ItemSource + ?Sized,
{
    pub fn new(store: S, source: &'a C, min_characters: usize) -> Result<Self> {
        let store = Rc::new(RefCell::new(store));
        let mut bar = SearchBar::load(Rc::clone(&store))?;
        bar.set_focused(true);

        let pending = Rc::new(RefCell::new(Some(BarState {
            text: bar.text().to_string(),
            tags: bar.tags().to_vec(),
        })));
        let sink = Rc::clone(&pending);
        bar.subscribe(move |text, tags| {
            *sink.borrow_mut() = Some(BarState {
                text: text.to_string(),
                tags: tags.to_vec(),
            });
        });

        let mut session = Session::load(store)?;
        let signed_in: Rc<RefCell<Option<bool>>> = Rc::default();
        let sink = Rc::clone(&signed_in);
        session.subscribe(move |token, _| *sink.borrow_mut() = Some(token.is_some()));

        Ok(Self {
            bar,
            session,
            cache: SearchCache::new(min_characters),
            source,
            pending,
            signed_in,
            shown: None,
        })
    }

    pub fn state(&self) -> BarState {
        BarState {
            text: self.bar.text().to_string(),
            tags: self.bar.tags().to_vec(),
        }
    }

    /// Runs the search for the bar's current contents.
    pub async fn start(&mut self) -> Result<CmdResult> {
        self.refresh(CmdResult::default()).await
    }

    pub async fn handle(&mut self, input: Input) -> Result<Step> {
        let mut result = CmdResult::default();
        self.sync_session(&mut result)?;
        match input {
            Input::Replace(text) => self.bar.on_text_changed(text)?,
            Input::Append(more) => {
                let text = format!("{}{}", self.bar.text(), more);
                self.bar.on_text_changed(text)?;
            }
            Input::Tag(at) => bar::apply(&mut self.bar, BarAction::Tag { at }, &mut result)?,
            Input::Untag { discard } => {
                bar::apply(&mut self.bar, BarAction::Untag { discard }, &mut result)?
            }
            Input::Show => {
                result.listed_items = self.shown.clone();
                return Ok(Step::Continue(result.with_bar(self.state())));
            }
            Input::Help => {
                return Ok(Step::Continue(result.with_message(CmdMessage::info(HELP))));
            }
            Input::Quit => {
                self.bar.set_focused(false);
                self.bar.detach();
                return Ok(Step::Quit);
            }
        }
        self.refresh(result).await.map(Step::Continue)
    }

    /// Picks up token changes made outside this session.
    fn sync_session(&mut self, result: &mut CmdResult) -> Result<()> {
        self.session.on_storage_changed(TOKEN_KEY)?;
        self.session.on_storage_changed(USER_KEY)?;

        let changed = self.signed_in.borrow_mut().take();
        match changed {
            Some(true) => {
                let who = self
                    .session
                    .user()
                    .map(|user| format!(" for {}", user.username))
                    .unwrap_or_default();
                result.add_message(CmdMessage::info(format!("Api token registered{}.", who)));
            }
            Some(false) => result.add_message(CmdMessage::info("Api token cleared.")),
            None => {}
        }
        Ok(())
    }

    async fn refresh(&mut self, mut result: CmdResult) -> Result<CmdResult> {
        let pending = self.pending.borrow_mut().take();
        let Some(state) = pending else {
            return Ok(result.with_bar(self.state()));
        };

        match self.cache.search(self.source, &state.text, &state.tags).await {
            Ok(Some(items)) => {
                self.shown = Some(items.clone());
                result.listed_items = Some(items);
            }
            Ok(None) => {
                self.shown = None;
                result.add_message(search::too_short_message(self.cache.min_characters()));
            }
            Err(err) => {
                tracing::warn!(error = %err, "search failed, keeping previous results");
                result.add_message(CmdMessage::error(format!("Search failed: {}", err)));
                result.listed_items = self.shown.clone();
            }
        }
        Ok(result.with_bar(state))
    }
}
