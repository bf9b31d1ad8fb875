use crate::commands::{search, BarState, CmdMessage, CmdResult};
use crate::error::Result;
use crate::search::{EventOutcome, ItemSource, KeyEvent, SearchBar, SearchCache, MAX_TAGS};
use crate::store::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarAction {
    Show,
    /// Replace the free text
    Type(String),
    /// Turn the word at the cursor (default: end of text) into a tag
    Tag { at: Option<usize> },
    /// Pop the last tag, back into the text unless discarded
    Untag { discard: bool },
    /// Drop text and tags
    Clear,
}

/// Applies `action` to the saved search bar, then searches its new state.
pub async fn run<S, C>(
    store: S,
    source: &C,
    min_characters: usize,
    action: BarAction,
) -> Result<CmdResult>
where
    S: KeyValueStore,
    C: ItemSource + ?Sized,
{
    let mut bar = SearchBar::load(store)?;
    let mut result = CmdResult::default();
    apply(&mut bar, action, &mut result)?;

    let state = BarState {
        text: bar.text().to_string(),
        tags: bar.tags().to_vec(),
    };
    bar.detach();

    let mut cache = SearchCache::new(min_characters);
    let found = search::run(source, &mut cache, &state.text, &state.tags).await?;
    result.listed_items = found.listed_items;
    result.messages.extend(found.messages);
    Ok(result.with_bar(state))
}

/// Applies one action to a live bar, reporting what happened in `result`.
pub fn apply<S: KeyValueStore>(
    bar: &mut SearchBar<S>,
    action: BarAction,
    result: &mut CmdResult,
) -> Result<()> {
    match action {
        BarAction::Show => {}
        BarAction::Type(text) => bar.on_text_changed(text)?,
        BarAction::Tag { at } => {
            let before = bar.tags().len();
            let cursor = at.unwrap_or_else(|| bar.text().chars().count());
            match bar.handle_key(&KeyEvent::enter(cursor))? {
                EventOutcome::Suppressed => {
                    let tag = &bar.tags()[before];
                    result.add_message(CmdMessage::success(format!("Tagged '{}'", tag)));
                }
                EventOutcome::Ignored if before >= MAX_TAGS => result.add_message(
                    CmdMessage::warning(format!("A search can have at most {} tags.", MAX_TAGS)),
                ),
                EventOutcome::Ignored => result.add_message(CmdMessage::warning(
                    "No new tag at the cursor (empty, repeated, or contains ',').",
                )),
            }
        }
        BarAction::Untag { discard } => {
            let last = bar.tags().last().cloned();
            match (bar.handle_key(&KeyEvent::backspace(0, discard))?, last) {
                (EventOutcome::Suppressed, Some(tag)) if discard => {
                    result.add_message(CmdMessage::success(format!("Dropped tag '{}'", tag)))
                }
                (EventOutcome::Suppressed, Some(tag)) => {
                    result.add_message(CmdMessage::success(format!("Untagged '{}'", tag)))
                }
                _ => result.add_message(CmdMessage::info("There are no tags to remove.")),
            }
        }
        BarAction::Clear => {
            while bar.handle_key(&KeyEvent::backspace(0, true))? == EventOutcome::Suppressed {}
            bar.on_text_changed("")?;
            result.add_message(CmdMessage::success("Search cleared."));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::FakeCatalog;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;
    use crate::store::{SEARCH_KEY, TAGS_KEY};

    fn catalog() -> FakeCatalog {
        FakeCatalog::default().with_items(&["Rune axe", "Rune scimitar", "Dragon axe"])
    }

    #[tokio::test]
    async fn typing_persists_and_searches() {
        let catalog = catalog();
        let mut store = InMemoryStore::new();

        let result = run(&mut store, &catalog, 3, BarAction::Type("rune".into()))
            .await
            .unwrap();

        assert_eq!(store.get(SEARCH_KEY).unwrap().as_deref(), Some("rune"));
        assert_eq!(result.listed_items.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn tag_defaults_to_the_last_word() {
        let catalog = catalog();
        let mut store = StoreFixture::new().with_search("axe rune").store;

        let result = run(&mut store, &catalog, 3, BarAction::Tag { at: None })
            .await
            .unwrap();

        assert_eq!(result.bar.unwrap(), BarState {
            text: "axe ".into(),
            tags: vec!["rune".into()],
        });
        assert_eq!(store.get(TAGS_KEY).unwrap().as_deref(), Some("rune"));
        assert!(result.messages[0].content.contains("Tagged 'rune'"));
    }

    #[tokio::test]
    async fn tag_at_cursor() {
        let catalog = catalog();
        let mut store = StoreFixture::new().with_search("rune axe").store;

        let result = run(&mut store, &catalog, 3, BarAction::Tag { at: Some(0) })
            .await
            .unwrap();

        let bar = result.bar.unwrap();
        assert_eq!(bar.text, "axe");
        assert_eq!(bar.tags, ["rune"]);
    }

    #[tokio::test]
    async fn tag_limit_is_reported() {
        let catalog = catalog();
        let store = StoreFixture::new().with_search("d").with_tags(&["a", "b", "c"]).store;

        let result = run(store, &catalog, 3, BarAction::Tag { at: None }).await.unwrap();
        assert!(result.messages[0].content.contains("at most 3 tags"));
    }

    #[tokio::test]
    async fn untag_restores_or_discards() {
        let catalog = catalog();
        let mut store = StoreFixture::new().with_search("axe").with_tags(&["rune"]).store;

        let result = run(&mut store, &catalog, 3, BarAction::Untag { discard: false })
            .await
            .unwrap();
        assert_eq!(result.bar.unwrap().text, "rune axe");

        store.set(TAGS_KEY, "dragon").unwrap();
        let result = run(&mut store, &catalog, 3, BarAction::Untag { discard: true })
            .await
            .unwrap();
        let bar = result.bar.unwrap();
        assert_eq!(bar.text, "rune axe");
        assert!(bar.tags.is_empty());
        assert!(result.messages[0].content.contains("Dropped tag 'dragon'"));
    }

    #[tokio::test]
    async fn untag_without_tags_is_harmless() {
        let catalog = catalog();
        let store = StoreFixture::new().with_search("axe").store;
        let result = run(store, &catalog, 3, BarAction::Untag { discard: false })
            .await
            .unwrap();
        assert_eq!(result.bar.unwrap().text, "axe");
        assert!(result.messages[0].content.contains("no tags"));
    }

    #[test]
    fn apply_leaves_an_unfocused_bar_alone() {
        let store = StoreFixture::new().with_search("rune axe").with_tags(&["dragon"]).store;
        let mut bar = SearchBar::load(store).unwrap();
        bar.set_focused(false);

        let mut result = CmdResult::default();
        apply(&mut bar, BarAction::Tag { at: Some(0) }, &mut result).unwrap();
        apply(&mut bar, BarAction::Clear, &mut result).unwrap();

        assert_eq!(bar.tags(), ["dragon"]);
        assert_eq!(bar.text(), "");
        assert!(result.messages[0].content.contains("No new tag"));
    }

    #[tokio::test]
    async fn clear_empties_everything_and_skips_search() {
        let catalog = catalog();
        let mut store = StoreFixture::new().with_search("axe").with_tags(&["rune", "dragon"]).store;

        let result = run(&mut store, &catalog, 3, BarAction::Clear).await.unwrap();

        assert_eq!(result.bar.unwrap(), BarState::default());
        assert!(result.listed_items.is_none());
        assert_eq!(catalog.search_count(), 0);
        assert_eq!(store.get(TAGS_KEY).unwrap().as_deref(), Some(""));
    }
}
