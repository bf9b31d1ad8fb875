use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::search::{ItemSource, SearchBar, SearchCache};
use crate::store::KeyValueStore;

pub fn too_short_message(min_characters: usize) -> CmdMessage {
    CmdMessage::info(format!(
        "Type at least {} characters or add a tag to search.",
        min_characters
    ))
}

/// Runs one search through `cache` and packs the outcome into a result.
pub async fn run<C>(
    source: &C,
    cache: &mut SearchCache,
    text: &str,
    tags: &[String],
) -> Result<CmdResult>
where
    C: ItemSource + ?Sized,
{
    match cache.search(source, text, tags).await? {
        Some(items) => Ok(CmdResult::default().with_listed_items(items)),
        None => Ok(CmdResult::default().with_message(too_short_message(cache.min_characters()))),
    }
}

/// Searches with the text and tags the search bar remembers.
pub async fn run_saved<S, C>(store: S, source: &C, min_characters: usize) -> Result<CmdResult>
where
    S: KeyValueStore,
    C: ItemSource + ?Sized,
{
    let bar = SearchBar::load(store)?;
    let mut cache = SearchCache::new(min_characters);
    let mut result = run(source, &mut cache, bar.text(), bar.tags()).await?;
    result.bar = Some(super::BarState {
        text: bar.text().to_string(),
        tags: bar.tags().to_vec(),
    });
    Ok(result)
}
