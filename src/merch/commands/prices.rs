use crate::client::Catalog;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Item;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Every item with its latest price, best margin first. Items without a
/// recorded price are left out.
pub async fn run<C>(catalog: &C, limit: Option<usize>) -> Result<CmdResult>
where
    C: Catalog + ?Sized,
{
    let mut latest: HashMap<u32, _> = HashMap::new();
    for log in catalog.latest_prices().await? {
        let Some(item_id) = log.item.as_ref().map(|item| item.item_id()) else {
            continue;
        };
        latest.insert(item_id, log);
    }

    let mut items: Vec<Item> = catalog
        .items()
        .await?
        .into_iter()
        .filter_map(|mut item| {
            let log = latest.remove(&item.item_id)?;
            item.price_log = Some(log);
            Some(item)
        })
        .collect();
    items.sort_by_key(|item| Reverse(item.price_log.as_ref().and_then(|log| log.profit())));
    if let Some(limit) = limit {
        items.truncate(limit);
    }

    let mut result = CmdResult::default();
    if items.is_empty() {
        result.add_message(CmdMessage::info("No prices recorded yet."));
    }
    Ok(result.with_listed_items(items))
}

/// Every item the server knows, unfiltered.
pub async fn all_items<C>(catalog: &C) -> Result<CmdResult>
where
    C: Catalog + ?Sized,
{
    let mut items = catalog.items().await?;
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(CmdResult::default().with_listed_items(items))
}
