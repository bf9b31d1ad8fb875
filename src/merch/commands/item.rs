use crate::client::Catalog;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{MerchError, Result};

/// The detail page of an item: the item itself, with favorite status when a
/// token is known, and its price history oldest first.
pub async fn run<C>(catalog: &C, item_id: u32, token: Option<&str>) -> Result<CmdResult>
where
    C: Catalog + ?Sized,
{
    let item = catalog
        .item(item_id, token)
        .await?
        .ok_or(MerchError::ItemNotFound(item_id))?;

    let mut logs = catalog.price_logs(item_id).await?.unwrap_or_default();
    logs.sort_by_key(|log| log.date);

    let mut result = CmdResult::default().with_item(item);
    if logs.is_empty() {
        result.add_message(CmdMessage::info("No price history recorded for this item."));
    }
    Ok(result.with_price_logs(logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::FakeCatalog;
    use crate::model::PriceLog;
    use chrono::{Duration, Utc};

    fn log(days_ago: i64, average: i64) -> PriceLog {
        PriceLog {
            date: Utc::now() - Duration::days(days_ago),
            item: None,
            buy_price: Some(average - 1),
            sell_price: Some(average + 1),
            average_price: Some(average),
            buy_volume: Some(100),
            sell_volume: Some(50),
        }
    }

    #[tokio::test]
    async fn item_with_sorted_history() {
        let catalog = FakeCatalog::default()
            .with_items(&["Abyssal whip"])
            .with_price_logs(1, vec![log(1, 30), log(3, 10), log(2, 20)]);

        let result = run(&catalog, 1, None).await.unwrap();

        assert_eq!(result.item.unwrap().name, "Abyssal whip");
        let averages: Vec<i64> = result
            .price_logs
            .iter()
            .filter_map(|log| log.average_price)
            .collect();
        assert_eq!(averages, [10, 20, 30]);
    }

    #[tokio::test]
    async fn favorite_status_needs_a_token() {
        let catalog = FakeCatalog::default().with_items(&["Abyssal whip"]);

        let anonymous = run(&catalog, 1, None).await.unwrap();
        assert_eq!(anonymous.item.unwrap().favorited, None);

        let known = run(&catalog, 1, Some("token")).await.unwrap();
        assert_eq!(known.item.unwrap().favorited, Some(false));
    }

    #[tokio::test]
    async fn missing_history_is_noted() {
        let catalog = FakeCatalog::default().with_items(&["Abyssal whip"]);
        let result = run(&catalog, 1, None).await.unwrap();
        assert!(result.price_logs.is_empty());
        assert!(result.messages[0].content.contains("No price history"));
    }

    #[tokio::test]
    async fn unknown_item_is_an_error() {
        let catalog = FakeCatalog::default();
        let result = run(&catalog, 99, None).await;
        assert!(matches!(result, Err(MerchError::ItemNotFound(99))));
    }
}
