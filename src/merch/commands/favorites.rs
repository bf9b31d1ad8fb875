use crate::client::Catalog;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    List,
    Add(u32),
    Remove(u32),
}

pub async fn run<C>(catalog: &C, token: &str, action: FavoriteAction) -> Result<CmdResult>
where
    C: Catalog + ?Sized,
{
    match action {
        FavoriteAction::List => list(catalog, token).await,
        FavoriteAction::Add(item_id) => {
            let message = if catalog.favorite(item_id, token).await? {
                CmdMessage::success(format!("Added item {} to favorites.", item_id))
            } else {
                CmdMessage::warning(format!("Item {} was not favorited.", item_id))
            };
            Ok(list(catalog, token).await?.with_message(message))
        }
        FavoriteAction::Remove(item_id) => {
            let message = if catalog.unfavorite(item_id, token).await? {
                CmdMessage::success(format!("Removed item {} from favorites.", item_id))
            } else {
                CmdMessage::warning(format!("Item {} was not a favorite.", item_id))
            };
            Ok(list(catalog, token).await?.with_message(message))
        }
    }
}

async fn list<C>(catalog: &C, token: &str) -> Result<CmdResult>
where
    C: Catalog + ?Sized,
{
    let items = catalog.favorites(token).await?;
    let mut result = CmdResult::default();
    if items.is_empty() {
        result.add_message(CmdMessage::info("No favorites yet."));
    }
    Ok(result.with_listed_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::FakeCatalog;
    use crate::model::User;

    const TOKEN: &str = "0123456789abcdef0123456789abcdef01234567";

    fn catalog() -> FakeCatalog {
        FakeCatalog::default()
            .with_items(&["Abyssal whip", "Dragon dagger"])
            .with_user(
                TOKEN,
                User {
                    username: "zezima".into(),
                    email: "z@example.com".into(),
                    first_name: None,
                    last_name: None,
                },
            )
    }

    #[tokio::test]
    async fn add_then_list() {
        let catalog = catalog();

        let added = run(&catalog, TOKEN, FavoriteAction::Add(2)).await.unwrap();
        let names: Vec<String> = added
            .listed_items
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, ["Dragon dagger"]);
        assert!(added.messages[0].content.contains("Added item 2"));
    }

    #[tokio::test]
    async fn remove_reports_non_favorites() {
        let catalog = catalog();
        let result = run(&catalog, TOKEN, FavoriteAction::Remove(1)).await.unwrap();
        assert!(result.messages.iter().any(|m| m.content.contains("was not a favorite")));
    }

    #[tokio::test]
    async fn empty_list_says_so() {
        let catalog = catalog();
        let result = run(&catalog, TOKEN, FavoriteAction::List).await.unwrap();
        assert!(result.listed_items.unwrap().is_empty());
        assert!(result.messages[0].content.contains("No favorites"));
    }

    #[tokio::test]
    async fn unknown_token_fails() {
        let catalog = catalog();
        assert!(run(&catalog, "nope", FavoriteAction::List).await.is_err());
    }
}
