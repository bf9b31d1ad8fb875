use crate::client::Catalog;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::session::Session;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAction {
    Show,
    Set(String),
    Clear,
}

pub async fn run<S, C>(session: &mut Session<S>, catalog: &C, action: TokenAction) -> Result<CmdResult>
where
    S: KeyValueStore,
    C: Catalog + ?Sized,
{
    let mut result = CmdResult::default();
    match action {
        TokenAction::Show => {
            if session.token().is_none() {
                result.add_message(CmdMessage::info("No api token registered."));
            } else if let Err(err) = session.ensure_user(catalog).await {
                result.add_message(CmdMessage::warning(format!(
                    "Could not look up the token's user: {}",
                    err
                )));
            }
        }
        TokenAction::Set(token) => match session.register_token(catalog, &token).await? {
            Some(user) => result.add_message(CmdMessage::success(format!(
                "Token registered to {}",
                user.email
            ))),
            None if token.trim().is_empty() => {
                result.add_message(CmdMessage::success("Token cleared."))
            }
            None => result.add_message(CmdMessage::error("The server does not know this token.")),
        },
        TokenAction::Clear => {
            session.register_token(catalog, "").await?;
            result.add_message(CmdMessage::success("Token cleared."));
        }
    }

    result.token = session.token().map(str::to_string);
    Ok(result.with_user(session.user().cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::FakeCatalog;
    use crate::commands::MessageLevel;
    use crate::model::User;
    use crate::store::memory::InMemoryStore;

    const TOKEN: &str = "0123456789abcdef0123456789abcdef01234567";

    fn catalog() -> FakeCatalog {
        FakeCatalog::default().with_user(
            TOKEN,
            User {
                username: "zezima".into(),
                email: "zezima@example.com".into(),
                first_name: Some("Ze".into()),
                last_name: Some("Zima".into()),
            },
        )
    }

    #[tokio::test]
    async fn set_show_clear() {
        let catalog = catalog();
        let mut session = Session::load(InMemoryStore::new()).unwrap();

        let set = run(&mut session, &catalog, TokenAction::Set(TOKEN.into()))
            .await
            .unwrap();
        assert_eq!(set.token.as_deref(), Some(TOKEN));
        assert!(set.messages[0].content.contains("zezima@example.com"));

        let shown = run(&mut session, &catalog, TokenAction::Show).await.unwrap();
        assert_eq!(shown.user.unwrap().username, "zezima");

        let cleared = run(&mut session, &catalog, TokenAction::Clear).await.unwrap();
        assert_eq!(cleared.token, None);
        assert_eq!(cleared.user, None);
    }

    #[tokio::test]
    async fn unknown_token_is_reported() {
        let catalog = FakeCatalog::default();
        let mut session = Session::load(InMemoryStore::new()).unwrap();

        let result = run(&mut session, &catalog, TokenAction::Set(TOKEN.into()))
            .await
            .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
        assert_eq!(result.token, None);
    }

    #[tokio::test]
    async fn show_survives_an_unreachable_server() {
        let catalog = catalog().offline();
        let mut session = Session::load(InMemoryStore::new()).unwrap();
        session.set_token(Some(TOKEN.to_string())).unwrap();

        let result = run(&mut session, &catalog, TokenAction::Show).await.unwrap();
        assert_eq!(result.token.as_deref(), Some(TOKEN));
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
    }
}
