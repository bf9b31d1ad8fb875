use crate::commands::{CmdMessage, CmdResult};
use crate::config::MerchConfig;
use crate::error::{MerchError, Result};
use std::path::Path;

pub const API_URL_KEY: &str = "api-url";
pub const MIN_CHARACTERS_KEY: &str = "min-characters";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

impl ConfigAction {
    pub fn from_args(key: Option<String>, value: Option<String>) -> Self {
        match (key, value) {
            (None, _) => ConfigAction::ShowAll,
            (Some(key), None) => ConfigAction::ShowKey(key),
            (Some(key), Some(value)) => ConfigAction::Set(key, value),
        }
    }
}

pub fn run(config_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    let mut config = MerchConfig::load(config_dir)?;
    let mut result = CmdResult::default();

    match action {
        ConfigAction::ShowAll => {
            result.add_message(CmdMessage::info(format!("{} = {}", API_URL_KEY, config.api_url)));
            result.add_message(CmdMessage::info(format!(
                "{} = {}",
                MIN_CHARACTERS_KEY, config.min_characters
            )));
        }
        ConfigAction::ShowKey(key) => {
            let value = match key.as_str() {
                API_URL_KEY => config.api_url.clone(),
                MIN_CHARACTERS_KEY => config.min_characters.to_string(),
                other => return Err(unknown_key(other)),
            };
            result.add_message(CmdMessage::info(format!("{} = {}", key, value)));
        }
        ConfigAction::Set(key, value) => {
            match key.as_str() {
                API_URL_KEY => config.set_api_url(&value)?,
                MIN_CHARACTERS_KEY => config.set_min_characters(&value)?,
                other => return Err(unknown_key(other)),
            }
            config.save(config_dir)?;
            result.add_message(CmdMessage::success(format!("{} set to {}", key, value.trim())));
        }
    }

    Ok(result.with_config(config))
}

fn unknown_key(key: &str) -> MerchError {
    MerchError::Api(format!(
        "Unknown config key: {} (expected {} or {})",
        key, API_URL_KEY, MIN_CHARACTERS_KEY
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_show() {
        let dir = tempfile::tempdir().unwrap();

        run(
            dir.path(),
            ConfigAction::Set(MIN_CHARACTERS_KEY.into(), "4".into()),
        )
        .unwrap();
        let shown = run(dir.path(), ConfigAction::ShowKey(MIN_CHARACTERS_KEY.into())).unwrap();

        assert_eq!(shown.config.unwrap().min_characters, 4);
        assert_eq!(shown.messages[0].content, "min-characters = 4");
    }

    #[test]
    fn show_all_lists_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(dir.path(), ConfigAction::ShowAll).unwrap();
        assert_eq!(result.messages.len(), 2);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(dir.path(), ConfigAction::ShowKey("color".into())).is_err());
        assert!(run(dir.path(), ConfigAction::Set("color".into(), "red".into())).is_err());
    }

    #[test]
    fn action_from_args() {
        assert_eq!(ConfigAction::from_args(None, None), ConfigAction::ShowAll);
        assert_eq!(
            ConfigAction::from_args(Some("api-url".into()), Some("http://x".into())),
            ConfigAction::Set("api-url".into(), "http://x".into())
        );
    }
}
