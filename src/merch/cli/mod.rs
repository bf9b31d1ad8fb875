//! # CLI Layer
//!
//! This module is **one possible UI client** for merch. It is the only place
//! that knows about the terminal: it turns parsed arguments into `MerchApi`
//! calls and `CmdResult`s into colored output. `main.rs` maps errors to the
//! exit code.
//!
//! - `run()`: main dispatch
//! - `init_context()`: builds the API over the data directory and item API
//! - `handle_*()`: per-command handlers
//! - `print`: output formatting

mod print;

use crate::args::{BarCommands, Cli, Commands, FavoriteCommands, TokenCommands};
use merch::api::{
    parse_line, BarAction, CmdResult, ConfigAction, FavoriteAction, MerchApi, Step, TokenAction,
};
use merch::client::MerchClient;
use merch::config::{self, MerchConfig};
use merch::error::Result;
use merch::store::fs::FileStore;
use print::{print_bar, print_item_detail, print_items, print_messages, print_token};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

struct AppContext {
    api: MerchApi<FileStore, MerchClient>,
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Search { words, tags, all }) => {
            handle_search(&mut ctx, words, tags, all).await
        }
        Some(Commands::Bar(command)) => handle_bar(&mut ctx, command).await,
        Some(Commands::Interactive) => handle_interactive(&mut ctx).await,
        Some(Commands::Item { id }) => handle_item(&mut ctx, id).await,
        Some(Commands::Prices { limit }) => handle_prices(&ctx, limit).await,
        Some(Commands::Favorites { action }) => handle_favorites(&mut ctx, action).await,
        Some(Commands::Token { action }) => handle_token(&mut ctx, action).await,
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
        None => handle_search(&mut ctx, Vec::new(), Vec::new(), false).await,
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = config::data_dir()?;
    let mut config = MerchConfig::load(&data_dir)
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "unreadable config, using defaults");
            MerchConfig::default()
        })
        .with_env_overrides();
    if let Some(url) = &cli.api_url {
        config.set_api_url(url)?;
    }
    tracing::debug!(data_dir = %data_dir.display(), api_url = %config.api_url, "starting");

    let store = FileStore::new(data_dir.clone());
    let client = MerchClient::new(config.api_url.clone());
    Ok(AppContext {
        api: MerchApi::new(store, client, config, data_dir),
    })
}

async fn handle_search(
    ctx: &mut AppContext,
    words: Vec<String>,
    tags: Vec<String>,
    all: bool,
) -> Result<()> {
    let result = if all {
        ctx.api.all_items().await?
    } else if words.is_empty() && tags.is_empty() {
        ctx.api.saved_search().await?
    } else {
        ctx.api.search(words.as_slice(), &tags).await?
    };
    if let Some(bar) = &result.bar {
        print_bar(bar);
    }
    if let Some(items) = &result.listed_items {
        print_items(items);
    }
    print_messages(&result.messages);
    Ok(())
}

async fn handle_bar(ctx: &mut AppContext, command: BarCommands) -> Result<()> {
    let action = match command {
        BarCommands::Show => BarAction::Show,
        BarCommands::Type { text } => BarAction::Type(text.join(" ")),
        BarCommands::Tag { at } => BarAction::Tag { at },
        BarCommands::Untag { discard } => BarAction::Untag { discard },
        BarCommands::Clear => BarAction::Clear,
    };

    let result = ctx.api.bar(action).await?;
    print_messages(&result.messages);
    if let Some(bar) = &result.bar {
        print_bar(bar);
    }
    if let Some(items) = &result.listed_items {
        print_items(items);
    }
    Ok(())
}

async fn handle_interactive(ctx: &mut AppContext) -> Result<()> {
    let mut repl = ctx.api.interactive()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let started = repl.start().await?;
    print_session_result(&started);
    println!("{}", merch::commands::interactive::HELP);

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match repl.handle(parse_line(&line)).await? {
            Step::Continue(result) => print_session_result(&result),
            Step::Quit => break,
        }
    }
    Ok(())
}

fn print_session_result(result: &CmdResult) {
    if let Some(bar) = &result.bar {
        print_bar(bar);
    }
    if let Some(items) = &result.listed_items {
        print_items(items);
    }
    print_messages(&result.messages);
}

async fn handle_item(ctx: &mut AppContext, id: u32) -> Result<()> {
    let result = ctx.api.item(id).await?;
    if let Some(item) = &result.item {
        print_item_detail(item, &result.price_logs);
    }
    print_messages(&result.messages);
    Ok(())
}

async fn handle_prices(ctx: &AppContext, limit: Option<usize>) -> Result<()> {
    let result = ctx.api.prices(limit).await?;
    if let Some(items) = &result.listed_items {
        print_items(items);
    }
    print_messages(&result.messages);
    Ok(())
}

async fn handle_favorites(ctx: &mut AppContext, command: Option<FavoriteCommands>) -> Result<()> {
    let action = match command {
        None | Some(FavoriteCommands::List) => FavoriteAction::List,
        Some(FavoriteCommands::Add { id }) => FavoriteAction::Add(id),
        Some(FavoriteCommands::Remove { id }) => FavoriteAction::Remove(id),
    };

    let result = ctx.api.favorites(action).await?;
    print_messages(&result.messages);
    if let Some(items) = &result.listed_items {
        if !items.is_empty() {
            print_items(items);
        }
    }
    Ok(())
}

async fn handle_token(ctx: &mut AppContext, command: Option<TokenCommands>) -> Result<()> {
    let action = match command {
        None | Some(TokenCommands::Show) => TokenAction::Show,
        Some(TokenCommands::Set { token }) => TokenAction::Set(token),
        Some(TokenCommands::Clear) => TokenAction::Clear,
    };

    let result = ctx.api.token(action).await?;
    print_messages(&result.messages);
    if let Some(token) = &result.token {
        print_token(token, result.user.as_ref());
    }
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let result = ctx.api.config(ConfigAction::from_args(key, value))?;
    print_messages(&result.messages);
    Ok(())
}
