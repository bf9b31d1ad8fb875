use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "merch", version)]
#[command(about = "Marketplace item lookup: search, prices and favorites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Item API root, overriding the configured one
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search items by name, optionally within tags
    #[command(alias = "s")]
    Search {
        /// Name fragment (words are joined with spaces)
        words: Vec<String>,

        /// Restrict to a tag (repeatable, at most 3)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// List every item instead of searching
        #[arg(long, conflicts_with_all = ["words", "tags"])]
        all: bool,
    },

    /// Edit the saved search bar, then search with it
    #[command(subcommand)]
    Bar(BarCommands),

    /// Search session reading one line at a time
    #[command(alias = "i")]
    Interactive,

    /// Show an item with its price history
    Item {
        /// Item id
        id: u32,
    },

    /// Latest prices, best margin first
    Prices {
        /// Show only the first N items
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List or change favorites (needs an api token)
    #[command(alias = "fav")]
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteCommands>,
    },

    /// Show, register or clear the api token
    Token {
        #[command(subcommand)]
        action: Option<TokenCommands>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (api-url, min-characters)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BarCommands {
    /// Print the saved text and tags, and search
    Show,

    /// Replace the text
    Type {
        /// New text (words are joined with spaces)
        #[arg(num_args = 0..)]
        text: Vec<String>,
    },

    /// Turn the word at the cursor into a tag
    Tag {
        /// Cursor position in characters (default: end of text)
        #[arg(long)]
        at: Option<usize>,
    },

    /// Move the last tag back into the text
    Untag {
        /// Drop the tag instead
        #[arg(short, long)]
        discard: bool,
    },

    /// Drop text and tags
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum FavoriteCommands {
    /// List favorites
    List,

    /// Favorite an item
    Add { id: u32 },

    /// Unfavorite an item
    #[command(alias = "rm")]
    Remove { id: u32 },
}

#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    /// Show the token and its user
    Show,

    /// Register a token (40 hex characters)
    Set { token: String },

    /// Forget the token
    Clear,
}
