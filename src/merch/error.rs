use thiserror::Error;

#[derive(Error, Debug)]
pub enum MerchError {
    #[error("Item not found: {0}")]
    ItemNotFound(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid api token (expected 40 hex characters)")]
    InvalidToken,

    #[error("An api token is required, register one with `merch token set <TOKEN>`")]
    TokenRequired,

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, MerchError>;
