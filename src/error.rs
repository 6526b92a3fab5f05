//! Error handling for reqjar

use thiserror::Error;

/// Main error type for reqjar operations
#[derive(Error, Debug)]
pub enum ReqjarError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: gave up after {0} redirects")]
    TooManyRedirects(u64),
}

/// Errors raised while constructing a client or a proxy descriptor
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unsupported proxy type: {0}")]
    UnsupportedProxyScheme(String),

    #[error("proxy host is required")]
    MissingProxyHost,

    #[error("proxy port is required")]
    MissingProxyPort,

    #[error("invalid proxy url '{url}': {reason}")]
    InvalidProxyUrl { url: String, reason: String },

    #[error("invalid client options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Errors raised while assembling the options of a single request
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("request method is required")]
    MissingMethod,

    #[error("invalid request method: {0}")]
    InvalidMethod(String),

    #[error("request url is required")]
    MissingUrl,

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported request body: {0}")]
    UnsupportedBody(String),

    #[error("unknown transport option: {0}")]
    UnknownOption(String),

    #[error("transport option {option} expects {expected}")]
    InvalidOptionValue {
        option: String,
        expected: &'static str,
    },

    #[error("invalid header line: '{0}'. Expected 'name: value'")]
    InvalidHeader(String),
}

/// Coarse classification of a [`ReqjarError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Validation,
    Transport,
}

impl ReqjarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReqjarError::Config(_) => ErrorKind::Config,
            ReqjarError::Validation(_) => ErrorKind::Validation,
            ReqjarError::Http(_) | ReqjarError::TooManyRedirects(_) => ErrorKind::Transport,
        }
    }
}

/// Result type alias for reqjar operations
pub type Result<T> = std::result::Result<T, ReqjarError>;
