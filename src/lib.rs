//! reqjar - a future-returning HTTP client wrapper
//!
//! This crate wraps a transport (`reqwest` by default) behind a client that
//! merges default and per-request options, keeps a cookie jar across
//! requests and routes traffic through validated proxy descriptors.

pub mod config;
pub mod cookies;
pub mod error;
pub mod http;
pub mod logging;
pub mod options;
pub mod proxy;
pub mod utils;

pub use config::ClientConfig;
pub use cookies::{CookieJar, CookieRecord};
pub use error::{ConfigError, ErrorKind, ReqjarError, Result, ValidationError};
pub use http::{Client, RequestSpec, Response};
pub use options::{FormField, OptionValue, TransportOption};
pub use proxy::{ProxyDescriptor, ProxyKind, ProxyOptions};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
