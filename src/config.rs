//! Configuration management for reqjar

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::cookies::CookieJar;
use crate::error::{ConfigError, ReqjarError, Result};
use crate::options::OptionValue;
use crate::proxy::{ProxyDescriptor, ProxyOptions};

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_REFERER: &str = "google.com";

/// Client-level defaults applied to every request
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Raw `name: value` header lines sent with every request
    pub default_headers: Vec<String>,
    pub timeout_secs: u64,
    pub referer: String,
    pub proxy: Option<ProxyDescriptor>,
    /// Name-keyed transport options, checked when a request is built
    pub transport_options: BTreeMap<String, OptionValue>,
    /// Start from a fresh jar even when `cookie_jar` is set
    pub save_cookies: bool,
    pub cookie_jar: Option<CookieJar>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            default_headers: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            referer: DEFAULT_REFERER.to_string(),
            proxy: None,
            transport_options: BTreeMap::new(),
            save_cookies: false,
            cookie_jar: None,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from a JSON options map such as
    /// `{"headers": ["x-test: 1"], "timeoutSeconds": 2}`.
    pub fn from_json(input: &str) -> Result<Self> {
        let options: ClientOptions =
            serde_json::from_str(input).map_err(ConfigError::InvalidOptions)?;
        ClientConfig::try_from(options)
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.default_headers.push(header.into());
        self
    }

    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_headers.extend(headers.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyDescriptor) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.transport_options.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie_jar(mut self, jar: CookieJar) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    pub fn with_save_cookies(mut self, save_cookies: bool) -> Self {
        self.save_cookies = save_cookies;
        self
    }

    /// Jar the client starts with
    pub(crate) fn initial_jar(&self) -> CookieJar {
        match (&self.cookie_jar, self.save_cookies) {
            (Some(jar), false) => jar.clone(),
            _ => CookieJar::new(),
        }
    }
}

/// Either a single header line or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HeaderList {
    One(String),
    Many(Vec<String>),
}

impl Default for HeaderList {
    fn default() -> Self {
        HeaderList::Many(Vec::new())
    }
}

impl From<HeaderList> for Vec<String> {
    fn from(headers: HeaderList) -> Self {
        match headers {
            HeaderList::One(header) => vec![header],
            HeaderList::Many(headers) => headers,
        }
    }
}

/// Serialized form of [`ClientConfig`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientOptions {
    pub save_cookies: bool,
    pub headers: HeaderList,
    #[serde(alias = "timeout")]
    pub timeout_seconds: u64,
    pub transport_options: BTreeMap<String, OptionValue>,
    pub referer: String,
    pub proxy: Option<ProxyOptions>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            save_cookies: false,
            headers: HeaderList::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            transport_options: BTreeMap::new(),
            referer: DEFAULT_REFERER.to_string(),
            proxy: None,
        }
    }
}

impl TryFrom<ClientOptions> for ClientConfig {
    type Error = ReqjarError;

    fn try_from(options: ClientOptions) -> Result<Self> {
        let proxy = options.proxy.map(ProxyDescriptor::new).transpose()?;
        Ok(ClientConfig {
            default_headers: options.headers.into(),
            timeout_secs: options.timeout_seconds,
            referer: options.referer,
            proxy,
            transport_options: options.transport_options,
            save_cookies: options.save_cookies,
            cookie_jar: None,
        })
    }
}
