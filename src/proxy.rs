//! Proxy descriptors
//!
//! A [`ProxyDescriptor`] is validated once at construction and renders to a
//! connection URL of the form `scheme://[username:password@]host:port`.

use crate::error::{ConfigError, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Characters that must be escaped inside the userinfo part of a URL
const USERINFO: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Proxy protocols supported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    Http,
    Http10,
    Socks4,
    Socks4a,
    Socks5,
    Socks5h,
}

impl ProxyKind {
    pub const ALL: [ProxyKind; 6] = [
        ProxyKind::Http,
        ProxyKind::Http10,
        ProxyKind::Socks4,
        ProxyKind::Socks4a,
        ProxyKind::Socks5,
        ProxyKind::Socks5h,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Http => "http",
            ProxyKind::Http10 => "http10",
            ProxyKind::Socks4 => "socks4",
            ProxyKind::Socks4a => "socks4a",
            ProxyKind::Socks5 => "socks5",
            ProxyKind::Socks5h => "socks5h",
        }
    }

    /// Scheme understood by the HTTP transport. HTTP/1.0 proxies are
    /// reached through the plain `http` connector.
    pub fn transport_scheme(&self) -> &'static str {
        match self {
            ProxyKind::Http10 => "http",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(ProxyKind::Http),
            "http10" => Ok(ProxyKind::Http10),
            "socks4" => Ok(ProxyKind::Socks4),
            "socks4a" => Ok(ProxyKind::Socks4a),
            "socks5" => Ok(ProxyKind::Socks5),
            "socks5h" => Ok(ProxyKind::Socks5h),
            _ => Err(ConfigError::UnsupportedProxyScheme(s.to_string())),
        }
    }
}

/// Raw proxy settings, as supplied by a caller or a configuration map
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyOptions {
    #[serde(alias = "type")]
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyOptions {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port),
            ..Self::default()
        }
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

/// Validated proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyDescriptor {
    kind: ProxyKind,
    host: String,
    port: u16,
    credentials: Option<ProxyCredentials>,
}

impl ProxyDescriptor {
    /// Validate proxy settings.
    ///
    /// Host and port are checked before the scheme. Credentials are kept only
    /// when both the username and the password are given.
    pub fn new(options: ProxyOptions) -> Result<Self> {
        let host = options
            .host
            .filter(|host| !host.trim().is_empty())
            .ok_or(ConfigError::MissingProxyHost)?;
        let port = options
            .port
            .filter(|port| *port != 0)
            .ok_or(ConfigError::MissingProxyPort)?;

        let kind = match options.scheme.as_deref() {
            Some(scheme) => scheme.parse::<ProxyKind>()?,
            None => ProxyKind::Http,
        };

        let credentials = match (options.username, options.password) {
            (Some(username), Some(password)) => Some(ProxyCredentials { username, password }),
            (None, None) => None,
            _ => {
                log::warn!("Ignoring incomplete proxy credentials for {}:{}", host, port);
                None
            }
        };

        let descriptor = Self {
            kind,
            host: host.trim().to_string(),
            port,
            credentials,
        };

        let rendered = descriptor.to_connection_string();
        Url::parse(&rendered).map_err(|e| ConfigError::InvalidProxyUrl {
            url: descriptor.redacted(),
            reason: e.to_string(),
        })?;

        Ok(descriptor)
    }

    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn credentials(&self) -> Option<&ProxyCredentials> {
        self.credentials.as_ref()
    }

    /// Render `scheme://[username:password@]host:port`
    pub fn to_connection_string(&self) -> String {
        self.render(self.kind.as_str(), true)
    }

    fn redacted(&self) -> String {
        self.render(self.kind.as_str(), false)
    }

    fn render(&self, scheme: &str, with_auth: bool) -> String {
        let auth = match (&self.credentials, with_auth) {
            (Some(creds), true) => format!(
                "{}:{}@",
                utf8_percent_encode(&creds.username, USERINFO),
                utf8_percent_encode(&creds.password, USERINFO)
            ),
            _ => String::new(),
        };
        format!("{}://{}{}:{}", scheme, auth, self.host, self.port)
    }
}

impl fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

impl TryFrom<ProxyOptions> for ProxyDescriptor {
    type Error = crate::error::ReqjarError;

    fn try_from(options: ProxyOptions) -> Result<Self> {
        ProxyDescriptor::new(options)
    }
}
