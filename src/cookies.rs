//! Cookie jar shared across the requests of one client
//!
//! The jar keeps one record per cookie name in insertion order. Parsing of
//! the cookie grammar is delegated to the `cookie` crate.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

/// Attributes carried by a `Set-Cookie` line besides name, value and domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieAttributes {
    pub path: Option<String>,
    pub expires: Option<SystemTime>,
    pub max_age_secs: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
}

/// A single cookie held by a [`CookieJar`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub attributes: CookieAttributes,
}

impl CookieRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            attributes: CookieAttributes::default(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Parse the value part of a `Set-Cookie` header
    pub fn parse_set_cookie(value: &str) -> Option<Self> {
        match cookie::Cookie::parse(value) {
            Ok(parsed) => Some(Self::from(&parsed)),
            Err(err) => {
                log::debug!("Ignoring malformed cookie '{}': {}", value, err);
                None
            }
        }
    }

    fn to_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl From<&cookie::Cookie<'_>> for CookieRecord {
    fn from(parsed: &cookie::Cookie<'_>) -> Self {
        let expires = match parsed.expires() {
            Some(cookie::Expiration::DateTime(offset)) => Some(SystemTime::from(offset)),
            None | Some(cookie::Expiration::Session) => None,
        };
        Self {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain: parsed.domain().map(|d| d.to_string()),
            attributes: CookieAttributes {
                path: parsed.path().map(|p| p.to_string()),
                expires,
                max_age_secs: parsed.max_age().map(|age| age.whole_seconds()),
                secure: parsed.secure().unwrap_or(false),
                http_only: parsed.http_only().unwrap_or(false),
                same_site: parsed.same_site().map(|s| s.to_string()),
            },
        }
    }
}

#[derive(Debug, Default)]
struct CookieStore {
    records: Vec<CookieRecord>,
}

impl CookieStore {
    fn set(&mut self, record: CookieRecord) {
        match self.records.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    fn ingest(&mut self, line: &str) {
        if let Some(record) = set_cookie_value(line).and_then(CookieRecord::parse_set_cookie) {
            log::trace!("Storing cookie {}", record.name);
            self.set(record);
        }
    }
}

/// Value of a `Set-Cookie:` header line, or `None` for any other line
fn set_cookie_value(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (name, value) = line.split_once(':')?;
    if name.trim().eq_ignore_ascii_case("set-cookie") {
        Some(value.trim())
    } else {
        None
    }
}

/// Handle to a shared, ordered cookie store.
///
/// Clones refer to the same store, so a jar returned with a response observes
/// every later mutation made through the client.
#[derive(Debug, Clone, Default)]
pub struct CookieJar(Arc<RwLock<CookieStore>>);

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a jar from a raw `Cookie` request header, tagging every record
    /// with `domain`.
    pub fn from_request_header(value: &str, domain: &str) -> Self {
        let jar = Self::new();
        {
            let mut store = jar.write();
            for parsed in cookie::Cookie::split_parse(value) {
                match parsed {
                    Ok(parsed) => store.set(CookieRecord::from(&parsed).with_domain(domain)),
                    Err(err) => log::debug!("Skipping malformed request cookie: {}", err),
                }
            }
        }
        jar
    }

    /// Insert `record`, replacing the value and attributes of a cookie with
    /// the same name while keeping its position.
    pub fn set(&self, record: CookieRecord) {
        self.write().set(record);
    }

    pub fn get(&self, name: &str) -> Option<CookieRecord> {
        self.read().records.iter().find(|r| r.name == name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<CookieRecord> {
        let mut store = self.write();
        let index = store.records.iter().position(|r| r.name == name)?;
        Some(store.records.remove(index))
    }

    pub fn clear(&self) {
        self.write().records.clear();
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    /// Snapshot of all records in insertion order
    pub fn records(&self) -> Vec<CookieRecord> {
        self.read().records.clone()
    }

    /// Fold a single raw response header line into the jar. Lines other than
    /// `Set-Cookie` and malformed cookies are ignored.
    pub fn ingest_response_header(&self, line: &str) {
        self.write().ingest(line);
    }

    /// Fold every header line of one response into the jar under a single
    /// write lock.
    pub fn ingest_response_headers<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = self.write();
        for line in lines {
            store.ingest(line.as_ref());
        }
    }

    /// `name=value` pairs joined by `; ` in insertion order
    pub fn to_request_header_value(&self) -> String {
        self.read()
            .records
            .iter()
            .map(CookieRecord::to_pair)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Whether both handles refer to the same store
    pub fn ptr_eq(&self, other: &CookieJar) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn read(&self) -> RwLockReadGuard<'_, CookieStore> {
        self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CookieStore> {
        self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
