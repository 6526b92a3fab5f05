//! Transport option names and values
//!
//! Option names form a closed set. Caller-supplied option maps are keyed by
//! name strings and checked against [`OPTION_TABLE`] case-insensitively.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Options understood by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportOption {
    Url,
    CustomRequest,
    HttpHeader,
    Referer,
    UserAgent,
    Timeout,
    ConnectTimeout,
    FollowLocation,
    MaxRedirs,
    Proxy,
    PostFields,
    HttpPost,
    UserPwd,
    SslVerifyPeer,
    TcpNoDelay,
}

/// Allow-list of option names
pub const OPTION_TABLE: &[(&str, TransportOption)] = &[
    ("URL", TransportOption::Url),
    ("CUSTOMREQUEST", TransportOption::CustomRequest),
    ("HTTPHEADER", TransportOption::HttpHeader),
    ("REFERER", TransportOption::Referer),
    ("USERAGENT", TransportOption::UserAgent),
    ("TIMEOUT", TransportOption::Timeout),
    ("CONNECTTIMEOUT", TransportOption::ConnectTimeout),
    ("FOLLOWLOCATION", TransportOption::FollowLocation),
    ("MAXREDIRS", TransportOption::MaxRedirs),
    ("PROXY", TransportOption::Proxy),
    ("POSTFIELDS", TransportOption::PostFields),
    ("HTTPPOST", TransportOption::HttpPost),
    ("USERPWD", TransportOption::UserPwd),
    ("SSL_VERIFYPEER", TransportOption::SslVerifyPeer),
    ("TCP_NODELAY", TransportOption::TcpNoDelay),
];

/// Shape of value an option accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Integer,
    Text,
    List,
    Form,
}

impl ValueType {
    fn describe(&self) -> &'static str {
        match self {
            ValueType::Bool => "a boolean",
            ValueType::Integer => "a non-negative integer",
            ValueType::Text => "a string",
            ValueType::List => "a list of strings",
            ValueType::Form => "a list of form fields",
        }
    }
}

impl TransportOption {
    pub fn name(&self) -> &'static str {
        OPTION_TABLE
            .iter()
            .find(|(_, option)| option == self)
            .map(|(name, _)| *name)
            .unwrap_or("UNKNOWN")
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            TransportOption::Url
            | TransportOption::CustomRequest
            | TransportOption::Referer
            | TransportOption::UserAgent
            | TransportOption::Proxy
            | TransportOption::PostFields
            | TransportOption::UserPwd => ValueType::Text,
            TransportOption::Timeout
            | TransportOption::ConnectTimeout
            | TransportOption::MaxRedirs => ValueType::Integer,
            TransportOption::FollowLocation
            | TransportOption::SslVerifyPeer
            | TransportOption::TcpNoDelay => ValueType::Bool,
            TransportOption::HttpHeader => ValueType::List,
            TransportOption::HttpPost => ValueType::Form,
        }
    }

    /// Check that `value` fits this option. Boolean options also take `0`
    /// and `1`.
    pub fn validate(&self, value: &OptionValue) -> Result<(), ValidationError> {
        let fits = match (self.value_type(), value) {
            (ValueType::Bool, OptionValue::Bool(_)) => true,
            (ValueType::Bool, OptionValue::Integer(n)) => *n == 0 || *n == 1,
            (ValueType::Integer, OptionValue::Integer(n)) => *n >= 0,
            (ValueType::Text, OptionValue::Text(_)) => true,
            (ValueType::List, OptionValue::List(_)) => true,
            (ValueType::Form, OptionValue::Form(_)) => true,
            _ => false,
        };
        if fits {
            Ok(())
        } else {
            Err(ValidationError::InvalidOptionValue {
                option: self.name().to_string(),
                expected: self.value_type().describe(),
            })
        }
    }
}

impl fmt::Display for TransportOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransportOption {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPTION_TABLE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, option)| *option)
            .ok_or_else(|| ValidationError::UnknownOption(s.to_string()))
    }
}

/// A multipart form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub contents: String,
}

impl FormField {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Value of a transport option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    List(Vec<String>),
    Form(Vec<FormField>),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Integer(n) => Some(*n != 0),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            OptionValue::Integer(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        OptionValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        OptionValue::List(value)
    }
}

impl From<Vec<FormField>> for OptionValue {
    fn from(value: Vec<FormField>) -> Self {
        OptionValue::Form(value)
    }
}

/// Flat option list handed to the transport. Later entries win.
pub type OptionList = Vec<(TransportOption, OptionValue)>;

/// Resolve a name-keyed option map against the allow-list, failing on the
/// first unknown name or mistyped value.
pub fn resolve_options(
    options: &BTreeMap<String, OptionValue>,
) -> Result<OptionList, ValidationError> {
    options
        .iter()
        .map(|(name, value)| {
            let option = name.parse::<TransportOption>()?;
            option.validate(value)?;
            Ok((option, value.clone()))
        })
        .collect()
}
