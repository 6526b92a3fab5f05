//! Per-request options and transport option assembly

use std::collections::BTreeMap;

use reqwest::Method;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::cookies::CookieJar;
use crate::error::{Result, ValidationError};
use crate::options::{resolve_options, FormField, OptionList, OptionValue, TransportOption};
use crate::utils::{StringUtils, UrlUtils};

/// Options of a single request. Anything left unset falls back to the
/// client's defaults.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Option<String>,
    pub url: Option<String>,
    /// Raw `name: value` header lines added after the client's defaults
    pub headers: Vec<String>,
    pub referer: Option<String>,
    /// Jar serialized into the outgoing `Cookie` header
    pub cookies: Option<CookieJar>,
    /// Body value; only sent with `POST`
    pub body: Option<Value>,
    pub follow_redirects: bool,
    pub timeout_secs: Option<u64>,
    pub transport_options: BTreeMap<String, OptionValue>,
}

impl Default for RequestSpec {
    fn default() -> Self {
        RequestSpec {
            method: None,
            url: None,
            headers: Vec::new(),
            referer: None,
            cookies: None,
            body: None,
            follow_redirects: true,
            timeout_secs: None,
            transport_options: BTreeMap::new(),
        }
    }
}

impl RequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn cookies(mut self, jar: CookieJar) -> Self {
        self.cookies = Some(jar);
        self
    }

    /// Raw body value. Strings are sent as-is, objects are URL-encoded and
    /// arrays of `{name, contents}` objects are sent as multipart fields.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn form<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = fields
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect::<serde_json::Map<_, _>>();
        self.body(Value::Object(map))
    }

    pub fn multipart<I>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = FormField>,
    {
        let fields = fields
            .into_iter()
            .map(|field| serde_json::json!({ "name": field.name, "contents": field.contents }))
            .collect::<Vec<_>>();
        self.body(Value::Array(fields))
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.transport_options.insert(name.into(), value.into());
        self
    }
}

/// Classified request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Text(String),
    /// URL-encoded form string
    Form(String),
    Multipart(Vec<FormField>),
}

impl RequestBody {
    fn into_option(self) -> (TransportOption, OptionValue) {
        match self {
            RequestBody::Text(text) | RequestBody::Form(text) => {
                (TransportOption::PostFields, OptionValue::Text(text))
            }
            RequestBody::Multipart(fields) => {
                (TransportOption::HttpPost, OptionValue::Form(fields))
            }
        }
    }
}

impl TryFrom<&Value> for RequestBody {
    type Error = ValidationError;

    fn try_from(value: &Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(RequestBody::Text(text.clone())),
            Value::Object(map) => {
                let mut form = url::form_urlencoded::Serializer::new(String::new());
                for (key, value) in map {
                    match value {
                        Value::Array(items) => {
                            for item in items {
                                form.append_pair(key, &form_scalar(key, item)?);
                            }
                        }
                        other => {
                            form.append_pair(key, &form_scalar(key, other)?);
                        }
                    }
                }
                Ok(RequestBody::Form(form.finish()))
            }
            Value::Array(items) => items
                .iter()
                .map(form_field)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(RequestBody::Multipart),
            Value::Null => Err(ValidationError::UnsupportedBody("null".to_string())),
            Value::Bool(_) => Err(ValidationError::UnsupportedBody("boolean".to_string())),
            Value::Number(_) => Err(ValidationError::UnsupportedBody("number".to_string())),
        }
    }
}

fn form_scalar(key: &str, value: &Value) -> std::result::Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(ValidationError::UnsupportedBody(format!(
            "nested value for form field '{}'",
            key
        ))),
    }
}

fn form_field(item: &Value) -> std::result::Result<FormField, ValidationError> {
    let name = item.get("name").and_then(Value::as_str);
    let contents = item.get("contents").map(|contents| match contents {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    });
    match (name, contents) {
        (Some(name), Some(Some(contents))) => Ok(FormField::new(name, contents)),
        _ => Err(ValidationError::UnsupportedBody(
            "multipart entries need a string 'name' and scalar 'contents'".to_string(),
        )),
    }
}

/// Normalize a method name to its upper-case token
pub fn normalize_method(method: Option<&str>) -> std::result::Result<Method, ValidationError> {
    let method = method.ok_or(ValidationError::MissingMethod)?;
    let upper = method.trim().to_uppercase();
    Method::from_bytes(upper.as_bytes())
        .map_err(|_| ValidationError::InvalidMethod(method.to_string()))
}

/// Assemble the flat transport option list for one request.
///
/// Checks run method, url, body, then option names. Output order: client
/// transport options, assembled request options, body, proxy, per-call
/// overrides. `jar` is the client's jar and is only read.
pub fn build_options(
    config: &ClientConfig,
    spec: &RequestSpec,
    jar: &CookieJar,
) -> Result<OptionList> {
    let method = normalize_method(spec.method.as_deref())?;
    let url = match spec.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => UrlUtils::validate_url(url)?,
        _ => return Err(ValidationError::MissingUrl.into()),
    };

    let body = match &spec.body {
        Some(body) if method == Method::POST => Some(RequestBody::try_from(body)?),
        Some(_) => {
            log::debug!("Ignoring request body for {} request", method);
            None
        }
        None => None,
    };

    let mut options = resolve_options(&config.transport_options)?;
    let overrides = resolve_options(&spec.transport_options)?;

    let referer = spec.referer.as_ref().unwrap_or(&config.referer);
    let timeout = spec.timeout_secs.unwrap_or(config.timeout_secs);

    options.push((TransportOption::Referer, OptionValue::from(referer.as_str())));
    options.push((TransportOption::Timeout, OptionValue::from(timeout)));
    options.push((
        TransportOption::FollowLocation,
        OptionValue::Bool(spec.follow_redirects),
    ));
    options.push((TransportOption::Url, OptionValue::Text(url.to_string())));
    options.push((
        TransportOption::CustomRequest,
        OptionValue::Text(method.as_str().to_string()),
    ));
    options.push((
        TransportOption::HttpHeader,
        OptionValue::List(request_headers(config, spec, jar)),
    ));

    if let Some(body) = body {
        options.push(body.into_option());
    }

    if let Some(proxy) = &config.proxy {
        options.push((
            TransportOption::Proxy,
            OptionValue::Text(proxy.to_connection_string()),
        ));
    }

    options.extend(overrides);
    log::debug!("Built {} transport options for {} {}", options.len(), method, url);
    Ok(options)
}

/// Client headers followed by request headers, without any caller `Cookie`
/// header, then a single `Cookie` line from the active jar.
fn request_headers(config: &ClientConfig, spec: &RequestSpec, jar: &CookieJar) -> Vec<String> {
    let mut headers = config
        .default_headers
        .iter()
        .chain(spec.headers.iter())
        .filter(|header| {
            !StringUtils::header_name(header)
                .is_some_and(|name| name.eq_ignore_ascii_case("cookie"))
        })
        .cloned()
        .collect::<Vec<_>>();

    let cookies = spec.cookies.as_ref().unwrap_or(jar).to_request_header_value();
    if !cookies.is_empty() {
        headers.push(format!("Cookie: {}", cookies));
    }
    headers
}
