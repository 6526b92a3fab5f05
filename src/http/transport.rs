//! Transport seam
//!
//! A [`Transport`] takes the flat option list built for one request and
//! performs the network call. [`ReqwestTransport`] is the default
//! implementation.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION, REFERER};
use reqwest::{Client, ClientBuilder, Method, StatusCode, Url};

use super::auth::Auth;
use super::request::normalize_method;
use crate::error::{ReqjarError, Result, ValidationError};
use crate::options::{FormField, OptionList, OptionValue, TransportOption};
use crate::proxy::ProxyKind;
use crate::utils::StringUtils;

/// Redirect limit when `MAXREDIRS` is not set
pub const DEFAULT_MAX_REDIRS: u64 = 50;

/// Raw outcome of a transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status_code: u16,
    /// Header lines of every response in the redirect chain in receipt
    /// order, each block starting with its status line
    pub header_lines: Vec<String>,
    pub body: String,
}

/// Performs a request described by an option list
pub trait Transport: Send + Sync {
    fn perform(&self, options: OptionList) -> impl Future<Output = Result<TransportReply>> + Send;
}

/// Transport backed by `reqwest`. A client is built per call since most
/// options (proxy, timeouts, redirects) are client-level in `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for ReqwestTransport {
    async fn perform(&self, options: OptionList) -> Result<TransportReply> {
        let settings = TransportSettings::from_options(options);
        let client = settings.client()?;
        let deadline = settings
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        let mut hop = settings.first_hop()?;
        let mut header_lines = Vec::new();
        let mut redirects = 0;
        loop {
            let remaining = deadline.map(|at| at.saturating_duration_since(Instant::now()));
            let request = settings.request(&client, &hop, remaining)?;
            log::debug!("> {} {}", request.method(), request.url());
            let response = client.execute(request).await?;

            let status = response.status();
            header_lines.push(format!("{:?} {}", response.version(), status));
            for (name, value) in response.headers() {
                header_lines.push(format!(
                    "{}: {}",
                    name,
                    String::from_utf8_lossy(value.as_bytes())
                ));
            }
            log::debug!("< {}", status);

            let next = if settings.follow_location {
                hop.redirect(&response)
            } else {
                None
            };
            match next {
                Some(next) => {
                    if redirects >= settings.max_redirs() {
                        return Err(ReqjarError::TooManyRedirects(redirects));
                    }
                    redirects += 1;
                    hop = next;
                }
                None => {
                    let body = response.text().await?;
                    return Ok(TransportReply {
                        status_code: status.as_u16(),
                        header_lines,
                        body,
                    });
                }
            }
        }
    }
}

/// Target of one request in a redirect chain
#[derive(Debug, Clone)]
struct Hop {
    method: Method,
    url: Url,
    with_body: bool,
    with_auth: bool,
}

impl Hop {
    /// Next hop when `response` is a redirect with a usable `Location`.
    /// 301 and 302 turn POST into GET, 303 turns anything but HEAD into GET.
    /// Credentials are only resent to the same origin.
    fn redirect(&self, response: &reqwest::Response) -> Option<Hop> {
        let status = response.status();
        if !status.is_redirection() || status == StatusCode::NOT_MODIFIED {
            return None;
        }
        let location = response.headers().get(LOCATION)?.to_str().ok()?;
        let url = match self.url.join(location) {
            Ok(url) => url,
            Err(err) => {
                log::warn!("Not following redirect to '{}': {}", location, err);
                return None;
            }
        };

        let to_get = match status {
            StatusCode::SEE_OTHER => self.method != Method::HEAD,
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => self.method == Method::POST,
            _ => false,
        };
        let same_origin = url.origin() == self.url.origin();
        Some(Hop {
            method: if to_get { Method::GET } else { self.method.clone() },
            with_body: self.with_body && !to_get,
            with_auth: self.with_auth && same_origin,
            url,
        })
    }
}

#[derive(Debug, Clone)]
enum TransportBody {
    Fields(String),
    Multipart(Vec<FormField>),
}

/// Option list folded into the settings of one call. Later options win.
#[derive(Debug, Default)]
struct TransportSettings {
    url: Option<String>,
    method: Option<String>,
    headers: Vec<String>,
    referer: Option<String>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    follow_location: bool,
    max_redirs: Option<u64>,
    proxy: Option<String>,
    body: Option<TransportBody>,
    user_pwd: Option<String>,
    skip_verify: bool,
    tcp_nodelay: Option<bool>,
}

impl TransportSettings {
    fn from_options(options: OptionList) -> Self {
        let mut settings = Self::default();
        for (option, value) in options {
            settings.apply(option, value);
        }
        settings
    }

    fn apply(&mut self, option: TransportOption, value: OptionValue) {
        let text = value.as_str().map(str::to_string);
        match (option, value) {
            (TransportOption::Url, _) => self.url = text,
            (TransportOption::CustomRequest, _) => self.method = text,
            (TransportOption::Referer, _) => self.referer = text,
            (TransportOption::UserAgent, _) => self.user_agent = text,
            (TransportOption::Proxy, _) => self.proxy = text,
            (TransportOption::UserPwd, _) => self.user_pwd = text,
            (TransportOption::PostFields, _) => self.body = text.map(TransportBody::Fields),
            (TransportOption::HttpPost, OptionValue::Form(fields)) => {
                self.body = Some(TransportBody::Multipart(fields))
            }
            (TransportOption::HttpHeader, OptionValue::List(lines)) => self.headers = lines,
            (TransportOption::Timeout, value) => self.timeout_secs = value.as_u64(),
            (TransportOption::ConnectTimeout, value) => self.connect_timeout_secs = value.as_u64(),
            (TransportOption::MaxRedirs, value) => self.max_redirs = value.as_u64(),
            (TransportOption::FollowLocation, value) => {
                self.follow_location = value.as_bool().unwrap_or(false)
            }
            (TransportOption::SslVerifyPeer, value) => {
                self.skip_verify = !value.as_bool().unwrap_or(true)
            }
            (TransportOption::TcpNoDelay, value) => self.tcp_nodelay = value.as_bool(),
            (option, value) => log::warn!("Ignoring {} with unexpected value {:?}", option, value),
        }
    }

    fn client(&self) -> Result<Client> {
        // Redirects are followed hop by hop so every header block is reported
        let mut builder = ClientBuilder::new().redirect(reqwest::redirect::Policy::none());

        // Zero means no limit
        if let Some(secs) = self.timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.connect_timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        if let Some(proxy_url) = &self.proxy {
            let proxy = reqwest::Proxy::all(transport_proxy_url(proxy_url))?;
            builder = builder.proxy(proxy);
        }

        if self.skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(nodelay) = self.tcp_nodelay {
            builder = builder.tcp_nodelay(nodelay);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(builder.build()?)
    }

    fn max_redirs(&self) -> u64 {
        self.max_redirs.unwrap_or(DEFAULT_MAX_REDIRS)
    }

    fn first_hop(&self) -> Result<Hop> {
        let raw = self.url.as_deref().ok_or(ValidationError::MissingUrl)?;
        let url = Url::parse(raw).map_err(|err| ValidationError::InvalidUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        let method = match self.method.as_deref() {
            Some(method) => normalize_method(Some(method))?,
            None if self.body.is_some() => Method::POST,
            None => Method::GET,
        };
        Ok(Hop {
            method,
            url,
            with_body: true,
            with_auth: true,
        })
    }

    fn request(
        &self,
        client: &Client,
        hop: &Hop,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Request> {
        let mut request = client.request(hop.method.clone(), hop.url.clone());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let mut has_content_type = false;
        for line in &self.headers {
            match StringUtils::parse_header(line) {
                Ok((name, value)) => {
                    has_content_type |= name.eq_ignore_ascii_case(CONTENT_TYPE.as_str());
                    request = request.header(name, value);
                }
                Err(err) => log::warn!("Skipping request header: {}", err),
            }
        }

        if let Some(referer) = self.referer.as_deref().filter(|r| !r.is_empty()) {
            request = request.header(REFERER, referer);
        }
        if let Some(user_pwd) = self.user_pwd.as_ref().filter(|_| hop.with_auth) {
            request = request.header(AUTHORIZATION, Auth::from_user_pass(user_pwd));
        }

        match self.body.as_ref().filter(|_| hop.with_body) {
            Some(TransportBody::Fields(fields)) => {
                if !has_content_type {
                    request = request.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
                }
                request = request.body(fields.clone());
            }
            Some(TransportBody::Multipart(fields)) => {
                let form = fields
                    .iter()
                    .fold(reqwest::multipart::Form::new(), |form, field| {
                        form.text(field.name.clone(), field.contents.clone())
                    });
                request = request.multipart(form);
            }
            None => {}
        }

        Ok(request.build()?)
    }
}

/// Map a rendered proxy URL onto a scheme the connector understands
fn transport_proxy_url(proxy_url: &str) -> String {
    match proxy_url.split_once("://") {
        Some((scheme, rest)) => match scheme.parse::<ProxyKind>() {
            Ok(kind) => format!("{}://{}", kind.transport_scheme(), rest),
            Err(_) => proxy_url.to_string(),
        },
        None => proxy_url.to_string(),
    }
}
