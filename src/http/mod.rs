//! HTTP client module
//!
//! [`Client`] validates and assembles every request synchronously, then hands
//! back a future that performs the transport call and folds the response into
//! the client's cookie jar.

use futures_util::future::BoxFuture;

use crate::config::ClientConfig;
use crate::cookies::CookieJar;
use crate::error::Result;
use crate::options::OptionValue;

pub mod auth;
pub mod request;
pub mod response;
pub mod transport;

pub use request::{build_options, RequestBody, RequestSpec};
pub use response::Response;
pub use transport::{ReqwestTransport, Transport, TransportReply};

/// Pending request returned by [`Client::request`]
pub type PendingResponse<'a> = BoxFuture<'a, Result<Response>>;

/// HTTP client wrapper holding defaults and a shared cookie jar.
///
/// Concurrent requests on one client share its jar: each response is merged
/// in a single write, otherwise the last response to set a cookie wins.
pub struct Client<T: Transport = ReqwestTransport> {
    config: ClientConfig,
    cookies: CookieJar,
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl Default for Client<ReqwestTransport> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let cookies = config.initial_jar();
        Self {
            config,
            cookies,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The jar that receives every response's cookies
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookies
    }

    /// Replace the active jar
    pub fn set_cookie_jar(&mut self, jar: CookieJar) {
        self.cookies = jar;
    }

    /// Store a default transport option. The name is checked when the next
    /// request is built.
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.config.transport_options.insert(name.into(), value.into());
    }

    /// Start a request.
    ///
    /// Validation and option errors are returned immediately; transport
    /// errors come from the returned future.
    pub fn request(&self, spec: RequestSpec) -> Result<PendingResponse<'_>> {
        let options = build_options(&self.config, &spec, &self.cookies)?;
        let jar = self.cookies.clone();
        Ok(Box::pin(async move {
            let reply = self.transport.perform(options).await?;
            Ok(Response::assemble(
                reply.status_code,
                &reply.header_lines,
                reply.body,
                &jar,
            ))
        }))
    }

    pub fn get(&self, spec: RequestSpec) -> Result<PendingResponse<'_>> {
        self.request(spec.method("GET"))
    }

    pub fn post(&self, spec: RequestSpec) -> Result<PendingResponse<'_>> {
        self.request(spec.method("POST"))
    }
}
