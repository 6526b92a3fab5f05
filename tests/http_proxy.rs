use reqjar::{
    Client, ClientConfig, ConfigError, ProxyDescriptor, ProxyOptions, ReqjarError, RequestSpec,
};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[test]
fn test_supported_proxy_types() {
    for scheme in ["http", "http10", "socks4", "socks4a", "socks5", "socks5h"] {
        let proxy = ProxyDescriptor::new(ProxyOptions::new("8.8.8.8", 80).scheme(scheme))
            .expect("supported proxy type");
        assert!(proxy.to_connection_string().starts_with(&format!("{}://", scheme)));
        assert!(proxy.to_connection_string().ends_with("8.8.8.8:80"));
    }
}

#[test]
fn test_unsupported_proxy_type() {
    let err = ProxyDescriptor::new(ProxyOptions::new("8.8.8.8", 80).scheme("socks6"))
        .expect_err("socks6 is not supported");
    assert!(matches!(
        err,
        ReqjarError::Config(ConfigError::UnsupportedProxyScheme(ref s)) if s == "socks6"
    ));
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_requests_routed_through_http_proxy() {
    if !can_bind_localhost() {
        return;
    }

    let proxy_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Proxy-Connected", "true")
                .set_body_string("Proxy success"),
        )
        .expect(1)
        .mount(&proxy_server)
        .await;

    let address = proxy_server.address();
    let proxy = ProxyDescriptor::new(ProxyOptions::new(address.ip().to_string(), address.port()))
        .expect("proxy");
    let client = Client::new(ClientConfig::default().with_proxy(proxy));

    let response = client
        .get(RequestSpec::new("http://proxied.invalid/").timeout_secs(2))
        .expect("request should build")
        .await
        .expect("request should go through the proxy");

    assert_eq!(response.header("x-proxy-connected"), Some("true"));
    assert!(response.header("x-proxy-ignored").is_none());
    assert_eq!(response.body, "Proxy success");

    let requests = proxy_server.received_requests().await.expect("requests");
    assert_eq!(
        requests[0].headers.get("host").expect("host header"),
        "proxied.invalid"
    );
}
