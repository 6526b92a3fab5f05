use reqjar::{Client, ClientConfig, ErrorKind, ReqjarError, RequestSpec};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_cookie_set_on_redirect_reaches_jar() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Set-Cookie", "sid=abc; Path=/")
                .insert_header("Location", "/home"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "theme=dark; Path=/")
                .set_body_string("welcome"),
        )
        .mount(&server)
        .await;

    let client = Client::new(ClientConfig::default());
    let response = client
        .get(RequestSpec::new(format!("{}/login", server.uri())))
        .expect("request should build")
        .await
        .expect("request should succeed");

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "welcome");
    assert_eq!(client.cookie_jar().get("sid").expect("sid cookie").value, "abc");
    assert_eq!(client.cookie_jar().get("theme").expect("theme cookie").value, "dark");
    assert_eq!(
        client.cookie_jar().to_request_header_value(),
        "sid=abc; theme=dark"
    );
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_post_redirect_becomes_get() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/done"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/done"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .mount(&server)
        .await;

    let client = Client::new(ClientConfig::default());
    let response = client
        .post(RequestSpec::new(format!("{}/submit", server.uri())).body(json!({ "a": 1 })))
        .expect("request should build")
        .await
        .expect("request should succeed");

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "done");

    let requests = server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].method.as_str(), "GET");
    assert!(requests[1].body.is_empty());
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_redirect_limit_is_enforced() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&server)
        .await;

    let client = Client::new(ClientConfig::default().with_option("MAXREDIRS", 2i64));
    let err = client
        .get(RequestSpec::new(format!("{}/loop", server.uri())))
        .expect("request should build")
        .await
        .expect_err("redirect loop");

    assert!(matches!(err, ReqjarError::TooManyRedirects(2)));
    assert_eq!(err.kind(), ErrorKind::Transport);
    let requests = server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 3);
}
