use reqjar::{Client, ClientConfig, FormField, RequestSpec};
use serde_json::json;
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_post_form_fields_sent() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/postfields"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("hello=world&you=must&work=fork"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = Client::new(ClientConfig::default());
    let response = client
        .post(
            RequestSpec::new(format!("{}/postfields", server.uri()))
                .body(json!({ "hello": "world", "you": "must", "work": "fork" })),
        )
        .expect("request should build")
        .await
        .expect("request should succeed");
    assert_eq!(response.status_code, 200);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_post_raw_body_sent() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/body"))
        .and(body_string("payload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = Client::new(ClientConfig::default());
    let response = client
        .post(
            RequestSpec::new(format!("{}/body", server.uri()))
                .header("Content-Type: text/plain")
                .body("payload"),
        )
        .expect("request should build")
        .await
        .expect("request should succeed");
    assert_eq!(response.status_code, 200);

    let requests = server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("content-type").expect("content type"),
        "text/plain"
    );
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_post_multipart_fields_sent() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multipart"))
        .and(body_string_contains("name=\"hello\""))
        .and(body_string_contains("world"))
        .and(body_string_contains("name=\"i'll\""))
        .and(body_string_contains("be back"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = Client::new(ClientConfig::default());
    let response = client
        .post(
            RequestSpec::new(format!("{}/multipart", server.uri())).multipart([
                FormField::new("hello", "world"),
                FormField::new("i'll", "be back"),
            ]),
        )
        .expect("request should build")
        .await
        .expect("request should succeed");
    assert_eq!(response.status_code, 200);

    let requests = server.received_requests().await.expect("requests");
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .expect("content type");
    assert!(content_type.starts_with("multipart/form-data"));
}
