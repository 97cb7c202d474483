use std::time::Duration;

use nsrecruit_api::types::{Action, HappeningsFilter};
use nsrecruit_api::{Client, Error, HappeningsQuery, TelegramQuery};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PATH: &str = "/cgi-bin/api.cgi";

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn client_for(server: &MockServer) -> Client {
    Client::with_base_url(&format!("{}{}", server.uri(), API_PATH), "nsrecruit-test").unwrap()
}

#[tokio::test]
async fn get_happenings_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("q", "happenings"))
        .and(query_param("filter", "founding"))
        .and(query_param("limit", "50"))
        .and(header("user-agent", "nsrecruit-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("happenings_founding.xml")),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .get_happenings(&HappeningsQuery::new(HappeningsFilter::Founding))
        .await;

    let happenings = result.unwrap();
    assert_eq!(happenings.len(), 4);
    assert_eq!(happenings[0].nation, "fresh_start");
    assert_eq!(happenings[0].action, Action::Founded);
}

#[tokio::test]
async fn get_happenings_gateway_timeout_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(524).set_body_string("A timeout occurred"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get_happenings(&HappeningsQuery::new(HappeningsFilter::Eject))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(524));
}

#[tokio::test]
async fn get_happenings_malformed_xml() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<WORLD><HAPPENINGS>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .get_happenings(&HappeningsQuery::new(HappeningsFilter::Founding))
        .await;
    assert!(matches!(result, Err(Error::Parse(_))));
}

#[tokio::test]
async fn can_recruit_reads_flag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("nation", "testlandia"))
        .and(query_param("q", "tgcanrecruit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<NATION id=\"testlandia\"><TGCANRECRUIT>1</TGCANRECRUIT></NATION>",
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.can_recruit("testlandia").await.unwrap());
}

#[tokio::test]
async fn can_recruit_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("Unknown nation"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.can_recruit("nobody").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn send_telegram_carries_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("a", "sendTG"))
        .and(query_param("client", "client-key"))
        .and(query_param("tgid", "12345"))
        .and(query_param("key", "secret"))
        .and(query_param("to", "testlandia"))
        .respond_with(ResponseTemplate::new(200).set_body_string("queued"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let query = TelegramQuery::new("client-key", "12345", "secret", "testlandia");
    client.send_telegram(&query).await.unwrap();
}

#[tokio::test]
async fn send_telegram_rate_limited_reads_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "5"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let query = TelegramQuery::new("ck", "1", "sk", "foo");
    let err = client.send_telegram(&query).await.unwrap_err();
    match err {
        Error::RateLimited { retry_after } => {
            assert_eq!(retry_after, Some(Duration::from_secs(5)))
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn send_telegram_rate_limited_without_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let query = TelegramQuery::new("ck", "1", "sk", "foo");
    let err = client.send_telegram(&query).await.unwrap_err();
    assert!(matches!(err, Error::RateLimited { retry_after: None }));
}

#[tokio::test]
async fn send_telegram_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Client not registered"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let query = TelegramQuery::new("ck", "1", "sk", "foo");
    let err = client.send_telegram(&query).await.unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("Client not registered"));
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn network_error_message_keeps_the_cause() {
    // Nothing listens on a port that was just released.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let client =
        Client::with_base_url(&format!("http://127.0.0.1:{}{}", port, API_PATH), "nsrecruit-test")
            .unwrap();

    let err = client.can_recruit("testlandia").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    let message = err.to_string();
    assert!(message.starts_with("Network error: "));
    assert!(message.len() > "Network error: ".len());
}
