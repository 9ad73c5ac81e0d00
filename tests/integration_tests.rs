//! Integration tests using wiremock to simulate HTTP servers.

use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use valfetch::{
    parse, BasicClient, CallOptions, Client, Error, ErrorKind, FetchOptions, Parsed,
};
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestData {
    id: u32,
    name: String,
}

fn identity(parsed: Parsed) -> Result<Parsed, Infallible> {
    Ok(parsed)
}

/// A client whose error callback records the kind of every reported error.
fn recording_client(builder: valfetch::ClientBuilder) -> (Client, Arc<Mutex<Vec<ErrorKind>>>) {
    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = reported.clone();
    let client = builder
        .on_error(move |err| sink.lock().unwrap().push(err.kind()))
        .build()
        .unwrap();
    (client, reported)
}

#[tokio::test]
async fn test_ok_returns_validated_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "foo": "bar" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, reported) = recording_client(Client::builder());

    let result = client
        .call(&format!("{}/ok", mock_server.uri()), identity, FetchOptions::new())
        .await
        .unwrap();

    assert_eq!(result, Parsed::Json(json!({ "foo": "bar" })));
    assert!(reported.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_typed_get_request() {
    let mock_server = MockServer::start().await;

    let response_data = TestData {
        id: 1,
        name: "Test".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_data))
        .mount(&mock_server)
        .await;

    let client = Client::new(|_| {});

    let data: TestData = client
        .get(&format!("{}/test", mock_server.uri()), Parsed::deserialize)
        .await
        .unwrap();

    assert_eq!(data, response_data);
}

#[tokio::test]
async fn test_no_content_hands_back_raw_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = Client::new(|_| {});

    let result = client
        .delete(&format!("{}/empty", mock_server.uri()), identity)
        .await
        .unwrap();

    match result {
        Parsed::Raw(response) => {
            assert_eq!(response.status().as_u16(), 204);
            assert!(response.bytes().is_empty());
        }
        other => panic!("Expected raw response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_content_with_json_validator_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let (client, reported) = recording_client(Client::builder());

    let err = client
        .get::<TestData, _, _>(&format!("{}/empty", mock_server.uri()), Parsed::deserialize)
        .await
        .unwrap_err();

    // An empty body is not JSON; the decode failure keeps its own kind.
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.status(), Some(204));
    assert_eq!(err.raw_response(), Some(""));
    assert_eq!(*reported.lock().unwrap(), vec![ErrorKind::Parse]);
}

#[tokio::test]
async fn test_error_message_from_parser() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "It broke!" })))
        .mount(&mock_server)
        .await;

    let (client, reported) = recording_client(
        Client::builder().error_message_parser(parse::message_field("message")),
    );

    let err = client
        .call(&format!("{}/error", mock_server.uri()), identity, FetchOptions::new())
        .await
        .unwrap_err();

    match &err {
        Error::Api(api) => {
            assert_eq!(api.message(), "It broke!");
            assert_eq!(api.status(), 500);
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
    assert_eq!(*reported.lock().unwrap(), vec![ErrorKind::Application]);
}

#[tokio::test]
async fn test_error_without_parser_uses_generic_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "It broke!" })))
        .mount(&mock_server)
        .await;

    let client = Client::new(|_| {});

    let err = client
        .call(&format!("{}/error", mock_server.uri()), identity, FetchOptions::new())
        .await
        .unwrap_err();

    let api = err.as_api_error().expect("Expected Api error");
    assert_eq!(api.message(), "API Error");
    assert_eq!(api.status(), 500);
}

#[tokio::test]
async fn test_call_level_error_parser_wins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .on_error(|_| {})
        .error_message_parser(parse::message_field("message"))
        .build()
        .unwrap();

    let err = client
        .call_with(
            &format!("{}/error", mock_server.uri()),
            identity,
            FetchOptions::new(),
            CallOptions::new().parse_error_response(|response| async move {
                Ok::<_, Error>(format!("call: {}", response.text()))
            }),
        )
        .await
        .unwrap_err();

    assert_eq!(err.as_api_error().unwrap().message(), "call: Not found");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let mock_server = MockServer::start().await;

    let request_data = TestData {
        id: 0,
        name: "New".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/test"))
        .and(header("content-type", "application/json"))
        .and(body_json(&request_data))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1, "name": "New" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(|_| {});

    let created: TestData = client
        .post(&format!("{}/test", mock_server.uri()), &request_data, Parsed::deserialize)
        .await
        .unwrap();

    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn test_form_body_is_sent_as_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("Groucho"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(|_| {});
    let options = FetchOptions::new()
        .with_method(http::Method::POST)
        .form(Form::new().text("username", "Groucho"));

    let result = client
        .call(&format!("{}/upload", mock_server.uri()), identity, options)
        .await
        .unwrap();

    assert_eq!(result, Parsed::Json(json!({ "ok": true })));
}

#[tokio::test]
async fn test_headers_and_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("User-Agent", "test-agent"))
        .and(header("x-api-key", "secret"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .on_error(|_| {})
        .default_header("User-Agent", "test-agent")
        .unwrap()
        .build()
        .unwrap();

    let options = FetchOptions::new()
        .with_header("x-api-key", "secret")
        .unwrap()
        .with_query_param("q", "rust");

    let result = client
        .call(&format!("{}/search", mock_server.uri()), identity, options)
        .await
        .unwrap();

    assert_eq!(result, Parsed::Json(json!([])));
}

#[tokio::test]
async fn test_malformed_json_is_a_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("invalid json", "application/json"),
        )
        .mount(&mock_server)
        .await;

    let (client, reported) = recording_client(Client::builder());

    let err = client
        .call(&format!("{}/test", mock_server.uri()), identity, FetchOptions::new())
        .await
        .unwrap_err();

    match &err {
        Error::DeserializationFailed {
            raw_response,
            status,
            ..
        } => {
            assert_eq!(raw_response, "invalid json");
            assert_eq!(status.as_u16(), 200);
        }
        other => panic!("Expected DeserializationFailed, got {:?}", other),
    }
    assert_eq!(*reported.lock().unwrap(), vec![ErrorKind::Parse]);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(|_| {});

    let err = client
        .call(&format!("{}/flaky", mock_server.uri()), identity, FetchOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    mock_server.verify().await;
}

#[tokio::test]
async fn test_disabled_error_handling_still_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let (client, reported) = recording_client(Client::builder());

    let result = client
        .call_with(
            &format!("{}/error", mock_server.uri()),
            identity,
            FetchOptions::new(),
            CallOptions::new().use_error_handling(false),
        )
        .await;

    assert!(result.is_err());
    assert!(reported.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_connection_failure_is_a_transport_error() {
    // Grab a free port, then release it so nothing listens there.
    let uri = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let (client, reported) = recording_client(Client::builder());

    let err = client
        .call(&format!("{}/gone", uri), identity, FetchOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.as_api_error().is_none());
    assert_eq!(*reported.lock().unwrap(), vec![ErrorKind::Transport]);
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let client = Client::new(|_| {});
    let options = FetchOptions::new().with_timeout(Duration::from_millis(50));

    let err = client
        .call(&format!("{}/slow", mock_server.uri()), identity, options)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout), "got {:?}", err);
}

#[tokio::test]
async fn test_basic_client_ignores_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "It broke!" })))
        .mount(&mock_server)
        .await;

    let client = BasicClient::new(|_| {});

    let message = client
        .call(
            &format!("{}/error", mock_server.uri()),
            |value: Value| {
                value["message"]
                    .as_str()
                    .map(str::to_owned)
                    .ok_or("missing message")
            },
            FetchOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(message, "It broke!");
}
