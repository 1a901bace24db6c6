//! Checkout lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then dispatches every kind of
//! request the client can build over real HTTP through `UreqTransport`.

use std::io::{BufRead, BufReader, Write};

use cambioreal_core::{ApiClient, ApiError, ClientConfig, ResponseBody, UreqTransport};
use serde::Deserialize;

const APP_ID: &str = "integration-app";
const APP_SECRET: &str = "integration-secret";

#[derive(Debug, Deserialize)]
struct Quote {
    currency: String,
    rate: f64,
    total: f64,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Payment {
    token: String,
    client_name: String,
    status: String,
}

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let credentials = mock_server::Credentials::new(APP_ID, APP_SECRET);
            mock_server::run(listener, credentials).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn checkout_lifecycle() {
    let base_url = start_server();
    let client = ApiClient::new(ClientConfig::new(&base_url, APP_ID, APP_SECRET));
    let transport = UreqTransport::new();

    // Step 1: quote as JSON.
    let req = client
        .request()
        .method("get")
        .unwrap()
        .action("/service/v1/quote")
        .param("currency", "USD")
        .param("amount", 10)
        .response_type("JSON")
        .build();
    let quote: Quote = client.send(&req, &transport).unwrap().deserialize().unwrap();
    assert_eq!(quote.currency, "USD");
    assert_eq!(quote.rate, 3.5);
    assert_eq!(quote.total, 35.0);

    // Step 2: same quote without a declared type comes back as text.
    let req = client
        .request()
        .action("/service/v1/quote")
        .param("currency", "EUR")
        .param("amount", 1)
        .build();
    let body = client.send(&req, &transport).unwrap();
    let text = body.as_text().expect("raw text");
    assert!(text.contains("\"rate\":4.0"), "{text}");

    // Step 3: request a checkout with a form body.
    let req = client
        .request()
        .method("POST")
        .unwrap()
        .action("/service/v1/checkout/request")
        .param("client_name", "Ana Souza")
        .param("client_email", "ana@example.com")
        .param("currency", "USD")
        .param("amount", 150)
        .response_type("json")
        .build();
    let created: Envelope<Payment> = client.send(&req, &transport).unwrap().deserialize().unwrap();
    assert_eq!(created.status, "success");
    let payment = created.data.unwrap();
    assert_eq!(payment.client_name, "Ana Souza");
    let token = payment.token;

    // Step 4: fetch it; the token travels as a path segment.
    let get_req = client
        .request()
        .method("GET")
        .unwrap()
        .action("/service/v1/checkout/get")
        .param("token", token.as_str())
        .response_type("JSON")
        .build();
    let fetched: Envelope<Payment> = client.send(&get_req, &transport).unwrap().deserialize().unwrap();
    assert_eq!(fetched.data.unwrap().status, "PENDING");

    // Step 5: the checkout page is HTML.
    let req = client
        .request()
        .action("/service/v1/checkout/page")
        .param("token", token.as_str())
        .response_type("HTML")
        .build();
    let page = client.send(&req, &transport).unwrap();
    assert!(matches!(&page, ResponseBody::Text(html) if html.starts_with("<html>")));

    // Step 6: cancel answers 204 with no body, which surfaces as BadResponse.
    let req = client
        .request()
        .method("POST")
        .unwrap()
        .action("/service/v1/checkout/cancel")
        .param("token", token.as_str())
        .build();
    let err = client.send(&req, &transport).unwrap_err();
    assert!(matches!(err, ApiError::BadResponse { status: 204 }));

    // Step 7: the earlier request is reusable and sees the cancellation.
    let fetched: Envelope<Payment> = client.send(&get_req, &transport).unwrap().deserialize().unwrap();
    assert_eq!(fetched.data.unwrap().status, "CANCELED");

    // Step 8: unknown token is a bodiless 404.
    let req = client
        .request()
        .action("/service/v1/checkout/get")
        .param("token", "does-not-exist")
        .response_type("JSON")
        .build();
    let err = client.send(&req, &transport).unwrap_err();
    assert!(matches!(err, ApiError::BadResponse { status: 404 }));

    // Step 9: a token with a space and a `#` reaches the server as one
    // encoded path segment.
    let req = client
        .request()
        .action("/service/v1/checkout/get")
        .param("token", "a b#c")
        .response_type("JSON")
        .build();
    let err = client.send(&req, &transport).unwrap_err();
    assert!(matches!(err, ApiError::BadResponse { status: 404 }), "{err:?}");

    // Step 10: an error status with a body is still returned as data.
    let req = client
        .request()
        .action("/service/v1/quote")
        .param("currency", "XYZ")
        .param("amount", 1)
        .response_type("JSON")
        .build();
    let envelope: Envelope<()> = client.send(&req, &transport).unwrap().deserialize().unwrap();
    assert_eq!(envelope.status, "error");
}

#[test]
fn wrong_credentials_yield_bad_response() {
    let base_url = start_server();
    let client = ApiClient::new(ClientConfig::new(&base_url, APP_ID, "wrong"));
    let req = client
        .request()
        .action("/service/v1/quote")
        .param("currency", "USD")
        .param("amount", 1)
        .response_type("JSON")
        .build();
    let err = client.send(&req, &UreqTransport::new()).unwrap_err();
    assert!(matches!(err, ApiError::BadResponse { status: 401 }));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = ApiClient::new(ClientConfig::new(format!("http://{addr}"), APP_ID, APP_SECRET));
    let err = client
        .send(&client.request().action("/service/v1/quote").build(), &UreqTransport::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

/// Serve one connection with a fixed 200 response carrying `body`.
fn serve_once(body: &'static [u8]) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
            line.clear();
        }
        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .unwrap();
        stream.write_all(body).unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn non_utf8_body_is_returned_lossily() {
    let base_url = serve_once(b"a\xffb");
    let client = ApiClient::new(ClientConfig::new(base_url, APP_ID, APP_SECRET));
    let body = client
        .send(&client.request().action("/raw").build(), &UreqTransport::new())
        .unwrap();
    assert_eq!(body.as_text(), Some("a\u{FFFD}b"));
}

#[test]
fn body_over_limit_is_reported_separately() {
    let base_url = serve_once(b"0123456789");
    let client = ApiClient::new(ClientConfig::new(base_url, APP_ID, APP_SECRET));
    let transport = UreqTransport::new().with_body_limit(4);
    let err = client
        .send(&client.request().action("/raw").build(), &transport)
        .unwrap_err();
    assert!(matches!(err, ApiError::BodyTooLarge { limit: 4 }), "{err:?}");
}
