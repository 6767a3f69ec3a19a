use httpmock::prelude::*;

use quotevault::HttpTransport;
use quotevault_core::{FetchRequest, Transport, VaultError};

#[tokio::test]
async fn returns_the_body_on_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/history/AAPL");
        then.status(200)
            .body("AAPL,20240105,181.25,182.50,180.50,181.99\n");
    });

    let transport = HttpTransport::new();
    let body = transport
        .fetch(&FetchRequest::new(server.url("/history/AAPL")))
        .await
        .unwrap();
    assert_eq!(body, "AAPL,20240105,181.25,182.50,180.50,181.99\n");
    mock.assert();
}

#[tokio::test]
async fn non_success_status_is_an_io_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/history/AAPL");
        then.status(500);
    });

    let transport = HttpTransport::new();
    let err = transport
        .fetch(&FetchRequest::new(server.url("/history/AAPL")))
        .await;
    assert!(matches!(err, Err(VaultError::Io(_))));
}

#[tokio::test]
async fn connection_failure_is_an_io_error() {
    let transport = HttpTransport::new();
    // Discard port; nothing listens there.
    let err = transport
        .fetch(&FetchRequest::new("http://127.0.0.1:9/history"))
        .await;
    assert!(matches!(err, Err(VaultError::Io(_))));
}
