use crate::support::{detail_html, listing_html, restaurant_json, test_config};
use restaurant_harvester::crawler::{Coordinator, HarvestOptions};
use restaurant_harvester::output::write_restaurants;
use restaurant_harvester::{HarvestError, LastStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let listing_url = format!("{}/restaurants", base_url);

    mount_html(&mock_server, "/restaurants", listing_html(2, &[])).await;
    mount_html(
        &mock_server,
        "/restaurants/page/1",
        listing_html(2, &["/restaurant/one", "/restaurant/two"]),
    )
    .await;
    mount_html(
        &mock_server,
        "/restaurants/page/2",
        listing_html(2, &["/restaurant/two", "/restaurant/three", "/restaurant/four"]),
    )
    .await;

    mount_html(&mock_server, "/restaurant/one", detail_html(&restaurant_json("One"))).await;
    mount_html(&mock_server, "/restaurant/four", detail_html(&restaurant_json("Four"))).await;
    // No metadata block at all
    mount_html(
        &mock_server,
        "/restaurant/three",
        "<html><body>Closed</body></html>".to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/restaurant/two"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&base_url, &listing_url);
    let coordinator = Coordinator::from_config(&config).expect("Failed to create coordinator");
    let harvest = coordinator
        .run(&HarvestOptions::default())
        .await
        .expect("Harvest failed");

    assert_eq!(harvest.discovered, 4);
    assert_eq!(harvest.records.len(), 2);
    assert_eq!(harvest.records[0]["name"], "One");
    assert_eq!(harvest.records[1]["name"], "Four");
    assert_eq!(
        harvest.failed_urls,
        vec![
            format!("{}/restaurant/two", base_url),
            format!("{}/restaurant/three", base_url),
        ]
    );

    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("data").join("restaurants.json");
    write_restaurants(&harvest.records, &output_path).expect("Failed to write output");

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 2);
    assert_eq!(written[0]["@type"], "Restaurant");
    assert_eq!(written[1]["address"]["addressCountry"], "GB");
}

#[tokio::test]
async fn test_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;
    let listing_url = format!("{}/restaurants", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/restaurants"))
        .and(header("user-agent", "TestBot/0.1"))
        .respond_with(html(listing_html(7, &[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri(), &listing_url);
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "0.1".to_string();

    let coordinator = Coordinator::from_config(&config).unwrap();
    assert_eq!(coordinator.last_page_number().await.unwrap(), 7);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;
    let listing_url = format!("{}/restaurants", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/restaurants"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::from_config(&test_config(&mock_server.uri(), &listing_url)).unwrap();
    let err = coordinator.run(&HarvestOptions::default()).await.unwrap_err();

    assert!(matches!(err, HarvestError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_slow_server_exhausts_retries() {
    let mock_server = MockServer::start().await;
    let listing_url = format!("{}/restaurants", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/restaurants"))
        .respond_with(html(listing_html(1, &[])).set_delay(Duration::from_secs(2)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri(), &listing_url);
    config.fetcher.max_attempts = 3;
    config.fetcher.timeout_ms = 100;
    config.fetcher.backoff_base_ms = 10;

    let coordinator = Coordinator::from_config(&config).unwrap();
    let err = coordinator.last_page_number().await.unwrap_err();

    match err {
        HarvestError::RetriesExhausted {
            url,
            attempts,
            last_status,
        } => {
            assert_eq!(url, listing_url);
            assert_eq!(attempts, 3);
            assert_eq!(last_status, LastStatus(None));
        }
        other => panic!("unexpected error: {}", other),
    }
}

/// Serves `body` on every connection, sending the headers at once and the
/// body only after `body_delay`. Returns the base URL and a connection counter.
async fn serve_slow_body(body: String, body_delay: Duration) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let connections = Arc::new(AtomicUsize::new(0));

    let counter = connections.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            let body = body.clone();

            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.flush().await;

                tokio::time::sleep(body_delay).await;
                let _ = socket.write_all(body.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (base_url, connections)
}

#[tokio::test]
async fn test_slow_body_after_timely_headers_is_read() {
    let (base_url, connections) =
        serve_slow_body(listing_html(4, &[]), Duration::from_millis(300)).await;
    let listing_url = format!("{}/restaurants", base_url);

    let mut config = test_config(&base_url, &listing_url);
    config.fetcher.max_attempts = 2;
    config.fetcher.timeout_ms = 100;

    let coordinator = Coordinator::from_config(&config).unwrap();
    assert_eq!(coordinator.last_page_number().await.unwrap(), 4);
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connection_refused_is_not_retried() {
    // Nothing listens on port 1
    let config = test_config("http://127.0.0.1:1", "http://127.0.0.1:1/restaurants");
    let coordinator = Coordinator::from_config(&config).unwrap();

    let err = coordinator.last_page_number().await.unwrap_err();
    assert!(matches!(err, HarvestError::Transport { .. }));
}
