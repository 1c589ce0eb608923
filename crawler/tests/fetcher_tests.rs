use evidex_crawler::fetcher::{FetchConfig, Fetcher};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_fetcher(retries: u32) -> Fetcher {
    Fetcher::new(FetchConfig {
        timeout: Duration::from_secs(2),
        retries,
        backoff_base: 0.01,
        max_jitter: 0.0,
    })
    .unwrap()
}

#[tokio::test]
async fn returns_body_for_html_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>خبر</html>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fast_fetcher(3).fetch(&format!("{}/news/1", server.uri())).await;
    assert_eq!(body.as_deref(), Some("<html>خبر</html>"));
}

#[tokio::test]
async fn not_found_is_definitive_and_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let body = fast_fetcher(3).fetch(&format!("{}/gone", server.uri())).await;
    assert!(body.is_none());
}

#[tokio::test]
async fn transient_error_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fast_fetcher(3).fetch(&format!("{}/flaky", server.uri())).await;
    assert_eq!(body.as_deref(), Some("ok"));
}

#[tokio::test]
async fn exhausted_retries_yield_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let body = fast_fetcher(3).fetch(&format!("{}/down", server.uri())).await;
    assert!(body.is_none());
}

#[tokio::test]
async fn non_html_content_type_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(3)
        .mount(&server)
        .await;

    let body = fast_fetcher(3).fetch(&format!("{}/feed", server.uri())).await;
    assert!(body.is_none());
}
