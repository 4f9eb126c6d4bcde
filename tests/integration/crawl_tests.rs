//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full mirror cycle end-to-end over real HTTP.

use site_mirror::config::Config;
use site_mirror::crawler::{run_crawl, AnchorScope, CrawlEngine, HttpTransport};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, root: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.start_url = format!("{}/index.html", base_url);
    config.crawler.request_timeout_secs = 5;
    config.crawler.connect_timeout_secs = 2;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.root_dir = root.to_string_lossy().into_owned();
    config
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_bytes(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_mirror_of_small_site() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Output");

    mount_html(
        &mock_server,
        "/index.html",
        r#"<html><head>
            <link rel="stylesheet" href="static/css/styles.css">
            <script src="static/js/app.js"></script>
        </head><body>
            <div class="sidebar"><a href="catalogue/category/travel/index.html">Travel</a></div>
            <img src="media/logo.png">
        </body></html>"#,
    )
    .await;
    mount_html(
        &mock_server,
        "/catalogue/category/travel/index.html",
        r#"<html><body>
            <img src="../../../media/logo.png">
            <a href="../../book_1/index.html">Book</a>
            <a href="../../../index.html">Home</a>
        </body></html>"#,
    )
    .await;
    mount_html(
        &mock_server,
        "/catalogue/book_1/index.html",
        r#"<html><body><article class="product_page">
            <img src="cover.jpg">
        </article></body></html>"#,
    )
    .await;
    mount_bytes(&mock_server, "/static/css/styles.css", b"body { margin: 0 }").await;
    mount_bytes(&mock_server, "/static/js/app.js", b"console.log(1)").await;
    mount_bytes(&mock_server, "/media/logo.png", b"\x89PNG").await;
    mount_bytes(&mock_server, "/catalogue/book_1/cover.jpg", b"jpeg").await;

    let config = create_test_config(&mock_server.uri(), &root);
    let report = run_crawl(&config, CancellationToken::new()).await.unwrap();

    assert!(!report.cancelled);
    assert!(report.failures.is_empty());
    assert!(report.failure_report.is_none());
    assert!(!root.join("failedDownloadsUris.txt").exists());

    for file in [
        "index.html",
        "static/css/styles.css",
        "static/js/app.js",
        "media/logo.png",
        "catalogue/category/travel/index.html",
        "catalogue/book_1/index.html",
        "catalogue/book_1/cover.jpg",
    ] {
        assert!(root.join(file).is_file(), "{} should be mirrored", file);
    }

    assert_eq!(
        std::fs::read(root.join("media/logo.png")).unwrap(),
        b"\x89PNG"
    );
    assert_eq!(report.statistics.pages_visited, 3);
    assert_eq!(report.statistics.assets_saved, 4);
}

#[tokio::test]
async fn test_failed_downloads_are_reported() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Output");

    mount_html(
        &mock_server,
        "/index.html",
        r#"<html><body>
            <img src="missing.png">
            <img src="present.png">
            <a href="broken.html">Broken</a>
        </body></html>"#,
    )
    .await;
    mount_bytes(&mock_server, "/present.png", b"png").await;
    Mock::given(method("GET"))
        .and(path("/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &root);
    let report = run_crawl(&config, CancellationToken::new()).await.unwrap();

    let expected = vec![
        format!("{}/missing.png", base_url),
        format!("{}/broken.html", base_url),
    ];
    assert_eq!(report.failures, expected);

    let report_path = report.failure_report.expect("report should be written");
    assert_eq!(report_path, root.join("failedDownloadsUris.txt"));
    let contents = std::fs::read_to_string(report_path).unwrap();
    assert_eq!(contents.lines().collect::<Vec<_>>(), expected);

    assert!(root.join("index.html").is_file());
    assert!(root.join("present.png").is_file());
    assert!(!root.join("missing.png").exists());
    assert!(!root.join("broken.html").exists());
}

#[tokio::test]
async fn test_product_page_links_not_followed() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(
        &mock_server,
        "/index.html",
        r#"<html><body>
            <article class="product_page">
                <div class="sidebar"><a href="category.html">Category</a></div>
                <a href="related.html">Related</a>
            </article>
        </body></html>"#,
    )
    .await;
    mount_html(&mock_server, "/category.html", "<html><body></body></html>").await;
    Mock::given(method("GET"))
        .and(path("/related.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let report = run_crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.statistics.pages_visited, 2);
    assert!(dir.path().join("category.html").is_file());
}

#[tokio::test]
async fn test_output_root_recreated() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Output");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("stale.html"), b"old run").unwrap();

    mount_html(&mock_server, "/index.html", "<html><body>hi</body></html>").await;

    let config = create_test_config(&mock_server.uri(), &root);
    run_crawl(&config, CancellationToken::new()).await.unwrap();

    assert!(!root.join("stale.html").exists());
    assert!(root.join("index.html").is_file());
}

#[tokio::test]
async fn test_engine_reuses_assets_already_on_disk() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("logo.png"), b"kept").unwrap();

    mount_html(
        &mock_server,
        "/index.html",
        r#"<html><body><img src="logo.png"></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Config::default();
    let transport = HttpTransport::from_config(&config.user_agent, &config.crawler).unwrap();
    let mut engine = CrawlEngine::new(
        transport,
        dir.path(),
        AnchorScope::default(),
        CancellationToken::new(),
    );

    let report = engine
        .run(&format!("{}/index.html", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(report.statistics.assets_already_present, 1);
    assert_eq!(std::fs::read(dir.path().join("logo.png")).unwrap(), b"kept");
}

#[tokio::test]
async fn test_cancelled_before_start_writes_no_report() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Output");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let config = create_test_config(&mock_server.uri(), &root);
    let report = run_crawl(&config, cancel).await.unwrap();

    assert!(report.cancelled);
    assert!(report.failure_report.is_none());
    assert!(root.is_dir());
}
