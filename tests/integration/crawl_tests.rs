//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use mini_spider::config::CrawlConfig;
use mini_spider::crawler::Crawler;
use mini_spider::output::{format_file_name, StopReason};
use regex::Regex;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOCAL_HOST_PATTERN: &str = r"127\.0\.0\.1";

/// Creates a test configuration writing into `dir`
fn create_test_config(dir: &TempDir, pattern: &str, max_depth: u32, stop_when_idle: bool) -> CrawlConfig {
    let output_directory = dir.path().join("output");
    fs::create_dir_all(&output_directory).expect("Failed to create output directory");

    CrawlConfig {
        url_list_file: dir.path().join("url.json"),
        output_directory,
        max_depth,
        crawl_interval: Duration::ZERO,
        crawl_timeout: Duration::from_secs(5),
        target_pattern: Regex::new(pattern).expect("Invalid test pattern"),
        thread_count: 4,
        stop_when_idle,
    }
}

/// Mounts an HTML page at `route` that links to each of `links`
async fn mount_page(server: &MockServer, route: &str, links: &[&str], expected_hits: u64) {
    let body: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a>"#, link, link))
        .collect();

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{}</body></html>", body))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn crawl_until_idle(crawler: Crawler) -> mini_spider::output::CrawlStatistics {
    tokio::time::timeout(Duration::from_secs(10), crawler.run())
        .await
        .expect("Crawl did not go idle in time")
        .expect("Crawl failed")
}

fn written_file(dir: &TempDir, url: &str) -> std::path::PathBuf {
    dir.path().join("output").join(format_file_name(url))
}

#[tokio::test]
async fn test_seed_and_one_hop_are_downloaded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/b"], 1).await;
    mount_page(&server, "/b", &["/c"], 1).await;
    mount_page(&server, "/c", &[], 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, LOCAL_HOST_PATTERN, 1, true);
    let seed = format!("{}/", base);
    let crawler = Crawler::new(config, vec![seed.clone()]);

    let stats = crawl_until_idle(crawler).await;

    assert_eq!(stats.stop_reason, StopReason::Idle);
    assert_eq!(stats.total_downloaded, 2);
    assert_eq!(stats.urls_scheduled, 2);
    assert!(written_file(&dir, &seed).exists());
    assert!(written_file(&dir, &format!("{}/b", base)).exists());
    assert!(!written_file(&dir, &format!("{}/c", base)).exists());

    let content = fs::read_to_string(written_file(&dir, &seed)).unwrap();
    assert!(content.contains(r#"<a href="/b">"#));
}

#[tokio::test]
async fn test_url_reachable_by_many_paths_is_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/x", "/y", "/z"], 1).await;
    mount_page(&server, "/x", &["/", "/z", "/y"], 1).await;
    mount_page(&server, "/y", &["/", "/z", "/x"], 1).await;
    mount_page(&server, "/z", &["/", "/x"], 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, LOCAL_HOST_PATTERN, 3, true);
    let seed = format!("{}/", base);
    let crawler = Crawler::new(config, vec![seed.clone(), seed]);

    let stats = crawl_until_idle(crawler).await;

    assert_eq!(stats.urls_scheduled, 4);
    assert_eq!(stats.total_downloaded, 4);
}

#[tokio::test]
async fn test_depth_bound_is_respected() {
    let server = MockServer::start().await;

    mount_page(&server, "/", &["/one"], 1).await;
    mount_page(&server, "/one", &["/two"], 1).await;
    mount_page(&server, "/two", &["/three"], 1).await;
    mount_page(&server, "/three", &[], 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, LOCAL_HOST_PATTERN, 2, true);
    let crawler = Crawler::new(config, vec![format!("{}/", server.uri())]);

    let stats = crawl_until_idle(crawler).await;

    assert_eq!(stats.urls_scheduled, 3);
    assert_eq!(stats.total_downloaded, 3);
}

#[tokio::test]
async fn test_non_matching_leaf_is_never_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/doc.pdf", "/page"], 1).await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/page", &[], 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, r"\.pdf$", 1, true);
    let seed = format!("{}/", base);
    let crawler = Crawler::new(config, vec![seed.clone()]);

    let stats = crawl_until_idle(crawler).await;

    assert_eq!(stats.total_downloaded, 1);
    assert!(!written_file(&dir, &seed).exists());
    let pdf = fs::read(written_file(&dir, &format!("{}/doc.pdf", base))).unwrap();
    assert_eq!(pdf, b"%PDF-1.4");
}

#[tokio::test]
async fn test_error_status_is_not_saved_or_expanded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/broken"], 1).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"<a href="/hidden">hidden</a>"#),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/hidden", &[], 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, LOCAL_HOST_PATTERN, 3, true);
    let crawler = Crawler::new(config, vec![format!("{}/", base)]);

    let stats = crawl_until_idle(crawler).await;

    assert_eq!(stats.total_downloaded, 1);
    assert!(!written_file(&dir, &format!("{}/broken", base)).exists());
}

#[tokio::test]
async fn test_already_downloaded_page_is_kept_and_expanded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/b"], 1).await;
    mount_page(&server, "/b", &[], 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, LOCAL_HOST_PATTERN, 1, true);
    let seed = format!("{}/", base);
    fs::write(written_file(&dir, &seed), "from an earlier run").unwrap();

    let crawler = Crawler::new(config, vec![seed.clone()]);
    let stats = crawl_until_idle(crawler).await;

    assert_eq!(stats.total_downloaded, 1);
    assert_eq!(
        fs::read_to_string(written_file(&dir, &seed)).unwrap(),
        "from an earlier run"
    );
    assert!(written_file(&dir, &format!("{}/b", base)).exists());
}

#[tokio::test]
async fn test_explicit_stop_joins_workers_before_release() {
    let server = MockServer::start().await;

    // Every page links to ten fresh pages so the crawl never drains by itself
    Mock::given(method("GET"))
        .respond_with(|request: &wiremock::Request| {
            let here = request.url.path().trim_end_matches('/').to_string();
            let body: String = (0..10)
                .map(|i| format!(r#"<a href="{}/{}">{}</a>"#, here, i, i))
                .collect();
            ResponseTemplate::new(200).set_body_string(body)
        })
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, LOCAL_HOST_PATTERN, 10, false);
    let crawler = Crawler::new(config, vec![format!("{}/", server.uri())]);
    let handle = crawler.stop_handle();
    let frontier = crawler.frontier();
    let board = crawler.board();

    let run = tokio::spawn(crawler.run());
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!frontier.is_closed());

    handle.stop();
    handle.stop();

    let stats = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("Crawler did not stop in time")
        .unwrap()
        .unwrap();

    assert_eq!(stats.stop_reason, StopReason::Requested);
    assert!(frontier.is_closed());
    assert!(board.all_stopped());
    assert_eq!(frontier.late_enqueues(), 0);
    assert!(stats.urls_scheduled > 1);
}

#[tokio::test]
async fn test_from_config_reads_seed_file() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &[], 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, LOCAL_HOST_PATTERN, 0, true);
    fs::write(
        &config.url_list_file,
        format!(r#"["{}/"]"#, server.uri()),
    )
    .unwrap();

    let crawler = Crawler::from_config(config).unwrap();
    let stats = crawl_until_idle(crawler).await;

    assert_eq!(stats.total_downloaded, 1);
}
