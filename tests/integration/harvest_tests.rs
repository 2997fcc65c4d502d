//! End-to-end harvest tests
//!
//! These tests use wiremock to serve listing and article pages and run the
//! full pipeline: config parsing, batch run over HTTP, persistence.

use article_harvest::config::parse_config;
use article_harvest::crawler::{BatchRunner, PageFetcher};
use article_harvest::storage::{persist_report, store_records, RecordSink, SinkError, SqliteSink};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_toml(base: &str, db_path: &str) -> String {
    format!(
        r#"
[http]
timeout-secs = 5

[output]
database-path = "{db}"
collection = "clinic_articles"
show-progress = false

[[job]]
name = "clinic"
url = "{base}/news?page={{0}}"
category = "healthcare"
owner-source = "Example Clinic"
start-page = 1
end-page = 2
step-page = 1

[job.selectors]
page-list-anchor = {{ tag = "a", class = "read-more" }}
title = {{ tag = "h1", class = "headline" }}
content-area = {{ tag = "div", class = "article-body" }}
banner = {{ tag = "div", class = "hero", source-attribute = "data-src" }}
"#,
        base = base,
        db = db_path
    )
}

async fn mount_html(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, page: &str, hrefs: &[&str]) {
    let anchors: String = hrefs
        .iter()
        .map(|h| format!(r#"<li><a class="read-more" href="{}">Read more</a></li>"#, h))
        .collect();
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body><a href="/">Home</a><ul>{}</ul></body></html>"#,
            anchors
        )))
        .mount(server)
        .await;
}

fn article(title: &str, body: &str, images: &[&str]) -> String {
    let images: String = images
        .iter()
        .map(|src| format!(r#"<img src="{}">"#, src))
        .collect();
    format!(
        r#"<html><head><title>Clinic | {title}</title></head><body>
        <h1 class="headline">{title}</h1>
        <div class="hero"><img src="placeholder.gif" data-src="/media/banner.jpg"></div>
        <div class="article-body"><p>{body}</p>{images}</div>
        </body></html>"#,
        title = title,
        body = body,
        images = images
    )
}

#[tokio::test]
async fn test_full_harvest_over_http() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvest.db");

    mount_listing(&server, "1", &["/articles/a", "articles/b"]).await;
    mount_listing(&server, "2", &["/articles/b", "/articles/missing"]).await;
    mount_html(
        &server,
        "/articles/a",
        article(
            "Trigger Finger",
            "Trigger finger is   a condition.",
            &["/media/banner.jpg", "/media/hand.png", "/media/anim.gif"],
        ),
    )
    .await;
    mount_html(
        &server,
        "/articles/b",
        article("Carpal Tunnel", "Numbness in the hand.", &["/media/wrist.JPEG"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/articles/missing"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = parse_config(&config_toml(&server.uri(), db_path.to_str().unwrap())).unwrap();
    let job = &config.jobs[0];

    let mut fetcher = PageFetcher::new(&config.http, &config.browser).unwrap();
    let report = BatchRunner::new(&mut fetcher)
        .show_progress(false)
        .run(job)
        .await
        .unwrap();
    fetcher.close().await;

    assert_eq!(report.listing_pages, 2);
    assert_eq!(report.discovered, 3);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(
        report.failed_urls(),
        vec![format!("{}/articles/missing", server.uri())]
    );

    let trigger = report
        .records
        .iter()
        .find(|r| r.title == "Trigger Finger")
        .unwrap();
    assert_eq!(trigger.url, format!("{}/articles/a", server.uri()));
    assert_eq!(trigger.content, "Trigger finger is a condition.");
    assert_eq!(trigger.category, "healthcare");
    assert_eq!(trigger.owner_source, "Example Clinic");
    assert_eq!(trigger.banner.as_deref(), Some("/media/banner.jpg"));
    assert_eq!(trigger.images, vec!["/media/hand.png"]);

    let mut sink = SqliteSink::connect(&config.output.database_path).unwrap();
    let run_id = persist_report(&mut sink, &config.output.collection, "hash", &report).unwrap();

    let stored = sink.load_records("clinic_articles").unwrap();
    assert_eq!(stored, report.records);
    assert_eq!(sink.failed_urls(run_id).unwrap().len(), 1);
}

#[tokio::test]
async fn test_listing_failure_degrades_batch() {
    let server = MockServer::start().await;
    mount_listing(&server, "1", &["/articles/a"]).await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = parse_config(&config_toml(&server.uri(), "unused.db")).unwrap();
    let mut fetcher = PageFetcher::new(&config.http, &config.browser).unwrap();

    let report = BatchRunner::new(&mut fetcher)
        .show_progress(false)
        .run(&config.jobs[0])
        .await
        .unwrap();

    assert!(report.is_degraded());
    assert_eq!(report.listing_pages, 1);
    assert_eq!(report.discovered, 0);
    assert!(report.records.is_empty());
    assert!(report.failures.is_empty());
}

#[test]
fn test_sink_connect_failure_inserts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let unreachable = dir.path().join("missing").join("harvest.db");

    let result = store_records(unreachable.to_str().unwrap(), "articles", &[]);

    assert!(matches!(result, Err(SinkError::Connect { .. })));
    assert!(!unreachable.exists());
}
