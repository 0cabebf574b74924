//! Integration tests for the scraper
//!
//! These tests use wiremock to serve a small listing catalog and run the
//! full scrape cycle end-to-end against it with the HTTP renderer.

use listing_scraper::config::{parse_config, Config};
use listing_scraper::crawler::run_scrape;
use listing_scraper::output::{read_records, RunStatus};
use listing_scraper::record::{FieldValue, Schema, AREA_FIELD, PRICE_FIELD, PUBLISHED_FIELD};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock catalog
fn create_test_config(base_url: &str, csv_path: &Path, max_pages: u32) -> Config {
    let toml = format!(
        r#"
[crawler]
base-url = "{}/listings"
max-pages = {}
cap-per-page = 10
min-delay-ms = 0
max-delay-ms = 0
info-panel-timeout-ms = 100
panel-settle-ms = 0

[output]
csv-path = "{}"
"#,
        base_url,
        max_pages,
        csv_path.display()
    );
    parse_config(&toml).expect("test config should be valid")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html; charset=utf-8")
}

fn result_page(ids: &[u32]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<a href="/ad/{}"><div class="_listingCard__PoR_B"><h3>شقة {}</h3></div></a>"#,
                id, id
            )
        })
        .collect();
    format!(
        r#"<html><body><nav><a href="/">الرئيسية</a></nav>{}</body></html>"#,
        cards
    )
}

fn detail_page(id: u32) -> String {
    format!(
        r#"<html><body>
        <h2 class="_price__EH7rC">{},000</h2>
        <div class="_item___4Sv8"><span class="_label___qjLO">المساحة</span><span class="_value__yF2Fx">{} m²</span></div>
        <div class="_newSpecCard__hWWBI _boolean__waHdB">
          <div><span class="_label___qjLO">مصعد</span></div>
        </div>
        <div>معلومات الإعلان</div>
        <div class="_item___4Sv8"><span class="_label___qjLO">تاريخ الإضافة</span><div><span>منذ</span><span>2024/11/0{}</span></div></div>
        </body></html>"#,
        id * 100,
        id * 10,
        id
    )
}

async fn mount_catalog(server: &MockServer, pages: &[&[u32]]) {
    for (number, ids) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(format!("/listings/{}", number + 1)))
            .respond_with(html(result_page(ids)))
            .mount(server)
            .await;

        for id in ids.iter() {
            Mock::given(method("GET"))
                .and(path(format!("/ad/{}", id)))
                .respond_with(html(detail_page(*id)))
                .mount(server)
                .await;
        }
    }
}

fn read_urls(csv_path: &Path) -> Vec<String> {
    read_records(csv_path, Arc::new(Schema::listing()))
        .expect("output should parse")
        .iter()
        .map(|record| record.url().to_string())
        .collect()
}

#[tokio::test]
async fn test_full_scrape_three_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server, &[&[1, 2, 3, 4], &[5, 6], &[]]).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("apartments.csv");
    let config = create_test_config(&base_url, &csv_path, 3);

    let summary = run_scrape(config).await.expect("scrape should run");

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.records_written, 6);
    assert_eq!(summary.details_failed, 0);

    let expected: Vec<String> = (1..=6).map(|id| format!("{}/ad/{}", base_url, id)).collect();
    assert_eq!(read_urls(&csv_path), expected);

    // Header appears once
    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 7);
    assert_eq!(
        content.lines().filter(|line| line.contains("Apartment Link")).count(),
        1
    );
}

#[tokio::test]
async fn test_extracted_fields_survive_round_trip() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server, &[&[5]]).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("apartments.csv");
    let config = create_test_config(&base_url, &csv_path, 1);

    run_scrape(config).await.expect("scrape should run");

    let records = read_records(&csv_path, Arc::new(Schema::listing())).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];

    assert_eq!(record.get(PRICE_FIELD), Some(&FieldValue::Text("500,000".to_string())));
    assert_eq!(record.get(AREA_FIELD), Some(&FieldValue::Text("50 m²".to_string())));
    assert_eq!(record.get("مصعد"), Some(&FieldValue::Flag(true)));
    assert_eq!(record.get("مدخلين"), None);
    assert_eq!(
        record.get(PUBLISHED_FIELD),
        Some(&FieldValue::Text("2024/11/05".to_string()))
    );
}

#[tokio::test]
async fn test_listing_failure_aborts_and_keeps_earlier_records() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server, &[&[1, 2, 3]]).await;

    Mock::given(method("GET"))
        .and(path("/listings/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("apartments.csv");
    let config = create_test_config(&base_url, &csv_path, 3);

    let summary = run_scrape(config).await.expect("scrape should run");

    assert!(matches!(summary.status, RunStatus::Aborted { page: 2, .. }));
    assert_eq!(summary.pages_visited, 1);

    let expected: Vec<String> = (1..=3).map(|id| format!("{}/ad/{}", base_url, id)).collect();
    assert_eq!(read_urls(&csv_path), expected);

    // Page 3 is never requested
    let requests = mock_server.received_requests().await.unwrap();
    assert!(!requests.iter().any(|r| r.url.path() == "/listings/3"));
}

#[tokio::test]
async fn test_broken_detail_page_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/listings/1"))
        .respond_with(html(result_page(&[1, 2, 3])))
        .mount(&mock_server)
        .await;
    for id in [1, 3] {
        Mock::given(method("GET"))
            .and(path(format!("/ad/{}", id)))
            .respond_with(html(detail_page(id)))
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/ad/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("apartments.csv");
    let config = create_test_config(&base_url, &csv_path, 1);

    let summary = run_scrape(config).await.expect("scrape should run");

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.details_failed, 1);
    assert_eq!(
        read_urls(&csv_path),
        vec![format!("{}/ad/1", base_url), format!("{}/ad/3", base_url)]
    );
}

#[tokio::test]
async fn test_existing_output_is_replaced() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server, &[&[1]]).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("apartments.csv");
    std::fs::write(&csv_path, "old,header\nx,y\n").unwrap();

    let config = create_test_config(&base_url, &csv_path, 1);
    run_scrape(config).await.expect("scrape should run");

    assert_eq!(read_urls(&csv_path), vec![format!("{}/ad/1", base_url)]);
}
