//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the HTTP
//! fetcher and the full crawl cycle end-to-end.

use tiercrawl::config::{
    parse_config, PolitenessConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};
use tiercrawl::crawler::{build_crawler, Crawler, Fetcher, HttpFetcher, NO_RESPONSE};
use tiercrawl::output::write_records;
use tiercrawl::{Product, ProductPolicy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHICKEN: &str = include_str!("../fixtures/product_chicken.html");
const NELLIK: &str = include_str!("../fixtures/product_no_categories_nellik.html");

fn create_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

/// No politeness delay and immediate retries, so tests run fast
fn create_politeness(max_retries: u32) -> PolitenessConfig {
    PolitenessConfig {
        min_delay_ms: 0,
        max_delay_ms: 0,
        max_retries,
        default_retry_after_secs: 0,
        max_retry_after_secs: 1,
        request_timeout_secs: 5,
    }
}

fn create_fetcher(max_retries: u32) -> HttpFetcher {
    HttpFetcher::new(&create_user_agent(), create_politeness(max_retries))
        .expect("Failed to build fetcher")
}

fn create_site_config(base_url: &str) -> SiteConfig {
    let base = regex::escape(base_url);
    SiteConfig {
        visit_pattern: format!("^{}/no/(?:products|categories)/.*", base),
        collect_pattern: format!(r"^{}/no/products/\d+-.+", base),
        disallow: vec!["/handlekurv/partial/".to_string()],
        selectors: SelectorConfig::default(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Mounts a small catalogue:
///
/// - `/no/products/` lists a product and a category
/// - the product page (chicken fixture) links to a missing product
/// - the category page links to a second product (nellik fixture)
async fn mount_catalogue(server: &MockServer) {
    mount_page(
        server,
        "/no/products/",
        r#"<html><body>
            <a href="/no/products/31885-okologisk-hel-kylling/">Kylling</a>
            <a href="/no/categories/488-mathall/">Mathall</a>
            <a href="/handlekurv/partial/">Handlekurv</a>
            <a href="/no/recipes/">Oppskrifter</a>
        </body></html>"#,
    )
    .await;
    mount_page(server, "/no/products/31885-okologisk-hel-kylling/", CHICKEN).await;
    mount_page(
        server,
        "/no/categories/488-mathall/",
        r#"<html><body>
            <a href="/no/products/6250-toro-nellik-malt/">Nellik</a>
            <a href="/no/products/">Alle produkter</a>
        </body></html>"#,
    )
    .await;
    mount_page(server, "/no/products/6250-toro-nellik-malt/", NELLIK).await;
}

#[tokio::test]
async fn test_fetch_success_parses_document() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/page", "<html><head><title>Hi</title></head></html>").await;

    let fetcher = create_fetcher(3);
    let address = format!("{}/page", mock_server.uri());
    let page = fetcher.fetch(&address).await;

    assert_eq!(page.status, 200);
    assert_eq!(page.address, address);
    assert!(page.document.is_some());
}

#[tokio::test]
async fn test_fetch_retries_rate_limited_then_succeeds() {
    let mock_server = MockServer::start().await;

    // Mounted first, so it answers the first two requests
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(html("<html><body>ok</body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(3);
    let page = fetcher.fetch(&format!("{}/busy", mock_server.uri())).await;

    assert_eq!(page.status, 200);
    assert!(page.document.is_some());
}

#[tokio::test]
async fn test_fetch_gives_up_after_retry_budget() {
    let mock_server = MockServer::start().await;

    // One initial attempt plus two retries
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(2);
    let page = fetcher.fetch(&format!("{}/busy", mock_server.uri())).await;

    assert_eq!(page.status, 429);
    assert!(page.document.is_none());
}

#[tokio::test]
async fn test_fetch_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(3);
    let page = fetcher.fetch(&format!("{}/missing", mock_server.uri())).await;

    assert_eq!(page.status, 404);
    assert!(page.document.is_none());
}

#[tokio::test]
async fn test_fetch_connection_refused_degrades_to_absent() {
    let fetcher = create_fetcher(3);
    let page = fetcher.fetch("http://127.0.0.1:1/").await;

    assert_eq!(page.status, NO_RESPONSE);
    assert!(page.document.is_none());
}

#[tokio::test]
async fn test_full_crawl_collects_products() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalogue(&mock_server).await;

    let policy = ProductPolicy::from_config(&create_site_config(&base_url)).unwrap();
    let seed = format!("{}/no/products/", base_url);
    let mut crawler = Crawler::new(seed.clone(), 20, create_fetcher(0), policy);

    let stats = crawler.run().await.expect("Crawl failed");

    // Listing, two products, one missing product, three category pages
    // of which only 488-mathall is served
    assert_eq!(stats.visited, 7);
    assert_eq!(stats.pending, 0);
    assert!(crawler.frontier().is_empty());
    assert!(crawler.visited().contains(&seed));
    assert!(crawler
        .visited()
        .contains(&format!("{}/no/products/31886-hovelsrud-gard-kyllingfilet/", base_url)));
    assert!(!crawler
        .visited()
        .contains(&format!("{}/handlekurv/partial/", base_url)));
    assert_eq!(stats.visits_by_status.get(&404), Some(&3));
    assert_eq!(stats.visits_by_status.get(&200), Some(&4));

    let ids: Vec<Option<String>> = crawler.collected().iter().map(|p| p.id.clone()).collect();
    assert_eq!(
        ids,
        vec![Some("31885".to_string()), Some("6250".to_string())]
    );
}

#[tokio::test]
async fn test_product_pages_visited_before_categories() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalogue(&mock_server).await;

    let policy = ProductPolicy::from_config(&create_site_config(&base_url)).unwrap();
    let mut crawler = Crawler::new(format!("{}/no/products/", base_url), 20, create_fetcher(0), policy);
    crawler.run().await.expect("Crawl failed");

    let requests = mock_server.received_requests().await.unwrap();
    let paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    let position = |p: &str| paths.iter().position(|x| x == p).unwrap();

    let category = position("/no/categories/488-mathall/");
    assert!(position("/no/products/31885-okologisk-hel-kylling/") < category);
    assert!(position("/no/products/31886-hovelsrud-gard-kyllingfilet/") < category);

    // Every address was requested exactly once
    let mut unique = paths.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), paths.len());
}

#[tokio::test]
async fn test_crawl_respects_visit_budget() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalogue(&mock_server).await;

    let policy = ProductPolicy::from_config(&create_site_config(&base_url)).unwrap();
    let mut crawler = Crawler::new(format!("{}/no/products/", base_url), 2, create_fetcher(0), policy);

    let stats = crawler.run().await.expect("Crawl failed");

    // The seed, then the prioritized product page
    assert_eq!(stats.visited, 2);
    assert_eq!(crawler.collected().len(), 1);
    assert_eq!(crawler.collected()[0].id.as_deref(), Some("31885"));
    assert!(stats.pending > 0);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_crawl_output_to_csv() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalogue(&mock_server).await;

    let policy = ProductPolicy::from_config(&create_site_config(&base_url)).unwrap();
    let mut crawler = Crawler::new(format!("{}/no/products/", base_url), 20, create_fetcher(0), policy);
    crawler.run().await.expect("Crawl failed");

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("products.csv");
    let products: Vec<Product> = crawler.into_collected();
    write_records(&csv_path, &products).unwrap();

    let content = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("id,name,brand,price,currency,category_path,category_0,category_1,category_2,category_3")
    );
    assert_eq!(
        lines.next(),
        Some("31885,\"Økologisk Hel kylling ca. 2,4 kg\",Hovelsrud Gård,386.60,NOK,/no/categories/488-mathall/489-kjottdisken/,no,488-mathall,489-kjottdisken,")
    );
    assert_eq!(lines.next(), Some("6250,Nellik Malt 10 g,Toro,7.40,,,,,,"));
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn test_seed_without_trailing_slash_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // The home page links back to itself in two spellings
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r##"<a href="/">Home</a><a href="/#top">Top</a>"##))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = parse_config(&format!(
        r#"
[crawler]
seed = "{base}"
max-visits = 10

[politeness]
min-delay-ms = 0
max-delay-ms = 0

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
records-path = "./products.csv"
snapshot-dir = "./snapshot"

[site]
visit-pattern = '^{pattern}/'
collect-pattern = '^{pattern}/products/\d+'
"#,
        base = base_url,
        pattern = regex::escape(&base_url),
    ))
    .expect("Failed to parse config");

    let mut crawler = build_crawler(&config).expect("Failed to build crawler");
    let stats = crawler.run().await.expect("Crawl failed");

    assert_eq!(stats.visited, 1);
    assert_eq!(stats.duplicates_skipped, 0);
    assert!(crawler.visited().contains(&format!("{}/", base_url)));
}
