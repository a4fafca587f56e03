//! Integration tests for the scraper
//!
//! These tests use wiremock to serve a miniature catalog and drive the
//! coordinator end-to-end over real HTTP.

use shelf_scraper::assets::ImageAcquirer;
use shelf_scraper::config::{Config, OutputFormat, Target};
use shelf_scraper::crawler::{Coordinator, TracingObserver};
use shelf_scraper::output::RunStamp;
use shelf_scraper::page::HttpPage;
use shelf_scraper::{ConfigError, Record, ScrapeError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMESTAMP: &str = "2026-03-04_05-06-07";

/// Renders a listing page with `count` items, image paths relative to the site root
fn listing_page(prefix: &str, count: usize, next: bool) -> String {
    let items: String = (1..=count)
        .map(|i| {
            format!(
                r#"<li><article class="product_pod">
                     <div class="image_container">
                       <a href="x.html"><img src="../../media/{prefix}-{i}.jpg" alt="x"></a>
                     </div>
                     <h3><a href="x.html" title="{prefix} Book {i}">{prefix} Book...</a></h3>
                     <div class="product_price">
                       <p class="price_color">£{i}.99</p>
                       <p class="instock availability">
                         <i class="icon-ok"></i>
                         In stock
                       </p>
                     </div>
                   </article></li>"#
            )
        })
        .collect();

    let pager = if next {
        r#"<ul class="pager"><li class="next"><a href="page-next.html">next</a></li></ul>"#
    } else {
        ""
    };

    format!(
        r#"<html><head><title>Listing</title></head><body>
           <ol class="row">{items}</ol>{pager}</body></html>"#
    )
}

/// Home page with a genre directory
fn home_page(genres: &[(&str, &str)]) -> String {
    let links: String = genres
        .iter()
        .map(|(name, slug)| {
            format!(r#"<li><a href="catalogue/category/books/{slug}/index.html">{name}</a></li>"#)
        })
        .collect();

    format!(
        r#"<html><body><div class="side_categories"><ul class="nav nav-list"><li>
             <a href="catalogue/category/books_1/index.html">Books</a>
             <ul>{links}</ul>
           </li></ul></div>{}</body></html>"#,
        listing_page("Home", 1, false)
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Creates a test configuration against the mock server, with no delays
fn create_test_config(base_url: &str, output: &Path, assets: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = format!("{}/", base_url);
    config.crawler.inter_page_delay_ms = 0;
    config.crawler.retry_backoff_ms = 0;
    config.crawler.max_retries = 0;
    config.crawler.assets_dir = assets.display().to_string();
    config.output.directory = output.display().to_string();
    config
}

fn create_coordinator(
    config: Config,
    selected_genres: bool,
) -> Coordinator<HttpPage, TracingObserver> {
    let client = reqwest::Client::new();
    Coordinator::new(
        config,
        HttpPage::new(client.clone()),
        ImageAcquirer::new(client),
        TracingObserver::new(),
        RunStamp::new(TIMESTAMP, selected_genres),
    )
    .expect("Failed to create coordinator")
}

fn read_records(path: &Path) -> Vec<Record> {
    let body = std::fs::read_to_string(path).expect("Failed to read result file");
    serde_json::from_str(&body).expect("Failed to parse result file")
}

#[tokio::test]
async fn test_flat_catalog_two_pages() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    mount_html(&mock_server, "/index.html", listing_page("First", 20, true)).await;
    mount_html(
        &mock_server,
        "/catalogue/page-2.html",
        listing_page("Second", 20, true),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), output.path(), assets.path());
    config.crawler.page_limit = Some(2);

    let mut coordinator = create_coordinator(config, false);
    let outcome = coordinator.run().await.expect("Scrape failed");

    assert_eq!(outcome.records.len(), 40);
    assert!(outcome.records[..20].iter().all(|r| r.page_index == Some(1)));
    assert!(outcome.records[20..].iter().all(|r| r.page_index == Some(2)));
    assert!(outcome.records.iter().all(|r| r.genre.is_none()));

    let first = &outcome.records[0];
    assert_eq!(first.title, "First Book 1");
    assert_eq!(first.price, "£1.99");
    assert_eq!(first.availability, "In stock");
    assert_eq!(first.image, format!("{}/media/First-1.jpg", mock_server.uri()));

    let path = outcome.output_path.expect("No result file written");
    assert_eq!(path, output.path().join(format!("books-{}.json", TIMESTAMP)));
    assert_eq!(read_records(&path), outcome.records);

    let stats = coordinator.observer().statistics();
    assert_eq!(stats.pages_scraped, 2);
    assert_eq!(stats.records, 40);
    assert_eq!(stats.files_written, 1);

    // Without the images target or flag nothing is downloaded
    assert_eq!(std::fs::read_dir(assets.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_transient_page_failure_is_retried() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    mount_html(&mock_server, "/index.html", listing_page("First", 3, true)).await;
    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/catalogue/page-2.html",
        listing_page("Second", 3, false),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), output.path(), assets.path());
    config.crawler.page_limit = None;
    config.crawler.max_retries = 1;

    let mut coordinator = create_coordinator(config, false);
    let outcome = coordinator.run().await.expect("Scrape failed");

    assert_eq!(outcome.records.len(), 6);
    let stats = coordinator.observer().statistics();
    assert_eq!(stats.page_retries, 1);
    assert_eq!(stats.pages_skipped, 0);
}

#[tokio::test]
async fn test_csv_output() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    mount_html(&mock_server, "/index.html", listing_page("First", 2, false)).await;

    let mut config = create_test_config(&mock_server.uri(), output.path(), assets.path());
    config.output.format = OutputFormat::Csv;

    let outcome = create_coordinator(config, false)
        .run()
        .await
        .expect("Scrape failed");

    let path = outcome.output_path.expect("No result file written");
    assert_eq!(path, output.path().join(format!("books-{}.csv", TIMESTAMP)));

    let body = std::fs::read_to_string(path).unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("title,price,availability,image,pageIndex")
    );
    assert_eq!(lines.count(), 2);
}

#[tokio::test]
async fn test_genre_filter_single_stream() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    mount_html(
        &mock_server,
        "/",
        home_page(&[
            ("Travel", "travel_2"),
            ("Fiction", "fiction_10"),
            ("Romance", "romance_8"),
        ]),
    )
    .await;
    mount_html(
        &mock_server,
        "/catalogue/category/books/travel_2/index.html",
        listing_page("Travel", 3, false),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/media/Travel-1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), output.path(), assets.path());
    config.crawler.target = Target::Genre;
    config.crawler.genres = Some(vec!["Travel".to_string()]);
    config.crawler.genre_limit = Some(5);
    config.crawler.download_images = true;

    let mut coordinator = create_coordinator(config, true);
    let outcome = coordinator.run().await.expect("Scrape failed");

    assert_eq!(outcome.records.len(), 3);
    assert!(outcome
        .records
        .iter()
        .all(|r| r.genre.as_deref() == Some("Travel") && r.page_index.is_none()));

    let run_dir = format!("selectedGenres-{}", TIMESTAMP);
    let genre_file = output
        .path()
        .join(&run_dir)
        .join("Travel")
        .join(format!("Travel-{}.json", TIMESTAMP));
    assert_eq!(read_records(&genre_file), outcome.records);
    assert_eq!(
        outcome.output_path,
        Some(output.path().join(format!("genre-{}.json", TIMESTAMP)))
    );

    // Only the first cover exists on the server
    let image = assets
        .path()
        .join(&run_dir)
        .join("Travel")
        .join("Travel_Book_1.jpg");
    assert_eq!(std::fs::read(image).unwrap(), vec![0xFF, 0xD8, 0xFF]);

    let stats = coordinator.observer().statistics();
    assert_eq!(stats.streams, 1);
    assert_eq!(stats.genres_processed, 1);
    assert_eq!(stats.images_saved, 1);
    assert_eq!(stats.images_failed, 2);
}

#[tokio::test]
async fn test_unknown_genre_filter_rejected() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    mount_html(&mock_server, "/", home_page(&[("Travel", "travel_2")])).await;

    let mut config = create_test_config(&mock_server.uri(), output.path(), assets.path());
    config.crawler.target = Target::Genre;
    config.crawler.genres = Some(vec!["Cookbooks".to_string(), "Atlases".to_string()]);

    let result = create_coordinator(config, true).run().await;

    match result {
        Err(ScrapeError::Config(ConfigError::InvalidGenres { requested })) => {
            assert_eq!(requested, "Cookbooks,Atlases");
        }
        other => panic!("Expected InvalidGenres, got {:?}", other.map(|o| o.records.len())),
    }
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_images_target_single_page_uses_assets_root() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    mount_html(&mock_server, "/index.html", listing_page("Cover", 2, true)).await;
    Mock::given(method("GET"))
        .and(path("/media/Cover-1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"one".to_vec()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/Cover-2.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"two".to_vec()))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), output.path(), assets.path());
    config.crawler.target = Target::Images;

    let outcome = create_coordinator(config, false)
        .run()
        .await
        .expect("Scrape failed");

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(
        std::fs::read(assets.path().join("Cover_Book_1.jpg")).unwrap(),
        b"one"
    );
    assert_eq!(
        std::fs::read(assets.path().join("Cover_Book_2.jpg")).unwrap(),
        b"two"
    );
    assert_eq!(
        outcome.output_path,
        Some(output.path().join(format!("images-{}.json", TIMESTAMP)))
    );
}

#[tokio::test]
async fn test_images_target_multi_page_uses_page_directories() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    // Both pages list a book with the same title and cover
    mount_html(&mock_server, "/index.html", listing_page("Same", 1, true)).await;
    mount_html(
        &mock_server,
        "/catalogue/page-2.html",
        listing_page("Same", 1, false),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/media/Same-1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"cover".to_vec()))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), output.path(), assets.path());
    config.crawler.target = Target::Images;
    config.crawler.page_limit = Some(2);

    let mut coordinator = create_coordinator(config, false);
    let outcome = coordinator.run().await.expect("Scrape failed");

    assert_eq!(outcome.records.len(), 2);
    for page in ["page-1", "page-2"] {
        let directory = assets.path().join(page);
        assert_eq!(
            std::fs::read(directory.join("Same_Book_1.jpg")).unwrap(),
            b"cover"
        );
        assert!(!directory.join("Same_Book_1(1).jpg").exists());
        assert_eq!(std::fs::read_dir(&directory).unwrap().count(), 1);
    }
    assert!(!assets.path().join("Same_Book_1.jpg").exists());
    assert_eq!(coordinator.observer().statistics().images_saved, 2);
}

#[tokio::test]
async fn test_genre_stream_follows_next_page() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    mount_html(&mock_server, "/", home_page(&[("Poetry", "poetry_23")])).await;
    mount_html(
        &mock_server,
        "/catalogue/category/books/poetry_23/index.html",
        listing_page("Verse", 2, true),
    )
    .await;
    mount_html(
        &mock_server,
        "/catalogue/category/books/poetry_23/page-2.html",
        listing_page("Rhyme", 1, false),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), output.path(), assets.path());
    config.crawler.target = Target::Genre;
    config.crawler.page_limit = None;

    let mut coordinator = create_coordinator(config, false);
    let outcome = coordinator.run().await.expect("Scrape failed");

    let titles: Vec<_> = outcome.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Verse Book 1", "Verse Book 2", "Rhyme Book 1"]);
    assert!(outcome
        .records
        .iter()
        .all(|r| r.genre.as_deref() == Some("Poetry")));

    let stats = coordinator.observer().statistics();
    assert_eq!(stats.pages_scraped, 2);
    assert_eq!(stats.streams, 1);

    let genre_file = output
        .path()
        .join(format!("allGenres-{}", TIMESTAMP))
        .join("Poetry")
        .join(format!("Poetry-{}.json", TIMESTAMP));
    assert_eq!(read_records(&genre_file).len(), 3);
}
