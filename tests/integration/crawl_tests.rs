//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_scribe::annotate::{NullAnnotator, OpenAiAnnotator, OpenAiSettings};
use site_scribe::config::{load_config, parse_config, Config, ConfigFormat};
use site_scribe::crawler::{run_crawl, Coordinator, HttpFetcher};
use site_scribe::PageOutcome;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `start_url` into `output`
fn create_test_config(start_url: &str, output: &Path, max_pages: u32) -> Config {
    let content = format!(
        r#"
start_url = "{}"
max_pages = {}
output_directory = "{}"
user_agent = "TestBot/1.0"
delay_between_requests = 0.0
openai_model = "test-model"
request_timeout_secs = 5
"#,
        start_url,
        max_pages,
        output.display()
    );
    parse_config(&content, ConfigFormat::Toml).expect("test config should be valid")
}

/// Directory the crawl writes into for the mock server's authority
fn domain_dir(output: &Path, server: &MockServer) -> PathBuf {
    let authority = server.uri().trim_start_matches("http://").to_string();
    output.join(authority)
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("output directory should exist")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

async fn mount_small_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <h1>Home</h1>
                <p>Welcome to the test site.</p>
                <a href="/page1">Page 1</a>
                <a href="/page2/">Page 2</a>
                <a href="/missing">Missing</a>
                <a href="https://elsewhere.example/x">Elsewhere</a>
                <a href="mailto:info@example.com">Mail</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<html><body><p>First page.</p><a href="/">Home</a><a href="/page2">Page 2</a></body></html>"#,
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(
            r#"<html><body><p>Second page.</p><a href="/page1/">Page 1</a></body></html>"#,
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), tmp.path(), 50);

    let stats = run_crawl(config, Box::new(NullAnnotator), None)
        .await
        .expect("crawl should succeed");

    assert_eq!(stats.pages_processed, 3);
    assert_eq!(stats.count(PageOutcome::DeadLink), 1);
    assert!(stats.finished_at.is_some());

    let dir = domain_dir(tmp.path(), &server);
    let files = list_files(&dir);
    assert_eq!(files.len(), 3, "unexpected files: {:?}", files);
    assert!(files.iter().all(|f| f.ends_with(".txt")));
    assert!(files.iter().all(|f| !f.contains("missing")));

    let page1 = files
        .iter()
        .find(|f| f.ends_with("_page1.txt"))
        .expect("page1 should be saved");
    let content = std::fs::read_to_string(dir.join(page1)).unwrap();
    assert!(content.starts_with(&format!("lien: {}/page1\n", server.uri())));
    assert!(content.contains("#pro: no\n"));
    assert!(content.ends_with("\n------\n\nFirst page."));
}

#[tokio::test]
async fn test_crawl_respects_page_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<p>Index</p><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html("<p>Leaf</p>"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), tmp.path(), 2);

    let stats = run_crawl(config, Box::new(NullAnnotator), None).await.unwrap();

    assert_eq!(stats.pages_processed, 2);
    assert_eq!(list_files(&domain_dir(tmp.path(), &server)).len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_crawl_follows_redirect_and_names_by_final_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/accueil", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/accueil"))
        .respond_with(html("<p>Bienvenue</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), tmp.path(), 5);

    run_crawl(config, Box::new(NullAnnotator), None).await.unwrap();

    let files = list_files(&domain_dir(tmp.path(), &server));
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("_accueil.txt"));
}

#[tokio::test]
async fn test_crawl_with_annotation_service() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>The HP-2040 hydraulic pump.</p>"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Keywords (EN): pump\nKeywords (FR): pompe\nSummary (EN): A pump. It pumps.\nSummary (FR): Une pompe. Elle pompe.\nProduct Number: HP-2040"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", server.uri()), tmp.path(), 5);
    config.openai_base_url = format!("{}/v1", server.uri());

    let annotator = OpenAiAnnotator::new("test-key", OpenAiSettings::from_config(&config)).unwrap();
    let fetcher = HttpFetcher::new(&config.user_agent, Duration::from_secs(5)).unwrap();
    let mut coordinator = Coordinator::new(config, Box::new(fetcher), Box::new(annotator)).unwrap();
    coordinator.run().await.unwrap();

    let dir = coordinator.output_dir().to_path_buf();
    let files = list_files(&dir);
    assert_eq!(files.len(), 1);

    let content = std::fs::read_to_string(dir.join(&files[0])).unwrap();
    assert!(content.contains("mot clé anglais: pump\n"));
    assert!(content.contains("mot clé français: pompe\n"));
    assert!(content.contains("résumé (EN): A pump. It pumps.\n"));
    assert!(content.contains("résumé (FR): Une pompe. Elle pompe.\n"));
    assert!(content.contains("#pro : HP-2040\n"));
    assert!(content.ends_with("The HP-2040 hydraulic pump."));
}

#[tokio::test]
async fn test_crawl_survives_annotation_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>Still saved.</p>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", server.uri()), tmp.path(), 5);
    config.openai_base_url = format!("{}/v1", server.uri());

    let annotator = OpenAiAnnotator::new("wrong-key", OpenAiSettings::from_config(&config)).unwrap();
    let stats = run_crawl(config, Box::new(annotator), None).await.unwrap();

    assert_eq!(stats.pages_processed, 1);
    let dir = domain_dir(tmp.path(), &server);
    let files = list_files(&dir);
    let content = std::fs::read_to_string(dir.join(&files[0])).unwrap();
    assert!(content.contains("#pro: no\n"));
    assert!(content.ends_with("Still saved."));
}

#[tokio::test]
async fn test_json_config_drives_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>From JSON.</p>"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("out");
    let config_json = serde_json::json!({
        "start_url": format!("{}/", server.uri()),
        "max_pages": 3,
        "output_directory": output.display().to_string(),
        "user_agent": "TestBot/1.0",
        "delay_between_requests": 0.0,
        "openai_model": "test-model"
    });

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(config_json.to_string().as_bytes()).unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).expect("JSON config should load");
    let stats = run_crawl(config, Box::new(NullAnnotator), None).await.unwrap();

    assert_eq!(stats.pages_processed, 1);
    assert_eq!(list_files(&domain_dir(&output, &server)).len(), 1);
}
