//! Library API integration tests
use pagemark_core::*;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).expect("fixture should exist")
}

#[test]
fn test_extract_api() {
    let html = read_fixture("article.html");
    let article = extract_article(&html, "https://example.com/docs/install").expect("should extract");

    assert_eq!(article.title, "Installing the Toolchain");
    assert!(!article.content_html.is_empty());
    assert!(!article.content_html.contains("top-nav"));
}

#[test]
fn test_serialize_api() {
    let html = read_fixture("article.html");
    let article = extract_article(&html, "https://example.com/docs/install").expect("should extract");

    let serializer = MarkdownSerializer::default();
    let markdown = serializer.serialize(&article.content_html);

    assert!(markdown.contains("## Prerequisites"));
    assert!(markdown.contains("```bash"));
    assert!(markdown.contains("```rust"));
    assert!(markdown.contains("`--default`"));
    assert!(markdown.contains("> **💡 TIP**"));
    assert!(markdown.contains("> **⚠️ WARNING**"));
    assert!(markdown.contains("![Install flow](diagram.png)"));
    assert!(markdown.contains("**Platform**|**Architecture**|**Tier**"));
    assert!(markdown.contains("---|---|---"));
    assert!(markdown.contains("[configuration guide](https://example.com/docs/configure)"));
}

#[test]
fn test_boilerplate_absent_from_output() {
    let html = read_fixture("article.html");
    let article = extract_article(&html, "https://example.com/docs/install").expect("should extract");
    let markdown = MarkdownSerializer::default().serialize(&article.content_html);

    assert!(!markdown.contains("Edit this page"));
    assert!(!markdown.contains("Great guide"));
    assert!(!markdown.contains("© 2025"));
    assert!(
        !markdown.contains("[Prerequisites](#prerequisites)"),
        "table of contents should be stripped"
    );
}

#[test]
fn test_normalize_full_document_idempotent() {
    let html = read_fixture("article.html");
    let article = extract_article(&html, "https://example.com/docs/install").expect("should extract");
    let markdown = MarkdownSerializer::default().serialize(&article.content_html);

    let once = normalize_markdown(&markdown);
    let twice = normalize_markdown(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_extraction_failure_on_empty_page() {
    let html = read_fixture("empty_content.html");
    let result = extract_article(&html, "https://example.com/empty");
    assert!(matches!(result, Err(PagemarkError::NoContent)));
}

#[tokio::test]
async fn test_full_pipeline_from_file() {
    let mut fetcher = FileFetcher;
    let markdown = convert_to_markdown(
        &mut fetcher,
        &get_fixture_path("article.html"),
        &ConvertOptions::default(),
    )
    .await
    .expect("conversion should succeed");

    assert!(markdown.starts_with("# Installing the Toolchain\n\n"));
    assert!(markdown.contains("```rust"));
    assert!(markdown.ends_with('\n'));
}

#[tokio::test]
async fn test_minimal_page_property() {
    let html = read_fixture("minimal.html");
    let mut fetcher = StaticFetcher::new(html);

    let markdown = convert_to_markdown(&mut fetcher, "https://example.com/minimal", &ConvertOptions::default())
        .await
        .expect("conversion should succeed");

    assert!(markdown.starts_with("# Title\n\nBody text"));
}

#[tokio::test]
async fn test_convert_page_writes_only_on_success() {
    let tmp = tempfile::TempDir::new().unwrap();
    let output = tmp.path().join("out.md");

    let mut fetcher = FileFetcher;
    let result = convert_page(
        &mut fetcher,
        &get_fixture_path("empty_content.html"),
        &output,
        &ConvertOptions::default(),
    )
    .await;

    assert!(result.is_err());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_script_disable_option_accepted() {
    let html = read_fixture("article.html");
    let mut fetcher = StaticFetcher::new(html);
    let options = ConvertOptions {
        fetch: FetchOptions { disable_scripts: true, ..Default::default() },
        ..Default::default()
    };

    let markdown = convert_to_markdown(&mut fetcher, "https://example.com/docs/install", &options)
        .await
        .expect("conversion should succeed");
    assert!(!markdown.contains("analytics"));
}
