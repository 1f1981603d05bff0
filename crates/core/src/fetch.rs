//! Page fetching: browser configuration, the fetcher contract, and the
//! shipping HTTP and file implementations.
//!
//! A [`PageFetcher`] owns whatever resource is needed to turn a URL into a
//! final rendered HTML snapshot and must release it when [`PageFetcher::close`]
//! is called. The conversion orchestrator closes the fetcher on every exit
//! path, success or failure.
//!
//! [`HttpFetcher`] is the default implementation: a plain HTTP GET with
//! browser-like headers. It covers static and server-rendered pages without
//! carrying a browser engine; a headless-browser fetcher can implement the
//! same trait for pages that require script execution.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::readiness::{ReadinessConfig, ReadinessDetector, StaticSession};
use crate::{PagemarkError, Result};

/// Browser-level defaults applied to every fetch.
///
/// These used to be process-wide globals in comparable tools; here they are
/// an explicit configuration struct passed to the fetcher constructor so
/// callers can override them per conversion.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Viewport width in CSS pixels (default: 1280).
    pub viewport_width: u32,
    /// Viewport height in CSS pixels (default: 800).
    pub viewport_height: u32,
    /// User-Agent string sent with every request.
    pub user_agent: String,
    /// Whether to launch browser-based fetchers without a sandbox
    /// (default: true). Ignored by [`HttpFetcher`].
    pub no_sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 800,
            user_agent: "Mozilla/5.0 (compatible; Pagemark/0.2; +https://github.com/stormlightlabs/pagemark)"
                .to_string(),
            no_sandbox: true,
        }
    }
}

/// Per-call fetch options.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// End-to-end page load timeout in milliseconds (default: 30000).
    pub timeout_ms: u64,
    /// Whether to disable script execution (default: false). For
    /// [`HttpFetcher`], scripts never execute; setting this additionally
    /// strips `<script>` elements from the snapshot.
    pub disable_scripts: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self { timeout_ms: 30000, disable_scripts: false }
    }
}

/// The final rendered snapshot of a page.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// The rendered HTML.
    pub html: String,
    /// The URL the page actually settled on, after redirects.
    pub final_url: String,
}

/// A source of rendered HTML for a URL.
///
/// Implementations own their underlying resource (an HTTP client, a browser
/// process) for the duration of one conversion and release it in `close`.
#[async_trait]
pub trait PageFetcher: Send {
    /// Navigates to `url` and returns the final HTML snapshot.
    async fn fetch(&mut self, url: &str, options: &FetchOptions) -> Result<RenderedDocument>;

    /// Releases the underlying resource.
    ///
    /// Called unconditionally by the orchestrator, including on error paths.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Fetches pages over plain HTTP with browser-like headers.
pub struct HttpFetcher {
    browser: BrowserConfig,
    readiness: ReadinessConfig,
}

impl HttpFetcher {
    /// Creates a fetcher with the given browser defaults.
    ///
    /// Readiness heuristics run in single-pass mode: an HTTP snapshot
    /// cannot change, so there is nothing to poll for.
    pub fn new(browser: BrowserConfig) -> Self {
        Self { browser, readiness: ReadinessConfig::single_pass() }
    }

    /// Creates a fetcher with explicit readiness configuration.
    pub fn with_readiness(browser: BrowserConfig, readiness: ReadinessConfig) -> Self {
        Self { browser, readiness }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&mut self, url: &str, options: &FetchOptions) -> Result<RenderedDocument> {
        let parsed_url = Url::parse(url).map_err(|e| PagemarkError::InvalidUrl(e.to_string()))?;

        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(PagemarkError::InvalidUrl(format!(
                "unsupported scheme '{}' (expected http or https)",
                parsed_url.scheme()
            )));
        }

        debug!(
            viewport_width = self.browser.viewport_width,
            viewport_height = self.browser.viewport_height,
            "fetching {url}"
        );

        let client = Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .build()
            .map_err(PagemarkError::Http)?;

        let response = client
            .get(parsed_url)
            .header("User-Agent", &self.browser.user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PagemarkError::Timeout { timeout_ms: options.timeout_ms }
                } else if e.is_connect() || e.is_request() {
                    PagemarkError::Navigation { url: url.to_string(), reason: e.to_string() }
                } else {
                    PagemarkError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(PagemarkError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP status {}", response.status()),
            });
        }

        let final_url = response.url().to_string();
        let mut html = response.text().await?;

        if options.disable_scripts {
            html = strip_scripts(&html);
        }

        // No live DOM to observe over plain HTTP, so readiness runs over the
        // static snapshot: selector and text-length checks still surface
        // pages that clearly need a browser to render.
        info!("waiting for dynamic content");
        let detector = ReadinessDetector::new(self.readiness.clone());
        let mut session = StaticSession::new(html.clone());
        let report = detector.wait_until_ready(&mut session).await;
        debug!(matched = ?report.matched_selector, text_length = report.text_length, "readiness pass complete");

        Ok(RenderedDocument { html, final_url })
    }
}

/// Reads already-rendered HTML from a local file.
///
/// Lets the full pipeline run against saved pages and fixtures without any
/// network access. The `final_url` of the snapshot is the file path.
#[derive(Debug, Default)]
pub struct FileFetcher;

#[async_trait]
impl PageFetcher for FileFetcher {
    async fn fetch(&mut self, path: &str, _options: &FetchOptions) -> Result<RenderedDocument> {
        let path_buf = PathBuf::from(path);

        if !path_buf.exists() {
            return Err(PagemarkError::FileNotFound(path_buf));
        }

        let html = fs::read_to_string(&path_buf).map_err(PagemarkError::from)?;
        Ok(RenderedDocument { html, final_url: path.to_string() })
    }
}

/// Serves a fixed HTML string as the rendered page.
///
/// Covers piped input and tests; the snapshot is final by construction, so
/// no readiness pass runs.
pub struct StaticFetcher {
    html: String,
}

impl StaticFetcher {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&mut self, url: &str, _options: &FetchOptions) -> Result<RenderedDocument> {
        Ok(RenderedDocument { html: self.html.clone(), final_url: url.to_string() })
    }
}

/// Strips all script elements from an HTML string.
fn strip_scripts(html: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("script", |el| {
                el.remove();
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    if output.is_empty() { html.to_string() } else { output }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_default() {
        let config = BrowserConfig::default();
        assert_eq!(config.viewport_width, 1280);
        assert_eq!(config.viewport_height, 800);
        assert!(config.user_agent.contains("Pagemark"));
        assert!(config.no_sandbox);
    }

    #[test]
    fn test_fetch_options_default() {
        let options = FetchOptions::default();
        assert_eq!(options.timeout_ms, 30000);
        assert!(!options.disable_scripts);
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let mut fetcher = HttpFetcher::new(BrowserConfig::default());
        let result = fetcher.fetch("not-a-url", &FetchOptions::default()).await;
        assert!(matches!(result, Err(PagemarkError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_file_scheme() {
        let mut fetcher = HttpFetcher::new(BrowserConfig::default());
        let result = fetcher.fetch("file:///etc/passwd", &FetchOptions::default()).await;
        assert!(matches!(result, Err(PagemarkError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_file_fetcher_not_found() {
        let mut fetcher = FileFetcher;
        let result = fetcher.fetch("/nonexistent/page.html", &FetchOptions::default()).await;
        assert!(matches!(result, Err(PagemarkError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_file_fetcher_reads_content() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("page.html");
        fs::write(&path, "<html><body><p>hello</p></body></html>").unwrap();

        let mut fetcher = FileFetcher;
        let doc = fetcher
            .fetch(path.to_str().unwrap(), &FetchOptions::default())
            .await
            .unwrap();
        assert!(doc.html.contains("hello"));
        assert_eq!(doc.final_url, path.to_str().unwrap());
    }

    #[test]
    fn test_strip_scripts() {
        let html = r#"<html><body><script>alert(1)</script><p>Text</p></body></html>"#;
        let result = strip_scripts(html);
        assert!(!result.contains("<script"));
        assert!(!result.contains("alert"));
        assert!(result.contains("<p>Text</p>"));
    }

    #[tokio::test]
    async fn test_default_close_is_noop() {
        let mut fetcher = FileFetcher;
        assert!(fetcher.close().await.is_ok());
    }
}
