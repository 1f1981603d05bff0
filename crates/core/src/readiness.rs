//! Render readiness detection for fetched pages.
//!
//! A freshly navigated page is not necessarily done producing its visible
//! content: client-side rendering, lazy images, and scroll-triggered loaders
//! can all land after the initial load event. [`ReadinessDetector`] decides
//! when a page has settled enough for extraction, using a sequence of
//! best-effort heuristics: selector polling, a text-length check, a
//! scroll-until-stable loop, and a fixed settle delay.
//!
//! Every heuristic miss is non-fatal. The detector logs a warning and the
//! pipeline proceeds with whatever content is present.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::Result;

/// Configuration for render readiness detection.
///
/// Each selector in `content_selectors` is polled in sequence, each with its
/// own `selector_timeout_ms` budget, so the worst-case detection latency is
/// the sum of all failed budgets plus the scroll loop and settle delay.
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Selectors polled in order until one matches.
    pub content_selectors: Vec<String>,
    /// Poll budget per selector, in milliseconds.
    pub selector_timeout_ms: u64,
    /// Poll and scroll cadence, in milliseconds.
    pub poll_interval_ms: u64,
    /// Minimum body text length considered "settled".
    pub min_text_length: usize,
    /// Upper bound on scroll-to-bottom rounds for lazy-loaded content.
    pub max_scroll_rounds: usize,
    /// Fixed delay after scrolling completes, in milliseconds.
    pub settle_delay_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            content_selectors: vec![
                "article".to_string(),
                "main".to_string(),
                "#content".to_string(),
                ".content".to_string(),
            ],
            selector_timeout_ms: 2000,
            poll_interval_ms: 250,
            min_text_length: 200,
            max_scroll_rounds: 8,
            settle_delay_ms: 500,
        }
    }
}

impl ReadinessConfig {
    /// Profile for snapshots that cannot change.
    ///
    /// Polling a static snapshot can never alter the outcome, so every
    /// heuristic runs exactly once and no settle time is spent. Used by
    /// fetchers without a live DOM.
    pub fn single_pass() -> Self {
        Self {
            selector_timeout_ms: 0,
            poll_interval_ms: 0,
            max_scroll_rounds: 2,
            settle_delay_ms: 0,
            ..Default::default()
        }
    }
}

/// A live page owned by a fetcher, observable while it renders.
///
/// The readiness detector only needs two capabilities from the page: a
/// current HTML snapshot and a scroll-to-bottom probe that reports the
/// resulting scroll height.
#[async_trait]
pub trait PageSession: Send {
    /// Returns the current HTML snapshot of the page.
    async fn snapshot(&mut self) -> Result<String>;

    /// Scrolls to the bottom of the page and returns the new scroll height.
    async fn scroll_to_bottom(&mut self) -> Result<u64>;
}

/// A session over HTML that is already final.
///
/// Used by fetchers that have no live DOM to observe (plain HTTP fetches,
/// local files) and by tests. Snapshots always return the same content and
/// the scroll height never changes, so the detector converges immediately.
pub struct StaticSession {
    html: String,
}

impl StaticSession {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

#[async_trait]
impl PageSession for StaticSession {
    async fn snapshot(&mut self) -> Result<String> {
        Ok(self.html.clone())
    }

    async fn scroll_to_bottom(&mut self) -> Result<u64> {
        Ok(self.html.len() as u64)
    }
}

/// Outcome of a readiness pass.
///
/// Purely informational; the pipeline proceeds regardless of what settled
/// and what did not.
#[derive(Debug, Clone, Default)]
pub struct ReadinessReport {
    /// The first selector that matched, if any.
    pub matched_selector: Option<String>,
    /// Body text length observed in the final snapshot.
    pub text_length: usize,
    /// Number of scroll rounds performed before the height stabilized.
    pub scroll_rounds: usize,
}

/// Decides when a fetched page has settled enough to extract content.
pub struct ReadinessDetector {
    config: ReadinessConfig,
}

impl ReadinessDetector {
    pub fn new(config: ReadinessConfig) -> Self {
        Self { config }
    }

    /// Runs all readiness heuristics against the session.
    ///
    /// Never fails: selector misses, short content, and probe errors are
    /// logged at warn level and detection continues with the next heuristic.
    pub async fn wait_until_ready(&self, session: &mut dyn PageSession) -> ReadinessReport {
        let matched_selector = self.wait_for_selector(session).await;
        if matched_selector.is_none() {
            warn!("no content selector appeared; proceeding with current page state");
        }

        let text_length = self.check_text_length(session).await;
        if text_length < self.config.min_text_length {
            warn!(
                text_length,
                threshold = self.config.min_text_length,
                "page text is shorter than the settled threshold"
            );
        }

        let scroll_rounds = self.scroll_until_stable(session).await;

        if self.config.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        }

        ReadinessReport { matched_selector, text_length, scroll_rounds }
    }

    /// Polls each configured selector in sequence until one matches.
    ///
    /// Each selector gets its own timeout; the budgets are spent
    /// sequentially, not in parallel.
    async fn wait_for_selector(&self, session: &mut dyn PageSession) -> Option<String> {
        for selector_str in &self.config.content_selectors {
            let selector = match Selector::parse(selector_str) {
                Ok(sel) => sel,
                Err(e) => {
                    warn!(selector = %selector_str, "skipping invalid readiness selector: {e}");
                    continue;
                }
            };

            let deadline = tokio::time::Instant::now() + Duration::from_millis(self.config.selector_timeout_ms);
            loop {
                match session.snapshot().await {
                    Ok(html) => {
                        let doc = Html::parse_document(&html);
                        if doc.select(&selector).next().is_some() {
                            debug!(selector = %selector_str, "content selector matched");
                            return Some(selector_str.clone());
                        }
                    }
                    Err(e) => {
                        warn!(selector = %selector_str, "snapshot failed during selector poll: {e}");
                        break;
                    }
                }

                if tokio::time::Instant::now() >= deadline {
                    debug!(selector = %selector_str, "selector did not appear within its budget");
                    break;
                }
                tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
            }
        }

        None
    }

    async fn check_text_length(&self, session: &mut dyn PageSession) -> usize {
        match session.snapshot().await {
            Ok(html) => {
                let doc = Html::parse_document(&html);
                doc.root_element().text().map(|t| t.trim().chars().count()).sum()
            }
            Err(e) => {
                warn!("snapshot failed during text-length check: {e}");
                0
            }
        }
    }

    /// Scrolls to the bottom until the scroll height stops growing.
    ///
    /// Triggers scroll-activated lazy loaders; bounded by
    /// `max_scroll_rounds` so a page with an infinite feed cannot stall the
    /// conversion.
    async fn scroll_until_stable(&self, session: &mut dyn PageSession) -> usize {
        let mut previous_height = 0u64;
        let mut rounds = 0usize;

        while rounds < self.config.max_scroll_rounds {
            let height = match session.scroll_to_bottom().await {
                Ok(h) => h,
                Err(e) => {
                    warn!("scroll probe failed: {e}");
                    break;
                }
            };
            rounds += 1;

            if height == previous_height {
                break;
            }
            previous_height = height;
            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        }

        rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> ReadinessConfig {
        ReadinessConfig {
            selector_timeout_ms: 20,
            poll_interval_ms: 5,
            settle_delay_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_readiness_config_default() {
        let config = ReadinessConfig::default();
        assert_eq!(config.selector_timeout_ms, 2000);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.min_text_length, 200);
        assert_eq!(config.max_scroll_rounds, 8);
        assert_eq!(config.settle_delay_ms, 500);
        assert!(config.content_selectors.contains(&"article".to_string()));
    }

    #[test]
    fn test_single_pass_profile() {
        let config = ReadinessConfig::single_pass();
        assert_eq!(config.selector_timeout_ms, 0);
        assert_eq!(config.poll_interval_ms, 0);
        assert_eq!(config.settle_delay_ms, 0);
    }

    #[tokio::test]
    async fn test_selector_match_is_reported() {
        let detector = ReadinessDetector::new(fast_config());
        let mut session = StaticSession::new("<html><body><article><p>Hi</p></article></body></html>");

        let report = detector.wait_until_ready(&mut session).await;
        assert_eq!(report.matched_selector, Some("article".to_string()));
    }

    #[tokio::test]
    async fn test_selector_miss_is_non_fatal() {
        let detector = ReadinessDetector::new(fast_config());
        let mut session = StaticSession::new("<html><body><div>plain page</div></body></html>");

        let report = detector.wait_until_ready(&mut session).await;
        assert!(report.matched_selector.is_none());
        assert!(report.text_length > 0);
    }

    #[tokio::test]
    async fn test_scroll_stabilizes_on_static_page() {
        let detector = ReadinessDetector::new(fast_config());
        let mut session = StaticSession::new("<html><body><main>stable</main></body></html>");

        let report = detector.wait_until_ready(&mut session).await;
        assert!(report.scroll_rounds >= 1);
        assert!(report.scroll_rounds <= 2);
    }

    #[tokio::test]
    async fn test_invalid_selector_is_skipped() {
        let config = ReadinessConfig {
            content_selectors: vec!["[[broken".to_string(), "main".to_string()],
            ..fast_config()
        };
        let detector = ReadinessDetector::new(config);
        let mut session = StaticSession::new("<html><body><main>ok</main></body></html>");

        let report = detector.wait_until_ready(&mut session).await;
        assert_eq!(report.matched_selector, Some("main".to_string()));
    }
}
