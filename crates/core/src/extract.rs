//! Content extraction: locating the primary readable region of a page and
//! stripping boilerplate from it.
//!
//! Extraction is deliberately selector-driven rather than score-driven: a
//! fixed priority list of region selectors is walked in order and the first
//! match wins, falling back to the document body when nothing matches. This
//! trades generality for predictability on the documentation-style pages the
//! tool targets.

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::{PagemarkError, Result};

/// Content-region candidates, tried in order; first match wins.
///
/// Most specific first: a known docs content class, then the semantic
/// `article` and `main` tags, then a generic content class.
const REGION_SELECTORS: &[&str] = &["div.markdown-body", "article", "main", ".content"];

/// Elements deleted from the extracted region before serialization.
///
/// Each selector is applied as an independent query, so the order of this
/// list does not affect the result.
const BOILERPLATE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "nav",
    "aside",
    "footer",
    ".sidebar",
    ".side-nav",
    ".toc",
    ".table-of-contents",
    ".breadcrumb",
    ".breadcrumbs",
    ".edit-link",
    ".edit-this-page",
    ".advertisement",
    ".ad-container",
    ".ads",
    ".comments",
    "#comments",
    ".comment-section",
    ".pagination",
];

/// The result of content extraction.
#[derive(Debug, Clone)]
pub struct ExtractedArticle {
    /// Resolved page title.
    pub title: String,
    /// Cleaned HTML of the content region. Never empty when extraction
    /// succeeds.
    pub content_html: String,
}

/// Extracts the title and primary content region from a rendered page.
///
/// `base_url` scopes the document for any downstream resolution of relative
/// references; it is informational here since links and images are emitted
/// verbatim.
///
/// # Errors
///
/// Returns [`PagemarkError::NoContent`] when neither a recognized content
/// region nor a non-empty body exists, or when boilerplate removal leaves
/// nothing behind.
pub fn extract_article(html: &str, base_url: &str) -> Result<ExtractedArticle> {
    if Url::parse(base_url).is_err() {
        debug!(base_url, "source is not an absolute URL; relative references stay as-is");
    }

    let doc = Html::parse_document(html);

    let title = resolve_title(&doc);
    let region_html = select_region(&doc)?;

    // The title is re-emitted as the document header, so the leading h1
    // would otherwise appear twice in the output.
    let content_html = remove_boilerplate(&region_html);
    let content_html = remove_leading_h1(&content_html);
    if content_html.trim().is_empty() {
        return Err(PagemarkError::NoContent);
    }

    Ok(ExtractedArticle { title, content_html })
}

/// Resolves the page title: `<title>` text, then the first `<h1>`, then
/// the literal fallback "Untitled".
fn resolve_title(doc: &Html) -> String {
    if let Ok(selector) = Selector::parse("title")
        && let Some(el) = doc.select(&selector).next()
    {
        let text = el.text().collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }

    if let Ok(selector) = Selector::parse("h1")
        && let Some(el) = doc.select(&selector).next()
    {
        let text = el.text().collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }

    "Untitled".to_string()
}

/// Walks the region priority list and returns the inner HTML of the first
/// match, falling back to the document body.
///
/// Only the first selector that yields any match is used, regardless of the
/// size of what it matched; there is no scoring or ranking.
fn select_region(doc: &Html) -> Result<String> {
    for selector_str in REGION_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(region) = doc.select(&selector).next() {
            debug!(selector = %selector_str, "content region matched");
            return Ok(region.inner_html());
        }
    }

    warn!("no content region matched; falling back to document body");

    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next().map(|el| el.inner_html()));

    match body {
        Some(inner) if !inner.trim().is_empty() => Ok(inner),
        _ => Err(PagemarkError::NoContent),
    }
}

/// Removes every boilerplate selector from a copy of the region HTML.
///
/// Operates on the serialized region rather than the live document, so the
/// source tree is never mutated.
fn remove_boilerplate(html: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: BOILERPLATE_SELECTORS
                .iter()
                .map(|sel| {
                    lol_html::element!(*sel, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
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

    output
}

/// Removes the first `h1` element from the region HTML.
///
/// Later headings, including further `h1` elements, are kept.
fn remove_leading_h1(html: &str) -> String {
    let mut removed = false;
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("h1", |el| {
                if !removed {
                    el.remove();
                    removed = true;
                }
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

    output
}
