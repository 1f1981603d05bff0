//! Error types for pagemark operations.
//!
//! This module defines the main error type [`PagemarkError`] which represents
//! all possible errors that can occur while fetching a page, extracting its
//! content, and serializing the result to Markdown.
//!
//! # Example
//!
//! ```rust
//! use pagemark_core::{PagemarkError, Result};
//!
//! fn check_region(html: &str) -> Result<()> {
//!     if html.trim().is_empty() {
//!         return Err(PagemarkError::NoContent);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for page conversion operations.
///
/// This enum represents all possible errors that can occur during page
/// fetching, content extraction, Markdown serialization, and output writing.
///
/// Readiness-detection misses (a wait selector that never appears, a scroll
/// probe that fails) are deliberately *not* represented here: those are
/// logged and the pipeline proceeds with whatever content is present.
#[derive(Error, Debug)]
pub enum PagemarkError {
    /// Page navigation failed.
    ///
    /// Returned when the target URL could not be loaded for a reason other
    /// than a timeout (DNS failure, connection refused, non-success status).
    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// Page load timed out.
    ///
    /// Returned when navigation exceeds the configured end-to-end timeout.
    #[error("Page load timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or is missing a scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP transport errors from reqwest.
    ///
    /// This variant is only available when the `fetch` feature is enabled.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTML parsing errors.
    ///
    /// Returned when HTML cannot be parsed, usually due to an invalid
    /// CSS selector rather than malformed markup (the parser itself is
    /// error-recovering).
    #[error("Failed to parse HTML: {0}")]
    HtmlParse(String),

    /// No content could be extracted from the document.
    ///
    /// Returned when neither a recognized content region nor a usable body
    /// exists, or when boilerplate removal leaves nothing behind.
    #[error("No content region or body element found in document")]
    NoContent,

    /// Markdown serialization encountered a malformed DOM.
    ///
    /// Not expected in normal operation; treated as fatal if raised.
    #[error("Markdown serialization failed: {0}")]
    Serialization(String),

    /// Input file not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Output write errors.
    ///
    /// Wraps standard I/O errors for the final file write.
    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

/// Result type alias for PagemarkError.
///
/// This is a convenience alias for `std::result::Result<T, PagemarkError>`.
pub type Result<T> = std::result::Result<T, PagemarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PagemarkError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_navigation_error() {
        let err = PagemarkError::Navigation {
            url: "https://example.com".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("example.com"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_timeout_error() {
        let err = PagemarkError::Timeout { timeout_ms: 30000 };
        assert!(err.to_string().contains("30000"));
    }

    #[test]
    fn test_no_content_error() {
        let err = PagemarkError::NoContent;
        assert!(err.to_string().contains("content region"));
    }
}
