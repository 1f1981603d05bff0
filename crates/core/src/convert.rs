//! Conversion orchestration: fetch, extract, serialize, normalize, write.
//!
//! One invocation converts one URL. The stages run strictly in sequence and
//! each stage fully consumes its input; the only shared resource is the
//! fetcher, which is closed on every exit path before the result is
//! surfaced. The output file is written last, so a failed conversion never
//! leaves a partial file behind.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::extract::extract_article;
use crate::fetch::{FetchOptions, PageFetcher};
use crate::normalize::normalize_markdown;
use crate::serialize::{MarkdownSerializer, SerializeConfig};
use crate::{PagemarkError, Result};

/// Options for a single conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Page load options (timeout, script toggling).
    pub fetch: FetchOptions,
    /// Markdown rendering options.
    pub serialize: SerializeConfig,
}

/// Fetches a page and returns the finished Markdown document.
///
/// The document is `# <title>`, a blank line, and the normalized body. The
/// fetcher is closed before this function returns, whether the pipeline
/// succeeded or not; a close failure after a successful conversion is
/// logged rather than raised.
pub async fn convert_to_markdown(
    fetcher: &mut dyn PageFetcher, url: &str, options: &ConvertOptions,
) -> Result<String> {
    let result = run_pipeline(fetcher, url, options).await;

    if let Err(close_err) = fetcher.close().await {
        warn!("failed to release fetcher resource: {close_err}");
    }

    result
}

/// Converts a page and writes the result to `output_path`.
///
/// The write happens only after the whole document has been computed.
pub async fn convert_page(
    fetcher: &mut dyn PageFetcher, url: &str, output_path: &Path, options: &ConvertOptions,
) -> Result<()> {
    let markdown = convert_to_markdown(fetcher, url, options).await?;

    info!(path = %output_path.display(), "writing output");
    fs::write(output_path, markdown)?;

    info!("conversion complete");
    Ok(())
}

async fn run_pipeline(fetcher: &mut dyn PageFetcher, url: &str, options: &ConvertOptions) -> Result<String> {
    info!(url, "loading page");
    let doc = fetcher.fetch(url, &options.fetch).await?;

    info!("extracting article content");
    let article = extract_article(&doc.html, &doc.final_url)?;

    info!(title = %article.title, "converting content to markdown");
    let serializer = MarkdownSerializer::new(options.serialize.clone());
    let body = serializer.serialize(&article.content_html);
    let body = normalize_markdown(&body);

    if body.trim().is_empty() {
        return Err(PagemarkError::NoContent);
    }

    Ok(format!("# {}\n\n{}\n", article.title, body.trim()))
}
