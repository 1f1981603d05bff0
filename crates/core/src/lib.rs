pub mod error;
pub mod extract;
pub mod normalize;
pub mod serialize;

#[cfg(feature = "fetch")]
pub mod convert;
#[cfg(feature = "fetch")]
pub mod fetch;
#[cfg(feature = "fetch")]
pub mod readiness;

#[cfg(feature = "fetch")]
pub use convert::{ConvertOptions, convert_page, convert_to_markdown};
pub use error::{PagemarkError, Result};
pub use extract::{ExtractedArticle, extract_article};
#[cfg(feature = "fetch")]
pub use fetch::{BrowserConfig, FetchOptions, FileFetcher, HttpFetcher, PageFetcher, RenderedDocument, StaticFetcher};
pub use normalize::normalize_markdown;
#[cfg(feature = "fetch")]
pub use readiness::{PageSession, ReadinessConfig, ReadinessDetector, ReadinessReport, StaticSession};
pub use serialize::{MarkdownSerializer, SerializeConfig};
