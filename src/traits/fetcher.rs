//! PageFetcher trait for the enrichment web-fetch collaborator.
//!
//! Enrichment needs supplementary text for a company. Deriving candidate
//! URLs (homepage, `/about`, `/company`) and stripping markup belongs to the
//! fetcher implementation, not the pipeline: the pipeline hands over what it
//! knows about the record and receives plain text back.

use async_trait::async_trait;

use crate::error::FetchResult;

/// What the pipeline knows about a record when asking for more text.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Company name as extracted.
    pub name: String,

    /// URL of the article the record came from, if any. Fetchers may use it
    /// as a starting point for URL derivation.
    pub hint_url: Option<String>,
}

impl FetchRequest {
    /// Create a request for a company by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint_url: None,
        }
    }

    /// Attach a hint URL.
    pub fn with_hint_url(mut self, url: impl Into<String>) -> Self {
        self.hint_url = Some(url.into());
        self
    }
}

/// Fetches supplementary page text for a single record.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return plain text describing the company, or a per-record error.
    ///
    /// Errors are soft: the caller logs them and leaves the record untouched.
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String>;

    /// Fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        (**self).fetch(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
