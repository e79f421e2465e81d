//! Articles and the loosely-typed source records they are built from.
//!
//! Feed entries and dataset rows arrive with fields missing, misnamed, or
//! empty; [`RawFeedEntry`] and [`RawDatasetRow`] model that looseness with
//! `Option` everywhere so one bad row never fails a batch. Normalization
//! turns them into [`Article`]s, which are immutable from then on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::config::SourceCategory;

/// Where an article came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// An RSS/Atom feed entry.
    Feed,
    /// A row from a structured startup dataset.
    Dataset,
}

/// A raw feed entry as supplied by the feed-fetch collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeedEntry {
    #[serde(default)]
    pub title: Option<String>,

    /// Entry link.
    #[serde(default)]
    pub url: Option<String>,

    /// Summary or description text.
    #[serde(default)]
    pub content: Option<String>,

    /// Published (or updated) timestamp, if the feed carried one.
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,

    /// Feed URL the entry came from.
    #[serde(default)]
    pub source: Option<String>,
}

impl RawFeedEntry {
    /// Create an entry with title and content (the common test path).
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Set the entry URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the source feed URL.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the published timestamp.
    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }
}

/// A raw row from a startup dataset (name/description shaped).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDatasetRow {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Company website.
    #[serde(default)]
    pub website: Option<String>,

    /// Founding date or similar, as free text in most datasets.
    #[serde(default)]
    pub founded: Option<String>,
}

impl RawDatasetRow {
    /// Create a row with name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Set the website.
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }
}

/// A normalized unit of raw source text, deduplicated by fingerprint.
///
/// Created by normalization, immutable thereafter; later stages read it but
/// never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Content fingerprint; unique within a run.
    pub id: String,

    /// Feed category the run was scoped to.
    pub source_category: SourceCategory,

    pub title: String,

    pub body_text: String,

    pub url: String,

    pub published_at: Option<DateTime<Utc>>,

    pub origin: Origin,
}

impl Article {
    /// Compute the dedup fingerprint for fingerprint-determining fields.
    ///
    /// The fingerprint hashes raw content only (source + title + published
    /// time), so a feed article and a dataset row describing the same company
    /// stay distinct articles.
    pub fn fingerprint(source: &str, title: &str, published: Option<&DateTime<Utc>>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update(b"|");
        hasher.update(title.as_bytes());
        hasher.update(b"|");
        if let Some(ts) = published {
            hasher.update(ts.to_rfc3339().as_bytes());
        }
        let digest = hasher.finalize();
        // First 16 hex chars are plenty for run-scoped uniqueness.
        hex_prefix(&digest, 16)
    }

    /// Text used for relevance scoring and extraction prompts.
    pub fn text(&self) -> String {
        format!("{}\n{}", self.title, self.body_text)
    }

    /// Whether the article carries any body text.
    pub fn has_body(&self) -> bool {
        !self.body_text.trim().is_empty()
    }
}

/// Lowercase hex of the first `chars / 2` bytes of a digest.
pub(crate) fn hex_prefix(digest: &[u8], chars: usize) -> String {
    digest
        .iter()
        .take(chars / 2)
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let a = Article::fingerprint("https://feed.example", "Acme raises $5M", Some(&ts));
        let b = Article::fingerprint("https://feed.example", "Acme raises $5M", Some(&ts));
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_fingerprint_varies_by_field() {
        let base = Article::fingerprint("src", "title", None);
        assert_ne!(base, Article::fingerprint("other", "title", None));
        assert_ne!(base, Article::fingerprint("src", "other", None));
    }

    #[test]
    fn test_raw_entry_builder() {
        let entry = RawFeedEntry::new("Title", "Body")
            .with_url("https://example.com/a")
            .with_source("https://example.com/feed");
        assert_eq!(entry.title.as_deref(), Some("Title"));
        assert_eq!(entry.source.as_deref(), Some("https://example.com/feed"));
    }
}
