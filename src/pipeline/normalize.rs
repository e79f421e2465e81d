//! Source normalization: heterogeneous raw inputs → deduplicated Articles.
//!
//! Inputs are loosely typed and frequently broken; a bad row is skipped and
//! counted, never fatal. The only fatal outcome is every configured source
//! coming up empty.

use indexmap::IndexMap;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{PipelineError, Result};
use crate::types::article::{Article, Origin, RawDatasetRow, RawFeedEntry};
use crate::types::config::{NormalizeConfig, SourceCategory};
use crate::types::report::RunWarning;

/// Output of normalization: ordered articles plus skip accounting.
#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    /// First-seen order, deduplicated by fingerprint.
    pub articles: Vec<Article>,

    pub feed_skipped: usize,

    pub dataset_skipped: usize,

    pub warnings: Vec<RunWarning>,
}

/// Normalize feed entries and dataset rows into a uniform Article set.
///
/// Fails with [`PipelineError::SourceUnavailable`] only if ALL sources for
/// the run yielded nothing usable; partial availability is a warning and the
/// run proceeds with whatever was collected.
pub fn normalize(
    feed_entries: &[RawFeedEntry],
    dataset_rows: &[RawDatasetRow],
    category: SourceCategory,
    config: &NormalizeConfig,
) -> Result<NormalizeOutcome> {
    let mut by_fingerprint: IndexMap<String, Article> = IndexMap::new();
    let mut feed_skipped = 0usize;
    let mut dataset_skipped = 0usize;

    // Per-feed cap mirrors the collaborator's own limit; enforced again here
    // so an over-eager fetcher cannot flood a run.
    let mut per_feed: IndexMap<String, usize> = IndexMap::new();

    for entry in feed_entries {
        let source = entry.source.clone().unwrap_or_default();
        let taken = per_feed.entry(source.clone()).or_insert(0);
        if *taken >= config.max_entries_per_feed {
            feed_skipped += 1;
            continue;
        }

        match article_from_feed(entry, category, config) {
            Some(article) => {
                *taken += 1;
                let duplicate = by_fingerprint.contains_key(&article.id);
                if duplicate {
                    debug!(fingerprint = %article.id, "duplicate feed entry collapsed");
                } else {
                    by_fingerprint.insert(article.id.clone(), article);
                }
            }
            None => feed_skipped += 1,
        }
    }

    for row in dataset_rows {
        match article_from_dataset(row, category, config) {
            Some(article) => {
                if by_fingerprint.contains_key(&article.id) {
                    debug!(fingerprint = %article.id, "duplicate dataset row collapsed");
                } else {
                    by_fingerprint.insert(article.id.clone(), article);
                }
            }
            None => dataset_skipped += 1,
        }
    }

    let mut warnings = Vec::new();
    if feed_skipped > 0 {
        warnings.push(RunWarning::EntriesSkipped {
            origin: "feed".into(),
            count: feed_skipped,
        });
    }
    if dataset_skipped > 0 {
        warnings.push(RunWarning::EntriesSkipped {
            origin: "dataset".into(),
            count: dataset_skipped,
        });
    }

    let feed_count = by_fingerprint.values().filter(|a| a.origin == Origin::Feed).count();
    let dataset_count = by_fingerprint.len() - feed_count;

    // Partial availability: one source configured with input but yielding
    // nothing while the other delivered.
    if !feed_entries.is_empty() && feed_count == 0 && dataset_count > 0 {
        warn!("all feed entries were unusable; proceeding with dataset only");
        warnings.push(RunWarning::SourcePartial {
            origin: "feed".into(),
            detail: "no usable entries".into(),
        });
    }
    if !dataset_rows.is_empty() && dataset_count == 0 && feed_count > 0 {
        warn!("all dataset rows were unusable; proceeding with feeds only");
        warnings.push(RunWarning::SourcePartial {
            origin: "dataset".into(),
            detail: "no usable rows".into(),
        });
    }

    if by_fingerprint.is_empty() {
        return Err(PipelineError::SourceUnavailable);
    }

    info!(
        articles = by_fingerprint.len(),
        feed = feed_count,
        dataset = dataset_count,
        skipped = feed_skipped + dataset_skipped,
        "normalization complete"
    );

    Ok(NormalizeOutcome {
        articles: by_fingerprint.into_values().collect(),
        feed_skipped,
        dataset_skipped,
        warnings,
    })
}

/// Keep a URL only if it actually parses; a junk URL is worse than none
/// because enrichment would try to fetch it.
fn valid_url(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|u| Url::parse(u).is_ok())
        .unwrap_or("")
        .to_string()
}

fn article_from_feed(
    entry: &RawFeedEntry,
    category: SourceCategory,
    config: &NormalizeConfig,
) -> Option<Article> {
    let body = entry.content.as_deref().unwrap_or("").trim();
    if body.len() < config.min_body_len {
        return None;
    }

    let title = entry
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("No title");
    let source = entry.source.as_deref().unwrap_or("");

    Some(Article {
        id: Article::fingerprint(source, title, entry.published.as_ref()),
        source_category: category,
        title: title.to_string(),
        body_text: body.to_string(),
        url: valid_url(entry.url.as_deref()),
        published_at: entry.published,
        origin: Origin::Feed,
    })
}

fn article_from_dataset(
    row: &RawDatasetRow,
    category: SourceCategory,
    config: &NormalizeConfig,
) -> Option<Article> {
    let body = row.description.as_deref().unwrap_or("").trim();
    if body.len() < config.min_body_len {
        return None;
    }

    let title = row
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Unknown Startup");

    // Dataset rows have no published time; founding date stands in as the
    // fingerprint's time component so re-exports hash identically.
    let mut source = String::from("dataset");
    if let Some(founded) = row.founded.as_deref() {
        source.push('|');
        source.push_str(founded);
    }

    Some(Article {
        id: Article::fingerprint(&source, title, None),
        source_category: category,
        title: title.to_string(),
        body_text: body.to_string(),
        url: valid_url(row.website.as_deref()),
        published_at: None,
        origin: Origin::Dataset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> NormalizeConfig {
        NormalizeConfig {
            min_body_len: 10,
            max_entries_per_feed: 30,
        }
    }

    fn entry(title: &str, body: &str) -> RawFeedEntry {
        RawFeedEntry::new(title, body).with_source("https://feed.example/rss")
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let feeds = vec![entry("Acme raises", "Acme raised a seed round today."),
                         entry("Globex pivots", "Globex is now a robotics company.")];
        let rows = vec![RawDatasetRow::new("Initech", "Initech builds billing software.")];

        let a = normalize(&feeds, &rows, SourceCategory::GeneralStartups, &cfg()).unwrap();
        let b = normalize(&feeds, &rows, SourceCategory::GeneralStartups, &cfg()).unwrap();

        let ids_a: Vec<_> = a.articles.iter().map(|x| x.id.clone()).collect();
        let ids_b: Vec<_> = b.articles.iter().map(|x| x.id.clone()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(a.articles.len(), 3);
    }

    #[test]
    fn test_duplicate_entries_collapse_to_first() {
        let feeds = vec![
            entry("Acme raises", "Acme raised a seed round today."),
            entry("Acme raises", "Acme raised a seed round today."),
        ];
        let out = normalize(&feeds, &[], SourceCategory::GeneralStartups, &cfg()).unwrap();
        assert_eq!(out.articles.len(), 1);
    }

    #[test]
    fn test_bad_rows_skipped_not_fatal() {
        let feeds = vec![
            entry("Good", "This body is long enough to keep."),
            RawFeedEntry::default(), // no content at all
            entry("Thin", "short"),
        ];
        let out = normalize(&feeds, &[], SourceCategory::GeneralStartups, &cfg()).unwrap();
        assert_eq!(out.articles.len(), 1);
        assert_eq!(out.feed_skipped, 2);
        assert!(matches!(
            out.warnings[0],
            RunWarning::EntriesSkipped { count: 2, .. }
        ));
    }

    #[test]
    fn test_all_sources_empty_is_fatal() {
        let err = normalize(&[], &[], SourceCategory::GeneralStartups, &cfg()).unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable));
    }

    #[test]
    fn test_partial_availability_is_warning() {
        let feeds = vec![RawFeedEntry::default()];
        let rows = vec![RawDatasetRow::new("Initech", "Initech builds billing software.")];
        let out = normalize(&feeds, &rows, SourceCategory::GeneralStartups, &cfg()).unwrap();
        assert_eq!(out.articles.len(), 1);
        assert!(out
            .warnings
            .iter()
            .any(|w| matches!(w, RunWarning::SourcePartial { .. })));
    }

    #[test]
    fn test_per_feed_cap_enforced() {
        let mut feeds = Vec::new();
        for i in 0..5 {
            feeds.push(entry(&format!("Story {i}"), "A body long enough to keep around."));
        }
        let tight = NormalizeConfig {
            min_body_len: 10,
            max_entries_per_feed: 3,
        };
        let out = normalize(&feeds, &[], SourceCategory::GeneralStartups, &tight).unwrap();
        assert_eq!(out.articles.len(), 3);
        assert_eq!(out.feed_skipped, 2);
    }

    #[test]
    fn test_junk_urls_dropped() {
        let feeds = vec![
            entry("Good link", "Body long enough to keep this entry.").with_url("https://example.com/a"),
            entry("Bad link", "Body long enough to keep this entry too.").with_url("not a url"),
        ];
        let out = normalize(&feeds, &[], SourceCategory::GeneralStartups, &cfg()).unwrap();
        assert_eq!(out.articles[0].url, "https://example.com/a");
        assert_eq!(out.articles[1].url, "");
    }

    #[test]
    fn test_feed_and_dataset_same_company_stay_distinct() {
        let feeds = vec![entry("Acme", "Acme raised a seed round this morning.")];
        let rows = vec![RawDatasetRow::new("Acme", "Acme raised a seed round this morning.")];
        let out = normalize(&feeds, &rows, SourceCategory::GeneralStartups, &cfg()).unwrap();
        // Fingerprint is raw-content based, not semantic.
        assert_eq!(out.articles.len(), 2);
    }
}
