//! Optional enrichment: fill missing record fields from supplementary text.
//!
//! Disabled is the hot path and costs nothing. When enabled, each record
//! with gaps gets one bounded fetch plus one narrow re-extraction; a failure
//! at any point leaves that record exactly as it was. Records never share
//! state, so per-record work runs concurrently and is re-collected by index.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{FetchError, InferenceError};
use crate::pipeline::prompts::{format_enrich_prompt, parse_enrich_response};
use crate::traits::fetcher::{FetchRequest, PageFetcher};
use crate::traits::inference::Inference;
use crate::types::article::Article;
use crate::types::config::EnrichConfig;
use crate::types::record::{Category, StartupRecord};
use crate::types::report::RunWarning;

/// Output of the enrichment stage.
#[derive(Debug, Clone)]
pub struct EnrichOutcome {
    /// All records, same order as the input; enriched in place where possible.
    pub records: Vec<StartupRecord>,

    /// Records that actually gained at least one field.
    pub enriched_count: usize,

    pub warnings: Vec<RunWarning>,
}

/// Enrich records with missing fields. Pass-through when disabled.
pub async fn enrich_records<F, I>(
    records: Vec<StartupRecord>,
    articles: &[Article],
    config: &EnrichConfig,
    fetcher: &F,
    inference: &I,
) -> EnrichOutcome
where
    F: PageFetcher,
    I: Inference,
{
    if !config.enabled {
        return EnrichOutcome {
            records,
            enriched_count: 0,
            warnings: Vec::new(),
        };
    }

    let hint_urls: HashMap<&str, &str> = articles
        .iter()
        .filter(|a| !a.url.is_empty())
        .map(|a| (a.id.as_str(), a.url.as_str()))
        .collect();

    let total = records.len();
    info!(records = total, fetcher = fetcher.name(), "starting enrichment");

    let results: Vec<(usize, StartupRecord, Option<RunWarning>)> =
        stream::iter(records.into_iter().enumerate().map(|(index, record)| {
            let hint = hint_urls.get(record.source_article_id.as_str()).map(|u| u.to_string());
            async move {
                let (record, warning) = enrich_one(record, hint, config, fetcher, inference).await;
                (index, record, warning)
            }
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    // Re-key by original index so both records and warnings come out in
    // input order, independent of completion order.
    let mut slots: Vec<Option<(StartupRecord, Option<RunWarning>)>> =
        (0..total).map(|_| None).collect();
    for (index, record, warning) in results {
        slots[index] = Some((record, warning));
    }

    let mut records = Vec::with_capacity(total);
    let mut warnings = Vec::new();
    for (record, warning) in slots.into_iter().flatten() {
        records.push(record);
        if let Some(w) = warning {
            warnings.push(w);
        }
    }
    let enriched_count = records.iter().filter(|r| r.enriched).count();

    info!(enriched = enriched_count, failed = warnings.len(), total, "enrichment complete");

    EnrichOutcome {
        records,
        enriched_count,
        warnings,
    }
}

/// Which fields a record is still missing.
fn missing_fields(record: &StartupRecord, config: &EnrichConfig) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if record.has_thin_description(config.thin_description_len) {
        fields.push("description");
    }
    if record.country.is_none() {
        fields.push("country");
    }
    if record.category == Category::Unknown {
        fields.push("category");
    }
    fields
}

async fn enrich_one<F, I>(
    mut record: StartupRecord,
    hint_url: Option<String>,
    config: &EnrichConfig,
    fetcher: &F,
    inference: &I,
) -> (StartupRecord, Option<RunWarning>)
where
    F: PageFetcher,
    I: Inference,
{
    let fields = missing_fields(&record, config);
    if fields.is_empty() {
        debug!(record = %record.name, "record already complete, skipping");
        return (record, None);
    }

    let mut request = FetchRequest::new(record.name.clone());
    if let Some(url) = hint_url {
        request = request.with_hint_url(url);
    }

    let page_text = match timeout(config.fetch_timeout(), fetcher.fetch(&request)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => text,
        Ok(Ok(_)) => {
            return soft_failure(record, FetchError::EmptyBody {
                url: request.hint_url.unwrap_or_default(),
            }
            .to_string())
        }
        Ok(Err(e)) => return soft_failure(record, e.to_string()),
        Err(_) => {
            return soft_failure(record, FetchError::Timeout {
                seconds: config.fetch_timeout_secs,
            }
            .to_string())
        }
    };

    let prompt = format_enrich_prompt(&record.name, &fields, &page_text);
    let response = match timeout(config.inference_timeout(), inference.complete(&prompt)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return soft_failure(record, e.to_string()),
        Err(_) => {
            return soft_failure(record, InferenceError::Timeout {
                seconds: config.inference_timeout_secs,
            }
            .to_string())
        }
    };

    let item = match parse_enrich_response(&response) {
        Ok(item) => item,
        Err(e) => return soft_failure(record, e.to_string()),
    };

    // Fill-empty-only merge; populated fields are never overwritten. The
    // merge is all-or-nothing per field, so a record is either merged or
    // left exactly as it was.
    let category = Some(Category::parse(&item.category)).filter(|c| *c != Category::Unknown);
    let changed = record.merge_missing(
        Some(&item.description),
        Some(&item.country),
        category,
        config.fill_confidence,
        config.thin_description_len,
    );

    if changed {
        debug!(record = %record.name, "record enriched");
    }
    (record, None)
}

fn soft_failure(record: StartupRecord, detail: String) -> (StartupRecord, Option<RunWarning>) {
    warn!(record = %record.name, %detail, "enrichment failed, passing record through");
    let warning = RunWarning::EnrichmentFailed {
        record_id: record.id.clone(),
        detail,
    };
    (record, Some(warning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, MockInference};
    use crate::types::record::AttributeConfidence;

    fn record(name: &str, description: &str, country: Option<&str>) -> StartupRecord {
        StartupRecord {
            id: StartupRecord::derive_id(name),
            name: name.to_string(),
            description: description.to_string(),
            country: country.map(String::from),
            category: Category::Unknown,
            source_article_id: "a1".into(),
            confidence: AttributeConfidence::default(),
            enriched: false,
            cluster_id: None,
        }
    }

    #[tokio::test]
    async fn test_disabled_is_pass_through() {
        let records = vec![record("Acme", "", None)];
        let fetcher = MockFetcher::new();
        let inference = MockInference::new();

        let out = enrich_records(records.clone(), &[], &EnrichConfig::default(), &fetcher, &inference)
            .await;

        assert_eq!(out.enriched_count, 0);
        assert_eq!(out.records[0].description, records[0].description);
        assert!(fetcher.calls().is_empty());
        assert!(inference.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fills_missing_fields_only() {
        let records = vec![record("Acme", "", Some("Germany"))];
        let fetcher = MockFetcher::new().with_page("Acme", "Acme builds invoicing software.");
        let inference = MockInference::new().with_response(
            r#"{"description":"Acme builds invoicing software for SMEs.","country":"France","category":"saas"}"#
                .to_string(),
        );

        let out = enrich_records(records, &[], &EnrichConfig::enabled(), &fetcher, &inference).await;

        assert_eq!(out.enriched_count, 1);
        let r = &out.records[0];
        assert!(r.description.contains("invoicing"));
        // Country was already set; the model's answer must not win.
        assert_eq!(r.country.as_deref(), Some("Germany"));
        assert_eq!(r.category, Category::Saas);
        assert!(r.enriched);
    }

    #[tokio::test]
    async fn test_complete_record_skipped() {
        let mut r = record("Acme", &"x".repeat(150), Some("Germany"));
        r.category = Category::Fintech;
        let fetcher = MockFetcher::new();
        let inference = MockInference::new();

        let out = enrich_records(vec![r], &[], &EnrichConfig::enabled(), &fetcher, &inference).await;

        assert_eq!(out.enriched_count, 0);
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_record_untouched() {
        let records = vec![record("Acme", "thin", None)];
        let original = records[0].clone();
        let fetcher = MockFetcher::new().failing("Acme");
        let inference = MockInference::new();

        let out = enrich_records(records, &[], &EnrichConfig::enabled(), &fetcher, &inference).await;

        assert_eq!(out.enriched_count, 0);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.records[0].description, original.description);
        assert_eq!(out.records[0].country, original.country);
        assert!(!out.records[0].enriched);
    }

    #[tokio::test]
    async fn test_malformed_reextraction_is_soft_failure() {
        let records = vec![record("Acme", "", None)];
        let fetcher = MockFetcher::new().with_page("Acme", "Some page text about Acme.");
        let inference = MockInference::new().with_response("sorry, no data");

        let out = enrich_records(records, &[], &EnrichConfig::enabled(), &fetcher, &inference).await;

        assert_eq!(out.enriched_count, 0);
        assert!(matches!(
            out.warnings[0],
            RunWarning::EnrichmentFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_warnings_follow_record_order() {
        let records: Vec<_> = (0..6).map(|i| record(&format!("Co{i}"), "", None)).collect();
        let expected_ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        let mut fetcher = MockFetcher::new();
        for i in 0..6 {
            fetcher = fetcher.failing(&format!("Co{i}"));
        }
        let inference = MockInference::new();

        let out = enrich_records(records, &[], &EnrichConfig::enabled(), &fetcher, &inference).await;

        let warned_ids: Vec<_> = out
            .warnings
            .iter()
            .filter_map(|w| match w {
                RunWarning::EnrichmentFailed { record_id, .. } => Some(record_id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(warned_ids, expected_ids);
    }

    #[tokio::test]
    async fn test_order_preserved_under_concurrency() {
        let records: Vec<_> = (0..6).map(|i| record(&format!("Co{i}"), "", None)).collect();
        let mut fetcher = MockFetcher::new();
        for i in 0..6 {
            fetcher = fetcher.with_page(&format!("Co{i}"), "Page text long enough to use.");
        }
        let inference = MockInference::new().with_default_response(
            r#"{"description":"A filled-in description that is certainly long enough to count.","country":"","category":""}"#,
        );

        let out = enrich_records(records, &[], &EnrichConfig::enabled(), &fetcher, &inference).await;

        let names: Vec<_> = out.records.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, (0..6).map(|i| format!("Co{i}")).collect::<Vec<_>>());
    }
}
