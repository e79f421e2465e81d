//! Batched structured extraction against the local LLM service.
//!
//! The resilience contract: a failed batch (timeout, unreachable service,
//! unsalvageable output) is recorded and costs at most `batch_size` articles;
//! every other batch still runs. Batches may execute concurrently, but the
//! final record sequence is rebuilt in batch order so output is deterministic
//! regardless of completion order.

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::InferenceError;
use crate::pipeline::prompts::{format_extract_prompt, parse_extract_response, RawStartupItem};
use crate::traits::inference::Inference;
use crate::types::article::Article;
use crate::types::config::ExtractConfig;
use crate::types::record::{AttributeConfidence, Category, StartupRecord};
use crate::types::report::BatchFailure;

/// Output of the extraction stage.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    /// Deduplicated records in batch-then-item order.
    pub records: Vec<StartupRecord>,

    /// One entry per failed batch, in batch order.
    pub failed_batches: Vec<BatchFailure>,
}

impl ExtractOutcome {
    /// True when every batch produced a parseable response.
    pub fn is_complete(&self) -> bool {
        self.failed_batches.is_empty()
    }
}

/// Extract structured startup records from relevant articles.
///
/// Articles are partitioned into fixed-size batches preserving order (the
/// last batch may be short). Each batch is one inference call, bounded by
/// the configured timeout.
pub async fn extract_startups<I: Inference>(
    articles: &[Article],
    topic: &str,
    config: &ExtractConfig,
    inference: &I,
) -> ExtractOutcome {
    if articles.is_empty() {
        return ExtractOutcome {
            records: Vec::new(),
            failed_batches: Vec::new(),
        };
    }

    let batches: Vec<&[Article]> = articles.chunks(config.batch_size.max(1)).collect();
    let total_batches = batches.len();
    info!(
        articles = articles.len(),
        batches = total_batches,
        batch_size = config.batch_size,
        model = inference.model(),
        "starting batched extraction"
    );

    // Batches are independent; run them with bounded concurrency and key
    // every result by batch index so aggregation order is deterministic.
    let results: Vec<(usize, Result<Vec<RawStartupItem>, InferenceError>)> =
        stream::iter(batches.iter().enumerate().map(|(index, batch)| {
            let prompt = format_extract_prompt(topic, batch, config.max_body_chars);
            async move {
                let result = run_batch(inference, &prompt, config).await;
                (index, result)
            }
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    let mut by_index: Vec<Option<Result<Vec<RawStartupItem>, InferenceError>>> =
        (0..total_batches).map(|_| None).collect();
    for (index, result) in results {
        by_index[index] = Some(result);
    }

    let mut dedup: IndexMap<String, StartupRecord> = IndexMap::new();
    let mut failed_batches = Vec::new();

    for (index, (slot, batch)) in by_index.into_iter().zip(batches.iter()).enumerate() {
        match slot {
            Some(Ok(items)) => {
                if items.len() < batch.len() {
                    // Unmatched trailing articles are dropped, not retried;
                    // completeness is best effort per batch.
                    debug!(
                        batch = index,
                        expected = batch.len(),
                        got = items.len(),
                        "batch returned fewer items than articles"
                    );
                }
                let mut kept = 0usize;
                for (item, article) in items.into_iter().zip(batch.iter()) {
                    if let Some(record) = record_from_item(item, article) {
                        kept += 1;
                        let key = StartupRecord::normalize_name(&record.name);
                        // First occurrence wins; later duplicates discarded.
                        dedup.entry(key).or_insert(record);
                    }
                }
                debug!(batch = index, kept, "batch extracted");
            }
            Some(Err(error)) => {
                warn!(batch = index, %error, "extraction batch failed");
                failed_batches.push(BatchFailure {
                    batch_index: index,
                    article_count: batch.len(),
                    error: error.to_string(),
                });
            }
            // Unreachable: every index is written exactly once above.
            None => {
                failed_batches.push(BatchFailure {
                    batch_index: index,
                    article_count: batch.len(),
                    error: "batch result missing".into(),
                });
            }
        }
    }

    info!(
        records = dedup.len(),
        failed = failed_batches.len(),
        total_batches,
        "extraction complete"
    );

    ExtractOutcome {
        records: dedup.into_values().collect(),
        failed_batches,
    }
}

async fn run_batch<I: Inference>(
    inference: &I,
    prompt: &str,
    config: &ExtractConfig,
) -> Result<Vec<RawStartupItem>, InferenceError> {
    let response = match timeout(config.timeout(), inference.complete(prompt)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(InferenceError::Timeout {
                seconds: config.timeout_secs,
            })
        }
    };
    parse_extract_response(&response)
}

/// Clean one raw item into a record; items without a usable name are dropped.
fn record_from_item(item: RawStartupItem, article: &Article) -> Option<StartupRecord> {
    let name = item.name.trim();
    if name.is_empty() {
        return None;
    }

    let description = item.description.trim().to_string();
    let country = Some(item.country.trim().to_string()).filter(|c| !c.is_empty());
    let category = Category::parse(&item.category);

    let confidence = AttributeConfidence {
        description: (!description.is_empty()).then_some(1.0),
        country: country.is_some().then_some(1.0),
        category: (category != Category::Unknown).then_some(1.0),
    };

    Some(StartupRecord {
        id: StartupRecord::derive_id(name),
        name: name.to_string(),
        description,
        country,
        category,
        source_article_id: article.id.clone(),
        confidence,
        enriched: false,
        cluster_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockInference;
    use crate::types::article::Origin;
    use crate::types::config::SourceCategory;

    fn article(id: &str, title: &str) -> Article {
        Article {
            id: id.to_string(),
            source_category: SourceCategory::GeneralStartups,
            title: title.to_string(),
            body_text: format!("{title} raised money."),
            url: String::new(),
            published_at: None,
            origin: Origin::Feed,
        }
    }

    fn articles(n: usize) -> Vec<Article> {
        (0..n).map(|i| article(&format!("a{i}"), &format!("Startup{i}"))).collect()
    }

    fn item_json(name: &str) -> String {
        format!(r#"{{"name":"{name}","description":"builds things","country":"DE","category":"saas"}}"#)
    }

    #[tokio::test]
    async fn test_batches_preserve_order_and_size() {
        // 8 articles, batch size 5 -> batches of 5 and 3.
        let inference = MockInference::new()
            .with_response(format!("[{}]", (0..5).map(|i| item_json(&format!("A{i}"))).collect::<Vec<_>>().join(",")))
            .with_response(format!("[{}]", (5..8).map(|i| item_json(&format!("A{i}"))).collect::<Vec<_>>().join(",")));

        let out = extract_startups(&articles(8), "t", &ExtractConfig::default(), &inference).await;
        assert!(out.is_complete());
        assert_eq!(out.records.len(), 8);
        let names: Vec<_> = out.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names[0], "A0");
        assert_eq!(names[7], "A7");
    }

    #[tokio::test]
    async fn test_batch_failure_is_isolated() {
        let inference = MockInference::new()
            .with_response(format!("[{}]", (0..5).map(|i| item_json(&format!("A{i}"))).collect::<Vec<_>>().join(",")))
            .with_failure(InferenceError::Unavailable("connection refused".into()));

        let out = extract_startups(&articles(8), "t", &ExtractConfig::default(), &inference).await;
        assert_eq!(out.records.len(), 5);
        assert_eq!(out.failed_batches.len(), 1);
        assert_eq!(out.failed_batches[0].batch_index, 1);
        assert_eq!(out.failed_batches[0].article_count, 3);
    }

    #[tokio::test]
    async fn test_malformed_response_fails_batch() {
        let inference = MockInference::new().with_response("no json here at all");
        let out = extract_startups(&articles(2), "t", &ExtractConfig::default(), &inference).await;
        assert!(out.records.is_empty());
        assert_eq!(out.failed_batches.len(), 1);
        assert!(out.failed_batches[0].error.contains("no JSON array"));
    }

    #[tokio::test]
    async fn test_short_response_drops_unmatched_tail() {
        // 3 articles but only 2 items back.
        let inference = MockInference::new()
            .with_response(format!("[{},{}]", item_json("A"), item_json("B")));
        let cfg = ExtractConfig::default().with_batch_size(5);
        let out = extract_startups(&articles(3), "t", &cfg, &inference).await;
        assert!(out.is_complete());
        assert_eq!(out.records.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_names_dropped() {
        let inference = MockInference::new().with_response(
            r#"[{"name":"","description":"x"},{"name":"Real","description":"y"}]"#.to_string(),
        );
        let out = extract_startups(&articles(2), "t", &ExtractConfig::default(), &inference).await;
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].name, "Real");
    }

    #[tokio::test]
    async fn test_dedup_by_normalized_name_keeps_first() {
        let inference = MockInference::new().with_response(
            r#"[{"name":"Acme Inc","description":"first"},{"name":"acme inc.","description":"second"}]"#
                .to_string(),
        );
        let out = extract_startups(&articles(2), "t", &ExtractConfig::default(), &inference).await;
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].description, "first");
    }

    #[tokio::test]
    async fn test_concurrent_batches_keep_deterministic_order() {
        // Force all three batches in flight at once; responses are scripted
        // per batch index so completion order cannot matter.
        let inference = MockInference::new()
            .with_response(format!("[{}]", item_json("First")))
            .with_response(format!("[{}]", item_json("Second")))
            .with_response(format!("[{}]", item_json("Third")));
        let cfg = ExtractConfig::default().with_batch_size(1).with_concurrency(3);

        let out = extract_startups(&articles(3), "t", &cfg, &inference).await;
        let names: Vec<_> = out.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_no_articles_short_circuits() {
        let inference = MockInference::new();
        let out = extract_startups(&[], "t", &ExtractConfig::default(), &inference).await;
        assert!(out.records.is_empty());
        assert!(inference.calls().is_empty());
    }
}
