//! The run orchestrator: sources in, one report out.
//!
//! Stages run strictly in sequence; concurrency lives inside the stages.
//! Cancellation is checked between stages only, so an in-flight batch is
//! never torn down halfway. Everything a run learns ends up in the
//! [`RunReport`], including what went wrong.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cluster;
use crate::error::{PipelineError, Result};
use crate::pipeline::enrich::enrich_records;
use crate::pipeline::extract::extract_startups;
use crate::pipeline::normalize::normalize;
use crate::pipeline::relevance::filter_relevant;
use crate::traits::fetcher::PageFetcher;
use crate::traits::inference::Inference;
use crate::types::article::{RawDatasetRow, RawFeedEntry};
use crate::types::config::RunConfig;
use crate::types::report::{RunReport, RunStatus, RunWarning};

/// Raw input for one run, already collected by the source collaborators.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    pub feed_entries: Vec<RawFeedEntry>,
    pub dataset_rows: Vec<RawDatasetRow>,
}

impl SourceSet {
    /// A source set of feed entries only.
    pub fn from_feeds(feed_entries: Vec<RawFeedEntry>) -> Self {
        Self {
            feed_entries,
            dataset_rows: Vec::new(),
        }
    }

    /// Attach dataset rows.
    pub fn with_dataset(mut self, dataset_rows: Vec<RawDatasetRow>) -> Self {
        self.dataset_rows = dataset_rows;
        self
    }
}

/// The discovery pipeline, generic over its two external collaborators.
pub struct Pipeline<I, F> {
    inference: I,
    fetcher: F,
}

impl<I, F> Pipeline<I, F>
where
    I: Inference,
    F: PageFetcher,
{
    pub fn new(inference: I, fetcher: F) -> Self {
        Self { inference, fetcher }
    }

    /// Execute one full discovery run.
    ///
    /// Fatal errors are invalid configuration and cancellation; everything
    /// else degrades into warnings on the report. Empty sources are not an
    /// error: they produce a [`RunStatus::NoData`] report.
    pub async fn run(
        &self,
        config: &RunConfig,
        sources: SourceSet,
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        config.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, topic = %config.topic, category = %config.category, "starting discovery run");

        self.checkpoint(cancel)?;

        // Stage 1: normalize. All-sources-empty ends the run early but is
        // still a reportable outcome, not an error.
        let normalized = match normalize(
            &sources.feed_entries,
            &sources.dataset_rows,
            config.category,
            &config.normalize,
        ) {
            Ok(outcome) => outcome,
            Err(PipelineError::SourceUnavailable) => {
                warn!(%run_id, "no usable input from any source");
                return Ok(empty_report(run_id, config, started_at, RunStatus::NoData));
            }
            Err(e) => return Err(e),
        };
        let mut warnings = normalized.warnings;
        let articles = normalized.articles;

        self.checkpoint(cancel)?;

        // Stage 2: relevance pre-filter.
        let filtered = filter_relevant(articles.clone(), &config.topic, &config.relevance);

        self.checkpoint(cancel)?;

        // Stage 3: batched extraction.
        let extracted =
            extract_startups(&filtered.relevant, &config.topic, &config.extract, &self.inference)
                .await;
        for failure in &extracted.failed_batches {
            warnings.push(RunWarning::BatchFailed {
                batch_index: failure.batch_index,
                detail: failure.error.clone(),
            });
        }

        self.checkpoint(cancel)?;

        if extracted.records.is_empty() {
            info!(%run_id, articles = articles.len(), "no startup records extracted");
            let mut report =
                empty_report(run_id, config, started_at, RunStatus::NothingMatched);
            report.articles = articles;
            report.rejected_count = filtered.rejected_count;
            report.failed_batches = extracted.failed_batches;
            report.warnings = warnings;
            return Ok(report);
        }

        // Stage 4: optional enrichment.
        let enriched = enrich_records(
            extracted.records,
            &articles,
            &config.enrich,
            &self.fetcher,
            &self.inference,
        )
        .await;
        warnings.extend(enriched.warnings);

        self.checkpoint(cancel)?;

        // Stage 5: clustering and insights. Pure, never fails the run.
        let clustered = cluster::analyze(enriched.records, &config.cluster);
        if let Some(warning) = clustered.warning {
            warnings.push(warning);
        }

        let partial = !extracted.failed_batches.is_empty()
            || warnings
                .iter()
                .any(|w| matches!(w, RunWarning::EnrichmentFailed { .. }));
        let status = if partial {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Complete
        };

        let finished_at = Utc::now();
        info!(
            %run_id,
            records = clustered.records.len(),
            clusters = clustered.summary.clusters.len(),
            warnings = warnings.len(),
            ?status,
            "discovery run finished"
        );

        Ok(RunReport {
            run_id,
            topic: config.topic.clone(),
            status,
            articles,
            rejected_count: filtered.rejected_count,
            records: clustered.records,
            clusters: clustered.summary.clusters.clone(),
            insights: Some(clustered.summary),
            failed_batches: extracted.failed_batches,
            warnings,
            started_at,
            finished_at,
        })
    }

    fn checkpoint(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            warn!("run cancelled between stages");
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }
}

fn empty_report(
    run_id: Uuid,
    config: &RunConfig,
    started_at: chrono::DateTime<Utc>,
    status: RunStatus,
) -> RunReport {
    RunReport {
        run_id,
        topic: config.topic.clone(),
        status,
        articles: Vec::new(),
        rejected_count: 0,
        records: Vec::new(),
        clusters: Vec::new(),
        insights: None,
        failed_batches: Vec::new(),
        warnings: Vec::new(),
        started_at,
        finished_at: Utc::now(),
    }
}
