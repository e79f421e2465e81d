//! Run-level results: report, status, warnings, batch failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::article::Article;
use crate::types::cluster::{ClusterAssignment, InsightSummary};
use crate::types::record::StartupRecord;

/// How a run ended. Never collapses distinct outcomes into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// Zero articles collected across all sources.
    NoData,

    /// Articles were collected but no startup record survived
    /// filtering/extraction.
    NothingMatched,

    /// Some batches or records failed; others succeeded.
    PartialSuccess,

    /// Everything that was attempted succeeded.
    Complete,
}

/// A non-fatal failure accumulated during a run.
///
/// The pipeline favors "best partial answer with visible caveats" over
/// aborting, so everything short of [`RunStatus::NoData`] lands here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum RunWarning {
    /// One source produced nothing while others did.
    SourcePartial { origin: String, detail: String },

    /// Rows/entries skipped during normalization (unparseable or too thin).
    EntriesSkipped { origin: String, count: usize },

    /// An extraction batch failed; its articles were lost to this run.
    BatchFailed { batch_index: usize, detail: String },

    /// A record could not be enriched and was passed through unchanged.
    EnrichmentFailed { record_id: String, detail: String },

    /// Clustering was skipped on degenerate input.
    ClusteringSkipped { reason: String },
}

impl std::fmt::Display for RunWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunWarning::SourcePartial { origin, detail } => {
                write!(f, "source '{}' unavailable: {}", origin, detail)
            }
            RunWarning::EntriesSkipped { origin, count } => {
                write!(f, "{} entries from '{}' skipped", count, origin)
            }
            RunWarning::BatchFailed { batch_index, detail } => {
                write!(f, "extraction batch {} failed: {}", batch_index, detail)
            }
            RunWarning::EnrichmentFailed { record_id, detail } => {
                write!(f, "enrichment failed for record {}: {}", record_id, detail)
            }
            RunWarning::ClusteringSkipped { reason } => {
                write!(f, "clustering skipped: {}", reason)
            }
        }
    }
}

/// A failed extraction batch: index plus the error that sank it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Zero-based index of the batch in submission order.
    pub batch_index: usize,

    /// How many articles the batch carried.
    pub article_count: usize,

    pub error: String,
}

/// Everything a run produced, returned in memory for the persistence
/// collaborator to serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,

    pub topic: String,

    pub status: RunStatus,

    /// All normalized articles (pre-filter).
    pub articles: Vec<Article>,

    /// Articles rejected by the relevance pre-filter.
    pub rejected_count: usize,

    /// Final record set, cluster ids filled where clustering ran.
    pub records: Vec<StartupRecord>,

    pub clusters: Vec<ClusterAssignment>,

    pub insights: Option<InsightSummary>,

    pub failed_batches: Vec<BatchFailure>,

    pub warnings: Vec<RunWarning>,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// True when nothing failed anywhere.
    pub fn is_clean(&self) -> bool {
        self.status == RunStatus::Complete && self.warnings.is_empty()
    }
}
