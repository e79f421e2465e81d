//! Unsupervised grouping of the final record set.
//!
//! TF-IDF vectors over name + description, seeded K-Means on top, then an
//! insight summary aggregated from the result. Everything here is pure and
//! deterministic for a given seed; the stage never fails a run, it degrades
//! to an "insufficient data" summary instead.

pub mod insights;
pub mod kmeans;
pub mod tfidf;

use tracing::{debug, info};

use crate::types::cluster::InsightSummary;
use crate::types::config::ClusterConfig;
use crate::types::record::StartupRecord;
use crate::types::report::RunWarning;

/// Output of the cluster analysis stage.
#[derive(Debug, Clone)]
pub struct ClusterOutcome {
    /// Records with `cluster_id` stamped (or left `None` on degenerate input).
    pub records: Vec<StartupRecord>,

    /// Set when clustering was skipped.
    pub warning: Option<RunWarning>,

    pub summary: InsightSummary,
}

/// Cluster records and derive the insight summary.
///
/// Degenerate input (fewer than two records, or text that vectorizes to
/// nothing) skips clustering: records keep `cluster_id = None` and the
/// summary carries a note.
pub fn analyze(mut records: Vec<StartupRecord>, config: &ClusterConfig) -> ClusterOutcome {
    let texts: Vec<String> = records.iter().map(|r| r.cluster_text()).collect();
    let vectors = tfidf::vectorize(&texts, config.max_features);

    if records.len() < 2 || vectors.is_empty_space() {
        let reason = if records.len() < 2 {
            "insufficient data: fewer than two records"
        } else {
            "insufficient data: no usable text"
        };
        info!(records = records.len(), reason, "skipping clustering");
        let summary = insights::summarize(&records, vec![], &vectors, config, Some(reason.into()));
        return ClusterOutcome {
            records,
            warning: Some(RunWarning::ClusteringSkipped {
                reason: reason.into(),
            }),
            summary,
        };
    }

    let k = config.resolve_k(records.len());
    debug!(records = records.len(), k, seed = config.seed, "running k-means");
    let result = kmeans::cluster(&vectors.vectors, k, config.seed, config.max_iterations);

    for (record, assignment) in records.iter_mut().zip(&result.assignments) {
        record.cluster_id = Some(*assignment);
    }

    let assignments = insights::build_assignments(&records, &result.centroids, &vectors, config);
    info!(clusters = assignments.len(), records = records.len(), "clustering complete");

    let summary = insights::summarize(&records, assignments, &vectors, config, None);
    ClusterOutcome {
        records,
        warning: None,
        summary,
    }
}
