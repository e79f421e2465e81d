//! Cluster assignments and the derived insight summary.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::record::Category;

/// One unsupervised grouping of records, recomputed wholesale each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub cluster_id: usize,

    /// Member record ids; no duplicates.
    pub member_ids: Vec<String>,

    /// Top terms describing the cluster. Descriptive metadata only.
    pub label: Vec<String>,

    pub size: usize,
}

impl ClusterAssignment {
    /// Render the label as a single string for display.
    pub fn label_text(&self) -> String {
        self.label.join(", ")
    }
}

/// Read-only aggregation over the final record set.
///
/// Regenerated each run, never merged with prior runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSummary {
    pub total_records: usize,

    /// Counts per category, descending.
    pub category_counts: IndexMap<Category, usize>,

    /// Counts per country, descending. Records without a country are skipped.
    pub country_counts: IndexMap<String, usize>,

    /// Per-cluster aggregates.
    pub clusters: Vec<ClusterAssignment>,

    /// Most frequent terms across all records.
    pub top_terms: Vec<String>,

    /// Set when clustering was skipped (degenerate input).
    pub note: Option<String>,

    pub generated_at: DateTime<Utc>,
}

impl InsightSummary {
    /// One-sentence human-readable digest of the run.
    pub fn headline(&self) -> String {
        if self.total_records == 0 {
            return "No data available for insights.".to_string();
        }

        let mut parts = vec![format!("Analysis of {} startups reveals:", self.total_records)];

        let top_categories: Vec<_> = self
            .category_counts
            .keys()
            .take(3)
            .map(|c| c.label())
            .collect();
        if !top_categories.is_empty() {
            parts.push(format!("Most startups focus on {}", top_categories.join(", ")));
        }

        let top_countries: Vec<_> = self.country_counts.keys().take(3).cloned().collect();
        if !top_countries.is_empty() {
            parts.push(format!("with strong presence in {}", top_countries.join(", ")));
        }

        if self.clusters.len() > 1 {
            parts.push(format!("Clustered into {} distinct themes", self.clusters.len()));
        }

        if let Some(note) = &self.note {
            parts.push(note.clone());
        }

        format!("{}.", parts.join(". "))
    }
}
