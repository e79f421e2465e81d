//! Aggregate the clustered record set into the run-level insight summary.

use chrono::Utc;
use indexmap::IndexMap;

use crate::cluster::tfidf::DocumentVectors;
use crate::types::cluster::{ClusterAssignment, InsightSummary};
use crate::types::config::ClusterConfig;
use crate::types::record::{Category, StartupRecord};

/// Build per-cluster assignments with centroid-derived labels.
///
/// A cluster's label is its centroid's heaviest terms; clusters that ended
/// up empty are omitted.
pub fn build_assignments(
    records: &[StartupRecord],
    centroids: &[Vec<f64>],
    vectors: &DocumentVectors,
    config: &ClusterConfig,
) -> Vec<ClusterAssignment> {
    (0..centroids.len())
        .filter_map(|cluster_id| {
            let member_ids: Vec<String> = records
                .iter()
                .filter(|r| r.cluster_id == Some(cluster_id))
                .map(|r| r.id.clone())
                .collect();
            if member_ids.is_empty() {
                return None;
            }

            let label = centroid_terms(&centroids[cluster_id], &vectors.terms, config.label_terms);
            Some(ClusterAssignment {
                cluster_id,
                size: member_ids.len(),
                member_ids,
                label,
            })
        })
        .collect()
}

/// Heaviest terms of one centroid, descending by weight.
fn centroid_terms(centroid: &[f64], terms: &[String], count: usize) -> Vec<String> {
    let mut weighted: Vec<(usize, f64)> = centroid
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, w)| *w > 0.0)
        .collect();
    weighted.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    weighted
        .into_iter()
        .take(count)
        .map(|(i, _)| terms[i].clone())
        .collect()
}

/// Aggregate counts and terms across the final record set.
pub fn summarize(
    records: &[StartupRecord],
    assignments: Vec<ClusterAssignment>,
    vectors: &DocumentVectors,
    config: &ClusterConfig,
    note: Option<String>,
) -> InsightSummary {
    InsightSummary {
        total_records: records.len(),
        category_counts: count_categories(records),
        country_counts: count_countries(records),
        clusters: assignments,
        top_terms: vectors
            .term_totals()
            .into_iter()
            .filter(|(_, w)| *w > 0.0)
            .take(config.top_terms)
            .map(|(term, _)| term)
            .collect(),
        note,
        generated_at: Utc::now(),
    }
}

fn count_categories(records: &[StartupRecord]) -> IndexMap<Category, usize> {
    let mut counts: IndexMap<Category, usize> = IndexMap::new();
    for record in records {
        *counts.entry(record.category).or_insert(0) += 1;
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}

fn count_countries(records: &[StartupRecord]) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        if let Some(country) = &record.country {
            if !country.is_empty() {
                *counts.entry(country.clone()).or_insert(0) += 1;
            }
        }
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}
