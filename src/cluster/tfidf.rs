//! TF-IDF vectorization over record text.
//!
//! Terms are lowercase alphanumeric tokens of length >= 3 minus a stop-word
//! list; the vocabulary is capped at the most frequent `max_features` terms
//! (alphabetical tie-break, so the cap is deterministic). Weights use
//! smoothed inverse document frequency and each vector is L2-normalised.

use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Common English function words, close to the usual vectorizer defaults.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old",
    "see", "two", "way", "who", "its", "that", "this", "with", "from", "they", "will", "would",
    "there", "their", "what", "about", "which", "when", "than", "them", "then", "were", "been",
    "have", "more", "also", "into", "over", "such", "only", "other", "some", "these", "most",
    "through", "between", "after", "before", "where", "while", "because", "being", "both",
];

/// Documents as weighted term vectors over a shared vocabulary.
#[derive(Debug, Clone)]
pub struct DocumentVectors {
    /// Vocabulary, index-aligned with vector dimensions.
    pub terms: Vec<String>,

    /// One L2-normalised vector per input document.
    pub vectors: Vec<Vec<f64>>,
}

impl DocumentVectors {
    /// True when no document produced a non-zero vector.
    pub fn is_empty_space(&self) -> bool {
        self.vectors
            .iter()
            .all(|v| v.iter().all(|x| *x == 0.0))
    }

    /// Global term weights summed across all documents, descending.
    pub fn term_totals(&self) -> Vec<(String, f64)> {
        let mut totals: Vec<(String, f64)> = self
            .terms
            .iter()
            .enumerate()
            .map(|(i, term)| {
                let sum: f64 = self.vectors.iter().map(|v| v[i]).sum();
                (term.clone(), sum)
            })
            .collect();
        totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
        totals
    }
}

/// Split text into counting-ready tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3)
        .map(|t| t.to_lowercase())
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Vectorize documents with TF-IDF weighting.
pub fn vectorize(texts: &[String], max_features: usize) -> DocumentVectors {
    let n_docs = texts.len();

    // Per-document term counts; BTreeMap keeps iteration deterministic.
    let doc_counts: Vec<BTreeMap<String, usize>> = texts
        .iter()
        .map(|text| {
            let mut counts = BTreeMap::new();
            for token in tokenize(text) {
                *counts.entry(token).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    // Document frequency and total frequency per term.
    let mut df: IndexMap<String, usize> = IndexMap::new();
    let mut total: IndexMap<String, usize> = IndexMap::new();
    for counts in &doc_counts {
        for (term, count) in counts {
            *df.entry(term.clone()).or_insert(0) += 1;
            *total.entry(term.clone()).or_insert(0) += count;
        }
    }

    // Vocabulary cap: most frequent terms first, alphabetical on ties.
    let mut ranked: Vec<(String, usize)> = total.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(max_features);
    let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
    terms.sort();

    let idf: Vec<f64> = terms
        .iter()
        .map(|term| {
            let d = *df.get(term).unwrap_or(&0) as f64;
            ((1.0 + n_docs as f64) / (1.0 + d)).ln() + 1.0
        })
        .collect();

    let vectors: Vec<Vec<f64>> = doc_counts
        .iter()
        .map(|counts| {
            let mut vector: Vec<f64> = terms
                .iter()
                .zip(&idf)
                .map(|(term, idf)| counts.get(term).copied().unwrap_or(0) as f64 * idf)
                .collect();
            let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 0.0 {
                for x in &mut vector {
                    *x /= norm;
                }
            }
            vector
        })
        .collect();

    DocumentVectors { terms, vectors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_filters_short_and_stop_words() {
        let tokens = tokenize("The AI startup is building new robotics for the EU");
        assert!(tokens.contains(&"startup".to_string()));
        assert!(tokens.contains(&"robotics".to_string()));
        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"ai".to_string())); // len < 3
    }

    #[test]
    fn test_vectors_are_normalised() {
        let texts = vec![
            "fintech payments platform for banks".to_string(),
            "robotics automation for factories".to_string(),
        ];
        let dv = vectorize(&texts, 100);
        for v in &dv.vectors {
            let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_shared_terms_weigh_less() {
        let texts = vec![
            "platform fintech".to_string(),
            "platform robotics".to_string(),
            "platform climate".to_string(),
        ];
        let dv = vectorize(&texts, 100);
        let platform = dv.terms.iter().position(|t| t == "platform").unwrap();
        let fintech = dv.terms.iter().position(|t| t == "fintech").unwrap();
        // "platform" appears everywhere, so its idf-weighted value in doc 0
        // must be below the doc-specific term.
        assert!(dv.vectors[0][platform] < dv.vectors[0][fintech]);
    }

    #[test]
    fn test_empty_docs_give_zero_vectors() {
        let texts = vec!["".to_string(), "   ".to_string()];
        let dv = vectorize(&texts, 100);
        assert!(dv.is_empty_space());
    }

    #[test]
    fn test_max_features_caps_vocabulary() {
        let texts = vec!["alpha beta gamma delta epsilon zeta".to_string()];
        let dv = vectorize(&texts, 3);
        assert_eq!(dv.terms.len(), 3);
    }

    #[test]
    fn test_vectorize_is_deterministic() {
        let texts = vec![
            "fintech payments platform".to_string(),
            "robotics automation".to_string(),
        ];
        let a = vectorize(&texts, 50);
        let b = vectorize(&texts, 50);
        assert_eq!(a.terms, b.terms);
        assert_eq!(a.vectors, b.vectors);
    }
}
