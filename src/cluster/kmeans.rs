//! Seeded K-Means over TF-IDF document vectors.
//!
//! All randomness flows through one seeded generator, so a run with the same
//! inputs and seed always produces the same clustering. Distance ties break
//! toward the lower cluster index and an emptied cluster keeps its previous
//! centroid, which keeps iteration order from mattering.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Final assignment plus the centroids that produced it.
#[derive(Debug, Clone)]
pub struct KmeansResult {
    /// Cluster index per input vector, aligned with the input order.
    pub assignments: Vec<usize>,

    pub centroids: Vec<Vec<f64>>,
}

/// Run Lloyd's algorithm with deterministic seeding.
///
/// `k` is clamped to the number of vectors. Initial centroids are `k`
/// distinct documents sampled with the seeded generator.
pub fn cluster(vectors: &[Vec<f64>], k: usize, seed: u64, max_iterations: usize) -> KmeansResult {
    let n = vectors.len();
    if n == 0 {
        return KmeansResult {
            assignments: Vec::new(),
            centroids: Vec::new(),
        };
    }
    let k = k.min(n).max(1);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    let mut centroids: Vec<Vec<f64>> = indices[..k].iter().map(|&i| vectors[i].clone()).collect();

    let mut assignments = vec![0usize; n];

    for _ in 0..max_iterations {
        let next: Vec<usize> = vectors
            .iter()
            .map(|v| nearest_centroid(v, &centroids))
            .collect();

        let converged = next == assignments;
        assignments = next;
        if converged {
            break;
        }

        for (cluster_index, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&Vec<f64>> = vectors
                .iter()
                .zip(&assignments)
                .filter(|(_, a)| **a == cluster_index)
                .map(|(v, _)| v)
                .collect();
            if members.is_empty() {
                continue;
            }
            let dims = centroid.len();
            let mut mean = vec![0.0; dims];
            for member in &members {
                for (m, x) in mean.iter_mut().zip(member.iter()) {
                    *m += x;
                }
            }
            for m in &mut mean {
                *m /= members.len() as f64;
            }
            *centroid = mean;
        }
    }

    KmeansResult {
        assignments,
        centroids,
    }
}

fn nearest_centroid(vector: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0usize;
    let mut best_dist = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(vector, centroid);
        // Strict comparison: the lower index wins ties.
        if dist < best_dist {
            best = index;
            best_dist = dist;
        }
    }
    best
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
