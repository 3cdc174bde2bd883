//! Seeded k-means hotspot clustering for accident coordinates.
//!
//! This module implements Lloyd's algorithm directly rather than calling out
//! to a clustering library, so the seeding, restart, and tie-break policy are
//! explicit and testable:
//! - centroid initialization is a seeded choice of `k` distinct input points
//! - nearest-centroid ties break toward the lowest centroid index
//! - the best of `restarts` independent runs (lowest inertia) wins, ties
//!   toward the earlier run
//!
//! Coordinates are standardized to zero mean / unit variance per axis before
//! clustering and the winning centroids are mapped back to latitude/longitude
//! units. The assignment step is parallelized with `rayon`; it is a pure
//! per-point computation, so parallelism cannot affect the result.
//!
//! # Example
//!
//! ```no_run
//! use crash_hotspots::config::HotspotConfig;
//! use crash_hotspots::processors::clustering::cluster_hotspots;
//! use crash_hotspots::processors::geo::GeoPoint;
//!
//! let points = vec![GeoPoint { row: 0, latitude: 41.88, longitude: -87.63 }];
//! let hotspots = cluster_hotspots(&points, &HotspotConfig { k: 1, ..Default::default() });
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use thiserror::Error;

use crate::config::HotspotConfig;
use crate::processors::geo::GeoPoint;
use crate::processors::standardize::Standardizer;

/// Errors detected before any clustering work begins.
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("no geo-referenced points to cluster")]
    EmptyInput,

    #[error("invalid cluster count: k={k} for {points} points")]
    InvalidClusterCount { k: usize, points: usize },
}

/// Result type for clustering operations.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Output of a hotspot clustering run.
#[derive(Debug, Clone)]
pub struct Hotspots {
    /// Cluster label per input point, index-aligned with the input slice.
    /// Every label is in `[0, k)`.
    pub labels: Vec<usize>,
    /// One centroid per cluster label, in original latitude/longitude units.
    /// Always exactly `k` entries, even if a cluster ended up empty.
    pub centroids: Vec<[f64; 2]>,
    /// Total within-cluster squared distance of the winning run, in
    /// standardized space.
    pub inertia: f64,
}

impl Hotspots {
    /// Number of points assigned to each cluster label.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.centroids.len()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// One completed run of Lloyd's algorithm, in standardized space.
struct KMeansRun {
    labels: Vec<usize>,
    centroids: Vec<[f64; 2]>,
    inertia: f64,
}

#[inline]
fn distance_sq(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    d0 * d0 + d1 * d1
}

/// Index of the nearest centroid by squared Euclidean distance.
///
/// Strict comparison, so ties resolve to the lowest centroid index.
#[inline]
fn nearest_centroid(point: &[f64; 2], centroids: &[[f64; 2]]) -> usize {
    let mut best_idx = 0usize;
    let mut best_dist = f64::MAX;
    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = distance_sq(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best_idx = idx;
        }
    }
    best_idx
}

/// One full run of Lloyd's algorithm from a seeded initialization.
///
/// Iterates assignment and centroid update until assignments stop changing
/// or `max_iterations` is reached. An empty cluster keeps its previous
/// centroid, so the output always has exactly `k` centroids.
fn lloyd(scaled: &[[f64; 2]], k: usize, max_iterations: usize, rng: &mut StdRng) -> KMeansRun {
    let n = scaled.len();

    // Initialize centroids as k distinct input points
    let mut centroids: Vec<[f64; 2]> = rand::seq::index::sample(rng, n, k)
        .into_iter()
        .map(|i| scaled[i])
        .collect();

    let mut labels = vec![0usize; n];

    for _iter in 0..max_iterations.max(1) {
        // Assignment step (parallel, pure per-point)
        let new_labels: Vec<usize> = scaled
            .par_iter()
            .map(|point| nearest_centroid(point, &centroids))
            .collect();

        let changed = new_labels != labels;
        labels = new_labels;

        // Update step: centroid = mean of assigned points
        let mut sums = vec![[0.0f64; 2]; k];
        let mut counts = vec![0usize; k];
        for (point, &label) in scaled.iter().zip(labels.iter()) {
            sums[label][0] += point[0];
            sums[label][1] += point[1];
            counts[label] += 1;
        }
        for cluster in 0..k {
            if counts[cluster] > 0 {
                let count = counts[cluster] as f64;
                centroids[cluster] = [sums[cluster][0] / count, sums[cluster][1] / count];
            }
        }

        if !changed {
            break;
        }
    }

    // Sequential sum keeps the inertia bit-for-bit reproducible
    let inertia = scaled
        .iter()
        .zip(labels.iter())
        .map(|(point, &label)| distance_sq(point, &centroids[label]))
        .sum();

    KMeansRun {
        labels,
        centroids,
        inertia,
    }
}

/// Cluster accident coordinates into `k` geographic hotspots.
///
/// Standardizes the coordinates, runs `config.restarts` independent seeded
/// runs of Lloyd's algorithm, keeps the run with the lowest inertia, and
/// maps its centroids back into latitude/longitude units.
///
/// Deterministic: identical input, `k`, and seed produce identical labels
/// and centroids across runs and platforms.
///
/// # Errors
///
/// - [`ClusterError::EmptyInput`] if `points` is empty
/// - [`ClusterError::InvalidClusterCount`] if `k == 0` or `k > points.len()`
///
/// # Performance
///
/// O(restarts × iterations × n × k); fine for the tens of thousands of
/// records this dataset holds.
pub fn cluster_hotspots(points: &[GeoPoint], config: &HotspotConfig) -> Result<Hotspots> {
    if points.is_empty() {
        return Err(ClusterError::EmptyInput);
    }
    if config.k == 0 || config.k > points.len() {
        return Err(ClusterError::InvalidClusterCount {
            k: config.k,
            points: points.len(),
        });
    }

    // Statistics are fit once, over exactly this point set
    let standardizer = Standardizer::fit(points);
    let scaled: Vec<[f64; 2]> = points.iter().map(|p| standardizer.transform(p)).collect();

    // Each restart gets its own deterministic seed, so runs stay independent
    let seed_for = |run: usize| StdRng::seed_from_u64(config.seed.wrapping_add(run as u64));

    let mut best = lloyd(&scaled, config.k, config.max_iterations, &mut seed_for(0));
    for run in 1..config.restarts.max(1) {
        let candidate = lloyd(&scaled, config.k, config.max_iterations, &mut seed_for(run));
        if candidate.inertia < best.inertia {
            best = candidate;
        }
    }

    log::debug!(
        "k-means: k={} restarts={} winning inertia={:.6}",
        config.k,
        config.restarts,
        best.inertia
    );

    let centroids = best
        .centroids
        .iter()
        .map(|c| standardizer.inverse(c))
        .collect();

    Ok(Hotspots {
        labels: best.labels,
        centroids,
        inertia: best.inertia,
    })
}
