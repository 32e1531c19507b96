//! Initial centroid selection.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{Centroid, ColorSample};
use crate::distance::DistanceMetric;
use crate::error::{ProminentError, Result};

/// How the first `k` centroids are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeedingStrategy {
    /// K-means++: spread seeds out by sampling proportional to squared distance
    #[default]
    KMeansPlusPlus,
    /// `k` distinct samples drawn uniformly
    Random,
}

impl SeedingStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            SeedingStrategy::KMeansPlusPlus => "Kmeans++",
            SeedingStrategy::Random => "Random seed",
        }
    }
}

/// Choose `k` initial centroids among `samples`.
///
/// Fails with [`ProminentError::InvalidK`] when `k` exceeds the number of
/// distinct samples.
pub fn seed_centroids<M, R>(
    k: usize,
    samples: &[ColorSample],
    strategy: SeedingStrategy,
    metric: &M,
    rng: &mut R,
) -> Result<Vec<Centroid>>
where
    M: DistanceMetric + ?Sized,
    R: Rng + ?Sized,
{
    if k > samples.len() {
        return Err(ProminentError::InvalidK {
            k,
            distinct: samples.len(),
        });
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    let picked = match strategy {
        SeedingStrategy::Random => seed_random(k, samples.len(), rng),
        SeedingStrategy::KMeansPlusPlus => seed_plus_plus(k, samples, metric, rng),
    };
    Ok(picked.into_iter().map(|i| samples[i]).collect())
}

/// Indices of `k` distinct samples, redrawing on duplicates.
fn seed_random<R: Rng + ?Sized>(k: usize, n: usize, rng: &mut R) -> Vec<usize> {
    let mut taken = vec![false; n];
    let mut picked = Vec::with_capacity(k);
    while picked.len() < k {
        let idx = rng.random_range(0..n);
        if taken[idx] {
            continue;
        }
        taken[idx] = true;
        picked.push(idx);
    }
    picked
}

fn seed_plus_plus<M, R>(k: usize, samples: &[ColorSample], metric: &M, rng: &mut R) -> Vec<usize>
where
    M: DistanceMetric + ?Sized,
    R: Rng + ?Sized,
{
    let n = samples.len();
    let mut taken = vec![false; n];
    let mut picked = Vec::with_capacity(k);

    let first = rng.random_range(0..n);
    taken[first] = true;
    picked.push(first);

    let mut weights = vec![0.0f64; n];
    while picked.len() < k {
        let mut total = 0.0;
        for (j, sample) in samples.iter().enumerate() {
            if taken[j] {
                weights[j] = 0.0;
                continue;
            }
            let nearest = picked
                .iter()
                .map(|&c| metric.distance(&samples[c].color, &sample.color))
                .fold(f64::INFINITY, f64::min);
            weights[j] = nearest * nearest;
            total += weights[j];
        }

        let next = pick_weighted(&weights, total, rng).unwrap_or_else(|| {
            // every remaining sample sits on a centroid already
            (0..n).rev().find(|&j| !taken[j]).unwrap_or(0)
        });
        taken[next] = true;
        picked.push(next);
    }
    picked
}

/// Cumulative-distribution draw; `None` when nothing carries weight.
fn pick_weighted<R: Rng + ?Sized>(weights: &[f64], total: f64, rng: &mut R) -> Option<usize> {
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let target = rng.random::<f64>() * total;
    let mut so_far = 0.0;
    for (j, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        so_far += w;
        if target < so_far {
            return Some(j);
        }
    }
    None
}
