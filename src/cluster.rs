//! K-means refinement over color samples.
//!
//! [`kmeans`] handles the degenerate inputs first (nothing to cluster, a
//! single color, no more colors than clusters), then seeds `k` centroids and
//! runs Lloyd iterations until no sample changes cluster or the round cap
//! is reached. The result is ordered by [`sort_by_dominance`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{Centroid, Color, ColorSample};
use crate::config::ProminentConfig;
use crate::distance::DistanceMetric;
use crate::error::{ProminentError, Result};
use crate::seed::seed_centroids;

/// Safety net against a distance function that never lets k-means settle.
pub const MAX_ROUNDS: usize = 5000;

/// How a cluster's members are folded into its representative color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CentroidAggregation {
    /// Per-channel median of the distinct member colors
    #[default]
    Median,
    /// Per-channel mean of the distinct member colors, not weighted by count
    Mean,
}

impl CentroidAggregation {
    pub fn label(&self) -> &'static str {
        match self {
            CentroidAggregation::Median => "Median",
            CentroidAggregation::Mean => "Mean",
        }
    }
}

/// Outcome of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster representatives, most dominant first
    pub centroids: Vec<Centroid>,
    /// Refinement rounds executed (0 when a shortcut applied)
    pub rounds: usize,
    /// False when the round cap stopped refinement early
    pub converged: bool,
}

impl Clustering {
    fn shortcut(centroids: Vec<Centroid>) -> Self {
        Self {
            centroids,
            rounds: 0,
            converged: true,
        }
    }
}

/// Cluster `samples` into at most `config.k` dominant colors.
pub fn kmeans<R: Rng + ?Sized>(
    samples: &[ColorSample],
    config: &ProminentConfig,
    rng: &mut R,
) -> Result<Clustering> {
    let k = config.k;
    if samples.is_empty() {
        return Err(ProminentError::EmptyInput);
    }
    if k == 0 {
        return Err(ProminentError::invalid_parameter("k", k));
    }
    if config.max_rounds == 0 {
        return Err(ProminentError::invalid_parameter("max_rounds", 0));
    }

    if samples.len() == 1 {
        log::debug!("single distinct color, skipping k-means");
        return Ok(Clustering::shortcut(samples.to_vec()));
    }
    if samples.len() <= k {
        log::debug!("{} distinct colors <= k={k}, skipping k-means", samples.len());
        let mut all = samples.to_vec();
        sort_by_dominance(&mut all);
        return Ok(Clustering::shortcut(all));
    }

    let seeds = seed_centroids(k, samples, config.seeding, &config.metric, rng)?;
    let mut clustering = refine(
        samples,
        seeds,
        config.aggregation,
        &config.metric,
        config.max_rounds,
    );

    let before = clustering.centroids.len();
    clustering.centroids.retain(|c| c.count > 0);
    if clustering.centroids.len() < before {
        log::debug!(
            "dropped {} empty clusters",
            before - clustering.centroids.len()
        );
    }
    sort_by_dominance(&mut clustering.centroids);
    Ok(clustering)
}

/// Lloyd iterations starting from `centroids`.
///
/// Every sample starts in cluster 0. Each round reassigns all samples to
/// their nearest centroid and recomputes the centroids; it stops once a
/// round moves no sample or after `max_rounds`. Centroids are returned in
/// cluster order, unsorted, and may include empty clusters with weight 0.
pub fn refine<M: DistanceMetric + ?Sized>(
    samples: &[ColorSample],
    mut centroids: Vec<Centroid>,
    aggregation: CentroidAggregation,
    metric: &M,
    max_rounds: usize,
) -> Clustering {
    let k = centroids.len();
    let mut assignment = vec![0usize; samples.len()];
    let mut rounds = 0;
    let mut changes = usize::MAX;

    while changes > 0 && rounds < max_rounds {
        changes = 0;
        let mut buckets: Vec<Vec<ColorSample>> = vec![Vec::new(); k];

        for (sample, current) in samples.iter().zip(assignment.iter_mut()) {
            let nearest = closest(metric, &sample.color, &centroids);
            if nearest != *current {
                changes += 1;
                *current = nearest;
            }
            buckets[nearest].push(*sample);
        }

        centroids = buckets
            .iter()
            .zip(&centroids)
            .map(|(members, previous)| aggregate(members, aggregation, previous.color))
            .collect();
        rounds += 1;
    }

    let converged = changes == 0;
    if converged {
        log::debug!("k-means converged after {rounds} rounds");
    } else {
        log::warn!("{}", ProminentError::ConvergenceExceeded { rounds });
    }

    Clustering {
        centroids,
        rounds,
        converged,
    }
}

/// Index of the centroid nearest to `color`; ties go to the lowest index.
fn closest<M: DistanceMetric + ?Sized>(metric: &M, color: &Color, centroids: &[Centroid]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = metric.distance(color, &c.color);
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}

/// Fold a cluster into one representative. An empty cluster keeps `fallback`
/// with weight 0 so it can still attract samples next round.
fn aggregate(members: &[ColorSample], aggregation: CentroidAggregation, fallback: Color) -> Centroid {
    if members.is_empty() {
        return Centroid::new(fallback, 0);
    }
    let count = members.iter().map(|m| m.count).sum();
    let color = match aggregation {
        CentroidAggregation::Mean => mean(members),
        CentroidAggregation::Median => median(members),
    };
    Centroid::new(color, count)
}

fn mean(members: &[ColorSample]) -> Color {
    let n = members.len() as u64;
    let (r, g, b) = members.iter().fold((0u64, 0u64, 0u64), |(r, g, b), m| {
        (
            r + u64::from(m.color.red),
            g + u64::from(m.color.green),
            b + u64::from(m.color.blue),
        )
    });
    Color::new((r / n) as u8, (g / n) as u8, (b / n) as u8)
}

fn median(members: &[ColorSample]) -> Color {
    let channel = |get: fn(&Color) -> u8| {
        let mut values: Vec<u8> = members.iter().map(|m| get(&m.color)).collect();
        values.sort_unstable();
        values[values.len() / 2]
    };
    Color::new(channel(|c| c.red), channel(|c| c.green), channel(|c| c.blue))
}

/// Order by weight, heaviest first; equal weights by ascending `RRGGBB`.
pub fn sort_by_dominance(centroids: &mut [Centroid]) {
    // Color's derived order (red, green, blue) matches comparing hex strings
    centroids.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.color.cmp(&b.color)));
}
