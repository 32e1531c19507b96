//! Options controlling color extraction.
//!
//! ```
//! use prominent_colors::{CentroidAggregation, ProminentConfig};
//!
//! let config = ProminentConfig::default()
//!     .with_k(5)
//!     .with_aggregation(CentroidAggregation::Mean)
//!     .with_seed(42);
//! assert_eq!(config.to_string(), "K=5, Kmeans++, Mean, RGB, Cropping center");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cluster::{CentroidAggregation, MAX_ROUNDS};
use crate::distance::Metric;
use crate::mask::{BackgroundMaskSpec, default_masks};
use crate::seed::SeedingStrategy;

/// Number of clusters used by default
pub const DEFAULT_K: usize = 3;

/// Width images are scaled down to before analysis
pub const DEFAULT_RESIZE_WIDTH: u32 = 80;

/// Region of the image kept before analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cropping {
    /// Keep the middle half, dropping 25% on every side
    #[default]
    CenterCrop,
    /// Use the whole image
    NoCrop,
}

impl Cropping {
    pub fn label(&self) -> &'static str {
        match self {
            Cropping::CenterCrop => "Cropping center",
            Cropping::NoCrop => "No cropping",
        }
    }
}

/// Complete set of extraction options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProminentConfig {
    /// Number of clusters
    pub k: usize,
    pub seeding: SeedingStrategy,
    pub aggregation: CentroidAggregation,
    pub cropping: Cropping,
    pub metric: Metric,
    /// Keep an 8-bit rendering of the masked image in the result
    pub debug_snapshot: bool,
    /// Target width when the image is larger than this in either direction
    pub resize_width: u32,
    /// Backdrop rules, tried in order
    pub background_masks: Vec<BackgroundMaskSpec>,
    /// Cap on refinement rounds
    pub max_rounds: usize,
    /// Seed for the per-call random generator; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for ProminentConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            seeding: SeedingStrategy::default(),
            aggregation: CentroidAggregation::default(),
            cropping: Cropping::default(),
            metric: Metric::default(),
            debug_snapshot: false,
            resize_width: DEFAULT_RESIZE_WIDTH,
            background_masks: default_masks(),
            max_rounds: MAX_ROUNDS,
            seed: None,
        }
    }
}

impl ProminentConfig {
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_seeding(mut self, seeding: SeedingStrategy) -> Self {
        self.seeding = seeding;
        self
    }

    pub fn with_aggregation(mut self, aggregation: CentroidAggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_cropping(mut self, cropping: Cropping) -> Self {
        self.cropping = cropping;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_debug_snapshot(mut self, enabled: bool) -> Self {
        self.debug_snapshot = enabled;
        self
    }

    pub fn with_resize_width(mut self, width: u32) -> Self {
        self.resize_width = width;
        self
    }

    /// Replace the backdrop rules; an empty list disables masking.
    pub fn with_background_masks(mut self, masks: Vec<BackgroundMaskSpec>) -> Self {
        self.background_masks = masks;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl fmt::Display for ProminentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "K={}, {}, {}, {}, {}",
            self.k,
            self.seeding.label(),
            self.aggregation.label(),
            self.metric.label(),
            self.cropping.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::{MASK_BLACK, MASK_GREEN, MASK_WHITE};

    #[test]
    fn test_defaults() {
        let config = ProminentConfig::default();
        assert_eq!(config.k, 3);
        assert_eq!(config.seeding, SeedingStrategy::KMeansPlusPlus);
        assert_eq!(config.aggregation, CentroidAggregation::Median);
        assert_eq!(config.cropping, Cropping::CenterCrop);
        assert_eq!(config.metric, Metric::Rgb);
        assert!(!config.debug_snapshot);
        assert_eq!(config.resize_width, 80);
        assert_eq!(config.background_masks, vec![MASK_WHITE, MASK_BLACK, MASK_GREEN]);
        assert_eq!(config.max_rounds, 5000);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_summary() {
        let config = ProminentConfig::default()
            .with_seeding(SeedingStrategy::Random)
            .with_metric(Metric::Perceptual)
            .with_cropping(Cropping::NoCrop);
        assert_eq!(config.to_string(), "K=3, Random seed, Median, LAB, No cropping");
    }
}
