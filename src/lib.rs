//! Find the K most prominent colors of an image.
//!
//! The pipeline center crops and downscales the image, masks uniform
//! backdrops (white, black, green...) reachable from the corners, counts the
//! remaining colors and clusters them with k-means. Colors come back most
//! dominant first, each with the number of pixels it represents.
//!
//! ```no_run
//! let img = image::open("photo.jpg")?;
//! for c in prominent_colors::prominent_colors(&img)? {
//!     println!("#{} {}", c.color, c.count);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use image::{DynamicImage, RgbaImage};
use js_sys::{Array, Object, Reflect};
use rand::{Rng, SeedableRng, rngs::StdRng};
use wasm_bindgen::prelude::*;

pub mod cluster;
pub mod color;
pub mod config;
pub mod distance;
pub mod error;
pub mod mask;
pub mod prepare;
pub mod sample;
pub mod seed;

pub use cluster::{CentroidAggregation, Clustering, kmeans, sort_by_dominance};
pub use color::{Centroid, Color, ColorSample, Rgba16Image};
pub use config::{Cropping, ProminentConfig};
pub use distance::{DistanceMetric, Metric};
pub use error::{ProminentError, Result};
pub use mask::{
    BackgroundMaskSpec, MASK_BLACK, MASK_GREEN, MASK_WHITE, MaskOutcome, apply_mask,
    debug_snapshot, default_masks,
};
pub use sample::{Samples, extract_samples};
pub use seed::SeedingStrategy;

/// Everything learned about one image.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Prominent colors, most dominant first
    pub colors: Vec<Centroid>,
    /// Pixels that took part in clustering
    pub total_pixels: u64,
    /// Pixels removed by the background mask
    pub masked_pixels: usize,
    /// Mask that matched the image corners, if any
    pub mask: Option<BackgroundMaskSpec>,
    /// K-means rounds executed (0 when clustering was skipped)
    pub rounds: usize,
    /// False when k-means stopped at the round cap
    pub converged: bool,
    /// Masked image with ignored pixels in magenta, when requested
    pub debug_image: Option<RgbaImage>,
}

/// Prominent colors with every option at its default.
pub fn prominent_colors(img: &DynamicImage) -> Result<Vec<Centroid>> {
    Ok(prominent_colors_with_config(img, &ProminentConfig::default())?.colors)
}

/// Run the full pipeline with a generator owned by this call.
pub fn prominent_colors_with_config(
    img: &DynamicImage,
    config: &ProminentConfig,
) -> Result<Analysis> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    prominent_colors_with_rng(img, config, &mut rng)
}

/// Run the full pipeline drawing seeds from `rng`.
pub fn prominent_colors_with_rng<R: Rng + ?Sized>(
    img: &DynamicImage,
    config: &ProminentConfig,
    rng: &mut R,
) -> Result<Analysis> {
    let outcome = prepare::prepare(img, config)?;
    analyze_masked(outcome, config, rng)
}

/// Mask and cluster an image as is, without cropping or resizing.
pub fn analyze_rgba16<R: Rng + ?Sized>(
    img: &Rgba16Image,
    config: &ProminentConfig,
    rng: &mut R,
) -> Result<Analysis> {
    analyze_masked(apply_mask(img, &config.background_masks), config, rng)
}

fn analyze_masked<R: Rng + ?Sized>(
    outcome: MaskOutcome,
    config: &ProminentConfig,
    rng: &mut R,
) -> Result<Analysis> {
    let samples = extract_samples(&outcome.image);
    if samples.is_empty() {
        return Err(ProminentError::EmptyInput);
    }
    log::debug!(
        "{} pixels, {} distinct colors, {} masked",
        samples.total_pixels,
        samples.distinct(),
        outcome.ignored
    );

    let clustering = kmeans(&samples.colors, config, rng)?;
    let debug_image = config
        .debug_snapshot
        .then(|| debug_snapshot(&outcome.image));

    Ok(Analysis {
        colors: clustering.centroids,
        total_pixels: samples.total_pixels,
        masked_pixels: outcome.ignored,
        mask: outcome.spec,
        rounds: clustering.rounds,
        converged: clustering.converged,
        debug_image,
    })
}

/// Decode `input` and run the full pipeline.
#[cfg(not(target_arch = "wasm32"))]
pub fn prominent_colors_bytes(input: &[u8], config: &ProminentConfig) -> Result<Analysis> {
    let img = image::load_from_memory(input)?;
    prominent_colors_with_config(&img, config)
}

/// Prominent colors of an encoded image, for JavaScript callers.
///
/// Returns an array of `{ hex, count }` objects, most dominant first.
#[wasm_bindgen]
pub fn prominent_colors_js(
    input: Vec<u8>,
    k: usize,
    mean: bool,
    random_seed: bool,
    no_crop: bool,
    lab: bool,
) -> std::result::Result<Array, JsValue> {
    let img = image::load_from_memory(&input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?;

    let mut config = ProminentConfig::default().with_k(k);
    if mean {
        config = config.with_aggregation(CentroidAggregation::Mean);
    }
    if random_seed {
        config = config.with_seeding(SeedingStrategy::Random);
    }
    if no_crop {
        config = config.with_cropping(Cropping::NoCrop);
    }
    if lab {
        config = config.with_metric(Metric::Perceptual);
    }

    let analysis = prominent_colors_with_config(&img, &config)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let out = Array::new();
    for c in &analysis.colors {
        let entry = Object::new();
        Reflect::set(&entry, &JsValue::from_str("hex"), &JsValue::from_str(&c.hex()))?;
        Reflect::set(&entry, &JsValue::from_str("count"), &JsValue::from_f64(c.count as f64))?;
        out.push(&entry);
    }
    Ok(out)
}
