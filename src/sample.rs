//! Pixel sampling: one [`ColorSample`] per distinct quantized color.

use std::collections::HashMap;

use crate::color::{Color, ColorSample, Rgba16Image};

/// Distinct colors of an image and the number of pixels they cover.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    /// One entry per distinct color, in the order first seen
    pub colors: Vec<ColorSample>,
    /// Number of non-ignored pixels scanned
    pub total_pixels: u64,
}

impl Samples {
    pub fn distinct(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Count every non-transparent pixel of `img`, row by row.
pub fn extract_samples(img: &Rgba16Image) -> Samples {
    let mut index: HashMap<Color, usize> = HashMap::new();
    let mut colors: Vec<ColorSample> = Vec::new();
    let mut total_pixels = 0u64;

    for pixel in img.pixels() {
        let Some(color) = Color::quantize(pixel) else {
            continue;
        };
        total_pixels += 1;
        match index.get(&color) {
            Some(&i) => colors[i].count += 1,
            None => {
                index.insert(color, colors.len());
                colors.push(ColorSample::new(color, 1));
            }
        }
    }

    Samples {
        colors,
        total_pixels,
    }
}
