//! Color distance strategies used by seeding and refinement.

use palette::{IntoColor, Lab, LinSrgb, Srgb};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{ProminentError, Result};

/// Dissimilarity between two colors. Only the ordering of values matters.
pub trait DistanceMetric {
    fn distance(&self, a: &Color, b: &Color) -> f64;
}

/// Built-in distance metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Metric {
    /// Squared Euclidean distance over 8-bit RGB
    #[default]
    Rgb,
    /// Euclidean distance in CIE Lab, falling back to [`Metric::Rgb`] per comparison
    Perceptual,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Rgb => "RGB",
            Metric::Perceptual => "LAB",
        }
    }
}

impl DistanceMetric for Metric {
    fn distance(&self, a: &Color, b: &Color) -> f64 {
        match self {
            Metric::Rgb => rgb_distance(a, b),
            Metric::Perceptual => or_rgb(lab_distance(a, b), a, b),
        }
    }
}

/// Use `measured` unless it failed, in which case this one comparison falls
/// back to [`rgb_distance`].
fn or_rgb(measured: Result<f64>, a: &Color, b: &Color) -> f64 {
    measured.unwrap_or_else(|err| {
        log::warn!("{err}");
        rgb_distance(a, b)
    })
}

/// Squared Euclidean RGB distance; the square root is skipped on purpose.
#[inline]
pub fn rgb_distance(a: &Color, b: &Color) -> f64 {
    let dr = i32::from(a.red) - i32::from(b.red);
    let dg = i32::from(a.green) - i32::from(b.green);
    let db = i32::from(a.blue) - i32::from(b.blue);
    f64::from(dr * dr + dg * dg + db * db)
}

fn to_lab(c: &Color) -> Result<Lab> {
    let linear: LinSrgb<f32> = Srgb::<u8>::from(*c).into_linear();
    let lab: Lab = linear.into_color();
    if !(lab.l.is_finite() && lab.a.is_finite() && lab.b.is_finite()) {
        return Err(ProminentError::MetricFallback {
            reason: format!("#{c} has no finite Lab representation"),
        });
    }
    Ok(lab)
}

/// Euclidean distance in Lab.
pub fn lab_distance(a: &Color, b: &Color) -> Result<f64> {
    let (a, b) = (to_lab(a)?, to_lab(b)?);
    let dl = f64::from(a.l - b.l);
    let da = f64::from(a.a - b.a);
    let db = f64::from(a.b - b.b);
    Ok((dl * dl + da * da + db * db).sqrt())
}
