//! Working color representation and quantization.
//!
//! Pixels arrive with 16-bit channels and are reduced to 8 bits per channel
//! before counting. The reduction is lossy; clustering only needs to tell
//! colors apart, not reproduce them exactly.

use std::fmt;

use image::{ImageBuffer, Rgba, RgbaImage};
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{ProminentError, Result};

/// Image with 16 bits per RGBA channel, the input of every stage after decoding.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Divisor taking a 16-bit channel down to 8 bits.
pub const QUANTIZE_SCALE: u16 = 256;

/// An 8-bit RGB color. Serializes as its `RRGGBB` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Quantize a 16-bit RGBA pixel. Fully transparent pixels yield `None`.
    #[inline]
    pub fn quantize(pixel: &Rgba<u16>) -> Option<Self> {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            return None;
        }
        Some(Self {
            red: (r / QUANTIZE_SCALE) as u8,
            green: (g / QUANTIZE_SCALE) as u8,
            blue: (b / QUANTIZE_SCALE) as u8,
        })
    }

    /// Six uppercase hex digits, `RRGGBB`.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// Parse `RRGGBB`, with or without a single leading `#`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ProminentError::invalid_parameter("hex color", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ProminentError::invalid_parameter("hex color", s))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl From<Color> for Srgb<u8> {
    fn from(c: Color) -> Self {
        Srgb::new(c.red, c.green, c.blue)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.hex()
    }
}

impl TryFrom<String> for Color {
    type Error = ProminentError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

/// A color and how many pixels carry it.
///
/// The same shape doubles as a cluster representative, where `count` is the
/// summed occurrence count of every member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSample {
    pub color: Color,
    pub count: u64,
}

/// Cluster representative produced by seeding and refinement.
pub type Centroid = ColorSample;

impl ColorSample {
    pub const fn new(color: Color, count: u64) -> Self {
        Self { color, count }
    }

    pub fn hex(&self) -> String {
        self.color.hex()
    }
}

/// Widen an 8-bit RGBA image to the 16-bit working representation.
pub fn widen_rgba8(img: &RgbaImage) -> Rgba16Image {
    let (w, h) = img.dimensions();
    ImageBuffer::from_fn(w, h, |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        Rgba([
            u16::from(r) * 257,
            u16::from(g) * 257,
            u16::from(b) * 257,
            u16::from(a) * 257,
        ])
    })
}
