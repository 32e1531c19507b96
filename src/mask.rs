//! Background masking for clipart-style images.
//!
//! When all four corners of an image share a backdrop color (white, black,
//! green screen...), the backdrop would dominate every palette. The masker
//! finds the first [`BackgroundMaskSpec`] that matches all four corners and
//! flood fills the 4-connected matching region reachable from them, turning
//! it fully transparent so later stages skip it.
//!
//! Foreground pixels that happen to match the rule survive as long as some
//! non-matching pixel separates them from every corner.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::Rgba16Image;

/// Value written over masked pixels: magenta with zero alpha.
pub const MARKER: Rgba<u16> = Rgba([0xFFFF, 0, 0xFFFF, 0]);

/// Color used for masked pixels in the debug snapshot.
pub const DEBUG_MARKER: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Rule describing a backdrop color.
///
/// With every channel flag set the rule looks for bright pixels (all
/// channels `>= threshold`); with none set it looks for dark pixels (all
/// channels `<= threshold`). With mixed flags the flagged channels are the
/// base and each unflagged channel divided by each base channel must stay
/// at or below `ratio_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundMaskSpec {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    /// 16-bit channel threshold, used when all flags are equal
    pub threshold: u16,
    /// Maximum other/base channel ratio, used when flags are mixed
    pub ratio_limit: f32,
}

/// White backdrop
pub const MASK_WHITE: BackgroundMaskSpec = BackgroundMaskSpec {
    red: true,
    green: true,
    blue: true,
    threshold: 0xC000,
    ratio_limit: 0.0,
};

/// Black backdrop
pub const MASK_BLACK: BackgroundMaskSpec = BackgroundMaskSpec {
    red: false,
    green: false,
    blue: false,
    threshold: 0x5000,
    ratio_limit: 0.0,
};

/// Green screen backdrop
pub const MASK_GREEN: BackgroundMaskSpec = BackgroundMaskSpec {
    red: false,
    green: true,
    blue: false,
    threshold: 0,
    ratio_limit: 0.9,
};

/// Masks tried by default, in priority order.
pub fn default_masks() -> Vec<BackgroundMaskSpec> {
    vec![MASK_WHITE, MASK_BLACK, MASK_GREEN]
}

impl BackgroundMaskSpec {
    pub const fn new(red: bool, green: bool, blue: bool, threshold: u16, ratio_limit: f32) -> Self {
        Self {
            red,
            green,
            blue,
            threshold,
            ratio_limit,
        }
    }

    fn flags(&self) -> [bool; 3] {
        [self.red, self.green, self.blue]
    }

    /// Whether `pixel` belongs to the backdrop. Transparent pixels always do.
    pub fn matches(&self, pixel: &Rgba<u16>) -> bool {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            return true;
        }
        let channels = [r, g, b];
        let flags = self.flags();

        if flags.iter().all(|&f| !f) {
            return channels.iter().all(|&v| v <= self.threshold);
        }
        if flags.iter().all(|&f| f) {
            return channels.iter().all(|&v| v >= self.threshold);
        }

        let (base, other): (Vec<_>, Vec<_>) = channels
            .iter()
            .zip(flags)
            .partition(|&(_, flagged)| flagged);

        other.iter().all(|&(&val, _)| {
            base.iter()
                .all(|&(&base_val, _)| ratio(val, base_val) <= self.ratio_limit)
        })
    }
}

/// `val / base`, where a zero base gives 0 for a zero value and infinity otherwise.
#[inline]
fn ratio(val: u16, base: u16) -> f32 {
    match (val, base) {
        (0, 0) => 0.0,
        (_, 0) => f32::INFINITY,
        _ => f32::from(val) / f32::from(base),
    }
}

/// Result of running the masker over an image.
#[derive(Debug, Clone)]
pub struct MaskOutcome {
    /// Copy of the input with backdrop pixels replaced by [`MARKER`]
    pub image: Rgba16Image,
    /// The mask that matched all four corners, if any
    pub spec: Option<BackgroundMaskSpec>,
    /// Number of pixels the fill marked (already transparent pixels excluded)
    pub ignored: usize,
}

fn corners(width: u32, height: u32) -> [(u32, u32); 4] {
    [
        (0, 0),
        (0, height - 1),
        (width - 1, 0),
        (width - 1, height - 1),
    ]
}

/// Pick the first mask matching all four corners of `img`.
pub fn select_mask(
    img: &Rgba16Image,
    masks: &[BackgroundMaskSpec],
) -> Option<BackgroundMaskSpec> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    masks.iter().copied().find(|spec| {
        corners(width, height)
            .iter()
            .all(|&(x, y)| spec.matches(img.get_pixel(x, y)))
    })
}

/// Mask the backdrop of `img`, returning a new buffer.
///
/// If no mask matches all four corners the copy is returned untouched.
pub fn apply_mask(img: &Rgba16Image, masks: &[BackgroundMaskSpec]) -> MaskOutcome {
    let mut image = img.clone();
    let Some(spec) = select_mask(img, masks) else {
        log::debug!("no background mask matched the corners");
        return MaskOutcome {
            image,
            spec: None,
            ignored: 0,
        };
    };
    log::debug!("background mask selected: {spec:?}");

    let ignored = flood_fill(&mut image, &spec);
    MaskOutcome {
        image,
        spec: Some(spec),
        ignored,
    }
}

/// Mark every pixel 4-connected to a corner through pixels matching `spec`.
///
/// Iterative so large images cannot blow the call stack. Returns the number
/// of pixels marked.
fn flood_fill(image: &mut Rgba16Image, spec: &BackgroundMaskSpec) -> usize {
    let (width, height) = image.dimensions();
    let idx = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;

    // transparent input pixels already count as ignored and stop the fill
    let mut ignored: Vec<bool> = image.pixels().map(|p| p.0[3] == 0).collect();
    let mut stack: Vec<(u32, u32)> = corners(width, height).to_vec();
    let mut marked = 0usize;

    while let Some((x, y)) = stack.pop() {
        if ignored[idx(x, y)] || !spec.matches(image.get_pixel(x, y)) {
            continue;
        }

        image.put_pixel(x, y, MARKER);
        ignored[idx(x, y)] = true;
        marked += 1;

        if x > 0 && !ignored[idx(x - 1, y)] {
            stack.push((x - 1, y));
        }
        if x + 1 < width && !ignored[idx(x + 1, y)] {
            stack.push((x + 1, y));
        }
        if y > 0 && !ignored[idx(x, y - 1)] {
            stack.push((x, y - 1));
        }
        if y + 1 < height && !ignored[idx(x, y + 1)] {
            stack.push((x, y + 1));
        }
    }

    marked
}

/// 8-bit rendering of a masked image with ignored pixels painted [`DEBUG_MARKER`].
pub fn debug_snapshot(masked: &Rgba16Image) -> RgbaImage {
    let (w, h) = masked.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        let [r, g, b, a] = masked.get_pixel(x, y).0;
        if a == 0 {
            DEBUG_MARKER
        } else {
            Rgba([(r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, (a >> 8) as u8])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    const WHITE: Rgba<u16> = Rgba([0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF]);
    const DARK: Rgba<u16> = Rgba([0x0A0A, 0x0A0A, 0x0A0A, 0xFFFF]);

    fn rgb16(r: u16, g: u16, b: u16) -> Rgba<u16> {
        Rgba([r, g, b, 0xFFFF])
    }

    /// Build an image from rows of `#` (foreground) and `.` (white).
    fn from_ascii(rows: &[&str]) -> Rgba16Image {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        ImageBuffer::from_fn(w, h, |x, y| {
            match rows[y as usize].as_bytes()[x as usize] {
                b'#' => DARK,
                _ => WHITE,
            }
        })
    }

    fn count_marked(img: &Rgba16Image) -> usize {
        img.pixels().filter(|p| p.0[3] == 0).count()
    }

    #[test]
    fn test_white_black_predicates() {
        assert!(MASK_WHITE.matches(&rgb16(0xC000, 0xFFFF, 0xD000)));
        assert!(!MASK_WHITE.matches(&rgb16(0xBFFF, 0xFFFF, 0xFFFF)));
        assert!(MASK_BLACK.matches(&rgb16(0x5000, 0, 0x1000)));
        assert!(!MASK_BLACK.matches(&rgb16(0x5001, 0, 0)));
    }

    #[test]
    fn test_green_ratio_predicate() {
        assert!(MASK_GREEN.matches(&rgb16(0x1000, 0xF000, 0x2000)));
        // red at 95% of green is too close
        assert!(!MASK_GREEN.matches(&rgb16(0xE400, 0xF000, 0x0000)));
    }

    #[test]
    fn test_zero_base_policy() {
        // black pixel: 0/0 counts as a match
        assert!(MASK_GREEN.matches(&rgb16(0, 0, 0)));
        // any other channel over a zero base never matches
        assert!(!MASK_GREEN.matches(&rgb16(1, 0, 0)));
    }

    #[test]
    fn test_transparent_always_matches() {
        let clear = Rgba([0, 0, 0, 0]);
        assert!(MASK_WHITE.matches(&clear));
        assert!(MASK_BLACK.matches(&clear));
        assert!(MASK_GREEN.matches(&clear));
    }

    #[test]
    fn test_first_matching_mask_wins() {
        let img = ImageBuffer::from_pixel(3, 3, Rgba([0, 0, 0, 0]));
        assert_eq!(select_mask(&img, &default_masks()), Some(MASK_WHITE));

        let img = ImageBuffer::from_pixel(3, 3, rgb16(0, 0x8000, 0));
        assert_eq!(select_mask(&img, &default_masks()), Some(MASK_GREEN));
    }

    #[test]
    fn test_no_mask_leaves_image_untouched() {
        let img = from_ascii(&["#..", "...", "..."]);
        let outcome = apply_mask(&img, &default_masks());
        assert_eq!(outcome.spec, None);
        assert_eq!(outcome.ignored, 0);
        assert_eq!(outcome.image, img);
    }

    #[test]
    fn test_enclosed_region_survives() {
        // the white center is enclosed by the dark ring and must not be masked
        let img = from_ascii(&[
            ".......", //
            ".#####.", //
            ".#...#.", //
            ".#...#.", //
            ".#####.", //
            ".......",
        ]);
        let outcome = apply_mask(&img, &[MASK_WHITE]);
        assert_eq!(outcome.spec, Some(MASK_WHITE));
        // outer border only: 2*7 + 2*4
        assert_eq!(outcome.ignored, 22);
        assert_eq!(count_marked(&outcome.image), 22);
        assert_eq!(*outcome.image.get_pixel(3, 3), WHITE);
    }

    #[test]
    fn test_fill_does_not_cross_diagonals() {
        let img = from_ascii(&[
            "..#..", //
            ".#.#.", //
            "#...#", //
            ".#.#.", //
            "..#..",
        ]);
        let outcome = apply_mask(&img, &[MASK_WHITE]);
        // four corner triangles of three pixels each
        assert_eq!(outcome.ignored, 12);
        assert_eq!(*outcome.image.get_pixel(2, 2), WHITE);
    }

    #[test]
    fn test_preexisting_transparency_blocks_fill() {
        let mut img = from_ascii(&["...", "...", "..."]);
        // wall of transparent pixels down the middle column
        for y in 0..3 {
            img.put_pixel(1, y, Rgba([0, 0, 0, 0]));
        }
        let outcome = apply_mask(&img, &[MASK_WHITE]);
        assert_eq!(outcome.ignored, 6);
        assert_eq!(count_marked(&outcome.image), 9);
    }

    #[test]
    fn test_large_image_fill() {
        let img = ImageBuffer::from_pixel(400, 300, WHITE);
        let outcome = apply_mask(&img, &[MASK_WHITE]);
        assert_eq!(outcome.ignored, 400 * 300);
    }

    #[test]
    fn test_debug_snapshot_marks_ignored() {
        let img = from_ascii(&["...", ".#.", "..."]);
        let outcome = apply_mask(&img, &[MASK_WHITE]);
        let snap = debug_snapshot(&outcome.image);
        assert_eq!(*snap.get_pixel(0, 0), DEBUG_MARKER);
        assert_eq!(*snap.get_pixel(1, 1), Rgba([10, 10, 10, 255]));
    }
}
