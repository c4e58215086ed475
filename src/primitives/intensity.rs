//! Point-wise intensity operations.

use image::GrayImage;
use imageproc::stats::histogram;

use crate::volume::{IN_VALUE, OUT_VALUE};

/// Raises every sample below `floor` to `floor`.
pub fn clamp_min(slice: &GrayImage, floor: u8) -> GrayImage {
    let mut out = slice.clone();
    for p in out.pixels_mut() {
        p.0[0] = p.0[0].max(floor);
    }
    out
}

/// Histogram equalization weighted by the square root of each bin count.
///
/// Plain cumulative equalization maps a small bright object on a large uniform
/// background to nearly the same value as the background. Weighting the bins
/// by `sqrt(count)` keeps such objects well separated. Levels 0 and 255 are
/// fixed points.
pub fn equalize(slice: &GrayImage) -> GrayImage {
    let hist = &histogram(slice).channels[0];
    let weight = |i: usize| f64::from(hist[i]).sqrt();

    let mut total = weight(0) + weight(255);
    for i in 1..255 {
        total += 2.0 * weight(i);
    }
    if total <= 0.0 {
        return slice.clone();
    }
    let scale = 255.0 / total;

    let mut lut = [0u8; 256];
    let mut sum = 0.0;
    for (i, entry) in lut.iter_mut().enumerate().take(255).skip(1) {
        let delta = weight(i);
        sum += delta;
        *entry = (sum * scale).round().clamp(0.0, 255.0) as u8;
        sum += delta;
    }
    lut[255] = 255;

    let mut out = slice.clone();
    for p in out.pixels_mut() {
        p.0[0] = lut[p.0[0] as usize];
    }
    out
}

/// Binary mask of the samples within `[min, max]` (inclusive).
pub fn threshold_band(slice: &GrayImage, min: u8, max: u8) -> GrayImage {
    let mut out = slice.clone();
    for p in out.pixels_mut() {
        let v = p.0[0];
        p.0[0] = if (min..=max).contains(&v) {
            IN_VALUE
        } else {
            OUT_VALUE
        };
    }
    out
}
