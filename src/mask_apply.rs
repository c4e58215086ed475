//! Masking of intensity volumes.

use image::GrayImage;
use rayon::prelude::*;

use crate::error::ConfigError;
use crate::volume::Volume;

/// Pointwise `source & mask`, slice by slice.
///
/// Both volumes must have the same slice count and slice dimensions.
pub fn apply(source: &Volume, mask: &Volume) -> Result<Volume, ConfigError> {
    source.ensure_same_shape(mask)?;

    let slices = source
        .slices()
        .par_iter()
        .zip(mask.slices().par_iter())
        .map(|(s, m)| apply_slice(s, m))
        .collect();
    Volume::new(slices)
}

fn apply_slice(source: &GrayImage, mask: &GrayImage) -> GrayImage {
    let mut out = source.clone();
    for (p, m) in out.pixels_mut().zip(mask.pixels()) {
        p.0[0] &= m.0[0];
    }
    out
}
