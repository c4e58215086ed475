//! Seed detection on a single slice.

use image::GrayImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{NucleusError, PrimitiveError, Result, Stage};
use crate::primitives::PrimitiveLibrary;

/// An approximate interior pixel of a candidate object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedPoint {
    pub x: u32,
    pub y: u32,
    /// 1-based slice the seed was found on.
    pub slice: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedParams {
    /// Samples below this value are raised to it before normalization.
    pub min_intensity_cutoff: u8,
    /// Radius of the minimum filter that removes small bright specks.
    pub min_filter_radius: f64,
    /// Blur merging nearby maxima into one basin.
    pub blur_sigma: f64,
    pub noise_tolerance: f64,
}

/// Finds seed points on `slice` (1-based index `slice_index`).
///
/// The slice is floored at the intensity cutoff, equalized, minimum filtered
/// and blurred before local maxima are taken. A slice without any prominent
/// maximum, a constant one for instance, yields no seeds.
pub fn find_seeds<P>(
    primitives: &P,
    slice: &GrayImage,
    slice_index: usize,
    params: &SeedParams,
) -> Result<Vec<SeedPoint>>
where
    P: PrimitiveLibrary + ?Sized,
{
    let failed =
        |e: PrimitiveError| NucleusError::stage(Stage::SeedFinding, Some(slice_index))(e);

    let floored = primitives
        .clamp_min(slice, params.min_intensity_cutoff)
        .map_err(failed)?;
    let normalized = primitives.equalize(&floored).map_err(failed)?;
    let filtered = primitives
        .minimum_filter(&normalized, params.min_filter_radius)
        .map_err(failed)?;
    let blurred = primitives
        .gaussian_blur(&filtered, params.blur_sigma)
        .map_err(failed)?;
    let maxima = primitives
        .find_maxima(&blurred, params.noise_tolerance)
        .map_err(failed)?;

    debug!("slice {slice_index}: {} seed(s)", maxima.len());
    Ok(maxima
        .into_iter()
        .map(|(x, y)| SeedPoint {
            x,
            y,
            slice: slice_index,
        })
        .collect())
}
