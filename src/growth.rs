//! Per-slice contour growth from seed points.

use image::GrayImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{NucleusError, PrimitiveError, Result, Stage};
use crate::primitives::morphology::invert;
use crate::primitives::{FastMarchingParams, PrimitiveLibrary};
use crate::seeds::SeedPoint;
use crate::volume::IN_VALUE;

/// Which side of the grown contour is rendered as foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourRegion {
    /// Grown pixels are `IN_VALUE`.
    #[default]
    Inside,
    /// Everything but the grown pixels is `IN_VALUE`.
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthParams {
    /// Minimum filter applied before marching, tightening bright regions.
    pub min_filter_radius: f64,
    pub grey_threshold: f64,
    pub distance_threshold: f64,
    pub region: ContourRegion,
}

impl GrowthParams {
    fn marching(&self) -> FastMarchingParams {
        FastMarchingParams {
            grey_threshold: self.grey_threshold,
            distance_threshold: self.distance_threshold,
        }
    }
}

/// Grows the contour of every seed on `slice` and renders the result as a
/// full-size binary mask.
///
/// Seeds from other slices or outside the image are ignored. No usable seed,
/// or fronts that all spill to the image border, give an empty grown region.
pub fn grow<P>(
    primitives: &P,
    slice: &GrayImage,
    slice_index: usize,
    seeds: &[SeedPoint],
    params: &GrowthParams,
) -> Result<GrayImage>
where
    P: PrimitiveLibrary + ?Sized,
{
    let failed =
        |e: PrimitiveError| NucleusError::stage(Stage::ContourGrowth, Some(slice_index))(e);

    let (width, height) = slice.dimensions();
    let points: Vec<(u32, u32)> = seeds
        .iter()
        .filter(|s| s.slice == slice_index && s.x < width && s.y < height)
        .map(|s| (s.x, s.y))
        .collect();

    let grown = if points.is_empty() {
        warn!("slice {slice_index}: no seeds, nothing grown");
        GrayImage::new(width, height)
    } else {
        let normalized = primitives.equalize(slice).map_err(failed)?;
        let tightened = primitives
            .minimum_filter(&normalized, params.min_filter_radius)
            .map_err(failed)?;
        primitives
            .grow_region(&tightened, &points, &params.marching())
            .map_err(failed)?
    };

    let area = grown.pixels().filter(|p| p.0[0] == IN_VALUE).count();
    debug!(
        "slice {slice_index}: grew {area} px from {} seed(s)",
        points.len()
    );

    Ok(match params.region {
        ContourRegion::Inside => grown,
        ContourRegion::Outside => invert(&grown),
    })
}
