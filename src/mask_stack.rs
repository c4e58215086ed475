//! Assembly and cleanup of per-slice masks into a mask volume.

use image::GrayImage;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{NucleusError, PrimitiveError, Result, Stage};
use crate::primitives::PrimitiveLibrary;
use crate::primitives::morphology::invert;
use crate::volume::{MaskVolume, Volume, binarize_slice};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackParams {
    /// Dilation passes compensating the minimum filter used during growth.
    pub dilation_count: usize,
    pub fill_holes: bool,
    /// Smooth across slices with a 3D blur and re-threshold.
    pub smooth3d: bool,
    pub smoothing_sigma: f64,
}

/// Stacks `masks` in order and cleans them up.
///
/// The masks are inverted, dilated `dilation_count` times, hole filled when
/// requested and finally, with `smooth3d`, blurred in 3D and re-thresholded
/// at 128. Growth rendered with [`ContourRegion::Outside`] therefore ends up
/// as foreground.
///
/// [`ContourRegion::Outside`]: crate::growth::ContourRegion::Outside
pub fn build<P>(primitives: &P, masks: Vec<GrayImage>, params: &StackParams) -> Result<MaskVolume>
where
    P: PrimitiveLibrary + ?Sized,
{
    let volume = Volume::new(masks)?;
    info!(
        "building mask stack from {} slice(s), {} dilation(s)",
        volume.len(),
        params.dilation_count
    );

    let cleaned: Vec<GrayImage> = volume
        .slices()
        .par_iter()
        .enumerate()
        .map(|(i, mask)| -> Result<GrayImage> {
            let failed =
                |e: PrimitiveError| NucleusError::stage(Stage::MaskStack, Some(i + 1))(e);

            // Anything that is not background counts as grown.
            let mut slice = invert(&binarize_slice(mask));
            for _ in 0..params.dilation_count {
                slice = primitives.dilate(&slice).map_err(failed)?;
            }
            if params.fill_holes {
                slice = primitives.fill_holes(&slice).map_err(failed)?;
            }
            Ok(slice)
        })
        .collect::<Result<Vec<_>>>()?;

    let cleaned = if params.smooth3d {
        debug!("smoothing mask stack, sigma {}", params.smoothing_sigma);
        primitives
            .gaussian_blur_3d(&cleaned, params.smoothing_sigma)
            .map_err(NucleusError::stage(Stage::MaskStack, None))?
            .iter()
            .map(binarize_slice)
            .collect()
    } else {
        cleaned
    };

    Ok(MaskVolume::from_volume_unchecked(Volume::new(cleaned)?))
}
