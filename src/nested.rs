//! Threshold-based segmentation of structures inside the primary objects.

use image::GrayImage;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, NucleusError, PrimitiveError, Result, Stage};
use crate::primitives::PrimitiveLibrary;
use crate::volume::{IN_VALUE, MaskVolume, Volume};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NestedParams {
    /// Lowest normalized intensity counted as foreground.
    pub bin_min: u8,
    /// Highest normalized intensity counted as foreground.
    pub bin_max: u8,
    pub blur_sigma: f64,
    /// One erosion followed by one dilation to remove speckle.
    pub erode_then_dilate: bool,
}

/// Segments the nested structure of every slice of a masked volume.
///
/// Each slice is equalized, blurred and thresholded to the intensity band
/// `[bin_min, bin_max]`, optionally opened, then hole filled.
pub fn segment_nested<P>(primitives: &P, masked: &Volume, params: &NestedParams) -> Result<MaskVolume>
where
    P: PrimitiveLibrary + ?Sized,
{
    if params.bin_min > params.bin_max {
        return Err(ConfigError::InvertedRange {
            name: "threshold band",
            min: f64::from(params.bin_min),
            max: f64::from(params.bin_max),
        }
        .into());
    }
    info!(
        "segmenting nested structures, band {}..={}",
        params.bin_min, params.bin_max
    );

    let slices = masked
        .slices()
        .par_iter()
        .enumerate()
        .map(|(i, slice)| segment_slice(primitives, slice, i + 1, params))
        .collect::<Result<Vec<_>>>()?;

    Ok(MaskVolume::from_volume_unchecked(Volume::new(slices)?))
}

fn segment_slice<P>(
    primitives: &P,
    slice: &GrayImage,
    slice_index: usize,
    params: &NestedParams,
) -> Result<GrayImage>
where
    P: PrimitiveLibrary + ?Sized,
{
    let failed =
        |e: PrimitiveError| NucleusError::stage(Stage::NestedSegmentation, Some(slice_index))(e);

    let normalized = primitives.equalize(slice).map_err(failed)?;
    let blurred = primitives
        .gaussian_blur(&normalized, params.blur_sigma)
        .map_err(failed)?;
    let mut mask = primitives
        .threshold_band(&blurred, params.bin_min, params.bin_max)
        .map_err(failed)?;
    if params.erode_then_dilate {
        mask = primitives.erode(&mask).map_err(failed)?;
        mask = primitives.dilate(&mask).map_err(failed)?;
    }
    let mask = primitives.fill_holes(&mask).map_err(failed)?;

    debug!(
        "slice {slice_index}: {} nested px",
        mask.pixels().filter(|p| p.0[0] == IN_VALUE).count()
    );
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::StandardPrimitives;
    use crate::volume::OUT_VALUE;
    use image::Luma;

    const PARAMS: NestedParams = NestedParams {
        bin_min: 120,
        bin_max: 255,
        blur_sigma: 1.0,
        erode_then_dilate: true,
    };

    /// A dim nucleus with a bright nucleolus and a single bright speck.
    /// Equalized, the nucleus maps to 69 and the bright samples to 157.
    fn nucleus() -> GrayImage {
        GrayImage::from_fn(60, 60, |x, y| {
            let nucleus = (10..50).contains(&x) && (10..50).contains(&y);
            let nucleolus = (25..35).contains(&x) && (25..35).contains(&y);
            let speck = (x, y) == (15, 15);
            Luma(match (nucleolus || speck, nucleus) {
                (true, _) => [220],
                (false, true) => [90],
                (false, false) => [0],
            })
        })
    }

    #[test]
    fn test_bright_core_is_segmented_and_speck_removed() {
        let masked = Volume::new(vec![nucleus(), nucleus()]).unwrap();
        let mask = segment_nested(&StandardPrimitives, &masked, &PARAMS).unwrap();
        assert_eq!(mask.len(), 2);
        let slice = mask.slice(1).unwrap();
        assert_eq!(slice.get_pixel(30, 30).0[0], IN_VALUE);
        assert_eq!(slice.get_pixel(15, 15).0[0], OUT_VALUE);
        assert_eq!(slice.get_pixel(12, 40).0[0], OUT_VALUE);
        assert!(
            slice
                .pixels()
                .all(|p| p.0[0] == IN_VALUE || p.0[0] == OUT_VALUE)
        );
    }

    #[test]
    fn test_inverted_band_is_a_configuration_error() {
        let params = NestedParams {
            bin_min: 120,
            bin_max: 60,
            ..PARAMS
        };
        let masked = Volume::new(vec![nucleus()]).unwrap();
        assert!(matches!(
            segment_nested(&StandardPrimitives, &masked, &params),
            Err(NucleusError::Config(ConfigError::InvertedRange { .. }))
        ));
    }
}
