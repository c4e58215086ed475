//! Image-processing primitives the segmentation pipeline is built from.
//!
//! The pipeline only talks to the [`PrimitiveLibrary`] trait, one typed method
//! per operation. [`StandardPrimitives`] implements it on top of [`imageproc`]
//! and the numerics in the submodules.

pub mod fast_marching;
pub mod filter;
pub mod intensity;
pub mod maxima;
pub mod morphology;
pub mod particles;
pub mod wand;

use image::GrayImage;

use crate::contours::BoundaryPolygon;
use crate::error::PrimitiveError;

pub use fast_marching::FastMarchingParams;
pub use particles::{Particle, ParticleFilter};

/// Typed interface to the image-processing operations used by the pipeline.
///
/// Every method is pure: inputs are borrowed and a new image is returned.
/// Implementations must keep binary masks binary (`{0, 255}`) in the
/// morphology methods.
pub trait PrimitiveLibrary: Sync {
    /// Raises samples below `floor` to `floor`.
    fn clamp_min(&self, slice: &GrayImage, floor: u8) -> Result<GrayImage, PrimitiveError>;

    /// Contrast normalization by histogram equalization.
    fn equalize(&self, slice: &GrayImage) -> Result<GrayImage, PrimitiveError>;

    /// Grayscale minimum filter over a disk of `radius` pixels.
    fn minimum_filter(&self, slice: &GrayImage, radius: f64) -> Result<GrayImage, PrimitiveError>;

    fn gaussian_blur(&self, slice: &GrayImage, sigma: f64) -> Result<GrayImage, PrimitiveError>;

    /// Gaussian blur across a whole stack, `sigma` along every axis.
    fn gaussian_blur_3d(
        &self,
        slices: &[GrayImage],
        sigma: f64,
    ) -> Result<Vec<GrayImage>, PrimitiveError>;

    /// Local maxima standing out by more than `noise_tolerance`.
    fn find_maxima(
        &self,
        slice: &GrayImage,
        noise_tolerance: f64,
    ) -> Result<Vec<(u32, u32)>, PrimitiveError>;

    /// Region grown from `seeds`, `IN_VALUE` inside.
    fn grow_region(
        &self,
        slice: &GrayImage,
        seeds: &[(u32, u32)],
        params: &FastMarchingParams,
    ) -> Result<GrayImage, PrimitiveError>;

    fn dilate(&self, mask: &GrayImage) -> Result<GrayImage, PrimitiveError>;

    fn erode(&self, mask: &GrayImage) -> Result<GrayImage, PrimitiveError>;

    fn fill_holes(&self, mask: &GrayImage) -> Result<GrayImage, PrimitiveError>;

    /// Binary mask of samples within `[min, max]`.
    fn threshold_band(&self, slice: &GrayImage, min: u8, max: u8)
    -> Result<GrayImage, PrimitiveError>;

    /// Outline of the foreground region containing `(x, y)`; empty on
    /// background.
    fn trace_outline(&self, mask: &GrayImage, x: u32, y: u32)
    -> Result<BoundaryPolygon, PrimitiveError>;

    fn analyze_particles(
        &self,
        mask: &GrayImage,
        filter: &ParticleFilter,
    ) -> Result<Vec<Particle>, PrimitiveError>;
}

/// The built-in [`PrimitiveLibrary`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPrimitives;

fn positive(name: &'static str, value: f64) -> Result<f32, PrimitiveError> {
    if value.is_finite() && value > 0.0 {
        Ok(value as f32)
    } else {
        Err(PrimitiveError::InvalidParameter {
            name,
            value,
            reason: "must be positive and finite",
        })
    }
}

fn radius(value: f64) -> Result<u8, PrimitiveError> {
    if value.is_finite() && (0.0..=f64::from(u8::MAX)).contains(&value) {
        Ok(value.round() as u8)
    } else {
        Err(PrimitiveError::InvalidParameter {
            name: "radius",
            value,
            reason: "must be within 0..=255",
        })
    }
}

impl PrimitiveLibrary for StandardPrimitives {
    fn clamp_min(&self, slice: &GrayImage, floor: u8) -> Result<GrayImage, PrimitiveError> {
        Ok(intensity::clamp_min(slice, floor))
    }

    fn equalize(&self, slice: &GrayImage) -> Result<GrayImage, PrimitiveError> {
        Ok(intensity::equalize(slice))
    }

    fn minimum_filter(&self, slice: &GrayImage, radius: f64) -> Result<GrayImage, PrimitiveError> {
        Ok(filter::minimum_filter(slice, self::radius(radius)?))
    }

    fn gaussian_blur(&self, slice: &GrayImage, sigma: f64) -> Result<GrayImage, PrimitiveError> {
        Ok(filter::gaussian_blur(slice, positive("sigma", sigma)?))
    }

    fn gaussian_blur_3d(
        &self,
        slices: &[GrayImage],
        sigma: f64,
    ) -> Result<Vec<GrayImage>, PrimitiveError> {
        let sigma = positive("sigma", sigma)?;
        if let Some(first) = slices.first() {
            let expected = first.dimensions();
            if let Some(other) = slices.iter().find(|s| s.dimensions() != expected) {
                return Err(PrimitiveError::DimensionMismatch {
                    expected,
                    found: other.dimensions(),
                });
            }
        }
        Ok(filter::gaussian_blur_3d(slices, sigma))
    }

    fn find_maxima(
        &self,
        slice: &GrayImage,
        noise_tolerance: f64,
    ) -> Result<Vec<(u32, u32)>, PrimitiveError> {
        if !noise_tolerance.is_finite() || noise_tolerance < 0.0 {
            return Err(PrimitiveError::InvalidParameter {
                name: "noise_tolerance",
                value: noise_tolerance,
                reason: "must be non-negative and finite",
            });
        }
        Ok(maxima::find_maxima(slice, noise_tolerance))
    }

    fn grow_region(
        &self,
        slice: &GrayImage,
        seeds: &[(u32, u32)],
        params: &FastMarchingParams,
    ) -> Result<GrayImage, PrimitiveError> {
        positive("grey_threshold", params.grey_threshold)?;
        let distance = params.distance_threshold;
        if !(0.0..1.0).contains(&distance) {
            return Err(PrimitiveError::InvalidParameter {
                name: "distance_threshold",
                value: distance,
                reason: "must be within [0, 1)",
            });
        }
        Ok(fast_marching::grow_region(slice, seeds, params))
    }

    fn dilate(&self, mask: &GrayImage) -> Result<GrayImage, PrimitiveError> {
        Ok(morphology::dilate(mask))
    }

    fn erode(&self, mask: &GrayImage) -> Result<GrayImage, PrimitiveError> {
        Ok(morphology::erode(mask))
    }

    fn fill_holes(&self, mask: &GrayImage) -> Result<GrayImage, PrimitiveError> {
        Ok(morphology::fill_holes(mask))
    }

    fn threshold_band(
        &self,
        slice: &GrayImage,
        min: u8,
        max: u8,
    ) -> Result<GrayImage, PrimitiveError> {
        if min > max {
            return Err(PrimitiveError::InvalidParameter {
                name: "threshold minimum",
                value: f64::from(min),
                reason: "exceeds the threshold maximum",
            });
        }
        Ok(intensity::threshold_band(slice, min, max))
    }

    fn trace_outline(
        &self,
        mask: &GrayImage,
        x: u32,
        y: u32,
    ) -> Result<BoundaryPolygon, PrimitiveError> {
        Ok(wand::trace_outline(mask, x, y))
    }

    fn analyze_particles(
        &self,
        mask: &GrayImage,
        filter: &ParticleFilter,
    ) -> Result<Vec<Particle>, PrimitiveError> {
        Ok(particles::analyze_particles(mask, filter))
    }
}
