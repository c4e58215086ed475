//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::growth::{ContourRegion, GrowthParams};
use crate::mask_stack::StackParams;
use crate::nested::NestedParams;
use crate::primitives::ParticleFilter;
use crate::seeds::SeedParams;
use crate::volume::Volume;

/// Every option of a segmentation run.
///
/// Missing fields take their default when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Intensity floor applied before seed detection.
    pub seed_min_cutoff: u8,
    /// Minimum filter radius used for seed detection.
    pub seed_min_radius: f64,
    pub seed_gb_sigma: f64,
    /// Noise tolerance of the maxima finder.
    pub seed_max_noise: f64,
    /// Minimum filter radius before growth; its floor is the dilation count.
    pub segm_min_radius: f64,
    /// Fast marching grey level threshold.
    pub segm_fm_grey: f64,
    /// Fast marching distance threshold, in `[0, 1)`.
    pub segm_fm_dist: f64,
    /// Smooth the mask stack in 3D.
    pub segm_gauss: bool,
    pub bin_min: u8,
    pub bin_max: u8,
    pub min_particle_circularity: f64,
    pub max_particle_circularity: f64,
    pub min_particle_size: f64,
    pub max_particle_size: f64,
    pub slice_thickness: f64,
    /// 1-based slice objects are catalogued on.
    pub reference_slice: usize,
    pub nested_blur_sigma: f64,
    pub smoothing_sigma: f64,
    /// Open the nested mask (one erosion, one dilation).
    pub nested_opening: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            seed_min_cutoff: 128,
            seed_min_radius: 10.0,
            seed_gb_sigma: 20.0,
            seed_max_noise: 10.0,
            segm_min_radius: 3.0,
            segm_fm_grey: 50.0,
            segm_fm_dist: 0.01,
            segm_gauss: true,
            bin_min: 60,
            bin_max: 100,
            min_particle_circularity: 0.5,
            max_particle_circularity: 1.0,
            min_particle_size: 50.0,
            max_particle_size: 999_999.0,
            slice_thickness: 1.0,
            reference_slice: 1,
            nested_blur_sigma: 2.0,
            smoothing_sigma: 2.0,
            nested_opening: true,
        }
    }
}

fn check(ok: bool, name: &'static str, value: f64, reason: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            value,
            reason,
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    check(
        value.is_finite() && value > 0.0,
        name,
        value,
        "must be positive and finite",
    )
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    check(
        value.is_finite() && value >= 0.0,
        name,
        value,
        "must be non-negative and finite",
    )
}

fn ordered(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min > max || min.is_nan() || max.is_nan() {
        Err(ConfigError::InvertedRange { name, min, max })
    } else {
        Ok(())
    }
}

impl SegmentationConfig {
    /// Checks the options against each other and against `volume`.
    pub fn validate(&self, volume: &Volume) -> Result<(), ConfigError> {
        non_negative("seed_min_radius", self.seed_min_radius)?;
        positive("seed_gb_sigma", self.seed_gb_sigma)?;
        non_negative("seed_max_noise", self.seed_max_noise)?;
        non_negative("segm_min_radius", self.segm_min_radius)?;
        positive("segm_fm_grey", self.segm_fm_grey)?;
        check(
            (0.0..1.0).contains(&self.segm_fm_dist),
            "segm_fm_dist",
            self.segm_fm_dist,
            "must be within [0, 1)",
        )?;
        for (name, radius) in [
            ("seed_min_radius", self.seed_min_radius),
            ("segm_min_radius", self.segm_min_radius),
        ] {
            check(radius <= 255.0, name, radius, "must not exceed 255")?;
        }

        ordered(
            "threshold band",
            f64::from(self.bin_min),
            f64::from(self.bin_max),
        )?;
        ordered(
            "particle circularity",
            self.min_particle_circularity,
            self.max_particle_circularity,
        )?;
        ordered(
            "particle size",
            self.min_particle_size,
            self.max_particle_size,
        )?;

        positive("slice_thickness", self.slice_thickness)?;
        positive("nested_blur_sigma", self.nested_blur_sigma)?;
        positive("smoothing_sigma", self.smoothing_sigma)?;

        if !(1..=volume.len()).contains(&self.reference_slice) {
            return Err(ConfigError::ReferenceSlice {
                slice: self.reference_slice,
                slices: volume.len(),
            });
        }
        Ok(())
    }

    pub fn seed_params(&self) -> SeedParams {
        SeedParams {
            min_intensity_cutoff: self.seed_min_cutoff,
            min_filter_radius: self.seed_min_radius,
            blur_sigma: self.seed_gb_sigma,
            noise_tolerance: self.seed_max_noise,
        }
    }

    /// Growth rendered outside the contour, as the mask stack expects.
    pub fn growth_params(&self) -> GrowthParams {
        GrowthParams {
            min_filter_radius: self.segm_min_radius,
            grey_threshold: self.segm_fm_grey,
            distance_threshold: self.segm_fm_dist,
            region: ContourRegion::Outside,
        }
    }

    pub fn stack_params(&self) -> StackParams {
        StackParams {
            dilation_count: self.segm_min_radius.floor() as usize,
            fill_holes: true,
            smooth3d: self.segm_gauss,
            smoothing_sigma: self.smoothing_sigma,
        }
    }

    pub fn nested_params(&self) -> NestedParams {
        NestedParams {
            bin_min: self.bin_min,
            bin_max: self.bin_max,
            blur_sigma: self.nested_blur_sigma,
            erode_then_dilate: self.nested_opening,
        }
    }

    /// Particle bounds of the object catalog. Border objects are always
    /// excluded.
    pub fn particle_filter(&self) -> ParticleFilter {
        ParticleFilter {
            min_area: self.min_particle_size,
            max_area: self.max_particle_size,
            min_circularity: self.min_particle_circularity,
            max_circularity: self.max_particle_circularity,
            exclude_edges: true,
        }
    }
}
