//! End-to-end segmentation and measurement of a slice stack.

use image::GrayImage;
use log::{info, warn};
use rayon::prelude::*;

use crate::catalog::{CatalogEntry, catalog};
use crate::config::SegmentationConfig;
use crate::error::Result;
use crate::growth::grow;
use crate::mask_apply::apply;
use crate::mask_stack::build;
use crate::morphometrics::compute;
use crate::nested::segment_nested;
use crate::primitives::{PrimitiveLibrary, StandardPrimitives};
use crate::results::ResultsTable;
use crate::seeds::find_seeds;
use crate::volume::{MaskVolume, Volume};

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOutput {
    /// Cleaned mask of the primary objects.
    pub primary_mask: MaskVolume,
    /// Source intensities under the primary mask.
    pub primary_masked: Volume,
    /// Mask of the structures nested in the primary objects.
    pub nested_mask: MaskVolume,
    /// Source intensities under the nested mask.
    pub nested_masked: Volume,
    /// Objects found on the reference slice, in the order of `results`.
    pub objects: Vec<CatalogEntry>,
    pub results: ResultsTable,
}

/// Runs the pipeline with [`StandardPrimitives`].
pub fn run(volume: &Volume, config: &SegmentationConfig) -> Result<SegmentationOutput> {
    run_with(&StandardPrimitives, volume, config)
}

/// Runs the pipeline on `volume` with the given primitives.
///
/// The configuration is validated before any work starts. Slices without
/// seeds or without grown regions are not errors; the first failing primitive
/// aborts the run and no partial output is returned.
pub fn run_with<P>(
    primitives: &P,
    volume: &Volume,
    config: &SegmentationConfig,
) -> Result<SegmentationOutput>
where
    P: PrimitiveLibrary + ?Sized,
{
    config.validate(volume)?;
    let (width, height) = volume.dimensions();
    info!("segmenting {} slice(s) of {width}x{height}", volume.len());

    let seed_params = config.seed_params();
    let growth_params = config.growth_params();
    let grown: Vec<GrayImage> = volume
        .slices()
        .par_iter()
        .enumerate()
        .map(|(i, slice)| -> Result<GrayImage> {
            let index = i + 1;
            let seeds = find_seeds(primitives, slice, index, &seed_params)?;
            if seeds.is_empty() {
                warn!("slice {index}: no seeds found");
            }
            grow(primitives, slice, index, &seeds, &growth_params)
        })
        .collect::<Result<Vec<_>>>()?;

    let primary_mask = build(primitives, grown, &config.stack_params())?;
    info!(
        "primary mask holds {} foreground voxel(s)",
        primary_mask.foreground_count()
    );
    let primary_masked = apply(volume, primary_mask.as_volume())?;

    let nested_mask = segment_nested(primitives, &primary_masked, &config.nested_params())?;
    let nested_masked = apply(volume, nested_mask.as_volume())?;

    let objects = catalog(
        primitives,
        &primary_mask,
        config.reference_slice,
        &config.particle_filter(),
    )?;

    let records = objects
        .par_iter()
        .enumerate()
        .map(|(i, entry)| {
            compute(
                primitives,
                &primary_mask,
                i + 1,
                entry.centroid,
                entry.reference_slice,
                config.slice_thickness,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    info!("measured {} object(s)", records.len());

    Ok(SegmentationOutput {
        primary_mask,
        primary_masked,
        nested_mask,
        nested_masked,
        objects,
        results: ResultsTable::new(records),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contours::BoundaryPolygon;
    use crate::error::{ConfigError, NucleusError, PrimitiveError, Stage};
    use crate::primitives::{FastMarchingParams, Particle, ParticleFilter};
    use crate::volume::{IN_VALUE, OUT_VALUE};
    use image::Luma;

    fn config() -> SegmentationConfig {
        SegmentationConfig {
            seed_min_radius: 2.0,
            seed_gb_sigma: 2.0,
            segm_gauss: false,
            ..Default::default()
        }
    }

    fn bright_squares(specs: &[(u32, u32, u32)]) -> GrayImage {
        GrayImage::from_fn(100, 100, |x, y| {
            let inside = specs.iter().any(|&(x0, y0, side)| {
                (x0..x0 + side).contains(&x) && (y0..y0 + side).contains(&y)
            });
            Luma([if inside { 200 } else { 20 }])
        })
    }

    fn stack(slice: GrayImage, n: usize) -> Volume {
        Volume::new(vec![slice; n]).unwrap()
    }

    #[test]
    fn test_square_stack_measures_one_object() {
        let volume = stack(bright_squares(&[(40, 40, 20)]), 3);
        let output = run(&volume, &config()).unwrap();

        assert_eq!(output.results.len(), 1);
        let record = &output.results.records()[0];
        assert_eq!(record.id, 1);
        assert_eq!(record.centroid, (50.0, 50.0));
        assert_eq!(record.max_area, 400.0);
        assert_eq!(record.volume, 1200.0);
        assert!((record.avg_circularity - 0.8335).abs() < 1e-3);
        assert_eq!(record.density, None);

        // Three dilations restore the square the minimum filter shrank.
        assert_eq!(output.primary_mask.foreground_count(), 3 * 400);
        let masked = output.primary_masked.slice(0).unwrap();
        assert_eq!(masked.get_pixel(50, 50).0[0], 200);
        assert_eq!(masked.get_pixel(5, 5).0[0], 0);

        assert_eq!(output.objects.len(), 1);
        assert_eq!(output.nested_mask.len(), 3);
        assert_eq!(output.nested_masked.len(), 3);
    }

    #[test]
    fn test_smoothing_keeps_the_object() {
        let volume = stack(bright_squares(&[(40, 40, 20)]), 3);
        let config = SegmentationConfig {
            segm_gauss: true,
            ..config()
        };
        let output = run(&volume, &config).unwrap();
        assert_eq!(output.results.len(), 1);
        let record = &output.results.records()[0];
        // Smoothing may round off the corners.
        assert!(
            (380.0..=400.0).contains(&record.max_area),
            "max area {}",
            record.max_area
        );
        assert!(
            output
                .primary_mask
                .iter()
                .all(|s| s.pixels().all(|p| p.0[0] == IN_VALUE || p.0[0] == OUT_VALUE))
        );
    }

    #[test]
    fn test_background_seed_does_not_flood_its_slice() {
        let slice = bright_squares(&[(40, 40, 20)]);
        let config = config();
        let seeds = |slice: usize, x: u32, y: u32| vec![crate::seeds::SeedPoint { x, y, slice }];

        let grown = [(50, 50), (5, 5), (50, 50)]
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| {
                grow(
                    &StandardPrimitives,
                    &slice,
                    i + 1,
                    &seeds(i + 1, x, y),
                    &config.growth_params(),
                )
                .unwrap()
            })
            .collect();
        let mask = build(&StandardPrimitives, grown, &config.stack_params()).unwrap();

        let record = compute(&StandardPrimitives, &mask, 1, (50.0, 50.0), 1, 1.0).unwrap();
        let areas: Vec<f64> = record.slices.iter().map(|s| s.area).collect();
        assert_eq!(areas, vec![400.0, 0.0, 400.0]);
        assert_eq!(record.volume, 800.0);
        assert_eq!(record.max_area, 400.0);
    }

    #[test]
    fn test_blank_stack_finds_nothing() {
        let volume = stack(GrayImage::from_pixel(100, 100, Luma([30])), 2);
        let output = run(&volume, &config()).unwrap();
        assert!(output.results.is_empty());
        assert_eq!(output.primary_mask.foreground_count(), 0);
    }

    #[test]
    fn test_small_objects_are_not_catalogued() {
        // The 6 px square grows to 36 px, below the default size floor of 50.
        let volume = stack(bright_squares(&[(20, 20, 20), (70, 70, 6)]), 2);
        let config = SegmentationConfig {
            seed_min_radius: 1.0,
            segm_min_radius: 1.0,
            ..config()
        };
        let output = run(&volume, &config).unwrap();
        let centroids: Vec<(f64, f64)> = output.results.iter().map(|r| r.centroid).collect();
        assert_eq!(centroids, vec![(30.0, 30.0)]);
    }

    #[test]
    fn test_invalid_configuration_fails_before_processing() {
        let volume = stack(bright_squares(&[(40, 40, 20)]), 2);
        let config = SegmentationConfig {
            bin_min: 200,
            bin_max: 10,
            ..config()
        };
        assert!(matches!(
            run(&volume, &config),
            Err(NucleusError::Config(ConfigError::InvertedRange { .. }))
        ));
    }

    /// Standard primitives except for a blur that always fails.
    struct FailingBlur;

    impl PrimitiveLibrary for FailingBlur {
        fn clamp_min(&self, slice: &GrayImage, floor: u8) -> Result<GrayImage, PrimitiveError> {
            StandardPrimitives.clamp_min(slice, floor)
        }

        fn equalize(&self, slice: &GrayImage) -> Result<GrayImage, PrimitiveError> {
            StandardPrimitives.equalize(slice)
        }

        fn minimum_filter(&self, slice: &GrayImage, radius: f64) -> Result<GrayImage, PrimitiveError> {
            StandardPrimitives.minimum_filter(slice, radius)
        }

        fn gaussian_blur(&self, _: &GrayImage, sigma: f64) -> Result<GrayImage, PrimitiveError> {
            Err(PrimitiveError::InvalidParameter {
                name: "sigma",
                value: sigma,
                reason: "rejected",
            })
        }

        fn gaussian_blur_3d(
            &self,
            slices: &[GrayImage],
            sigma: f64,
        ) -> Result<Vec<GrayImage>, PrimitiveError> {
            StandardPrimitives.gaussian_blur_3d(slices, sigma)
        }

        fn find_maxima(
            &self,
            slice: &GrayImage,
            noise_tolerance: f64,
        ) -> Result<Vec<(u32, u32)>, PrimitiveError> {
            StandardPrimitives.find_maxima(slice, noise_tolerance)
        }

        fn grow_region(
            &self,
            slice: &GrayImage,
            seeds: &[(u32, u32)],
            params: &FastMarchingParams,
        ) -> Result<GrayImage, PrimitiveError> {
            StandardPrimitives.grow_region(slice, seeds, params)
        }

        fn dilate(&self, mask: &GrayImage) -> Result<GrayImage, PrimitiveError> {
            StandardPrimitives.dilate(mask)
        }

        fn erode(&self, mask: &GrayImage) -> Result<GrayImage, PrimitiveError> {
            StandardPrimitives.erode(mask)
        }

        fn fill_holes(&self, mask: &GrayImage) -> Result<GrayImage, PrimitiveError> {
            StandardPrimitives.fill_holes(mask)
        }

        fn threshold_band(
            &self,
            slice: &GrayImage,
            min: u8,
            max: u8,
        ) -> Result<GrayImage, PrimitiveError> {
            StandardPrimitives.threshold_band(slice, min, max)
        }

        fn trace_outline(
            &self,
            mask: &GrayImage,
            x: u32,
            y: u32,
        ) -> Result<BoundaryPolygon, PrimitiveError> {
            StandardPrimitives.trace_outline(mask, x, y)
        }

        fn analyze_particles(
            &self,
            mask: &GrayImage,
            filter: &ParticleFilter,
        ) -> Result<Vec<Particle>, PrimitiveError> {
            StandardPrimitives.analyze_particles(mask, filter)
        }
    }

    #[test]
    fn test_primitive_failures_name_the_stage() {
        let volume = stack(bright_squares(&[(40, 40, 20)]), 1);
        let err = run_with(&FailingBlur, &volume, &config()).unwrap_err();
        assert!(matches!(
            err,
            NucleusError::Stage {
                stage: Stage::SeedFinding,
                slice: Some(1),
                ..
            }
        ));
    }
}
