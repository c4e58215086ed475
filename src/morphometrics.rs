//! Slice-by-slice measurement of one catalogued object.

use log::{debug, warn};

use crate::contours::BoundaryPolygon;
use crate::error::{NucleusError, Result, Stage};
use crate::primitives::PrimitiveLibrary;
use crate::results::{ObjectRecord, SliceStatistics};
use crate::volume::MaskVolume;

/// Measures the object around `centroid` on every slice of `mask`.
///
/// The outline is traced from the pixel under the truncated centroid. Where
/// that pixel is background the slice contributes zero area and zero
/// circularity but still counts toward the circularity average. The volume is
/// the sum of `area * slice_thickness` over all slices.
pub fn compute<P>(
    primitives: &P,
    mask: &MaskVolume,
    id: usize,
    centroid: (f64, f64),
    reference_slice: usize,
    slice_thickness: f64,
) -> Result<ObjectRecord>
where
    P: PrimitiveLibrary + ?Sized,
{
    let (x, y) = start_pixel(centroid);

    let mut slices = Vec::with_capacity(mask.len());
    for (i, slice) in mask.iter().enumerate() {
        let outline = match (x, y) {
            (Some(x), Some(y)) => primitives
                .trace_outline(slice, x, y)
                .map_err(NucleusError::stage(Stage::Morphometrics, Some(i + 1)))?,
            _ => BoundaryPolygon::empty(),
        };
        if outline.is_empty() {
            warn!(
                "object {id}: nothing at ({:.1}, {:.1}) on slice {}",
                centroid.0,
                centroid.1,
                i + 1
            );
        }
        slices.push(SliceStatistics {
            area: outline.area(),
            perimeter: outline.perimeter(),
            circularity: outline.circularity(),
        });
    }

    let mut volume = 0.0;
    let mut max_area = 0.0f64;
    let mut max_circularity = 0.0f64;
    let mut circularity_sum = 0.0;
    for s in &slices {
        volume += s.area * slice_thickness;
        max_area = max_area.max(s.area);
        max_circularity = max_circularity.max(s.circularity);
        circularity_sum += s.circularity;
    }
    let avg_circularity = if slices.is_empty() {
        0.0
    } else {
        circularity_sum / slices.len() as f64
    };

    debug!(
        "object {id}: volume {volume}, max area {max_area}, avg circularity {avg_circularity:.3}"
    );

    Ok(ObjectRecord {
        id,
        centroid,
        reference_slice,
        volume,
        max_area,
        avg_circularity,
        max_circularity,
        density: None,
        slices,
    })
}

/// Truncates centroid coordinates to a pixel. Negative or non-finite values
/// have no pixel.
fn start_pixel((x, y): (f64, f64)) -> (Option<u32>, Option<u32>) {
    let truncate = |v: f64| {
        (v.is_finite() && v >= 0.0 && v < f64::from(u32::MAX)).then(|| v as u32)
    };
    (truncate(x), truncate(y))
}
