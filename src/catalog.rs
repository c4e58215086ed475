//! Enumeration of discrete objects on a reference slice of a mask volume.

use image::math::Rect;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::contours::BoundaryPolygon;
use crate::error::{ConfigError, NucleusError, Result, Stage};
use crate::primitives::{Particle, ParticleFilter, PrimitiveLibrary};
use crate::volume::MaskVolume;

/// One object found on the reference slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub centroid: (f64, f64),
    /// 1-based slice the object was catalogued on.
    pub reference_slice: usize,
    /// Pixel count of the component.
    pub area: f64,
    pub perimeter: f64,
    /// Shape factor capped at 1, as used for filtering.
    pub circularity: f64,
    #[serde(with = "rect_serde")]
    pub bounding_box: Rect,
    #[serde(skip)]
    pub outline: BoundaryPolygon,
}

impl CatalogEntry {
    fn from_particle(particle: Particle, reference_slice: usize) -> Self {
        Self {
            centroid: particle.centroid,
            reference_slice,
            area: particle.area,
            perimeter: particle.perimeter,
            circularity: particle.circularity,
            bounding_box: particle.bounding_box,
            outline: particle.outline,
        }
    }
}

/// Lists the objects on `reference_slice` (1-based) of `mask` that pass
/// `filter`, in raster order of their first pixel.
///
/// The order is deterministic for one input but not a contract; compare sorted
/// centroids when checking results.
pub fn catalog<P>(
    primitives: &P,
    mask: &MaskVolume,
    reference_slice: usize,
    filter: &ParticleFilter,
) -> Result<Vec<CatalogEntry>>
where
    P: PrimitiveLibrary + ?Sized,
{
    let slice = reference_slice
        .checked_sub(1)
        .and_then(|i| mask.slice(i))
        .ok_or(ConfigError::ReferenceSlice {
            slice: reference_slice,
            slices: mask.len(),
        })?;

    let particles = primitives
        .analyze_particles(slice, filter)
        .map_err(NucleusError::stage(Stage::Catalog, Some(reference_slice)))?;

    for p in &particles {
        debug!(
            "particle at ({:.1}, {:.1}): area {}, circularity {:.3}",
            p.centroid.0, p.centroid.1, p.area, p.circularity
        );
    }
    info!(
        "catalogued {} object(s) on slice {reference_slice}",
        particles.len()
    );

    Ok(particles
        .into_iter()
        .map(|p| CatalogEntry::from_particle(p, reference_slice))
        .collect())
}

/// `image::math::Rect` has no serde support.
mod rect_serde {
    use image::math::Rect;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct RectDef {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    }

    pub fn serialize<S: Serializer>(rect: &Rect, serializer: S) -> Result<S::Ok, S::Error> {
        RectDef {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rect, D::Error> {
        let r = RectDef::deserialize(deserializer)?;
        Ok(Rect {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        })
    }
}
