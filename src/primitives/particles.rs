//! Connected-component particle analysis with size and shape filters.

use image::math::Rect;
use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::contours::{BoundaryPolygon, circularity};
use crate::rect::{bounding_box, touches_border};
use crate::volume::OUT_VALUE;

use super::wand::trace_outline;

/// Bounds a particle must satisfy to be reported. All bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleFilter {
    pub min_area: f64,
    pub max_area: f64,
    pub min_circularity: f64,
    pub max_circularity: f64,
    /// Drop particles whose bounding box reaches the image border.
    pub exclude_edges: bool,
}

/// One 8-connected foreground component.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Mean of the pixel centres, `(x + 0.5, y + 0.5)`.
    pub centroid: (f64, f64),
    /// Number of foreground pixels.
    pub area: f64,
    /// Traced perimeter of the outer outline.
    pub perimeter: f64,
    /// `4π·area / perimeter²`, capped at 1.
    pub circularity: f64,
    pub bounding_box: Rect,
    pub outline: BoundaryPolygon,
}

#[derive(Debug, Clone, Copy)]
struct Component {
    first: (u32, u32),
    count: u64,
    sum_x: f64,
    sum_y: f64,
}

/// Finds the particles of `mask` that pass `filter`, in raster order of each
/// particle's first pixel.
pub fn analyze_particles(mask: &GrayImage, filter: &ParticleFilter) -> Vec<Particle> {
    let (width, height) = mask.dimensions();
    let labels = connected_components(mask, Connectivity::Eight, Luma([OUT_VALUE]));

    let mut components: Vec<Option<Component>> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0] as usize;
        if label == 0 {
            continue;
        }
        if components.len() <= label {
            components.resize(label + 1, None);
        }
        let component = components[label].get_or_insert(Component {
            first: (x, y),
            count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
        });
        component.count += 1;
        component.sum_x += f64::from(x) + 0.5;
        component.sum_y += f64::from(y) + 0.5;
    }

    let mut components: Vec<Component> = components.into_iter().flatten().collect();
    components.sort_by_key(|c| (c.first.1, c.first.0));

    components
        .into_iter()
        .filter_map(|c| {
            let outline = trace_outline(mask, c.first.0, c.first.1);
            let bounding_box = bounding_box(&outline.points)?;
            if filter.exclude_edges && touches_border(&bounding_box, width, height) {
                return None;
            }

            let area = c.count as f64;
            let perimeter = outline.perimeter();
            let circularity = circularity(area, perimeter).min(1.0);

            let keep = (filter.min_area..=filter.max_area).contains(&area)
                && (filter.min_circularity..=filter.max_circularity).contains(&circularity);
            keep.then(|| Particle {
                centroid: (c.sum_x / area, c.sum_y / area),
                area,
                perimeter,
                circularity,
                bounding_box,
                outline,
            })
        })
        .collect()
}
