//! Outline overlays of catalogued objects.
//!
//! An optional offline helper for inspecting results; the pipeline itself
//! never renders anything.

use image::buffer::ConvertBuffer;
use image::{GrayImage, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::catalog::CatalogEntry;
use crate::colors::outline_colors;

/// Draws the outline of every entry on an RGBA copy of `slice`, one colour per
/// entry.
///
/// Outline vertices lie on pixel corners, so the top and left edges of an
/// object are drawn on its own border pixels and the bottom and right edges
/// just outside it.
pub fn draw_object_outlines(slice: &GrayImage, entries: &[CatalogEntry]) -> RgbaImage {
    let mut canvas: RgbaImage = slice.convert();
    let colors = outline_colors(entries.len(), 255);

    for (entry, color) in entries.iter().zip(colors) {
        let points = &entry.outline.points;
        for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
            draw_line_segment_mut(
                &mut canvas,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                color,
            );
        }
    }

    canvas
}
