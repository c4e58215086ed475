use image::Rgba;
use palette::{FromColor, Hsl, Srgb};

/// Hue step between consecutive colours, the golden angle in degrees.
const HUE_STEP: f32 = 137.507_77;

/// Generates `n` outline colours whose neighbours in the sequence differ
/// strongly in hue, however large `n` gets.
pub(crate) fn outline_colors(n: usize, alpha: u8) -> Vec<Rgba<u8>> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 * HUE_STEP) % 360.0;
            let srgb: Srgb<u8> = Srgb::from_color(Hsl::new(hue, 0.9, 0.5)).into_format();
            Rgba([srgb.red, srgb.green, srgb.blue, alpha])
        })
        .collect()
}
