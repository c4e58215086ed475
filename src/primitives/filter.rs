//! Neighbourhood filters on slices and volumes.

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{Mask, grayscale_erode};
use rayon::prelude::*;

/// Grayscale minimum over a disk of the given radius (in pixels).
///
/// A radius that rounds to zero leaves the slice unchanged.
pub fn minimum_filter(slice: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return slice.clone();
    }
    grayscale_erode(slice, &Mask::disk(radius))
}

/// 2D Gaussian blur. `sigma` must be positive.
pub fn gaussian_blur(slice: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(slice, sigma)
}

/// Separable 3D Gaussian blur with the same `sigma` along x, y and z.
///
/// Slices are blurred in-plane first, then each pixel column is convolved
/// along z with edge samples repeated past the first and last slice.
pub fn gaussian_blur_3d(slices: &[GrayImage], sigma: f32) -> Vec<GrayImage> {
    let planar: Vec<GrayImage> = slices
        .par_iter()
        .map(|s| gaussian_blur_f32(s, sigma))
        .collect();

    if planar.len() < 2 {
        return planar;
    }

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let last = planar.len() as isize - 1;

    (0..planar.len())
        .into_par_iter()
        .map(|z| {
            let (width, height) = planar[z].dimensions();
            GrayImage::from_fn(width, height, |x, y| {
                let value: f32 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let zz = (z as isize + k as isize - radius).clamp(0, last) as usize;
                        weight * f32::from(planar[zz].get_pixel(x, y).0[0])
                    })
                    .sum();
                Luma([value.round().clamp(0.0, 255.0) as u8])
            })
        })
        .collect()
}

/// Normalized 1D Gaussian kernel truncated at three standard deviations.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil().max(1.0) as i32;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / two_sigma_sq).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}
