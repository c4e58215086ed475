//! Binary morphology on `{0, 255}` masks.

use std::collections::VecDeque;

use image::GrayImage;
use imageproc::distance_transform::Norm;

use crate::volume::{IN_VALUE, OUT_VALUE};

/// One pass of 3×3 binary dilation.
pub fn dilate(mask: &GrayImage) -> GrayImage {
    imageproc::morphology::dilate(mask, Norm::LInf, 1)
}

/// One pass of 3×3 binary erosion.
pub fn erode(mask: &GrayImage) -> GrayImage {
    imageproc::morphology::erode(mask, Norm::LInf, 1)
}

/// Inverts a binary mask.
pub fn invert(mask: &GrayImage) -> GrayImage {
    let mut out = mask.clone();
    for p in out.pixels_mut() {
        p.0[0] = if p.0[0] == OUT_VALUE {
            IN_VALUE
        } else {
            OUT_VALUE
        };
    }
    out
}

/// Turns every background region not 4-connected to the image border into
/// foreground.
pub fn fill_holes(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let (w, h) = (width as usize, height as usize);
    let background = |i: usize| mask.as_raw()[i] == OUT_VALUE;

    let mut reached = vec![false; w * h];
    let mut queue = VecDeque::new();

    let border = (0..w)
        .flat_map(|x| [x, (h - 1) * w + x])
        .chain((0..h).flat_map(|y| [y * w, y * w + w - 1]));
    for i in border {
        if background(i) && !reached[i] {
            reached[i] = true;
            queue.push_back(i);
        }
    }

    while let Some(i) = queue.pop_front() {
        let (x, y) = (i % w, i / w);
        let neighbours = [
            (x > 0).then(|| i - 1),
            (x + 1 < w).then(|| i + 1),
            (y > 0).then(|| i - w),
            (y + 1 < h).then(|| i + w),
        ];
        for n in neighbours.into_iter().flatten() {
            if background(n) && !reached[n] {
                reached[n] = true;
                queue.push_back(n);
            }
        }
    }

    let mut out = mask.clone();
    for (p, &outside) in out.pixels_mut().zip(reached.iter()) {
        p.0[0] = if outside { OUT_VALUE } else { IN_VALUE };
    }
    out
}
