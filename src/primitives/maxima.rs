//! Prominence-filtered local maxima.
//!
//! A local maximum is kept when the connected area above `value - tolerance`
//! around it contains no higher sample, does not run into the area of an
//! already accepted maximum, and is bounded somewhere by a sample at or below
//! `value - tolerance`. The last condition rules out flat images. Plateaus of
//! equal value yield one point, the plateau pixel nearest the plateau
//! centroid.

use std::collections::VecDeque;

use image::GrayImage;

/// Owner value of pixels inside the area of an accepted maximum.
const CLAIMED: u32 = u32::MAX;

/// Returns maxima as `(x, y)` in order of decreasing value.
pub fn find_maxima(slice: &GrayImage, tolerance: f64) -> Vec<(u32, u32)> {
    let (width, height) = slice.dimensions();
    let (w, h) = (width as usize, height as usize);
    let data = slice.as_raw();

    let neighbours = move |i: usize| {
        let (x, y) = ((i % w) as isize, (i / w) as isize);
        (-1isize..=1)
            .flat_map(move |dy| (-1isize..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(move |(dx, dy)| {
                let (nx, ny) = (x + dx, y + dy);
                (nx >= 0 && ny >= 0 && (nx as usize) < w && (ny as usize) < h)
                    .then(|| ny as usize * w + nx as usize)
            })
    };

    let mut candidates: Vec<usize> = (0..w * h)
        .filter(|&i| neighbours(i).all(|n| data[n] <= data[i]))
        .collect();
    // Stable: equal values keep raster order.
    candidates.sort_by(|a, b| data[*b].cmp(&data[*a]));

    // 0 = unvisited, CLAIMED, otherwise the generation of the flood that
    // visited the pixel.
    let mut owner = vec![0u32; w * h];
    let mut maxima = Vec::new();
    let mut queue = VecDeque::new();
    let mut flooded = Vec::new();
    let mut generation = 0u32;

    for &start in &candidates {
        if owner[start] != 0 {
            continue;
        }
        generation += 1;

        let v = data[start];
        let floor = f64::from(v) - tolerance;
        let admits = |value: u8| value == v || f64::from(value) > floor;

        let mut valid = true;
        let mut prominent = false;
        let mut plateau = Vec::new();

        flooded.clear();
        queue.clear();
        queue.push_back(start);
        owner[start] = generation;
        flooded.push(start);

        while let Some(i) = queue.pop_front() {
            if data[i] == v {
                plateau.push(i);
            }
            for n in neighbours(i) {
                let value = data[n];
                if value > v || owner[n] == CLAIMED {
                    valid = false;
                    continue;
                }
                if !admits(value) {
                    prominent = true;
                    continue;
                }
                match owner[n] {
                    0 => {
                        owner[n] = generation;
                        flooded.push(n);
                        queue.push_back(n);
                    }
                    // Area of an earlier rejected candidate: it drains into a
                    // higher sample, so this one does too.
                    g if g != generation => valid = false,
                    _ => {}
                }
            }
        }

        if !(valid && prominent) {
            continue;
        }

        let count = plateau.len() as f64;
        let cx = plateau.iter().map(|&i| (i % w) as f64).sum::<f64>() / count;
        let cy = plateau.iter().map(|&i| (i / w) as f64).sum::<f64>() / count;
        let distance = |i: usize| {
            let dx = (i % w) as f64 - cx;
            let dy = (i / w) as f64 - cy;
            dx * dx + dy * dy
        };
        let best = plateau
            .iter()
            .copied()
            .reduce(|a, b| if distance(b) < distance(a) { b } else { a })
            .unwrap_or(start);

        for &i in &flooded {
            owner[i] = CLAIMED;
        }
        maxima.push(((best % w) as u32, (best / w) as u32));
    }

    maxima
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn peaks(points: &[(u32, u32, f32)], size: u32, sigma: f32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let v: f32 = points
                .iter()
                .map(|&(px, py, amp)| {
                    let d2 = (x as f32 - px as f32).powi(2) + (y as f32 - py as f32).powi(2);
                    amp * (-d2 / (2.0 * sigma * sigma)).exp()
                })
                .sum();
            Luma([v.round().clamp(0.0, 255.0) as u8])
        })
    }

    #[test]
    fn test_blank_slice_has_no_maxima() {
        assert!(find_maxima(&GrayImage::new(32, 32), 10.0).is_empty());
        assert!(find_maxima(&GrayImage::from_pixel(32, 32, Luma([200])), 0.0).is_empty());
    }

    #[test]
    fn test_single_peak_is_found() {
        let slice = peaks(&[(20, 12, 200.0)], 40, 4.0);
        assert_eq!(find_maxima(&slice, 10.0), vec![(20, 12)]);
    }

    #[test]
    fn test_separated_peaks_are_ordered_by_value() {
        let slice = peaks(&[(10, 10, 150.0), (30, 30, 220.0)], 40, 3.0);
        assert_eq!(find_maxima(&slice, 10.0), vec![(30, 30), (10, 10)]);
    }

    #[test]
    fn test_shallow_secondary_peak_is_merged() {
        // Two peaks whose saddle is within the tolerance of the lower one.
        let slice = peaks(&[(12, 20, 200.0), (28, 20, 195.0)], 40, 4.0);
        assert_eq!(find_maxima(&slice, 150.0), vec![(12, 20)]);
        assert_eq!(find_maxima(&slice, 10.0), vec![(12, 20), (28, 20)]);
    }

    #[test]
    fn test_plateau_yields_one_central_point() {
        let slice = GrayImage::from_fn(20, 20, |x, y| {
            Luma([if (5..10).contains(&x) && (8..11).contains(&y) { 90 } else { 10 }])
        });
        assert_eq!(find_maxima(&slice, 5.0), vec![(7, 9)]);
    }
}
