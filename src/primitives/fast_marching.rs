//! Seeded region growth by fast marching.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use image::GrayImage;

use crate::volume::{IN_VALUE, OUT_VALUE};

/// Stopping thresholds for [`grow_region`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastMarchingParams {
    /// Intensity difference from the seed at which the front speed drops to 0.
    pub grey_threshold: f64,
    /// Minimum normalized front speed, in `[0, 1)`. The front does not enter
    /// pixels whose slowness `1 / speed` exceeds `1 / distance_threshold`.
    pub distance_threshold: f64,
}

#[derive(Debug, Clone, Copy)]
struct Front {
    time: f64,
    index: usize,
    seed: usize,
    reference: u8,
}

impl PartialEq for Front {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Front {}

impl PartialOrd for Front {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Front {
    // Reversed so the max-heap pops the earliest arrival first; ties resolve
    // in raster order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Grows a region from `seeds` and returns it as a binary mask (`IN_VALUE`
/// inside).
///
/// Each seed carries the intensity found under it. A pixel reached from a
/// seed of intensity `r` has speed `1 - |I - r| / grey_threshold`; it joins
/// the region only when that speed exceeds `distance_threshold`. Pixels are
/// accepted in order of arrival time along 8-connected paths, where each step
/// costs its length divided by the speed of the pixel entered.
///
/// Every pixel belongs to the seed whose front reached it first. A front that
/// reaches the image border has not converged on an object, and all pixels of
/// that seed are dropped. Seeds outside the slice are ignored; no seeds yield
/// an empty mask.
pub fn grow_region(slice: &GrayImage, seeds: &[(u32, u32)], params: &FastMarchingParams) -> GrayImage {
    let (width, height) = slice.dimensions();
    let (w, h) = (width as usize, height as usize);
    let data = slice.as_raw();

    let speed = |value: u8, reference: u8| -> f64 {
        1.0 - f64::from(value.abs_diff(reference)) / params.grey_threshold
    };

    let mut arrival = vec![f64::INFINITY; w * h];
    let mut owner: Vec<Option<usize>> = vec![None; w * h];
    let mut spilled = vec![false; seeds.len()];
    let mut heap = BinaryHeap::new();

    for (seed, &(x, y)) in seeds.iter().enumerate() {
        if x >= width || y >= height {
            continue;
        }
        let index = y as usize * w + x as usize;
        arrival[index] = 0.0;
        heap.push(Front {
            time: 0.0,
            index,
            seed,
            reference: data[index],
        });
    }

    while let Some(Front {
        time,
        index,
        seed,
        reference,
    }) = heap.pop()
    {
        if owner[index].is_some() || time > arrival[index] {
            continue;
        }
        owner[index] = Some(seed);

        let (x, y) = ((index % w) as isize, (index / w) as isize);
        if x == 0 || y == 0 || x as usize == w - 1 || y as usize == h - 1 {
            spilled[seed] = true;
        }
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                if owner[n].is_some() {
                    continue;
                }
                let s = speed(data[n], reference);
                if s <= params.distance_threshold || s <= 0.0 {
                    continue;
                }
                let step = if dx != 0 && dy != 0 {
                    std::f64::consts::SQRT_2
                } else {
                    1.0
                };
                let t = time + step / s;
                if t < arrival[n] {
                    arrival[n] = t;
                    heap.push(Front {
                        time: t,
                        index: n,
                        seed,
                        reference,
                    });
                }
            }
        }
    }

    let mut out = GrayImage::new(width, height);
    for (p, &seed) in out.pixels_mut().zip(owner.iter()) {
        let inside = seed.is_some_and(|s| !spilled[s]);
        p.0[0] = if inside { IN_VALUE } else { OUT_VALUE };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    const PARAMS: FastMarchingParams = FastMarchingParams {
        grey_threshold: 50.0,
        distance_threshold: 0.01,
    };

    fn two_squares() -> GrayImage {
        GrayImage::from_fn(60, 30, |x, y| {
            let left = (5..15).contains(&x) && (5..15).contains(&y);
            let right = (35..50).contains(&x) && (10..20).contains(&y);
            Luma([if left || right { 230 } else { 100 }])
        })
    }

    fn count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] == IN_VALUE).count()
    }

    #[test]
    fn test_grows_to_the_intensity_edge() {
        let mask = grow_region(&two_squares(), &[(9, 9)], &PARAMS);
        assert_eq!(count(&mask), 100);
        assert_eq!(mask.get_pixel(5, 5).0[0], IN_VALUE);
        assert_eq!(mask.get_pixel(4, 5).0[0], OUT_VALUE);
        assert_eq!(mask.get_pixel(40, 15).0[0], OUT_VALUE);
    }

    #[test]
    fn test_each_seed_grows_its_own_region() {
        let mask = grow_region(&two_squares(), &[(9, 9), (40, 15)], &PARAMS);
        assert_eq!(count(&mask), 100 + 150);
    }

    #[test]
    fn test_no_seeds_or_outside_seeds_grow_nothing() {
        assert_eq!(count(&grow_region(&two_squares(), &[], &PARAMS)), 0);
        assert_eq!(count(&grow_region(&two_squares(), &[(600, 3)], &PARAMS)), 0);
    }

    #[test]
    fn test_front_reaching_the_border_is_dropped() {
        let mask = grow_region(&two_squares(), &[(0, 0)], &PARAMS);
        assert_eq!(count(&mask), 0);

        // The converged seed keeps its region.
        let mask = grow_region(&two_squares(), &[(0, 0), (9, 9)], &PARAMS);
        assert_eq!(count(&mask), 100);
        assert_eq!(mask.get_pixel(9, 9).0[0], IN_VALUE);
    }

    #[test]
    fn test_speed_floor_stops_the_front_early() {
        // A ramp framed by a bright wall: each column is 4 levels brighter
        // than the previous one.
        let ramp = GrayImage::from_fn(42, 5, |x, y| {
            let wall = x == 0 || y == 0 || y == 4 || x == 41;
            Luma([if wall { 255 } else { ((x - 1) * 4) as u8 }])
        });
        let loose = grow_region(&ramp, &[(1, 2)], &PARAMS);
        // |I - 0| < 50 * (1 - 0.01) for columns 0..=12.
        assert_eq!(count(&loose), 13 * 3);

        let strict = FastMarchingParams {
            distance_threshold: 0.5,
            ..PARAMS
        };
        // |I - 0| < 25 for columns 0..=6.
        assert_eq!(count(&grow_region(&ramp, &[(1, 2)], &strict)), 7 * 3);
    }
}
