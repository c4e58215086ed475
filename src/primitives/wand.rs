//! Wand-style outline tracing on binary masks.

use image::GrayImage;
use imageproc::point::Point;

use crate::contours::{BoundaryPolygon, polygon_area};
use crate::volume::OUT_VALUE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    fn step(self) -> (i64, i64) {
        match self {
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
        }
    }

    fn turn_left(self) -> Self {
        match self {
            Direction::East => Direction::North,
            Direction::South => Direction::East,
            Direction::West => Direction::South,
            Direction::North => Direction::West,
        }
    }

    fn turn_right(self) -> Self {
        match self {
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::North => Direction::East,
        }
    }

    /// Pixels to the right and to the left of the crack leaving corner
    /// `(cx, cy)` in this direction.
    fn sides(self, cx: i64, cy: i64) -> ((i64, i64), (i64, i64)) {
        match self {
            Direction::East => ((cx, cy), (cx, cy - 1)),
            Direction::South => ((cx - 1, cy), (cx, cy)),
            Direction::West => ((cx - 1, cy - 1), (cx - 1, cy)),
            Direction::North => ((cx, cy - 1), (cx - 1, cy - 1)),
        }
    }
}

struct Foreground<'a> {
    mask: &'a GrayImage,
}

impl Foreground<'_> {
    fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0
            && y >= 0
            && x < i64::from(self.mask.width())
            && y < i64::from(self.mask.height())
            && self.mask.get_pixel(x as u32, y as u32).0[0] != OUT_VALUE
    }
}

/// Traces the outline of the foreground region containing pixel `(x, y)`.
///
/// From the start pixel the wand moves right to the end of its run and
/// follows pixel cracks with the foreground on the right hand, preferring left
/// turns so that diagonally touching pixels belong to the same region. When the
/// crack reached first belongs to an interior hole the scan continues to the
/// right of that hole; an outline found there is kept only if it encloses the
/// start pixel, which skips islands sitting inside the hole. A start pixel on
/// the background or outside the mask yields an empty polygon.
pub fn trace_outline(mask: &GrayImage, start_x: u32, start_y: u32) -> BoundaryPolygon {
    let inside = Foreground { mask };
    let (mut x, y) = (i64::from(start_x), i64::from(start_y));
    if !inside.contains(x, y) {
        return BoundaryPolygon::empty();
    }

    let width = i64::from(mask.width());
    let mut first_run = true;
    loop {
        while inside.contains(x + 1, y) {
            x += 1;
        }

        let outline = follow_cracks(&inside, x, y);
        if polygon_area(&outline.points) > 0.0
            && (first_run || outline.contains_pixel(start_x, start_y))
        {
            return outline;
        }
        first_run = false;

        // Hole boundary or island: skip past it and resume on the next run.
        x += 1;
        while x < width && !inside.contains(x, y) {
            x += 1;
        }
        if x >= width {
            return BoundaryPolygon::empty();
        }
    }
}

/// Follows the crack on the east side of foreground pixel `(x, y)`, whose east
/// neighbour is background, until it closes.
fn follow_cracks(inside: &Foreground<'_>, x: i64, y: i64) -> BoundaryPolygon {
    let start = (x + 1, y);
    let start_direction = Direction::South;

    let (width, height) = inside.mask.dimensions();
    let max_steps = 4 * (u64::from(width) + 1) * (u64::from(height) + 1);

    let mut corner = start;
    let mut direction = start_direction;
    let mut points = Vec::new();

    for _ in 0..max_steps {
        let (dx, dy) = direction.step();
        corner = (corner.0 + dx, corner.1 + dy);

        let next = [direction.turn_left(), direction, direction.turn_right()]
            .into_iter()
            .find(|d| {
                let (right, left) = d.sides(corner.0, corner.1);
                inside.contains(right.0, right.1) && !inside.contains(left.0, left.1)
            })
            .unwrap_or(direction.turn_right().turn_right());

        if next != direction {
            points.push(Point::new(corner.0 as i32, corner.1 as i32));
        }
        direction = next;

        if corner == start && direction == start_direction {
            break;
        }
    }

    BoundaryPolygon::new(points)
}
