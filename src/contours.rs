//! Outline polygons and the shape measures derived from them.

use imageproc::point::Point;
use num::{Num, NumCast};
use num_traits::AsPrimitive;

/// A closed outline traced on one slice.
///
/// Vertices lie on pixel corners: pixel `(x, y)` covers the square from
/// `(x, y)` to `(x + 1, y + 1)`. Only turning points are stored, and the edge
/// from the last vertex back to the first closes the polygon. An empty polygon
/// means nothing was traced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryPolygon {
    pub points: Vec<Point<i32>>,
}

impl BoundaryPolygon {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Enclosed area; for a traced outer boundary this is the pixel count of
    /// the region including any interior holes.
    pub fn area(&self) -> f64 {
        polygon_area(&self.points).abs()
    }

    /// Corner-corrected length of the outline, see [`traced_perimeter`].
    pub fn perimeter(&self) -> f64 {
        traced_perimeter(&self.points)
    }

    /// `4π·area / perimeter²`, or `0.0` for an outline of zero length.
    pub fn circularity(&self) -> f64 {
        circularity(self.area(), self.perimeter())
    }

    /// Whether the centre of pixel `(x, y)` lies inside the outline (even-odd
    /// rule).
    pub fn contains_pixel(&self, x: u32, y: u32) -> bool {
        // Doubled coordinates keep the pixel centre on the integer grid.
        let (px, py) = (2 * <i64 as From<_>>::from(x) + 1, 2 * <i64 as From<_>>::from(y) + 1);
        let mut inside = false;
        for (a, b) in self.points.iter().zip(self.points.iter().cycle().skip(1)) {
            let (ax, ay) = (2 * <i64 as From<_>>::from(a.x), 2 * <i64 as From<_>>::from(a.y));
            let (bx, by) = (2 * <i64 as From<_>>::from(b.x), 2 * <i64 as From<_>>::from(b.y));
            if (ay > py) != (by > py) {
                // x of the edge at height py, compared without division.
                let lhs = (px - ax) * (by - ay);
                let rhs = (bx - ax) * (py - ay);
                if (by > ay && lhs < rhs) || (by < ay && lhs > rhs) {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// Signed shoelace area of a closed polygon.
///
/// With image coordinates (y pointing down) a clockwise walk on screen gives a
/// positive area. Polygons with fewer than 3 points have zero area.
pub fn polygon_area<T>(points: &[Point<T>]) -> f64
where
    T: Num + NumCast + Copy + AsPrimitive<f64>,
{
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p1, p2)| {
            let (x1, y1): (f64, f64) = (p1.x.as_(), p1.y.as_());
            let (x2, y2): (f64, f64) = (p2.x.as_(), p2.y.as_());
            x1 * y2 - x2 * y1
        })
        .sum();

    twice_area / 2.0
}

/// Perimeter of a traced crack outline with staircase corners cut.
///
/// The raw crack length `Σ|dx| + Σ|dy|` overestimates the boundary of any
/// non axis-aligned edge. Each corner of the outline is cut by `2 − √2`,
/// except the second corner of a pair joined by a unit step, so a diagonal
/// staircase is measured as its diagonal. This matches the perimeter that
/// ImageJ reports for traced selections.
pub fn traced_perimeter<T>(points: &[Point<T>]) -> f64
where
    T: Num + NumCast + Copy + AsPrimitive<f64>,
{
    let n = points.len();
    if n < 2 {
        return 0.0;
    }

    let step = |from: Point<T>, to: Point<T>| -> (f64, f64) {
        let dx: f64 = to.x.as_() - from.x.as_();
        let dy: f64 = to.y.as_() - from.y.as_();
        (dx.abs(), dy.abs())
    };

    let (mut dx1, mut dy1) = step(points[n - 1], points[0]);
    let mut side1 = dx1 + dy1;
    let mut sum_dx = 0.0;
    let mut sum_dy = 0.0;
    let mut corners = 0usize;
    let mut corner = false;

    for i in 0..n {
        let (dx2, dy2) = step(points[i], points[(i + 1) % n]);
        sum_dx += dx1;
        sum_dy += dy1;
        if side1 > 1.0 || !corner {
            corner = true;
            corners += 1;
        } else {
            corner = false;
        }
        dx1 = dx2;
        dy1 = dy2;
        side1 = dx2 + dy2;
    }

    sum_dx + sum_dy - corners as f64 * (2.0 - std::f64::consts::SQRT_2)
}

/// Shape factor `4π·area / perimeter²`.
///
/// A zero (or non-finite) perimeter yields `0.0` instead of dividing by zero.
/// The value is not clamped and can exceed 1 for degenerate outlines.
pub fn circularity(area: f64, perimeter: f64) -> f64 {
    if perimeter <= 0.0 || !perimeter.is_finite() {
        return 0.0;
    }
    4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_float_eq(a: f64, b: f64) {
        assert!(
            (a - b).abs() < 1e-9,
            "Assertion failed: expected {}, got {}",
            b,
            a
        );
    }

    fn square(x0: i32, y0: i32, side: i32) -> Vec<Point<i32>> {
        vec![
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
        ]
    }

    #[test]
    fn test_polygon_area_sign_and_degenerates() {
        // Clockwise on screen (y down) is positive.
        let cw = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(1, 1),
            Point::new(0, 1),
        ];
        assert_float_eq(polygon_area(&cw), 1.0);

        let ccw: Vec<_> = cw.iter().rev().copied().collect();
        assert_float_eq(polygon_area(&ccw), -1.0);

        assert_float_eq(polygon_area::<i32>(&[]), 0.0);
        assert_float_eq(polygon_area(&[Point::new(3, 3), Point::new(5, 3)]), 0.0);
        assert_float_eq(polygon_area(&square(40, 40, 20)).abs(), 400.0);
    }

    #[test]
    fn test_contains_pixel() {
        let polygon = BoundaryPolygon::new(square(40, 40, 20));
        assert!(polygon.contains_pixel(40, 40));
        assert!(polygon.contains_pixel(59, 59));
        assert!(!polygon.contains_pixel(60, 50));
        assert!(!polygon.contains_pixel(39, 50));
        assert!(!polygon.contains_pixel(50, 60));
        assert!(!BoundaryPolygon::empty().contains_pixel(0, 0));
    }

    #[test]
    fn test_traced_perimeter_square_cuts_four_corners() {
        let expected = 80.0 - 4.0 * (2.0 - std::f64::consts::SQRT_2);
        assert_float_eq(traced_perimeter(&square(40, 40, 20)), expected);
    }

    #[test]
    fn test_traced_perimeter_single_pixel() {
        // All sides have length 1: corners alternate, so only two are cut.
        let expected = 4.0 - 2.0 * (2.0 - std::f64::consts::SQRT_2);
        assert_float_eq(traced_perimeter(&square(0, 0, 1)), expected);
    }

    #[test]
    fn test_traced_perimeter_degenerate() {
        assert_float_eq(traced_perimeter::<i32>(&[]), 0.0);
        assert_float_eq(traced_perimeter(&[Point::new(1, 1)]), 0.0);
    }

    #[test]
    fn test_circularity() {
        assert_float_eq(circularity(10.0, 0.0), 0.0);
        assert_float_eq(circularity(0.0, 0.0), 0.0);
        assert_float_eq(circularity(400.0, 80.0), std::f64::consts::PI / 4.0);

        // A continuous circle has circularity 1.
        let r = 7.0_f64;
        let c = circularity(std::f64::consts::PI * r * r, 2.0 * std::f64::consts::PI * r);
        assert_float_eq(c, 1.0);

        let polygon = BoundaryPolygon::new(square(40, 40, 20));
        let expected = 4.0 * std::f64::consts::PI * 400.0
            / (80.0 - 4.0 * (2.0 - std::f64::consts::SQRT_2)).powi(2);
        assert_float_eq(polygon.circularity(), expected);
        assert_float_eq(BoundaryPolygon::empty().circularity(), 0.0);
    }
}
