use image::math::Rect;
use imageproc::point::Point;
use num_traits::{Num, ToPrimitive};

/// Calculates the axis-aligned bounding box of an outline's vertices.
///
/// This function is designed to work with traced outlines whose vertices lie on
/// pixel corners, such as [`crate::contours::BoundaryPolygon::points`]. It
/// iterates through the points to find the minimum and maximum x and y
/// coordinates, then constructs an `image::math::Rect` that encloses them all.
/// For a pixel-corner outline the rectangle is exactly the set of enclosed
/// pixels' bounding box.
///
/// The function is generic over numeric types that implement `PartialOrd`, so it
/// also accepts floating-point coordinates. Negative coordinates are clamped to 0.
///
/// # Returns
///
/// `None` for an empty slice of points, otherwise the smallest axis-aligned
/// rectangle that contains every vertex.
///
/// # Examples
///
/// ```
/// use imageproc::point::Point;
/// use nucleus_morphometry::rect::bounding_box;
///
/// let outline = [
///     Point { x: 50, y: 10 },
///     Point { x: 90, y: 50 },
///     Point { x: 50, y: 90 },
///     Point { x: 10, y: 50 },
/// ];
///
/// let bounding_box = bounding_box(&outline).unwrap();
///
/// assert_eq!(bounding_box.x, 10);
/// assert_eq!(bounding_box.y, 10);
/// assert_eq!(bounding_box.width, 80);
/// assert_eq!(bounding_box.height, 80);
/// ```
pub fn bounding_box<T>(vertices: &[Point<T>]) -> Option<Rect>
where
    T: Copy + PartialOrd + Num + ToPrimitive,
{
    let (p0, rest) = vertices.split_first()?;
    let mut min_x = p0.x;
    let mut max_x = p0.x;
    let mut min_y = p0.y;
    let mut max_y = p0.y;

    // Manual comparison is used here because `T` only has a `PartialOrd`.
    for p in rest {
        if p.x < min_x {
            min_x = p.x;
        }
        if p.x > max_x {
            max_x = p.x;
        }
        if p.y < min_y {
            min_y = p.y;
        }
        if p.y > max_y {
            max_y = p.y;
        }
    }

    let x = min_x.to_u32().unwrap_or(0);
    let y = min_y.to_u32().unwrap_or(0);

    let width = max_x.to_u32().unwrap_or(0).saturating_sub(x);
    let height = max_y.to_u32().unwrap_or(0).saturating_sub(y);

    Some(Rect {
        x,
        y,
        width,
        height,
    })
}

/// Whether `rect` reaches the border of an image of the given size.
pub fn touches_border(rect: &Rect, width: u32, height: u32) -> bool {
    rect.x == 0
        || rect.y == 0
        || rect.x.saturating_add(rect.width) >= width
        || rect.y.saturating_add(rect.height) >= height
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::point::Point;

    #[test]
    fn test_bounding_box_for_traced_square() {
        let vertices = [
            Point { x: 60, y: 60 },
            Point { x: 40, y: 60 },
            Point { x: 40, y: 40 },
            Point { x: 60, y: 40 },
        ];
        let expected = Rect {
            x: 40,
            y: 40,
            width: 20,
            height: 20,
        };
        assert_eq!(bounding_box(&vertices), Some(expected));
    }

    #[test]
    fn test_bounding_box_of_l_shape() {
        // The order of points doesn't matter for the box.
        let vertices = [
            Point { x: 20, y: 30 },
            Point { x: 25, y: 30 },
            Point { x: 25, y: 70 },
            Point { x: 120, y: 70 },
            Point { x: 120, y: 80 },
            Point { x: 20, y: 80 },
        ];
        let expected = Rect {
            x: 20,
            y: 30,
            width: 100,
            height: 50,
        };
        assert_eq!(bounding_box(&vertices), Some(expected));
        let mut shuffled = vertices;
        shuffled.reverse();
        assert_eq!(bounding_box(&shuffled), Some(expected));
    }

    #[test]
    fn test_bounding_box_with_negative_coordinates() {
        let vertices = [
            Point { x: -10.0, y: -20.0 },
            Point { x: 50.0, y: 30.0 },
            Point { x: 50.0, y: -20.0 },
            Point { x: -10.0, y: 30.0 },
        ];

        // After conversion to u32, negative values become 0.
        let expected = Rect {
            x: 0,
            y: 0,
            width: 50,
            height: 30,
        };
        assert_eq!(bounding_box(&vertices), Some(expected));
    }

    #[test]
    fn test_bounding_box_empty() {
        assert_eq!(bounding_box::<i32>(&[]), None);
    }

    #[test]
    fn test_touches_border() {
        let inner = Rect {
            x: 40,
            y: 40,
            width: 20,
            height: 20,
        };
        assert!(!touches_border(&inner, 100, 100));
        assert!(touches_border(&Rect { x: 0, ..inner }, 100, 100));
        assert!(touches_border(&Rect { x: 80, ..inner }, 100, 100));
        assert!(touches_border(&Rect { y: 80, ..inner }, 100, 100));
        assert!(!touches_border(&Rect { x: 79, ..inner }, 100, 100));
    }
}
