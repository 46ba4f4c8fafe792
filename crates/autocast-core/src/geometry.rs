//! Geometry primitives: points, rectangles, regions and containment tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A window-relative or screen coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// True if both axes differ by at most `tolerance`.
    pub fn near(&self, other: Point, tolerance: i32) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. Containment is half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rect from inclusive min and exclusive max corners.
    pub fn from_bounds(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        self.x <= point.x
            && point.x < self.x + self.width
            && self.y <= point.y
            && point.y < self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Convert a point relative to this rect's origin into absolute coordinates.
    pub fn to_absolute(&self, relative: Point) -> Point {
        Point::new(self.x + relative.x, self.y + relative.y)
    }

    /// The four corners, clockwise from the origin.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("rectangle must have positive size, got {width}x{height}")]
    EmptyRect { width: i32, height: i32 },
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
}

/// The area that bounds valid generated points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Region {
    Rect(Rect),
    Polygon(Vec<Point>),
}

impl Region {
    pub fn rect(rect: Rect) -> Result<Self, GeometryError> {
        if rect.width <= 0 || rect.height <= 0 {
            return Err(GeometryError::EmptyRect {
                width: rect.width,
                height: rect.height,
            });
        }
        Ok(Self::Rect(rect))
    }

    /// Vertex order defines the boundary; self-intersection is not checked.
    pub fn polygon(vertices: Vec<Point>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        Ok(Self::Polygon(vertices))
    }

    /// Bounding rectangle. For polygons the max edge is exclusive, so vertices
    /// on the max edges fall outside it just as they do for the ray cast.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(rect) => *rect,
            Self::Polygon(vertices) => polygon_bounds(vertices)
                .map(|(min_x, min_y, max_x, max_y)| Rect::from_bounds(min_x, min_y, max_x, max_y))
                .unwrap_or_default(),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        match self {
            Self::Rect(rect) => rect.contains(point),
            Self::Polygon(vertices) => point_in_polygon(point, vertices),
        }
    }

    /// Polygon centroid, or the rectangle center.
    pub fn fallback_point(&self) -> Point {
        match self {
            Self::Rect(rect) => rect.center(),
            Self::Polygon(vertices) => {
                polygon_centroid(vertices).unwrap_or_else(|| self.bounds().center())
            }
        }
    }
}

/// Ray-casting containment test.
///
/// Casts a horizontal ray from `point` towards +x and counts edge crossings.
/// Every edge, including horizontal ones, goes through the same inequality.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n == 0 {
        return false;
    }

    let x = f64::from(point.x);
    let y = f64::from(point.y);
    let mut inside = false;

    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (f64::from(polygon[i].x), f64::from(polygon[i].y));
        let (xj, yj) = (f64::from(polygon[j].x), f64::from(polygon[j].y));

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Tight bounding box as `(min_x, min_y, max_x, max_y)`.
pub fn polygon_bounds(polygon: &[Point]) -> Option<(i32, i32, i32, i32)> {
    let first = polygon.first()?;
    let init = (first.x, first.y, first.x, first.y);
    Some(polygon.iter().fold(init, |(min_x, min_y, max_x, max_y), p| {
        (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
    }))
}

/// Mean of the vertex coordinates, truncated toward zero.
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    if polygon.is_empty() {
        return None;
    }
    let n = polygon.len() as f64;
    let (sx, sy) = polygon.iter().fold((0.0, 0.0), |(sx, sy), p| {
        (sx + f64::from(p.x), sy + f64::from(p.y))
    });
    Some(Point::new((sx / n) as i32, (sy / n) as i32))
}
