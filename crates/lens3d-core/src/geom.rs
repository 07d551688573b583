use serde::{Deserialize, Serialize};

/// Endpoint matching tolerance shared by adjacency tests and point deduplication.
pub const POINT_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(&self, other: Point3) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(&self, other: Point3) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn distance_squared(&self, other: Point3) -> f64 {
        let d = self.sub(other);
        d.x * d.x + d.y * d.y + d.z * d.z
    }

    pub fn distance(&self, other: Point3) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Euclidean tolerance-equality: true when the points are closer than `tol`.
    pub fn approx_eq(&self, other: Point3, tol: f64) -> bool {
        self.distance(other) < tol
    }

    pub fn to_xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl From<Point2> for Point3 {
    fn from(p: Point2) -> Self {
        Point3::new(p.x, p.y, 0.0)
    }
}

/// Axis-aligned bounds accumulated one point at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox3 {
    pub min: Point3,
    pub max: Point3,
}

impl BBox3 {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn include_point(&mut self, point: Point3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn center(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Per-axis extents, zero for an empty box.
    pub fn size(&self) -> Point3 {
        if self.is_empty() {
            return Point3::origin();
        }
        Point3::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }

    pub fn max_extent(&self) -> f64 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }
}

/// Triangle area from its three side lengths (Heron's formula).
///
/// Near-collinear input can drive the product under the root slightly negative,
/// in which case the result is NaN and the triangle should be treated as degenerate.
pub fn triangle_area_heron(a: Point3, b: Point3, c: Point3) -> f64 {
    let ab = a.distance(b);
    let bc = b.distance(c);
    let ca = c.distance(a);
    let s = (ab + bc + ca) / 2.0;
    (s * (s - ab) * (s - bc) * (s - ca)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_is_euclidean() {
        let a = Point3::new(0.0, 0.0, 0.0);
        // Each axis is within 0.001 but the Euclidean distance is not.
        let b = Point3::new(0.0009, 0.0009, 0.0);
        assert!(!a.approx_eq(b, POINT_TOLERANCE));
        assert!(a.approx_eq(Point3::new(0.0005, 0.0, 0.0), POINT_TOLERANCE));
    }

    #[test]
    fn heron_right_triangle() {
        let area = triangle_area_heron(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        );
        assert!((area - 6.0).abs() < 1e-9);
    }

    #[test]
    fn empty_bbox_has_zero_size() {
        let b = BBox3::empty();
        assert!(b.is_empty());
        assert_eq!(0.0, b.max_extent());
    }
}
