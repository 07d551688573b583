use crate::camera::{MODEL_SCALE_MAX, MODEL_SCALE_MIN};
use crate::geom::{BBox3, Point3};
use crate::model::Primitive;
use serde::{Deserialize, Serialize};

/// Extents below this are treated as a unit-sized model.
const MIN_EXTENT: f64 = 1e-4;

/// How large the fitted model should appear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FitTarget {
    /// A fixed size in scene units (15 for the OpenGL viewport).
    Fixed(f64),
    /// 40% of the smaller viewport dimension, in pixels.
    Viewport { width: u32, height: u32 },
}

impl FitTarget {
    pub const GL_DEFAULT: FitTarget = FitTarget::Fixed(15.0);

    pub fn size(&self) -> f64 {
        match *self {
            FitTarget::Fixed(size) => size,
            FitTarget::Viewport { width, height } => width.min(height) as f64 * 0.4,
        }
    }
}

impl Default for FitTarget {
    fn default() -> Self {
        FitTarget::GL_DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelFit {
    pub center: Point3,
    pub scale: f64,
    /// `None` when nothing contributed a point.
    pub bbox: Option<BBox3>,
}

/// Bounds of the directly listed primitives.
///
/// Circles and arcs contribute their full circle on X/Y, ellipses their axis lengths.
/// Instances are not expanded, so block geometry does not move the bounds.
pub fn primitive_bounds(primitives: &[Primitive]) -> BBox3 {
    let mut bbox = BBox3::empty();
    for primitive in primitives {
        match primitive {
            Primitive::Segment(s) => {
                bbox.include_point(s.start);
                bbox.include_point(s.end);
            }
            Primitive::Polyline3(p) => {
                for v in &p.vertices {
                    bbox.include_point(*v);
                }
            }
            Primitive::Polyline2(p) => {
                for v in &p.vertices {
                    bbox.include_point(Point3::from(*v));
                }
            }
            Primitive::Circle(c) => include_radius(&mut bbox, c.center, c.radius, c.radius),
            Primitive::Arc(a) => include_radius(&mut bbox, a.center, a.radius, a.radius),
            Primitive::Ellipse(e) => include_radius(&mut bbox, e.center, e.major_axis, e.minor_axis),
            Primitive::Instance(_) => {}
        }
    }
    bbox
}

fn include_radius(bbox: &mut BBox3, center: Point3, rx: f64, ry: f64) {
    bbox.include_point(Point3::new(center.x - rx, center.y - ry, center.z));
    bbox.include_point(Point3::new(center.x + rx, center.y + ry, center.z));
}

/// Centre and display scale that fit the primitives into `target`.
pub fn compute_bounds(primitives: &[Primitive], target: FitTarget) -> ModelFit {
    let bbox = primitive_bounds(primitives);
    if bbox.is_empty() {
        return ModelFit {
            center: Point3::origin(),
            scale: 1.0,
            bbox: None,
        };
    }

    let mut max_extent = bbox.max_extent();
    if max_extent <= MIN_EXTENT {
        max_extent = 1.0;
    }
    let scale = (target.size() / max_extent).clamp(MODEL_SCALE_MIN, MODEL_SCALE_MAX);

    ModelFit {
        center: bbox.center(),
        scale,
        bbox: Some(bbox),
    }
}
