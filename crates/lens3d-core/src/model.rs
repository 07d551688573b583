use crate::geom::{Point2, Point3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque entity identifier carried through from the source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Handle(pub String);

impl Handle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display attributes. Never interpreted by the geometry code, only passed along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Attributes {
    pub layer: Option<String>,
    pub linetype: Option<String>,
    pub color_index: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub handle: Handle,
    pub start: Point3,
    pub end: Point3,
    pub attrs: Attributes,
}

impl Segment {
    pub fn new(handle: Handle, start: Point3, end: Point3) -> Self {
        Self {
            handle,
            start,
            end,
            attrs: Attributes::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub handle: Handle,
    pub center: Point3,
    pub radius: f64,
    pub attrs: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub handle: Handle,
    pub center: Point3,
    pub radius: f64,
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
    pub attrs: Attributes,
}

impl Arc {
    /// Sweep from start to end in the positive direction, in `[0, 360)`.
    pub fn sweep_deg(&self) -> f64 {
        (self.end_angle_deg - self.start_angle_deg).rem_euclid(360.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub handle: Handle,
    pub center: Point3,
    /// Full axis lengths, not semi-axes. Bounds extend by these on either side of the centre.
    pub major_axis: f64,
    pub minor_axis: f64,
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
    pub attrs: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline3 {
    pub handle: Handle,
    pub vertices: Vec<Point3>,
    pub attrs: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline2 {
    pub handle: Handle,
    pub vertices: Vec<Point2>,
    pub closed: bool,
    pub attrs: Attributes,
}

/// A block reference: the block's primitives placed at `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub handle: Handle,
    pub block_name: String,
    pub offset: Point3,
    pub children: Vec<Primitive>,
    pub attrs: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Segment(Segment),
    Polyline3(Polyline3),
    Polyline2(Polyline2),
    Circle(Circle),
    Arc(Arc),
    Ellipse(Ellipse),
    Instance(Instance),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Segment,
    Polyline3,
    Polyline2,
    Circle,
    Arc,
    Ellipse,
    Instance,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Segment => "Line",
            PrimitiveKind::Polyline3 => "Polyline3D",
            PrimitiveKind::Polyline2 => "Polyline2D",
            PrimitiveKind::Circle => "Circle",
            PrimitiveKind::Arc => "Arc",
            PrimitiveKind::Ellipse => "Ellipse",
            PrimitiveKind::Instance => "Insert",
        }
    }
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Segment(_) => PrimitiveKind::Segment,
            Primitive::Polyline3(_) => PrimitiveKind::Polyline3,
            Primitive::Polyline2(_) => PrimitiveKind::Polyline2,
            Primitive::Circle(_) => PrimitiveKind::Circle,
            Primitive::Arc(_) => PrimitiveKind::Arc,
            Primitive::Ellipse(_) => PrimitiveKind::Ellipse,
            Primitive::Instance(_) => PrimitiveKind::Instance,
        }
    }

    pub fn handle(&self) -> &Handle {
        match self {
            Primitive::Segment(p) => &p.handle,
            Primitive::Polyline3(p) => &p.handle,
            Primitive::Polyline2(p) => &p.handle,
            Primitive::Circle(p) => &p.handle,
            Primitive::Arc(p) => &p.handle,
            Primitive::Ellipse(p) => &p.handle,
            Primitive::Instance(p) => &p.handle,
        }
    }

    pub fn attrs(&self) -> &Attributes {
        match self {
            Primitive::Segment(p) => &p.attrs,
            Primitive::Polyline3(p) => &p.attrs,
            Primitive::Polyline2(p) => &p.attrs,
            Primitive::Circle(p) => &p.attrs,
            Primitive::Arc(p) => &p.attrs,
            Primitive::Ellipse(p) => &p.attrs,
            Primitive::Instance(p) => &p.attrs,
        }
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Primitive::Segment(s) => Some(s),
            _ => None,
        }
    }
}

/// The loaded entity list, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Model {
    pub primitives: Vec<Primitive>,
}

impl Model {
    pub fn new(primitives: Vec<Primitive>) -> Self {
        Self { primitives }
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    /// Top-level segments in document order. Segments nested in instances are not included.
    pub fn segments(&self) -> Vec<Segment> {
        self.primitives
            .iter()
            .filter_map(Primitive::as_segment)
            .cloned()
            .collect()
    }
}
