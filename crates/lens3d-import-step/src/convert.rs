//! Turn parsed records into wireframe primitives.

use crate::parser::{StepFile, StepRecord, StepValue};
use lens3d_core::geom::Point3;
use lens3d_core::model::{Attributes, Circle, Handle, Model, Primitive, Segment};

/// Reference chains longer than this are treated as unresolvable.
const MAX_REF_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub lines: usize,
    pub circles: usize,
    pub edges: usize,
    /// Geometry records whose references did not lead to usable points.
    pub unresolved: usize,
}

impl StepFile {
    pub fn to_model(&self) -> Model {
        self.to_model_with_stats().0
    }

    /// LINEs first, then CIRCLEs, then EDGE_CURVEs, each ascending by id.
    pub fn to_model_with_stats(&self) -> (Model, ConvertStats) {
        let mut stats = ConvertStats::default();
        let mut primitives = Vec::new();

        for rec in self.of_type("LINE") {
            match self.line_segment(rec) {
                Some(seg) => {
                    primitives.push(Primitive::Segment(seg));
                    stats.lines += 1;
                }
                None => self.unresolved(rec, &mut stats),
            }
        }
        for rec in self.of_type("CIRCLE") {
            match self.circle(rec) {
                Some(circle) => {
                    primitives.push(Primitive::Circle(circle));
                    stats.circles += 1;
                }
                None => self.unresolved(rec, &mut stats),
            }
        }
        for rec in self.of_type("EDGE_CURVE") {
            match self.edge_segment(rec) {
                Some(seg) => {
                    primitives.push(Primitive::Segment(seg));
                    stats.edges += 1;
                }
                None => self.unresolved(rec, &mut stats),
            }
        }

        (Model::new(primitives), stats)
    }

    fn unresolved(&self, rec: &StepRecord, stats: &mut ConvertStats) {
        tracing::debug!(id = rec.id, kind = %rec.type_name, "unresolved geometry record");
        stats.unresolved += 1;
    }

    /// LINE(name, #pnt, #vector): from the point along magnitude × direction.
    fn line_segment(&self, rec: &StepRecord) -> Option<Segment> {
        let start = self.point_param(rec, 1)?;
        let vector = self.get(rec.param(2)?.as_ref_id()?)?;
        if vector.type_name != "VECTOR" {
            return None;
        }
        let direction = self.direction(vector.param(1)?.as_ref_id()?)?;
        let magnitude = vector.param(2)?.as_number()?;
        Some(segment(rec, start, start.add(direction.scale(magnitude))))
    }

    /// CIRCLE(name, #placement, radius).
    fn circle(&self, rec: &StepRecord) -> Option<Circle> {
        let center = self.point_param(rec, 1)?;
        let radius = rec.param(2)?.as_number()?;
        if !radius.is_finite() || radius <= 0.0 {
            return None;
        }
        Some(Circle {
            handle: handle(rec),
            center,
            radius,
            attrs: Attributes::default(),
        })
    }

    /// EDGE_CURVE(name, #v1, #v2, #curve, same_sense).
    fn edge_segment(&self, rec: &StepRecord) -> Option<Segment> {
        let start = self.point_param(rec, 1)?;
        let end = self.point_param(rec, 2)?;
        Some(segment(rec, start, end))
    }

    fn point_param(&self, rec: &StepRecord, index: usize) -> Option<Point3> {
        self.resolve_point(rec.param(index)?.as_ref_id()?, 0)
    }

    /// Follow VERTEX_POINT and placement references down to a CARTESIAN_POINT.
    pub fn resolve_point(&self, id: u64, depth: usize) -> Option<Point3> {
        if depth > MAX_REF_DEPTH {
            return None;
        }
        let rec = self.get(id)?;
        match rec.type_name.as_str() {
            "CARTESIAN_POINT" => coords(rec.param(1)?),
            "VERTEX_POINT" | "AXIS2_PLACEMENT_3D" | "AXIS2_PLACEMENT_2D" | "AXIS1_PLACEMENT" => {
                self.resolve_point(rec.param(1)?.as_ref_id()?, depth + 1)
            }
            _ => None,
        }
    }

    fn direction(&self, id: u64) -> Option<Point3> {
        let rec = self.get(id)?;
        if rec.type_name != "DIRECTION" {
            return None;
        }
        coords(rec.param(1)?)
    }
}

/// Two or three coordinates; a missing z is 0.
fn coords(value: &StepValue) -> Option<Point3> {
    match value.as_numbers()?.as_slice() {
        &[x, y] => Some(Point3::new(x, y, 0.0)),
        &[x, y, z] => Some(Point3::new(x, y, z)),
        _ => None,
    }
}

fn handle(rec: &StepRecord) -> Handle {
    Handle::new(format!("#{}", rec.id))
}

fn segment(rec: &StepRecord, start: Point3, end: Point3) -> Segment {
    Segment::new(handle(rec), start, end)
}
