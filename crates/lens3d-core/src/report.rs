use crate::bounds::{compute_bounds, FitTarget, ModelFit};
use crate::model::{Model, Primitive, PrimitiveKind};
use crate::planes::PlaneRecord;
use crate::reorder::RearrangedLine;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySummary {
    pub entities_total: usize,
    pub segments: usize,
    pub kinds: BTreeMap<String, usize>,
    pub fit: ModelFit,
}

impl EntitySummary {
    pub fn new(model: &Model, target: FitTarget) -> Self {
        let counts = model.primitives.iter().map(Primitive::kind).counts();
        let kinds = counts
            .into_iter()
            .sorted()
            .map(|(kind, n)| (kind.name().to_string(), n))
            .collect();
        Self {
            entities_total: model.len(),
            segments: model.primitives.iter().filter(|p| p.kind() == PrimitiveKind::Segment).count(),
            kinds,
            fit: compute_bounds(&model.primitives, target),
        }
    }
}

fn xyz(p: crate::geom::Point3) -> String {
    format!("({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)
}

/// Human-readable dump of every entity, in document order.
pub fn describe_model(model: &Model, source: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Parsed entities ===");
    let _ = writeln!(out, "Source: {source}");
    let _ = writeln!(out, "Entities: {}", model.len());
    let _ = writeln!(out);

    let _ = writeln!(out, "=== Entity types ===");
    for (kind, n) in model.primitives.iter().map(Primitive::kind).counts().into_iter().sorted() {
        let _ = writeln!(out, "{}: {n}", kind.name());
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "=== Entity details ===");
    for (i, prim) in model.primitives.iter().enumerate() {
        let _ = writeln!(out, "[{}] {}: {}", i + 1, prim.kind().name(), prim.handle());
        match prim {
            Primitive::Segment(s) => {
                let _ = writeln!(out, "   start: {}", xyz(s.start));
                let _ = writeln!(out, "   end: {}", xyz(s.end));
            }
            Primitive::Circle(c) => {
                let _ = writeln!(out, "   center: {}", xyz(c.center));
                let _ = writeln!(out, "   radius: {:.2}", c.radius);
            }
            Primitive::Arc(a) => {
                let _ = writeln!(out, "   center: {}", xyz(a.center));
                let _ = writeln!(out, "   radius: {:.2}", a.radius);
                let _ = writeln!(out, "   start angle: {:.2}°", a.start_angle_deg);
                let _ = writeln!(out, "   end angle: {:.2}°", a.end_angle_deg);
            }
            Primitive::Polyline2(p) => {
                let _ = writeln!(out, "   vertices: {}", p.vertices.len());
                if let (Some(first), Some(last)) = (p.vertices.first(), p.vertices.last()) {
                    let _ = writeln!(out, "   first vertex: ({:.2}, {:.2})", first.x, first.y);
                    let _ = writeln!(out, "   last vertex: ({:.2}, {:.2})", last.x, last.y);
                }
            }
            Primitive::Polyline3(p) => {
                let _ = writeln!(out, "   vertices: {}", p.vertices.len());
                if let (Some(first), Some(last)) = (p.vertices.first(), p.vertices.last()) {
                    let _ = writeln!(out, "   first vertex: {}", xyz(*first));
                    let _ = writeln!(out, "   last vertex: {}", xyz(*last));
                }
            }
            Primitive::Ellipse(e) => {
                let _ = writeln!(out, "   center: {}", xyz(e.center));
                let _ = writeln!(out, "   major axis: {:.2}", e.major_axis);
                let _ = writeln!(out, "   minor axis: {:.2}", e.minor_axis);
                let _ = writeln!(out, "   start angle: {:.2}°", e.start_angle_deg);
                let _ = writeln!(out, "   end angle: {:.2}°", e.end_angle_deg);
            }
            Primitive::Instance(ins) => {
                let _ = writeln!(out, "   insert point: {}", xyz(ins.offset));
                let _ = writeln!(out, "   block: {}", ins.block_name);
                let _ = writeln!(out, "   children: {}", ins.children.len());
            }
        }
        let _ = writeln!(out);
    }
    out
}

pub fn describe_planes(planes: &[PlaneRecord], source_segments: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Plane extraction ===");
    let _ = writeln!(out);
    let _ = writeln!(out, "Source segments: {source_segments}");
    let _ = writeln!(out, "Planes: {}", planes.len());
    let _ = writeln!(out);
    for (i, plane) in planes.iter().enumerate() {
        let _ = writeln!(out, "Plane {}:", i + 1);
        let _ = writeln!(out, "  segments: {} and {}", plane.first.handle, plane.second.handle);
        let _ = writeln!(out, "  area: {:.4}", plane.area);
        for (j, p) in plane.points.iter().enumerate() {
            let _ = writeln!(out, "  vertex {}: {}", j + 1, xyz(*p));
        }
        let _ = writeln!(out);
    }
    if planes.is_empty() {
        let _ = writeln!(out, "No adjacent segment pairs found");
    }
    out
}

pub fn describe_rearrangement(lines: &[RearrangedLine]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Line rearrangement ===");
    let _ = writeln!(out);
    if let Some(first) = lines.first() {
        let _ = writeln!(out, "Start segment: {}", first.original_index);
        let _ = writeln!(out);
    }
    for (i, line) in lines.iter().enumerate() {
        let closing = if i + 1 == lines.len() { " (closed loop)" } else { "" };
        let _ = writeln!(out, "[{}] original index: {}", line.position, line.original_index);
        let _ = writeln!(out, "   handle: {}", line.segment.handle);
        let _ = writeln!(out, "   start: {}", xyz(line.segment.start));
        let _ = writeln!(out, "   end: {}", xyz(line.segment.end));
        let _ = writeln!(out, "   to next: {:.4}{closing}", line.distance_to_next);
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "Total segments: {}", lines.len());
    out
}
