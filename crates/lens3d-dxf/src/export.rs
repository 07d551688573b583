//! Writing a model back out as a DXF drawing.

use anyhow::{Context, Result};
use dxf::entities::{Entity, EntityType, Vertex};
use dxf::enums::AcadVersion;
use dxf::tables::{Layer, LineType};
use dxf::{Color, Drawing, LwPolylineVertex, Point, Vector};
use lens3d_core::geom::Point3;
use lens3d_core::model::{Attributes, Model, Primitive};
use std::path::{Path, PathBuf};

pub const DEFAULT_LAYER: &str = "0";
pub const DEFAULT_LINETYPE: &str = "Continuous";
const BY_LAYER: &str = "BYLAYER";
const BY_BLOCK: &str = "BYBLOCK";

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Drawing whose layer and linetype tables the output should use.
    pub template: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub written: usize,
    /// Block references, which are not written.
    pub dropped: usize,
    /// Entities whose layer or linetype was not in the target tables.
    pub style_fallbacks: usize,
}

/// Layer and linetype names available in the output drawing.
#[derive(Debug, Clone)]
pub struct TargetTables {
    layers: Vec<String>,
    linetypes: Vec<String>,
}

impl Default for TargetTables {
    fn default() -> Self {
        Self {
            layers: vec![DEFAULT_LAYER.to_string()],
            linetypes: vec![DEFAULT_LINETYPE.to_string()],
        }
    }
}

impl TargetTables {
    pub fn from_drawing(drawing: &Drawing) -> Self {
        let mut tables = Self::default();
        for layer in drawing.layers() {
            tables.add_layer(&layer.name);
        }
        for lt in drawing.line_types() {
            tables.add_linetype(&lt.name);
        }
        tables
    }

    pub fn add_layer(&mut self, name: &str) {
        if find(&self.layers, name).is_none() {
            self.layers.push(name.to_string());
        }
    }

    pub fn add_linetype(&mut self, name: &str) {
        if find(&self.linetypes, name).is_none() {
            self.linetypes.push(name.to_string());
        }
    }

    /// Case-insensitive lookup; unknown or missing names map to layer "0".
    pub fn resolve_layer(&self, name: Option<&str>) -> (&str, bool) {
        match name.and_then(|n| find(&self.layers, n)) {
            Some(found) => (found, false),
            None => (DEFAULT_LAYER, name.is_some()),
        }
    }

    /// `None` leaves the entity on its ByLayer default. ByLayer and ByBlock always resolve;
    /// other unknown names map to "Continuous".
    pub fn resolve_linetype(&self, name: Option<&str>) -> (Option<&str>, bool) {
        let Some(name) = name else {
            return (None, false);
        };
        if name.eq_ignore_ascii_case(BY_LAYER) {
            return (Some(BY_LAYER), false);
        }
        if name.eq_ignore_ascii_case(BY_BLOCK) {
            return (Some(BY_BLOCK), false);
        }
        match find(&self.linetypes, name) {
            Some(found) => (Some(found), false),
            None => (Some(DEFAULT_LINETYPE), true),
        }
    }

    fn install(&self, drawing: &mut Drawing) {
        for name in &self.layers {
            if !name.eq_ignore_ascii_case(DEFAULT_LAYER) {
                drawing.add_layer(Layer {
                    name: name.clone(),
                    ..Default::default()
                });
            }
        }
        for name in &self.linetypes {
            let builtin = ["continuous", "bylayer", "byblock"]
                .iter()
                .any(|b| name.eq_ignore_ascii_case(b));
            if !builtin {
                drawing.add_line_type(LineType {
                    name: name.clone(),
                    ..Default::default()
                });
            }
        }
    }
}

fn find<'a>(names: &'a [String], name: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|n| n.eq_ignore_ascii_case(name))
        .map(String::as_str)
}

pub fn export_dxf(model: &Model, path: &Path, opts: &ExportOptions) -> Result<ExportStats> {
    let tables = match &opts.template {
        Some(template) => {
            let drawing = Drawing::load_file(template)
                .with_context(|| format!("load DXF template: {template:?}"))?;
            TargetTables::from_drawing(&drawing)
        }
        None => TargetTables::default(),
    };

    let (drawing, stats) = build_drawing(model, &tables);
    drawing
        .save_file(path)
        .with_context(|| format!("save DXF: {path:?}"))?;
    tracing::info!(
        path = %path.display(),
        written = stats.written,
        dropped = stats.dropped,
        "saved DXF"
    );
    Ok(stats)
}

/// Build the output drawing without touching the filesystem.
pub fn build_drawing(model: &Model, tables: &TargetTables) -> (Drawing, ExportStats) {
    let mut drawing = Drawing::new();
    // LWPOLYLINE and ELLIPSE need R13 or later.
    drawing.header.version = AcadVersion::R2000;
    tables.install(&mut drawing);
    let mut stats = ExportStats::default();

    for prim in &model.primitives {
        let specific = match prim {
            Primitive::Segment(s) => EntityType::Line(dxf::entities::Line::new(
                point(s.start),
                point(s.end),
            )),
            Primitive::Circle(c) => {
                EntityType::Circle(dxf::entities::Circle::new(point(c.center), c.radius))
            }
            Primitive::Arc(a) => EntityType::Arc(dxf::entities::Arc::new(
                point(a.center),
                a.radius,
                a.start_angle_deg,
                a.end_angle_deg,
            )),
            Primitive::Ellipse(e) => {
                let ratio = if e.major_axis > 0.0 {
                    e.minor_axis / e.major_axis
                } else {
                    1.0
                };
                // DXF stores the half-axis as a vector from the centre.
                EntityType::Ellipse(dxf::entities::Ellipse {
                    center: point(e.center),
                    major_axis: Vector::new(e.major_axis / 2.0, 0.0, 0.0),
                    minor_axis_ratio: ratio,
                    start_parameter: e.start_angle_deg.to_radians(),
                    end_parameter: e.end_angle_deg.to_radians(),
                    ..Default::default()
                })
            }
            Primitive::Polyline2(p) => {
                let mut poly = dxf::entities::LwPolyline::default();
                poly.vertices = p
                    .vertices
                    .iter()
                    .map(|v| LwPolylineVertex {
                        x: v.x,
                        y: v.y,
                        ..Default::default()
                    })
                    .collect();
                poly.set_is_closed(p.closed);
                EntityType::LwPolyline(poly)
            }
            Primitive::Polyline3(p) => {
                let mut poly = dxf::entities::Polyline::default();
                poly.set_is_3d_polyline(true);
                for v in &p.vertices {
                    poly.add_vertex(&mut drawing, Vertex::new(point(*v)));
                }
                EntityType::Polyline(poly)
            }
            Primitive::Instance(ins) => {
                tracing::warn!(
                    handle = %ins.handle,
                    block = %ins.block_name,
                    "block references are not exported"
                );
                stats.dropped += 1;
                continue;
            }
        };

        let mut ent = Entity::new(specific);
        if apply_attributes(&mut ent, prim.attrs(), tables) {
            stats.style_fallbacks += 1;
        }
        drawing.add_entity(ent);
        stats.written += 1;
    }

    (drawing, stats)
}

/// Returns true when a named layer or linetype had to fall back to the default.
fn apply_attributes(ent: &mut Entity, attrs: &Attributes, tables: &TargetTables) -> bool {
    let (layer, layer_fallback) = tables.resolve_layer(attrs.layer.as_deref());
    let (linetype, linetype_fallback) = tables.resolve_linetype(attrs.linetype.as_deref());
    ent.common.layer = layer.to_string();
    if let Some(linetype) = linetype {
        ent.common.line_type_name = linetype.to_string();
    }
    if let Some(index) = attrs.color_index.and_then(|c| u8::try_from(c).ok()) {
        ent.common.color = Color::from_index(index);
    }
    if layer_fallback || linetype_fallback {
        tracing::debug!(
            layer = ?attrs.layer,
            linetype = ?attrs.linetype,
            "style not in target tables, using defaults"
        );
    }
    layer_fallback || linetype_fallback
}

fn point(p: Point3) -> Point {
    Point::new(p.x, p.y, p.z)
}
