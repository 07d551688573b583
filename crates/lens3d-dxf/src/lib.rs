use anyhow::{Context, Result};
use dxf::entities::EntityType;
use lens3d_core::geom::{Point2, Point3};
use lens3d_core::model::{
    Arc, Attributes, Circle, Ellipse, Handle, Instance, Model, Polyline2, Polyline3, Primitive,
    Segment,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

mod export;

pub use export::{build_drawing, export_dxf, ExportOptions, ExportStats, TargetTables};

#[derive(Debug, Clone, Default)]
pub struct DxfImportOptions {
    /// Keep only top-level entities with this ACI colour index.
    pub color_filter: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct DxfImport {
    pub model: Model,
    /// Entity type names that were present but not imported, with counts.
    pub skipped: BTreeMap<String, usize>,
}

pub fn import_dxf(path: &Path) -> Result<Model> {
    Ok(import_dxf_with(path, &DxfImportOptions::default())?.model)
}

pub fn import_dxf_with(path: &Path, opts: &DxfImportOptions) -> Result<DxfImport> {
    let drawing = dxf::Drawing::load_file(path).with_context(|| format!("load DXF: {path:?}"))?;
    let import = import_drawing(&drawing, opts);
    tracing::info!(
        path = %path.display(),
        entities = import.model.len(),
        skipped = import.skipped.values().sum::<usize>(),
        "loaded DXF"
    );
    Ok(import)
}

/// Convert an already loaded drawing.
pub fn import_drawing(drawing: &dxf::Drawing, opts: &DxfImportOptions) -> DxfImport {
    let mut importer = DxfImporter::new(drawing);
    for ent in drawing.entities() {
        if let Some(index) = opts.color_filter {
            if ent.common.color.index() != Some(index) {
                continue;
            }
        }
        if let Some(p) = importer.import_entity(ent, true) {
            importer.primitives.push(p);
        }
    }
    DxfImport {
        model: Model::new(importer.primitives),
        skipped: importer.skipped,
    }
}

struct DxfImporter<'a> {
    blocks: HashMap<String, &'a dxf::Block>,
    primitives: Vec<Primitive>,
    skipped: BTreeMap<String, usize>,
}

impl<'a> DxfImporter<'a> {
    fn new(drawing: &'a dxf::Drawing) -> Self {
        let mut blocks = HashMap::new();
        for block in drawing.blocks() {
            blocks.insert(block.name.to_ascii_lowercase(), block);
        }
        Self {
            blocks,
            primitives: Vec::new(),
            skipped: BTreeMap::new(),
        }
    }

    /// `top_level` is false inside a block: block references nest only one level deep.
    fn import_entity(&mut self, ent: &dxf::entities::Entity, top_level: bool) -> Option<Primitive> {
        let handle = handle_of(ent);
        let attrs = attributes_of(ent);
        match &ent.specific {
            EntityType::Line(line) => Some(Primitive::Segment(Segment {
                handle,
                start: point3(&line.p1),
                end: point3(&line.p2),
                attrs,
            })),
            EntityType::Circle(circle) => Some(Primitive::Circle(Circle {
                handle,
                center: point3(&circle.center),
                radius: circle.radius,
                attrs,
            })),
            EntityType::Arc(arc) => Some(Primitive::Arc(Arc {
                handle,
                center: point3(&arc.center),
                radius: arc.radius,
                start_angle_deg: arc.start_angle,
                end_angle_deg: arc.end_angle,
                attrs,
            })),
            EntityType::Ellipse(ellipse) => {
                // The DXF vector is the semi-axis; the model keeps full axis lengths.
                let major = &ellipse.major_axis;
                let major_len =
                    2.0 * (major.x * major.x + major.y * major.y + major.z * major.z).sqrt();
                if !major_len.is_finite() || major_len <= 0.0 {
                    self.skip("Ellipse (degenerate)");
                    return None;
                }
                Some(Primitive::Ellipse(Ellipse {
                    handle,
                    center: point3(&ellipse.center),
                    major_axis: major_len,
                    minor_axis: major_len * ellipse.minor_axis_ratio,
                    start_angle_deg: ellipse.start_parameter.to_degrees(),
                    end_angle_deg: ellipse.end_parameter.to_degrees(),
                    attrs,
                }))
            }
            EntityType::LwPolyline(poly) => Some(Primitive::Polyline2(Polyline2 {
                handle,
                vertices: poly.vertices.iter().map(|v| Point2::new(v.x, v.y)).collect(),
                closed: poly.is_closed(),
                attrs,
            })),
            EntityType::Polyline(poly) => {
                if poly.is_3d_polyline() {
                    Some(Primitive::Polyline3(Polyline3 {
                        handle,
                        vertices: poly.vertices().map(|v| point3(&v.location)).collect(),
                        attrs,
                    }))
                } else {
                    Some(Primitive::Polyline2(Polyline2 {
                        handle,
                        vertices: poly
                            .vertices()
                            .map(|v| Point2::new(v.location.x, v.location.y))
                            .collect(),
                        closed: poly.is_closed(),
                        attrs,
                    }))
                }
            }
            EntityType::Insert(insert) if top_level => {
                let name = insert.name.to_ascii_lowercase();
                let Some(block) = self.blocks.get(&name).copied() else {
                    tracing::debug!(block = %insert.name, "insert references a missing block");
                    self.skip("Insert (missing block)");
                    return None;
                };
                let children = block
                    .entities
                    .iter()
                    .filter_map(|child| self.import_entity(child, false))
                    .collect();
                Some(Primitive::Instance(Instance {
                    handle,
                    block_name: block.name.clone(),
                    offset: point3(&insert.location),
                    children,
                    attrs,
                }))
            }
            EntityType::Insert(_) => {
                self.skip("Insert (nested)");
                None
            }
            other => {
                self.skip(entity_type_name(other));
                None
            }
        }
    }

    fn skip(&mut self, what: &str) {
        tracing::debug!(entity = what, "skipping unsupported DXF entity");
        *self.skipped.entry(what.to_string()).or_default() += 1;
    }
}

fn point3(p: &dxf::Point) -> Point3 {
    Point3::new(p.x, p.y, p.z)
}

fn handle_of(ent: &dxf::entities::Entity) -> Handle {
    Handle::new(format!("{:X}", ent.common.handle.0))
}

fn attributes_of(ent: &dxf::entities::Entity) -> Attributes {
    Attributes {
        layer: empty_to_none(&ent.common.layer),
        linetype: empty_to_none(&ent.common.line_type_name),
        color_index: ent.common.color.index().map(i16::from),
    }
}

fn entity_type_name(specific: &EntityType) -> &'static str {
    match specific {
        EntityType::Text(_) => "Text",
        EntityType::MText(_) => "MText",
        EntityType::Spline(_) => "Spline",
        EntityType::Solid(_) => "Solid",
        EntityType::Face3D(_) => "Face3D",
        EntityType::ModelPoint(_) => "Point",
        EntityType::RotatedDimension(_)
        | EntityType::RadialDimension(_)
        | EntityType::DiameterDimension(_)
        | EntityType::AngularThreePointDimension(_)
        | EntityType::OrdinateDimension(_) => "Dimension",
        _ => "Other",
    }
}

fn empty_to_none(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
