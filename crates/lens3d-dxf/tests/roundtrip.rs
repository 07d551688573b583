use dxf::entities::{Entity, EntityType};
use dxf::{Drawing, Point, Vector};
use lens3d_core::bounds::{compute_bounds, FitTarget};
use lens3d_core::geom::{Point2, Point3};
use lens3d_core::model::{
    Arc, Attributes, Circle, Ellipse, Handle, Instance, Model, Polyline2, Polyline3, Primitive,
    Segment,
};
use lens3d_dxf::{
    build_drawing, export_dxf, import_drawing, import_dxf, DxfImportOptions, ExportOptions,
    TargetTables,
};

fn styled(layer: &str, color: i16) -> Attributes {
    Attributes {
        layer: Some(layer.to_string()),
        linetype: None,
        color_index: Some(color),
    }
}

fn sample_model() -> Model {
    let mut seg = Segment::new(
        Handle::new("A"),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 2.5),
    );
    seg.attrs = styled("0", 163);
    Model::new(vec![
        Primitive::Segment(seg),
        Primitive::Circle(Circle {
            handle: Handle::new("B"),
            center: Point3::new(5.0, 5.0, 0.0),
            radius: 2.0,
            attrs: styled("0", 1),
        }),
        Primitive::Polyline2(Polyline2 {
            handle: Handle::new("C"),
            vertices: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
            closed: true,
            attrs: Attributes::default(),
        }),
        Primitive::Polyline3(Polyline3 {
            handle: Handle::new("D"),
            vertices: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)],
            attrs: Attributes::default(),
        }),
    ])
}

#[test]
fn drawing_round_trips_supported_primitives() {
    let (drawing, stats) = build_drawing(&sample_model(), &TargetTables::default());
    assert_eq!(stats.written, 4);
    assert_eq!(stats.dropped, 0);

    let back = import_drawing(&drawing, &DxfImportOptions::default()).model;
    assert_eq!(back.len(), 4);

    let Primitive::Segment(seg) = &back.primitives[0] else {
        panic!("expected a segment, got {:?}", back.primitives[0]);
    };
    assert_eq!(seg.end, Point3::new(10.0, 0.0, 2.5));
    assert_eq!(seg.attrs.color_index, Some(163));

    let Primitive::Circle(circle) = &back.primitives[1] else {
        panic!("expected a circle");
    };
    assert_eq!(circle.radius, 2.0);

    let Primitive::Polyline2(poly) = &back.primitives[2] else {
        panic!("expected a 2D polyline");
    };
    assert!(poly.closed);
    assert_eq!(poly.vertices.len(), 3);

    let Primitive::Polyline3(poly) = &back.primitives[3] else {
        panic!("expected a 3D polyline");
    };
    assert_eq!(poly.vertices[1], Point3::new(1.0, 2.0, 3.0));
}

#[test]
fn color_filter_keeps_matching_entities_only() {
    let (drawing, _) = build_drawing(&sample_model(), &TargetTables::default());
    let opts = DxfImportOptions {
        color_filter: Some(163),
    };
    let model = import_drawing(&drawing, &opts).model;
    assert_eq!(model.len(), 1);
    assert!(model.primitives[0].as_segment().is_some());
}

#[test]
fn instances_are_dropped_on_export() {
    let model = Model::new(vec![Primitive::Instance(Instance {
        handle: Handle::new("I"),
        block_name: "BOLT".into(),
        offset: Point3::origin(),
        children: Vec::new(),
        attrs: Attributes::default(),
    })]);
    let (_, stats) = build_drawing(&model, &TargetTables::default());
    assert_eq!(stats.written, 0);
    assert_eq!(stats.dropped, 1);
}

#[test]
fn unknown_layers_fall_back_to_default() {
    let mut tables = TargetTables::default();
    tables.add_layer("CUT");

    assert_eq!(tables.resolve_layer(Some("cut")), ("CUT", false));
    assert_eq!(tables.resolve_layer(Some("MISSING")), ("0", true));
    assert_eq!(tables.resolve_layer(None), ("0", false));
    assert_eq!(tables.resolve_linetype(Some("DASHED")), (Some("Continuous"), true));

    let mut seg = Segment::new(Handle::new("A"), Point3::origin(), Point3::new(1.0, 0.0, 0.0));
    seg.attrs.layer = Some("missing".into());
    let model = Model::new(vec![Primitive::Segment(seg)]);
    let (drawing, stats) = build_drawing(&model, &tables);
    assert_eq!(stats.style_fallbacks, 1);

    let back = import_drawing(&drawing, &DxfImportOptions::default()).model;
    assert_eq!(back.primitives[0].attrs().layer.as_deref(), Some("0"));
}

#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.dxf");

    let stats = export_dxf(&sample_model(), &path, &ExportOptions::default()).unwrap();
    assert_eq!(stats.written, 4);

    let model = import_dxf(&path).unwrap();
    assert_eq!(model.len(), 4);
    assert_eq!(model.segments().len(), 1);
}

#[test]
fn missing_file_reports_path() {
    let err = import_dxf(std::path::Path::new("/nonexistent/drawing.dxf")).unwrap_err();
    assert!(format!("{err:#}").contains("drawing.dxf"));
}

#[test]
fn missing_linetype_stays_by_layer() {
    let tables = TargetTables::default();
    assert_eq!(tables.resolve_linetype(None), (None, false));
    assert_eq!(tables.resolve_linetype(Some("ByLayer")), (Some("BYLAYER"), false));
    assert_eq!(tables.resolve_linetype(Some("byblock")), (Some("BYBLOCK"), false));

    let mut styled = Segment::new(Handle::new("B"), Point3::origin(), Point3::new(0.0, 1.0, 0.0));
    styled.attrs.linetype = Some("BYLAYER".into());
    let model = Model::new(vec![
        Primitive::Segment(Segment::new(
            Handle::new("A"),
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        )),
        Primitive::Segment(styled),
    ]);
    let (drawing, stats) = build_drawing(&model, &tables);
    assert_eq!(stats.style_fallbacks, 0);
    for ent in drawing.entities() {
        assert!(ent.common.line_type_name.eq_ignore_ascii_case("BYLAYER"));
    }
}

fn angle_close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn arcs_and_ellipses_round_trip() {
    let model = Model::new(vec![
        Primitive::Arc(Arc {
            handle: Handle::new("A"),
            center: Point3::new(1.0, 2.0, 0.0),
            radius: 3.0,
            start_angle_deg: 30.0,
            end_angle_deg: 300.0,
            attrs: Attributes::default(),
        }),
        Primitive::Ellipse(Ellipse {
            handle: Handle::new("E"),
            center: Point3::origin(),
            major_axis: 4.0,
            minor_axis: 1.0,
            start_angle_deg: 0.0,
            end_angle_deg: 90.0,
            attrs: Attributes::default(),
        }),
    ]);
    let (drawing, stats) = build_drawing(&model, &TargetTables::default());
    assert_eq!(stats.written, 2);

    let back = import_drawing(&drawing, &DxfImportOptions::default()).model;
    let Primitive::Arc(arc) = &back.primitives[0] else {
        panic!("expected an arc, got {:?}", back.primitives[0]);
    };
    assert_eq!(arc.radius, 3.0);
    assert!(angle_close(arc.start_angle_deg, 30.0));
    assert!(angle_close(arc.end_angle_deg, 300.0));

    let Primitive::Ellipse(ellipse) = &back.primitives[1] else {
        panic!("expected an ellipse, got {:?}", back.primitives[1]);
    };
    assert!((ellipse.major_axis - 4.0).abs() < 1e-12);
    assert!((ellipse.minor_axis - 1.0).abs() < 1e-12);
    assert!(angle_close(ellipse.start_angle_deg, 0.0));
    assert!(angle_close(ellipse.end_angle_deg, 90.0));
}

#[test]
fn ellipse_axis_vector_is_half_the_axis_length() {
    let mut drawing = Drawing::new();
    drawing.add_entity(Entity::new(EntityType::Ellipse(dxf::entities::Ellipse {
        center: Point::new(0.0, 0.0, 0.0),
        major_axis: Vector::new(2.0, 0.0, 0.0),
        minor_axis_ratio: 0.5,
        ..Default::default()
    })));

    let model = import_drawing(&drawing, &DxfImportOptions::default()).model;
    let Primitive::Ellipse(ellipse) = &model.primitives[0] else {
        panic!("expected an ellipse");
    };
    assert_eq!(ellipse.major_axis, 4.0);
    assert_eq!(ellipse.minor_axis, 2.0);

    let bbox = compute_bounds(&model.primitives, FitTarget::Fixed(15.0)).bbox.unwrap();
    assert_eq!((bbox.min.x, bbox.max.x), (-4.0, 4.0));
    assert_eq!((bbox.min.y, bbox.max.y), (-2.0, 2.0));

    let (written, _) = build_drawing(&model, &TargetTables::default());
    let EntityType::Ellipse(out) = &written.entities().next().unwrap().specific else {
        panic!("expected an ellipse entity");
    };
    assert_eq!(out.major_axis.x, 2.0);
    assert_eq!(out.minor_axis_ratio, 0.5);
}

#[test]
fn inserts_expand_one_block_level() {
    let mut drawing = Drawing::new();
    let mut block = dxf::Block {
        name: "Bolt".into(),
        ..Default::default()
    };
    block.entities.push(Entity::new(EntityType::Line(dxf::entities::Line::new(
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
    ))));
    block.entities.push(Entity::new(EntityType::Insert(dxf::entities::Insert {
        name: "Washer".into(),
        ..Default::default()
    })));
    drawing.add_block(block);
    drawing.add_entity(Entity::new(EntityType::Insert(dxf::entities::Insert {
        name: "BOLT".into(),
        location: Point::new(5.0, 0.0, 0.0),
        ..Default::default()
    })));
    drawing.add_entity(Entity::new(EntityType::Insert(dxf::entities::Insert {
        name: "Missing".into(),
        ..Default::default()
    })));

    let import = import_drawing(&drawing, &DxfImportOptions::default());
    assert_eq!(import.model.len(), 1);
    let Primitive::Instance(instance) = &import.model.primitives[0] else {
        panic!("expected an instance, got {:?}", import.model.primitives[0]);
    };
    assert_eq!(instance.block_name, "Bolt");
    assert_eq!(instance.offset, Point3::new(5.0, 0.0, 0.0));
    assert_eq!(instance.children.len(), 1);
    assert!(instance.children[0].as_segment().is_some());

    assert_eq!(import.skipped.get("Insert (nested)"), Some(&1));
    assert_eq!(import.skipped.get("Insert (missing block)"), Some(&1));
}
