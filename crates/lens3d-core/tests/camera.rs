use lens3d_core::camera::{
    gl_projection, project, unproject, unproject_on_plane, StandardView, ViewState, ViewportKind,
};
use lens3d_core::geom::{Point2, Point3};

fn flat_view() -> ViewState {
    ViewState {
        rotation_x: 0.0,
        rotation_y: 0.0,
        ..ViewState::default()
    }
}

#[test]
fn default_view_matches_viewport_reset() {
    let view = ViewState::default();
    assert_eq!(20.0, view.rotation_x);
    assert_eq!(-30.0, view.rotation_y);
    assert_eq!(1.0, view.zoom);
    assert_eq!((0.0, 0.0), (view.pan_x, view.pan_y));
}

#[test]
fn flat_projection_flips_y_and_applies_pan() {
    let view = ViewState {
        pan_x: 10.0,
        pan_y: -4.0,
        ..flat_view()
    }
    .with_fit(Point3::new(1.0, 1.0, 0.0), 2.0);
    let p = project(Point3::new(2.0, 3.0, 0.0), &view, (100, 50));
    assert!((p.x - (100.0 + 2.0 + 10.0)).abs() < 1e-9);
    assert!((p.y - (50.0 - 4.0 - 4.0)).abs() < 1e-9);
}

#[test]
fn y_rotation_then_x_rotation() {
    // 90° about Y sends +Z to -X on screen; 90° about X then lifts it.
    let view = ViewState {
        rotation_x: 0.0,
        rotation_y: 90.0,
        ..ViewState::default()
    };
    let p = project(Point3::new(0.0, 0.0, 1.0), &view, (0, 0));
    assert!((p.x + 1.0).abs() < 1e-9);
    assert!(p.y.abs() < 1e-9);

    let view = ViewState {
        rotation_x: 90.0,
        rotation_y: 0.0,
        ..ViewState::default()
    };
    let p = project(Point3::new(0.0, 0.0, 1.0), &view, (0, 0));
    assert!(p.x.abs() < 1e-9);
    // y' = -z, screen y = -y' = 1.
    assert!((p.y - 1.0).abs() < 1e-9);
}

#[test]
fn unproject_inverts_flat_view() {
    let view = ViewState {
        zoom: 2.5,
        pan_x: 7.0,
        pan_y: 3.0,
        ..flat_view()
    }
    .with_fit(Point3::new(-4.0, 2.0, 0.0), 0.75);
    let world = Point3::new(3.25, -1.5, 0.0);
    let screen = project(world, &view, (320, 240));
    let back = unproject(screen, &view, (320, 240));
    assert!((back.x - world.x).abs() < 1e-9);
    assert!((back.y - world.y).abs() < 1e-9);
    assert_eq!(0.0, back.z);
}

#[test]
fn unproject_always_lands_on_z_zero() {
    let view = ViewState::default().with_fit(Point3::new(0.0, 0.0, 5.0), 1.0);
    let p = unproject(Point2::new(17.0, 93.0), &view, (50, 50));
    assert_eq!(0.0, p.z);
}

#[test]
fn unproject_on_plane_inverts_rotated_view() {
    let view = ViewState::default().with_fit(Point3::new(1.0, 2.0, 3.0), 1.7);
    let world = Point3::new(-2.0, 4.5, 0.0);
    let screen = project(world, &view, (400, 300));
    let back = unproject_on_plane(screen, &view, (400, 300)).expect("plane visible");
    assert!((back.x - world.x).abs() < 1e-9);
    assert!((back.y - world.y).abs() < 1e-9);
    assert_eq!(0.0, back.z);
}

#[test]
fn edge_on_plane_has_no_intersection() {
    let view = ViewState::default().standard(StandardView::Top);
    assert!(unproject_on_plane(Point2::new(1.0, 1.0), &view, (0, 0)).is_none());
}

#[test]
fn drag_rotates_half_a_degree_per_pixel() {
    let view = ViewState::default().rotate_by_drag(10.0, -4.0, 0.5);
    assert_eq!(18.0, view.rotation_x);
    assert_eq!(-25.0, view.rotation_y);
}

#[test]
fn pan_units_depend_on_viewport_kind() {
    let raster = ViewState::new(ViewportKind::Raster).pan_by(5.0, 6.0);
    assert_eq!((5.0, 6.0), (raster.pan_x, raster.pan_y));
    let gl = ViewState::new(ViewportKind::OpenGl).pan_by(100.0, 50.0);
    assert!((gl.pan_x - 1.0).abs() < 1e-12);
    assert!((gl.pan_y + 0.5).abs() < 1e-12);
}

#[test]
fn wheel_zoom_is_clamped_per_kind() {
    let mut raster = ViewState::new(ViewportKind::Raster);
    let mut gl = ViewState::new(ViewportKind::OpenGl);
    for _ in 0..100 {
        raster = raster.zoom_wheel(-120.0, 0.1);
        gl = gl.zoom_wheel(-120.0, 0.1);
    }
    assert_eq!(0.1, raster.zoom);
    assert_eq!(0.2, gl.zoom);
    for _ in 0..100 {
        raster = raster.zoom_wheel(120.0, 0.1);
    }
    assert_eq!(5.0, raster.zoom);
}

#[test]
fn standard_views_reset_pan_and_keep_zoom() {
    let view = ViewState {
        zoom: 2.0,
        pan_x: 30.0,
        pan_y: 40.0,
        ..ViewState::default()
    };
    let back = view.standard("BACK".parse().expect("valid view"));
    assert_eq!((0.0, 180.0), (back.rotation_x, back.rotation_y));
    assert_eq!((0.0, 0.0), (back.pan_x, back.pan_y));
    assert_eq!(2.0, back.zoom);
    assert!("sideways".parse::<StandardView>().is_err());
}

#[test]
fn model_scale_is_clamped() {
    let view = ViewState::default().with_fit(Point3::origin(), 1000.0);
    assert_eq!(10.0, view.model_scale);
    let raw = ViewState {
        model_scale: 0.0001,
        ..ViewState::default()
    };
    assert_eq!(0.01, raw.clamped().model_scale);
}

#[test]
fn gl_projection_is_finite() {
    let m = gl_projection(4.0 / 3.0);
    assert!(m.iter().all(|v| v.is_finite()));
}

#[test]
fn small_drags_are_ignored() {
    let cfg = lens3d_core::config::ViewConfig::default();
    let view = ViewState::default();
    assert_eq!(view.drag(2.0, -1.0, &cfg), view);

    let moved = view.drag(3.0, 0.0, &cfg);
    assert_eq!(moved.rotation_y, -30.0 + 1.5);
    assert_eq!(moved.rotation_x, 20.0);

    let zoomed = view.wheel(120.0, &cfg);
    assert!((zoomed.zoom - 1.1).abs() < 1e-12);
}
