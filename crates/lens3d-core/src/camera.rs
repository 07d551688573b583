//! Orthographic camera used by the raster viewport, its inverse onto the model plane,
//! and the matrix form used by the OpenGL viewport.
//!
//! A [`ViewState`] is a plain value. Pointer and wheel interactions return a new state
//! instead of mutating the old one, so rendering and picking always read a consistent
//! snapshot.

use crate::config::ViewConfig;
use crate::geom::{Point2, Point3};
use nalgebra::{Matrix4, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MODEL_SCALE_MIN: f64 = 0.01;
pub const MODEL_SCALE_MAX: f64 = 10.0;

/// Camera distance of the perspective viewport, independent of model scale.
pub const GL_CAMERA_DISTANCE: f64 = 30.0;
pub const GL_FOV_DEG: f64 = 45.0;
pub const GL_NEAR: f64 = 0.1;
pub const GL_FAR: f64 = 10000.0;

/// Which viewport flavour the state drives. The two differ in zoom limits and pan units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewportKind {
    /// 2D-projected raster viewport: pan in pixels, zoom in `[0.1, 5.0]`.
    #[default]
    Raster,
    /// Perspective OpenGL viewport: pan in scene units, zoom in `[0.2, 5.0]`.
    OpenGl,
}

impl ViewportKind {
    pub fn zoom_range(&self) -> (f64, f64) {
        match self {
            ViewportKind::Raster => (0.1, 5.0),
            ViewportKind::OpenGl => (0.2, 5.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandardView {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl StandardView {
    /// `(rotation_x, rotation_y)` in degrees.
    pub fn rotations(&self) -> (f64, f64) {
        match self {
            StandardView::Front => (0.0, 0.0),
            StandardView::Back => (0.0, 180.0),
            StandardView::Left => (0.0, 90.0),
            StandardView::Right => (0.0, -90.0),
            StandardView::Top => (-90.0, 0.0),
            StandardView::Bottom => (90.0, 0.0),
        }
    }
}

impl FromStr for StandardView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" => Ok(StandardView::Front),
            "back" => Ok(StandardView::Back),
            "left" => Ok(StandardView::Left),
            "right" => Ok(StandardView::Right),
            "top" => Ok(StandardView::Top),
            "bottom" => Ok(StandardView::Bottom),
            other => Err(format!("unknown standard view: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub kind: ViewportKind,
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub model_center: Point3,
    pub model_scale: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewportKind::Raster)
    }
}

impl ViewState {
    /// The state a viewport resets to when a new entity set is loaded.
    pub fn new(kind: ViewportKind) -> Self {
        Self {
            kind,
            rotation_x: 20.0,
            rotation_y: -30.0,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            model_center: Point3::origin(),
            model_scale: 1.0,
        }
    }

    pub fn effective_zoom(&self) -> f64 {
        let (lo, hi) = self.kind.zoom_range();
        self.zoom.clamp(lo, hi)
    }

    pub fn effective_model_scale(&self) -> f64 {
        self.model_scale.clamp(MODEL_SCALE_MIN, MODEL_SCALE_MAX)
    }

    /// Combined world-to-screen scale factor.
    pub fn scale(&self) -> f64 {
        self.effective_model_scale() * self.effective_zoom()
    }

    /// Same view with zoom and model scale clamped into range.
    pub fn clamped(&self) -> Self {
        Self {
            zoom: self.effective_zoom(),
            model_scale: self.effective_model_scale(),
            ..*self
        }
    }

    /// Replace the auto-fit parameters after the entity set changed.
    pub fn with_fit(&self, center: Point3, scale: f64) -> Self {
        Self {
            model_center: center,
            model_scale: scale.clamp(MODEL_SCALE_MIN, MODEL_SCALE_MAX),
            ..*self
        }
    }

    pub fn rotate_by_drag(&self, dx: f64, dy: f64, sensitivity: f64) -> Self {
        Self {
            rotation_x: self.rotation_x + dy * sensitivity,
            rotation_y: self.rotation_y + dx * sensitivity,
            ..*self
        }
    }

    /// Drag with the configured sensitivity. Moves of at most `drag_threshold_px` on
    /// both axes are ignored.
    pub fn drag(&self, dx: f64, dy: f64, cfg: &ViewConfig) -> Self {
        if dx.abs() <= cfg.drag_threshold_px && dy.abs() <= cfg.drag_threshold_px {
            return *self;
        }
        self.rotate_by_drag(dx, dy, cfg.drag_sensitivity)
    }

    pub fn wheel(&self, delta: f64, cfg: &ViewConfig) -> Self {
        self.zoom_wheel(delta, cfg.wheel_step)
    }

    /// Pan by a pointer delta in pixels.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Self {
        let (pan_x, pan_y) = match self.kind {
            ViewportKind::Raster => (self.pan_x + dx, self.pan_y + dy),
            ViewportKind::OpenGl => (self.pan_x + dx * 0.01, self.pan_y - dy * 0.01),
        };
        Self {
            pan_x,
            pan_y,
            ..*self
        }
    }

    /// One wheel notch: positive delta zooms in by `step`, anything else zooms out.
    pub fn zoom_wheel(&self, delta: f64, step: f64) -> Self {
        let factor = if delta > 0.0 { 1.0 + step } else { 1.0 - step };
        let (lo, hi) = self.kind.zoom_range();
        Self {
            zoom: (self.zoom * factor).clamp(lo, hi),
            ..*self
        }
    }

    /// Snap to a standard orientation. Pan is reset, zoom is kept.
    pub fn standard(&self, view: StandardView) -> Self {
        let (rotation_x, rotation_y) = view.rotations();
        Self {
            rotation_x,
            rotation_y,
            pan_x: 0.0,
            pan_y: 0.0,
            ..*self
        }
    }
}

/// World point to screen pixel, orthographic.
///
/// Order: centre on the model, scale, rotate about Y, rotate about X, flip Y onto the
/// screen and apply pan. There is no perspective division.
pub fn project(point: Point3, view: &ViewState, screen_center: (i32, i32)) -> Point2 {
    let s = view.scale();
    let x = (point.x - view.model_center.x) * s;
    let y = (point.y - view.model_center.y) * s;
    let z = (point.z - view.model_center.z) * s;

    let (sin_y, cos_y) = view.rotation_y.to_radians().sin_cos();
    let x1 = x * cos_y - z * sin_y;
    let z1 = x * sin_y + z * cos_y;

    let (sin_x, cos_x) = view.rotation_x.to_radians().sin_cos();
    let y2 = y * cos_x - z1 * sin_x;

    Point2::new(
        screen_center.0 as f64 + x1 + view.pan_x,
        screen_center.1 as f64 - y2 + view.pan_y,
    )
}

/// Screen pixel back to a world point on the model's XY plane.
///
/// The depth along the view direction is not recovered: the X rotation is undone as if
/// the rotated depth were zero. This matches the interactive drawing tools of the raster
/// viewport and is exact only for views without rotation. See [`unproject_on_plane`]
/// for the exact inverse.
pub fn unproject(screen: Point2, view: &ViewState, screen_center: (i32, i32)) -> Point3 {
    let (xs, ys) = screen_to_view(screen, view, screen_center);

    let (sin_x, cos_x) = view.rotation_x.to_radians().sin_cos();
    let y = ys * cos_x;
    let z = -ys * sin_x;

    let (sin_y, cos_y) = view.rotation_y.to_radians().sin_cos();
    let x = xs * cos_y + z * sin_y;

    to_world(x, y, view)
}

/// Screen pixel to the point where its view ray meets the world plane `z = 0`.
///
/// Inverts [`project`] exactly for any point on that plane. Returns `None` when the plane
/// is seen edge-on.
pub fn unproject_on_plane(screen: Point2, view: &ViewState, screen_center: (i32, i32)) -> Option<Point3> {
    let (xs, ys) = screen_to_view(screen, view, screen_center);
    let (sin_x, cos_x) = view.rotation_x.to_radians().sin_cos();
    let (sin_y, cos_y) = view.rotation_y.to_radians().sin_cos();

    let denom = cos_x * cos_y;
    if denom.abs() < 1e-9 {
        return None;
    }
    // Plane z = 0 in model-local, scaled coordinates.
    let target_z = -view.model_center.z * view.scale();
    let depth = (target_z + xs * sin_y + ys * sin_x * cos_y) / denom;

    let y = ys * cos_x + depth * sin_x;
    let z1 = -ys * sin_x + depth * cos_x;
    let x = xs * cos_y + z1 * sin_y;

    Some(to_world(x, y, view))
}

fn screen_to_view(screen: Point2, view: &ViewState, screen_center: (i32, i32)) -> (f64, f64) {
    let xs = screen.x - screen_center.0 as f64 - view.pan_x;
    let ys = screen_center.1 as f64 + view.pan_y - screen.y;
    (xs, ys)
}

fn to_world(x: f64, y: f64, view: &ViewState) -> Point3 {
    let s = view.scale();
    Point3::new(
        x / s + view.model_center.x,
        y / s + view.model_center.y,
        0.0,
    )
}

/// Perspective projection of the OpenGL viewport.
pub fn gl_projection(aspect: f64) -> Matrix4<f64> {
    Matrix4::new_perspective(aspect.max(1e-6), GL_FOV_DEG.to_radians(), GL_NEAR, GL_FAR)
}

/// Model-view matrix of the OpenGL viewport: pull back by the zoomed camera distance,
/// rotate about X then Y, pan, then scale and centre the model.
pub fn gl_model_view(view: &ViewState) -> Matrix4<f64> {
    let camera = Matrix4::new_translation(&Vector3::new(
        0.0,
        0.0,
        -GL_CAMERA_DISTANCE / view.effective_zoom(),
    ));
    let rot_x = Rotation3::from_axis_angle(&Vector3::x_axis(), view.rotation_x.to_radians());
    let rot_y = Rotation3::from_axis_angle(&Vector3::y_axis(), view.rotation_y.to_radians());
    let pan = Matrix4::new_translation(&Vector3::new(view.pan_x, view.pan_y, 0.0));
    let scale = Matrix4::new_scaling(view.effective_model_scale());
    let center = Matrix4::new_translation(&Vector3::new(
        -view.model_center.x,
        -view.model_center.y,
        -view.model_center.z,
    ));
    camera * rot_x.to_homogeneous() * rot_y.to_homogeneous() * pan * scale * center
}
