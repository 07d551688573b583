use crate::bounds::FitTarget;
use crate::camera::ViewportKind;
use crate::geom::POINT_TOLERANCE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub kind: ViewportKind,
    pub width: u32,
    pub height: u32,
    /// Degrees of rotation per pixel of drag.
    pub drag_sensitivity: f64,
    /// Pointer movement below this many pixels does not rotate.
    pub drag_threshold_px: f64,
    pub wheel_step: f64,
    pub hit_tolerance_px: f64,
    /// `None` fits to 40% of the viewport.
    pub fit_size: Option<f64>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            kind: ViewportKind::Raster,
            width: 800,
            height: 600,
            drag_sensitivity: 0.5,
            drag_threshold_px: 2.0,
            wheel_step: 0.1,
            hit_tolerance_px: 5.0,
            fit_size: None,
        }
    }
}

impl ViewConfig {
    pub fn screen_center(&self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }

    pub fn fit_target(&self) -> FitTarget {
        match self.fit_size {
            Some(size) => FitTarget::Fixed(size),
            None => FitTarget::Viewport {
                width: self.width,
                height: self.height,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    /// Endpoint matching tolerance, Euclidean.
    pub tolerance: f64,
    /// Triangles at or below this area are treated as collinear.
    pub min_area: f64,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            tolerance: POINT_TOLERANCE,
            min_area: 1e-9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub auto_snap: bool,
    pub snap_radius_px: f64,
    pub layer: String,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            auto_snap: false,
            snap_radius_px: 8.0,
            layer: "0".to_string(),
        }
    }
}

/// Everything tunable, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Lens3dConfig {
    pub view: ViewConfig,
    pub planes: PlaneConfig,
    pub sketch: SketchConfig,
}
