//! Click-driven drawing of new primitives on the model's XY plane.

use crate::camera::{project, unproject, unproject_on_plane, ViewState};
use crate::config::SketchConfig;
use crate::geom::{Point2, Point3};
use crate::model::{Arc, Attributes, Circle, Handle, Model, Primitive, Segment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DrawMode {
    #[default]
    None,
    Line,
    Circle,
    Arc,
}

impl DrawMode {
    fn clicks_needed(&self) -> usize {
        match self {
            DrawMode::None => 0,
            DrawMode::Line | DrawMode::Circle => 2,
            DrawMode::Arc => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SketchTool {
    cfg: SketchConfig,
    mode: DrawMode,
    pending: Vec<Point3>,
    next_id: u64,
}

impl SketchTool {
    pub fn new(cfg: SketchConfig) -> Self {
        Self {
            cfg,
            mode: DrawMode::None,
            pending: Vec::new(),
            next_id: 1,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Points placed so far for the primitive under construction.
    pub fn pending(&self) -> &[Point3] {
        &self.pending
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
        self.pending.clear();
    }

    pub fn set_auto_snap(&mut self, on: bool) {
        self.cfg.auto_snap = on;
    }

    pub fn cancel(&mut self) {
        self.set_mode(DrawMode::None);
    }

    /// Place a point at a screen position. Returns the primitive once it is complete.
    pub fn click(
        &mut self,
        screen: Point2,
        view: &ViewState,
        screen_center: (i32, i32),
        model: &Model,
    ) -> Option<Primitive> {
        if self.mode == DrawMode::None {
            return None;
        }
        let point = self.resolve_point(screen, view, screen_center, model);
        self.place(point)
    }

    /// Complete a pending line at typed world coordinates.
    pub fn finish_line_at(&mut self, end: Point3) -> Option<Primitive> {
        if self.mode != DrawMode::Line || self.pending.len() != 1 {
            return None;
        }
        self.place(end)
    }

    fn place(&mut self, point: Point3) -> Option<Primitive> {
        self.pending.push(point);
        if self.pending.len() < self.mode.clicks_needed() {
            return None;
        }
        let points = std::mem::take(&mut self.pending);
        let primitive = self.build(&points);
        if primitive.is_none() {
            tracing::debug!(mode = ?self.mode, "discarding degenerate sketch input");
        }
        primitive
    }

    fn build(&mut self, points: &[Point3]) -> Option<Primitive> {
        match (self.mode, points) {
            (DrawMode::Line, &[start, end]) => {
                if start.approx_eq(end, f64::EPSILON) {
                    return None;
                }
                Some(Primitive::Segment(Segment {
                    handle: self.alloc_handle(),
                    start,
                    end,
                    attrs: self.attrs(),
                }))
            }
            (DrawMode::Circle, &[center, rim]) => {
                let radius = center.to_xy().distance(rim.to_xy());
                if radius <= 0.0 {
                    return None;
                }
                Some(Primitive::Circle(Circle {
                    handle: self.alloc_handle(),
                    center,
                    radius,
                    attrs: self.attrs(),
                }))
            }
            (DrawMode::Arc, &[center, start, end]) => {
                let radius = center.to_xy().distance(start.to_xy());
                if radius <= 0.0 {
                    return None;
                }
                Some(Primitive::Arc(Arc {
                    handle: self.alloc_handle(),
                    center,
                    radius,
                    start_angle_deg: polar_angle_deg(center, start),
                    end_angle_deg: polar_angle_deg(center, end),
                    attrs: self.attrs(),
                }))
            }
            _ => None,
        }
    }

    fn resolve_point(
        &self,
        screen: Point2,
        view: &ViewState,
        screen_center: (i32, i32),
        model: &Model,
    ) -> Point3 {
        if self.cfg.auto_snap {
            if let Some(p) = nearest_endpoint(screen, view, screen_center, model, self.cfg.snap_radius_px) {
                return p;
            }
        }
        unproject_on_plane(screen, view, screen_center)
            .unwrap_or_else(|| unproject(screen, view, screen_center))
    }

    fn alloc_handle(&mut self) -> Handle {
        let id = self.next_id;
        self.next_id += 1;
        Handle::new(format!("N{id}"))
    }

    fn attrs(&self) -> Attributes {
        Attributes {
            layer: Some(self.cfg.layer.clone()),
            ..Attributes::default()
        }
    }
}

fn polar_angle_deg(center: Point3, p: Point3) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees().rem_euclid(360.0)
}

fn nearest_endpoint(
    screen: Point2,
    view: &ViewState,
    screen_center: (i32, i32),
    model: &Model,
    radius_px: f64,
) -> Option<Point3> {
    model
        .primitives
        .iter()
        .filter_map(Primitive::as_segment)
        .flat_map(|s| [s.start, s.end])
        .map(|p| (p, project(p, view, screen_center).distance(screen)))
        .filter(|(_, d)| *d <= radius_px)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}
