use crate::camera::{project, ViewState};
use crate::geom::Point2;
use crate::model::Segment;

/// Distance from `p` to the closed segment `a`-`b`.
///
/// A zero-length segment measures to `a`.
pub fn distance_point_to_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    let ax = p.x - a.x;
    let ay = p.y - a.y;
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    let len_sq = dx * dx + dy * dy;
    let t = if len_sq != 0.0 { (ax * dx + ay * dy) / len_sq } else { -1.0 };

    let foot = if t < 0.0 {
        a
    } else if t > 1.0 {
        b
    } else {
        Point2::new(a.x + t * dx, a.y + t * dy)
    };
    p.distance(foot)
}

/// Index of the first segment drawn within `tolerance_px` of `click`.
pub fn pick_segment(
    segments: &[Segment],
    view: &ViewState,
    screen_center: (i32, i32),
    click: Point2,
    tolerance_px: f64,
) -> Option<usize> {
    segments.iter().position(|seg| {
        let a = project(seg.start, view, screen_center);
        let b = project(seg.end, view, screen_center);
        distance_point_to_segment(click, a, b) <= tolerance_px
    })
}
