//! Triangular "planes" derived from pairs of consecutive, touching segments.

use crate::config::PlaneConfig;
use crate::geom::{triangle_area_heron, Point3};
use crate::model::{Handle, Segment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneRecord {
    /// Distinct vertices in first-encountered order.
    pub points: [Point3; 3],
    pub first: Segment,
    pub second: Segment,
    pub area: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneSummary {
    pub source_segments: usize,
    pub planes: usize,
    pub total_area: f64,
}

impl PlaneSummary {
    pub fn new(source_segments: usize, planes: &[PlaneRecord]) -> Self {
        Self {
            source_segments,
            planes: planes.len(),
            total_area: planes.iter().map(|p| p.area).sum(),
        }
    }
}

/// True when any endpoint of `a` coincides with any endpoint of `b`.
pub fn are_adjacent(a: &Segment, b: &Segment, tol: f64) -> bool {
    a.end.approx_eq(b.start, tol)
        || a.end.approx_eq(b.end, tol)
        || a.start.approx_eq(b.start, tol)
        || a.start.approx_eq(b.end, tol)
}

/// Build the triangle spanned by two segments sharing exactly one endpoint.
///
/// Returns `None` unless the four endpoints collapse to exactly three distinct points
/// and the resulting triangle has a usable area.
pub fn plane_from_pair(a: &Segment, b: &Segment, cfg: &PlaneConfig) -> Option<PlaneRecord> {
    let mut unique: Vec<Point3> = Vec::with_capacity(4);
    for p in [a.start, a.end, b.start, b.end] {
        if !unique.iter().any(|u| u.approx_eq(p, cfg.tolerance)) {
            unique.push(p);
        }
    }
    let &[p0, p1, p2] = unique.as_slice() else {
        return None;
    };

    let area = triangle_area_heron(p0, p1, p2);
    if !area.is_finite() || area <= cfg.min_area {
        tracing::debug!(first = %a.handle, second = %b.handle, area, "skipping degenerate plane");
        return None;
    }

    Some(PlaneRecord {
        points: [p0, p1, p2],
        first: a.clone(),
        second: b.clone(),
        area,
    })
}

/// Pair up index-consecutive segments into planes with the default tolerance.
pub fn extract_planes(segments: &[Segment]) -> Vec<PlaneRecord> {
    extract_planes_with(segments, &PlaneConfig::default())
}

/// Single forward scan over `segments`.
///
/// Segment `i` is only ever tested against `i + 1`. When the pair yields a plane both are
/// consumed and the scan moves on by two; otherwise it moves on by one. A segment skipped
/// this way is never reconsidered as the partner of a later segment.
pub fn extract_planes_with(segments: &[Segment], cfg: &PlaneConfig) -> Vec<PlaneRecord> {
    let mut planes = Vec::new();
    let mut i = 0;
    while i + 1 < segments.len() {
        let current = &segments[i];
        let next = &segments[i + 1];
        if are_adjacent(current, next, cfg.tolerance) {
            if let Some(plane) = plane_from_pair(current, next, cfg) {
                planes.push(plane);
                i += 2;
                continue;
            }
        }
        i += 1;
    }
    tracing::debug!(segments = segments.len(), planes = planes.len(), "extracted planes");
    planes
}

/// Reduce each plane back to a single segment through its first two vertices.
///
/// The new segment inherits the display attributes of the plane's first source segment.
pub fn planes_to_segments(planes: &[PlaneRecord]) -> Vec<Segment> {
    planes
        .iter()
        .enumerate()
        .map(|(i, plane)| Segment {
            handle: Handle::new(format!("P{}", i + 1)),
            start: plane.points[0],
            end: plane.points[1],
            attrs: plane.first.attrs.clone(),
        })
        .collect()
}
