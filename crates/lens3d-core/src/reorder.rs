//! Cyclic reordering of the segment list and the rearrangement log.

use crate::error::{CoreError, Result};
use crate::geom::Point3;
use crate::model::{Model, Primitive, Segment};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// `segments[start..] ++ segments[..start]`.
pub fn rotate_starting_at(segments: &[Segment], start: usize) -> Result<Vec<Segment>> {
    if segments.is_empty() {
        return Ok(Vec::new());
    }
    if start >= segments.len() {
        return Err(CoreError::IndexOutOfRange {
            index: start,
            len: segments.len(),
        });
    }
    let mut out = Vec::with_capacity(segments.len());
    out.extend_from_slice(&segments[start..]);
    out.extend_from_slice(&segments[..start]);
    Ok(out)
}

/// One row of a rearrangement, with 1-based positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RearrangedLine {
    pub position: usize,
    pub original_index: usize,
    pub segment: Segment,
    /// From this segment's end to the next one's start; the last row wraps to the first.
    pub distance_to_next: f64,
}

pub fn rearrange(segments: &[Segment], start: usize) -> Result<Vec<RearrangedLine>> {
    let rotated = rotate_starting_at(segments, start)?;
    let len = rotated.len();
    Ok(rotated
        .iter()
        .enumerate()
        .map(|(i, seg)| RearrangedLine {
            position: i + 1,
            original_index: (start + i) % len + 1,
            segment: seg.clone(),
            distance_to_next: seg.end.distance(rotated[(i + 1) % len].start),
        })
        .collect())
}

/// Put `ordered` into the slots the model's segments occupy, keeping every other
/// primitive where it is. Surplus slots keep their original segment.
pub fn apply_segment_order(model: &Model, ordered: &[Segment]) -> Model {
    let mut replacements = ordered.iter();
    let primitives = model
        .primitives
        .iter()
        .map(|p| match p {
            Primitive::Segment(_) => match replacements.next() {
                Some(seg) => Primitive::Segment(seg.clone()),
                None => p.clone(),
            },
            other => other.clone(),
        })
        .collect();
    Model::new(primitives)
}

pub fn format_point(p: Point3) -> String {
    format!("{:.2},{:.2},{:.2}", p.x, p.y, p.z)
}

pub fn rearrange_log_name(timestamp: NaiveDateTime) -> String {
    format!("LineRearrange_{}.txt", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Write the rearrangement to `dir/LineRearrange_<timestamp>.txt`, creating `dir` if needed.
///
/// Nothing is written for an empty rearrangement.
pub fn write_rearrange_log(
    dir: &Path,
    lines: &[RearrangedLine],
    timestamp: NaiveDateTime,
) -> Result<Option<PathBuf>> {
    if lines.is_empty() {
        return Ok(None);
    }
    std::fs::create_dir_all(dir).map_err(|source| CoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(rearrange_log_name(timestamp));

    let mut body = String::new();
    for line in lines {
        let _ = writeln!(
            body,
            "\t{}\tLine{}\t\tstart:{},end:{}",
            line.position,
            line.original_index,
            format_point(line.segment.start),
            format_point(line.segment.end)
        );
    }

    let io_err = |source| CoreError::Io {
        path: path.clone(),
        source,
    };
    let mut file = std::fs::File::create(&path).map_err(io_err)?;
    file.write_all(body.as_bytes()).map_err(io_err)?;

    tracing::info!(path = %path.display(), lines = lines.len(), "wrote rearrangement log");
    Ok(Some(path))
}
