use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lens3d_core::bounds::compute_bounds;
use lens3d_core::camera::{project, StandardView, ViewState, ViewportKind};
use lens3d_core::config::Lens3dConfig;
use lens3d_core::geom::Point2;
use lens3d_core::model::{Model, Primitive};
use lens3d_core::pick::pick_segment;
use lens3d_core::planes::{extract_planes_with, planes_to_segments, PlaneRecord, PlaneSummary};
use lens3d_core::reorder::{apply_segment_order, rearrange, write_rearrange_log};
use lens3d_core::report::{describe_model, describe_planes, describe_rearrangement, EntitySummary};
use lens3d_core::sketch::{DrawMode, SketchTool};
use lens3d_dxf::ExportOptions;
use serde::Serialize;
use std::path::{Path, PathBuf};

mod input;

use input::{default_log_dir, load_config, load_model, prepare_output, InputFormat};

#[derive(Debug, Parser)]
#[command(name = "lens3d")]
#[command(about = "Wireframe CAD inspection: bounds, projection, picking, plane extraction, line reordering.")]
struct Cli {
    /// JSON file with view, plane and sketch settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SketchShape {
    Line,
    Circle,
    Arc,
}

impl From<SketchShape> for DrawMode {
    fn from(shape: SketchShape) -> Self {
        match shape {
            SketchShape::Line => DrawMode::Line,
            SketchShape::Circle => DrawMode::Circle,
            SketchShape::Arc => DrawMode::Arc,
        }
    }
}

/// Camera options shared by the commands that project onto the screen.
#[derive(Debug, clap::Args)]
struct ViewArgs {
    /// front, back, left, right, top or bottom.
    #[arg(long)]
    view: Option<StandardView>,
    #[arg(long, allow_hyphen_values = true)]
    rotate_x: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    rotate_y: Option<f64>,
    #[arg(long)]
    zoom: Option<f64>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Use the perspective viewport's zoom limits and fit size.
    #[arg(long)]
    gl: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Entity statistics, bounds and an optional per-entity dump.
    Inspect {
        input: PathBuf,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        dump: bool,
        /// Only load entities with this colour index (DXF).
        #[arg(long)]
        color: Option<u8>,
    },
    /// Build triangular planes from consecutive adjacent segments.
    Planes {
        input: PathBuf,
        #[arg(long)]
        tolerance: Option<f64>,
        #[arg(long)]
        json: bool,
        /// Reduce each plane to a segment and save as DXF.
        #[arg(long)]
        reduce: Option<PathBuf>,
        #[arg(long)]
        color: Option<u8>,
    },
    /// Rotate the segment sequence to start at a chosen segment.
    Rearrange {
        input: PathBuf,
        /// 1-based index of the segment to start from.
        #[arg(long)]
        start: usize,
        #[arg(long)]
        log_dir: Option<PathBuf>,
        #[arg(long)]
        no_log: bool,
        /// Save the reordered model as DXF.
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        color: Option<u8>,
    },
    /// Screen coordinates of every segment after auto-fit.
    Project {
        input: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Find the segment drawn under a screen position.
    Pick {
        input: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[arg(long)]
        tolerance: Option<f64>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Add a primitive from screen clicks and save the result.
    Sketch {
        input: PathBuf,
        #[arg(long, value_enum)]
        shape: SketchShape,
        /// Screen position as `x,y`; repeat once per click.
        #[arg(long = "click", value_parser = parse_screen_point, allow_hyphen_values = true)]
        clicks: Vec<Point2>,
        #[arg(long)]
        snap: bool,
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Load DXF or STEP and write DXF.
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        color: Option<u8>,
    },
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Inspect {
            input,
            json,
            dump,
            color,
        } => inspect(&input, &cfg, json, dump, color),
        Command::Planes {
            input,
            tolerance,
            json,
            reduce,
            color,
        } => planes(&input, &cfg, tolerance, json, reduce.as_deref(), color),
        Command::Rearrange {
            input,
            start,
            log_dir,
            no_log,
            output,
            color,
        } => {
            let log_dir = (!no_log).then(|| log_dir.unwrap_or_else(default_log_dir));
            rearrange_cmd(&input, start, log_dir.as_deref(), output.as_deref(), color)
        }
        Command::Project { input, view } => project_cmd(&input, &cfg, &view),
        Command::Pick {
            input,
            x,
            y,
            tolerance,
            view,
        } => pick(&input, &cfg, Point2::new(x, y), tolerance, &view),
        Command::Sketch {
            input,
            shape,
            clicks,
            snap,
            output,
            view,
        } => sketch(&input, &cfg, shape, &clicks, snap, &output, &view),
        Command::Convert {
            input,
            output,
            color,
        } => convert(&input, &output, color),
    }
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` overrides the `info` default.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}

fn parse_screen_point(s: &str) -> Result<Point2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let x = x.trim().parse().map_err(|_| format!("bad x coordinate in {s:?}"))?;
    let y = y.trim().parse().map_err(|_| format!("bad y coordinate in {s:?}"))?;
    Ok(Point2::new(x, y))
}

fn inspect(input: &Path, cfg: &Lens3dConfig, json: bool, dump: bool, color: Option<u8>) -> Result<()> {
    let loaded = load_model(input, color)?;
    let summary = EntitySummary::new(&loaded.model, cfg.view.fit_target());

    if json {
        #[derive(Serialize)]
        struct InspectReport<'a> {
            source: String,
            summary: &'a EntitySummary,
            source_types: &'a std::collections::BTreeMap<String, usize>,
        }
        let report = InspectReport {
            source: input.display().to_string(),
            summary: &summary,
            source_types: &loaded.stats,
        };
        println!("{}", serde_json::to_string_pretty(&report).context("serialize summary")?);
        return Ok(());
    }

    if dump {
        print!("{}", describe_model(&loaded.model, &input.display().to_string()));
    } else {
        println!("Source: {}", input.display());
        println!("Entities: {}", summary.entities_total);
        for (kind, n) in &summary.kinds {
            println!("  {kind}: {n}");
        }
        println!("Center: {:?}", summary.fit.center);
        println!("Scale: {:.4}", summary.fit.scale);
    }
    if !loaded.stats.is_empty() {
        let heading = match loaded.format {
            InputFormat::Step => "=== STEP entity statistics ===",
            InputFormat::Dxf => "=== Skipped DXF entities ===",
        };
        println!();
        println!("{heading}");
        for (kind, n) in &loaded.stats {
            println!("{kind}: {n}");
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct PlaneReport<'a> {
    summary: PlaneSummary,
    planes: &'a [PlaneRecord],
}

fn planes(
    input: &Path,
    cfg: &Lens3dConfig,
    tolerance: Option<f64>,
    json: bool,
    reduce: Option<&Path>,
    color: Option<u8>,
) -> Result<()> {
    let loaded = load_model(input, color)?;
    let segments = loaded.model.segments();
    let mut plane_cfg = cfg.planes.clone();
    if let Some(tol) = tolerance {
        plane_cfg.tolerance = tol;
    }

    let planes = extract_planes_with(&segments, &plane_cfg);
    tracing::info!(segments = segments.len(), planes = planes.len(), "extracted planes");

    if json {
        let report = PlaneReport {
            summary: PlaneSummary::new(segments.len(), &planes),
            planes: &planes,
        };
        println!("{}", serde_json::to_string_pretty(&report).context("serialize planes")?);
    } else {
        print!("{}", describe_planes(&planes, segments.len()));
    }

    if let Some(out) = reduce {
        let reduced = planes_to_segments(&planes)
            .into_iter()
            .map(Primitive::Segment)
            .collect();
        save_dxf(&Model::new(reduced), out, template_for(input, &loaded.format))?;
    }
    Ok(())
}

fn rearrange_cmd(
    input: &Path,
    start: usize,
    log_dir: Option<&Path>,
    output: Option<&Path>,
    color: Option<u8>,
) -> Result<()> {
    if start == 0 {
        bail!("--start is 1-based");
    }
    let loaded = load_model(input, color)?;
    let segments = loaded.model.segments();
    if segments.is_empty() {
        bail!("no line segments in {input:?}");
    }

    let lines = rearrange(&segments, start - 1)
        .with_context(|| format!("start segment {start} of {}", segments.len()))?;
    print!("{}", describe_rearrangement(&lines));

    if let Some(dir) = log_dir {
        let timestamp = chrono::Local::now().naive_local();
        if let Some(path) = write_rearrange_log(dir, &lines, timestamp)? {
            println!("Log: {}", path.display());
        }
    }

    if let Some(out) = output {
        let ordered: Vec<_> = lines.into_iter().map(|l| l.segment).collect();
        let model = apply_segment_order(&loaded.model, &ordered);
        save_dxf(&model, out, template_for(input, &loaded.format))?;
    }
    Ok(())
}

/// Auto-fit the model into the configured viewport, then apply standard view and flags.
fn fitted_view(model: &Model, cfg: &Lens3dConfig, args: &ViewArgs) -> (ViewState, (i32, i32)) {
    let mut view_cfg = cfg.view.clone();
    if args.gl {
        view_cfg.kind = ViewportKind::OpenGl;
        view_cfg.fit_size.get_or_insert(15.0);
    }
    if let Some(w) = args.width {
        view_cfg.width = w;
    }
    if let Some(h) = args.height {
        view_cfg.height = h;
    }

    let fit = compute_bounds(&model.primitives, view_cfg.fit_target());
    let mut view = ViewState::new(view_cfg.kind).with_fit(fit.center, fit.scale);
    if let Some(standard) = args.view {
        view = view.standard(standard);
    }
    if let Some(rx) = args.rotate_x {
        view.rotation_x = rx;
    }
    if let Some(ry) = args.rotate_y {
        view.rotation_y = ry;
    }
    if let Some(zoom) = args.zoom {
        view.zoom = zoom;
    }
    (view.clamped(), view_cfg.screen_center())
}

#[derive(Serialize)]
struct ProjectedSegment {
    index: usize,
    handle: String,
    start: [f64; 2],
    end: [f64; 2],
}

fn project_cmd(input: &Path, cfg: &Lens3dConfig, args: &ViewArgs) -> Result<()> {
    let loaded = load_model(input, None)?;
    let (view, center) = fitted_view(&loaded.model, cfg, args);
    let projected: Vec<_> = loaded
        .model
        .segments()
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let a = project(seg.start, &view, center);
            let b = project(seg.end, &view, center);
            ProjectedSegment {
                index: i + 1,
                handle: seg.handle.to_string(),
                start: [a.x, a.y],
                end: [b.x, b.y],
            }
        })
        .collect();

    #[derive(Serialize)]
    struct Projection {
        view: ViewState,
        screen_center: (i32, i32),
        segments: Vec<ProjectedSegment>,
    }
    let out = Projection {
        view,
        screen_center: center,
        segments: projected,
    };
    println!("{}", serde_json::to_string_pretty(&out).context("serialize projection")?);
    Ok(())
}

fn pick(
    input: &Path,
    cfg: &Lens3dConfig,
    click: Point2,
    tolerance: Option<f64>,
    args: &ViewArgs,
) -> Result<()> {
    let loaded = load_model(input, None)?;
    let (view, center) = fitted_view(&loaded.model, cfg, args);
    let segments = loaded.model.segments();
    let tolerance = tolerance.unwrap_or(cfg.view.hit_tolerance_px);

    match pick_segment(&segments, &view, center, click, tolerance) {
        Some(i) => println!("{} {}", i + 1, segments[i].handle),
        None => println!("no segment within {tolerance} px"),
    }
    Ok(())
}

fn sketch(
    input: &Path,
    cfg: &Lens3dConfig,
    shape: SketchShape,
    clicks: &[Point2],
    snap: bool,
    output: &Path,
    args: &ViewArgs,
) -> Result<()> {
    let loaded = load_model(input, None)?;
    let (view, center) = fitted_view(&loaded.model, cfg, args);

    let mut tool = SketchTool::new(cfg.sketch.clone());
    tool.set_auto_snap(snap || cfg.sketch.auto_snap);
    tool.set_mode(shape.into());

    let mut model = loaded.model.clone();
    let mut added = 0;
    for click in clicks {
        if let Some(prim) = tool.click(*click, &view, center, &model) {
            model.push(prim);
            added += 1;
        }
    }
    if !tool.pending().is_empty() {
        tracing::warn!(pending = tool.pending().len(), "incomplete shape discarded");
    }
    if added == 0 {
        bail!("no {shape:?} created from {} click(s)", clicks.len());
    }
    println!("Added {added} primitive(s)");
    save_dxf(&model, output, template_for(input, &loaded.format))
}

fn convert(input: &Path, output: &Path, color: Option<u8>) -> Result<()> {
    let loaded = load_model(input, color)?;
    save_dxf(&loaded.model, output, template_for(input, &loaded.format))
}

/// DXF input provides its own layer and linetype tables to the output.
fn template_for(input: &Path, format: &InputFormat) -> Option<PathBuf> {
    (*format == InputFormat::Dxf).then(|| input.to_path_buf())
}

fn save_dxf(model: &Model, output: &Path, template: Option<PathBuf>) -> Result<()> {
    prepare_output(output)?;
    let stats = lens3d_dxf::export_dxf(model, output, &ExportOptions { template })?;
    println!(
        "Saved {} entities to {} ({} dropped)",
        stats.written,
        output.display(),
        stats.dropped
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use lens3d_core::geom::Point3;
    use lens3d_core::model::{Handle, Segment};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_screen_points() {
        assert_eq!(parse_screen_point("12.5, -3").unwrap(), Point2::new(12.5, -3.0));
        assert!(parse_screen_point("12").is_err());
        assert!(parse_screen_point("a,b").is_err());
    }

    #[test]
    fn parses_view_arguments() {
        let cli = Cli::try_parse_from([
            "lens3d", "pick", "part.dxf", "--x", "10", "--y", "-4", "--view", "TOP", "--gl",
        ])
        .unwrap();
        let Command::Pick { x, y, view, .. } = cli.cmd else {
            panic!("expected pick");
        };
        assert_eq!((x, y), (10.0, -4.0));
        assert_eq!(view.view, Some(StandardView::Top));
        assert!(view.gl);
    }

    #[test]
    fn plane_report_lists_every_plane() {
        let segments = [
            Segment::new(Handle::new("A"), Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
            Segment::new(Handle::new("B"), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)),
        ];
        let planes = extract_planes_with(&segments, &Lens3dConfig::default().planes);
        let report = PlaneReport {
            summary: PlaneSummary::new(segments.len(), &planes),
            planes: &planes,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["planes"], 1);
        assert_eq!(json["planes"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["planes"][0]["first"]["handle"], "A");
        let area = json["planes"][0]["area"].as_f64().unwrap();
        assert!((area - 0.5).abs() < 1e-9);
    }

    #[test]
    fn fitted_view_honours_overrides() {
        let model = Model::default();
        let args = ViewArgs {
            view: Some(StandardView::Front),
            rotate_x: None,
            rotate_y: Some(45.0),
            zoom: Some(100.0),
            width: Some(400),
            height: Some(200),
            gl: false,
        };
        let (view, center) = fitted_view(&model, &Lens3dConfig::default(), &args);
        assert_eq!(center, (200, 100));
        assert_eq!(view.rotation_x, 0.0);
        assert_eq!(view.rotation_y, 45.0);
        assert_eq!(view.zoom, 5.0);
    }
}
