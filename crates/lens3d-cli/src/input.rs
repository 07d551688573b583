use anyhow::{bail, Context, Result};
use lens3d_core::config::Lens3dConfig;
use lens3d_core::model::Model;
use lens3d_dxf::DxfImportOptions;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Dxf,
    Step,
}

pub struct Loaded {
    pub format: InputFormat,
    pub model: Model,
    /// Per-type record counts for STEP input, skipped entity types for DXF.
    pub stats: BTreeMap<String, usize>,
}

pub fn input_format(input: &Path) -> Result<InputFormat> {
    let ext = input
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "dxf" => Ok(InputFormat::Dxf),
        "stp" | "step" => Ok(InputFormat::Step),
        "dwg" => bail!("DWG files are not supported; export to DXF first."),
        _ => bail!("Unsupported input extension: .{ext}"),
    }
}

pub fn load_model(input: &Path, color_filter: Option<u8>) -> Result<Loaded> {
    ensure_input_file(input)?;
    let format = input_format(input)?;
    let loaded = match format {
        InputFormat::Dxf => {
            let opts = DxfImportOptions { color_filter };
            let import = lens3d_dxf::import_dxf_with(input, &opts)?;
            Loaded {
                format,
                model: import.model,
                stats: import.skipped,
            }
        }
        InputFormat::Step => {
            if color_filter.is_some() {
                tracing::warn!("STEP files carry no colour index; --color is ignored");
            }
            let import = lens3d_import_step::import_step(input)?;
            Loaded {
                format,
                model: import.model,
                stats: import.stats.types,
            }
        }
    };
    if loaded.model.is_empty() {
        tracing::warn!(path = %input.display(), "no drawable entities found");
    }
    Ok(loaded)
}

pub fn load_config(path: Option<&Path>) -> Result<Lens3dConfig> {
    let Some(path) = path else {
        return Ok(Lens3dConfig::default());
    };
    ensure_input_file(path)?;
    let text = std::fs::read_to_string(path).with_context(|| format!("read config: {path:?}"))?;
    serde_json::from_str(&text).with_context(|| format!("parse config: {path:?}"))
}

pub fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if let Some(root) = find_workspace_root(&cwd) {
                bail!(
                    "input not found: {input:?} (cwd: {cwd:?}).\nHint: run from the workspace root {root:?} or pass an absolute path."
                );
            }
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}

fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("Cargo.lock").is_file())
        .map(|dir| dir.to_path_buf())
}

/// Create the parent directory of an output path if it has one.
pub fn prepare_output(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent:?}"))?;
    }
    Ok(())
}

/// `LineRearrangeLogs` next to the executable, or in the working directory.
pub fn default_log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("LineRearrangeLogs")
}
