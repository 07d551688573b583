//! Reader for the wireframe subset of STEP (ISO 10303-21) files.

use anyhow::{Context, Result};
use lens3d_core::model::Model;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

mod convert;
mod error;
mod parser;

pub use convert::ConvertStats;
pub use error::StepError;
pub use parser::{parse_step, StepFile, StepRecord, StepValue, COMPLEX_TYPE};

#[derive(Debug, Clone, Default, Serialize)]
pub struct StepStatistics {
    /// Instance count per entity type, recognised or not.
    pub types: BTreeMap<String, usize>,
    pub records: usize,
    pub lines: usize,
    pub circles: usize,
    pub edges: usize,
    pub unresolved: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StepImport {
    pub model: Model,
    pub stats: StepStatistics,
}

pub fn import_step(path: &Path) -> Result<StepImport> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read STEP: {path:?}"))?;
    let import = import_step_str(&text).with_context(|| format!("parse STEP: {path:?}"))?;
    tracing::info!(
        path = %path.display(),
        records = import.stats.records,
        entities = import.model.len(),
        unresolved = import.stats.unresolved,
        "loaded STEP"
    );
    Ok(import)
}

pub fn import_step_str(text: &str) -> Result<StepImport, StepError> {
    let file = parse_step(text)?;
    let (model, converted) = file.to_model_with_stats();
    Ok(StepImport {
        model,
        stats: StepStatistics {
            types: file.type_counts().clone(),
            records: file.len(),
            lines: converted.lines,
            circles: converted.circles,
            edges: converted.edges,
            unresolved: converted.unresolved,
        },
    })
}
