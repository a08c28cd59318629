use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::app::StageRecord;
use crate::config::Mode;
use crate::error::ExportError;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    stage: usize,
    mode: Mode,
    trial: usize,
    hit: bool,
    elapsed_ms: f64,
    exported_at: &'a str,
}

/// Write every trial of every completed stage as one CSV row.
pub fn write_csv<W: Write>(writer: W, stages: &[StageRecord]) -> Result<(), ExportError> {
    let exported_at = Local::now().to_rfc3339();
    let mut wtr = csv::Writer::from_writer(writer);

    for (stage_idx, stage) in stages.iter().enumerate() {
        for result in &stage.results {
            wtr.serialize(ExportRow {
                stage: stage_idx + 1,
                mode: stage.mode,
                trial: result.index + 1,
                hit: result.hit,
                elapsed_ms: (result.elapsed_ms() * 100.0).round() / 100.0,
                exported_at: &exported_at,
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_to_path(path: &Path, stages: &[StageRecord]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_csv(file, stages)?;
    log::info!("exported {} stage(s) to {}", stages.len(), path.display());
    Ok(())
}
