//! Entropy-versus-delta sweep written to the model results directory.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use csv::Writer;
use tracing::{debug, info};

use super::FigureContext;
use crate::core::model::{self, ModelPoint};
use crate::error::FigureError;

/// Output file of the sweep for the configured jitter and period.
pub fn result_path(ctx: &FigureContext) -> PathBuf {
    ctx.config
        .paths
        .model_dir
        .join(ctx.config.model.result_file_name())
}

/// Run the sweep, appending one row per C value as soon as it is done.
pub fn run(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    let cfg = &ctx.config.model;
    let path = result_path(ctx);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| FigureError::io(dir, e))?;
    }
    let mut writer = Writer::from_path(&path).map_err(|e| FigureError::csv(&path, e))?;
    writer
        .write_record(ModelPoint::HEADER)
        .map_err(|e| FigureError::csv(&path, e))?;

    let cscs = model::sweep_cscs(cfg);
    info!(
        "model: {} points, C in [{}, {}], {} draws each",
        cscs.len(),
        cfg.csc_min,
        cfg.csc_max,
        cfg.nb_draws
    );
    let mut progress = ctx.progress(cscs.len());
    progress.start();
    for (i, &csc) in cscs.iter().enumerate() {
        let point = model::evaluate(cfg, csc, i as u64);
        debug!(
            "C {csc:.2}: minH sim {:.4}, minH norm {:.4}",
            point.sim.min_entropy, point.norm.min_entropy
        );
        writer
            .write_record(point.to_row().iter().map(|v| v.to_string()))
            .map_err(|e| FigureError::csv(&path, e))?;
        writer.flush().map_err(|e| FigureError::io(&path, e))?;
        progress.iterate();
    }
    progress.clear();
    info!("wrote {}", path.display());
    Ok(())
}
