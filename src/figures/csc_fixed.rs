//! Obtainable C values from pairs of placed RO instances.

use std::error::Error;
use std::path::Path;

use tracing::{info, warn};

use super::{FigureContext, csc_violin_graph, csc_violin_style};
use crate::core::csc::{self, CscSample, FIXED_PLACEMENT_CAP, PLACEMENT_SWEEP_CAP};
use crate::core::stats;
use crate::measurements::{
    Campaign, GATE_VAR, LUT_VAR0, LUT_VAR5, Topology, WIRE_VAR, X_LOCS, Y_LOCS, Y_LOCS_PARTNER,
    placement_path, read_column,
};
use crate::plot::Axis;
use crate::store::Rows;

const FIXED_TOPOLOGIES: [Topology; 4] = [GATE_VAR, WIRE_VAR, LUT_VAR0, LUT_VAR5];
const FIXED_STAGES: u32 = 4;
const FIXED_INSTANCES: [(u32, u32); 2] = [(0, 0), (0, 74)];

const SWEEP_STAGES: u32 = 3;
const SWEEP_PARTNER: &str = "wireonly_s";

const DELAY_COLUMN: usize = 1;

/// C values for one pair of delay files, or `None` when either side is
/// unavailable or nothing could be paired.
fn pair_files(
    p0: &Path,
    p1: &Path,
    cap: usize,
    label: &str,
) -> Result<Option<CscSample>, Box<dyn Error>> {
    let Some(d0s) = read_column(p0, DELAY_COLUMN, 1.0)? else {
        return Ok(None);
    };
    let Some(d1s) = read_column(p1, DELAY_COLUMN, 1.0)? else {
        return Ok(None);
    };
    let sample = match csc::sample_csc(&d0s, &d1s, cap) {
        Ok(s) => s,
        Err(e) => {
            warn!("{label}: {e}");
            return Ok(None);
        }
    };
    if sample.is_empty() {
        warn!("{label}: CSCs is empty!");
        return Ok(None);
    }
    info!(
        "{label}: # RO0 {}, # RO1 {}, # CSC {}, # dropped {}, mean {:.2}, var {:.2}",
        sample.n0,
        sample.n1,
        sample.values.len(),
        sample.dropped(),
        stats::mean(&sample.values).unwrap_or(f64::NAN),
        stats::variance(&sample.values).unwrap_or(f64::NAN),
    );
    Ok(Some(sample))
}

fn collect_fixed(ctx: &FigureContext) -> Result<Rows, Box<dyn Error>> {
    let dir = ctx.campaign_dir(Campaign::VariableGpS7);
    let [(x0, y0), (x1, y1)] = FIXED_INSTANCES;
    let mut rows = Rows::with_capacity(FIXED_TOPOLOGIES.len());
    for topo in FIXED_TOPOLOGIES {
        let p0 = placement_path(&dir, topo.ro_type, x0, y0, FIXED_STAGES);
        let p1 = placement_path(&dir, topo.ro_type, x1, y1, FIXED_STAGES);
        let sample = pair_files(&p0, &p1, FIXED_PLACEMENT_CAP, topo.name)?;
        rows.push(sample.map(|s| s.values).unwrap_or_default());
    }
    Ok(rows)
}

pub fn run_fixed_placement(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "csc_s7_fixed_placement";
    let Some(rows) = ctx.cached_rows(NAME, collect_fixed)? else {
        return Ok(());
    };

    let positions: Vec<f64> = (1..=FIXED_TOPOLOGIES.len()).map(|i| i as f64).collect();
    let x = Axis::new("RO topology", "")
        .lim(0.5, 4.5)
        .fixed(&positions, FIXED_TOPOLOGIES.iter().map(|t| t.name));
    let (mut gm, ax) = csc_violin_graph(
        ctx,
        NAME,
        "Obtainable C values with placement",
        x,
        (0.8, 1e4),
        0.75,
    );
    for (pos, values) in positions.iter().zip(&rows) {
        if !values.is_empty() {
            gm.violin(ax, values, *pos, csc_violin_style());
        }
    }
    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Sweep locations in cache order: every x with every (y, partner y) pair.
pub(crate) fn sweep_locations() -> Vec<(u32, u32, u32)> {
    X_LOCS
        .iter()
        .flat_map(|&x| {
            Y_LOCS
                .iter()
                .zip(Y_LOCS_PARTNER)
                .map(move |(&y, y_s)| (x, y, y_s))
        })
        .collect()
}

fn collect_sweep(ctx: &FigureContext) -> Result<Rows, Box<dyn Error>> {
    let dir = ctx.campaign_dir(Campaign::VariableGpS7);
    let ro_type = WIRE_VAR.ro_type;
    let locations = sweep_locations();
    let mut rows = Rows::with_capacity(locations.len());
    let mut progress = ctx.progress(locations.len());
    progress.start();
    for (x, y, y_s) in locations {
        let p0 = placement_path(&dir, ro_type, x, y, SWEEP_STAGES);
        let p1 = placement_path(&dir, SWEEP_PARTNER, x, y_s, SWEEP_STAGES);
        let label = format!("{} [{x},{y}]", WIRE_VAR.name);
        let sample = pair_files(&p0, &p1, PLACEMENT_SWEEP_CAP, &label)?;
        rows.push(sample.map(|s| s.values).unwrap_or_default());
        progress.iterate();
    }
    progress.clear();
    Ok(rows)
}

pub fn run_placement_sweep(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "csc_s7_placement_sweep_wirevar";
    let Some(rows) = ctx.cached_rows(NAME, collect_sweep)? else {
        return Ok(());
    };

    let locations = sweep_locations();
    let positions: Vec<f64> = (1..=locations.len()).map(|i| i as f64).collect();
    let labels = locations.iter().map(|(x, y, _)| format!("[{x},{y}]"));
    let x = Axis::new("Location [x,y]", "")
        .lim(0.5, 25.5)
        .fixed(&positions, labels)
        .rotate_labels();
    let (mut gm, ax) = csc_violin_graph(
        ctx,
        NAME,
        "Calculated C values at 25 locations, WireVar",
        x,
        (0.7, 1.5e4),
        0.85,
    );
    for (pos, values) in positions.iter().zip(&rows) {
        if !values.is_empty() {
            gm.violin(ax, values, *pos, csc_violin_style());
        }
    }
    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_visits_25_locations_x_major() {
        let locs = sweep_locations();
        assert_eq!(locs.len(), 25);
        assert_eq!(locs[0], (0, 0, 1));
        assert_eq!(locs[4], (0, 148, 147));
        assert_eq!(locs[5], (10, 0, 1));
        assert_eq!(locs[24], (52, 148, 147));
    }
}
