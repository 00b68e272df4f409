//! C values read straight from the no-placement campaigns.

use std::error::Error;
use std::path::Path;

use tracing::{info, warn};

use super::{FigureContext, csc_violin_graph, csc_violin_style, stages_label};
use crate::core::stats;
use crate::measurements::{
    Campaign, GATE_VAR, LUT_VAR0, LUT_VAR5, Topology, WIRE_VAR, congested_path, no_placement_path,
    read_column,
};
use crate::plot::{Axis, Color, HPos, TextSpec, VPos};
use crate::store::Rows;

const TOPOLOGIES: [Topology; 4] = [GATE_VAR, WIRE_VAR, LUT_VAR0, LUT_VAR5];
const STAGES: [u32; 4] = [1, 2, 3, 4];
const CONGESTED_STAGES: u32 = 4;
const CSC_COLUMN: usize = 4;

/// Positive C values of one file; non-positive entries are failed runs.
fn read_cscs(path: &Path, label: &str) -> Result<Vec<f64>, Box<dyn Error>> {
    let Some(values) = read_column(path, CSC_COLUMN, 1.0)? else {
        return Ok(Vec::new());
    };
    let cscs: Vec<f64> = values.into_iter().filter(|c| *c > 0.0).collect();
    if cscs.is_empty() {
        warn!("{label}: CSCs is empty!");
    } else {
        info!(
            "{label}: # CSC {}, mean {:.2}, median {:.2}",
            cscs.len(),
            stats::mean(&cscs).unwrap_or(f64::NAN),
            stats::median(&cscs).unwrap_or(f64::NAN),
        );
    }
    Ok(cscs)
}

/// Rows in topology-major order, one per stage count.
fn collect_stage_length(ctx: &FigureContext) -> Result<Rows, Box<dyn Error>> {
    let dir = ctx.campaign_dir(Campaign::NoPlacementS7);
    let mut rows = Rows::with_capacity(TOPOLOGIES.len() * STAGES.len());
    for topo in TOPOLOGIES {
        for stages in STAGES {
            let path = no_placement_path(&dir, topo.ro_type, stages);
            rows.push(read_cscs(&path, &format!("{}, {stages} stages", topo.name))?);
        }
    }
    Ok(rows)
}

/// Violin position for topology `ro` at stage index `s`: topologies are
/// grouped per stage count with one empty slot between groups.
pub(crate) fn stage_position(ro: usize, s: usize) -> f64 {
    (s * (TOPOLOGIES.len() + 1) + ro + 1) as f64
}

pub fn run_stage_length(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "csc_s7_stage_length";
    let Some(rows) = ctx.cached_rows(NAME, collect_stage_length)? else {
        return Ok(());
    };

    let mut positions = Vec::new();
    let mut labels = Vec::new();
    for s in 0..STAGES.len() {
        for (ro, topo) in TOPOLOGIES.iter().enumerate() {
            positions.push(stage_position(ro, s));
            labels.push(topo.name);
        }
    }
    let group = (TOPOLOGIES.len() + 1) as f64;
    let x_hi = group * STAGES.len() as f64 - 0.5;
    let y_lim = (0.4, 9e4);
    let x = Axis::new("RO topology", "")
        .lim(0.5, x_hi)
        .fixed(&positions, labels)
        .rotate_labels();
    let (mut gm, ax) = csc_violin_graph(
        ctx,
        NAME,
        "Obtainable C values per stage count",
        x,
        y_lim,
        0.85,
    );

    for (ro, _) in TOPOLOGIES.iter().enumerate() {
        for (s, _) in STAGES.iter().enumerate() {
            let Some(values) = rows.get(ro * STAGES.len() + s) else {
                continue;
            };
            if !values.is_empty() {
                gm.violin(ax, values, stage_position(ro, s), csc_violin_style());
            }
        }
    }
    for (s, &stages) in STAGES.iter().enumerate() {
        gm.text(
            ax,
            group * (s as f64 + 0.5),
            y_lim.1 / 3.0,
            stages_label(stages),
            TextSpec::new(Color::Black)
                .align(HPos::Center, VPos::Center)
                .border(Color::White),
        );
    }
    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}

fn collect_congest(ctx: &FigureContext) -> Result<Rows, Box<dyn Error>> {
    let dir = ctx.campaign_dir(Campaign::NoPlacementCongestionS7);
    TOPOLOGIES
        .iter()
        .map(|topo| {
            let path = congested_path(&dir, topo.ro_type, CONGESTED_STAGES);
            read_cscs(&path, &format!("{}, congested", topo.name))
        })
        .collect()
}

pub fn run_congest(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "csc_s7_no_placement_congest";
    let Some(rows) = ctx.cached_rows(NAME, collect_congest)? else {
        return Ok(());
    };

    let positions: Vec<f64> = (1..=TOPOLOGIES.len()).map(|i| i as f64).collect();
    let x = Axis::new("RO topology", "")
        .lim(0.5, 4.5)
        .fixed(&positions, TOPOLOGIES.iter().map(|t| t.name));
    let (mut gm, ax) = csc_violin_graph(
        ctx,
        NAME,
        "Obtainable C values, congested",
        x,
        (0.07, 9e3),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_groups_leave_a_gap() {
        assert_eq!(stage_position(0, 0), 1.0);
        assert_eq!(stage_position(3, 0), 4.0);
        assert_eq!(stage_position(0, 1), 6.0);
        assert_eq!(stage_position(3, 3), 19.0);
    }
}
