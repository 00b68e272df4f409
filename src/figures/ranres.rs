//! Normalised range against resolution of the RO period populations.

use std::error::Error;
use std::path::Path;

use tracing::{debug, info};

use super::{FigureContext, stages_label};
use crate::core::stats;
use crate::measurements::{
    Campaign, GATE_VAR, LUT_VAR0, LUT_VAR3, LUT_VAR5, Topology, WIRE_VAR, X_LOCS, Y_LOCS,
    congested_path, no_placement_path, placement_path, read_periods,
};
use crate::plot::{
    Ax, AxesSpec, Axis, Color, GraphMaker, HPos, LegendPos, LineStyle, Marker, PlotStyle,
    TextSpec, VPos,
};
use crate::store::Rows;

const S7_TOPOLOGIES: [Topology; 4] = [LUT_VAR0, LUT_VAR5, WIRE_VAR, GATE_VAR];
const SF2_TOPOLOGIES: [Topology; 4] = [LUT_VAR0, LUT_VAR3, WIRE_VAR, GATE_VAR];
const STAGES: [u32; 4] = [1, 2, 3, 4];
const STAGE_MARKERS: [Marker; 4] = [
    Marker::Circle,
    Marker::TriangleDown,
    Marker::Square,
    Marker::Diamond,
];
/// Stage value marking congested rows in the cache.
const CONGESTED: f64 = -1.0;
const NS: f64 = 1e-9;

fn stage_marker(stages: u32) -> Marker {
    STAGE_MARKERS[(stages.max(1) as usize - 1) % STAGE_MARKERS.len()]
}

/// Normalised range and resolution of one measurement file, after merging
/// repeated configurations.
pub(crate) fn range_resolution(confs: &[i64], periods: &[f64]) -> Option<(f64, f64)> {
    let (_, averaged) = stats::average_identical_configs(confs, periods);
    let ran = stats::normalized_range(&averaged)?;
    let res = stats::resolution(&averaged)?;
    Some((ran, res))
}

fn file_range_resolution(
    path: &Path,
    conf_column: usize,
    period_column: usize,
    label: &str,
) -> Result<Option<(f64, f64)>, Box<dyn Error>> {
    let Some((confs, periods)) = read_periods(path, conf_column, period_column, NS)? else {
        return Ok(None);
    };
    let rr = range_resolution(&confs, &periods);
    match rr {
        Some((ran, res)) => debug!(
            "{label}: {} configs, mean period {:.4e} s, range {ran:.4e}, resolution {res:.4e} s",
            periods.len(),
            stats::mean(&periods).unwrap_or(f64::NAN),
        ),
        None => info!("{label}: not enough distinct periods"),
    }
    Ok(rr)
}

fn ranres_axes(title: &str, legend: LegendPos, y_lim: Option<(f64, f64)>) -> AxesSpec {
    let x = Axis::new("Normalized range", "-").log().grid();
    let mut y = Axis::new("Resolution", "s").log().grid();
    if let Some((lo, hi)) = y_lim {
        y = y.lim(lo, hi);
    }
    AxesSpec::new(x, y).title(title).legend(legend)
}

fn stage_legend(gm: &mut GraphMaker, ax: Ax) {
    for stages in STAGES {
        gm.plot(
            ax,
            &[],
            &[],
            PlotStyle::new(Color::Grey)
                .line(LineStyle::None)
                .marker(stage_marker(stages))
                .label(stages_label(stages)),
        );
    }
}

fn name_label() -> TextSpec {
    TextSpec::new(Color::Black)
        .align(HPos::Left, VPos::Center)
        .offset(8, 0)
        .border(Color::White)
}

/// Rows `[ro, stages, x, y, res, ran]` for every placed instance.
fn collect_variable_gp(ctx: &FigureContext) -> Result<Rows, Box<dyn Error>> {
    let dir = ctx.campaign_dir(Campaign::VariableGpS7);
    let total = S7_TOPOLOGIES.len() * STAGES.len() * X_LOCS.len() * Y_LOCS.len();
    let mut progress = ctx.progress(total);
    let mut rows = Rows::with_capacity(total);
    progress.start();
    for (ro, topo) in S7_TOPOLOGIES.iter().enumerate() {
        for stages in STAGES {
            for x in X_LOCS {
                for y in Y_LOCS {
                    let path = placement_path(&dir, topo.ro_type, x, y, stages);
                    let label = format!("{} [{x},{y}], {stages} stages", topo.name);
                    if let Some((ran, res)) = file_range_resolution(&path, 0, 1, &label)? {
                        rows.push(vec![ro as f64, stages as f64, x as f64, y as f64, res, ran]);
                    }
                    progress.iterate();
                }
            }
        }
    }
    progress.clear();
    Ok(rows)
}

pub fn run_variable_gp(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "ranres_s7_variable_gp";
    let Some(rows) = ctx.cached_rows(NAME, collect_variable_gp)? else {
        return Ok(());
    };

    let mut gm = ctx.graph(NAME);
    let ax = gm.create_ax(
        0,
        0,
        ranres_axes(
            "Range vs. resolution, variable GP, Spartan 7",
            LegendPos::UpperRight,
            Some((5e-18, 1e-9)),
        ),
    );

    for (ro, topo) in S7_TOPOLOGIES.iter().enumerate() {
        let own: Vec<&Vec<f64>> = rows
            .iter()
            .filter(|r| r.len() >= 6 && r[0] as usize == ro)
            .collect();
        if own.is_empty() {
            continue;
        }
        for stages in STAGES {
            let (rans, ress): (Vec<f64>, Vec<f64>) = own
                .iter()
                .filter(|r| r[1] as u32 == stages)
                .map(|r| (r[5], r[4]))
                .unzip();
            gm.plot(
                ax,
                &rans,
                &ress,
                PlotStyle::new(ro)
                    .line(LineStyle::None)
                    .marker(stage_marker(stages))
                    .alpha(0.3),
            );
        }
        let rans: Vec<f64> = own.iter().map(|r| r[5]).collect();
        let ress: Vec<f64> = own.iter().map(|r| r[4]).collect();
        if let (Some(gx), Some(gy)) = (stats::geometric_mean(&rans), stats::geometric_mean(&ress)) {
            gm.text(
                ax,
                gx,
                gy,
                topo.name,
                TextSpec::new(Color::Black)
                    .align(HPos::Center, VPos::Center)
                    .border(Color::White),
            );
        }
    }
    stage_legend(&mut gm, ax);
    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Rows `[ro, stages, res, ran]`; the congested point of each topology
/// carries a stage value of -1.
fn collect_no_placement_congest(ctx: &FigureContext) -> Result<Rows, Box<dyn Error>> {
    let dir = ctx.campaign_dir(Campaign::NoPlacementS7);
    let congested_dir = ctx.campaign_dir(Campaign::NoPlacementCongestionS7);
    let mut rows = Rows::new();
    for (ro, topo) in S7_TOPOLOGIES.iter().enumerate() {
        for stages in STAGES {
            let path = no_placement_path(&dir, topo.ro_type, stages);
            let label = format!("{}, {stages} stages", topo.name);
            if let Some((ran, res)) = file_range_resolution(&path, 1, 2, &label)? {
                rows.push(vec![ro as f64, stages as f64, res, ran]);
            }
        }
        let path = congested_path(&congested_dir, topo.ro_type, STAGES[STAGES.len() - 1]);
        let label = format!("{}, congested", topo.name);
        if let Some((ran, res)) = file_range_resolution(&path, 1, 2, &label)? {
            rows.push(vec![ro as f64, CONGESTED, res, ran]);
        }
    }
    Ok(rows)
}

pub fn run_no_placement_congest(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "ranres_s7_no_placement_congest";
    let Some(rows) = ctx.cached_rows(NAME, collect_no_placement_congest)? else {
        return Ok(());
    };

    let mut gm = ctx.graph(NAME);
    let ax = gm.create_ax(
        0,
        0,
        ranres_axes(
            "Range vs. resolution, no placement, Spartan 7",
            LegendPos::LowerLeft,
            None,
        ),
    );

    for (ro, topo) in S7_TOPOLOGIES.iter().enumerate() {
        let own: Vec<&Vec<f64>> = rows
            .iter()
            .filter(|r| r.len() >= 4 && r[0] as usize == ro)
            .collect();
        let mut staged: Vec<&Vec<f64>> = own.iter().copied().filter(|r| r[1] > 0.0).collect();
        staged.sort_by(|a, b| a[1].total_cmp(&b[1]));
        let rans: Vec<f64> = staged.iter().map(|r| r[3]).collect();
        let ress: Vec<f64> = staged.iter().map(|r| r[2]).collect();
        if !rans.is_empty() {
            gm.plot(
                ax,
                &rans,
                &ress,
                PlotStyle::new(ro)
                    .line(LineStyle::Dashed)
                    .marker(Marker::Dot)
                    .alpha(0.5)
                    .label(topo.name),
            );
            gm.text(ax, rans[0], ress[0], topo.name, name_label());
        }
        for r in own.iter().filter(|r| r[1] == CONGESTED) {
            gm.plot(
                ax,
                &[r[3]],
                &[r[2]],
                PlotStyle::new(ro).line(LineStyle::None).marker(Marker::Diamond),
            );
        }
    }
    gm.plot(
        ax,
        &[],
        &[],
        PlotStyle::new(Color::Grey)
            .line(LineStyle::None)
            .marker(Marker::Diamond)
            .label("Congested"),
    );
    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// SmartFusion 2 figure; read straight from the measurements on every run.
pub fn run_sf2(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "ranres_sf2_no_placement";
    if ctx.collect {
        info!("{NAME}: Data argument not available");
        if ctx.quit {
            return Ok(());
        }
    }

    let dir = ctx.campaign_dir(Campaign::NoPlacementSf2);
    let mut gm = ctx.graph(NAME);
    let ax = gm.create_ax(
        0,
        0,
        ranres_axes(
            "Range vs. resolution, no placement, SmartFusion 2",
            LegendPos::UpperRight,
            None,
        ),
    );

    for (ro, topo) in SF2_TOPOLOGIES.iter().enumerate() {
        let mut points: Vec<(u32, f64, f64)> = Vec::new();
        for stages in STAGES {
            let path = no_placement_path(&dir, topo.ro_type, stages);
            let label = format!("{}, {stages} stages", topo.name);
            if let Some((ran, res)) = file_range_resolution(&path, 1, 2, &label)? {
                points.push((stages, ran, res));
            }
        }
        let Some(&(_, ran0, res0)) = points.first() else {
            continue;
        };
        let rans: Vec<f64> = points.iter().map(|p| p.1).collect();
        let ress: Vec<f64> = points.iter().map(|p| p.2).collect();
        gm.plot(ax, &rans, &ress, PlotStyle::new(ro));
        for &(stages, ran, res) in &points {
            gm.plot(
                ax,
                &[ran],
                &[res],
                PlotStyle::new(ro)
                    .line(LineStyle::None)
                    .marker(stage_marker(stages)),
            );
        }
        gm.text(ax, ran0, res0, topo.name, name_label());
    }
    stage_legend(&mut gm, ax);
    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}
