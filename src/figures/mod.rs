//! Figure pipelines.
//!
//! Every figure either collects its data from the raw measurements (`-d`)
//! and stores it in the flat cache, or reads that cache back, then renders
//! an SVG through [`GraphMaker`]. Missing inputs skip the figure with a
//! warning rather than failing the run.

mod csc_fixed;
mod csc_no_placement;
mod h_vs_csc;
mod intralut;
mod max_counts;
pub mod model;
mod ranres;

use std::error::Error;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::cli::{Args, Target};
use crate::config::AppConfig;
use crate::measurements::Campaign;
use crate::plot::{Ax, AxesSpec, Axis, Color, Fill, GraphMaker, ViolinStyle};
use crate::store::{Rows, StoreData};
use crate::timelog::TimeLogger;

pub use h_vs_csc::min_entropy_threshold_index;
pub use intralut::{counter_limit, intralut_range, intralut_resolution};

/// Run-wide settings shared by all figures.
#[derive(Clone, Debug)]
pub struct FigureContext {
    pub config: AppConfig,
    pub time_log: bool,
    pub collect: bool,
    pub quit: bool,
}

impl FigureContext {
    pub fn new(config: AppConfig, args: &Args) -> Self {
        Self {
            config,
            time_log: args.time_log,
            collect: args.collect,
            quit: args.quit,
        }
    }

    pub fn store(&self, name: &str) -> StoreData {
        StoreData::new(&self.config.paths.cache_dir, name, None)
    }

    pub fn campaign_dir(&self, campaign: Campaign) -> PathBuf {
        campaign.root(&self.config.paths.measurements_dir)
    }

    pub fn graph(&self, name: &str) -> GraphMaker {
        GraphMaker::new(&self.config.paths.output_dir, name, &self.config.render)
    }

    pub fn progress(&self, total: usize) -> TimeLogger {
        TimeLogger::new(total, self.time_log)
    }

    /// Collected rows (stored to the cache) or the cached rows.
    ///
    /// `None` means there is nothing left to do for this figure: either the
    /// run stops after collection, or no cache exists yet.
    pub fn cached_rows<F>(&self, name: &str, collect: F) -> Result<Option<Rows>, Box<dyn Error>>
    where
        F: FnOnce(&Self) -> Result<Rows, Box<dyn Error>>,
    {
        let store = self.store(name);
        if self.collect {
            let rows = collect(self)?;
            store.write_data(&rows, true)?;
            info!("stored {} rows at {}", rows.len(), store.file_path().display());
            if self.quit {
                return Ok(None);
            }
            return Ok(Some(rows));
        }
        match store.read_data()? {
            Some(rows) => Ok(Some(rows)),
            None => {
                warn!("No data was stored at: {}", store.file_path().display());
                Ok(None)
            }
        }
    }
}

pub fn run(target: Target, ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    match target {
        Target::CscS7FixedPlacement => csc_fixed::run_fixed_placement(ctx),
        Target::CscS7PlacementSweepWirevar => csc_fixed::run_placement_sweep(ctx),
        Target::CscS7StageLength => csc_no_placement::run_stage_length(ctx),
        Target::CscS7NoPlacementCongest => csc_no_placement::run_congest(ctx),
        Target::MaxCountsS7NoPlacement => max_counts::run(ctx),
        Target::RanresS7VariableGp => ranres::run_variable_gp(ctx),
        Target::RanresS7NoPlacementCongest => ranres::run_no_placement_congest(ctx),
        Target::RanresSf2NoPlacement => ranres::run_sf2(ctx),
        Target::IntralutRange => intralut::run_range(ctx),
        Target::IntralutRes => intralut::run_resolution(ctx),
        Target::HVsCscS7 => h_vs_csc::run(ctx),
        Target::Model => model::run(ctx),
        Target::All => {
            for t in Target::expand(&[Target::All]) {
                run(t, ctx)?;
            }
            Ok(())
        }
    }
}

/// Gradient from white at the C threshold up to the top of the axis.
pub(crate) fn threshold_band(gm: &mut GraphMaker, ax: Ax, threshold: f64, x_lim: (f64, f64), y_top: f64) {
    gm.fill_between_y(
        ax,
        &[x_lim.0, x_lim.1],
        &[threshold, threshold],
        &[y_top, y_top],
        Fill::gradient(Color::White, Color::Index(2)),
    );
}

/// Start a log-scale C violin figure with the threshold band already drawn.
pub(crate) fn csc_violin_graph(
    ctx: &FigureContext,
    name: &str,
    title: &str,
    x: Axis,
    y_lim: (f64, f64),
    height_scale: f64,
) -> (GraphMaker, Ax) {
    let x_lim = x.lim.unwrap_or((0.5, 1.5));
    let y = Axis::new("Counter sample count (C)", "-")
        .log()
        .lim(y_lim.0, y_lim.1)
        .grid();
    let mut gm = ctx.graph(name).height_scale(height_scale);
    let ax = gm.create_ax(0, 0, AxesSpec::new(x, y).title(title));
    threshold_band(&mut gm, ax, ctx.config.csc.threshold, x_lim, y_lim.1);
    (gm, ax)
}

pub(crate) fn csc_violin_style() -> ViolinStyle {
    ViolinStyle {
        color: Color::Index(0),
        accent: Color::Index(1),
        ..ViolinStyle::default()
    }
}

pub(crate) fn stages_label(stages: u32) -> String {
    if stages == 1 {
        "1 stage".to_string()
    } else {
        format!("{stages} stages")
    }
}
