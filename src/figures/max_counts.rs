//! Controller latency against the upper C bound.

use std::error::Error;

use tracing::{info, warn};

use super::FigureContext;
use crate::measurements::{Campaign, GATE_VAR, Measurement, Topology, WIRE_VAR, max_count_path};
use crate::plot::{AxesSpec, Axis, LegendPos, LineStyle, Marker, PlotStyle};
use crate::store::Rows;

const TOPOLOGIES: [Topology; 2] = [GATE_VAR, WIRE_VAR];
const STAGES: [u32; 2] = [3, 4];
const MARKERS: [Marker; 4] = [Marker::Circle, Marker::Cross, Marker::Square, Marker::TriangleUp];
/// Controller clock period in seconds per counted cycle.
const CYCLE_SCALE: f64 = 10e-9;

fn series() -> impl Iterator<Item = (Topology, u32)> {
    TOPOLOGIES
        .into_iter()
        .flat_map(|t| STAGES.into_iter().map(move |s| (t, s)))
}

/// Two rows per (topology, stages): the C bounds, then the latencies.
fn collect(ctx: &FigureContext) -> Result<Rows, Box<dyn Error>> {
    let dir = ctx.campaign_dir(Campaign::MatchedControlS7);
    let mut rows = Rows::new();
    for (topo, stages) in series() {
        let path = max_count_path(&dir, topo.ro_type, stages);
        let Some(m) = Measurement::read(&path)? else {
            rows.push(Vec::new());
            rows.push(Vec::new());
            continue;
        };
        let bounds: Vec<f64> = m.column_i64(0)?.into_iter().map(|v| v as f64).collect();
        let latencies = m.column_f64(1, CYCLE_SCALE)?;
        info!(
            "{}, {stages} stages: {} bounds, max latency {:.3e} s",
            topo.name,
            bounds.len(),
            latencies.iter().copied().fold(0.0, f64::max),
        );
        rows.push(bounds);
        rows.push(latencies);
    }
    Ok(rows)
}

pub fn run(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "max_counts_s7_no_placement";
    let Some(rows) = ctx.cached_rows(NAME, collect)? else {
        return Ok(());
    };

    let x = Axis::new("Upper C bound (h)", "-").grid();
    let y = Axis::new("Controller latency", "s").log().lim(1e-4, 1e-1).grid();
    let mut gm = ctx.graph(NAME);
    let ax = gm.create_ax(
        0,
        0,
        AxesSpec::new(x, y)
            .title("Controller latency, variable upper C bound")
            .legend(LegendPos::UpperLeft),
    );

    for (i, (topo, stages)) in series().enumerate() {
        let (Some(ms), Some(ls)) = (rows.get(2 * i), rows.get(2 * i + 1)) else {
            warn!("{}, {stages} stages: missing from the cache", topo.name);
            continue;
        };
        if ms.is_empty() {
            continue;
        }
        gm.plot(
            ax,
            ms,
            ls,
            PlotStyle::new(i)
                .line(LineStyle::None)
                .marker(MARKERS[i % MARKERS.len()])
                .label(format!("{}, {stages} stages", topo.name)),
        );
    }
    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}
