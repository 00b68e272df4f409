//! Range and resolution per physical LUT input port.
//!
//! Both figures read the placed LUT oscillators at x0y0 directly; there is
//! nothing to cache.

use std::error::Error;

use tracing::{info, warn};

use super::{FigureContext, stages_label};
use crate::core::stats;
use crate::measurements::{Campaign, placement_path, read_column};
use crate::plot::{Ax, AxesSpec, Axis, Bar, Color, GraphMaker, HPos, TextSpec, VPos};

const LUT_INPUTS: [u32; 6] = [0, 1, 2, 3, 4, 5];
const STAGES: [u32; 4] = [1, 2, 3, 4];
const LOCATION: (u32, u32) = (0, 0);
const DELAY_COLUMN: usize = 1;
/// Reference count of the period counter.
const COUNTER_REF: f64 = 1_307_540.0;
const PS_PER_NS: f64 = 1000.0;

/// Index-quantile interquartile range of the delays, in ps.
pub fn intralut_range(delays_ns: &[f64]) -> Option<f64> {
    let q25 = stats::index_quantile(delays_ns, 0.25)?;
    let q75 = stats::index_quantile(delays_ns, 0.75)?;
    Some((q75 - q25) * PS_PER_NS)
}

/// Smallest period difference the counter can tell apart at `period_ns`,
/// in ns.
pub fn counter_limit(period_ns: f64) -> f64 {
    period_ns - COUNTER_REF / (COUNTER_REF / period_ns + 1.0)
}

/// Median resolution in ps, raised to the counter limit when finer; the flag
/// is set when the limit was hit.
pub fn intralut_resolution(delays_ns: &[f64]) -> Option<(f64, bool)> {
    let res = stats::resolution(delays_ns)? * PS_PER_NS;
    let limit = counter_limit(stats::mean(delays_ns)?) * PS_PER_NS;
    if res < limit {
        Some((limit, true))
    } else {
        Some((res, false))
    }
}

/// Bar position of LUT input `input` in stage group `s`.
fn bar_position(input: usize, s: usize) -> f64 {
    (s * (LUT_INPUTS.len() + 1) + input + 1) as f64
}

/// Delays of every (input, stage) combination that has data.
fn read_delays(ctx: &FigureContext) -> Result<Vec<(usize, usize, Vec<f64>)>, Box<dyn Error>> {
    let dir = ctx.campaign_dir(Campaign::VariableGpS7);
    let mut out = Vec::new();
    for (i, input) in LUT_INPUTS.iter().enumerate() {
        let ro_type = format!("intralut{input}");
        for (s, &stages) in STAGES.iter().enumerate() {
            let path = placement_path(&dir, &ro_type, LOCATION.0, LOCATION.1, stages);
            if let Some(delays) = read_column(&path, DELAY_COLUMN, 1.0)? {
                out.push((i, s, delays));
            }
        }
    }
    Ok(out)
}

fn lut_graph(ctx: &FigureContext, name: &str, title: &str, y: Axis) -> (GraphMaker, Ax) {
    let mut positions = Vec::new();
    let mut labels = Vec::new();
    for s in 0..STAGES.len() {
        for (i, input) in LUT_INPUTS.iter().enumerate() {
            positions.push(bar_position(i, s));
            labels.push(input.to_string());
        }
    }
    let group = (LUT_INPUTS.len() + 1) as f64;
    let x = Axis::new("Physical input port number", "-")
        .lim(0.5, group * STAGES.len() as f64 - 0.5)
        .fixed(&positions, labels);
    let y_top = y.lim.map_or(1.0, |l| l.1);
    let mut gm = ctx.graph(name).height_scale(0.6);
    let ax = gm.create_ax(0, 0, AxesSpec::new(x, y).title(title));
    for (s, &stages) in STAGES.iter().enumerate() {
        gm.text(
            ax,
            group * (s as f64 + 0.5),
            y_top,
            stages_label(stages),
            TextSpec::new(Color::Black)
                .align(HPos::Center, VPos::Top)
                .offset(0, 4),
        );
    }
    (gm, ax)
}

/// The LUT figures have no cache; `-d -q` ends them early.
fn skip_for_collect(ctx: &FigureContext) -> bool {
    ctx.collect && ctx.quit
}

pub fn run_range(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "intralut_range";
    if skip_for_collect(ctx) {
        return Ok(());
    }
    let y = Axis::new("Range", "ps").lim(0.0, 30.0).grid();
    let (mut gm, ax) = lut_graph(ctx, NAME, "Range per LUT input, Spartan 7", y);

    let mut bars = Vec::new();
    for (i, s, delays) in read_delays(ctx)? {
        let Some(range) = intralut_range(&delays) else {
            warn!("intralut{}, {} stages: too few delays", LUT_INPUTS[i], STAGES[s]);
            continue;
        };
        bars.push(Bar {
            x: bar_position(i, s),
            height: range,
            width: 0.8,
            fill: Color::LightBlue,
            edge: Color::Index(0),
        });
    }
    gm.bars(ax, bars);
    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}

pub fn run_resolution(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    const NAME: &str = "intralut_res";
    if skip_for_collect(ctx) {
        return Ok(());
    }
    let y = Axis::new("Resolution", "ps").lim(0.0, 1.0).grid();
    let (mut gm, ax) = lut_graph(ctx, NAME, "Resolution per LUT input, Spartan 7", y);

    let mut bars = Vec::new();
    for (i, s, delays) in read_delays(ctx)? {
        let Some((res, limited)) = intralut_resolution(&delays) else {
            warn!(
                "intralut{}, {} stages: too few distinct delays",
                LUT_INPUTS[i], STAGES[s]
            );
            continue;
        };
        let (fill, edge) = if limited {
            info!("hit measurement limit {} {}", STAGES[s], LUT_INPUTS[i]);
            (Color::LightOrange, Color::Orange)
        } else {
            (Color::LightBlue, Color::Index(0))
        };
        bars.push(Bar {
            x: bar_position(i, s),
            height: res,
            width: 0.8,
            fill,
            edge,
        });
    }
    gm.bars(ax, bars);
    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_uses_rank_quantiles() {
        // len 8: ranks 2 and 6.
        let delays = [1.0, 1.001, 1.002, 1.003, 1.004, 1.005, 1.006, 1.007];
        let r = intralut_range(&delays).unwrap();
        assert!((r - 4.0).abs() < 1e-9, "{r}");
    }

    #[test]
    fn resolution_is_clamped_to_counter_limit() {
        // Period ~2 ns: the counter limit is about 3 fs.
        let limit_ps = counter_limit(2.0) * PS_PER_NS;
        assert!(limit_ps > 0.0 && limit_ps < 0.01, "{limit_ps}");

        let coarse = [2.0, 2.0005, 2.001];
        let (res, limited) = intralut_resolution(&coarse).unwrap();
        assert!(!limited);
        assert!((res - 0.5).abs() < 1e-6);

        let fine = [2.0, 2.000_000_1, 2.000_000_2];
        let (res, limited) = intralut_resolution(&fine).unwrap();
        assert!(limited);
        assert!((res - counter_limit(2.000_000_1) * PS_PER_NS).abs() < 1e-9);
    }

    #[test]
    fn inputs_are_grouped_by_stage() {
        assert_eq!(bar_position(0, 0), 1.0);
        assert_eq!(bar_position(5, 0), 6.0);
        assert_eq!(bar_position(0, 1), 8.0);
    }
}
