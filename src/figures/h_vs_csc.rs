//! Min-entropy and throughput against the expected counter value.

use std::error::Error;

use tracing::{info, warn};

use super::FigureContext;
use crate::measurements::Measurement;
use crate::plot::{
    AxesSpec, Axis, Color, Fill, HPos, LineStyle, Marker, PlotStyle, TextSpec, VPos,
};
use crate::store::Rows;

const NAME: &str = "h_vs_csc_s7";
const CSC_LIM: (f64, f64) = (0.0, 200.0);
const H_LIM: (f64, f64) = (-0.05, 1.05);
const H_THRESHOLD: f64 = 0.91;
/// Period differences (s) marked on the throughput panel.
const DELTA_TICKS: [f64; 8] = [
    f64::INFINITY,
    200e-12,
    100e-12,
    75e-12,
    50e-12,
    35e-12,
    25e-12,
    20e-12,
];

/// First index from which `hs` stays at or above `threshold` up to the end.
///
/// `None` when the last value is below the threshold.
pub fn min_entropy_threshold_index(hs: &[f64], threshold: f64) -> Option<usize> {
    match hs.iter().rposition(|&h| h < threshold) {
        Some(i) if i + 1 < hs.len() => Some(i + 1),
        Some(_) => None,
        None if hs.is_empty() => None,
        None => Some(0),
    }
}

/// Rows `[C], [delta], [H], [HTP]` from the entropy model output.
fn collect(ctx: &FigureContext) -> Result<Rows, Box<dyn Error>> {
    let model = &ctx.config.model;
    let path = ctx.config.paths.model_dir.join(model.result_file_name());
    let Some(m) = Measurement::read(&path)? else {
        return Ok(Rows::new());
    };
    let cscs = m.column_f64(0, 1.0)?;
    let hs = m.column_f64(1, 1.0)?;
    let t1 = model.ro_period;
    let ds: Vec<f64> = cscs.iter().map(|c| t1 / c).collect();
    let htps: Vec<f64> = cscs.iter().zip(&hs).map(|(c, h)| h / (c * t1)).collect();
    Ok(vec![cscs, ds, hs, htps])
}

pub fn run(ctx: &FigureContext) -> Result<(), Box<dyn Error>> {
    let Some(rows) = ctx.cached_rows(NAME, collect)? else {
        return Ok(());
    };
    let [cscs, ds, hs, htps] = match <[Vec<f64>; 4]>::try_from(rows) {
        Ok(cols) if !cols[0].is_empty() && cols.iter().all(|c| c.len() == cols[0].len()) => {
            cols
        }
        _ => {
            warn!("{NAME}: no model data, run the `model` target first");
            return Ok(());
        }
    };
    let t1 = ctx.config.model.ro_period;

    let Some(i91) = min_entropy_threshold_index(&hs, H_THRESHOLD) else {
        warn!("{NAME}: min-entropy never settles above {H_THRESHOLD}");
        return Ok(());
    };
    let (csc_91, d_91, h_91, htp_91) = (cscs[i91], ds[i91], hs[i91], htps[i91]);
    info!("0.91 min-entropy point: C={csc_91}, D={d_91:e}, HTP={htp_91:e}, H={h_91}");

    let finite_htps = htps.iter().copied().filter(|v| v.is_finite());
    let htp_lo = finite_htps.clone().fold(f64::INFINITY, f64::min);
    let htp_hi = finite_htps.fold(f64::NEG_INFINITY, f64::max);
    let htp_lim = (htp_lo * 0.9, htp_hi * 1.1);

    let delta_locs: Vec<f64> = DELTA_TICKS
        .iter()
        .map(|d| if d.is_finite() { t1 / d } else { 0.0 })
        .collect();
    let delta_labels = DELTA_TICKS.iter().map(|d| {
        if d.is_finite() {
            format!("{}", (d * 1e12).round())
        } else {
            "∞".to_string()
        }
    });

    let mut gm = ctx.graph(NAME).height_scale(1.4);
    gm.create_grid(2, 1);
    let ax_h = gm.create_ax(
        0,
        0,
        AxesSpec::new(
            Axis::new("Counter output (E[C])", "-")
                .lim(CSC_LIM.0, CSC_LIM.1)
                .grid(),
            Axis::new("Min-entropy", "bit").lim(H_LIM.0, H_LIM.1).grid(),
        )
        .title("Min-entropy and HTP versus E[Δ] and E[C]"),
    );
    let ax_htp = gm.create_ax(
        1,
        0,
        AxesSpec::new(
            Axis::new("Period length difference (E[Δ])", "ps")
                .lim(CSC_LIM.0, CSC_LIM.1)
                .fixed(&delta_locs, delta_labels)
                .grid(),
            Axis::new("HTP", "bit/s").lim(htp_lim.0, htp_lim.1).grid(),
        ),
    );

    gm.fill_between_y(
        ax_h,
        &[CSC_LIM.0, CSC_LIM.1],
        &[h_91, h_91],
        &[H_LIM.1, H_LIM.1],
        Fill::solid(Color::Green),
    );
    gm.fill_between_y(
        ax_htp,
        &[csc_91, CSC_LIM.1],
        &[htp_lim.0, htp_lim.0],
        &[htp_lim.1, htp_lim.1],
        Fill::gradient(Color::Index(2), Color::White),
    );

    gm.plot(ax_h, &cscs, &hs, PlotStyle::new(Color::Index(0)));
    gm.plot(ax_htp, &cscs, &htps, PlotStyle::new(Color::Index(0)));

    let cross = || {
        PlotStyle::new(Color::Index(1))
            .line(LineStyle::None)
            .marker(Marker::Cross)
    };
    gm.plot(ax_h, &[csc_91], &[h_91], cross());
    gm.plot(ax_htp, &[csc_91], &[htp_91], cross());

    let note = |dy| {
        TextSpec::new(Color::Index(1))
            .align(HPos::Left, VPos::Top)
            .offset(4, dy)
            .border(Color::White)
    };
    gm.text(ax_h, csc_91, h_91, format!("E[C] = {csc_91:.0}"), note(6));
    gm.text(
        ax_h,
        csc_91,
        h_91,
        format!("E[Δ] = {:.1} ps", d_91 * 1e12),
        note(18),
    );
    gm.text(
        ax_htp,
        csc_91,
        htp_91,
        format!("HTP = {:.1} Mbit/s", htp_91 / 1e6),
        note(20),
    );

    let path = gm.write_svg()?;
    info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_point_follows_last_dip() {
        let hs = [0.2, 0.95, 0.5, 0.92, 0.97, 0.99];
        assert_eq!(min_entropy_threshold_index(&hs, 0.91), Some(3));
    }

    #[test]
    fn threshold_point_edge_cases() {
        assert_eq!(min_entropy_threshold_index(&[0.95, 0.99], 0.91), Some(0));
        assert_eq!(min_entropy_threshold_index(&[0.95, 0.5], 0.91), None);
        assert_eq!(min_entropy_threshold_index(&[], 0.91), None);
    }
}
