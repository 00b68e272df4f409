//! Axis description and tick placement.
//!
//! Panels are drawn on linear plotters coordinates. A log10 axis is realised
//! by mapping every value through `log10` before drawing, so positions handed
//! to the chart are always in this "display" space.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scale {
    #[default]
    Linear,
    Log10,
}

impl Scale {
    /// Data value to display coordinate; `None` when the value cannot be
    /// shown (non-finite, or non-positive on a log axis).
    pub fn forward(self, v: f64) -> Option<f64> {
        match self {
            Scale::Linear => v.is_finite().then_some(v),
            Scale::Log10 => (v.is_finite() && v > 0.0).then(|| v.log10()),
        }
    }

    pub fn inverse(self, v: f64) -> f64 {
        match self {
            Scale::Linear => v,
            Scale::Log10 => 10f64.powf(v),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Axis {
    pub label: String,
    pub unit: String,
    pub scale: Scale,
    /// Limits in data space.
    pub lim: Option<(f64, f64)>,
    /// Categorical ticks: data-space location and label.
    pub fixed: Option<Vec<(f64, String)>>,
    pub grid: bool,
    pub rotate_labels: bool,
}

impl Axis {
    pub fn new(label: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            unit: unit.into(),
            ..Self::default()
        }
    }

    pub fn log(mut self) -> Self {
        self.scale = Scale::Log10;
        self
    }

    pub fn lim(mut self, lo: f64, hi: f64) -> Self {
        self.lim = Some((lo, hi));
        self
    }

    pub fn fixed<S: Into<String>>(
        mut self,
        locs: &[f64],
        labels: impl IntoIterator<Item = S>,
    ) -> Self {
        self.fixed = Some(
            locs.iter()
                .copied()
                .zip(labels.into_iter().map(Into::into))
                .collect(),
        );
        self
    }

    pub fn grid(mut self) -> Self {
        self.grid = true;
        self
    }

    pub fn rotate_labels(mut self) -> Self {
        self.rotate_labels = true;
        self
    }

    pub fn description(&self) -> String {
        if self.unit.is_empty() {
            self.label.clone()
        } else {
            format!("{} [{}]", self.label, self.unit)
        }
    }

    /// Display-space range from the configured limits, else from the data
    /// extent padded by 5 %.
    pub fn resolve_range(&self, extent: Option<(f64, f64)>) -> (f64, f64) {
        if let Some((lo, hi)) = self.lim {
            if let (Some(a), Some(b)) = (self.scale.forward(lo), self.scale.forward(hi)) {
                if a < b {
                    return (a, b);
                }
            }
        }
        match extent {
            Some((lo, hi)) if hi > lo => {
                let pad = (hi - lo) * 0.05;
                (lo - pad, hi + pad)
            }
            Some((v, _)) => {
                let pad = if v == 0.0 { 0.5 } else { v.abs() * 0.1 };
                (v - pad, v + pad)
            }
            None => (0.0, 1.0),
        }
    }

    /// Tick positions (display space) with their labels inside `range`.
    pub fn ticks(&self, range: (f64, f64)) -> Vec<(f64, String)> {
        let (lo, hi) = range;
        let inside = |v: f64| v >= lo - 1e-9 * (hi - lo) && v <= hi + 1e-9 * (hi - lo);
        if let Some(fixed) = &self.fixed {
            return fixed
                .iter()
                .filter_map(|(loc, label)| {
                    let pos = self.scale.forward(*loc)?;
                    inside(pos).then(|| (pos, label.clone()))
                })
                .collect();
        }
        match self.scale {
            Scale::Linear => {
                let step = nice_step(hi - lo, 6);
                nice_ticks(lo, hi, step)
                    .into_iter()
                    .map(|v| (v, format_linear(v, step)))
                    .collect()
            }
            Scale::Log10 => {
                let first = lo.ceil() as i32;
                let last = hi.floor() as i32;
                if last - first >= 1 {
                    // Thin the decades out on very wide axes.
                    let every = ((last - first) / 8 + 1).max(1);
                    (first..=last)
                        .filter(|k| (k - first) % every == 0)
                        .map(|k| (k as f64, format_decade(k)))
                        .collect()
                } else {
                    let (a, b) = (10f64.powf(lo), 10f64.powf(hi));
                    let step = nice_step(b - a, 4);
                    nice_ticks(a, b, step)
                        .into_iter()
                        .filter(|v| *v > 0.0)
                        .map(|v| (v.log10(), format_linear(v, step)))
                        .collect()
                }
            }
        }
    }
}

/// Round `span / target` to 1, 2, 5 or 10 times a power of ten.
pub fn nice_step(span: f64, target: usize) -> f64 {
    if !(span.is_finite() && span > 0.0) {
        return 1.0;
    }
    let raw = span / target.max(1) as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm < 1.5 {
        1.0
    } else if norm < 3.0 {
        2.0
    } else if norm < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

pub fn nice_ticks(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let mut out = Vec::new();
    if !(step > 0.0) || !lo.is_finite() || !hi.is_finite() {
        return out;
    }
    let start = (lo / step).ceil();
    let mut k = start;
    while k * step <= hi + step * 1e-9 && out.len() < 200 {
        let v = k * step;
        out.push(if v.abs() < step * 1e-9 { 0.0 } else { v });
        k += 1.0;
    }
    out
}

pub fn format_linear(v: f64, step: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let a = v.abs();
    if a >= 1e5 || a < 1e-3 {
        let digits = (a.log10().floor() - step.abs().log10().floor()).clamp(0.0, 3.0) as usize;
        return format!("{:.*e}", digits, v);
    }
    let decimals = (-step.log10().floor()).clamp(0.0, 6.0) as usize;
    format!("{:.*}", decimals, v)
}

pub fn format_decade(k: i32) -> String {
    const SUPERSCRIPT: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    let mut out = String::from("10");
    if k < 0 {
        out.push('⁻');
    }
    for c in k.unsigned_abs().to_string().chars() {
        if let Some(d) = c.to_digit(10) {
            out.push(SUPERSCRIPT[d as usize]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_scale_drops_non_positive_values() {
        assert_eq!(Scale::Log10.forward(100.0), Some(2.0));
        assert_eq!(Scale::Log10.forward(0.0), None);
        assert_eq!(Scale::Log10.forward(-1.0), None);
        assert_eq!(Scale::Linear.forward(f64::NAN), None);
        assert!((Scale::Log10.inverse(-3.0) - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn nice_steps() {
        assert!((nice_step(10.0, 5) - 2.0).abs() < 1e-12);
        assert!((nice_step(1.1, 6) - 0.2).abs() < 1e-12);
        assert!((nice_step(200.0, 6) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn linear_ticks_cover_range() {
        let axis = Axis::new("x", "-");
        let ticks = axis.ticks((0.0, 200.0));
        let pos: Vec<f64> = ticks.iter().map(|t| t.0).collect();
        assert_eq!(pos, vec![0.0, 50.0, 100.0, 150.0, 200.0]);
        assert_eq!(ticks[1].1, "50");
    }

    #[test]
    fn log_ticks_are_decades() {
        let axis = Axis::new("C", "-").log().lim(0.8, 1e4);
        let range = axis.resolve_range(None);
        let ticks = axis.ticks(range);
        let pos: Vec<f64> = ticks.iter().map(|t| t.0).collect();
        assert_eq!(pos, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ticks[3].1, "10³");
        assert_eq!(format_decade(-12), "10⁻¹²");
    }

    #[test]
    fn fixed_ticks_keep_labels_inside_limits() {
        let axis = Axis::new("RO topology", "-")
            .lim(0.5, 4.5)
            .fixed(&[1.0, 2.0, 3.0, 4.0, 9.0], ["a", "b", "c", "d", "e"]);
        let ticks = axis.ticks(axis.resolve_range(None));
        assert_eq!(ticks.len(), 4);
        assert_eq!(ticks[2], (3.0, "c".to_string()));
    }

    #[test]
    fn auto_range_pads_extent() {
        let axis = Axis::new("y", "");
        let (lo, hi) = axis.resolve_range(Some((0.0, 10.0)));
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
        assert_eq!(axis.resolve_range(None), (0.0, 1.0));
        assert_eq!(axis.description(), "y");
    }

    #[test]
    fn linear_labels_switch_to_scientific() {
        assert_eq!(format_linear(1.5, 0.5), "1.5");
        assert_eq!(format_linear(2.0e7, 1.0e7), "2e7");
    }
}
