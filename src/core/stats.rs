//! Descriptive statistics over measured periods and counter values.
//!
//! All functions return `None` on empty input instead of propagating NaN.

use std::collections::HashMap;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by `n`).
pub fn variance(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let ss: f64 = values.iter().map(|&v| (v - mu) * (v - mu)).sum();
    Some(ss / values.len() as f64)
}

pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let s = sorted(values);
    Some(quantile_sorted(&s, q))
}

pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Interquartile range divided by the median.
pub fn normalized_range(periods: &[f64]) -> Option<f64> {
    if periods.is_empty() {
        return None;
    }
    let s = sorted(periods);
    let q25 = quantile_sorted(&s, 0.25);
    let q75 = quantile_sorted(&s, 0.75);
    let med = quantile_sorted(&s, 0.5);
    Some((q75 - q25) / med)
}

/// Median of the non-zero gaps between successive sorted periods.
pub fn resolution(periods: &[f64]) -> Option<f64> {
    let s = sorted(periods);
    let diffs: Vec<f64> = s
        .windows(2)
        .filter(|w| w[1] != w[0])
        .map(|w| w[1] - w[0])
        .collect();
    median(&diffs)
}

/// Element of the sorted data at rank `floor(len * q + 0.5)`.
pub fn index_quantile(values: &[f64], q: f64) -> Option<f64> {
    let s = sorted(values);
    let idx = (s.len() as f64 * q + 0.5) as usize;
    s.get(idx).copied()
}

/// Geometric mean of strictly positive values.
pub fn geometric_mean(values: &[f64]) -> Option<f64> {
    let logs: Vec<f64> = values.iter().filter(|v| **v > 0.0).map(|v| v.ln()).collect();
    mean(&logs).map(f64::exp)
}

/// Collapse repeated configuration ids into one averaged period each,
/// keeping the order in which ids first appear.
pub fn average_identical_configs(confs: &[i64], periods: &[f64]) -> (Vec<i64>, Vec<f64>) {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut out_confs: Vec<i64> = Vec::new();
    let mut sums: Vec<f64> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();

    for (&conf, &per) in confs.iter().zip(periods) {
        match index.get(&conf) {
            Some(&i) => {
                sums[i] += per;
                counts[i] += 1;
            }
            None => {
                index.insert(conf, out_confs.len());
                out_confs.push(conf);
                sums.push(per);
                counts.push(1);
            }
        }
    }

    let means = sums
        .iter()
        .zip(&counts)
        .map(|(s, &n)| s / n as f64)
        .collect();
    (out_confs, means)
}
