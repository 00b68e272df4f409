//! Shape of a violin: Gaussian kernel density plus box statistics.

use crate::core::stats::{self, quantile_sorted};

#[derive(Clone, Debug, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Most extreme samples within 1.5 IQR of the box.
    pub whisker_lo: f64,
    pub whisker_hi: f64,
    /// Samples beyond the whiskers, with near-duplicates merged.
    pub fliers: Vec<f64>,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let s = stats::sorted(values);
    if s.is_empty() {
        return None;
    }
    let q1 = quantile_sorted(&s, 0.25);
    let median = quantile_sorted(&s, 0.5);
    let q3 = quantile_sorted(&s, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let whisker_lo = s.iter().copied().find(|&v| v >= lo_fence).unwrap_or(q1);
    let whisker_hi = s.iter().rev().copied().find(|&v| v <= hi_fence).unwrap_or(q3);

    let span = s[s.len() - 1] - s[0];
    let tol = span * 1e-3;
    let mut fliers: Vec<f64> = s
        .iter()
        .copied()
        .filter(|&v| v < whisker_lo || v > whisker_hi)
        .collect();
    fliers.dedup_by(|a, b| (*a - *b).abs() <= tol);

    Some(BoxStats {
        q1,
        median,
        q3,
        whisker_lo,
        whisker_hi,
        fliers,
    })
}

/// Gaussian kernel density with Scott's bandwidth, evaluated at `points`
/// evenly spaced positions between the smallest and largest sample.
///
/// Returns `(position, density)` pairs; empty when the samples have no
/// spread.
pub fn kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    let n = values.len();
    let Some(sd) = stats::std_dev(values) else {
        return Vec::new();
    };
    if n < 2 || sd <= 0.0 || points < 2 {
        return Vec::new();
    }
    let bw = sd * (n as f64).powf(-0.2);
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let norm = 1.0 / (n as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let y = lo + (hi - lo) * i as f64 / (points - 1) as f64;
            let d: f64 = values
                .iter()
                .map(|&v| {
                    let z = (y - v) / bw;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (y, d * norm)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_stats_flag_outliers() {
        let mut v: Vec<f64> = (1..=20).map(f64::from).collect();
        v.push(100.0);
        let b = box_stats(&v).unwrap();
        assert_eq!(b.median, 11.0);
        assert_eq!(b.whisker_lo, 1.0);
        assert_eq!(b.whisker_hi, 20.0);
        assert_eq!(b.fliers, vec![100.0]);
    }

    #[test]
    fn constant_samples_have_no_density() {
        assert!(kde(&[3.0, 3.0, 3.0], 32).is_empty());
        assert!(box_stats(&[]).is_none());
        let b = box_stats(&[3.0, 3.0]).unwrap();
        assert!(b.fliers.is_empty());
    }

    #[test]
    fn density_peaks_near_the_mode() {
        let v = [0.0, 0.9, 1.0, 1.0, 1.1, 2.0];
        let d = kde(&v, 21);
        assert_eq!(d.len(), 21);
        let (peak, _) = d
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!((peak - 1.0).abs() < 0.15, "peak at {peak}");
    }
}
