//! Counter sample count ("C") estimation from two measured period populations.
//!
//! A pair of ring oscillators with periods `d0` and `d1` produces a counter
//! value of `|d0 / (d1 - d0)|`. Pairing every measured configuration of one
//! oscillator with every configuration of the other gives the obtainable C
//! distribution. When that product space exceeds a cap, it is subsampled with
//! a maximal-length LFSR whose state is split into one index per population.

use tracing::debug;

use crate::core::lfsr::Lfsr;
use crate::error::FigureError;

/// Cap used for the fixed-placement figure.
pub const FIXED_PLACEMENT_CAP: usize = 1 << 16;
/// Cap used for the placement sweep figure.
pub const PLACEMENT_SWEEP_CAP: usize = 1 << 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pairing {
    Exhaustive,
    Lfsr { lo_bits: u32, hi_bits: u32 },
}

#[derive(Clone, Debug)]
pub struct CscSample {
    pub values: Vec<f64>,
    pub n0: usize,
    pub n1: usize,
    /// Number of pairs drawn before discarding equal periods.
    pub candidates: usize,
    pub pairing: Pairing,
}

impl CscSample {
    pub fn dropped(&self) -> usize {
        self.candidates - self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[inline]
fn csc_of(d0: f64, d1: f64) -> Option<f64> {
    if d0 == d1 {
        None
    } else {
        Some((d0 / (d1 - d0)).abs())
    }
}

/// Pair `d0s` with `d1s` and return the obtainable C values.
///
/// Up to `cap` pairs the full Cartesian product is used; above it the LFSR
/// subsampler draws exactly `cap` candidate pairs.
pub fn sample_csc(d0s: &[f64], d1s: &[f64], cap: usize) -> Result<CscSample, FigureError> {
    let n0 = d0s.len();
    let n1 = d1s.len();
    if n0 == 0 || n1 == 0 {
        return Ok(CscSample {
            values: Vec::new(),
            n0,
            n1,
            candidates: 0,
            pairing: Pairing::Exhaustive,
        });
    }

    if n0.saturating_mul(n1) <= cap {
        let values: Vec<f64> = d0s
            .iter()
            .flat_map(|&d0| d1s.iter().filter_map(move |&d1| csc_of(d0, d1)))
            .collect();
        return Ok(CscSample {
            values,
            n0,
            n1,
            candidates: n0 * n1,
            pairing: Pairing::Exhaustive,
        });
    }

    let lo_bits = n0.ilog2();
    let hi_bits = n1.ilog2();
    let mut lfsr = Lfsr::new(lo_bits + hi_bits)?;
    debug!(
        "lfsr pairing: n0={n0} n1={n1} width={} cap={cap}",
        lfsr.width()
    );

    let mut values = Vec::with_capacity(cap);
    for _ in 0..cap {
        let (i0, i1) = lfsr.split(lo_bits, hi_bits);
        if let Some(c) = csc_of(d0s[i0], d1s[i1]) {
            values.push(c);
        }
        lfsr.next();
    }

    Ok(CscSample {
        values,
        n0,
        n1,
        candidates: cap,
        pairing: Pairing::Lfsr { lo_bits, hi_bits },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_products_pair_exhaustively() {
        let d0s = [1.0, 2.0];
        let d1s = [1.5, 2.0, 3.0];
        let sample = sample_csc(&d0s, &d1s, 16).unwrap();
        assert_eq!(sample.pairing, Pairing::Exhaustive);
        assert_eq!(sample.candidates, 6);
        // (2.0, 2.0) is the only equal pair.
        assert_eq!(sample.values.len(), 5);
        assert_eq!(sample.dropped(), 1);
        assert!((sample.values[0] - 2.0).abs() < 1e-12);
        assert!((sample.values[1] - 1.0).abs() < 1e-12);
        assert!((sample.values[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn product_at_cap_stays_exhaustive() {
        let d0s: Vec<f64> = (0..8).map(|i| 3.0 + i as f64 * 0.01).collect();
        let d1s: Vec<f64> = (0..8).map(|i| 3.5 + i as f64 * 0.01).collect();
        let sample = sample_csc(&d0s, &d1s, 64).unwrap();
        assert_eq!(sample.pairing, Pairing::Exhaustive);
        assert_eq!(sample.values.len(), 64);
    }

    #[test]
    fn large_products_use_lfsr_and_draw_cap_candidates() {
        let d0s: Vec<f64> = (0..1024).map(|i| 3.0 + i as f64 * 1e-4).collect();
        let d1s: Vec<f64> = (0..40).map(|i| 3.3 + i as f64 * 1e-4).collect();
        let sample = sample_csc(&d0s, &d1s, 4096).unwrap();
        assert_eq!(
            sample.pairing,
            Pairing::Lfsr {
                lo_bits: 10,
                hi_bits: 5
            }
        );
        assert_eq!(sample.candidates, 4096);
        assert_eq!(sample.values.len(), 4096);
        assert!(sample.values.iter().all(|c| c.is_finite() && *c > 0.0));
    }

    #[test]
    fn lfsr_pairing_discards_equal_periods() {
        let d0s = vec![2.0; 64];
        let mut d1s = vec![2.0; 64];
        d1s[1] = 3.0;
        let sample = sample_csc(&d0s, &d1s, 512).unwrap();
        assert!(matches!(sample.pairing, Pairing::Lfsr { .. }));
        assert_eq!(sample.candidates, 512);
        assert!(sample.values.iter().all(|c| (*c - 2.0).abs() < 1e-12));
        assert!(sample.dropped() > sample.values.len());
    }

    #[test]
    fn identical_populations_give_empty_result() {
        let d = [1.0, 1.0, 1.0];
        let sample = sample_csc(&d, &d, 100).unwrap();
        assert!(sample.is_empty());
        assert_eq!(sample.dropped(), 9);
    }

    #[test]
    fn empty_population_is_not_an_error() {
        let sample = sample_csc(&[], &[1.0, 2.0], 100).unwrap();
        assert!(sample.is_empty());
        assert_eq!(sample.candidates, 0);
    }

    #[test]
    fn unsupported_width_is_reported() {
        // 2 * 2 = 4 bits is below the smallest tap table entry.
        let d0s = [1.0, 1.1, 1.2, 1.3];
        let d1s = [2.0, 2.1, 2.2, 2.3];
        let err = sample_csc(&d0s, &d1s, 8).unwrap_err();
        assert!(matches!(err, FigureError::LfsrWidth(4)));
    }
}
