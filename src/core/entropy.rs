//! Entropy of a counter-value distribution after truncation to `bits` bits.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EntropyEstimate {
    /// Worst-case entropy per output bit.
    pub min_entropy: f64,
    /// Shannon entropy per output bit.
    pub shannon: f64,
}

/// Widest truncation the folding accepts; wider requests are clamped.
pub const MAX_ENTROPY_BITS: u32 = 20;

/// Fold masses for outcomes `k = 1, 2, ...` (`pmf[k - 1]`) into `2^bits` bins
/// by `k mod 2^bits`.
pub fn fold_bins(pmf: &[f64], bits: u32) -> Vec<f64> {
    let n_bins = 1usize << bits.min(MAX_ENTROPY_BITS);
    let mut bins = vec![0.0; n_bins];
    for (i, &p) in pmf.iter().enumerate() {
        bins[(i + 1) % n_bins] += p;
    }
    bins
}

/// Entropy of the binned masses, normalised by `bits`.
///
/// The masses are used as given; a distribution whose mass does not sum to one
/// (for example a truncated analytic model) is not renormalised.
pub fn from_bins(bins: &[f64]) -> EntropyEstimate {
    if bins.len() < 2 {
        return EntropyEstimate::default();
    }
    let scale = (bins.len() as f64).ln();
    let max = bins.iter().copied().fold(0.0f64, f64::max);
    let min_entropy = if max > 0.0 { -max.ln() / scale } else { 0.0 };
    let shannon = bins
        .iter()
        .filter(|&&b| b != 0.0)
        .map(|&b| -b * b.ln() / scale)
        .sum();
    EntropyEstimate {
        min_entropy,
        shannon,
    }
}

pub fn estimate(pmf: &[f64], bits: u32) -> EntropyEstimate {
    from_bins(&fold_bins(pmf, bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_parity_is_one_bit() {
        let pmf = [0.25, 0.25, 0.25, 0.25];
        let h = estimate(&pmf, 1);
        assert!((h.min_entropy - 1.0).abs() < 1e-12);
        assert!((h.shannon - 1.0).abs() < 1e-12);
    }

    #[test]
    fn deterministic_count_has_zero_entropy() {
        let pmf = [0.0, 0.0, 1.0];
        let h = estimate(&pmf, 1);
        assert!(h.min_entropy.abs() < 1e-12);
        assert!(h.shannon.abs() < 1e-12);
    }

    #[test]
    fn outcomes_fold_by_count_modulo() {
        // counts 1..=5 -> bins [2, 4] and [1, 3, 5]
        let bins = fold_bins(&[0.1, 0.2, 0.3, 0.15, 0.25], 1);
        assert!((bins[0] - 0.35).abs() < 1e-12);
        assert!((bins[1] - 0.65).abs() < 1e-12);

        let bins = fold_bins(&[0.1, 0.2, 0.3, 0.15, 0.25], 2);
        assert_eq!(bins.len(), 4);
        assert!((bins[1] - 0.35).abs() < 1e-12);
        assert!((bins[0] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn oversized_widths_are_clamped() {
        let bins = fold_bins(&[0.5, 0.5], 64);
        assert_eq!(bins.len(), 1 << MAX_ENTROPY_BITS);
        assert!((bins[1] - 0.5).abs() < 1e-12 && (bins[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn min_entropy_never_exceeds_shannon() {
        let h = estimate(&[0.1, 0.5, 0.2, 0.2], 1);
        assert!(h.min_entropy <= h.shannon + 1e-12);
        assert!((h.min_entropy - (-(0.7f64).ln() / 2f64.ln())).abs() < 1e-12);
    }
}
