//! Min-entropy of a two-clock counter versus the period difference.
//!
//! Two ring oscillators with mean periods `T1` and `T2 = T1 + delta` and
//! independent Gaussian period jitter race each other: the counter value is
//! the number of `T2` cycles needed for the accumulated phase difference to
//! cover one `T1` period. The counter distribution is estimated by
//! Monte-Carlo simulation and compared with a normal approximation.

use std::f64::consts::SQRT_2;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use statrs::function::erf::erfc;

use crate::config::ModelConfig;
use crate::core::entropy::{self, EntropyEstimate};

const DRAWS_PER_CHUNK: usize = 4096;

/// Race between a reference clock and a slightly slower clock.
#[derive(Clone, Copy, Debug)]
pub struct RaceParams {
    /// Mean period of the reference oscillator (s).
    pub period: f64,
    /// Mean period difference between the two oscillators (s).
    pub delta: f64,
    /// Per-period jitter of each oscillator (s).
    pub sigma: f64,
}

impl RaceParams {
    /// Race for a target mean counter value `csc`, with the jitter derived
    /// from the accumulated-jitter strength `jitter_strength * period`.
    pub fn for_csc(csc: f64, period: f64, jitter_strength: f64) -> Self {
        Self {
            period,
            delta: period / csc,
            sigma: (jitter_strength * period).sqrt(),
        }
    }

    /// Standard deviation of one step of the phase-difference walk.
    fn step_sigma(&self) -> f64 {
        SQRT_2 * self.sigma
    }
}

#[derive(Clone, Debug, Default)]
pub struct RaceDistribution {
    /// `pmf[k - 1]` is the probability of a counter value `k`.
    pub pmf: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ModelPoint {
    pub csc: f64,
    pub sim: EntropyEstimate,
    pub sim_mean: f64,
    pub sim_std: f64,
    pub norm: EntropyEstimate,
    pub norm_mean: f64,
    pub norm_std: f64,
}

impl ModelPoint {
    pub const HEADER: [&'static str; 9] = [
        "CSC",
        "minH (sim)",
        "H (sim)",
        "mean R (sim)",
        "std R (sim)",
        "minH (norm)",
        "H (norm)",
        "mean R (norm)",
        "std R (norm)",
    ];

    pub fn to_row(&self) -> [f64; 9] {
        [
            self.csc,
            self.sim.min_entropy,
            self.sim.shannon,
            self.sim_mean,
            self.sim_std,
            self.norm.min_entropy,
            self.norm.shannon,
            self.norm_mean,
            self.norm_std,
        ]
    }
}

pub fn normal_cdf(x: f64, mu: f64, s: f64) -> f64 {
    0.5 * erfc(-(x - mu) / (s * SQRT_2))
}

/// Distribution of the initial phase offset over `[0, period / 2]`,
/// discretised into `length` points and normalised to unit mass.
pub fn waiting_time_pdf(params: &RaceParams, length: usize) -> Vec<f64> {
    if length < 2 {
        return vec![1.0; length];
    }
    let mu = params.delta.abs();
    let s = params.step_sigma();
    let u_max = params.period / 2.0;
    let step = u_max / (length - 1) as f64;

    let mut pdf = vec![0.0; length];
    for i in 1..length {
        let u_prev = (i - 1) as f64 * step;
        let survival = 1.0 - normal_cdf(u_prev, mu, s);
        pdf[i] = survival * u_max / (mu * length as f64);
    }
    let total: f64 = pdf.iter().sum();
    if total > 0.0 {
        pdf.iter_mut().for_each(|p| *p /= total);
    }
    pdf
}

fn cumulative(pdf: &[f64]) -> Vec<f64> {
    pdf.iter()
        .scan(0.0, |acc, &p| {
            *acc += p;
            Some(*acc)
        })
        .collect()
}

/// One counter outcome: the initial offset is drawn from the waiting-time
/// cdf and the offset walks by `delta` plus jitter until it passes a jittered
/// reference period.
fn race_once<R: Rng + ?Sized>(
    params: &RaceParams,
    cdf: &[f64],
    rng: &mut R,
    max_steps: u32,
) -> u32 {
    let len = cdf.len().max(1) as f64;
    let a: f64 = rng.random();
    let idx = match cdf.partition_point(|&c| c <= a) {
        i if i == cdf.len() => 0,
        i => i,
    };
    let mut r = (idx as f64 - 1.0) / len * params.period / 2.0;
    let z: f64 = rng.sample(StandardNormal);
    let mut t1 = params.period + z * params.sigma;

    let step_sigma = params.step_sigma();
    let mut count = 0u32;
    while r < t1 && count < max_steps {
        let z: f64 = rng.sample(StandardNormal);
        r += params.delta + z * step_sigma;
        if r < 0.0 {
            t1 = 0.0;
        }
        count += 1;
    }
    count
}

fn derive_seed(seed: u64, stream: u64, chunk: u64) -> u64 {
    let mut x = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ chunk.rotate_left(32);
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Simulate `nb_draws` races and tabulate the counter distribution.
///
/// Draws are split into fixed-size chunks simulated in parallel, each with a
/// generator derived from `(seed, stream, chunk)`, so the result does not
/// depend on the thread count.
pub fn race_distribution(
    params: &RaceParams,
    wt_pdf: &[f64],
    nb_draws: usize,
    seed: u64,
    stream: u64,
) -> RaceDistribution {
    if nb_draws == 0 || params.delta.is_nan() || params.delta <= 0.0 {
        return RaceDistribution::default();
    }
    let cdf = cumulative(wt_pdf);
    let max_steps = (64.0 * params.period / params.delta).ceil().min(u32::MAX as f64) as u32;
    let n_chunks = nb_draws.div_ceil(DRAWS_PER_CHUNK);

    let counts: Vec<u32> = (0..n_chunks)
        .into_par_iter()
        .map(|chunk| {
            let mut rng = StdRng::seed_from_u64(derive_seed(seed, stream, chunk as u64));
            let n = DRAWS_PER_CHUNK.min(nb_draws - chunk * DRAWS_PER_CHUNK);
            (0..n)
                .map(|_| race_once(params, &cdf, &mut rng, max_steps))
                .collect::<Vec<u32>>()
        })
        .flatten()
        .collect();

    let max_count = counts.iter().copied().max().unwrap_or(0) as usize;
    let mut pmf = vec![0.0; max_count];
    for &c in &counts {
        if c > 0 {
            pmf[c as usize - 1] += 1.0;
        }
    }
    let n = nb_draws as f64;
    pmf.iter_mut().for_each(|p| *p /= n);

    let mean = counts.iter().map(|&c| c as f64).sum::<f64>() / n;
    let var = counts
        .iter()
        .map(|&c| {
            let d = c as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    RaceDistribution {
        pmf,
        mean,
        std_dev: var.sqrt(),
    }
}

/// Mean and standard deviation of the normal approximation of the counter.
pub fn normal_moments(params: &RaceParams) -> (f64, f64) {
    let ratio = params.period / params.delta;
    let mean = ratio;
    let std_dev = ratio.sqrt() * params.step_sigma() / params.delta;
    (mean, std_dev)
}

/// Mass of each integer counter value `1..=len` under the normal model.
pub fn normal_pmf(mean: f64, std_dev: f64, len: usize) -> Vec<f64> {
    (1..=len)
        .map(|k| {
            let k = k as f64;
            normal_cdf(k + 0.5, mean, std_dev) - normal_cdf(k - 0.5, mean, std_dev)
        })
        .collect()
}

/// Evenly spaced target counter values for the sweep.
pub fn sweep_cscs(cfg: &ModelConfig) -> Vec<f64> {
    match cfg.nb_points {
        0 => Vec::new(),
        1 => vec![cfg.csc_min],
        n => (0..n)
            .map(|i| cfg.csc_min + i as f64 * (cfg.csc_max - cfg.csc_min) / (n - 1) as f64)
            .collect(),
    }
}

/// Simulated and modelled entropy for one target counter value.
pub fn evaluate(cfg: &ModelConfig, csc: f64, stream: u64) -> ModelPoint {
    let params = RaceParams::for_csc(csc, cfg.ro_period, cfg.jitter_strength);
    let wt_pdf = waiting_time_pdf(&params, cfg.wt_resolution);
    let sim = race_distribution(&params, &wt_pdf, cfg.nb_draws, cfg.seed, stream);
    let (norm_mean, norm_std) = normal_moments(&params);
    let norm = normal_pmf(norm_mean, norm_std, sim.pmf.len());

    ModelPoint {
        csc,
        sim: entropy::estimate(&sim.pmf, cfg.entropy_bits),
        sim_mean: sim.mean,
        sim_std: sim.std_dev,
        norm: entropy::estimate(&norm, cfg.entropy_bits),
        norm_mean,
        norm_std,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ModelConfig {
        ModelConfig {
            nb_draws: 20_000,
            wt_resolution: 200,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn normal_cdf_matches_reference_points() {
        assert!((normal_cdf(0.0, 0.0, 1.0) - 0.5).abs() < 1e-12);
        assert!((normal_cdf(1.96, 0.0, 1.0) - 0.975).abs() < 1e-3);
        assert!((normal_cdf(3.0, 1.0, 2.0) - normal_cdf(1.0, 0.0, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn waiting_time_pdf_is_normalised_and_decreasing() {
        let params = RaceParams::for_csc(20.0, 3.69e-9, 4.6e-15);
        let pdf = waiting_time_pdf(&params, 500);
        assert_eq!(pdf.len(), 500);
        assert_eq!(pdf[0], 0.0);
        let total: f64 = pdf.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(pdf[1] >= pdf[499]);
    }

    #[test]
    fn race_mean_tracks_period_ratio() {
        let cfg = test_config();
        let params = RaceParams::for_csc(50.0, cfg.ro_period, cfg.jitter_strength);
        let pdf = waiting_time_pdf(&params, cfg.wt_resolution);
        let dist = race_distribution(&params, &pdf, cfg.nb_draws, 1, 0);
        let total: f64 = dist.pmf.iter().sum();
        assert!(total <= 1.0 + 1e-9);
        // The offset starts inside [0, T1/2], so the count lies between
        // half and the full period ratio.
        assert!(dist.mean > 20.0 && dist.mean < 55.0, "mean {}", dist.mean);
        assert!(dist.std_dev > 0.0);
    }

    #[test]
    fn race_is_reproducible_for_a_seed() {
        let cfg = test_config();
        let params = RaceParams::for_csc(10.0, cfg.ro_period, cfg.jitter_strength);
        let pdf = waiting_time_pdf(&params, cfg.wt_resolution);
        let a = race_distribution(&params, &pdf, 9_000, 42, 3);
        let b = race_distribution(&params, &pdf, 9_000, 42, 3);
        assert_eq!(a.pmf, b.pmf);
        assert_eq!(a.mean, b.mean);
    }

    #[test]
    fn entropy_grows_with_counter_value() {
        let cfg = test_config();
        let low = evaluate(&cfg, 2.0, 0);
        let high = evaluate(&cfg, 200.0, 1);
        assert!(low.sim.min_entropy < high.sim.min_entropy);
        assert!(high.sim.min_entropy > 0.8, "{:?}", high.sim);
        assert!(high.norm.min_entropy > 0.8, "{:?}", high.norm);
        assert!(high.sim.min_entropy <= high.sim.shannon + 1e-9);
    }

    #[test]
    fn normal_moments_follow_period_ratio() {
        let params = RaceParams::for_csc(100.0, 3.69e-9, 4.6e-15);
        let (mean, std_dev) = normal_moments(&params);
        assert!((mean - 100.0).abs() < 1e-9);
        let expected = 10.0 * SQRT_2 * (4.6e-15f64 * 3.69e-9).sqrt() / (3.69e-11);
        assert!((std_dev - expected).abs() < 1e-9 * expected);
    }

    #[test]
    fn sweep_spans_configured_range() {
        let cfg = ModelConfig {
            nb_points: 5,
            csc_min: 1.0,
            csc_max: 9.0,
            ..ModelConfig::default()
        };
        assert_eq!(sweep_cscs(&cfg), vec![1.0, 3.0, 5.0, 7.0, 9.0]);
    }
}
