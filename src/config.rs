use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::entropy::MAX_ENTROPY_BITS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    #[serde(default = "PathsConfig::default_measurements_dir")]
    pub measurements_dir: PathBuf,
    #[serde(default = "PathsConfig::default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "PathsConfig::default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "PathsConfig::default_model_dir")]
    pub model_dir: PathBuf,
}

impl PathsConfig {
    fn default_measurements_dir() -> PathBuf {
        PathBuf::from("measurements")
    }
    fn default_cache_dir() -> PathBuf {
        PathBuf::from("figures/data")
    }
    fn default_output_dir() -> PathBuf {
        PathBuf::from("figures")
    }
    fn default_model_dir() -> PathBuf {
        PathBuf::from("math_model/results")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            measurements_dir: Self::default_measurements_dir(),
            cache_dir: Self::default_cache_dir(),
            output_dir: Self::default_output_dir(),
            model_dir: Self::default_model_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CscConfig {
    /// C value above which a counter is considered to accumulate enough jitter.
    #[serde(default = "CscConfig::default_threshold")]
    pub threshold: f64,
}

impl CscConfig {
    fn default_threshold() -> f64 {
        59.0
    }
}

impl Default for CscConfig {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "ModelConfig::default_jitter_strength")]
    pub jitter_strength: f64,
    #[serde(default = "ModelConfig::default_ro_period")]
    pub ro_period: f64,
    #[serde(default = "ModelConfig::default_nb_points")]
    pub nb_points: usize,
    #[serde(default = "ModelConfig::default_csc_min")]
    pub csc_min: f64,
    #[serde(default = "ModelConfig::default_csc_max")]
    pub csc_max: f64,
    #[serde(default = "ModelConfig::default_nb_draws")]
    pub nb_draws: usize,
    #[serde(default = "ModelConfig::default_wt_resolution")]
    pub wt_resolution: usize,
    #[serde(default = "ModelConfig::default_entropy_bits")]
    pub entropy_bits: u32,
    #[serde(default = "ModelConfig::default_seed")]
    pub seed: u64,
}

impl ModelConfig {
    /// Keep `entropy_bits` within what the bin folding supports.
    pub fn clamp_entropy_bits(&mut self) {
        if self.entropy_bits > MAX_ENTROPY_BITS {
            warn!(
                "entropy_bits = {} is too wide, using {MAX_ENTROPY_BITS}",
                self.entropy_bits
            );
            self.entropy_bits = MAX_ENTROPY_BITS;
        }
    }

    fn default_jitter_strength() -> f64 {
        4.6e-15
    }
    fn default_ro_period() -> f64 {
        3.69e-9
    }
    fn default_nb_points() -> usize {
        200
    }
    fn default_csc_min() -> f64 {
        1.0
    }
    fn default_csc_max() -> f64 {
        200.0
    }
    fn default_nb_draws() -> usize {
        100_000
    }
    fn default_wt_resolution() -> usize {
        1000
    }
    fn default_entropy_bits() -> u32 {
        1
    }
    fn default_seed() -> u64 {
        0x5EED_0F_C10C
    }

    /// Result file name, keyed by jitter strength and period.
    pub fn result_file_name(&self) -> String {
        format!(
            "csc_jit{}_per{}.csv",
            (self.jitter_strength * 1e16).round() as i64,
            (self.ro_period * 1e11).round() as i64
        )
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            jitter_strength: Self::default_jitter_strength(),
            ro_period: Self::default_ro_period(),
            nb_points: Self::default_nb_points(),
            csc_min: Self::default_csc_min(),
            csc_max: Self::default_csc_max(),
            nb_draws: Self::default_nb_draws(),
            wt_resolution: Self::default_wt_resolution(),
            entropy_bits: Self::default_entropy_bits(),
            seed: Self::default_seed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Width in pixels of a single-panel figure.
    #[serde(default = "RenderConfig::default_width")]
    pub width: u32,
    #[serde(default = "RenderConfig::default_height")]
    pub height: u32,
}

impl RenderConfig {
    fn default_width() -> u32 {
        640
    }
    fn default_height() -> u32 {
        480
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub csc: CscConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl AppConfig {
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str::<Self>(&contents) {
                    Ok(mut cfg) => {
                        cfg.model.clamp_entropy_bits();
                        return cfg;
                    }
                    Err(err) => {
                        warn!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    warn!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        // File does not exist: write defaults as a commented template.
        let default_cfg = Self::default();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => {
                if let Err(err) = fs::write(path_obj, commented_template(&text)) {
                    warn!("Failed to write default config to {path}: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize default config: {err}"),
        }
        default_cfg
    }
}

fn commented_template(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push('\n');
        } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
            out.push_str(line);
            out.push('\n');
        } else {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "ringosc_config_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn load_or_default_writes_defaults_cleanly() {
        let path = unique_path("defaults.toml");
        let path_str = path.to_string_lossy().to_string();
        let _ = fs::remove_file(&path);

        let cfg = AppConfig::load_or_default(&path_str);
        assert!(path.exists(), "config file should be created");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.csc.threshold, 59.0);
        assert_eq!(cfg.model.nb_points, 200);

        let contents = fs::read_to_string(&path).expect("read written config");
        assert!(contents.contains("[model]"), "section headers stay live");
        assert!(contents.contains("# threshold = 59.0"));
        assert!(contents.contains("# nb_draws = 100000"));

        // A fully commented template parses back to the defaults.
        let reloaded = AppConfig::load_or_default(&path_str);
        assert_eq!(reloaded, cfg);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_or_default_reads_partial_file() {
        let path = unique_path("partial.toml");
        let path_str = path.to_string_lossy().to_string();
        fs::write(
            &path,
            "[model]\nnb_draws = 5000\njitter_strength = 1e-14\n\n[paths]\ncache_dir = \"cache\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load_or_default(&path_str);
        assert_eq!(cfg.model.nb_draws, 5000);
        assert_eq!(cfg.model.jitter_strength, 1e-14);
        assert_eq!(cfg.model.ro_period, 3.69e-9);
        assert_eq!(cfg.paths.cache_dir, PathBuf::from("cache"));
        assert_eq!(cfg.paths.output_dir, PathBuf::from("figures"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = unique_path("broken.toml");
        let path_str = path.to_string_lossy().to_string();
        fs::write(&path, "[model\nnb_draws = ").unwrap();
        let cfg = AppConfig::load_or_default(&path_str);
        assert_eq!(cfg, AppConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn oversized_entropy_width_is_clamped_on_load() {
        let path = unique_path("wide_bits.toml");
        let path_str = path.to_string_lossy().to_string();
        fs::write(&path, "[model]\nentropy_bits = 64\n").unwrap();
        let cfg = AppConfig::load_or_default(&path_str);
        assert_eq!(cfg.model.entropy_bits, MAX_ENTROPY_BITS);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn result_file_name_matches_model_parameters() {
        let cfg = ModelConfig::default();
        assert_eq!(cfg.result_file_name(), "csc_jit46_per369.csv");
    }
}
