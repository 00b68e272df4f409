//! Raw measurement files produced by the FPGA test benches.
//!
//! Every file is a CSV with one header row followed by one row per measured
//! configuration. Columns are parsed on demand since the layouts differ
//! between campaigns.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::warn;

use crate::error::FigureError;

/// A ring-oscillator design: display name plus the directory/file token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Topology {
    pub name: &'static str,
    pub ro_type: &'static str,
}

pub const GATE_VAR: Topology = Topology {
    name: "GateVar",
    ro_type: "muxnetwork",
};
pub const WIRE_VAR: Topology = Topology {
    name: "WireVar",
    ro_type: "wireonly",
};
pub const LUT_VAR0: Topology = Topology {
    name: "LUTVar0",
    ro_type: "intralut0",
};
pub const LUT_VAR5: Topology = Topology {
    name: "LUTVar5",
    ro_type: "intralut5",
};
/// SmartFusion 2 only.
pub const LUT_VAR3: Topology = Topology {
    name: "LUTVar3",
    ro_type: "intralut3",
};

/// Placement grid of the variable-GP campaign.
pub const X_LOCS: [u32; 5] = [0, 10, 28, 36, 52];
pub const Y_LOCS: [u32; 5] = [0, 37, 74, 111, 148];
/// Row of the partner instance placed next to each `Y_LOCS` entry.
pub const Y_LOCS_PARTNER: [u32; 5] = [1, 38, 75, 112, 147];

/// Measurement campaigns, one directory each under the measurements root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Campaign {
    VariableGpS7,
    NoPlacementS7,
    NoPlacementCongestionS7,
    MatchedControlS7,
    NoPlacementSf2,
}

impl Campaign {
    pub fn dir_name(self) -> &'static str {
        match self {
            Campaign::VariableGpS7 => "lp_variable_gp_s7",
            Campaign::NoPlacementS7 => "no_placement_s7",
            Campaign::NoPlacementCongestionS7 => "no_placement_congestion_s7",
            Campaign::MatchedControlS7 => "no_placement_matched_control_s7",
            Campaign::NoPlacementSf2 => "no_placement_sf2",
        }
    }

    pub fn root(self, measurements_dir: &Path) -> PathBuf {
        measurements_dir.join(self.dir_name())
    }
}

/// `{dir}/{type}/all_configs_{type}_x{X}y{Y}_stages{S}.csv`
pub fn placement_path(dir: &Path, ro_type: &str, x: u32, y: u32, stages: u32) -> PathBuf {
    dir.join(ro_type)
        .join(format!("all_configs_{ro_type}_x{x}y{y}_stages{stages}.csv"))
}

/// `{dir}/{type}_np/all_configs_{type}_np_coso_x0y0_stages{S}.csv`
pub fn no_placement_path(dir: &Path, ro_type: &str, stages: u32) -> PathBuf {
    dir.join(format!("{ro_type}_np")).join(format!(
        "all_configs_{ro_type}_np_coso_x0y0_stages{stages}.csv"
    ))
}

/// `{dir}/{type}_np_cg/all_configs_{type}_np_congest_coso_x0y0_stages{S}.csv`
pub fn congested_path(dir: &Path, ro_type: &str, stages: u32) -> PathBuf {
    dir.join(format!("{ro_type}_np_cg")).join(format!(
        "all_configs_{ro_type}_np_congest_coso_x0y0_stages{stages}.csv"
    ))
}

/// `{dir}/{type}_np_mc/maco_scan_{type}_np_coso_stages{S}.csv`
pub fn max_count_path(dir: &Path, ro_type: &str, stages: u32) -> PathBuf {
    dir.join(format!("{ro_type}_np_mc"))
        .join(format!("maco_scan_{ro_type}_np_coso_stages{stages}.csv"))
}

#[derive(Clone, Debug)]
pub struct Measurement {
    path: PathBuf,
    rows: Vec<StringRecord>,
}

impl Measurement {
    /// Read a measurement file, skipping its header row.
    ///
    /// A missing file or a file without data rows is logged and yields
    /// `Ok(None)`; unreadable or malformed files are errors.
    pub fn read(path: &Path) -> Result<Option<Self>, FigureError> {
        if !path.is_file() {
            warn!("File: {} does not exist!", path.display());
            return Ok(None);
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| FigureError::csv(path, e))?;
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FigureError::csv(path, e))?;
        if rows.is_empty() {
            warn!("File: {} is empty!", path.display());
            return Ok(None);
        }
        Ok(Some(Self {
            path: path.to_path_buf(),
            rows,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn field(&self, row: usize, column: usize) -> Result<&str, FigureError> {
        self.rows[row]
            .get(column)
            .ok_or_else(|| FigureError::MissingColumn {
                path: self.path.clone(),
                row: row + 1,
                column,
            })
    }

    fn parse_error(&self, row: usize, column: usize, value: &str) -> FigureError {
        FigureError::Parse {
            path: self.path.clone(),
            row: row + 1,
            column,
            value: value.to_string(),
        }
    }

    /// Column `column` as floats, each multiplied by `scale`.
    pub fn column_f64(&self, column: usize, scale: f64) -> Result<Vec<f64>, FigureError> {
        (0..self.rows.len())
            .map(|row| {
                let raw = self.field(row, column)?;
                raw.parse::<f64>()
                    .map(|v| v * scale)
                    .map_err(|_| self.parse_error(row, column, raw))
            })
            .collect()
    }

    /// Column `column` as integers; integral floats such as `3.0` are accepted.
    pub fn column_i64(&self, column: usize) -> Result<Vec<i64>, FigureError> {
        (0..self.rows.len())
            .map(|row| {
                let raw = self.field(row, column)?;
                if let Ok(v) = raw.parse::<i64>() {
                    return Ok(v);
                }
                match raw.parse::<f64>() {
                    Ok(v) if v.fract() == 0.0 && v.is_finite() => Ok(v as i64),
                    _ => Err(self.parse_error(row, column, raw)),
                }
            })
            .collect()
    }
}

/// Read `column` of the file at `path`, or `None` when the file is missing
/// or empty.
pub fn read_column(path: &Path, column: usize, scale: f64) -> Result<Option<Vec<f64>>, FigureError> {
    match Measurement::read(path)? {
        Some(m) => m.column_f64(column, scale).map(Some),
        None => Ok(None),
    }
}

/// Configuration ids and periods from a measurement file.
pub fn read_periods(
    path: &Path,
    conf_column: usize,
    period_column: usize,
    scale: f64,
) -> Result<Option<(Vec<i64>, Vec<f64>)>, FigureError> {
    match Measurement::read(path)? {
        Some(m) => Ok(Some((
            m.column_i64(conf_column)?,
            m.column_f64(period_column, scale)?,
        ))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let root = Path::new("m");
        assert_eq!(
            placement_path(root, "wireonly", 10, 37, 3),
            Path::new("m/wireonly/all_configs_wireonly_x10y37_stages3.csv")
        );
        assert_eq!(
            no_placement_path(root, "intralut5", 2),
            Path::new("m/intralut5_np/all_configs_intralut5_np_coso_x0y0_stages2.csv")
        );
        assert_eq!(
            congested_path(root, "muxnetwork", 4),
            Path::new("m/muxnetwork_np_cg/all_configs_muxnetwork_np_congest_coso_x0y0_stages4.csv")
        );
        assert_eq!(
            max_count_path(root, "wireonly", 3),
            Path::new("m/wireonly_np_mc/maco_scan_wireonly_np_coso_stages3.csv")
        );
    }

    #[test]
    fn campaign_roots() {
        let root = Path::new("measurements");
        assert_eq!(
            Campaign::VariableGpS7.root(root),
            Path::new("measurements/lp_variable_gp_s7")
        );
        assert_eq!(
            Campaign::NoPlacementSf2.root(root),
            Path::new("measurements/no_placement_sf2")
        );
    }
}
