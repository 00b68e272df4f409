//! Flat per-figure result cache.
//!
//! Each cache file holds rows of numbers of arbitrary length. An empty row
//! is stored as a single empty field so that it survives the round trip and
//! keeps the row positions stable.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use crate::error::FigureError;

pub type Rows = Vec<Vec<f64>>;

#[derive(Clone, Debug)]
pub struct StoreData {
    path: PathBuf,
}

impl StoreData {
    /// Cache `{dir}/{name}.csv`, or `{dir}/{name}_{nb_points}.csv` when a
    /// point count is given.
    pub fn new(dir: impl AsRef<Path>, name: &str, nb_points: Option<usize>) -> Self {
        let file_name = match nb_points {
            Some(n) if n > 0 => format!("{name}_{n}.csv"),
            _ => format!("{name}.csv"),
        };
        Self {
            path: dir.as_ref().join(file_name),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    pub fn file_exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write `rows`, returning `false` without touching the file when it
    /// already exists and `overwrite` is unset.
    pub fn write_data(&self, rows: &[Vec<f64>], overwrite: bool) -> Result<bool, FigureError> {
        if self.file_exists() && !overwrite {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| FigureError::io(parent, e))?;
            }
        }
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .quote_style(QuoteStyle::Necessary)
            .from_path(&self.path)
            .map_err(|e| FigureError::csv(&self.path, e))?;
        for row in rows {
            if row.is_empty() {
                writer
                    .write_record([""])
                    .map_err(|e| FigureError::csv(&self.path, e))?;
            } else {
                writer
                    .write_record(row.iter().map(|v| v.to_string()))
                    .map_err(|e| FigureError::csv(&self.path, e))?;
            }
        }
        writer.flush().map_err(|e| FigureError::io(&self.path, e))?;
        Ok(true)
    }

    /// Read the cached rows, or `None` when nothing was stored yet.
    pub fn read_data(&self) -> Result<Option<Rows>, FigureError> {
        if !self.file_exists() {
            return Ok(None);
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| FigureError::csv(&self.path, e))?;

        let mut rows = Rows::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| FigureError::csv(&self.path, e))?;
            if record.iter().all(str::is_empty) {
                rows.push(Vec::new());
                continue;
            }
            let row = record
                .iter()
                .enumerate()
                .map(|(column, field)| {
                    field.trim().parse::<f64>().map_err(|_| FigureError::Parse {
                        path: self.path.clone(),
                        row: i + 1,
                        column,
                        value: field.to_string(),
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            rows.push(row);
        }
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_includes_point_count() {
        let plain = StoreData::new("figures/data", "csc_s7_stage_length", None);
        assert_eq!(
            plain.file_path(),
            Path::new("figures/data/csc_s7_stage_length.csv")
        );
        let counted = StoreData::new("figures/data", "h_vs_csc_s7", Some(200));
        assert_eq!(
            counted.file_path(),
            Path::new("figures/data/h_vs_csc_s7_200.csv")
        );
    }
}
