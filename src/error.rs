use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the measurement, cache and sampling layers.
///
/// Missing inputs are not represented here: a missing measurement or cache
/// file is an expected condition and is reported through `Option`.
#[derive(Debug, Error)]
pub enum FigureError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed csv in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}, row {row}, column {column}: cannot parse {value:?} as a number")]
    Parse {
        path: PathBuf,
        row: usize,
        column: usize,
        value: String,
    },

    #[error("{path}, row {row}: missing column {column}")]
    MissingColumn {
        path: PathBuf,
        row: usize,
        column: usize,
    },

    #[error("no maximal-length tap set for a {0}-bit lfsr (supported: 5..=63)")]
    LfsrWidth(u32),
}

impl FigureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
