use std::path::PathBuf;

use thiserror::Error;

use crate::root_find::RootError;

/**
Errors raised when an input falls outside the domain of a formula
or when a scenario, table, or chart cannot be read or written.
*/
#[derive(Debug, Error)]
pub enum HydroError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} = {value} is out of range: {reason}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("rainfall rate {rainfall_rate} does not exceed saturated conductivity {ks}, no ponding")]
    NoPonding { rainfall_rate: f64, ks: f64 },

    #[error("parallel inputs differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("total area is zero")]
    ZeroArea,

    #[error("no {0} given")]
    Empty(&'static str),

    #[error("unknown soil texture '{0}'")]
    UnknownTexture(String),

    #[error("no curve number for soil group '{group}' and land use '{land_use}'")]
    UnknownCurveNumber { group: String, land_use: String },

    #[error("table {path}, line {line}: {reason}")]
    Table {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("scenario section [{section}] is incomplete: {reason}")]
    Scenario {
        section: &'static str,
        reason: &'static str,
    },

    #[error("table has no column named '{0}'")]
    MissingColumn(String),

    #[error("root finding failed")]
    Root(#[from] RootError),

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render chart {}: {reason}", path.display())]
    Plot { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, HydroError>;

pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(HydroError::NonFinite { name, value })
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(HydroError::OutOfRange {
            name,
            value,
            reason: "must be positive",
        })
    }
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<f64> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(HydroError::OutOfRange {
            name,
            value,
            reason: "must not be negative",
        })
    }
}

pub(crate) fn same_len(left: usize, right: usize) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(HydroError::LengthMismatch { left, right })
    }
}
