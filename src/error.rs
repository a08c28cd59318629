use thiserror::Error;

/// Rejected session configuration. Raised before any trial is generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    ZeroGridDimension { rows: usize, cols: usize },

    #[error("max delay {max}ms is below min delay {min}ms")]
    InvertedDelayRange { min: u64, max: u64 },

    #[error("grid {rows}x{cols} has more slots than can be addressed")]
    GridTooLarge { rows: usize, cols: usize },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode csv: {0}")]
    Csv(#[from] csv::Error),
}
