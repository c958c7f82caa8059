use std::path::PathBuf;

use thiserror::Error;

use pfmscan_core::CoreError;

#[derive(Error, Debug)]
pub enum ScanError {
    /// The motif source is neither a list of motifs, a path, nor absent.
    #[error(
        "{0}. Please provide a motif file path, a list of motifs, or nothing to use the default motif database."
    )]
    InvalidMotifInput(String),

    #[error("No motif file given and no default motif database specified")]
    NoDefaultMotifDatabase,

    #[error("Motif file not found: {}", .0.display())]
    MotifFileNotFound(PathBuf),

    #[error("Invalid configuration file {path}: {message}")]
    Config { path: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate {axis} key in table: {key}")]
    DuplicateKey { axis: &'static str, key: String },

    /// Raised by a scanning engine, passed through unchanged.
    #[error("Scanning engine error: {0}")]
    Engine(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type Result<T> = std::result::Result<T, ScanError>;
