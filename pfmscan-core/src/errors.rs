use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Error parsing region: {0}")]
    RegionParseError(String),

    #[error("Error parsing motif file {path}: {message}")]
    MotifParseError { path: String, message: String },

    #[error("Unknown contig found in region: {0}")]
    UnknownContig(String),

    #[error("Invalid range: start={start}, end={end} for contig {chr} with length {len}")]
    InvalidRange {
        chr: String,
        start: u32,
        end: u32,
        len: usize,
    },

    #[error("A genome is required to resolve the regions in: {0}")]
    GenomeRequired(String),

    #[error("Corrupted file. 0 sequences found in the file: {0}")]
    EmptySequenceSet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
